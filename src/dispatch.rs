//! Emergency alert dispatch.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::error::DispatchError;
use crate::profile::UserProfile;

/// What the alert endpoint receives. Taken from the profile at the moment
/// the countdown expires.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyPayload {
    pub address: Option<String>,
    pub allergies: Option<String>,
    pub blood_type: Option<String>,
}

impl EmergencyPayload {
    pub fn from_profile(profile: Option<&UserProfile>) -> Self {
        match profile {
            Some(p) => Self {
                address: p.address.clone(),
                allergies: p.allergy_notes.clone(),
                blood_type: p.blood_type.clone(),
            },
            None => Self::default(),
        }
    }
}

/// Receipt from the alert endpoint.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Ack {
    pub reference: Option<String>,
}

/// Outbound channel for emergency alerts. Retries, if any, belong here.
#[async_trait::async_trait]
pub trait AlertTransport: Send + Sync {
    fn name(&self) -> &str;

    async fn send(&self, payload: &EmergencyPayload) -> Result<Ack, DispatchError>;
}

/// Where failed dispatches are reported.
pub trait ErrorReporter: Send + Sync {
    fn report(&self, error: &DispatchError);
}

pub struct LogReporter;

impl ErrorReporter for LogReporter {
    fn report(&self, error: &DispatchError) {
        log::error!("Emergency alert not delivered: {}", error);
    }
}

/// Transport that writes the JSON body to the log instead of the network.
pub struct LogTransport;

#[async_trait::async_trait]
impl AlertTransport for LogTransport {
    fn name(&self) -> &str {
        "log"
    }

    async fn send(&self, payload: &EmergencyPayload) -> Result<Ack, DispatchError> {
        let body = serde_json::to_string(payload)?;
        log::warn!("EMERGENCY ALERT {}", body);
        Ok(Ack::default())
    }
}

pub struct EscalationDispatcher {
    transport: Arc<dyn AlertTransport>,
    reporter: Arc<dyn ErrorReporter>,
    timeout: Duration,
}

impl EscalationDispatcher {
    pub fn new(
        transport: Arc<dyn AlertTransport>,
        reporter: Arc<dyn ErrorReporter>,
        timeout: Duration,
    ) -> Self {
        Self {
            transport,
            reporter,
            timeout,
        }
    }

    /// Builds the payload from `profile` and sends it once.
    pub async fn escalate(&self, profile: Option<&UserProfile>) -> Result<Ack, DispatchError> {
        self.send(EmergencyPayload::from_profile(profile)).await
    }

    pub async fn send(&self, payload: EmergencyPayload) -> Result<Ack, DispatchError> {
        log::info!("Dispatching emergency alert via {}", self.transport.name());
        match tokio::time::timeout(self.timeout, self.transport.send(&payload)).await {
            Ok(Ok(ack)) => {
                log::info!("Emergency alert acknowledged: {:?}", ack.reference);
                Ok(ack)
            }
            Ok(Err(e)) => Err(e),
            Err(_) => Err(DispatchError::Timeout(self.timeout)),
        }
    }

    /// Sends and hands any failure to the reporter. Never fails.
    pub async fn send_reported(&self, payload: EmergencyPayload) -> Option<Ack> {
        match self.send(payload).await {
            Ok(ack) => Some(ack),
            Err(e) => {
                self.reporter.report(&e);
                None
            }
        }
    }
}
