//! Recording fakes for the platform collaborators.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::alerts::{AudioPlayer, Haptics, VibePattern};
use crate::dispatch::{Ack, AlertTransport, EmergencyPayload, ErrorReporter};
use crate::error::{DispatchError, ResourceError};
use crate::profile::{EmergencyContact, UserProfile};

pub(crate) fn sample_profile() -> UserProfile {
    UserProfile {
        address: Some("12 Harbour Road".into()),
        allergy_notes: Some("penicillin".into()),
        blood_type: Some("A+".into()),
        emergency_contacts: vec![EmergencyContact {
            name: "Sam".into(),
            phone: "+15550100".into(),
        }],
    }
}

#[derive(Default)]
pub(crate) struct RecordingAudio {
    fail: bool,
    started: Mutex<Vec<String>>,
    stopped: Mutex<usize>,
}

impl RecordingAudio {
    pub(crate) fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub(crate) fn started(&self) -> usize {
        self.started.lock().len()
    }

    pub(crate) fn last_clip(&self) -> Option<String> {
        self.started.lock().last().cloned()
    }

    pub(crate) fn stopped(&self) -> usize {
        *self.stopped.lock()
    }
}

impl AudioPlayer for RecordingAudio {
    fn play_loop(&self, clip: &str) -> Result<(), ResourceError> {
        if self.fail {
            return Err(ResourceError::Audio("decoder missing".into()));
        }
        self.started.lock().push(clip.to_string());
        Ok(())
    }

    fn stop(&self) {
        *self.stopped.lock() += 1;
    }
}

#[derive(Default)]
pub(crate) struct RecordingHaptics {
    started: Mutex<Vec<(VibePattern, bool)>>,
    cancelled: Mutex<usize>,
}

impl RecordingHaptics {
    pub(crate) fn started(&self) -> usize {
        self.started.lock().len()
    }

    pub(crate) fn last_pattern(&self) -> Option<(VibePattern, bool)> {
        self.started.lock().last().copied()
    }

    pub(crate) fn cancelled(&self) -> usize {
        *self.cancelled.lock()
    }
}

impl Haptics for RecordingHaptics {
    fn start_pattern(&self, pattern: VibePattern, repeat: bool) -> Result<(), ResourceError> {
        self.started.lock().push((pattern, repeat));
        Ok(())
    }

    fn cancel(&self) {
        *self.cancelled.lock() += 1;
    }
}

#[derive(Clone, Copy, Default)]
enum Behaviour {
    #[default]
    Accept,
    Fail,
    Stall,
}

#[derive(Default)]
pub(crate) struct RecordingTransport {
    behaviour: Behaviour,
    payloads: Mutex<Vec<EmergencyPayload>>,
}

impl RecordingTransport {
    pub(crate) fn failing() -> Self {
        Self {
            behaviour: Behaviour::Fail,
            ..Self::default()
        }
    }

    pub(crate) fn stalled() -> Self {
        Self {
            behaviour: Behaviour::Stall,
            ..Self::default()
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.payloads.lock().len()
    }

    pub(crate) fn payloads(&self) -> Vec<EmergencyPayload> {
        self.payloads.lock().clone()
    }
}

#[async_trait::async_trait]
impl AlertTransport for RecordingTransport {
    fn name(&self) -> &str {
        "recording"
    }

    async fn send(&self, payload: &EmergencyPayload) -> Result<Ack, DispatchError> {
        self.payloads.lock().push(payload.clone());
        match self.behaviour {
            Behaviour::Accept => Ok(Ack {
                reference: Some(format!("sos-{}", self.calls())),
            }),
            Behaviour::Fail => Err(DispatchError::Network("connection refused".into())),
            Behaviour::Stall => std::future::pending().await,
        }
    }
}

#[derive(Default)]
pub(crate) struct RecordingReporter {
    messages: Mutex<Vec<String>>,
}

impl RecordingReporter {
    pub(crate) fn count(&self) -> usize {
        self.messages.lock().len()
    }

    pub(crate) fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }
}

impl ErrorReporter for RecordingReporter {
    fn report(&self, error: &DispatchError) {
        self.messages.lock().push(error.to_string());
    }
}

/// Fakes wired the way `CrashGuard` and `CountdownController` take them.
pub(crate) struct Fakes {
    pub(crate) audio: Arc<RecordingAudio>,
    pub(crate) haptics: Arc<RecordingHaptics>,
    pub(crate) transport: Arc<RecordingTransport>,
    pub(crate) reporter: Arc<RecordingReporter>,
}

impl Fakes {
    pub(crate) fn new() -> Self {
        Self::with_transport(RecordingTransport::default())
    }

    pub(crate) fn with_transport(transport: RecordingTransport) -> Self {
        Self {
            audio: Arc::new(RecordingAudio::default()),
            haptics: Arc::new(RecordingHaptics::default()),
            transport: Arc::new(transport),
            reporter: Arc::new(RecordingReporter::default()),
        }
    }
}
