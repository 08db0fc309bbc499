//! User profile as seen by the escalation path. The profile is owned by the
//! account layer; this crate only reads it.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyContact {
    pub name: String,
    pub phone: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    pub address: Option<String>,
    pub allergy_notes: Option<String>,
    pub blood_type: Option<String>,
    pub emergency_contacts: Vec<EmergencyContact>,
}

pub trait ProfileStore: Send + Sync {
    /// The signed-in user's profile, or `None` when nobody is signed in.
    fn current(&self) -> Option<UserProfile>;
}

/// Profile slot shared with whatever manages sign-in.
#[derive(Clone, Default)]
pub struct SharedProfile {
    inner: Arc<RwLock<Option<UserProfile>>>,
}

impl SharedProfile {
    pub fn new(profile: Option<UserProfile>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(profile)),
        }
    }

    pub fn set(&self, profile: UserProfile) {
        *self.inner.write() = Some(profile);
    }

    pub fn clear(&self) {
        self.inner.write().take();
    }
}

impl ProfileStore for SharedProfile {
    fn current(&self) -> Option<UserProfile> {
        self.inner.read().clone()
    }
}
