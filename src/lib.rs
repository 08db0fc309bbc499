//! Crash detection with a cancellable response countdown.
//!
//! An accelerometer impact (or the manual start control) arms a countdown.
//! While it runs the phone vibrates and plays a looping alarm; if nobody
//! cancels before it runs out, an emergency alert carrying the user's
//! address, allergies and blood type is sent once.

pub mod alerts;
pub mod app;
pub mod config;
pub mod countdown;
pub mod dispatch;
pub mod error;
pub mod monitor;
pub mod profile;
pub mod sensor;
pub mod storage;

#[cfg(test)]
mod test_support;

pub use app::{CrashGuard, MonitorMode, Services};
pub use error::{Error, Result};
pub use escalation_core::{ArmSource, CountdownState, Phase, Transition, Windows};
