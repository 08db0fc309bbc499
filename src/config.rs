//! Runtime settings.

use std::time::Duration;

use escalation_core::Windows;
use serde::{Deserialize, Serialize};

use crate::alerts::AlertConfig;
use crate::error::{Error, Result};

pub const ENV_TILT_THRESHOLD: &str = "CRASHGUARD_TILT_THRESHOLD";
pub const ENV_MANUAL_WINDOW: &str = "CRASHGUARD_MANUAL_WINDOW";
pub const ENV_REARM_WINDOW: &str = "CRASHGUARD_REARM_WINDOW";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Per-axis acceleration beyond which a sample counts as an impact
    #[serde(default = "default_tilt_threshold")]
    pub tilt_threshold: f64,

    /// Countdown length when started by hand
    #[serde(default = "default_manual_window")]
    pub manual_window_secs: u32,

    /// Countdown length when started by motion, and the idle value
    #[serde(default = "default_rearm_window")]
    pub rearm_window_secs: u32,

    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,

    /// Upper bound on a single alert send
    #[serde(default = "default_dispatch_timeout")]
    pub dispatch_timeout_secs: u64,

    #[serde(default)]
    pub alerts: AlertConfig,
}

fn default_tilt_threshold() -> f64 {
    2.0
}

fn default_manual_window() -> u32 {
    60
}

fn default_rearm_window() -> u32 {
    15
}

fn default_tick_interval() -> u64 {
    1000
}

fn default_dispatch_timeout() -> u64 {
    10
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tilt_threshold: default_tilt_threshold(),
            manual_window_secs: default_manual_window(),
            rearm_window_secs: default_rearm_window(),
            tick_interval_ms: default_tick_interval(),
            dispatch_timeout_secs: default_dispatch_timeout(),
            alerts: AlertConfig::default(),
        }
    }
}

impl Settings {
    pub fn windows(&self) -> Windows {
        Windows {
            manual_secs: self.manual_window_secs,
            rearm_secs: self.rearm_window_secs,
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn dispatch_timeout(&self) -> Duration {
        Duration::from_secs(self.dispatch_timeout_secs)
    }

    /// Override with environment variables
    pub fn apply_env_vars(&mut self) -> Result<()> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(value) = lookup(ENV_TILT_THRESHOLD) {
            self.tilt_threshold = parse_var("tilt_threshold", &value)?;
        }
        if let Some(value) = lookup(ENV_MANUAL_WINDOW) {
            self.manual_window_secs = parse_var("manual_window_secs", &value)?;
        }
        if let Some(value) = lookup(ENV_REARM_WINDOW) {
            self.rearm_window_secs = parse_var("rearm_window_secs", &value)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if !self.tilt_threshold.is_finite() || self.tilt_threshold < 0.0 {
            return Err(Error::InvalidSetting {
                name: "tilt_threshold",
                reason: format!("must be a non-negative number, got {}", self.tilt_threshold),
            });
        }
        if self.tick_interval_ms == 0 {
            return Err(Error::InvalidSetting {
                name: "tick_interval_ms",
                reason: "must be greater than zero".into(),
            });
        }
        if self.dispatch_timeout_secs == 0 {
            return Err(Error::InvalidSetting {
                name: "dispatch_timeout_secs",
                reason: "must be greater than zero".into(),
            });
        }
        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| Error::InvalidSetting {
        name,
        reason: format!("{:?}: {}", value, e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.tilt_threshold, 2.0);
        assert_eq!(settings.windows(), Windows::default());
        assert_eq!(settings.tick_interval(), Duration::from_secs(1));
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            tilt_threshold = 3.5

            [alerts]
            audio = false
            "#,
        )
        .unwrap();
        assert_eq!(settings.tilt_threshold, 3.5);
        assert_eq!(settings.manual_window_secs, 60);
        assert!(!settings.alerts.audio);
        assert!(settings.alerts.vibration);
        assert_eq!(settings.alerts.pattern.pulse_ms, 200);
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            (ENV_TILT_THRESHOLD, "1.5"),
            (ENV_REARM_WINDOW, " 30 "),
        ]
        .into_iter()
        .collect();

        let mut settings = Settings::default();
        settings
            .apply_overrides(|name| vars.get(name).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(settings.tilt_threshold, 1.5);
        assert_eq!(settings.rearm_window_secs, 30);
        assert_eq!(settings.manual_window_secs, 60);
    }

    #[test]
    fn test_bad_override_is_rejected() {
        let mut settings = Settings::default();
        let err = settings
            .apply_overrides(|name| (name == ENV_MANUAL_WINDOW).then(|| "soon".to_string()))
            .unwrap_err();
        assert!(err.to_string().starts_with("invalid setting manual_window_secs"));
    }

    #[test]
    fn test_validate_rejects_nonsense() {
        let settings = Settings {
            tilt_threshold: f64::NAN,
            ..Settings::default()
        };
        assert!(settings.validate().is_err());

        let settings = Settings {
            tick_interval_ms: 0,
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
    }
}
