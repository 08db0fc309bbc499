use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ResourceError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VibePattern {
    pub pulse_ms: u64,
    pub pause_ms: u64,
}

impl Default for VibePattern {
    fn default() -> Self {
        Self {
            pulse_ms: 200,
            pause_ms: 1000,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    pub vibration: bool,
    pub audio: bool,
    pub clip: String,
    pub pattern: VibePattern,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            vibration: true,
            audio: true,
            clip: String::from("carcrash.mp3"),
            pattern: VibePattern::default(),
        }
    }
}

pub trait AudioPlayer: Send + Sync {
    /// Starts playing `clip` on a loop until [`AudioPlayer::stop`].
    fn play_loop(&self, clip: &str) -> Result<(), ResourceError>;
    /// Stops playback and releases the loaded clip.
    fn stop(&self);
}

pub trait Haptics: Send + Sync {
    fn start_pattern(&self, pattern: VibePattern, repeat: bool) -> Result<(), ResourceError>;
    fn cancel(&self);
}

/// Live audio/haptic output. Whatever was started is stopped when the
/// session is dropped.
pub struct AlertSession {
    audio: Option<Arc<dyn AudioPlayer>>,
    haptics: Option<Arc<dyn Haptics>>,
}

impl AlertSession {
    fn open(
        config: &AlertConfig,
        audio: &Arc<dyn AudioPlayer>,
        haptics: &Arc<dyn Haptics>,
    ) -> Self {
        let mut session = Self {
            audio: None,
            haptics: None,
        };
        if config.vibration {
            match haptics.start_pattern(config.pattern, true) {
                Ok(()) => session.haptics = Some(Arc::clone(haptics)),
                Err(e) => log::warn!("alert continues without vibration: {}", e),
            }
        }
        if config.audio {
            match audio.play_loop(&config.clip) {
                Ok(()) => session.audio = Some(Arc::clone(audio)),
                Err(e) => log::warn!("alert continues without sound: {}", e),
            }
        }
        session
    }
}

impl Drop for AlertSession {
    fn drop(&mut self) {
        if let Some(haptics) = self.haptics.take() {
            haptics.cancel();
        }
        if let Some(audio) = self.audio.take() {
            audio.stop();
        }
    }
}

pub struct AlertActuator {
    audio: Arc<dyn AudioPlayer>,
    haptics: Arc<dyn Haptics>,
    config: AlertConfig,
    session: Option<AlertSession>,
}

impl AlertActuator {
    pub fn new(config: AlertConfig, audio: Arc<dyn AudioPlayer>, haptics: Arc<dyn Haptics>) -> Self {
        Self {
            audio,
            haptics,
            config,
            session: None,
        }
    }

    /// Opens a session unless one is already live. Returns whether a new
    /// session was opened.
    pub fn activate(&mut self) -> bool {
        if self.session.is_some() {
            log::debug!("alert session already live");
            return false;
        }
        self.session = Some(AlertSession::open(&self.config, &self.audio, &self.haptics));
        true
    }

    /// Releases the live session, if any. Returns whether one was released.
    pub fn deactivate(&mut self) -> bool {
        self.session.take().is_some()
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn config(&self) -> &AlertConfig {
        &self.config
    }
}

/// Platform stand-in that only logs. Used by the demo binary.
pub struct LogAlerts;

impl AudioPlayer for LogAlerts {
    fn play_loop(&self, clip: &str) -> Result<(), ResourceError> {
        log::info!("playing {} on loop", clip);
        Ok(())
    }

    fn stop(&self) {
        log::info!("sound stopped");
    }
}

impl Haptics for LogAlerts {
    fn start_pattern(&self, pattern: VibePattern, repeat: bool) -> Result<(), ResourceError> {
        log::info!(
            "vibrating {}ms on / {}ms off (repeat: {})",
            pattern.pulse_ms,
            pattern.pause_ms,
            repeat
        );
        Ok(())
    }

    fn cancel(&self) {
        log::info!("vibration cancelled");
    }
}
