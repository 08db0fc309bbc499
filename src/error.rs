use std::time::Duration;

/// Motion sensor could not be subscribed to.
#[derive(Debug, thiserror::Error)]
pub enum SensorError {
    #[error("motion sensor unavailable: {0}")]
    Unavailable(String),
}

/// Audio or haptic output failed to start.
#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    #[error("audio playback failed: {0}")]
    Audio(String),

    #[error("haptic pattern failed: {0}")]
    Haptic(String),
}

/// The emergency alert could not be delivered.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("network error: {0}")]
    Network(String),

    #[error("alert endpoint did not answer within {0:?}")]
    Timeout(Duration),

    #[error("alert endpoint returned {status}: {message}")]
    Server { status: u16, message: String },

    #[error("payload encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Sensor(#[from] SensorError),

    #[error(transparent)]
    Resource(#[from] ResourceError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("config encode error: {0}")]
    ConfigEncode(#[from] toml::ser::Error),

    #[error("invalid setting {name}: {reason}")]
    InvalidSetting { name: &'static str, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
