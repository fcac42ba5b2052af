//! Error types for autoshade

use thiserror::Error;

/// Main error type
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Solar position computation failed: {0}")]
    Computation(String),

    #[error("Sensor error: {0}")]
    Sensor(String),

    #[error("GPU error: {0}")]
    Gpu(String),

    #[error("Window error: {0}")]
    Window(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Config(e.to_string())
    }
}

impl From<autoshade_gpsd::GpsdError> for Error {
    fn from(e: autoshade_gpsd::GpsdError) -> Self {
        Error::Sensor(e.to_string())
    }
}
