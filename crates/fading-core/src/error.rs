//! Error types for the WiFi fading detector.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The interface reported no signal, channel or band for this tick.
    #[error("Acquisition unavailable: interface down or disconnected")]
    AcquisitionUnavailable,

    #[error("Malformed sample: {0}")]
    MalformedSample(String),

    #[error("Acquisition error: {0}")]
    Acquisition(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Report error: {0}")]
    Report(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<csv::Error> for Error {
    fn from(e: csv::Error) -> Self {
        Error::Export(e.to_string())
    }
}

impl Error {
    /// Whether the error only means "skip this tick".
    pub fn is_skippable(&self) -> bool {
        matches!(self, Error::AcquisitionUnavailable | Error::Acquisition(_))
    }
}
