// MIT License - Copyright (c) the tenmicronsync authors
// Rust translation of tenmicronsync.py

/// All errors that can occur while talking to the mount.
#[derive(Debug, thiserror::Error)]
pub enum MountError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Timed out during {operation}")]
    Timeout { operation: &'static str },

    #[error("Connection closed by mount")]
    Disconnected,

    #[error("Failed to connect after {attempts} attempts: {source}")]
    ConnectFailed {
        attempts: u32,
        #[source]
        source: Box<MountError>,
    },

    #[error("Command {command} failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        command: String,
        attempts: u32,
        #[source]
        source: Box<MountError>,
    },

    #[error("Operation cancelled by shutdown")]
    Cancelled,

    #[error("Session closed")]
    Closed,
}

impl MountError {
    /// Whether this error means the connection was lost and a reconnect
    /// followed by a retry may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            MountError::Io(_) | MountError::Timeout { .. } | MountError::Disconnected
        )
    }

    /// Whether this error stems from a shutdown request rather than a fault.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, MountError::Cancelled | MountError::Closed)
    }
}

pub type Result<T> = std::result::Result<T, MountError>;

/// Reasons a weather poll produced no reading. All of them are retryable on
/// the next tick.
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Weather request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Weather endpoint returned HTTP {status}")]
    Status { status: u16 },

    #[error("Invalid weather response: {details}")]
    InvalidBody { details: String },

    #[error("Temperature and/or pressure data missing")]
    MissingData,
}
