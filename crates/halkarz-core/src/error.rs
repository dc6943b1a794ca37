//! Error types for the listing watcher
//!
//! Only [`Error::Config`] is fatal; a seen store that cannot be opened at
//! startup is reported as one. Every other variant is logged by the engine and the loop continues.

use thiserror::Error;

/// Result type alias for watcher operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the watcher
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors (fatal at startup)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Page fetch failed (transient, the cycle is skipped)
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Seen-store errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// A sink failed to deliver a notification
    #[error("Delivery error ({sink}): {message}")]
    Delivery {
        /// Sink name
        sink: String,
        /// Error message
        message: String,
    },
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a fetch error
    pub fn fetch(msg: impl Into<String>) -> Self {
        Self::Fetch(msg.into())
    }

    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create a delivery error for the named sink
    pub fn delivery(sink: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Delivery {
            sink: sink.into(),
            message: message.into(),
        }
    }

    /// Whether this error must stop the process
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}
