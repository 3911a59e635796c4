//! Shared error types for the murmur system.

use thiserror::Error;

/// Top-level error type for the murmur system.
#[derive(Error, Debug)]
pub enum MurmurError {
    /// A configuration error occurred (missing credential, bad config file).
    /// Fatal at startup.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The completion service failed. Logged, operation aborted, no retry.
    #[error("Completion service error: {0}")]
    Llm(String),

    /// A persistence error occurred while reading or writing a memory
    /// document.
    #[error("Memory error: {0}")]
    Memory(String),

    /// The messaging transport failed (network, API rejection).
    #[error("Transport error: {0}")]
    Transport(String),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An internal error occurred.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Alias for Result with MurmurError.
pub type MurmurResult<T> = Result<T, MurmurError>;
