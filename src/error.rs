//! Error types for chime.
//!
//! The scheduling core itself never fails; these cover the ambient surfaces
//! around it (configuration and the appointment store).

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum ChimeError {
    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Appointment store read or parse error.
    #[error("store error: {0}")]
    Store(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, ChimeError>;
