//! Error types for message composition.

/// Result type alias for message composition.
pub type Result<T> = std::result::Result<T, Error>;

/// Message composition errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A mandatory address header ended up empty.
    #[error("Missing required header: {0}")]
    MissingHeader(&'static str),
}
