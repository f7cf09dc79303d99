//! Typed failures that callers need to tell apart. Everything else travels as
//! [`anyhow::Error`].

use thiserror::Error;

/// Raised when a speech backend cannot work in the current environment.
/// Without speech the assistant has nothing to do, so this is surfaced to the
/// user instead of being spoken.
#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("speech capability unavailable: {0}")]
    CapabilityUnavailable(String),
}

/// Failures of an external responder. These never leave the responder: they
/// are turned into a fixed reply at the responder boundary.
#[derive(Debug, Error)]
pub enum ResponderError {
    /// Transport error, timeout or non-success HTTP status
    #[error("network failure: {0}")]
    Network(reqwest::Error),

    /// Malformed JSON or missing fields
    #[error("could not parse response: {0}")]
    Parse(String),

    /// Well-formed response without a single usable item
    #[error("the response contained no usable items")]
    Empty,
}

impl From<reqwest::Error> for ResponderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Parse(err.to_string())
        } else {
            Self::Network(err)
        }
    }
}
