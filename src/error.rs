//! Error taxonomy for the two relays.
//!
//! Each relay fails in one of two ways: the caller sent something unusable
//! (400), or a downstream service failed (500). The HTTP layer turns these
//! into fixed, human-readable bodies; the underlying cause is only logged.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelayError {
    /// Missing or malformed input. The message is safe to show to the caller.
    #[error("{0}")]
    InvalidInput(String),

    /// A downstream service (SMTP, intent detection) failed.
    #[error("downstream failure: {0:#}")]
    Downstream(#[from] anyhow::Error),
}

impl RelayError {
    pub fn invalid(message: impl Into<String>) -> Self {
        RelayError::InvalidInput(message.into())
    }

    pub fn is_client_error(&self) -> bool {
        matches!(self, RelayError::InvalidInput(_))
    }
}
