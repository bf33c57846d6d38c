//! Error taxonomy for the registration endpoint.
//!
//! Three failure classes escalate to the caller; old-topic unsubscribe
//! failures are a fourth class that is logged and swallowed inside the
//! reconciliation routine and never appears here.

use skywarn_common::HttpStatusCode;
use thiserror::Error;

/// Errors that can occur while reconciling a registration
#[derive(Error, Debug)]
pub enum RegistrationError {
    /// Caller input malformed; rejected before any external effect
    #[error("{0}")]
    Validation(String),

    /// The mandatory new-topic subscribe call failed; nothing was persisted
    #[error("Subscription error: {0}")]
    Subscription(String),

    /// The store read failed, or the store write failed after a successful
    /// subscribe. In the latter case external topic state already reflects
    /// the new region; no compensating unsubscribe is attempted.
    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl HttpStatusCode for RegistrationError {
    fn status_code(&self) -> u16 {
        match self {
            RegistrationError::Validation(_) => 422,
            RegistrationError::Subscription(_) => 500,
            RegistrationError::Persistence(_) => 500,
        }
    }
}
