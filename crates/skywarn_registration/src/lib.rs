//! FCM registration endpoint for Skywarn
//!
//! This crate holds the one piece of actual logic in the system: the
//! idempotent topic-reconciliation routine that keeps a device token's topic
//! membership in line with the user's chosen township, and the axum handler
//! and routes exposing it as `POST /fcm/register`.
//!
//! The routine never talks to Firebase or Firestore directly; it receives a
//! `TopicMessagingService` and a `SubscriptionStore` so tests can substitute
//! in-memory fakes.

pub mod error;
#[cfg(feature = "openapi")]
pub mod doc;
pub mod handlers;
pub mod logic;
pub mod routes;

// Re-export the routes function to be used by the main backend service
pub use routes::routes;
pub use error::RegistrationError;
pub use handlers::RegistrationState;
pub use logic::{reconcile_registration, ReconcileOutcome, RegistrationInput};

#[cfg(feature = "openapi")]
pub mod openapi {
    pub use crate::doc::RegistrationApiDoc;
}
