use axum::{routing::post, Router};
use std::sync::Arc;
use tracing::info;

use crate::handlers::{register_handler, RegistrationState};

/// Create the FCM registration routes
///
/// This function creates a router with the registration endpoint. The caller
/// provides the messaging and store capabilities through
/// [`RegistrationState`]; production wires in the Firebase and Firestore
/// clients, tests substitute fakes.
///
/// # Arguments
///
/// * `state` - The injected messaging and store capabilities
///
/// # Returns
///
/// An axum router with the registration endpoint
pub fn routes(state: Arc<RegistrationState>) -> Router {
    info!("FCM registration routes initialized");

    Router::new()
        .route("/fcm/register", post(register_handler))
        .with_state(state)
}
