// --- File: crates/services/skywarn_backend/src/service_factory.rs ---
//! Service construction for the backend binary.
//!
//! This module wires the concrete Firebase and Firestore clients into the
//! trait objects the registration routes expect. It is the only place in the
//! application that knows which implementations back the messaging and store
//! abstractions; everything downstream works against the traits.

use std::sync::Arc;

use skywarn_config::AppConfig;
use skywarn_fcm::{FcmClient, FcmMessagingService};
use skywarn_firestore::{FirestoreClient, FirestoreSubscriptionStore};
use skywarn_registration::RegistrationState;
use tracing::info;

/// Builds the registration state from configuration.
///
/// # Errors
///
/// Returns an error message when the `[firebase]` configuration section is
/// missing. An absent `[firestore]` section falls back to defaults (the
/// `fcmTokens` collection).
pub fn build_registration_state(config: &AppConfig) -> Result<Arc<RegistrationState>, String> {
    let firebase = config
        .firebase
        .clone()
        .ok_or_else(|| "missing [firebase] configuration".to_string())?;
    let firestore = config.firestore.clone().unwrap_or_default();

    info!("Initializing Firebase messaging and Firestore store");

    let messaging = FcmMessagingService::new(Arc::new(FcmClient::new(firebase.clone())));
    let store =
        FirestoreSubscriptionStore::new(Arc::new(FirestoreClient::new(firebase, firestore)));

    Ok(Arc::new(RegistrationState {
        messaging: Arc::new(messaging),
        store: Arc::new(store),
    }))
}
