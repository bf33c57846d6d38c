//! HTTP handlers for the FCM registration endpoint
//!
//! This module provides the axum handler behind `POST /fcm/register`,
//! together with the request and response types it speaks. The handler owns
//! the HTTP contract (status codes, exact error strings); all reconciliation
//! decisions live in [`crate::logic`].

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info};

use skywarn_common::models::token_preview;
use skywarn_common::services::{BoxedError, SubscriptionStore, TopicMessagingService};
use skywarn_common::HttpStatusCode;

use crate::error::RegistrationError;
use crate::logic::{reconcile_registration, ReconcileOutcome, RegistrationInput};

/// Shared state for the registration handlers
///
/// Holds the two injected capabilities the reconciliation routine needs.
#[derive(Clone)]
pub struct RegistrationState {
    /// Topic membership and publishing
    pub messaging: Arc<dyn TopicMessagingService<Error = BoxedError>>,
    /// Per-user subscription records
    pub store: Arc<dyn SubscriptionStore<Error = BoxedError>>,
}

/// Request body for registering a device token
///
/// `uid` and `fcmToken` are required; `townshipCode` is optional and may be
/// null when the user has not selected a region. The required fields are
/// modelled as options so their absence produces the endpoint's own 422
/// response instead of a deserialization rejection.
#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RegisterRequest {
    /// The user ID to associate with the registration
    pub uid: Option<String>,

    /// The Firebase Cloud Messaging device token
    #[serde(rename = "fcmToken")]
    pub fcm_token: Option<String>,

    /// Short code of the township to receive alerts for
    #[serde(rename = "townshipCode")]
    pub township_code: Option<String>,
}

/// Success body for the registration endpoint
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RegisterResponse {
    pub message: String,
}

/// Error body returned for every failed registration
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ErrorResponse {
    pub error: String,
}

/// Handler for registering a device token and reconciling its topic
/// subscription
///
/// # Responses
///
/// - 200 OK: membership reconciled (or already up to date) and record stored
/// - 422 Unprocessable Entity: `uid` or `fcmToken` missing or empty
/// - 500 Internal Server Error: subscribe or persistence failure
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/api/fcm/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Registration reconciled", body = RegisterResponse),
        (status = 422, description = "Missing uid or fcmToken", body = ErrorResponse),
        (status = 500, description = "Subscription or persistence failure", body = ErrorResponse)
    ),
    tag = "FCM"
))]
pub async fn register_handler(
    State(state): State<Arc<RegistrationState>>,
    Json(payload): Json<RegisterRequest>,
) -> Response {
    let input = RegistrationInput {
        uid: payload.uid.unwrap_or_default(),
        fcm_token: payload.fcm_token.unwrap_or_default(),
        township_code: payload.township_code,
    };

    debug!(
        uid = %input.uid,
        token = token_preview(&input.fcm_token),
        township = ?input.township_code,
        "received registration request"
    );

    match reconcile_registration(state.messaging.as_ref(), state.store.as_ref(), input).await {
        Ok(outcome) => {
            let message = match outcome {
                ReconcileOutcome::Updated => {
                    "FCM registration and topic subscription updated successfully"
                }
                ReconcileOutcome::Unchanged => "FCM registration already up to date",
            };
            info!(?outcome, "registration handled");
            Json(RegisterResponse {
                message: message.to_string(),
            })
            .into_response()
        }
        Err(err) => {
            error!("Failed to handle registration: {:?}", err);
            let status = StatusCode::from_u16(err.status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            let error = match &err {
                // The validation message is the response body verbatim
                RegistrationError::Validation(message) => message.clone(),
                _ => format!("FCM registration failed: {}", err),
            };
            (status, Json(ErrorResponse { error })).into_response()
        }
    }
}
