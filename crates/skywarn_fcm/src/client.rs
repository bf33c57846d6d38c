//! Firebase Cloud Messaging client module
//!
//! This module provides a client for the two Firebase surfaces the
//! application uses: the FCM HTTP v1 API (`messages:send`) for publishing a
//! notification to a topic, and the Instance ID API (`batchAdd` /
//! `batchRemove`) for managing the topic membership of a device token.
//!
//! The main component is the `FcmClient` struct, which handles
//! authentication and communication with both APIs.

use crate::auth::get_firebase_auth_token;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use skywarn_config::FirebaseConfig;
use thiserror::Error;
use tracing::debug;

const FCM_ENDPOINT: &str = "https://fcm.googleapis.com";
const IID_ENDPOINT: &str = "https://iid.googleapis.com";

/// Errors that can occur when interacting with the Firebase APIs
#[derive(Error, Debug)]
pub enum FcmError {
    /// Error during authentication with Firebase
    #[error("Authentication error: {0}")]
    AuthError(String),

    /// Error during HTTP request to a Firebase API
    #[error("HTTP request error: {0}")]
    RequestError(#[from] reqwest::Error),

    /// Missing required configuration
    #[error("Missing configuration: {0}")]
    ConfigError(String),

    /// Error returned by a Firebase API
    #[error("Firebase API error: {0}")]
    ApiError(String),

    /// Per-token error reported by the Instance ID batch API
    #[error("Topic membership error: {0}")]
    TopicError(String),
}

/// A message to be sent via Firebase Cloud Messaging
///
/// This is the top-level structure that wraps a Message object
/// according to the FCM HTTP v1 API format.
#[derive(Debug, Serialize)]
pub struct FcmMessage {
    /// The message payload
    pub message: Message,
}

/// The message payload for Firebase Cloud Messaging
///
/// Either `token` or `topic` identifies the target; the two are mutually
/// exclusive on the wire.
#[derive(Debug, Serialize)]
pub struct Message {
    /// Token identifying the target device (for single device targeting)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Topic that the target devices are subscribed to (for topic messaging)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,

    /// The notification to be displayed on the user's device
    pub notification: Option<Notification>,

    /// Custom key-value data to be sent with the message
    pub data: Option<std::collections::HashMap<String, String>>,
}

/// The title/body pair displayed on the user's device
#[derive(Debug, Serialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
}

impl FcmMessage {
    /// Builds the payload for a topic notification.
    pub fn to_topic(topic: &str, title: &str, body: &str) -> Self {
        Self {
            message: Message {
                token: None,
                topic: Some(topic.to_string()),
                notification: Some(Notification {
                    title: title.to_string(),
                    body: body.to_string(),
                }),
                data: None,
            },
        }
    }
}

/// Response from the FCM v1 send endpoint
#[derive(Debug, Deserialize)]
pub struct FcmResponse {
    /// "projects/{project_id}/messages/{message_id}"
    pub name: String,
}

/// Response from the Instance ID batch endpoints.
///
/// The batch endpoints return HTTP 200 even when individual tokens fail;
/// per-token failures appear as an `error` field in `results`.
#[derive(Debug, Deserialize)]
struct BatchResponse {
    #[serde(default)]
    results: Vec<BatchResult>,
}

#[derive(Debug, Deserialize)]
struct BatchResult {
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct BatchRequest {
    to: String,
    registration_tokens: Vec<String>,
}

/// Client for the Firebase Cloud Messaging and Instance ID APIs
///
/// This struct handles authentication and communication with both APIs. It
/// provides methods for publishing notifications to topics and for managing
/// the topic membership of device tokens.
pub struct FcmClient {
    /// HTTP client for making requests to the Firebase APIs
    client: Client,

    /// Configuration for Firebase, including project ID and service account key path
    config: FirebaseConfig,

    fcm_endpoint: String,
    iid_endpoint: String,
}

impl FcmClient {
    /// Creates a new Firebase client with the given configuration
    pub fn new(config: FirebaseConfig) -> Self {
        Self {
            client: Client::new(),
            config,
            fcm_endpoint: FCM_ENDPOINT.to_string(),
            iid_endpoint: IID_ENDPOINT.to_string(),
        }
    }

    /// Publishes a message via Firebase Cloud Messaging.
    ///
    /// # Errors
    ///
    /// Returns an error if the project_id is missing from the configuration,
    /// authentication fails, the HTTP request fails, or the FCM API returns
    /// an error response.
    pub async fn send_message(&self, message: FcmMessage) -> Result<String, FcmError> {
        let access_token = self.access_token().await?;
        self.send_message_with_token(&access_token, message).await
    }

    /// Adds a device token to a topic via the Instance ID batchAdd endpoint.
    pub async fn subscribe_to_topic(&self, token: &str, topic: &str) -> Result<(), FcmError> {
        let access_token = self.access_token().await?;
        self.batch_with_token(&access_token, "batchAdd", token, topic)
            .await
    }

    /// Removes a device token from a topic via the Instance ID batchRemove endpoint.
    pub async fn unsubscribe_from_topic(&self, token: &str, topic: &str) -> Result<(), FcmError> {
        let access_token = self.access_token().await?;
        self.batch_with_token(&access_token, "batchRemove", token, topic)
            .await
    }

    async fn access_token(&self) -> Result<String, FcmError> {
        get_firebase_auth_token(&self.config)
            .await
            .map_err(|e| FcmError::AuthError(e.to_string()))
    }

    async fn send_message_with_token(
        &self,
        access_token: &str,
        message: FcmMessage,
    ) -> Result<String, FcmError> {
        let project_id = self.config.project_id.as_deref().ok_or_else(|| {
            FcmError::ConfigError("Missing project_id in FirebaseConfig".to_string())
        })?;

        let url = format!(
            "{}/v1/projects/{}/messages:send",
            self.fcm_endpoint, project_id
        );

        let response = self
            .client
            .post(&url)
            .header(header::AUTHORIZATION, format!("Bearer {}", access_token))
            .json(&message)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(FcmError::ApiError(error_text));
        }

        let fcm_response: FcmResponse = response.json().await?;
        Ok(fcm_response.name)
    }

    async fn batch_with_token(
        &self,
        access_token: &str,
        operation: &str,
        token: &str,
        topic: &str,
    ) -> Result<(), FcmError> {
        let url = format!("{}/iid/v1:{}", self.iid_endpoint, operation);
        let request = BatchRequest {
            to: format!("/topics/{}", topic),
            registration_tokens: vec![token.to_string()],
        };

        debug!(operation, topic, "updating topic membership");

        let response = self
            .client
            .post(&url)
            .header(header::AUTHORIZATION, format!("Bearer {}", access_token))
            // Instance ID requires this header when authenticating with an
            // OAuth2 access token instead of a legacy server key
            .header("access_token_auth", "true")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(FcmError::ApiError(error_text));
        }

        let batch: BatchResponse = response.json().await?;
        if let Some(error) = batch.results.iter().find_map(|r| r.error.as_deref()) {
            return Err(FcmError::TopicError(error.to_string()));
        }

        Ok(())
    }
}
