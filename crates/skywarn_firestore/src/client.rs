//! Firestore REST client module
//!
//! This module provides a client for reading and overwriting subscription
//! documents through the Firestore REST API. One document exists per user,
//! keyed by `uid`, in a single configured collection. A PATCH without an
//! update mask replaces the full document, matching the overwrite semantics
//! of the subscription record lifecycle.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use reqwest::{header, Client, StatusCode};
use serde::{Deserialize, Serialize};
use skywarn_common::models::SubscriptionRecord;
use skywarn_config::{FirebaseConfig, FirestoreConfig};
use thiserror::Error;
use tracing::debug;

use crate::auth::get_firestore_auth_token;

const FIRESTORE_ENDPOINT: &str = "https://firestore.googleapis.com";

/// Errors that can occur when interacting with the Firestore REST API
#[derive(Error, Debug)]
pub enum FirestoreError {
    /// Error during authentication with Google
    #[error("Authentication error: {0}")]
    AuthError(String),

    /// Error during HTTP request to the Firestore API
    #[error("HTTP request error: {0}")]
    RequestError(#[from] reqwest::Error),

    /// Missing required configuration
    #[error("Missing configuration: {0}")]
    ConfigError(String),

    /// Error returned by the Firestore API
    #[error("Firestore API error: {0}")]
    ApiError(String),
}

/// A single Firestore field value.
///
/// Only the value kinds the subscription document uses are modelled; unknown
/// kinds in responses are ignored.
#[derive(Debug, Default, Serialize, Deserialize)]
struct FirestoreValue {
    #[serde(rename = "stringValue", skip_serializing_if = "Option::is_none")]
    string_value: Option<String>,

    #[serde(rename = "nullValue", skip_serializing_if = "Option::is_none")]
    null_value: Option<()>,

    #[serde(rename = "timestampValue", skip_serializing_if = "Option::is_none")]
    timestamp_value: Option<DateTime<Utc>>,
}

impl FirestoreValue {
    fn string(value: &str) -> Self {
        Self {
            string_value: Some(value.to_string()),
            ..Default::default()
        }
    }

    fn null() -> Self {
        Self {
            null_value: Some(()),
            ..Default::default()
        }
    }

    fn timestamp(value: DateTime<Utc>) -> Self {
        Self {
            timestamp_value: Some(value),
            ..Default::default()
        }
    }
}

/// A Firestore document body. The `name`, `createTime` and `updateTime`
/// attributes of responses are not needed and left unmodelled.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Document {
    #[serde(default)]
    fields: HashMap<String, FirestoreValue>,
}

impl Document {
    fn from_record(record: &SubscriptionRecord) -> Self {
        let mut fields = HashMap::new();
        fields.insert("uid".to_string(), FirestoreValue::string(&record.uid));
        fields.insert(
            "fcmToken".to_string(),
            FirestoreValue::string(&record.fcm_token),
        );
        fields.insert(
            "townshipCode".to_string(),
            match record.township_code.as_deref() {
                Some(code) => FirestoreValue::string(code),
                None => FirestoreValue::null(),
            },
        );
        fields.insert(
            "lastUpdated".to_string(),
            FirestoreValue::timestamp(record.last_updated.unwrap_or_else(Utc::now)),
        );
        Self { fields }
    }

    fn into_record(mut self) -> Result<SubscriptionRecord, FirestoreError> {
        let mut take_string = |key: &str| {
            self.fields
                .remove(key)
                .and_then(|value| value.string_value)
        };

        let uid = take_string("uid");
        let fcm_token = take_string("fcmToken");
        let township_code = take_string("townshipCode");
        let last_updated = self
            .fields
            .remove("lastUpdated")
            .and_then(|value| value.timestamp_value);

        match (uid, fcm_token) {
            (Some(uid), Some(fcm_token)) => Ok(SubscriptionRecord {
                uid,
                fcm_token,
                township_code,
                last_updated,
            }),
            _ => Err(FirestoreError::ApiError(
                "subscription document is missing uid or fcmToken".to_string(),
            )),
        }
    }
}

/// Client for the Firestore REST API
pub struct FirestoreClient {
    client: Client,
    config: FirebaseConfig,
    collection: String,
    endpoint: String,
}

impl FirestoreClient {
    /// Creates a new Firestore client with the given configuration
    pub fn new(config: FirebaseConfig, firestore: FirestoreConfig) -> Self {
        Self {
            client: Client::new(),
            config,
            collection: firestore.collection,
            endpoint: FIRESTORE_ENDPOINT.to_string(),
        }
    }

    /// Reads the subscription document for a user.
    ///
    /// Returns `Ok(None)` when no document exists for the user.
    pub async fn get_subscription(
        &self,
        uid: &str,
    ) -> Result<Option<SubscriptionRecord>, FirestoreError> {
        let access_token = self.access_token().await?;
        self.get_subscription_with_token(&access_token, uid).await
    }

    /// Overwrites the subscription document for a user.
    pub async fn set_subscription(
        &self,
        record: &SubscriptionRecord,
    ) -> Result<(), FirestoreError> {
        let access_token = self.access_token().await?;
        self.set_subscription_with_token(&access_token, record).await
    }

    async fn access_token(&self) -> Result<String, FirestoreError> {
        get_firestore_auth_token(&self.config)
            .await
            .map_err(|e| FirestoreError::AuthError(e.to_string()))
    }

    fn document_url(&self, uid: &str) -> Result<String, FirestoreError> {
        let project_id = self.config.project_id.as_deref().ok_or_else(|| {
            FirestoreError::ConfigError("Missing project_id in FirebaseConfig".to_string())
        })?;

        Ok(format!(
            "{}/v1/projects/{}/databases/(default)/documents/{}/{}",
            self.endpoint, project_id, self.collection, uid
        ))
    }

    async fn get_subscription_with_token(
        &self,
        access_token: &str,
        uid: &str,
    ) -> Result<Option<SubscriptionRecord>, FirestoreError> {
        let url = self.document_url(uid)?;

        debug!(uid, "reading subscription document");

        let response = self
            .client
            .get(&url)
            .header(header::AUTHORIZATION, format!("Bearer {}", access_token))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(FirestoreError::ApiError(error_text));
        }

        let document: Document = response.json().await?;
        document.into_record().map(Some)
    }

    async fn set_subscription_with_token(
        &self,
        access_token: &str,
        record: &SubscriptionRecord,
    ) -> Result<(), FirestoreError> {
        let url = self.document_url(&record.uid)?;
        let document = Document::from_record(record);

        debug!(uid = %record.uid, "writing subscription document");

        let response = self
            .client
            .patch(&url)
            .header(header::AUTHORIZATION, format!("Bearer {}", access_token))
            .json(&document)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(FirestoreError::ApiError(error_text));
        }

        Ok(())
    }
}
