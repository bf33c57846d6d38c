//! Authentication module for Firebase Cloud Messaging
//!
//! This module provides functionality to authenticate with Firebase Cloud
//! Messaging using a service account key file. It generates OAuth2 tokens
//! that are attached to API requests against the FCM and Instance ID APIs.

use skywarn_config::FirebaseConfig;
use std::{error::Error, path::Path};
use yup_oauth2::{read_service_account_key, ServiceAccountAuthenticator};

/// Obtains an OAuth2 access token for Firebase Cloud Messaging.
///
/// This function reads the service account key file from the path specified
/// in the FirebaseConfig and uses it to authenticate with Google's OAuth2
/// service.
///
/// # Errors
///
/// This function will return an error if:
/// * The key_path is missing from the FirebaseConfig
/// * The service account key file cannot be read
/// * Authentication with Google's OAuth2 service fails
/// * No token is returned from the authentication service
pub async fn get_firebase_auth_token(
    config: &FirebaseConfig,
) -> Result<String, Box<dyn Error + Send + Sync>> {
    let key_path = config
        .key_path
        .as_deref()
        .ok_or("Missing key_path in FirebaseConfig")?;

    let sa_key = read_service_account_key(Path::new(key_path)).await?;

    let auth = ServiceAccountAuthenticator::builder(sa_key).build().await?;

    // Both messages:send and the Instance ID batch endpoints accept the
    // firebase.messaging scope
    let auth_token = auth
        .token(&["https://www.googleapis.com/auth/firebase.messaging"])
        .await?;
    let access_token = match auth_token.token() {
        Some(token) => token,
        None => {
            return Err("No token available".into());
        }
    };

    Ok(access_token.to_string())
}
