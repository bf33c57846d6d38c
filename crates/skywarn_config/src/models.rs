// --- File: crates/skywarn_config/src/models.rs ---

use serde::{Deserialize, Serialize};

// --- General Server Config ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

// --- CORS Config ---
// The registration endpoint is browser-facing; it only ever answers one
// configured web origin.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CorsConfig {
    pub allowed_origin: String, // e.g. https://taiwan-weather-alert.pages.dev
}

// --- Firebase Config ---
// Holds non-secret Firebase config. The service account key stays on disk
// and is referenced by path.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct FirebaseConfig {
    pub project_id: Option<String>,
    pub key_path: Option<String>, // path to the service account JSON
}

// --- Firestore Config ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FirestoreConfig {
    /// Collection holding one subscription document per user.
    #[serde(default = "default_collection")]
    pub collection: String,
}

fn default_collection() -> String {
    "fcmTokens".to_string()
}

impl Default for FirestoreConfig {
    fn default() -> Self {
        Self {
            collection: default_collection(),
        }
    }
}

// --- Unified App Configuration ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    // Server config is mandatory
    pub server: ServerConfig,

    // --- Optional Feature Configurations ---
    #[serde(default)]
    pub cors: Option<CorsConfig>,
    #[serde(default)]
    pub firebase: Option<FirebaseConfig>,
    #[serde(default)]
    pub firestore: Option<FirestoreConfig>,
}
