// --- File: crates/skywarn_common/src/lib.rs ---

// Declare modules within this crate
pub mod error; // Error-to-HTTP-status plumbing
pub mod logging; // Logging utilities
pub mod models; // Data structures and models
pub mod services; // Service abstractions

// Re-export the most commonly used items for easier access
pub use error::HttpStatusCode;

pub use models::{token_preview, weather_topic, SubscriptionRecord};

pub use services::{BoxFuture, BoxedError, SubscriptionStore, TopicMessagingService};

pub use logging::{init, init_with_level};
