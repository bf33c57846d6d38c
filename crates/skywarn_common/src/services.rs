// --- File: crates/skywarn_common/src/services.rs ---
//! Service abstractions for external services.
//!
//! This module provides trait definitions for the two hosted capabilities the
//! application consumes: the push-messaging platform (topic membership and
//! topic publishes) and the document store holding subscription records.
//! These traits allow for dependency injection and easier testing by
//! decoupling the reconciliation logic from specific implementations.

use std::error::Error as StdError;
use std::fmt;
use std::future::Future;
use std::pin::Pin;

use crate::models::SubscriptionRecord;

/// Type alias for a boxed future that returns a Result
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// A wrapper error type that implements std::error::Error for Box<dyn std::error::Error + Send + Sync>
#[derive(Debug)]
pub struct BoxedError(pub Box<dyn StdError + Send + Sync>);

impl fmt::Display for BoxedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl StdError for BoxedError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.0.source()
    }
}

impl From<Box<dyn StdError + Send + Sync>> for BoxedError {
    fn from(err: Box<dyn StdError + Send + Sync>) -> Self {
        BoxedError(err)
    }
}

/// A trait for topic-based push messaging operations.
///
/// This trait defines the operations the application performs against the
/// push-messaging platform: managing the topic membership of a device token
/// and publishing a notification to a topic.
pub trait TopicMessagingService: Send + Sync {
    /// Error type returned by messaging operations.
    type Error: StdError + Send + Sync + 'static;

    /// Add a device token to a topic.
    fn subscribe_to_topic(&self, token: &str, topic: &str) -> BoxFuture<'_, (), Self::Error>;

    /// Remove a device token from a topic.
    fn unsubscribe_from_topic(&self, token: &str, topic: &str) -> BoxFuture<'_, (), Self::Error>;

    /// Publish a title/body notification to every device subscribed to a
    /// topic. Returns the platform-assigned message id.
    fn send_to_topic(
        &self,
        topic: &str,
        title: &str,
        body: &str,
    ) -> BoxFuture<'_, String, Self::Error>;
}

/// A trait for the document store holding subscription records.
///
/// The store is keyed by user id and exposes exactly the two operations the
/// reconciliation routine needs: read the previous record and overwrite it.
/// Single-document read-then-write consistency is delegated to the backing
/// store.
pub trait SubscriptionStore: Send + Sync {
    /// Error type returned by store operations.
    type Error: StdError + Send + Sync + 'static;

    /// Fetch the subscription record for a user, if one exists.
    fn find_subscription(
        &self,
        uid: &str,
    ) -> BoxFuture<'_, Option<SubscriptionRecord>, Self::Error>;

    /// Persist a subscription record, unconditionally overwriting any prior
    /// record for the same user.
    fn save_subscription(&self, record: SubscriptionRecord) -> BoxFuture<'_, (), Self::Error>;
}
