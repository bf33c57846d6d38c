//! Firestore implementation of the subscription store abstraction.

use std::sync::Arc;

use skywarn_common::models::SubscriptionRecord;
use skywarn_common::services::{BoxFuture, BoxedError, SubscriptionStore};

use crate::client::FirestoreClient;

/// Firestore-backed subscription store.
pub struct FirestoreSubscriptionStore {
    client: Arc<FirestoreClient>,
}

impl FirestoreSubscriptionStore {
    /// Create a new subscription store around a Firestore client.
    pub fn new(client: Arc<FirestoreClient>) -> Self {
        Self { client }
    }
}

impl SubscriptionStore for FirestoreSubscriptionStore {
    type Error = BoxedError;

    fn find_subscription(
        &self,
        uid: &str,
    ) -> BoxFuture<'_, Option<SubscriptionRecord>, Self::Error> {
        let uid = uid.to_string();
        let client = self.client.clone();

        Box::pin(async move {
            client
                .get_subscription(&uid)
                .await
                .map_err(|e| BoxedError(Box::new(e)))
        })
    }

    fn save_subscription(&self, record: SubscriptionRecord) -> BoxFuture<'_, (), Self::Error> {
        let client = self.client.clone();

        Box::pin(async move {
            client
                .set_subscription(&record)
                .await
                .map_err(|e| BoxedError(Box::new(e)))
        })
    }
}
