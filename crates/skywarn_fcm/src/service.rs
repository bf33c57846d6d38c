//! Firebase implementation of the topic messaging abstraction.
//!
//! This module adapts `FcmClient` to the `TopicMessagingService` trait so the
//! registration logic and the dispatcher only ever see the trait.

use std::sync::Arc;

use skywarn_common::services::{BoxFuture, BoxedError, TopicMessagingService};

use crate::client::{FcmClient, FcmMessage};

/// Firebase-backed topic messaging service.
pub struct FcmMessagingService {
    client: Arc<FcmClient>,
}

impl FcmMessagingService {
    /// Create a new messaging service around an FCM client.
    pub fn new(client: Arc<FcmClient>) -> Self {
        Self { client }
    }
}

impl TopicMessagingService for FcmMessagingService {
    type Error = BoxedError;

    fn subscribe_to_topic(&self, token: &str, topic: &str) -> BoxFuture<'_, (), Self::Error> {
        let token = token.to_string();
        let topic = topic.to_string();
        let client = self.client.clone();

        Box::pin(async move {
            client
                .subscribe_to_topic(&token, &topic)
                .await
                .map_err(|e| BoxedError(Box::new(e)))
        })
    }

    fn unsubscribe_from_topic(&self, token: &str, topic: &str) -> BoxFuture<'_, (), Self::Error> {
        let token = token.to_string();
        let topic = topic.to_string();
        let client = self.client.clone();

        Box::pin(async move {
            client
                .unsubscribe_from_topic(&token, &topic)
                .await
                .map_err(|e| BoxedError(Box::new(e)))
        })
    }

    fn send_to_topic(
        &self,
        topic: &str,
        title: &str,
        body: &str,
    ) -> BoxFuture<'_, String, Self::Error> {
        let message = FcmMessage::to_topic(topic, title, body);
        let client = self.client.clone();

        Box::pin(async move {
            client
                .send_message(message)
                .await
                .map_err(|e| BoxedError(Box::new(e)))
        })
    }
}
