//! Topic reconciliation routine.
//!
//! Given a user's previously stored `(token, township)` pair and a newly
//! submitted one, this module brings the messaging platform's topic
//! membership in line with the new state and persists it, using the minimum
//! number of subscribe/unsubscribe operations.
//!
//! Ordering matters: the old membership is removed before the new one is
//! established, and the record is only written after the new subscribe
//! succeeded. An unsubscribe failure (the old token is often already invalid)
//! is logged and swallowed; a subscribe failure aborts the operation with
//! nothing persisted.

use tracing::{debug, info, warn};

use skywarn_common::models::{token_preview, weather_topic, SubscriptionRecord};
use skywarn_common::services::{SubscriptionStore, TopicMessagingService};

use crate::error::RegistrationError;

/// A newly submitted registration.
#[derive(Debug, Clone)]
pub struct RegistrationInput {
    pub uid: String,
    pub fcm_token: String,
    /// Township short code; `None` (or empty, normalized away) means the
    /// user has not selected a region.
    pub township_code: Option<String>,
}

/// What the reconciliation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Topic membership was reconciled and the record was overwritten
    Updated,
    /// The submitted state matched the stored state; nothing was touched
    Unchanged,
}

/// Reconciles a registration against the stored subscription state.
///
/// Steps, in order:
/// 1. Reject empty `uid`/`fcm_token` before any external call.
/// 2. Read the existing record. If it matches the submitted state exactly,
///    return [`ReconcileOutcome::Unchanged`] without touching anything.
/// 3. Best-effort unsubscribe of the old token from the old township topic.
/// 4. Mandatory subscribe of the new token to the new township topic, when a
///    township is selected.
/// 5. Overwrite the stored record.
///
/// # Errors
///
/// * [`RegistrationError::Validation`] when `uid` or `fcm_token` is empty.
/// * [`RegistrationError::Subscription`] when step 4 fails.
/// * [`RegistrationError::Persistence`] when the store read or write fails.
pub async fn reconcile_registration<M, S>(
    messaging: &M,
    store: &S,
    input: RegistrationInput,
) -> Result<ReconcileOutcome, RegistrationError>
where
    M: TopicMessagingService + ?Sized,
    S: SubscriptionStore + ?Sized,
{
    if input.uid.is_empty() || input.fcm_token.is_empty() {
        return Err(RegistrationError::Validation(
            "uid and fcmToken are required.".to_string(),
        ));
    }

    // An empty township string means "no region selected", same as absent.
    let township_code = input.township_code.filter(|code| !code.is_empty());

    let existing = store
        .find_subscription(&input.uid)
        .await
        .map_err(|e| RegistrationError::Persistence(e.to_string()))?;

    if let Some(record) = existing.as_ref() {
        if record.subscription_pair() == (input.fcm_token.as_str(), township_code.as_deref()) {
            debug!(
                uid = %input.uid,
                "submitted state matches stored record, skipping reconciliation"
            );
            return Ok(ReconcileOutcome::Unchanged);
        }
    }

    if let Some(record) = existing.as_ref() {
        if let Some(old_code) = record.township_code.as_deref() {
            let old_topic = weather_topic(old_code);
            match messaging
                .unsubscribe_from_topic(&record.fcm_token, &old_topic)
                .await
            {
                Ok(()) => debug!(
                    topic = %old_topic,
                    token = token_preview(&record.fcm_token),
                    "unsubscribed previous token"
                ),
                // The old token is frequently stale; its removal must not
                // block establishing the new subscription.
                Err(e) => warn!(
                    topic = %old_topic,
                    token = token_preview(&record.fcm_token),
                    error = %e,
                    "failed to unsubscribe previous token, continuing"
                ),
            }
        }
    }

    if let Some(code) = township_code.as_deref() {
        let topic = weather_topic(code);
        messaging
            .subscribe_to_topic(&input.fcm_token, &topic)
            .await
            .map_err(|e| RegistrationError::Subscription(e.to_string()))?;
        info!(
            topic = %topic,
            token = token_preview(&input.fcm_token),
            "subscribed token to township topic"
        );
    }

    let record = SubscriptionRecord::new(input.uid, input.fcm_token, township_code);
    store
        .save_subscription(record)
        .await
        .map_err(|e| RegistrationError::Persistence(e.to_string()))?;

    Ok(ReconcileOutcome::Updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use skywarn_common::services::BoxFuture;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use thiserror::Error;

    #[derive(Debug, Error)]
    #[error("{0}")]
    struct FakeError(String);

    /// Messaging fake that records every call in order.
    #[derive(Default)]
    struct FakeMessaging {
        calls: Mutex<Vec<String>>,
        fail_subscribe: bool,
        fail_unsubscribe: bool,
    }

    impl FakeMessaging {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl TopicMessagingService for FakeMessaging {
        type Error = FakeError;

        fn subscribe_to_topic(&self, token: &str, topic: &str) -> BoxFuture<'_, (), FakeError> {
            let call = format!("subscribe:{}:{}", token, topic);
            Box::pin(async move {
                self.calls.lock().unwrap().push(call);
                if self.fail_subscribe {
                    Err(FakeError("subscribe rejected".to_string()))
                } else {
                    Ok(())
                }
            })
        }

        fn unsubscribe_from_topic(&self, token: &str, topic: &str) -> BoxFuture<'_, (), FakeError> {
            let call = format!("unsubscribe:{}:{}", token, topic);
            Box::pin(async move {
                self.calls.lock().unwrap().push(call);
                if self.fail_unsubscribe {
                    Err(FakeError("token already invalid".to_string()))
                } else {
                    Ok(())
                }
            })
        }

        fn send_to_topic(
            &self,
            _topic: &str,
            _title: &str,
            _body: &str,
        ) -> BoxFuture<'_, String, FakeError> {
            Box::pin(async move { Ok("unused".to_string()) })
        }
    }

    /// In-memory store fake counting reads and writes.
    #[derive(Default)]
    struct FakeStore {
        records: Mutex<HashMap<String, SubscriptionRecord>>,
        reads: Mutex<usize>,
        writes: Mutex<usize>,
        fail_save: bool,
    }

    impl FakeStore {
        fn seeded(record: SubscriptionRecord) -> Self {
            let store = Self::default();
            store
                .records
                .lock()
                .unwrap()
                .insert(record.uid.clone(), record);
            store
        }

        fn record(&self, uid: &str) -> Option<SubscriptionRecord> {
            self.records.lock().unwrap().get(uid).cloned()
        }

        fn reads(&self) -> usize {
            *self.reads.lock().unwrap()
        }

        fn writes(&self) -> usize {
            *self.writes.lock().unwrap()
        }
    }

    impl SubscriptionStore for FakeStore {
        type Error = FakeError;

        fn find_subscription(
            &self,
            uid: &str,
        ) -> BoxFuture<'_, Option<SubscriptionRecord>, FakeError> {
            let uid = uid.to_string();
            Box::pin(async move {
                *self.reads.lock().unwrap() += 1;
                Ok(self.records.lock().unwrap().get(&uid).cloned())
            })
        }

        fn save_subscription(
            &self,
            record: SubscriptionRecord,
        ) -> BoxFuture<'_, (), FakeError> {
            Box::pin(async move {
                *self.writes.lock().unwrap() += 1;
                if self.fail_save {
                    return Err(FakeError("write rejected".to_string()));
                }
                self.records
                    .lock()
                    .unwrap()
                    .insert(record.uid.clone(), record);
                Ok(())
            })
        }
    }

    fn input(uid: &str, token: &str, township: Option<&str>) -> RegistrationInput {
        RegistrationInput {
            uid: uid.to_string(),
            fcm_token: token.to_string(),
            township_code: township.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn empty_uid_is_rejected_before_any_external_call() {
        let messaging = FakeMessaging::default();
        let store = FakeStore::default();

        let err = reconcile_registration(&messaging, &store, input("", "tok", None))
            .await
            .expect_err("empty uid must fail");

        assert!(matches!(err, RegistrationError::Validation(_)));
        assert!(messaging.calls().is_empty());
        assert_eq!(store.reads(), 0);
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn empty_token_is_rejected_before_any_external_call() {
        let messaging = FakeMessaging::default();
        let store = FakeStore::default();

        let err = reconcile_registration(&messaging, &store, input("u1", "", Some("TPE-100")))
            .await
            .expect_err("empty token must fail");

        assert!(matches!(err, RegistrationError::Validation(_)));
        assert!(messaging.calls().is_empty());
        assert_eq!(store.reads(), 0);
    }

    #[tokio::test]
    async fn first_registration_subscribes_and_persists() {
        let messaging = FakeMessaging::default();
        let store = FakeStore::default();

        let outcome = reconcile_registration(
            &messaging,
            &store,
            input("u1", "tok-abc", Some("TPE-100")),
        )
        .await
        .expect("registration should succeed");

        assert_eq!(outcome, ReconcileOutcome::Updated);
        assert_eq!(
            messaging.calls(),
            vec!["subscribe:tok-abc:weather_TPE-100".to_string()]
        );
        assert_eq!(store.writes(), 1);

        let record = store.record("u1").expect("record should be created");
        assert_eq!(record.fcm_token, "tok-abc");
        assert_eq!(record.township_code.as_deref(), Some("TPE-100"));
        assert!(record.last_updated.is_some());
    }

    #[tokio::test]
    async fn first_registration_without_township_only_persists() {
        let messaging = FakeMessaging::default();
        let store = FakeStore::default();

        let outcome = reconcile_registration(&messaging, &store, input("u1", "tok-abc", None))
            .await
            .expect("registration should succeed");

        assert_eq!(outcome, ReconcileOutcome::Updated);
        assert!(messaging.calls().is_empty());
        let record = store.record("u1").expect("record should be created");
        assert!(record.township_code.is_none());
    }

    #[tokio::test]
    async fn township_change_moves_the_subscription_in_order() {
        let messaging = FakeMessaging::default();
        let store = FakeStore::seeded(SubscriptionRecord::new(
            "u1".into(),
            "tokenA".into(),
            Some("TPE-100".into()),
        ));

        let outcome = reconcile_registration(
            &messaging,
            &store,
            input("u1", "tokenA", Some("TPE-200")),
        )
        .await
        .expect("registration should succeed");

        assert_eq!(outcome, ReconcileOutcome::Updated);
        assert_eq!(
            messaging.calls(),
            vec![
                "unsubscribe:tokenA:weather_TPE-100".to_string(),
                "subscribe:tokenA:weather_TPE-200".to_string(),
            ]
        );
        let record = store.record("u1").unwrap();
        assert_eq!(record.township_code.as_deref(), Some("TPE-200"));
    }

    #[tokio::test]
    async fn token_rotation_resubscribes_the_new_token() {
        let messaging = FakeMessaging::default();
        let store = FakeStore::seeded(SubscriptionRecord::new(
            "u1".into(),
            "tokenA".into(),
            Some("TPE-100".into()),
        ));

        reconcile_registration(&messaging, &store, input("u1", "tokenB", Some("TPE-100")))
            .await
            .expect("registration should succeed");

        assert_eq!(
            messaging.calls(),
            vec![
                "unsubscribe:tokenA:weather_TPE-100".to_string(),
                "subscribe:tokenB:weather_TPE-100".to_string(),
            ]
        );
        assert_eq!(store.record("u1").unwrap().fcm_token, "tokenB");
    }

    #[tokio::test]
    async fn identical_resubmission_is_a_no_op() {
        let messaging = FakeMessaging::default();
        let store = FakeStore::seeded(SubscriptionRecord::new(
            "u1".into(),
            "tok-abc".into(),
            Some("TPE-100".into()),
        ));

        let outcome = reconcile_registration(
            &messaging,
            &store,
            input("u1", "tok-abc", Some("TPE-100")),
        )
        .await
        .expect("no-op should succeed");

        assert_eq!(outcome, ReconcileOutcome::Unchanged);
        assert!(messaging.calls().is_empty());
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn identical_resubmission_without_township_is_a_no_op() {
        let messaging = FakeMessaging::default();
        let store = FakeStore::seeded(SubscriptionRecord::new(
            "u1".into(),
            "tok-abc".into(),
            None,
        ));

        let outcome = reconcile_registration(&messaging, &store, input("u1", "tok-abc", None))
            .await
            .expect("no-op should succeed");

        assert_eq!(outcome, ReconcileOutcome::Unchanged);
        assert!(messaging.calls().is_empty());
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn subscribe_failure_aborts_without_persisting() {
        let messaging = FakeMessaging {
            fail_subscribe: true,
            ..Default::default()
        };
        let store = FakeStore::seeded(SubscriptionRecord::new(
            "u1".into(),
            "tokenA".into(),
            Some("TPE-100".into()),
        ));

        let err = reconcile_registration(
            &messaging,
            &store,
            input("u1", "tokenA", Some("TPE-200")),
        )
        .await
        .expect_err("subscribe failure must abort");

        assert!(matches!(err, RegistrationError::Subscription(_)));
        assert_eq!(store.writes(), 0);
        // Stored record still reflects the prior state
        let record = store.record("u1").unwrap();
        assert_eq!(record.township_code.as_deref(), Some("TPE-100"));
    }

    #[tokio::test]
    async fn unsubscribe_failure_is_swallowed() {
        let messaging = FakeMessaging {
            fail_unsubscribe: true,
            ..Default::default()
        };
        let store = FakeStore::seeded(SubscriptionRecord::new(
            "u1".into(),
            "tokenA".into(),
            Some("TPE-100".into()),
        ));

        let outcome = reconcile_registration(
            &messaging,
            &store,
            input("u1", "tokenA", Some("TPE-200")),
        )
        .await
        .expect("unsubscribe failure must not abort");

        assert_eq!(outcome, ReconcileOutcome::Updated);
        let record = store.record("u1").unwrap();
        assert_eq!(record.township_code.as_deref(), Some("TPE-200"));
    }

    #[tokio::test]
    async fn save_failure_surfaces_as_persistence_error() {
        let messaging = FakeMessaging::default();
        let store = FakeStore {
            fail_save: true,
            ..Default::default()
        };

        let err = reconcile_registration(
            &messaging,
            &store,
            input("u1", "tok-abc", Some("TPE-100")),
        )
        .await
        .expect_err("save failure must surface");

        assert!(matches!(err, RegistrationError::Persistence(_)));
        // The subscribe already happened; no compensating unsubscribe
        assert_eq!(
            messaging.calls(),
            vec!["subscribe:tok-abc:weather_TPE-100".to_string()]
        );
    }

    #[tokio::test]
    async fn clearing_the_township_unsubscribes_and_persists_null() {
        let messaging = FakeMessaging::default();
        let store = FakeStore::seeded(SubscriptionRecord::new(
            "u1".into(),
            "tok-abc".into(),
            Some("TPE-100".into()),
        ));

        let outcome = reconcile_registration(&messaging, &store, input("u1", "tok-abc", None))
            .await
            .expect("clearing should succeed");

        assert_eq!(outcome, ReconcileOutcome::Updated);
        assert_eq!(
            messaging.calls(),
            vec!["unsubscribe:tok-abc:weather_TPE-100".to_string()]
        );
        assert!(store.record("u1").unwrap().township_code.is_none());
    }

    #[tokio::test]
    async fn empty_township_string_is_treated_as_none() {
        let messaging = FakeMessaging::default();
        let store = FakeStore::default();

        reconcile_registration(&messaging, &store, input("u1", "tok-abc", Some("")))
            .await
            .expect("registration should succeed");

        assert!(messaging.calls().is_empty());
        assert!(store.record("u1").unwrap().township_code.is_none());
    }
}
