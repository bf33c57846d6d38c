// --- File: crates/skywarn_common/src/models.rs ---

// This file contains data structures and models that are common across the application.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The stored association between a user and their push subscription.
///
/// One record exists per user. It always reflects the last accepted
/// registration, never a history: every successful registration overwrites
/// the previous record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionRecord {
    /// Stable user identity, used as the document key
    pub uid: String,

    /// Opaque device token issued by the push platform; rotates over the
    /// device's lifetime
    pub fcm_token: String,

    /// Short code of the subscribed township, or None when the user has not
    /// selected a region
    pub township_code: Option<String>,

    /// Timestamp of the last accepted registration
    pub last_updated: Option<DateTime<Utc>>,
}

impl SubscriptionRecord {
    /// Create a new subscription record stamped with the current time.
    pub fn new(uid: String, fcm_token: String, township_code: Option<String>) -> Self {
        Self {
            uid,
            fcm_token,
            township_code,
            last_updated: Some(Utc::now()),
        }
    }

    /// Returns the `(token, township)` pair used for reconciliation diffing.
    pub fn subscription_pair(&self) -> (&str, Option<&str>) {
        (self.fcm_token.as_str(), self.township_code.as_deref())
    }
}

/// Derives the broadcast topic name for a township code.
///
/// Topic naming is deterministic: `weather_<townshipCode>`. No topic exists
/// for users without a selected township.
pub fn weather_topic(township_code: &str) -> String {
    format!("weather_{}", township_code)
}

/// Checks that a township code matches the short-code pattern: three ASCII
/// letters, a hyphen, three ASCII digits (e.g. `TPE-100`).
///
/// The reconciliation routine itself accepts any non-empty string as a topic
/// key; this check belongs to callers that accept codes from user input.
pub fn is_valid_township_code(code: &str) -> bool {
    let bytes = code.as_bytes();
    bytes.len() == 7
        && bytes[..3].iter().all(|b| b.is_ascii_alphabetic())
        && bytes[3] == b'-'
        && bytes[4..].iter().all(|b| b.is_ascii_digit())
}

/// Returns a loggable prefix of a device token.
///
/// Tokens are credentials-adjacent and never land whole in logs; only the
/// first ten characters are shown.
pub fn token_preview(token: &str) -> &str {
    match token.char_indices().nth(10) {
        Some((idx, _)) => &token[..idx],
        None => token,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topic_name_is_derived_from_township_code() {
        assert_eq!(weather_topic("TPE-100"), "weather_TPE-100");
    }

    #[test]
    fn township_code_pattern_accepts_short_codes() {
        assert!(is_valid_township_code("TPE-100"));
        assert!(is_valid_township_code("khh-001"));
    }

    #[test]
    fn township_code_pattern_rejects_malformed_codes() {
        assert!(!is_valid_township_code(""));
        assert!(!is_valid_township_code("TPE100"));
        assert!(!is_valid_township_code("TP-1000"));
        assert!(!is_valid_township_code("TPE-10a"));
        assert!(!is_valid_township_code("TPE-1000"));
    }

    #[test]
    fn token_preview_truncates_long_tokens() {
        assert_eq!(token_preview("abcdefghijklmnop"), "abcdefghij");
        assert_eq!(token_preview("short"), "short");
    }

    #[test]
    fn new_record_is_stamped() {
        let record = SubscriptionRecord::new("u1".into(), "tok".into(), None);
        assert!(record.last_updated.is_some());
        assert_eq!(record.subscription_pair(), ("tok", None));
    }
}
