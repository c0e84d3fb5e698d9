//! Lockout and session timing policy.

use crate::auth::error::PolicyError;
use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Longest accepted lockout or timeout, about a century.
const MAX_DURATION_SECS: u64 = 100 * 365 * 24 * 60 * 60;

fn clamped(secs: u64) -> Duration {
    Duration::seconds(secs.min(MAX_DURATION_SECS) as i64)
}

fn default_max_attempts() -> u32 {
    5
}

fn default_lockout_secs() -> u64 {
    15 * 60
}

fn default_session_timeout_secs() -> u64 {
    30 * 60
}

/// Tunables of the authentication machine.
///
/// Every field has a default, so `{}` is a valid policy document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthPolicy {
    /// Failed logins allowed before the account locks.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// How long a lock lasts.
    #[serde(default = "default_lockout_secs")]
    pub lockout_secs: u64,

    /// Inactivity after which a session is stale.
    #[serde(default = "default_session_timeout_secs")]
    pub session_timeout_secs: u64,
}

impl Default for AuthPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            lockout_secs: default_lockout_secs(),
            session_timeout_secs: default_session_timeout_secs(),
        }
    }
}

impl AuthPolicy {
    /// Parse and validate a JSON policy document.
    pub fn from_json_str(json: &str) -> Result<Self, PolicyError> {
        let policy: Self =
            serde_json::from_str(json).map_err(|e| PolicyError::Parse(e.to_string()))?;
        policy.validate()
    }

    pub fn validate(self) -> Result<Self, PolicyError> {
        if self.max_attempts == 0 {
            return Err(PolicyError::Invalid("max_attempts must be at least 1".into()));
        }
        if self.session_timeout_secs == 0 {
            return Err(PolicyError::Invalid(
                "session_timeout_secs must be positive".into(),
            ));
        }
        if self.lockout_secs.max(self.session_timeout_secs) > MAX_DURATION_SECS {
            return Err(PolicyError::Invalid("durations are out of range".into()));
        }
        Ok(self)
    }

    pub fn lockout(&self) -> Duration {
        clamped(self.lockout_secs)
    }

    pub fn session_timeout(&self) -> Duration {
        clamped(self.session_timeout_secs)
    }

    /// Whether the failure that brings the counter from `attempts` to
    /// `attempts + 1` locks the account.
    pub fn locks_after(&self, attempts: u32) -> bool {
        attempts.saturating_add(1) >= self.max_attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let policy = AuthPolicy::default();
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.lockout(), Duration::minutes(15));
        assert_eq!(policy.session_timeout(), Duration::minutes(30));
    }

    #[test]
    fn empty_document_uses_defaults() {
        assert_eq!(AuthPolicy::from_json_str("{}"), Ok(AuthPolicy::default()));
    }

    #[test]
    fn partial_document_overrides_named_fields() {
        let policy = AuthPolicy::from_json_str(r#"{"max_attempts": 3}"#).unwrap();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.lockout_secs, 900);
    }

    #[test]
    fn invalid_documents_are_rejected() {
        assert!(matches!(
            AuthPolicy::from_json_str(r#"{"max_attempts": 0}"#),
            Err(PolicyError::Invalid(_))
        ));
        assert!(matches!(
            AuthPolicy::from_json_str("[1, 2]"),
            Err(PolicyError::Parse(_))
        ));
    }

    #[test]
    fn fifth_failure_locks_by_default() {
        let policy = AuthPolicy::default();
        assert!(!policy.locks_after(3));
        assert!(policy.locks_after(4));
        assert!(policy.locks_after(u32::MAX));
    }
}
