//! Authentication context, its patch type and the persisted session.

use crate::core::Context;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Identity of an authenticated user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl AuthUser {
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Data carried by the authentication machine.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthContext {
    pub user: Option<AuthUser>,
    pub error: Option<String>,
    pub token: Option<String>,
    pub is_guest: bool,
    pub last_activity: Option<DateTime<Utc>>,
    pub attempts: u32,
    pub lock_until: Option<DateTime<Utc>>,
}

impl AuthContext {
    /// Whether the last recorded activity is younger than `timeout`.
    ///
    /// A context that never recorded activity is not valid.
    pub fn is_active_at(&self, now: DateTime<Utc>, timeout: Duration) -> bool {
        self.last_activity
            .is_some_and(|last| now.signed_duration_since(last) < timeout)
    }

    /// Whether a lock is still in force at `now`.
    pub fn is_locked_at(&self, now: DateTime<Utc>) -> bool {
        self.lock_until.is_some_and(|until| until > now)
    }

    /// The session to persist, when both a user and a token are present.
    pub fn session(&self) -> Option<Session> {
        Some(Session {
            user: self.user.clone()?,
            token: self.token.clone()?,
            last_activity: self.last_activity,
        })
    }
}

/// Partial update of an [`AuthContext`].
///
/// Each `Some` replaces the matching top-level field; `None` keeps it. For
/// optional fields the inner `Option` is the new value, so
/// `Some(None)` clears the field.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AuthPatch {
    pub user: Option<Option<AuthUser>>,
    pub error: Option<Option<String>>,
    pub token: Option<Option<String>>,
    pub is_guest: Option<bool>,
    pub last_activity: Option<Option<DateTime<Utc>>>,
    pub attempts: Option<u32>,
    pub lock_until: Option<Option<DateTime<Utc>>>,
}

impl AuthPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user(mut self, user: Option<AuthUser>) -> Self {
        self.user = Some(user);
        self
    }

    pub fn error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(Some(error.into()));
        self
    }

    pub fn clear_error(mut self) -> Self {
        self.error = Some(None);
        self
    }

    pub fn token(mut self, token: Option<String>) -> Self {
        self.token = Some(token);
        self
    }

    pub fn guest(mut self, is_guest: bool) -> Self {
        self.is_guest = Some(is_guest);
        self
    }

    pub fn active_at(mut self, at: DateTime<Utc>) -> Self {
        self.last_activity = Some(Some(at));
        self
    }

    pub fn attempts(mut self, attempts: u32) -> Self {
        self.attempts = Some(attempts);
        self
    }

    pub fn lock_until(mut self, until: Option<DateTime<Utc>>) -> Self {
        self.lock_until = Some(until);
        self
    }

    /// Drop user, token and activity.
    pub fn sign_out(self) -> Self {
        let mut patch = self.user(None).token(None);
        patch.last_activity = Some(None);
        patch
    }
}

impl Context for AuthContext {
    type Patch = AuthPatch;

    fn merge(&self, patch: AuthPatch) -> Self {
        Self {
            user: patch.user.unwrap_or_else(|| self.user.clone()),
            error: patch.error.unwrap_or_else(|| self.error.clone()),
            token: patch.token.unwrap_or_else(|| self.token.clone()),
            is_guest: patch.is_guest.unwrap_or(self.is_guest),
            last_activity: patch.last_activity.unwrap_or(self.last_activity),
            attempts: patch.attempts.unwrap_or(self.attempts),
            lock_until: patch.lock_until.unwrap_or(self.lock_until),
        }
    }
}

/// What a [`SessionStore`](crate::auth::SessionStore) persists between runs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user: AuthUser,
    pub token: String,
    pub last_activity: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signed_in(at: DateTime<Utc>) -> AuthContext {
        AuthContext {
            user: Some(AuthUser::new("u1", "a@example.com")),
            token: Some("tok".into()),
            last_activity: Some(at),
            ..Default::default()
        }
    }

    #[test]
    fn empty_patch_keeps_everything() {
        let ctx = signed_in(Utc::now());
        assert_eq!(ctx.merge(AuthPatch::new()), ctx);
    }

    #[test]
    fn patch_replaces_and_clears_named_fields() {
        let ctx = AuthContext {
            error: Some("boom".into()),
            attempts: 2,
            ..signed_in(Utc::now())
        };

        let next = ctx.merge(AuthPatch::new().clear_error().attempts(3).token(None));

        assert_eq!(next.error, None);
        assert_eq!(next.attempts, 3);
        assert_eq!(next.token, None);
        assert_eq!(next.user, ctx.user);
    }

    #[test]
    fn sign_out_drops_credentials_only() {
        let ctx = AuthContext {
            attempts: 4,
            ..signed_in(Utc::now())
        };

        let next = ctx.merge(AuthPatch::new().sign_out());

        assert!(next.user.is_none() && next.token.is_none() && next.last_activity.is_none());
        assert_eq!(next.attempts, 4);
    }

    #[test]
    fn activity_window_is_exclusive() {
        let at = Utc::now();
        let ctx = signed_in(at);
        let timeout = Duration::minutes(30);

        assert!(ctx.is_active_at(at + Duration::minutes(29), timeout));
        assert!(!ctx.is_active_at(at + Duration::minutes(30), timeout));
        assert!(!AuthContext::default().is_active_at(at, timeout));
    }

    #[test]
    fn session_requires_user_and_token() {
        let ctx = signed_in(Utc::now());
        assert_eq!(ctx.session().map(|s| s.token), Some("tok".to_string()));

        let no_token = AuthContext {
            token: None,
            ..ctx
        };
        assert!(no_token.session().is_none());
    }

    #[test]
    fn lock_is_in_force_until_expiry() {
        let now = Utc::now();
        let ctx = AuthContext {
            lock_until: Some(now + Duration::minutes(15)),
            ..Default::default()
        };

        assert!(ctx.is_locked_at(now));
        assert!(!ctx.is_locked_at(now + Duration::minutes(15)));
        assert!(!AuthContext::default().is_locked_at(now));
    }
}
