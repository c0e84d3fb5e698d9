//! Capabilities the authentication machine depends on.
//!
//! The machine never talks to storage, a credential service or a clock
//! directly. Hosts inject implementations of these traits; the in-memory
//! versions here back the tests and simple embeddings.

use crate::auth::context::{AuthUser, Session};
use crate::auth::error::{AuthFailure, StoreError};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use uuid::Uuid;

/// Persistence for the current session.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn save(&self, session: &Session) -> Result<(), StoreError>;
    async fn load(&self) -> Result<Option<Session>, StoreError>;
    async fn clear(&self) -> Result<(), StoreError>;
}

/// A user identity plus the token issued for it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthGrant {
    pub user: AuthUser,
    pub token: String,
}

/// Checks credentials and creates accounts.
#[async_trait]
pub trait CredentialValidator: Send + Sync {
    async fn validate(&self, email: &str, password: &str) -> Result<AuthGrant, AuthFailure>;

    async fn register(
        &self,
        email: &str,
        password: &str,
        name: Option<&str>,
    ) -> Result<AuthGrant, AuthFailure>;
}

/// Source of "now" for event timestamps and session checks.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now += by;
    }

    pub fn set(&self, at: DateTime<Utc>) {
        *self.now.lock() = at;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

/// Session store held in memory.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    session: Mutex<Option<Session>>,
    offline: AtomicBool,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call fail with `StoreError::Unavailable` until switched back.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// The stored session, read synchronously.
    pub fn current(&self) -> Option<Session> {
        self.session.lock().clone()
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store is offline".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn save(&self, session: &Session) -> Result<(), StoreError> {
        self.check_online()?;
        *self.session.lock() = Some(session.clone());
        Ok(())
    }

    async fn load(&self) -> Result<Option<Session>, StoreError> {
        self.check_online()?;
        Ok(self.session.lock().clone())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.check_online()?;
        *self.session.lock() = None;
        Ok(())
    }
}

struct Account {
    password: String,
    user: AuthUser,
}

/// Credential validator over an in-memory account table.
///
/// Every successful check issues a fresh random token.
#[derive(Default)]
pub struct MemoryCredentialValidator {
    accounts: RwLock<HashMap<String, Account>>,
}

impl MemoryCredentialValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an account directly, replacing any with the same email.
    pub fn with_account(self, email: &str, password: &str, name: Option<&str>) -> Self {
        self.insert(email, password, name);
        self
    }

    fn insert(&self, email: &str, password: &str, name: Option<&str>) -> AuthUser {
        let user = AuthUser::new(Uuid::new_v4().to_string(), email);
        let user = match name {
            Some(name) => user.with_name(name),
            None => user,
        };
        self.accounts.write().insert(
            email.to_string(),
            Account {
                password: password.to_string(),
                user: user.clone(),
            },
        );
        user
    }

    fn grant(user: AuthUser) -> AuthGrant {
        AuthGrant {
            user,
            token: Uuid::new_v4().simple().to_string(),
        }
    }
}

#[async_trait]
impl CredentialValidator for MemoryCredentialValidator {
    async fn validate(&self, email: &str, password: &str) -> Result<AuthGrant, AuthFailure> {
        let accounts = self.accounts.read();
        match accounts.get(email) {
            Some(account) if account.password == password => Ok(Self::grant(account.user.clone())),
            _ => Err(AuthFailure::InvalidCredentials),
        }
    }

    async fn register(
        &self,
        email: &str,
        password: &str,
        name: Option<&str>,
    ) -> Result<AuthGrant, AuthFailure> {
        if !email.contains('@') {
            return Err(AuthFailure::Rejected("Invalid email address".into()));
        }
        if password.is_empty() {
            return Err(AuthFailure::Rejected("Password must not be empty".into()));
        }
        if self.accounts.read().contains_key(email) {
            return Err(AuthFailure::EmailTaken);
        }
        Ok(Self::grant(self.insert(email, password, name)))
    }
}
