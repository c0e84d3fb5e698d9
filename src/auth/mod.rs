//! Authentication and session lifecycle built on the generic engine.
//!
//! Domain failures (bad credentials, lockout, expired sessions) are states,
//! with a human-readable reason in [`AuthContext::error`]. Storage,
//! credential checks and time are injected through [`SessionStore`],
//! [`CredentialValidator`] and [`Clock`].
//!
//! # Example
//!
//! ```
//! use statewise::auth::{
//!     AuthController, AuthPolicy, AuthState, ManualClock, MemoryCredentialValidator,
//!     MemorySessionStore,
//! };
//! use std::sync::Arc;
//!
//! let mut auth = AuthController::new(
//!     AuthPolicy::default(),
//!     Arc::new(MemorySessionStore::new()),
//!     Arc::new(MemoryCredentialValidator::new()),
//!     Arc::new(ManualClock::default()),
//! )
//! .unwrap();
//!
//! assert_eq!(auth.enter_guest_mode(), Ok(AuthState::Guest));
//! assert!(auth.is_guest());
//! ```

pub mod collaborators;
pub mod context;
pub mod controller;
pub mod error;
pub mod policy;
pub mod state;
pub mod table;

pub use collaborators::{
    AuthGrant, Clock, CredentialValidator, ManualClock, MemoryCredentialValidator,
    MemorySessionStore, SessionStore, SystemClock,
};
pub use context::{AuthContext, AuthPatch, AuthUser, Session};
pub use controller::{AuthController, AuthMachine};
pub use error::{AuthFailure, ControllerError, PolicyError, StoreError};
pub use policy::AuthPolicy;
pub use state::{AuthEvent, AuthState};
pub use table::{auth_table, parse_grant, AuthTable};
