use crate::effects::EffectError;
use thiserror::Error;

/// Failures of a session store.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    #[error("session store unavailable: {0}")]
    Unavailable(String),

    #[error("stored session is corrupt: {0}")]
    Corrupt(String),
}

impl From<StoreError> for EffectError {
    fn from(error: StoreError) -> Self {
        EffectError::Failed(error.to_string())
    }
}

/// Reasons a credential check or registration is refused.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AuthFailure {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("An account with this email already exists")]
    EmailTaken,

    #[error("{0}")]
    Rejected(String),

    #[error("authentication service unavailable: {0}")]
    Unavailable(String),
}

/// Invalid authentication policy.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PolicyError {
    #[error("failed to parse policy: {0}")]
    Parse(String),

    #[error("invalid policy: {0}")]
    Invalid(String),
}

/// Errors from the authentication controller itself, as opposed to domain
/// failures, which are states.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ControllerError {
    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error(transparent)]
    Config(#[from] crate::builder::ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Transition(#[from] crate::effects::TransitionError),
}
