//! Domain-named operations over the authentication machine.

use crate::auth::collaborators::{AuthGrant, Clock, CredentialValidator, SessionStore};
use crate::auth::context::{AuthContext, AuthUser, Session};
use crate::auth::error::ControllerError;
use crate::auth::policy::AuthPolicy;
use crate::auth::state::{AuthEvent, AuthState};
use crate::auth::table::auth_table;
use crate::core::{Event, Payload, StateHistory};
use crate::diagnostics::MachineDiagnostics;
use crate::effects::{EffectFailure, StateMachine, TransitionError, TransitionOutcome};
use serde_json::Value;
use std::sync::Arc;

pub type AuthMachine = StateMachine<AuthState, AuthEvent, AuthContext>;

fn grant_payload(user: &AuthUser, token: &str) -> Payload {
    let mut payload = Payload::new();
    if let Ok(user) = serde_json::to_value(user) {
        payload.insert("user".into(), user);
    }
    payload.insert("token".into(), Value::from(token));
    payload
}

fn error_payload(message: impl Into<String>) -> Payload {
    let mut payload = Payload::new();
    payload.insert("error".into(), Value::from(message.into()));
    payload
}

/// Authentication façade owning one machine per session.
///
/// Every event is stamped with the injected clock. Operations that trigger a
/// persistence effect wait for it before returning, so a caller that moves
/// on after `login` knows the session has been saved. Effect failures are
/// logged and reported to the observer but never undo a transition.
pub struct AuthController {
    machine: AuthMachine,
    policy: AuthPolicy,
    store: Arc<dyn SessionStore>,
    validator: Arc<dyn CredentialValidator>,
    clock: Arc<dyn Clock>,
}

impl AuthController {
    /// Build a controller. The policy is validated first, so a limit of zero
    /// attempts or a zero session timeout is refused here.
    pub fn new(
        policy: AuthPolicy,
        store: Arc<dyn SessionStore>,
        validator: Arc<dyn CredentialValidator>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ControllerError> {
        let policy = policy.validate()?;
        let table = auth_table(&policy, Arc::clone(&store))?;
        let machine = StateMachine::new(table, AuthState::Unauthenticated, AuthContext::default())?;
        Ok(Self {
            machine,
            policy,
            store,
            validator,
            clock,
        })
    }

    /// Register a sink for effect failures.
    pub fn with_effect_observer<F>(mut self, observer: F) -> Self
    where
        F: Fn(&EffectFailure<AuthState, AuthEvent>) + Send + Sync + 'static,
    {
        self.machine = self.machine.with_effect_observer(observer);
        self
    }

    pub fn state(&self) -> AuthState {
        *self.machine.current_state()
    }

    pub fn context(&self) -> &AuthContext {
        self.machine.context()
    }

    pub fn user(&self) -> Option<&AuthUser> {
        self.context().user.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.context().error.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state() == AuthState::Authenticated
    }

    pub fn is_guest(&self) -> bool {
        self.context().is_guest
    }

    pub fn policy(&self) -> &AuthPolicy {
        &self.policy
    }

    pub fn history(&self) -> &StateHistory<AuthState, AuthEvent> {
        self.machine.history()
    }

    pub fn machine(&self) -> &AuthMachine {
        &self.machine
    }

    pub fn diagnostics(&self) -> MachineDiagnostics {
        self.machine.diagnostics()
    }

    /// Whether `kind` would be accepted now with an empty payload.
    pub fn can(&self, kind: AuthEvent) -> bool {
        self.machine.can_transition(&self.event(kind, Payload::new()))
    }

    fn event(&self, kind: AuthEvent, payload: Payload) -> Event<AuthEvent> {
        Event::new(kind, self.clock.now()).with_payload(payload)
    }

    /// Apply an event without waiting for its effect.
    pub fn send(&mut self, kind: AuthEvent, payload: Payload) -> TransitionOutcome<AuthState> {
        let event = self.event(kind, payload);
        self.machine.transition(event)
    }

    /// Apply an event and wait for its effect, if any.
    async fn fire(
        &mut self,
        kind: AuthEvent,
        payload: Payload,
    ) -> Result<AuthState, TransitionError> {
        let mut outcome = self.send(kind, payload);
        let effect = outcome.take_effect();
        let state = outcome.into_result()?;
        if let Some(effect) = effect {
            // Already reported by the machine.
            let _ = effect.wait().await;
        }
        Ok(state)
    }

    /// Check credentials and finish in `authenticated`, `error` or `locked`.
    ///
    /// A refused login is not an `Err`: the resulting state and
    /// [`error`](Self::error) describe it.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<AuthState, TransitionError> {
        self.fire(AuthEvent::LoginRequest, Payload::new()).await?;
        tracing::debug!(email, "validating credentials");

        let checked = self.validator.validate(email, password).await;
        match checked {
            Ok(AuthGrant { user, token }) => {
                self.fire(AuthEvent::LoginSuccess, grant_payload(&user, &token))
                    .await
            }
            Err(failure) => {
                tracing::debug!(email, %failure, "login refused");
                self.fire(AuthEvent::LoginFailure, error_payload(failure.to_string()))
                    .await
            }
        }
    }

    /// Create an account and sign in to it.
    pub async fn register(
        &mut self,
        email: &str,
        password: &str,
        name: Option<&str>,
    ) -> Result<AuthState, TransitionError> {
        self.fire(AuthEvent::RegisterRequest, Payload::new()).await?;

        let created = self.validator.register(email, password, name).await;
        match created {
            Ok(AuthGrant { user, token }) => {
                self.fire(AuthEvent::RegisterSuccess, grant_payload(&user, &token))
                    .await
            }
            Err(failure) => {
                tracing::debug!(email, %failure, "registration refused");
                self.fire(AuthEvent::RegisterFailure, error_payload(failure.to_string()))
                    .await
            }
        }
    }

    /// Sign out and clear the persisted session.
    pub async fn logout(&mut self) -> Result<AuthState, TransitionError> {
        self.fire(AuthEvent::LogoutRequest, Payload::new()).await?;
        self.fire(AuthEvent::LogoutSuccess, Payload::new()).await
    }

    /// Record a failed login reported by an external credential check.
    pub async fn report_login_failure(
        &mut self,
        message: &str,
    ) -> Result<AuthState, TransitionError> {
        self.fire(AuthEvent::LoginFailure, error_payload(message))
            .await
    }

    pub fn enter_guest_mode(&mut self) -> Result<AuthState, TransitionError> {
        self.send(AuthEvent::GuestMode, Payload::new()).into_result()
    }

    pub fn exit_guest_mode(&mut self) -> Result<AuthState, TransitionError> {
        self.send(AuthEvent::ExitGuest, Payload::new()).into_result()
    }

    /// Replace the token of the current session.
    pub async fn refresh(&mut self, token: &str) -> Result<AuthState, TransitionError> {
        let mut payload = Payload::new();
        payload.insert("token".into(), Value::from(token));
        self.fire(AuthEvent::RefreshToken, payload).await
    }

    /// Mark the session as active now.
    pub async fn record_activity(&mut self) -> Result<AuthState, TransitionError> {
        self.fire(AuthEvent::UserActivity, Payload::new()).await
    }

    /// Lock the account administratively.
    pub async fn lock(&mut self) -> Result<AuthState, TransitionError> {
        self.fire(AuthEvent::AccountLocked, Payload::new()).await
    }

    /// Unlock, which only succeeds once the lock has expired.
    pub fn unlock(&mut self) -> Result<AuthState, TransitionError> {
        self.send(AuthEvent::AccountUnlocked, Payload::new())
            .into_result()
    }

    pub async fn expire_token(&mut self) -> Result<AuthState, TransitionError> {
        self.fire(AuthEvent::TokenExpired, Payload::new()).await
    }

    pub async fn session_timeout(&mut self) -> Result<AuthState, TransitionError> {
        self.fire(AuthEvent::SessionTimeout, Payload::new()).await
    }

    pub fn clear_error(&mut self) -> Result<AuthState, TransitionError> {
        self.send(AuthEvent::ClearError, Payload::new()).into_result()
    }

    /// Whether the current session has seen activity within the timeout.
    ///
    /// Only an authenticated session can be valid.
    pub fn is_session_valid(&self) -> bool {
        self.is_authenticated()
            && self
                .context()
                .is_active_at(self.clock.now(), self.policy.session_timeout())
    }

    /// Time the session out if it has gone stale. Meant to be called by an
    /// external timer; returns whether a timeout was fired.
    pub async fn check_session(&mut self) -> Result<bool, TransitionError> {
        if !self.is_authenticated() || self.is_session_valid() {
            return Ok(false);
        }
        tracing::debug!("session stale, timing out");
        self.session_timeout().await?;
        Ok(true)
    }

    /// Resume a persisted session if it is still fresh.
    ///
    /// A stale session is cleared from the store. Returns whether the
    /// machine is now authenticated from the stored session.
    pub async fn restore_session(&mut self) -> Result<bool, ControllerError> {
        let Some(session) = self.store.load().await? else {
            return Ok(false);
        };

        let now = self.clock.now();
        let fresh = session
            .last_activity
            .is_some_and(|last| now.signed_duration_since(last) < self.policy.session_timeout());

        if !fresh {
            tracing::debug!(user = %session.user.id, "stored session is stale, clearing");
            self.store.clear().await?;
            return Ok(false);
        }

        let Session { user, token, .. } = session;
        self.fire(AuthEvent::SessionRestored, grant_payload(&user, &token))
            .await?;
        Ok(true)
    }

    /// Back to `unauthenticated` with an empty context and history.
    pub fn reset(&mut self) {
        self.machine.reset();
    }
}

impl std::fmt::Debug for AuthController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthController")
            .field("machine", &self.machine)
            .field("policy", &self.policy)
            .finish()
    }
}
