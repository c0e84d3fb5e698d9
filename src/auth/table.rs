//! The fixed transition table of the authentication machine.

use crate::auth::collaborators::SessionStore;
use crate::auth::context::{AuthContext, AuthPatch, AuthUser};
use crate::auth::policy::AuthPolicy;
use crate::auth::state::{AuthEvent, AuthState};
use crate::builder::{ConfigError, TableBuilder, TransitionBuilder, TransitionTable};
use crate::core::Event;
use crate::effects::{ActionError, EffectError};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::sync::Arc;

pub type AuthTable = TransitionTable<AuthState, AuthEvent, AuthContext>;

type AuthEntry = TransitionBuilder<AuthState, AuthEvent, AuthContext>;

type AuthEffect =
    Box<dyn Fn(AuthContext, Event<AuthEvent>) -> BoxFuture<'static, Result<(), EffectError>> + Send + Sync>;

pub const DEFAULT_LOGIN_ERROR: &str = "Invalid email or password";
pub const DEFAULT_REGISTER_ERROR: &str = "Registration failed";
pub const LOCKED_ERROR: &str = "Too many failed attempts. Account locked.";
pub const ADMIN_LOCKED_ERROR: &str = "Account locked";
pub const TOKEN_EXPIRED_ERROR: &str = "Session expired. Please sign in again.";
pub const SESSION_TIMEOUT_ERROR: &str = "Session timed out due to inactivity";

fn entry(from: AuthState, on: AuthEvent, to: AuthState) -> AuthEntry {
    TransitionBuilder::new().from(from).to(to).on(on)
}

/// Read the `user` and `token` fields a sign-in event must carry.
pub fn parse_grant(event: &Event<AuthEvent>) -> Result<(AuthUser, String), ActionError> {
    let user = event
        .field("user")
        .ok_or_else(|| ActionError::new(format!("{} without a user", event.name())))?;
    let user: AuthUser = serde_json::from_value(user.clone())
        .map_err(|e| ActionError::new(format!("malformed user in {}: {e}", event.name())))?;
    let token = event
        .str_field("token")
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ActionError::new(format!("{} without a token", event.name())))?;
    Ok((user, token.to_string()))
}

fn sign_in(_: &AuthContext, event: &Event<AuthEvent>) -> Result<AuthPatch, ActionError> {
    let (user, token) = parse_grant(event)?;
    Ok(AuthPatch::new()
        .user(Some(user))
        .token(Some(token))
        .attempts(0)
        .clear_error()
        .guest(false)
        .lock_until(None)
        .active_at(event.timestamp))
}

fn lock_patch(
    attempts: u32,
    message: &str,
    lockout: chrono::Duration,
    event: &Event<AuthEvent>,
) -> Result<AuthPatch, ActionError> {
    let until = event
        .timestamp
        .checked_add_signed(lockout)
        .ok_or_else(|| ActionError::new("lock expiry out of range"))?;
    Ok(AuthPatch::new()
        .sign_out()
        .attempts(attempts)
        .error(message)
        .guest(false)
        .lock_until(Some(until)))
}

fn save_session(store: &Arc<dyn SessionStore>) -> AuthEffect {
    let store = Arc::clone(store);
    Box::new(move |ctx: AuthContext, _: Event<AuthEvent>| {
        let store = Arc::clone(&store);
        async move {
            let session = ctx
                .session()
                .ok_or_else(|| EffectError::failed("no session to persist"))?;
            store.save(&session).await?;
            Ok::<(), EffectError>(())
        }
        .boxed()
    })
}

fn clear_session(store: &Arc<dyn SessionStore>) -> AuthEffect {
    let store = Arc::clone(store);
    Box::new(move |_: AuthContext, _: Event<AuthEvent>| {
        let store = Arc::clone(&store);
        async move {
            store.clear().await?;
            Ok::<(), EffectError>(())
        }
        .boxed()
    })
}

/// Build the authentication table for `policy`, persisting through `store`.
///
/// Entry order matters only where two entries share a `(from, on)` key; the
/// only such pairs are the `LOGIN_FAILURE` entries, whose guards are
/// complementary.
pub fn auth_table(
    policy: &AuthPolicy,
    store: Arc<dyn SessionStore>,
) -> Result<AuthTable, ConfigError> {
    use crate::auth::state::{AuthEvent as Ev, AuthState as St};

    let lockout = policy.lockout();
    let mut builder: TableBuilder<AuthState, AuthEvent, AuthContext> =
        TableBuilder::new().states(AuthState::ALL.iter().copied());

    // Starting a login or registration.
    for from in [St::Unauthenticated, St::Error, St::Guest] {
        builder = builder.transition(
            entry(from, Ev::LoginRequest, St::Authenticating)
                .patch(|_: &AuthContext, _: &Event<AuthEvent>| {
                    AuthPatch::new().clear_error().guest(false)
                }),
        )?;
    }
    for from in [St::Unauthenticated, St::Guest] {
        builder = builder.transition(
            entry(from, Ev::RegisterRequest, St::Registering)
                .patch(|_: &AuthContext, _: &Event<AuthEvent>| {
                    AuthPatch::new().clear_error().guest(false)
                }),
        )?;
    }

    builder = builder
        .transition(
            entry(St::Authenticating, Ev::LoginSuccess, St::Authenticated)
                .action(sign_in)
                .effect(save_session(&store)),
        )?
        .transition(
            entry(St::Registering, Ev::RegisterSuccess, St::Authenticated)
                .action(sign_in)
                .effect(save_session(&store)),
        )?
        .transition(
            entry(St::Registering, Ev::RegisterFailure, St::Error).patch(
                |_: &AuthContext, event: &Event<AuthEvent>| {
                    AuthPatch::new()
                        .error(event.str_field("error").unwrap_or(DEFAULT_REGISTER_ERROR))
                },
            ),
        )?;

    // Failed logins. Each source has one entry below the limit and one at it.
    for from in [St::Unauthenticated, St::Authenticating, St::Error] {
        let below = policy.clone();
        let at = policy.clone();
        builder = builder
            .transition(
                entry(from, Ev::LoginFailure, St::Error)
                    .when(move |ctx: &AuthContext, _: &Event<AuthEvent>| {
                        !below.locks_after(ctx.attempts)
                    })
                    .patch(|ctx: &AuthContext, event: &Event<AuthEvent>| {
                        AuthPatch::new()
                            .attempts(ctx.attempts.saturating_add(1))
                            .error(event.str_field("error").unwrap_or(DEFAULT_LOGIN_ERROR))
                    }),
            )?
            .transition(
                entry(from, Ev::LoginFailure, St::Locked)
                    .when(move |ctx: &AuthContext, _: &Event<AuthEvent>| {
                        at.locks_after(ctx.attempts)
                    })
                    .action(move |ctx: &AuthContext, event: &Event<AuthEvent>| {
                        lock_patch(ctx.attempts.saturating_add(1), LOCKED_ERROR, lockout, event)
                    })
                    .effect(clear_session(&store)),
            )?;
    }

    // Administrative lock and the timed unlock.
    for from in [St::Unauthenticated, St::Error] {
        builder = builder.transition(
            entry(from, Ev::AccountLocked, St::Locked)
                .action(move |ctx: &AuthContext, event: &Event<AuthEvent>| {
                    lock_patch(ctx.attempts, ADMIN_LOCKED_ERROR, lockout, event)
                })
                .effect(clear_session(&store)),
        )?;
    }
    builder = builder.transition(
        entry(St::Locked, Ev::AccountUnlocked, St::Unauthenticated)
            .when(|ctx: &AuthContext, event: &Event<AuthEvent>| {
                !ctx.is_locked_at(event.timestamp)
            })
            .patch(|_: &AuthContext, _: &Event<AuthEvent>| {
                AuthPatch::new().attempts(0).clear_error().lock_until(None)
            }),
    )?;

    // Authenticated session upkeep.
    builder = builder
        .transition(
            entry(St::Authenticated, Ev::RefreshToken, St::Authenticated)
                .action(|_: &AuthContext, event: &Event<AuthEvent>| {
                    let token = event
                        .str_field("token")
                        .filter(|token| !token.is_empty())
                        .ok_or_else(|| ActionError::new("REFRESH_TOKEN without a token"))?;
                    Ok(AuthPatch::new()
                        .token(Some(token.to_string()))
                        .active_at(event.timestamp))
                })
                .effect(save_session(&store)),
        )?
        .transition(
            entry(St::Authenticated, Ev::UserActivity, St::Authenticated)
                .patch(|_: &AuthContext, event: &Event<AuthEvent>| {
                    AuthPatch::new().active_at(event.timestamp)
                })
                .effect(save_session(&store)),
        )?
        .transition(
            entry(St::Guest, Ev::UserActivity, St::Guest).patch(
                |_: &AuthContext, event: &Event<AuthEvent>| {
                    AuthPatch::new().active_at(event.timestamp)
                },
            ),
        )?
        .transition(
            entry(St::Authenticated, Ev::TokenExpired, St::Unauthenticated)
                .patch(|_: &AuthContext, _: &Event<AuthEvent>| {
                    AuthPatch::new().sign_out().error(TOKEN_EXPIRED_ERROR)
                })
                .effect(clear_session(&store)),
        )?
        .transition(
            entry(St::Authenticated, Ev::SessionTimeout, St::Unauthenticated)
                .patch(|_: &AuthContext, _: &Event<AuthEvent>| {
                    AuthPatch::new().sign_out().error(SESSION_TIMEOUT_ERROR)
                })
                .effect(clear_session(&store)),
        )?;

    // Logout.
    builder = builder
        .transition(entry(
            St::Authenticated,
            Ev::LogoutRequest,
            St::LoggingOut,
        ))?
        .transition(
            entry(St::LoggingOut, Ev::LogoutSuccess, St::Unauthenticated)
                .patch(|_: &AuthContext, _: &Event<AuthEvent>| {
                    AuthPatch::new().sign_out().clear_error().guest(false)
                })
                .effect(clear_session(&store)),
        )?;

    // Guest side door.
    builder = builder
        .transition(
            entry(St::Unauthenticated, Ev::GuestMode, St::Guest).patch(
                |_: &AuthContext, event: &Event<AuthEvent>| {
                    AuthPatch::new()
                        .guest(true)
                        .clear_error()
                        .active_at(event.timestamp)
                },
            ),
        )?
        .transition(
            entry(St::Guest, Ev::ExitGuest, St::Unauthenticated).patch(
                |_: &AuthContext, _: &Event<AuthEvent>| {
                    let mut patch = AuthPatch::new().guest(false);
                    patch.last_activity = Some(None);
                    patch
                },
            ),
        )?;

    builder = builder
        .transition(
            entry(St::Error, Ev::ClearError, St::Unauthenticated)
                .patch(|_: &AuthContext, _: &Event<AuthEvent>| AuthPatch::new().clear_error()),
        )?
        .transition(
            entry(St::Unauthenticated, Ev::SessionRestored, St::Authenticated)
                .action(sign_in)
                .effect(save_session(&store)),
        )?;

    builder.build()
}
