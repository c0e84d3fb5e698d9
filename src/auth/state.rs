//! States and events of the authentication lifecycle.

crate::state_enum! {
    /// Where a session is in its authentication lifecycle.
    ///
    /// None of these states is final. `Error` and `Locked` are recoverable.
    pub enum AuthState {
        Unauthenticated => "unauthenticated",
        Authenticating => "authenticating",
        Authenticated => "authenticated",
        Registering => "registering",
        Locked => "locked",
        Guest => "guest",
        LoggingOut => "logging_out",
        Error => "error",
    }
    error: [Error]
}

crate::event_enum! {
    /// Events accepted by the authentication machine.
    pub enum AuthEvent {
        LoginRequest => "LOGIN_REQUEST",
        LoginSuccess => "LOGIN_SUCCESS",
        LoginFailure => "LOGIN_FAILURE",
        LogoutRequest => "LOGOUT_REQUEST",
        LogoutSuccess => "LOGOUT_SUCCESS",
        RegisterRequest => "REGISTER_REQUEST",
        RegisterSuccess => "REGISTER_SUCCESS",
        RegisterFailure => "REGISTER_FAILURE",
        GuestMode => "GUEST_MODE",
        ExitGuest => "EXIT_GUEST",
        TokenExpired => "TOKEN_EXPIRED",
        SessionTimeout => "SESSION_TIMEOUT",
        RefreshToken => "REFRESH_TOKEN",
        UserActivity => "USER_ACTIVITY",
        AccountLocked => "ACCOUNT_LOCKED",
        AccountUnlocked => "ACCOUNT_UNLOCKED",
        ClearError => "CLEAR_ERROR",
        SessionRestored => "SESSION_RESTORED",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{EventKind, State};

    #[test]
    fn no_state_is_final() {
        assert_eq!(AuthState::ALL.len(), 8);
        assert!(AuthState::ALL.iter().all(|s| !s.is_final()));
    }

    #[test]
    fn only_error_is_an_error_state() {
        let errors: Vec<&str> = AuthState::ALL
            .iter()
            .filter(|s| s.is_error())
            .map(State::name)
            .collect();
        assert_eq!(errors, vec!["error"]);
    }

    #[test]
    fn event_names_are_unique_and_upper_snake() {
        let mut names: Vec<&str> = AuthEvent::ALL.iter().map(EventKind::name).collect();
        assert_eq!(names.len(), 18);
        assert!(names
            .iter()
            .all(|n| n.chars().all(|c| c.is_ascii_uppercase() || c == '_')));
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 18);
    }
}
