//! State identity for transition tables.
//!
//! A state is a plain value (usually a fieldless enum) that names a node in
//! the transition graph. Everything the engine needs from it is exposed by
//! pure methods.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Trait for state machine states.
///
/// States are compared by value: two states are the same node in the graph
/// iff they are `==`. `name` is the stable key used in diagnostics, graph
/// export and error messages.
///
/// # Example
///
/// ```rust
/// use statewise::core::State;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
/// enum Door {
///     Open,
///     Closed,
///     Broken,
/// }
///
/// impl State for Door {
///     fn name(&self) -> &str {
///         match self {
///             Self::Open => "open",
///             Self::Closed => "closed",
///             Self::Broken => "broken",
///         }
///     }
///
///     fn is_final(&self) -> bool {
///         matches!(self, Self::Broken)
///     }
/// }
///
/// assert_eq!(Door::Open.name(), "open");
/// assert!(Door::Broken.is_final());
/// ```
pub trait State:
    Clone + PartialEq + Debug + Serialize + for<'de> Deserialize<'de> + Send + Sync + 'static
{
    /// Unique, stable name of the state.
    fn name(&self) -> &str;

    /// Whether the machine stops accepting events once it reaches this state.
    ///
    /// Default implementation returns `false`.
    fn is_final(&self) -> bool {
        false
    }

    /// Whether this state represents a failure condition.
    ///
    /// Error states are ordinary, recoverable states unless they are also
    /// final. Default implementation returns `false`.
    fn is_error(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
    enum Light {
        Red,
        Green,
        Off,
        Faulty,
    }

    impl State for Light {
        fn name(&self) -> &str {
            match self {
                Self::Red => "red",
                Self::Green => "green",
                Self::Off => "off",
                Self::Faulty => "faulty",
            }
        }

        fn is_final(&self) -> bool {
            matches!(self, Self::Off)
        }

        fn is_error(&self) -> bool {
            matches!(self, Self::Faulty)
        }
    }

    #[test]
    fn name_is_the_declared_key() {
        assert_eq!(Light::Red.name(), "red");
        assert_eq!(Light::Green.name(), "green");
        assert_eq!(Light::Off.name(), "off");
        assert_eq!(Light::Faulty.name(), "faulty");
    }

    #[test]
    fn error_states_need_not_be_final() {
        assert!(Light::Faulty.is_error());
        assert!(!Light::Faulty.is_final());
        assert!(Light::Off.is_final());
        assert!(!Light::Off.is_error());
    }

    #[test]
    fn state_survives_json() {
        let json = serde_json::to_string(&Light::Green).unwrap();
        let back: Light = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Light::Green);
    }
}
