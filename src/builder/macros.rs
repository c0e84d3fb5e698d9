//! Macros for declaring state and event enums.

/// Generate a fieldless enum with a `State` implementation.
///
/// Each variant may carry an explicit name with `=> "label"`; otherwise the
/// variant identifier is used.
///
/// # Example
///
/// ```
/// use statewise::state_enum;
/// use statewise::core::State;
///
/// state_enum! {
///     pub enum Upload {
///         Pending => "pending",
///         Sending => "sending",
///         Done,
///         Failed,
///     }
///     final: [Done]
///     error: [Failed]
/// }
///
/// assert_eq!(Upload::Pending.name(), "pending");
/// assert_eq!(Upload::Done.name(), "Done");
/// assert!(Upload::Done.is_final());
/// assert!(Upload::Failed.is_error());
/// ```
#[macro_export]
macro_rules! state_enum {
    (@label $variant:ident $label:literal) => {
        $label
    };
    (@label $variant:ident) => {
        stringify!($variant)
    };
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $(=> $label:literal)?
            ),* $(,)?
        }

        $(final: [$($final:ident),* $(,)?])?
        $(error: [$($error:ident),* $(,)?])?
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),*
        }

        impl $name {
            /// Every variant, in declaration order.
            #[allow(dead_code)]
            pub const ALL: &'static [$name] = &[$(Self::$variant),*];
        }

        impl $crate::core::State for $name {
            fn name(&self) -> &str {
                match self {
                    $(Self::$variant => $crate::state_enum!(@label $variant $($label)?)),*
                }
            }

            fn is_final(&self) -> bool {
                match self {
                    $($(Self::$final => true,)*)?
                    #[allow(unreachable_patterns)]
                    _ => false,
                }
            }

            fn is_error(&self) -> bool {
                match self {
                    $($(Self::$error => true,)*)?
                    #[allow(unreachable_patterns)]
                    _ => false,
                }
            }
        }
    };
}

/// Generate a fieldless enum with an `EventKind` implementation.
///
/// # Example
///
/// ```
/// use statewise::event_enum;
/// use statewise::core::EventKind;
///
/// event_enum! {
///     pub enum Signal {
///         Start => "START",
///         Stop,
///     }
/// }
///
/// assert_eq!(Signal::Start.name(), "START");
/// assert_eq!(Signal::Stop.name(), "Stop");
/// ```
#[macro_export]
macro_rules! event_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $(=> $label:literal)?
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),*
        }

        impl $name {
            /// Every variant, in declaration order.
            #[allow(dead_code)]
            pub const ALL: &'static [$name] = &[$(Self::$variant),*];
        }

        impl $crate::core::EventKind for $name {
            fn name(&self) -> &str {
                match self {
                    $(Self::$variant => $crate::state_enum!(@label $variant $($label)?)),*
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::core::{EventKind, State};

    state_enum! {
        enum Stage {
            Draft => "draft",
            Live => "live",
            Archived,
            Broken,
        }
        final: [Archived]
        error: [Broken]
    }

    event_enum! {
        enum Edit {
            Publish => "PUBLISH",
            Archive,
        }
    }

    #[test]
    fn state_enum_uses_labels_when_given() {
        assert_eq!(Stage::Draft.name(), "draft");
        assert_eq!(Stage::Live.name(), "live");
        assert_eq!(Stage::Archived.name(), "Archived");
    }

    #[test]
    fn state_enum_flags_final_and_error() {
        assert!(Stage::Archived.is_final());
        assert!(!Stage::Archived.is_error());
        assert!(Stage::Broken.is_error());
        assert!(!Stage::Draft.is_final());
    }

    #[test]
    fn all_lists_variants_in_order() {
        assert_eq!(
            Stage::ALL,
            &[Stage::Draft, Stage::Live, Stage::Archived, Stage::Broken]
        );
        assert_eq!(Edit::ALL, &[Edit::Publish, Edit::Archive]);
    }

    #[test]
    fn event_enum_names() {
        assert_eq!(Edit::Publish.name(), "PUBLISH");
        assert_eq!(Edit::Archive.name(), "Archive");
    }

    #[test]
    fn state_enum_works_without_final_error() {
        state_enum! {
            enum Minimal {
                One,
                Two,
            }
        }

        assert!(!Minimal::One.is_final());
        assert!(!Minimal::Two.is_error());
    }
}
