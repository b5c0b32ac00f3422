//! Macros for ergonomic phase machine construction.

/// Generate a Phase trait implementation for simple enums.
///
/// The `init:` and `error:` annotations name the reserved entry and
/// failure-sink variants.
///
/// # Example
///
/// ```
/// use phasic::phase_enum;
///
/// phase_enum! {
///     pub enum SlotPhase {
///         Init,
///         Betting,
///         Spinning,
///         GameOver,
///         Error,
///     }
///     init: Init
///     error: Error
/// }
/// ```
#[macro_export]
macro_rules! phase_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident
            ),* $(,)?
        }

        init: $init:ident
        error: $error:ident
    ) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),*
        }

        impl $crate::core::Phase for $name {
            fn name(&self) -> &str {
                match self {
                    $(Self::$variant => stringify!($variant)),*
                }
            }

            fn init() -> Self {
                Self::$init
            }

            fn error() -> Self {
                Self::$error
            }
        }
    };
}
