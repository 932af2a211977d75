//! Macro for implementing Display and FromStr for unit enums
//!
//! Granularity, metric kinds and log formats all travel as lowercase strings
//! (config files, environment variables, log fields). This macro provides a
//! single implementation for both directions with case-insensitive parsing.
//!
//! # Example
//!
//! ```rust
//! use telemeter_domain::impl_enum_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Window {
//!     Short,
//!     Long,
//! }
//!
//! impl_enum_conversions!(Window {
//!     Short => "short",
//!     Long => "long",
//! });
//!
//! assert_eq!(Window::Long.to_string(), "long");
//! assert_eq!("SHORT".parse::<Window>(), Ok(Window::Short));
//! ```

/// Implements Display and FromStr traits for unit enums
///
/// This macro generates:
/// - Display trait: writes the mapped lowercase string
/// - FromStr trait: parses case-insensitive strings (surrounding whitespace
///   is ignored)
///
/// # Arguments
///
/// * `$enum_name` - The name of the enum type
/// * `$variant => $str` - Mapping of enum variants to their string
///   representations
#[macro_export]
macro_rules! impl_enum_conversions {
    ($enum_name:ident { $($variant:ident => $str:literal),+ $(,)? }) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => f.write_str($str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}
