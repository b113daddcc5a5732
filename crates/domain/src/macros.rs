//! Macro for implementing Display and FromStr for keyword enums
//!
//! Backoff kinds, jitter kinds and event kinds are all written as lowercase
//! keywords in configuration files, environment variables and logs. This
//! macro keeps the string mapping in one place per enum.
//!
//! # Example
//!
//! ```rust
//! use keeper_domain::impl_keyword_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Mode {
//!     Foreground,
//!     Background,
//! }
//!
//! impl_keyword_conversions!(Mode {
//!     Foreground => "foreground",
//!     Background => "background",
//! });
//!
//! assert_eq!(Mode::Background.to_string(), "background");
//! assert_eq!("FOREGROUND".parse::<Mode>(), Ok(Mode::Foreground));
//! ```

/// Implements Display and FromStr for keyword enums
///
/// - Display writes the keyword exactly as given
/// - FromStr parses case-insensitively and trims surrounding whitespace
#[macro_export]
macro_rules! impl_keyword_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
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
