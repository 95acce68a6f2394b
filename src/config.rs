//! Configuration for UTF-8 validation.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::text::simd::{Implementation, ParseImplementationError};

/// Environment variable that forces an implementation (see [`Config::from_env`]).
pub const IMPLEMENTATION_ENV: &str = "UTF8SCAN_IMPL";

/// Configuration for a [`Validator`](crate::Validator).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
    /// Implementation to use (default: `None`, detect at construction)
    pub implementation: Option<Implementation>,
    /// Skip a leading ASCII run before the vector loop (default: true)
    pub skip_ascii_prefix: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            implementation: None,
            skip_ascii_prefix: true,
        }
    }
}

impl Config {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Force a specific implementation.
    pub fn with_implementation(mut self, implementation: Implementation) -> Self {
        self.implementation = Some(implementation);
        self
    }

    /// Enable or disable skipping the leading ASCII run.
    pub fn with_skip_ascii_prefix(mut self, skip: bool) -> Self {
        self.skip_ascii_prefix = skip;
        self
    }

    /// Read the implementation override from `UTF8SCAN_IMPL`.
    ///
    /// An unset or empty variable leaves the implementation to detection.
    #[cfg(feature = "std")]
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var(IMPLEMENTATION_ENV) {
            Ok(value) => Self::new().with_implementation_name(&value),
            Err(_) => Ok(Self::new()),
        }
    }

    /// Apply an implementation name such as `"avx2"`; empty means detect.
    pub fn with_implementation_name(mut self, name: &str) -> Result<Self, ConfigError> {
        if name.trim().is_empty() {
            self.implementation = None;
            return Ok(self);
        }
        let implementation = name.parse().map_err(ConfigError::UnknownImplementation)?;
        Ok(self.with_implementation(implementation))
    }
}

/// Errors from building a validator out of a [`Config`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The configured implementation cannot run on this CPU.
    Unavailable(Implementation),
    /// The implementation name was not recognized.
    UnknownImplementation(ParseImplementationError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Unavailable(imp) => {
                write!(f, "implementation '{imp}' is not supported on this CPU")
            }
            ConfigError::UnknownImplementation(e) => write!(f, "{}", e),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::UnknownImplementation(e) => Some(e),
            ConfigError::Unavailable(_) => None,
        }
    }
}
