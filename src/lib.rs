//! # utf8scan
//!
//! High-throughput UTF-8 validation for untrusted input.
//!
//! A single call answers two questions at once: is the buffer well-formed
//! UTF-8 (and if not, where is the first malformed sequence), and how much
//! shorter will it be once transcoded to UTF-16 and to Unicode scalars.
//! The second answer lets callers size a transcoding buffer exactly without
//! a second pass.
//!
//! ## Module Organization
//!
//! - [`text`] - UTF-8 validation: scalar, vectorized, and streaming
//! - [`config`] - Validator configuration
//! - `simd` - Lane abstraction over SSSE3, AVX2, NEON, and a portable backend
//!
//! ## Quick Start
//!
//! ```
//! use utf8scan::validate;
//!
//! let v = validate("naïve 🎉".as_bytes());
//! assert!(v.is_valid());
//! assert_eq!(v.utf16_len(), Some(8));
//! assert_eq!(v.scalar_len(), Some(7));
//!
//! let v = validate(&[b'a', 0xC3, 0x28]);
//! assert_eq!(v.offset(), 1);
//! ```
//!
//! ## Features
//!
//! - `std` (default) - Runtime CPU feature detection and `std::error::Error` impls
//! - `serde` - Enable serialization/deserialization support

// Use no_std unless std feature is enabled or we're in test mode
#![cfg_attr(not(any(test, feature = "std")), no_std)]

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// =============================================================================
// Core modules
// =============================================================================

/// Lane abstraction over the supported vector instruction sets.
pub(crate) mod simd;

/// UTF-8 validation.
pub mod text;

/// Validator configuration.
pub mod config;

// =============================================================================
// Public re-exports
// =============================================================================

pub use config::{Config, ConfigError};
pub use text::simd::{Implementation, ParseImplementationError};
pub use text::stream::Utf8Stream;
pub use text::utf8::{
    validate, validate_raw, validate_scalar, validate_with, Utf8Error, Utf8ErrorKind, Utf8Lengths,
    Validation, Validator,
};

// =============================================================================
// Shared value types
// =============================================================================

/// Signed length deltas produced alongside a validation.
///
/// For well-formed input of `n` bytes, the UTF-16 encoding has
/// `n + utf16` code units and the text holds `n + utf16 + scalar` Unicode
/// scalar values. Both deltas are never positive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Deltas {
    /// Reduction from byte count to UTF-16 code unit count.
    pub utf16: isize,
    /// Further reduction from UTF-16 code units to scalar values.
    pub scalar: isize,
}

impl Deltas {
    /// No reduction (pure ASCII).
    pub const ZERO: Self = Self {
        utf16: 0,
        scalar: 0,
    };
}

impl core::ops::Add for Deltas {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self {
            utf16: self.utf16 + rhs.utf16,
            scalar: self.scalar + rhs.scalar,
        }
    }
}

impl core::ops::AddAssign for Deltas {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.utf16 += rhs.utf16;
        self.scalar += rhs.scalar;
    }
}
