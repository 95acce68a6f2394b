//! Vectorized UTF-8 validation and implementation selection.
//!
//! One generic driver ([`engine`]) runs over any [`SimdVector`] backend.
//! This module owns the list of backends, the runtime CPU checks, and the
//! `#[target_feature]` entry points that instantiate the driver for each.
//!
//! [`SimdVector`]: crate::simd::SimdVector

pub(crate) mod classify;
pub(crate) mod engine;
pub(crate) mod rewind;
pub(crate) mod tables;

use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use self::engine::validate_vectorized;
use super::scalar;
use super::utf8::Validation;
use crate::simd::portable::Portable;

/// A UTF-8 validation implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Implementation {
    /// Byte-at-a-time decoding. Always available.
    Scalar,
    /// The vectorized algorithm on plain 16-byte arrays. Always available.
    Portable,
    /// SSSE3, 16 bytes per vector (x86_64).
    Sse,
    /// AVX2, 32 bytes per vector (x86_64).
    Avx2,
    /// NEON, 16 bytes per vector (aarch64).
    Neon,
}

impl Implementation {
    /// Every implementation, available or not.
    pub const ALL: [Implementation; 5] = [
        Implementation::Scalar,
        Implementation::Portable,
        Implementation::Sse,
        Implementation::Avx2,
        Implementation::Neon,
    ];

    /// The fastest implementation this CPU supports.
    pub fn detect() -> Self {
        [Self::Avx2, Self::Sse, Self::Neon]
            .into_iter()
            .find(|imp| imp.is_available())
            .unwrap_or(Self::Scalar)
    }

    /// True if this implementation can run on the current CPU.
    pub fn is_available(self) -> bool {
        match self {
            Self::Scalar | Self::Portable => true,
            Self::Sse => has_ssse3(),
            Self::Avx2 => has_avx2(),
            Self::Neon => cfg!(all(target_arch = "aarch64", target_feature = "neon")),
        }
    }

    /// All implementations that can run on the current CPU.
    pub fn available() -> impl Iterator<Item = Implementation> {
        Self::ALL.into_iter().filter(|imp| imp.is_available())
    }

    /// Lowercase name, as accepted by [`FromStr`].
    pub fn name(self) -> &'static str {
        match self {
            Self::Scalar => "scalar",
            Self::Portable => "portable",
            Self::Sse => "sse",
            Self::Avx2 => "avx2",
            Self::Neon => "neon",
        }
    }
}

impl fmt::Display for Implementation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown implementation name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseImplementationError;

impl fmt::Display for ParseImplementationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown UTF-8 implementation (expected one of: scalar, portable, sse, avx2, neon)"
        )
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ParseImplementationError {}

impl FromStr for Implementation {
    type Err = ParseImplementationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("ssse3") {
            return Ok(Self::Sse);
        }
        Self::ALL
            .into_iter()
            .find(|imp| s.eq_ignore_ascii_case(imp.name()))
            .ok_or(ParseImplementationError)
    }
}

// =============================================================================
// CPU feature checks
// =============================================================================

#[cfg(target_arch = "x86_64")]
fn has_avx2() -> bool {
    #[cfg(any(test, feature = "std"))]
    {
        is_x86_feature_detected!("avx2")
    }
    #[cfg(not(any(test, feature = "std")))]
    {
        cfg!(target_feature = "avx2")
    }
}

#[cfg(target_arch = "x86_64")]
fn has_ssse3() -> bool {
    #[cfg(any(test, feature = "std"))]
    {
        is_x86_feature_detected!("ssse3")
    }
    #[cfg(not(any(test, feature = "std")))]
    {
        cfg!(target_feature = "ssse3")
    }
}

#[cfg(not(target_arch = "x86_64"))]
fn has_avx2() -> bool {
    false
}

#[cfg(not(target_arch = "x86_64"))]
fn has_ssse3() -> bool {
    false
}

// =============================================================================
// Dispatch
// =============================================================================

/// Run `implementation`, or return `None` if this CPU lacks it.
pub(crate) fn run(
    implementation: Implementation,
    input: &[u8],
    skip_ascii_prefix: bool,
) -> Option<Validation> {
    if !implementation.is_available() {
        return None;
    }
    // SAFETY: the required CPU features were just checked.
    let validation = unsafe { run_unchecked(implementation, input, skip_ascii_prefix) };
    Some(validation)
}

/// Run the best implementation for this CPU.
#[inline]
pub(crate) fn validate_detected(input: &[u8], skip_ascii_prefix: bool) -> Validation {
    run(Implementation::detect(), input, skip_ascii_prefix)
        .unwrap_or_else(|| scalar::validate(input))
}

/// # Safety
///
/// `implementation` must be available on this CPU.
unsafe fn run_unchecked(
    implementation: Implementation,
    input: &[u8],
    skip_ascii_prefix: bool,
) -> Validation {
    match implementation {
        Implementation::Scalar => scalar::validate(input),
        Implementation::Portable => validate_portable(input, skip_ascii_prefix),
        #[cfg(target_arch = "x86_64")]
        Implementation::Sse => validate_sse(input, skip_ascii_prefix),
        #[cfg(target_arch = "x86_64")]
        Implementation::Avx2 => validate_avx2(input, skip_ascii_prefix),
        #[cfg(target_arch = "aarch64")]
        Implementation::Neon => validate_neon(input, skip_ascii_prefix),
        _ => scalar::validate(input),
    }
}

fn validate_portable(input: &[u8], skip_ascii_prefix: bool) -> Validation {
    // SAFETY: the portable lanes use no special instructions.
    unsafe { validate_vectorized::<Portable>(input, skip_ascii_prefix) }
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "ssse3")]
unsafe fn validate_sse(input: &[u8], skip_ascii_prefix: bool) -> Validation {
    validate_vectorized::<crate::simd::x86::Sse>(input, skip_ascii_prefix)
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
unsafe fn validate_avx2(input: &[u8], skip_ascii_prefix: bool) -> Validation {
    validate_vectorized::<crate::simd::x86::Avx2>(input, skip_ascii_prefix)
}

#[cfg(target_arch = "aarch64")]
#[target_feature(enable = "neon")]
unsafe fn validate_neon(input: &[u8], skip_ascii_prefix: bool) -> Validation {
    validate_vectorized::<crate::simd::neon::Neon>(input, skip_ascii_prefix)
}
