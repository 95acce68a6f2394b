//! UTF-8 validation with exact error offsets and transcoding deltas.
//!
//! This module provides UTF-8 validation that reports:
//! - The exact byte offset of the first malformed sequence
//! - The specific type of UTF-8 violation
//! - How many UTF-16 code units and Unicode scalars the input holds,
//!   expressed as deltas from the byte count
//!
//! ## UTF-8 Encoding Rules
//!
//! UTF-8 is a variable-width encoding that uses 1-4 bytes per character:
//!
//! | Bytes | First byte    | Continuation bytes | Code point range     | UTF-16 units |
//! |-------|---------------|-------------------|----------------------|--------------|
//! | 1     | `0xxxxxxx`    | -                 | U+0000 - U+007F      | 1            |
//! | 2     | `110xxxxx`    | `10xxxxxx`        | U+0080 - U+07FF      | 1            |
//! | 3     | `1110xxxx`    | `10xxxxxx` × 2    | U+0800 - U+FFFF      | 1            |
//! | 4     | `11110xxx`    | `10xxxxxx` × 3    | U+10000 - U+10FFFF   | 2            |
//!
//! ## Error Offsets
//!
//! Every error is reported at the first byte of the offending sequence, so
//! [`Validation::offset`] always equals the length of the longest valid
//! prefix. A stray continuation byte is its own one-byte sequence.
//!
//! ## Deltas
//!
//! For valid input of `n` bytes, UTF-16 length is `n + utf16_delta` and the
//! scalar count is `n + utf16_delta + scalar_delta`. On invalid input the
//! deltas cover the valid prefix only.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::scalar;
use super::simd::{self, Implementation};
use crate::config::{Config, ConfigError};
use crate::Deltas;

// =============================================================================
// Error types
// =============================================================================

/// Error information for UTF-8 validation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Utf8Error {
    /// The byte offset of the first byte of the malformed sequence (0-indexed).
    pub offset: usize,
    /// The kind of UTF-8 error.
    pub kind: Utf8ErrorKind,
}

impl Utf8Error {
    /// Line and column of the error within `input` (both 1-indexed, column in bytes).
    ///
    /// `input` must be the buffer the error was produced from.
    pub fn locate(&self, input: &[u8]) -> Location {
        let prefix = &input[..self.offset.min(input.len())];
        let line = 1 + prefix.iter().filter(|&&b| b == b'\n').count();
        let line_start = prefix
            .iter()
            .rposition(|&b| b == b'\n')
            .map_or(0, |i| i + 1);
        Location {
            line,
            column: self.offset - line_start + 1,
        }
    }
}

impl core::fmt::Display for Utf8Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} at byte {}", self.kind, self.offset)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Utf8Error {}

/// The specific type of UTF-8 validation error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Utf8ErrorKind {
    /// A lead byte was not followed by enough continuation bytes, either
    /// because another kind of byte appeared or because the input ended.
    TooShort,

    /// A continuation byte (0x80-0xBF) appeared where a lead byte was expected.
    TooLong,

    /// A character was encoded using more bytes than necessary.
    /// For example, encoding ASCII 'A' (U+0041) as `C1 81` instead of `41`.
    Overlong,

    /// A surrogate code point (U+D800-U+DFFF) was encoded.
    /// These are reserved for UTF-16 surrogate pairs and invalid in UTF-8.
    Surrogate,

    /// A code point above U+10FFFF was encoded.
    TooLarge,

    /// A byte in 0xF8-0xFF, which can never start a sequence.
    HeaderBits,
}

impl core::fmt::Display for Utf8ErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::TooShort => write!(f, "truncated UTF-8 sequence"),
            Self::TooLong => write!(f, "unexpected UTF-8 continuation byte"),
            Self::Overlong => write!(f, "overlong UTF-8 encoding"),
            Self::Surrogate => write!(f, "surrogate code point in UTF-8"),
            Self::TooLarge => write!(f, "code point above U+10FFFF"),
            Self::HeaderBits => write!(f, "invalid UTF-8 lead byte"),
        }
    }
}

/// Position of an error in human terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    /// Line number (1-indexed). Lines end at `\n`.
    pub line: usize,
    /// Byte position within the line (1-indexed).
    pub column: usize,
}

impl core::fmt::Display for Location {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

// =============================================================================
// Results
// =============================================================================

/// Lengths of a well-formed buffer in each encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Utf8Lengths {
    /// UTF-8 bytes.
    pub bytes: usize,
    /// UTF-16 code units.
    pub utf16: usize,
    /// Unicode scalar values (UTF-32 code units).
    pub scalars: usize,
}

/// Outcome of validating one buffer.
///
/// Identical inputs produce identical `Validation`s regardless of which
/// [`Implementation`] ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Validation {
    len: usize,
    offset: usize,
    deltas: Deltas,
    error: Option<Utf8ErrorKind>,
}

impl Validation {
    #[inline]
    pub(crate) const fn valid(len: usize, deltas: Deltas) -> Self {
        Self {
            len,
            offset: len,
            deltas,
            error: None,
        }
    }

    #[inline]
    pub(crate) const fn invalid(
        len: usize,
        offset: usize,
        kind: Utf8ErrorKind,
        deltas: Deltas,
    ) -> Self {
        Self {
            len,
            offset,
            deltas,
            error: Some(kind),
        }
    }

    /// Re-express a result computed over `whole[base..]` as a result over
    /// `whole`, where `prefix` holds the deltas of `whole[..base]`.
    #[inline]
    pub(crate) fn rebase(self, base: usize, prefix: Deltas) -> Self {
        Self {
            len: self.len + base,
            offset: self.offset + base,
            deltas: prefix + self.deltas,
            error: self.error,
        }
    }

    /// Length of the validated buffer.
    #[inline]
    pub fn input_len(&self) -> usize {
        self.len
    }

    /// Offset of the first malformed byte, or the input length if valid.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// True if the whole buffer is well-formed UTF-8.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }

    /// The error kind, if the buffer is malformed.
    #[inline]
    pub fn error_kind(&self) -> Option<Utf8ErrorKind> {
        self.error
    }

    /// The error, if the buffer is malformed.
    #[inline]
    pub fn error(&self) -> Option<Utf8Error> {
        self.error.map(|kind| Utf8Error {
            offset: self.offset,
            kind,
        })
    }

    /// Both deltas (covering the valid prefix when the input is malformed).
    #[inline]
    pub fn deltas(&self) -> Deltas {
        self.deltas
    }

    /// Reduction from byte count to UTF-16 code unit count.
    #[inline]
    pub fn utf16_delta(&self) -> isize {
        self.deltas.utf16
    }

    /// Reduction from UTF-16 code unit count to scalar count.
    #[inline]
    pub fn scalar_delta(&self) -> isize {
        self.deltas.scalar
    }

    /// Number of UTF-16 code units, if the input is valid.
    #[inline]
    pub fn utf16_len(&self) -> Option<usize> {
        if self.is_valid() {
            Some((self.len as isize + self.deltas.utf16) as usize)
        } else {
            None
        }
    }

    /// Number of Unicode scalar values, if the input is valid.
    #[inline]
    pub fn scalar_len(&self) -> Option<usize> {
        let utf16 = self.utf16_len()?;
        Some((utf16 as isize + self.deltas.scalar) as usize)
    }

    /// Convert into a `Result` carrying the encoded lengths.
    pub fn into_result(self) -> Result<Utf8Lengths, Utf8Error> {
        match self.error() {
            Some(err) => Err(err),
            None => Ok(Utf8Lengths {
                bytes: self.len,
                utf16: (self.len as isize + self.deltas.utf16) as usize,
                scalars: (self.len as isize + self.deltas.utf16 + self.deltas.scalar) as usize,
            }),
        }
    }
}

// =============================================================================
// Entry points
// =============================================================================

/// Validate that the input is valid UTF-8 using the best implementation
/// available on this CPU.
///
/// # Examples
///
/// ```
/// use utf8scan::text::utf8::validate;
///
/// // Valid multi-byte UTF-8
/// let v = validate("日本語".as_bytes());
/// assert!(v.is_valid());
/// assert_eq!(v.utf16_delta(), -6);
/// assert_eq!(v.scalar_delta(), 0);
///
/// // 4-byte sequence: two UTF-16 units, one scalar
/// let v = validate(&[0xF0, 0x90, 0x8C, 0xBC]);
/// assert_eq!((v.offset(), v.utf16_delta(), v.scalar_delta()), (4, -2, -1));
///
/// // Invalid: 0xC3 needs a continuation byte
/// assert_eq!(validate(&[0xC3, 0x28]).offset(), 0);
/// ```
#[inline]
pub fn validate(input: &[u8]) -> Validation {
    simd::validate_detected(input, true)
}

/// Validate using a specific implementation.
///
/// Returns `None` if `implementation` is not supported on this CPU.
#[inline]
pub fn validate_with(implementation: Implementation, input: &[u8]) -> Option<Validation> {
    simd::run(implementation, input, true)
}

/// Validate UTF-8 using the scalar (byte-by-byte) algorithm.
///
/// This is a portable implementation that works on all platforms and is the
/// reference every vectorized implementation must match.
#[inline]
pub fn validate_scalar(input: &[u8]) -> Validation {
    scalar::validate(input)
}

/// Validate a buffer given as a raw pointer and length.
///
/// # Panics
///
/// Panics if `ptr` is null and `len` is non-zero.
///
/// # Safety
///
/// Unless `len` is zero, `ptr` must be valid for reading `len` bytes for the
/// duration of the call.
pub unsafe fn validate_raw(ptr: *const u8, len: usize) -> Validation {
    assert!(
        !ptr.is_null() || len == 0,
        "null buffer passed with length {len}"
    );
    if len == 0 {
        return Validation::valid(0, Deltas::ZERO);
    }
    validate(core::slice::from_raw_parts(ptr, len))
}

// =============================================================================
// Configured validator
// =============================================================================

/// A validator bound to one implementation.
///
/// Holds no per-call state, so one `Validator` can be shared freely across
/// threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Validator {
    implementation: Implementation,
    skip_ascii_prefix: bool,
}

impl Validator {
    /// A validator using the best implementation for this CPU.
    pub fn new() -> Self {
        let implementation = Implementation::detect();
        tracing::debug!(implementation = %implementation, "selected UTF-8 implementation");
        Self {
            implementation,
            skip_ascii_prefix: true,
        }
    }

    /// Build a validator from a configuration.
    ///
    /// Fails if the configuration forces an implementation this CPU lacks.
    pub fn with_config(config: &Config) -> Result<Self, ConfigError> {
        let implementation = match config.implementation {
            Some(imp) if !imp.is_available() => return Err(ConfigError::Unavailable(imp)),
            Some(imp) => {
                tracing::debug!(implementation = %imp, "using forced UTF-8 implementation");
                imp
            }
            None => Implementation::detect(),
        };
        Ok(Self {
            implementation,
            skip_ascii_prefix: config.skip_ascii_prefix,
        })
    }

    /// The implementation this validator runs.
    #[inline]
    pub fn implementation(&self) -> Implementation {
        self.implementation
    }

    /// Validate one buffer.
    #[inline]
    pub fn validate(&self, input: &[u8]) -> Validation {
        // Availability was checked at construction.
        simd::run(self.implementation, input, self.skip_ascii_prefix)
            .unwrap_or_else(|| scalar::validate(input))
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Byte helpers
// =============================================================================

/// Check if a byte is a UTF-8 continuation byte (0x80-0xBF).
#[inline(always)]
pub fn is_continuation_byte(byte: u8) -> bool {
    (byte & 0xC0) == 0x80
}

/// Get the expected sequence length from a lead byte.
/// Returns 0 for bytes that cannot start a sequence (continuation bytes or 0xF8+).
#[inline]
pub fn sequence_length(lead_byte: u8) -> usize {
    match lead_byte {
        0x00..=0x7F => 1,
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // Scenario Tests
    // =========================================================================

    mod scenarios {
        use super::*;

        fn triple(input: &[u8]) -> (usize, isize, isize) {
            let v = validate(input);
            (v.offset(), v.utf16_delta(), v.scalar_delta())
        }

        #[test]
        fn single_ascii() {
            assert_eq!(triple(&[0x61]), (1, 0, 0));
        }

        #[test]
        fn two_byte() {
            assert_eq!(triple(&[0xC3, 0xB1]), (2, -1, 0));
        }

        #[test]
        fn four_byte() {
            assert_eq!(triple(&[0xF0, 0x90, 0x8C, 0xBC]), (4, -2, -1));
        }

        #[test]
        fn bad_continuation() {
            let v = validate(&[0xC3, 0x28]);
            assert_eq!(v.offset(), 0);
            assert_eq!(v.error_kind(), Some(Utf8ErrorKind::TooShort));
        }

        #[test]
        fn surrogate() {
            let v = validate(&[0xED, 0xA0, 0x81]);
            assert_eq!(v.offset(), 0);
            assert_eq!(v.error_kind(), Some(Utf8ErrorKind::Surrogate));
        }

        #[test]
        fn three_byte_then_long_ascii() {
            let mut input = "€".as_bytes().to_vec();
            input.extend(std::iter::repeat(b'x').take(500));
            assert_eq!(triple(&input), (input.len(), -2, 0));
        }

        #[test]
        fn empty() {
            let v = validate(b"");
            assert!(v.is_valid());
            assert_eq!(v.offset(), 0);
            assert_eq!(v.deltas(), Deltas::ZERO);
        }
    }

    // =========================================================================
    // Result Accessor Tests
    // =========================================================================

    mod results {
        use super::*;

        #[test]
        fn lengths_of_mixed_text() {
            let text = "A é 日 🎉";
            let lengths = validate(text.as_bytes()).into_result().unwrap();
            assert_eq!(lengths.bytes, text.len());
            assert_eq!(lengths.utf16, text.encode_utf16().count());
            assert_eq!(lengths.scalars, text.chars().count());
        }

        #[test]
        fn invalid_has_no_lengths() {
            let v = validate(b"abc\xFF");
            assert!(!v.is_valid());
            assert_eq!(v.utf16_len(), None);
            assert_eq!(v.scalar_len(), None);
            let err = v.into_result().unwrap_err();
            assert_eq!(err.offset, 3);
            assert_eq!(err.kind, Utf8ErrorKind::HeaderBits);
        }

        #[test]
        fn partial_deltas_cover_valid_prefix() {
            let mut input = "日本".as_bytes().to_vec();
            input.push(0x80);
            let v = validate(&input);
            assert_eq!(v.offset(), 6);
            assert_eq!(v.utf16_delta(), -4);
            assert_eq!(v.error_kind(), Some(Utf8ErrorKind::TooLong));
        }

        #[test]
        fn display() {
            let err = Utf8Error {
                offset: 7,
                kind: Utf8ErrorKind::Overlong,
            };
            assert_eq!(err.to_string(), "overlong UTF-8 encoding at byte 7");
        }
    }

    // =========================================================================
    // Error Position Tests
    // =========================================================================

    mod error_positions {
        use super::*;

        fn locate(input: &[u8]) -> Location {
            validate(input).error().unwrap().locate(input)
        }

        #[test]
        fn line_and_column_first_byte() {
            assert_eq!(locate(&[0x80]), Location { line: 1, column: 1 });
        }

        #[test]
        fn line_and_column_after_ascii() {
            assert_eq!(locate(b"Hello\x80"), Location { line: 1, column: 6 });
        }

        #[test]
        fn line_and_column_second_line() {
            assert_eq!(locate(b"Hello\nWorld\x80"), Location { line: 2, column: 6 });
        }

        #[test]
        fn line_and_column_after_multibyte() {
            let mut input = "日本".as_bytes().to_vec();
            input.push(0x80);
            assert_eq!(locate(&input), Location { line: 1, column: 7 });
        }

        #[test]
        fn multiple_newlines() {
            assert_eq!(locate(b"\n\n\n\n\x80"), Location { line: 5, column: 1 });
        }

        #[test]
        fn location_display() {
            let loc = Location { line: 3, column: 6 };
            assert_eq!(loc.to_string(), "line 3, column 6");
        }
    }

    // =========================================================================
    // Raw Entry Point Tests
    // =========================================================================

    mod raw {
        use super::*;

        #[test]
        fn raw_matches_slice() {
            let input = "Grüße".as_bytes();
            let v = unsafe { validate_raw(input.as_ptr(), input.len()) };
            assert_eq!(v, validate(input));
        }

        #[test]
        fn raw_null_empty_is_valid() {
            let v = unsafe { validate_raw(core::ptr::null(), 0) };
            assert!(v.is_valid());
            assert_eq!(v.input_len(), 0);
        }

        #[test]
        #[should_panic(expected = "null buffer")]
        fn raw_null_with_length_panics() {
            let _ = unsafe { validate_raw(core::ptr::null(), 4) };
        }
    }

    // =========================================================================
    // Validator Tests
    // =========================================================================

    mod validator {
        use super::*;

        #[test]
        fn forced_scalar() {
            let config = Config::new().with_implementation(Implementation::Scalar);
            let validator = Validator::with_config(&config).unwrap();
            assert_eq!(validator.implementation(), Implementation::Scalar);
            let input = "ñ".as_bytes();
            assert_eq!(validator.validate(input), validate(input));
        }

        #[test]
        fn without_ascii_skip_agrees() {
            let config = Config::new().with_skip_ascii_prefix(false);
            let validator = Validator::with_config(&config).unwrap();
            let mut input = vec![b'a'; 200];
            input.extend_from_slice("ü".as_bytes());
            input.push(0xC0);
            assert_eq!(validator.validate(&input), validate(&input));
        }

        #[cfg(not(target_arch = "aarch64"))]
        #[test]
        fn unavailable_implementation_is_rejected() {
            let config = Config::new().with_implementation(Implementation::Neon);
            assert_eq!(
                Validator::with_config(&config),
                Err(ConfigError::Unavailable(Implementation::Neon))
            );
        }
    }

    // =========================================================================
    // Sequence Length Tests
    // =========================================================================

    mod sequence_length_tests {
        use super::*;

        #[test]
        fn lengths_by_lead_range() {
            for byte in 0x00..=0x7F {
                assert_eq!(sequence_length(byte), 1);
            }
            for byte in 0x80..=0xBF {
                assert_eq!(sequence_length(byte), 0);
                assert!(is_continuation_byte(byte));
            }
            for byte in 0xC0..=0xDF {
                assert_eq!(sequence_length(byte), 2);
            }
            for byte in 0xE0..=0xEF {
                assert_eq!(sequence_length(byte), 3);
            }
            for byte in 0xF0..=0xF7 {
                assert_eq!(sequence_length(byte), 4);
            }
            for byte in 0xF8..=0xFF {
                assert_eq!(sequence_length(byte), 0);
            }
        }
    }
}
