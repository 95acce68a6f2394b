//! Text processing utilities.
//!
//! ## UTF-8 Validation
//!
//! The [`utf8`] module is the entry point. [`utf8::validate`] picks the best
//! vectorized implementation at call time; [`utf8::validate_scalar`] is the
//! byte-by-byte reference. Both report the offset of the first malformed
//! sequence and the UTF-16/scalar length deltas.
//!
//! ```
//! use utf8scan::text::utf8::{validate, Utf8ErrorKind};
//!
//! // Valid UTF-8
//! assert!(validate(b"Hello, world!").is_valid());
//! assert!(validate("日本語".as_bytes()).is_valid());
//!
//! // Invalid UTF-8 (bare continuation byte)
//! let result = validate(&[0x80]);
//! assert_eq!(result.error_kind(), Some(Utf8ErrorKind::TooLong));
//! assert_eq!(result.offset(), 0);
//! ```
//!
//! For input that arrives in pieces, [`stream::Utf8Stream`] threads the
//! carry state between chunks explicitly.

pub mod ascii;
pub mod stream;
pub mod utf8;

pub(crate) mod counts;
pub(crate) mod scalar;
pub(crate) mod simd;

// Re-export commonly used types
pub use utf8::{validate, Utf8Error, Utf8ErrorKind, Validation};
