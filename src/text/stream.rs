//! Incremental UTF-8 validation over a sequence of chunks.
//!
//! A [`Utf8Stream`] validates input that arrives in pieces, such as reads
//! from a socket. A sequence split across two chunks is held back (at most
//! three bytes) until the rest of it arrives. The final [`Validation`] is
//! the same as validating the concatenation of all chunks in one call.
//!
//! ```
//! use utf8scan::Utf8Stream;
//!
//! let text = "größer 🎉".as_bytes();
//! let mut stream = Utf8Stream::new();
//! for piece in text.chunks(3) {
//!     stream.feed(piece).unwrap();
//! }
//! let v = stream.finish();
//! assert_eq!(v, utf8scan::validate(text));
//! ```

use super::scalar;
use super::utf8::{is_continuation_byte, sequence_length, Utf8Error, Validation, Validator};
use crate::Deltas;

/// Streaming validator state.
#[derive(Debug, Clone)]
pub struct Utf8Stream {
    validator: Validator,
    /// Leading bytes of a sequence split across chunks.
    pending: [u8; 4],
    pending_len: usize,
    /// Bytes before `pending`, all validated.
    validated: usize,
    /// Bytes passed to `feed`, including any after an error.
    fed: usize,
    deltas: Deltas,
    error: Option<Utf8Error>,
}

impl Utf8Stream {
    /// A stream using the best implementation for this CPU.
    pub fn new() -> Self {
        Self::with_validator(Validator::new())
    }

    /// A stream that validates complete runs with `validator`.
    pub fn with_validator(validator: Validator) -> Self {
        Self {
            validator,
            pending: [0; 4],
            pending_len: 0,
            validated: 0,
            fed: 0,
            deltas: Deltas::ZERO,
            error: None,
        }
    }

    /// Total bytes fed so far.
    #[inline]
    pub fn bytes_consumed(&self) -> usize {
        self.fed
    }

    /// The first error seen, if any.
    #[inline]
    pub fn error(&self) -> Option<Utf8Error> {
        self.error
    }

    /// Validate the next chunk.
    ///
    /// Returns the first error in the stream as soon as it is known. Once an
    /// error has been returned, later calls return the same error.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<(), Utf8Error> {
        self.fed += chunk.len();
        if let Some(err) = self.error {
            return Err(err);
        }

        let mut rest = chunk;
        if self.pending_len > 0 {
            rest = self.complete_pending(rest)?;
            if self.pending_len > 0 {
                return Ok(());
            }
        }

        let split = complete_prefix_len(rest);
        let (whole, tail) = rest.split_at(split);
        let v = self.validator.validate(whole);
        self.deltas += v.deltas();
        if let Some(err) = v.error() {
            return Err(self.fail(self.validated + err.offset, err));
        }
        self.validated += whole.len();

        self.pending[..tail.len()].copy_from_slice(tail);
        self.pending_len = tail.len();
        Ok(())
    }

    /// Finish the stream, reporting a sequence left open at the end.
    pub fn finish(self) -> Validation {
        if let Some(err) = self.error {
            return Validation::invalid(self.fed, err.offset, err.kind, self.deltas);
        }
        if self.pending_len > 0 {
            return scalar::validate(&self.pending[..self.pending_len])
                .rebase(self.validated, self.deltas);
        }
        Validation::valid(self.fed, self.deltas)
    }

    /// Append bytes of `input` to the pending sequence and validate it once
    /// it is complete or broken. Returns the unused part of `input`.
    fn complete_pending<'a>(&mut self, input: &'a [u8]) -> Result<&'a [u8], Utf8Error> {
        let expected = sequence_length(self.pending[0]);
        let take = (expected - self.pending_len).min(input.len());
        self.pending[self.pending_len..self.pending_len + take].copy_from_slice(&input[..take]);
        self.pending_len += take;

        let seq = &self.pending[..self.pending_len];
        let broken = !seq[1..].iter().all(|&b| is_continuation_byte(b));
        if self.pending_len < expected && !broken {
            return Ok(&input[take..]);
        }

        let v = scalar::validate(seq);
        if let Some(err) = v.error() {
            return Err(self.fail(self.validated + err.offset, err));
        }
        self.deltas += v.deltas();
        self.validated += self.pending_len;
        self.pending_len = 0;
        Ok(&input[take..])
    }

    #[cold]
    fn fail(&mut self, offset: usize, err: Utf8Error) -> Utf8Error {
        let err = Utf8Error {
            offset,
            kind: err.kind,
        };
        tracing::debug!(offset, kind = %err.kind, "invalid UTF-8 in stream");
        self.error = Some(err);
        err
    }
}

impl Default for Utf8Stream {
    fn default() -> Self {
        Self::new()
    }
}

/// Length of the prefix of `input` that does not end inside a sequence.
///
/// Only a lead byte in the last three positions whose sequence runs past
/// the end is held back; anything malformed is left for the validator.
fn complete_prefix_len(input: &[u8]) -> usize {
    let len = input.len();
    for i in (len.saturating_sub(3)..len).rev() {
        let b = input[i];
        if is_continuation_byte(b) {
            continue;
        }
        let needed = sequence_length(b);
        return if needed > len - i { i } else { len };
    }
    len
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::utf8::{validate, Utf8ErrorKind};

    fn stream_of(chunks: &[&[u8]]) -> Validation {
        let mut stream = Utf8Stream::new();
        for chunk in chunks {
            let _ = stream.feed(chunk);
        }
        stream.finish()
    }

    fn every_split(input: &[u8]) {
        let expected = validate(input);
        for i in 0..=input.len() {
            for j in i..=input.len() {
                let got = stream_of(&[&input[..i], &input[i..j], &input[j..]]);
                assert_eq!(got, expected, "splits {} {} of {:02X?}", i, j, input);
            }
        }
    }

    #[test]
    fn prefix_len_holds_back_open_sequence() {
        assert_eq!(complete_prefix_len(b""), 0);
        assert_eq!(complete_prefix_len(b"abc"), 3);
        assert_eq!(complete_prefix_len(&[b'a', 0xC3]), 1);
        assert_eq!(complete_prefix_len(&[b'a', 0xF0, 0x9F, 0x8E]), 1);
        assert_eq!(complete_prefix_len(&[b'a', 0xF0, 0x9F, 0x8E, 0x89]), 5);
        assert_eq!(complete_prefix_len(&[b'a', 0x80, 0x80, 0x80]), 4);
        assert_eq!(complete_prefix_len(&[b'a', 0xFF]), 2);
    }

    #[test]
    fn valid_text_every_split() {
        every_split("aé€🎉z".as_bytes());
    }

    #[test]
    fn invalid_text_every_split() {
        every_split(&[b'a', 0xE2, 0x82, b'b', 0xC3, 0xA9]);
        every_split(&[0xC3, 0xA9, 0xED, 0xA0, 0x80, b'x']);
        every_split(&[0xF0, 0x9F, 0x8E]);
        every_split(&[0xC3, 0x80, 0x80]);
        every_split(&[0xF4, 0x90, 0x80, 0x80]);
    }

    #[test]
    fn one_byte_at_a_time() {
        let text = "Größe: 日本 🎉!".as_bytes();
        let mut stream = Utf8Stream::new();
        for &b in text {
            stream.feed(&[b]).unwrap();
        }
        assert_eq!(stream.bytes_consumed(), text.len());
        assert_eq!(stream.finish(), validate(text));
    }

    #[test]
    fn error_is_sticky() {
        let mut stream = Utf8Stream::new();
        stream.feed(b"ok ").unwrap();
        let err = stream.feed(&[b'x', 0xFF]).unwrap_err();
        assert_eq!(err.offset, 4);
        assert_eq!(err.kind, Utf8ErrorKind::HeaderBits);
        assert_eq!(stream.feed(b"more"), Err(err));
        assert_eq!(stream.error(), Some(err));
        let v = stream.finish();
        assert_eq!(v.input_len(), 9);
        assert_eq!(v.error(), Some(err));
    }

    #[test]
    fn broken_pending_sequence_reported_early() {
        let mut stream = Utf8Stream::new();
        stream.feed(&[b'a', b'b', 0xE2]).unwrap();
        let err = stream.feed(b"c").unwrap_err();
        assert_eq!(err.offset, 2);
        assert_eq!(err.kind, Utf8ErrorKind::TooShort);
    }

    #[test]
    fn open_sequence_at_finish() {
        let mut stream = Utf8Stream::new();
        stream.feed("é".as_bytes()).unwrap();
        stream.feed(&[0xF0, 0x9F]).unwrap();
        let v = stream.finish();
        assert_eq!(v.offset(), 2);
        assert_eq!(v.error_kind(), Some(Utf8ErrorKind::TooShort));
        assert_eq!(v.utf16_delta(), -1);
    }

    #[test]
    fn empty_stream() {
        let v = Utf8Stream::default().finish();
        assert!(v.is_valid());
        assert_eq!(v.input_len(), 0);
    }
}
