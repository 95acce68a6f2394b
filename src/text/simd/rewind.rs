//! Hand-off from the vectorized loop to the scalar validator.
//!
//! The classifier works a block at a time, so when it trips it only knows
//! that something in the current chunk (or a sequence left open by the
//! previous one) is wrong. Rescanning from the last lead byte before the
//! chunk gives the exact offset, kind, and deltas.

use crate::text::counts::Aggregates;
use crate::text::scalar;
use crate::text::utf8::{is_continuation_byte, Utf8ErrorKind, Validation};

/// A sequence is at most 4 bytes, so its lead is at most 3 bytes back.
pub(crate) const MAX_REWIND: usize = 3;

/// Start of the sequence containing byte `pos - 1`, if one is in reach.
#[inline]
fn sequence_start(input: &[u8], pos: usize) -> Option<usize> {
    if pos == 0 {
        return Some(0);
    }
    let floor = pos.saturating_sub(MAX_REWIND + 1);
    let mut q = pos - 1;
    while is_continuation_byte(input[q]) {
        if q == floor {
            return None;
        }
        q -= 1;
    }
    Some(q)
}

/// Finish validation of `input` from `pos`, where `counts` covers
/// `input[..pos]` and everything before `pos` passed the classifier.
#[cold]
pub(crate) fn rewind_and_validate(input: &[u8], pos: usize, mut counts: Aggregates) -> Validation {
    let Some(start) = sequence_start(input, pos) else {
        let start = pos.saturating_sub(MAX_REWIND + 1);
        tracing::trace!(pos, start, "no lead byte in rewind window");
        counts.remove(&input[start..pos]);
        let deltas = counts.deltas();
        return Validation::invalid(input.len(), start, Utf8ErrorKind::TooLong, deltas);
    };

    tracing::trace!(pos, start, "rescanning tail");
    counts.remove(&input[start..pos]);
    let tail = scalar::validate(&input[start..]);
    tail.rebase(start, counts.deltas())
}
