//! The vectorized validation loop, generic over the lane type.
//!
//! Input is consumed in 64-byte chunks (four 16-byte or two 32-byte
//! vectors). A chunk with no high bit anywhere takes the ASCII fast path;
//! other chunks run the full classifier and add their byte counts. The
//! first chunk that raises an error, and the sub-chunk tail, go to
//! [`rewind_and_validate`].

use super::classify::{block_counts, ClassifierState, Constants};
use super::rewind::rewind_and_validate;
use crate::simd::SimdVector;
use crate::text::ascii::first_non_ascii;
use crate::text::counts::Aggregates;
use crate::text::utf8::Validation;

/// Bytes per loop iteration.
pub(crate) const CHUNK: usize = 64;

/// Upper bound on vectors per chunk (16-byte lanes).
const MAX_VECTORS: usize = CHUNK / 16;

/// Validate `input` with lane type `V`.
///
/// # Safety
///
/// The CPU must support the instructions `V` is built on. Callers enter
/// through a `#[target_feature]` function so this body inlines into it.
#[inline(always)]
pub(crate) unsafe fn validate_vectorized<V: SimdVector>(
    input: &[u8],
    skip_ascii_prefix: bool,
) -> Validation {
    let len = input.len();
    let ptr = input.as_ptr();
    let mut counts = Aggregates::default();
    let mut pos = 0;

    if skip_ascii_prefix {
        pos = first_non_ascii(input);
        counts.add_ascii(pos);
    }

    let c = Constants::<V>::new();
    let mut state = ClassifierState::<V>::new();
    let vectors_per_chunk = CHUNK / V::WIDTH;
    let mut vectors = [V::zero(); MAX_VECTORS];

    while pos + CHUNK <= len {
        let chunk = ptr.add(pos);
        let mut any = V::zero();
        for (i, v) in vectors[..vectors_per_chunk].iter_mut().enumerate() {
            *v = V::load(chunk.add(i * V::WIDTH));
            any = any.or(*v);
        }
        let blocks = &vectors[..vectors_per_chunk];

        if any.is_ascii() {
            state.check_ascii_block(blocks[vectors_per_chunk - 1]);
            if state.has_error() {
                return rewind_and_validate(input, pos, counts);
            }
            counts.add_ascii(CHUNK);
        } else {
            let mut chunk_counts = Aggregates::default();
            for &v in blocks {
                state.check_block(v, &c);
                chunk_counts.merge(&block_counts(v, &c));
            }
            if state.has_error() {
                return rewind_and_validate(input, pos, counts);
            }
            counts.merge(&chunk_counts);
        }
        pos += CHUNK;
    }

    if pos == len && !state.has_pending() {
        return Validation::valid(len, counts.deltas());
    }
    rewind_and_validate(input, pos, counts)
}
