//! Length deltas from aggregate byte counts.
//!
//! The vectorized loop only counts three things per clean block: ASCII
//! bytes, continuation bytes, and 4-byte lead bytes (plus the block size).
//! For a region made only of complete, valid sequences the per-length lead
//! counts follow from two identities:
//!
//! ```text
//! t = n1 + 2·n2 + 3·n3 + 4·n4        (bytes)
//! t = n1 +   n2 +   n3 +   n4 + c    (leads plus continuations)
//! ```
//!
//! With `n1 = a` this gives
//!
//! ```text
//! n3 = a + 2·c − 2·n4 − t
//! n2 = 2·t − 2·a + n4 − 3·c
//! ```
//!
//! and the deltas are `utf16 = −(2·n4 + 2·n3 + n2)`, `scalar = −n4`.

use super::utf8::is_continuation_byte;
use crate::Deltas;

/// Aggregate byte counts over a scanned region.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Aggregates {
    pub(crate) ascii: usize,
    pub(crate) continuation: usize,
    pub(crate) four_byte_leads: usize,
    pub(crate) total: usize,
}

/// Number of multi-byte sequences of each length.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct LeadCounts {
    pub(crate) two: isize,
    pub(crate) three: isize,
    pub(crate) four: isize,
}

impl Aggregates {
    /// Count a run of `n` ASCII bytes.
    #[inline]
    pub(crate) fn add_ascii(&mut self, n: usize) {
        self.ascii += n;
        self.total += n;
    }

    #[inline]
    pub(crate) fn merge(&mut self, other: &Self) {
        self.ascii += other.ascii;
        self.continuation += other.continuation;
        self.four_byte_leads += other.four_byte_leads;
        self.total += other.total;
    }

    /// Take back the counts of bytes that were counted but must be rescanned.
    pub(crate) fn remove(&mut self, bytes: &[u8]) {
        for &b in bytes {
            if b < 0x80 {
                self.ascii -= 1;
            } else if is_continuation_byte(b) {
                self.continuation -= 1;
            } else if b >= 0xF0 {
                self.four_byte_leads -= 1;
            }
            self.total -= 1;
        }
    }

    /// Solve the counting identities for the per-length sequence counts.
    ///
    /// Only meaningful when the region holds complete, valid sequences.
    pub(crate) fn lead_counts(&self) -> LeadCounts {
        let a = self.ascii as isize;
        let c = self.continuation as isize;
        let n4 = self.four_byte_leads as isize;
        let t = self.total as isize;

        let three = a + 2 * c - 2 * n4 - t;
        let two = 2 * t - 2 * a + n4 - 3 * c;
        debug_assert!(
            three >= 0 && two >= 0,
            "counts of an invalid region: {self:?}"
        );

        LeadCounts {
            two,
            three,
            four: n4,
        }
    }

    /// Deltas for the region.
    pub(crate) fn deltas(&self) -> Deltas {
        let n = self.lead_counts();
        Deltas {
            utf16: -(2 * n.four + 2 * n.three + n.two),
            scalar: -n.four,
        }
    }
}
