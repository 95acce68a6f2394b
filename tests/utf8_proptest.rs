//! Property tests for validation results and streaming.

use proptest::prelude::*;
use utf8scan::{validate, validate_scalar, validate_with, Implementation, Utf8Stream};

fn split_points(len: usize, cuts: &[usize]) -> Vec<usize> {
    let mut points: Vec<usize> = cuts.iter().map(|c| c % (len + 1)).collect();
    points.push(0);
    points.push(len);
    points.sort_unstable();
    points
}

proptest! {
    #[test]
    fn test_valid_text_round_trips(s in "\\PC*") {
        let v = validate(s.as_bytes());
        prop_assert!(v.is_valid());
        prop_assert_eq!(v.offset(), s.len());
        let utf16 = s.encode_utf16().count();
        prop_assert_eq!(s.len() as isize + v.utf16_delta(), utf16 as isize);
        let scalars = s.chars().count() as isize;
        prop_assert_eq!(utf16 as isize + v.scalar_delta(), scalars);
        prop_assert!(v.utf16_delta() <= 0 && v.scalar_delta() <= 0);
    }

    #[test]
    fn test_any_char_round_trips(s in "[\u{0}-\u{10FFFF}]{0,200}") {
        let v = validate(s.as_bytes());
        prop_assert_eq!(v.utf16_len(), Some(s.encode_utf16().count()));
        prop_assert_eq!(v.scalar_len(), Some(s.chars().count()));
    }

    #[test]
    fn test_arbitrary_bytes_match_std(bytes in proptest::collection::vec(any::<u8>(), 0..300)) {
        let v = validate(&bytes);
        match std::str::from_utf8(&bytes) {
            Ok(_) => prop_assert!(v.is_valid()),
            Err(e) => {
                prop_assert!(!v.is_valid());
                prop_assert_eq!(v.offset(), e.valid_up_to());
            }
        }
        for imp in Implementation::available() {
            prop_assert_eq!(validate_with(imp, &bytes), Some(validate_scalar(&bytes)));
        }
    }

    #[test]
    fn test_corrupted_text_matches_scalar(
        s in "\\PC{1,150}",
        index in any::<prop::sample::Index>(),
        byte in any::<u8>(),
    ) {
        let mut bytes = s.into_bytes();
        let i = index.index(bytes.len());
        bytes[i] = byte;
        let expected = validate_scalar(&bytes);
        for imp in Implementation::available() {
            prop_assert_eq!(validate_with(imp, &bytes), Some(expected));
        }
    }

    #[test]
    fn test_stream_matches_whole_buffer(
        bytes in proptest::collection::vec(any::<u8>(), 0..200),
        cuts in proptest::collection::vec(any::<usize>(), 0..6),
    ) {
        let points = split_points(bytes.len(), &cuts);
        let mut stream = Utf8Stream::new();
        for w in points.windows(2) {
            let _ = stream.feed(&bytes[w[0]..w[1]]);
        }
        prop_assert_eq!(stream.finish(), validate(&bytes));
    }

    #[test]
    fn test_stream_of_text_matches_whole_buffer(
        s in "\\PC{0,100}",
        cuts in proptest::collection::vec(any::<usize>(), 0..6),
    ) {
        let bytes = s.as_bytes();
        let points = split_points(bytes.len(), &cuts);
        let mut stream = Utf8Stream::new();
        for w in points.windows(2) {
            prop_assert!(stream.feed(&bytes[w[0]..w[1]]).is_ok());
        }
        prop_assert_eq!(stream.finish(), validate(bytes));
    }
}
