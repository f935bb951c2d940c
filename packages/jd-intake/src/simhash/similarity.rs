//! Hamming-distance classification of SimHash fingerprints.

/// Default near-duplicate gate: fingerprints within this distance are
/// treated as duplicates.
pub const DEFAULT_DUPLICATE_THRESHOLD: u32 = 10;

/// Number of differing bits between two fingerprints.
pub fn hamming_distance(a: u64, b: u64) -> u32 {
    (a ^ b).count_ones()
}

/// Similarity bands over Hamming distance (inclusive upper bounds).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Similarity {
    /// distance 0
    Identical,
    /// distance 1..=5
    AlmostSame,
    /// distance 6..=10
    VerySimilar,
    /// distance 11..=15
    Similar,
    /// distance 16..=64
    Different,
}

impl Similarity {
    /// Classify a Hamming distance.
    pub fn from_distance(distance: u32) -> Self {
        match distance {
            0 => Similarity::Identical,
            1..=5 => Similarity::AlmostSame,
            6..=10 => Similarity::VerySimilar,
            11..=15 => Similarity::Similar,
            _ => Similarity::Different,
        }
    }
}

/// Classify the similarity of two fingerprints.
pub fn classify(a: u64, b: u64) -> Similarity {
    Similarity::from_distance(hamming_distance(a, b))
}

/// Near-duplicate gate at the given inclusive threshold.
pub fn is_duplicate(a: u64, b: u64, threshold: u32) -> bool {
    hamming_distance(a, b) <= threshold
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_classification_bands() {
        assert_eq!(Similarity::from_distance(0), Similarity::Identical);
        assert_eq!(Similarity::from_distance(5), Similarity::AlmostSame);
        assert_eq!(Similarity::from_distance(6), Similarity::VerySimilar);
        assert_eq!(Similarity::from_distance(10), Similarity::VerySimilar);
        assert_eq!(Similarity::from_distance(15), Similarity::Similar);
        assert_eq!(Similarity::from_distance(16), Similarity::Different);
        assert_eq!(Similarity::from_distance(64), Similarity::Different);
    }

    #[test]
    fn test_default_gate() {
        let a = 0u64;
        let b = 0b11_1111_1111u64; // 10 bits apart
        assert!(is_duplicate(a, b, DEFAULT_DUPLICATE_THRESHOLD));
        assert!(!is_duplicate(a, b << 1 | 1, DEFAULT_DUPLICATE_THRESHOLD));
    }

    proptest! {
        #[test]
        fn prop_hamming_symmetric(a: u64, b: u64) {
            prop_assert_eq!(hamming_distance(a, b), hamming_distance(b, a));
        }

        #[test]
        fn prop_hamming_zero_iff_equal(a: u64, b: u64) {
            prop_assert_eq!(hamming_distance(a, a), 0);
            prop_assert_eq!(hamming_distance(a, b) == 0, a == b);
        }

        #[test]
        fn prop_hamming_bounded(a: u64, b: u64) {
            prop_assert!(hamming_distance(a, b) <= 64);
        }
    }
}
