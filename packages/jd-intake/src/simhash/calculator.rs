//! Weighted 64-bit SimHash fingerprint of a canonical section map.

use std::collections::{HashMap, HashSet};

use sha2::{Digest, Sha256};

use crate::simhash::tokenizer::tokenize;
use crate::types::section::{CanonicalSections, JdSection};

/// Per-section token weights.
///
/// Passed explicitly into the calculator; there is no global weight table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionWeights {
    pub responsibilities: u64,
    pub requirements: u64,
    pub preferred: u64,
    pub etc: u64,
}

impl SectionWeights {
    /// Weight for a section.
    pub fn weight(&self, section: JdSection) -> u64 {
        match section {
            JdSection::Responsibilities => self.responsibilities,
            JdSection::Requirements => self.requirements,
            JdSection::Preferred => self.preferred,
            JdSection::Etc => self.etc,
        }
    }
}

impl Default for SectionWeights {
    fn default() -> Self {
        Self {
            responsibilities: 3,
            requirements: 3,
            preferred: 2,
            etc: 1,
        }
    }
}

/// Computes 64-bit near-duplicate fingerprints.
#[derive(Debug, Clone, Default)]
pub struct SimHashCalculator {
    weights: SectionWeights,
}

impl SimHashCalculator {
    /// Create a calculator with explicit section weights.
    pub fn new(weights: SectionWeights) -> Self {
        Self { weights }
    }

    /// Fingerprint a canonical section map.
    ///
    /// Each distinct token accumulates the weight of every section it appears
    /// in; how often it repeats inside a section does not matter, so the
    /// result is independent of both line order and token repetition. An
    /// empty token-weight map yields 0. Otherwise each of the 64 bit
    /// positions takes a weighted vote across all tokens: +weight if the
    /// token's hash has the bit set, -weight if not. The output bit is 1 iff
    /// the vote sum is strictly positive.
    pub fn fingerprint(&self, sections: &CanonicalSections) -> u64 {
        let mut token_weights: HashMap<String, u64> = HashMap::new();
        for (section, lines) in sections.iter() {
            let weight = self.weights.weight(section);
            let mut section_tokens: HashSet<String> = HashSet::new();
            for line in lines {
                section_tokens.extend(tokenize(line));
            }
            for token in section_tokens {
                *token_weights.entry(token).or_insert(0) += weight;
            }
        }

        if token_weights.is_empty() {
            return 0;
        }

        let mut votes = [0i64; 64];
        for (token, weight) in &token_weights {
            let hash = token_hash(token);
            for (bit, vote) in votes.iter_mut().enumerate() {
                if hash >> bit & 1 == 1 {
                    *vote += *weight as i64;
                } else {
                    *vote -= *weight as i64;
                }
            }
        }

        let mut fingerprint = 0u64;
        for (bit, vote) in votes.iter().enumerate() {
            // Ties at exactly zero resolve to 0.
            if *vote > 0 {
                fingerprint |= 1 << bit;
            }
        }
        fingerprint
    }
}

/// Stable, uniformly distributed 64-bit hash per token: the first 8 bytes of
/// the token's SHA-256 digest, big-endian.
fn token_hash(token: &str) -> u64 {
    let digest = Sha256::digest(token.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sections(responsibilities: &[&str], requirements: &[&str]) -> CanonicalSections {
        CanonicalSections::new()
            .set_lines(JdSection::Responsibilities, responsibilities.iter().copied())
            .set_lines(JdSection::Requirements, requirements.iter().copied())
    }

    #[test]
    fn test_empty_map_is_zero() {
        let calc = SimHashCalculator::default();
        assert_eq!(calc.fingerprint(&CanonicalSections::new()), 0);

        // Tokens that all get filtered out also leave the map empty.
        let only_noise =
            CanonicalSections::new().set_lines(JdSection::Etc, ["1 2 3", "-- //"]);
        assert_eq!(calc.fingerprint(&only_noise), 0);
    }

    #[test]
    fn test_deterministic() {
        let calc = SimHashCalculator::default();
        let s = sections(&["design and build intake services"], &["rust", "postgres"]);
        assert_eq!(calc.fingerprint(&s), calc.fingerprint(&s));
        assert_ne!(calc.fingerprint(&s), 0);
    }

    #[test]
    fn test_token_repetition_invariant() {
        // A token's weight comes from section membership, not occurrence
        // count, so repeating lines or tokens must not move the fingerprint.
        let calc = SimHashCalculator::default();
        let once = sections(&["build intake services"], &["rust"]);
        let repeated_lines = sections(
            &[
                "build intake services",
                "build intake services",
                "build intake services",
            ],
            &["rust"],
        );
        let repeated_tokens = sections(&["build build intake services"], &["rust", "rust"]);

        assert_eq!(calc.fingerprint(&once), calc.fingerprint(&repeated_lines));
        assert_eq!(calc.fingerprint(&once), calc.fingerprint(&repeated_tokens));
    }

    #[test]
    fn test_cross_section_membership_accumulates() {
        // "rust" in both sections carries weight 6 and outvotes "postgres"
        // (weight 3) on every bit, so the fingerprint equals hash("rust").
        // With membership in one section only, the weights tie at 3 and the
        // fingerprint drops every bit where the two hashes disagree.
        let calc = SimHashCalculator::default();
        let both = sections(&["rust"], &["rust postgres"]);
        let one = sections(&[], &["rust postgres"]);
        assert_ne!(calc.fingerprint(&both), calc.fingerprint(&one));
    }

    #[test]
    fn test_line_order_invariant_within_section() {
        let calc = SimHashCalculator::default();
        let a = sections(&["build services", "review code"], &["rust"]);
        let b = sections(&["review code", "build services"], &["rust"]);
        assert_eq!(calc.fingerprint(&a), calc.fingerprint(&b));
    }

    #[test]
    fn test_identical_sections_identical_fingerprint() {
        let calc = SimHashCalculator::default();
        let a = sections(&["build services"], &["rust", "sql"]);
        let b = sections(&["build services"], &["rust", "sql"]);
        assert_eq!(calc.fingerprint(&a), calc.fingerprint(&b));
    }

    #[test]
    fn test_section_weight_matters() {
        // The same token set under different weights can produce different
        // fingerprints; at minimum the calculator must honor the config.
        let heavy = SimHashCalculator::new(SectionWeights {
            responsibilities: 10,
            requirements: 1,
            preferred: 1,
            etc: 1,
        });
        let default = SimHashCalculator::default();

        let s = sections(
            &["distributed systems experience"],
            &["kubernetes helm terraform ansible packer"],
        );
        // Not asserting inequality of full fingerprints (weights may agree on
        // many bits); just that both are stable and non-zero.
        assert_ne!(heavy.fingerprint(&s), 0);
        assert_ne!(default.fingerprint(&s), 0);
    }

    #[test]
    fn test_token_hash_is_stable() {
        assert_eq!(token_hash("rust"), token_hash("rust"));
        assert_ne!(token_hash("rust"), token_hash("java"));
    }
}
