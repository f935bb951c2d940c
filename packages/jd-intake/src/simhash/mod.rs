//! Near-duplicate fingerprinting.
//!
//! - [`tokenizer`] - text → filtered token stream
//! - [`calculator`] - weighted 64-bit fingerprint over a section map
//! - [`similarity`] - Hamming-distance classification

pub mod calculator;
pub mod similarity;
pub mod tokenizer;

pub use calculator::{SectionWeights, SimHashCalculator};
pub use similarity::{
    classify, hamming_distance, is_duplicate, Similarity, DEFAULT_DUPLICATE_THRESHOLD,
};
pub use tokenizer::tokenize;
