//! Tokenization for SimHash fingerprinting.
//!
//! The policy here is part of the fingerprint format. Changing any rule
//! changes every stored fingerprint, so treat edits like a schema migration.

/// Tokenize text for fingerprinting.
///
/// Rules, in order:
/// - lowercase the input
/// - split on whitespace, `-`, `_`, `/`
/// - trim non-alphanumeric characters from both ends of each candidate
/// - drop tokens shorter than 2 characters
/// - drop tokens with no alphabetic character (pure numbers carry no signal)
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    lowered
        .split(|c: char| c.is_whitespace() || matches!(c, '-' | '_' | '/'))
        .map(|raw| raw.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|token| token.chars().count() >= 2)
        .filter(|token| token.chars().any(|c| c.is_alphabetic()))
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercases_and_splits() {
        assert_eq!(
            tokenize("Rust/Tokio back-end snake_case"),
            vec!["rust", "tokio", "back", "end", "snake", "case"]
        );
    }

    #[test]
    fn test_trims_boundary_punctuation() {
        assert_eq!(tokenize("(kubernetes), docker."), vec!["kubernetes", "docker"]);
    }

    #[test]
    fn test_drops_short_tokens() {
        assert_eq!(tokenize("a go c"), vec!["go"]);
    }

    #[test]
    fn test_drops_pure_numeric_tokens() {
        assert_eq!(tokenize("3 years 2024 k8s"), vec!["years", "k8s"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("  - _ / 12 3").is_empty());
    }
}
