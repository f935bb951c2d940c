//! Deterministic plain-text projection of a canonical section map.
//!
//! Used for logging and fallback similarity, never as the dedup key itself.

use crate::types::section::CanonicalSections;

/// Render a section map as a single deterministic string.
///
/// Sections are emitted in canonical enum order regardless of how the map was
/// populated. Empty sections are skipped. Each block is a bracketed section
/// header followed by its lines; blocks are separated by a blank line.
pub fn canonical_text(sections: &CanonicalSections) -> String {
    let mut blocks = Vec::new();
    for (section, lines) in sections.iter() {
        let mut block = format!("[{}]", section.key());
        for line in lines {
            block.push('\n');
            block.push_str(line);
        }
        blocks.push(block);
    }
    blocks.join("\n\n")
}
