//! Identifier extraction from free-form text.

use std::collections::HashSet;

use fleetscan_entity::carrier::mc;

/// Extract MC numbers from uploaded text: CSV, comma-separated values,
/// or one identifier per line. Tokens that do not normalize into a valid
/// MC number (header cells, company names) are skipped; duplicates are
/// dropped preserving first occurrence.
pub fn extract_identifiers(input: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut identifiers = Vec::new();

    for line in input.lines() {
        if line.trim().is_empty() {
            continue;
        }
        for token in line.split(',') {
            if let Some(normalized) = mc::normalize(token) {
                if seen.insert(normalized.clone()) {
                    identifiers.push(normalized);
                }
            }
        }
    }

    identifiers
}
