//! MC number normalization.
//!
//! Identifiers arrive from uploads and remote files in many shapes
//! (`"MC-123456"`, `" 123 456 "`, `"mc_123456"`). The engine works only
//! with the canonical digit string.

/// Normalize a raw identifier into its canonical MC number form.
///
/// Strips whitespace and common separators, drops a leading `MC` prefix
/// case-insensitively, and accepts only all-digit strings of at most
/// ten digits. Returns `None` for anything else.
pub fn normalize(raw: &str) -> Option<String> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_' | '.'))
        .collect();

    let digits = cleaned
        .strip_prefix("MC")
        .or_else(|| cleaned.strip_prefix("mc"))
        .or_else(|| cleaned.strip_prefix("Mc"))
        .or_else(|| cleaned.strip_prefix("mC"))
        .unwrap_or(&cleaned);

    if digits.is_empty() || digits.len() > 10 {
        return None;
    }
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(digits.to_string())
}
