//! Pure enrichment functions applied to a fetched carrier record.
//!
//! These derive the computed export fields (canonical authority status,
//! safety score, risk level) from the source-reported values.

use chrono::Utc;

use super::model::{CarrierRecord, RiskLevel};

/// Canonicalize a source-reported authority status into
/// `Active`, `Inactive`, `Suspended`, or `Unknown`.
pub fn canonical_authority_status(reported: &str) -> &'static str {
    let status = reported.to_lowercase();
    if status.is_empty() {
        return "Unknown";
    }
    if ["active", "authorized", "current", "valid"]
        .iter()
        .any(|term| status.contains(term))
    {
        return "Active";
    }
    if ["inactive", "revoked", "cancelled", "canceled", "out of service"]
        .iter()
        .any(|term| status.contains(term))
    {
        return "Inactive";
    }
    if status.contains("suspended") {
        return "Suspended";
    }
    "Unknown"
}

/// Safety score on a 1.0–10.0 scale. Each violation deducts 0.5 points
/// (capped at 4.0 total); each accident deducts 1.5 points (capped at 4.5).
pub fn calculate_safety_score(violations_12mo: u32, accidents_12mo: u32) -> f64 {
    let mut score = 10.0;
    score -= (f64::from(violations_12mo) * 0.5).min(4.0);
    score -= (f64::from(accidents_12mo) * 1.5).min(4.5);
    score = score.max(1.0);
    (score * 10.0).round() / 10.0
}

/// Risk classification: High above 3 violations or above 1 accident,
/// Medium for any nonzero history, Low otherwise.
pub fn determine_risk_level(violations_12mo: u32, accidents_12mo: u32) -> RiskLevel {
    if violations_12mo > 3 || accidents_12mo > 1 {
        RiskLevel::High
    } else if violations_12mo > 0 || accidents_12mo > 0 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

/// Apply all enrichment to a provider-produced record: canonical
/// authority status, safety score, risk level, extraction timestamp.
pub fn enrich(record: &mut CarrierRecord) {
    let canonical = canonical_authority_status(record.authority_status.as_deref().unwrap_or(""));
    record.authority_status = Some(canonical.to_string());

    record.safety_score = calculate_safety_score(record.violations_12mo, record.accidents_12mo);
    record.risk_level = determine_risk_level(record.violations_12mo, record.accidents_12mo);
    record.extracted_at = Utc::now();
}
