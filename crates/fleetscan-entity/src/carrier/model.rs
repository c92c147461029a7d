//! Carrier record model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Risk classification derived from a carrier's violation and accident
/// history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Return the level as a display string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One carrier's data as produced by a lookup provider and enriched by
/// [`crate::carrier::enrich`].
///
/// The extraction engine treats this as an opaque payload; only the
/// exporter and the enrichment functions look inside.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarrierRecord {
    /// MC (docket) number the lookup was made for.
    pub mc_number: String,
    /// USDOT number.
    pub dot_number: Option<String>,
    /// Legal or DBA company name.
    pub company_name: Option<String>,
    /// Operating authority status as reported by the source.
    pub authority_status: Option<String>,
    /// Authority type (common, contract, broker).
    pub authority_type: Option<String>,
    /// Insurance on-file status.
    pub insurance_status: Option<String>,
    /// Insurance expiry date, as reported.
    pub insurance_expiry: Option<String>,
    /// Source-reported safety rating.
    pub safety_rating: Option<String>,
    /// Violations in the last 12 months.
    pub violations_12mo: u32,
    /// Accidents in the last 12 months.
    pub accidents_12mo: u32,
    /// Date the operating authority was granted.
    pub authority_date: Option<String>,
    /// Contact email.
    pub email: Option<String>,
    /// Contact phone.
    pub phone: Option<String>,
    /// Physical address state.
    pub state: Option<String>,
    /// Computed safety score, 1.0 (worst) to 10.0 (best).
    pub safety_score: f64,
    /// Computed risk classification.
    pub risk_level: RiskLevel,
    /// When the record was extracted.
    pub extracted_at: DateTime<Utc>,
}

impl CarrierRecord {
    /// Create an empty record for `mc_number` with neutral enrichment
    /// values; providers fill the reported fields before enrichment runs.
    pub fn empty(mc_number: impl Into<String>) -> Self {
        Self {
            mc_number: mc_number.into(),
            dot_number: None,
            company_name: None,
            authority_status: None,
            authority_type: None,
            insurance_status: None,
            insurance_expiry: None,
            safety_rating: None,
            violations_12mo: 0,
            accidents_12mo: 0,
            authority_date: None,
            email: None,
            phone: None,
            state: None,
            safety_score: 10.0,
            risk_level: RiskLevel::Low,
            extracted_at: Utc::now(),
        }
    }
}
