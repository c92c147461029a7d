//! Carrier lookup against the public FMCSA carrier snapshot portal.
//!
//! This is the Rust rendition of the scripted portal lookup: it queries
//! the QCMobile-style JSON endpoint by docket number and maps the carrier
//! snapshot into our record shape.

use std::time::Duration;

use serde::Deserialize;

use fleetscan_core::{AppError, AppResult};
use fleetscan_entity::carrier::model::CarrierRecord;

use crate::error::{self, LookupError};
use crate::traits::LookupProvider;

/// Lookup strategy backed by the public carrier snapshot endpoint.
pub struct SaferPortalProvider {
    client: reqwest::Client,
    base_url: String,
}

impl SaferPortalProvider {
    /// Build a portal provider with a per-request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("fleetscan/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait::async_trait]
impl LookupProvider for SaferPortalProvider {
    fn name(&self) -> &'static str {
        "portal"
    }

    async fn lookup(&self, mc_number: &str) -> Result<CarrierRecord, LookupError> {
        let url = format!("{}/carriers/docket-number/{mc_number}", self.base_url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(error::from_status(status));
        }

        let body: PortalResponse = response
            .json()
            .await
            .map_err(|e| LookupError::Malformed(e.to_string()))?;

        let carrier = body
            .content
            .into_iter()
            .flatten()
            .next()
            .map(|item| item.carrier)
            .ok_or(LookupError::NotFound)?;

        tracing::debug!("Portal lookup for MC {} succeeded", mc_number);
        Ok(carrier.into_record(mc_number))
    }
}

/// Envelope of the snapshot endpoint: a `content` list of carrier items.
#[derive(Debug, Deserialize)]
struct PortalResponse {
    content: Option<Vec<PortalItem>>,
}

#[derive(Debug, Deserialize)]
struct PortalItem {
    carrier: PortalCarrier,
}

/// The subset of the carrier snapshot we extract.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PortalCarrier {
    legal_name: Option<String>,
    dot_number: Option<serde_json::Value>,
    common_authority_status: Option<String>,
    authority_type: Option<String>,
    bipd_insurance_on_file: Option<String>,
    insurance_expiration_date: Option<String>,
    safety_rating: Option<String>,
    inspection_violations_total: Option<u32>,
    crash_total: Option<u32>,
    authority_grant_date: Option<String>,
    email_address: Option<String>,
    telephone: Option<String>,
    phy_state: Option<String>,
}

impl PortalCarrier {
    fn into_record(self, mc_number: &str) -> CarrierRecord {
        let mut record = CarrierRecord::empty(mc_number);
        record.company_name = self.legal_name;
        record.dot_number = self.dot_number.map(|v| match v {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        });
        record.authority_status = self.common_authority_status;
        record.authority_type = self.authority_type;
        record.insurance_status = self.bipd_insurance_on_file.map(|on_file| {
            if on_file.eq_ignore_ascii_case("y") || on_file.eq_ignore_ascii_case("yes") {
                "Active".to_string()
            } else {
                "Expired".to_string()
            }
        });
        record.insurance_expiry = self.insurance_expiration_date;
        record.safety_rating = self.safety_rating;
        record.violations_12mo = self.inspection_violations_total.unwrap_or(0);
        record.accidents_12mo = self.crash_total.unwrap_or(0);
        record.authority_date = self.authority_grant_date;
        record.email = self.email_address;
        record.phone = self.telephone;
        record.state = self.phy_state;
        record
    }
}
