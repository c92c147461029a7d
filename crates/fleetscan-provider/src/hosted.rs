//! Carrier lookup through a hosted extraction API.
//!
//! Calls a run-sync actor endpoint with a bearer token and maps the
//! returned dataset items. Field names follow the actor's conventions,
//! with fallback aliases for the variants seen in the wild.

use std::time::Duration;

use serde::Deserialize;

use fleetscan_core::{AppError, AppResult};
use fleetscan_entity::carrier::model::CarrierRecord;

use crate::error::{self, LookupError};
use crate::traits::LookupProvider;

/// Lookup strategy backed by a hosted extraction actor.
pub struct HostedApiProvider {
    client: reqwest::Client,
    base_url: String,
    actor_id: String,
    api_key: String,
}

impl HostedApiProvider {
    /// Build a hosted provider with a per-request timeout.
    pub fn new(
        base_url: &str,
        actor_id: &str,
        api_key: &str,
        timeout: Duration,
    ) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("fleetscan/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            actor_id: actor_id.to_string(),
            api_key: api_key.to_string(),
        })
    }
}

#[async_trait::async_trait]
impl LookupProvider for HostedApiProvider {
    fn name(&self) -> &'static str {
        "hosted"
    }

    async fn lookup(&self, mc_number: &str) -> Result<CarrierRecord, LookupError> {
        let url = format!(
            "{}/acts/{}/run-sync-get-dataset-items",
            self.base_url, self.actor_id
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({ "mcNumber": mc_number }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(error::from_status(status));
        }

        let items: Vec<HostedItem> = response
            .json()
            .await
            .map_err(|e| LookupError::Malformed(e.to_string()))?;

        let item = items.into_iter().next().ok_or(LookupError::NotFound)?;

        tracing::debug!("Hosted lookup for MC {} succeeded", mc_number);
        Ok(item.into_record(mc_number))
    }
}

/// One dataset item from the actor run.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HostedItem {
    #[serde(alias = "name")]
    company_name: Option<String>,
    #[serde(alias = "DOT")]
    dot_number: Option<serde_json::Value>,
    #[serde(alias = "status")]
    authority_status: Option<String>,
    authority_type: Option<String>,
    insurance_status: Option<String>,
    #[serde(alias = "insuranceExpiration")]
    insurance_expiry: Option<String>,
    safety_rating: Option<String>,
    #[serde(default)]
    violations_12mo: u32,
    #[serde(default)]
    accidents_12mo: u32,
    #[serde(alias = "establishedDate")]
    authority_date: Option<String>,
    email: Option<String>,
    #[serde(alias = "phoneNumber")]
    phone: Option<String>,
    state: Option<String>,
}

impl HostedItem {
    fn into_record(self, mc_number: &str) -> CarrierRecord {
        let mut record = CarrierRecord::empty(mc_number);
        record.company_name = self.company_name;
        record.dot_number = self.dot_number.map(|v| match v {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        });
        record.authority_status = self.authority_status;
        record.authority_type = self.authority_type;
        record.insurance_status = self.insurance_status;
        record.insurance_expiry = self.insurance_expiry;
        record.safety_rating = self.safety_rating;
        record.violations_12mo = self.violations_12mo;
        record.accidents_12mo = self.accidents_12mo;
        record.authority_date = self.authority_date;
        record.email = self.email;
        record.phone = self.phone;
        record.state = self.state;
        record
    }
}
