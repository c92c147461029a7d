//! Result rendering.
//!
//! Row order always follows submission order as preserved by the job
//! store, regardless of the order records completed in.

use fleetscan_core::{AppError, AppResult};
use fleetscan_entity::job::model::JobSnapshot;
use fleetscan_entity::job::record::Record;
use fleetscan_entity::job::status::RecordStatus;

/// Column set of the full export, in fixed order.
const CSV_COLUMNS: [&str; 14] = [
    "mc_number",
    "status",
    "company_name",
    "authority_status",
    "insurance_status",
    "insurance_expiry",
    "safety_score",
    "violations_12mo",
    "accidents_12mo",
    "phone",
    "email",
    "state",
    "risk_level",
    "extracted_at",
];

/// Column set of the failed-only export, in fixed order.
const FAILED_CSV_COLUMNS: [&str; 4] = ["mc_number", "failure_reason", "attempts", "failed_at"];

/// Render every record of the job as CSV, one row per record.
pub fn render_csv(snapshot: &JobSnapshot) -> AppResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(CSV_COLUMNS)
        .map_err(|e| AppError::internal(format!("CSV write error: {e}")))?;

    for record in &snapshot.records {
        writer
            .write_record(full_row(record))
            .map_err(|e| AppError::internal(format!("CSV write error: {e}")))?;
    }

    finish(writer)
}

/// Render every record of the job as a JSON array, same ordering and
/// field presence as the CSV export.
pub fn render_json(snapshot: &JobSnapshot) -> AppResult<String> {
    let rows: Vec<serde_json::Value> = snapshot.records.iter().map(full_object).collect();
    let rendered = serde_json::to_string_pretty(&rows)?;
    Ok(rendered)
}

/// Render only the records whose terminal status is `failed`.
pub fn render_failed_csv(snapshot: &JobSnapshot) -> AppResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(FAILED_CSV_COLUMNS)
        .map_err(|e| AppError::internal(format!("CSV write error: {e}")))?;

    for record in &snapshot.records {
        if record.status != RecordStatus::Failed {
            continue;
        }
        writer
            .write_record([
                record.identifier.clone(),
                record.failure_reason.clone().unwrap_or_default(),
                record.attempts.to_string(),
                record
                    .finished_at
                    .map(|t| t.to_rfc3339())
                    .unwrap_or_default(),
            ])
            .map_err(|e| AppError::internal(format!("CSV write error: {e}")))?;
    }

    finish(writer)
}

fn finish(writer: csv::Writer<Vec<u8>>) -> AppResult<String> {
    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::internal(format!("CSV flush error: {e}")))?;
    String::from_utf8(bytes).map_err(|e| AppError::internal(format!("CSV encoding error: {e}")))
}

/// One full-export row. Records without a payload (failed, cancelled,
/// still pending) leave the payload-derived columns empty.
fn full_row(record: &Record) -> Vec<String> {
    let opt = |value: &Option<String>| value.clone().unwrap_or_default();

    match &record.payload {
        Some(payload) => vec![
            record.identifier.clone(),
            record.status.to_string(),
            opt(&payload.company_name),
            opt(&payload.authority_status),
            opt(&payload.insurance_status),
            opt(&payload.insurance_expiry),
            format!("{:.1}", payload.safety_score),
            payload.violations_12mo.to_string(),
            payload.accidents_12mo.to_string(),
            opt(&payload.phone),
            opt(&payload.email),
            opt(&payload.state),
            payload.risk_level.to_string(),
            payload.extracted_at.to_rfc3339(),
        ],
        None => {
            let mut row = vec![record.identifier.clone(), record.status.to_string()];
            row.extend(std::iter::repeat_n(String::new(), CSV_COLUMNS.len() - 2));
            row
        }
    }
}

fn full_object(record: &Record) -> serde_json::Value {
    match &record.payload {
        Some(payload) => serde_json::json!({
            "mc_number": record.identifier,
            "status": record.status.as_str(),
            "company_name": payload.company_name,
            "authority_status": payload.authority_status,
            "insurance_status": payload.insurance_status,
            "insurance_expiry": payload.insurance_expiry,
            "safety_score": payload.safety_score,
            "violations_12mo": payload.violations_12mo,
            "accidents_12mo": payload.accidents_12mo,
            "phone": payload.phone,
            "email": payload.email,
            "state": payload.state,
            "risk_level": payload.risk_level.as_str(),
            "extracted_at": payload.extracted_at.to_rfc3339(),
        }),
        None => serde_json::json!({
            "mc_number": record.identifier,
            "status": record.status.as_str(),
            "failure_reason": record.failure_reason,
            "attempts": record.attempts,
        }),
    }
}
