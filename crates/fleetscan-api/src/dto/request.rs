//! Request DTOs.

use serde::Deserialize;

/// JSON body for job creation: an explicit identifier list.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateJobRequest {
    /// Raw MC numbers; normalized and de-duplicated server-side.
    pub identifiers: Vec<String>,
}

/// Query parameters for remote-repository job creation.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteJobParams {
    /// Repository in `owner/repo` form; falls back to configuration.
    pub repo: Option<String>,
    /// File path inside the repository.
    pub path: Option<String>,
    /// Branch name.
    pub branch: Option<String>,
}

/// Query parameters for the history listing.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryParams {
    /// Maximum number of jobs to return.
    pub limit: Option<usize>,
}

/// Query parameters for result export.
#[derive(Debug, Clone, Deserialize)]
pub struct ExportParams {
    /// `"csv"` (default) or `"json"`.
    pub format: Option<String>,
}
