//! Identifier source configuration.

use serde::{Deserialize, Serialize};

/// Remote identifier-list source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Default repository in `owner/repo` form.
    #[serde(default)]
    pub github_repo: String,
    /// Path of the identifier list file inside the repository.
    #[serde(default = "default_mc_list_path")]
    pub mc_list_path: String,
    /// Branch to read from.
    #[serde(default = "default_branch")]
    pub branch: String,
    /// Optional API token for private repositories.
    #[serde(default)]
    pub github_token: String,
    /// GitHub API base URL (overridable for tests).
    #[serde(default = "default_api_base_url")]
    pub github_api_base_url: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            github_repo: String::new(),
            mc_list_path: default_mc_list_path(),
            branch: default_branch(),
            github_token: String::new(),
            github_api_base_url: default_api_base_url(),
        }
    }
}

fn default_mc_list_path() -> String {
    "mc_list.txt".to_string()
}

fn default_branch() -> String {
    "main".to_string()
}

fn default_api_base_url() -> String {
    "https://api.github.com".to_string()
}
