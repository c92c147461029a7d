//! Identifier source over a file in a remote GitHub repository.

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Deserialize;

use fleetscan_core::config::source::SourceConfig;

use crate::error::SourceError;
use crate::parse;
use crate::traits::IdentifierSource;

/// Reads the MC list file from a repository through the contents API.
pub struct RemoteRepoSource {
    client: reqwest::Client,
    api_base_url: String,
    repo: String,
    path: String,
    branch: String,
    token: String,
}

impl RemoteRepoSource {
    /// Build a source from configuration, with optional per-request
    /// overrides for repository, file path, and branch.
    pub fn from_config(
        config: &SourceConfig,
        repo: Option<String>,
        path: Option<String>,
        branch: Option<String>,
    ) -> Result<Self, SourceError> {
        let repo = repo.unwrap_or_else(|| config.github_repo.clone());
        if repo.is_empty() {
            return Err(SourceError::Unavailable(
                "No repository configured (set source.github_repo or pass repo)".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .user_agent(concat!("fleetscan/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SourceError::Unavailable(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_base_url: config.github_api_base_url.trim_end_matches('/').to_string(),
            repo,
            path: path.unwrap_or_else(|| config.mc_list_path.clone()),
            branch: branch.unwrap_or_else(|| config.branch.clone()),
            token: config.github_token.clone(),
        })
    }
}

#[async_trait]
impl IdentifierSource for RemoteRepoSource {
    async fn fetch_identifiers(&self) -> Result<Vec<String>, SourceError> {
        let url = format!(
            "{}/repos/{}/contents/{}",
            self.api_base_url, self.repo, self.path
        );

        let mut request = self
            .client
            .get(&url)
            .query(&[("ref", self.branch.as_str())])
            .header("Accept", "application/vnd.github.v3+json");
        if !self.token.is_empty() {
            request = request.bearer_auth(&self.token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SourceError::Unavailable(format!("Repository fetch failed: {e}")))?;

        match response.status().as_u16() {
            404 => {
                return Err(SourceError::NotFound(format!(
                    "File {} not found in repository {}",
                    self.path, self.repo
                )));
            }
            401 | 403 => {
                return Err(SourceError::Unavailable(
                    "Repository authentication failed or API rate limit exceeded".to_string(),
                ));
            }
            status if status >= 400 => {
                return Err(SourceError::Unavailable(format!(
                    "Repository API error: HTTP {status}"
                )));
            }
            _ => {}
        }

        let body: ContentsResponse = response
            .json()
            .await
            .map_err(|e| SourceError::Unavailable(format!("Invalid repository response: {e}")))?;

        // The contents API wraps base64 at 60 columns; strip the newlines
        // before decoding.
        let packed: String = body.content.chars().filter(|c| !c.is_whitespace()).collect();
        let bytes = BASE64
            .decode(packed)
            .map_err(|e| SourceError::Unavailable(format!("Invalid file encoding: {e}")))?;
        let text = String::from_utf8(bytes)
            .map_err(|e| SourceError::Unavailable(format!("File is not UTF-8: {e}")))?;

        let identifiers = parse::extract_identifiers(&text);
        tracing::info!(
            "Read {} MC numbers from {}/{}",
            identifiers.len(),
            self.repo,
            self.path
        );
        Ok(identifiers)
    }
}

/// The contents API response fields we use.
#[derive(Debug, Deserialize)]
struct ContentsResponse {
    content: String,
}
