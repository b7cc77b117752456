//! Thin GitHub REST + raw-content client.

use crate::config::GitHubConfig;
use crate::error::VerifyError;
use anyhow::{Context, Result, bail};
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::reference::RepositoryReference;

/// One entry of a recursive git tree listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub path: String,
    /// `blob`, `tree` or `commit`.
    pub kind: String,
}

impl TreeEntry {
    pub fn is_blob(&self) -> bool {
        self.kind == "blob"
    }
}

pub struct GitHubClient {
    client: reqwest::Client,
    api_base: String,
    raw_base: String,
    tree_timeout: Duration,
    content_timeout: Duration,
    metadata_timeout: Duration,
}

impl GitHubClient {
    pub fn new(config: &GitHubConfig) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static(concat!(
                "skillproof/",
                env!("CARGO_PKG_VERSION")
            )),
        );
        if let Some(t) = config.token.as_deref().filter(|t| !t.is_empty())
            && let Ok(val) = format!("Bearer {t}").parse()
        {
            headers.insert(reqwest::header::AUTHORIZATION, val);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(anyhow::Error::from)
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            raw_base: config.raw_base.trim_end_matches('/').to_string(),
            tree_timeout: Duration::from_secs(config.tree_timeout_secs),
            content_timeout: Duration::from_secs(config.content_timeout_secs),
            metadata_timeout: Duration::from_secs(config.metadata_timeout_secs),
        })
    }

    /// Recursive tree listing for `branch`.
    ///
    /// A non-success status or transport failure is returned as
    /// [`VerifyError::Fetch`] so the caller can try the next branch.
    pub async fn tree(
        &self,
        repo: &RepositoryReference,
        branch: &str,
    ) -> Result<Vec<TreeEntry>, VerifyError> {
        let url = format!(
            "{}/repos/{}/{}/git/trees/{branch}",
            self.api_base, repo.owner, repo.name
        );
        debug!(repo = %repo, branch, "Requesting repository tree");

        let resp = self
            .client
            .get(&url)
            .query(&[("recursive", "1")])
            .timeout(self.tree_timeout)
            .send()
            .await
            .map_err(|e| VerifyError::Fetch {
                status: None,
                message: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(VerifyError::Fetch {
                status: Some(status.as_u16()),
                message: status.to_string(),
            });
        }

        let body: serde_json::Value = resp.json().await.map_err(|e| VerifyError::Fetch {
            status: None,
            message: format!("malformed tree response: {e}"),
        })?;

        Ok(Self::parse_tree(&body))
    }

    /// Parse a `git/trees` response; entries missing `path` or `type` are skipped.
    pub(crate) fn parse_tree(body: &serde_json::Value) -> Vec<TreeEntry> {
        let Some(items) = body.get("tree").and_then(|v| v.as_array()) else {
            return vec![];
        };

        items
            .iter()
            .filter_map(|item| {
                let path = item.get("path")?.as_str()?.to_string();
                let kind = item.get("type")?.as_str()?.to_string();
                Some(TreeEntry { path, kind })
            })
            .collect()
    }

    /// Raw file content, or `None` when the host does not serve it.
    pub async fn raw_content(
        &self,
        repo: &RepositoryReference,
        branch: &str,
        path: &str,
    ) -> Option<String> {
        let Some(url) = self.raw_url(repo, branch, path) else {
            debug!(path, branch, raw_base = %self.raw_base, "Raw content URL is not buildable");
            return None;
        };

        let resp = match self
            .client
            .get(url)
            .timeout(self.content_timeout)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                debug!(path, branch, error = %e, "Raw content request failed");
                return None;
            }
        };

        if !resp.status().is_success() {
            debug!(path, branch, status = %resp.status(), "Raw content not available");
            return None;
        }

        match resp.text().await {
            Ok(text) => Some(text),
            Err(e) => {
                debug!(path, branch, error = %e, "Failed to read raw content body");
                None
            }
        }
    }

    /// `{raw_base}/{owner}/{repo}/{branch}/{path}` with every segment
    /// percent-encoded, so `#` and `?` in file names stay part of the path.
    pub(crate) fn raw_url(
        &self,
        repo: &RepositoryReference,
        branch: &str,
        path: &str,
    ) -> Option<Url> {
        let mut url = Url::parse(&self.raw_base).ok()?;
        url.path_segments_mut()
            .ok()?
            .pop_if_empty()
            .extend([repo.owner.as_str(), repo.name.as_str()])
            .extend(branch.split('/'))
            .extend(path.split('/'));
        Some(url)
    }

    /// Repository metadata (`GET /repos/{owner}/{repo}`).
    pub async fn repository(&self, repo: &RepositoryReference) -> Result<serde_json::Value> {
        let url = format!("{}/repos/{}/{}", self.api_base, repo.owner, repo.name);
        self.get_json(&url, &[]).await
    }

    /// Most recent commits on the default branch.
    pub async fn recent_commits(
        &self,
        repo: &RepositoryReference,
        per_page: usize,
    ) -> Result<Vec<serde_json::Value>> {
        let url = format!("{}/repos/{}/{}/commits", self.api_base, repo.owner, repo.name);
        let per_page = per_page.to_string();
        match self.get_json(&url, &[("per_page", per_page.as_str())]).await? {
            serde_json::Value::Array(commits) => Ok(commits),
            other => bail!("commits response is not an array: {}", kind_of(&other)),
        }
    }

    async fn get_json(&self, url: &str, query: &[(&str, &str)]) -> Result<serde_json::Value> {
        let resp = self
            .client
            .get(url)
            .query(query)
            .timeout(self.metadata_timeout)
            .send()
            .await
            .with_context(|| format!("GitHub request failed: {url}"))?;

        if !resp.status().is_success() {
            bail!("GitHub returned {} for {url}", resp.status());
        }

        resp.json()
            .await
            .with_context(|| format!("GitHub response JSON decode failed: {url}"))
    }
}

fn kind_of(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
