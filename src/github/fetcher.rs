//! Repository snapshot fetching: list the tree, filter eligible paths, then pull raw samples.

use crate::config::{GitHubConfig, SamplingConfig};
use crate::error::VerifyError;
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::client::{GitHubClient, TreeEntry};
use super::reference::RepositoryReference;
use super::snapshot::{FileSampleSet, SourceFileSample};

pub struct RepositorySnapshotFetcher {
    client: Arc<GitHubClient>,
    branches: Vec<String>,
    sampling: SamplingConfig,
}

impl RepositorySnapshotFetcher {
    pub fn new(github: &GitHubConfig, sampling: SamplingConfig) -> Result<Self> {
        Ok(Self::with_client(
            Arc::new(GitHubClient::new(github)?),
            github.branches.clone(),
            sampling,
        ))
    }

    pub fn with_client(
        client: Arc<GitHubClient>,
        branches: Vec<String>,
        sampling: SamplingConfig,
    ) -> Self {
        Self {
            client,
            branches,
            sampling,
        }
    }

    /// Shared handle, reused by the authenticity guard.
    pub fn client(&self) -> Arc<GitHubClient> {
        Arc::clone(&self.client)
    }

    /// Fetch a capped sample of source files.
    ///
    /// Returns an empty set when nothing is eligible; the orchestrator
    /// reports that separately from a fetch failure.
    pub async fn fetch(&self, url: &str) -> Result<FileSampleSet, VerifyError> {
        let repo = RepositoryReference::parse(url)?;
        self.fetch_reference(&repo).await
    }

    pub async fn fetch_reference(
        &self,
        repo: &RepositoryReference,
    ) -> Result<FileSampleSet, VerifyError> {
        let tree = self.fetch_tree(repo).await?;
        let paths = select_paths(&tree, &self.sampling);
        debug!(repo = %repo, eligible = paths.len(), "Selected source paths");

        let mut samples = Vec::with_capacity(paths.len());
        for path in paths {
            match self.fetch_content(repo, path).await {
                Some((branch, content)) => samples.push(SourceFileSample::new(
                    path,
                    &content,
                    branch,
                    self.sampling.max_file_chars,
                )),
                None => debug!(repo = %repo, path, "Skipping unavailable file"),
            }
        }

        info!(repo = %repo, files = samples.len(), "Fetched repository snapshot");
        Ok(FileSampleSet::new(samples))
    }

    async fn fetch_tree(&self, repo: &RepositoryReference) -> Result<Vec<TreeEntry>, VerifyError> {
        let mut last_err = None;
        for branch in &self.branches {
            match self.client.tree(repo, branch).await {
                Ok(entries) => {
                    debug!(
                        repo = %repo,
                        branch = branch.as_str(),
                        entries = entries.len(),
                        "Tree listed"
                    );
                    return Ok(entries);
                }
                Err(e) => {
                    warn!(
                        repo = %repo,
                        branch = branch.as_str(),
                        error = %e,
                        "Tree listing failed"
                    );
                    last_err = Some(e);
                }
            }
        }

        Err(last_err.unwrap_or_else(|| VerifyError::Fetch {
            status: None,
            message: "no branches configured".into(),
        }))
    }

    async fn fetch_content<'b>(
        &'b self,
        repo: &RepositoryReference,
        path: &str,
    ) -> Option<(&'b str, String)> {
        for branch in &self.branches {
            if let Some(content) = self.client.raw_content(repo, branch, path).await {
                return Some((branch.as_str(), content));
            }
        }
        None
    }
}

/// Eligible blob paths in tree order, capped at `max_files`.
pub fn select_paths<'t>(tree: &'t [TreeEntry], sampling: &SamplingConfig) -> Vec<&'t str> {
    tree.iter()
        .filter(|entry| entry.is_blob() && is_eligible(&entry.path, sampling))
        .map(|entry| entry.path.as_str())
        .take(sampling.max_files)
        .collect()
}

/// Extension allow-list plus substring exclusions (vendored deps, build
/// output, minified bundles).
pub fn is_eligible(path: &str, sampling: &SamplingConfig) -> bool {
    sampling.extensions.iter().any(|ext| path.ends_with(ext.as_str()))
        && !sampling
            .excluded_markers
            .iter()
            .any(|marker| path.contains(marker.as_str()))
}
