//! Repository age and commit-history heuristics.
//!
//! Runs before any paid model call. The probes are best-effort: when the
//! metadata or commit endpoints are unavailable the guard passes
//! (fail-open).

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::GuardConfig;
use crate::github::{GitHubClient, RepositoryReference};

/// `created_at` format used by the GitHub REST API.
const CREATED_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

// ── Verdict ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum AuthenticityVerdict {
    Pass,
    Fail { reason: String },
}

impl AuthenticityVerdict {
    pub fn fail(reason: impl Into<String>) -> Self {
        Self::Fail {
            reason: reason.into(),
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Pass => None,
            Self::Fail { reason } => Some(reason),
        }
    }
}

// ── Guard ────────────────────────────────────────────────────────────────────

pub struct AuthenticityGuard {
    client: Arc<GitHubClient>,
    config: GuardConfig,
}

impl AuthenticityGuard {
    pub fn new(client: Arc<GitHubClient>, config: GuardConfig) -> Self {
        Self { client, config }
    }

    pub async fn check(&self, repo: &RepositoryReference) -> AuthenticityVerdict {
        self.check_at(repo, Utc::now()).await
    }

    /// Evaluate against an explicit clock.
    pub async fn check_at(
        &self,
        repo: &RepositoryReference,
        now: DateTime<Utc>,
    ) -> AuthenticityVerdict {
        match self.probe(repo, now).await {
            Ok(verdict) => {
                if let Some(reason) = verdict.reason() {
                    info!(repo = %repo, reason, "Authenticity guard rejected repository");
                } else {
                    debug!(repo = %repo, "Authenticity guard passed");
                }
                verdict
            }
            Err(e) => {
                warn!(
                    repo = %repo,
                    error = %e,
                    "Authenticity probe unavailable, failing open"
                );
                AuthenticityVerdict::Pass
            }
        }
    }

    async fn probe(
        &self,
        repo: &RepositoryReference,
        now: DateTime<Utc>,
    ) -> Result<AuthenticityVerdict> {
        let metadata = self
            .client
            .repository(repo)
            .await
            .context("repository metadata probe failed")?;

        if let Some(raw) = metadata.get("created_at").and_then(|v| v.as_str()) {
            let created_at = parse_created_at(raw)?;
            let verdict = assess_age(created_at, now, self.config.min_repo_age_secs);
            if !verdict.is_pass() {
                return Ok(verdict);
            }
        }

        let commits = self
            .client
            .recent_commits(repo, self.config.commits_page_size)
            .await
            .context("commit history probe failed")?;

        Ok(assess_commit_count(commits.len(), self.config.min_commits))
    }
}

// ── Heuristics ───────────────────────────────────────────────────────────────

pub fn parse_created_at(raw: &str) -> Result<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw, CREATED_AT_FORMAT)
        .map(|naive| naive.and_utc())
        .with_context(|| format!("unparseable created_at timestamp: {raw}"))
}

/// Reject repositories created less than `min_age_secs` before `now`.
pub fn assess_age(
    created_at: DateTime<Utc>,
    now: DateTime<Utc>,
    min_age_secs: i64,
) -> AuthenticityVerdict {
    let age = now.signed_duration_since(created_at).num_seconds();
    if age < min_age_secs {
        AuthenticityVerdict::fail(format!(
            "repository too new: created {age}s ago, minimum age is {min_age_secs}s"
        ))
    } else {
        AuthenticityVerdict::Pass
    }
}

pub fn assess_commit_count(count: usize, min_commits: usize) -> AuthenticityVerdict {
    if count < min_commits {
        AuthenticityVerdict::fail(format!(
            "insufficient commit history: found {count} commits, need at least {min_commits}"
        ))
    } else {
        AuthenticityVerdict::Pass
    }
}
