//! Typed errors for `skillproof`.
//!
//! Pipeline failures live in [`VerifyError`]; the orchestrator folds every
//! recoverable variant into a rejection result. Internal plumbing (provider
//! calls, guard probes, config file reads) keeps using `anyhow::Result` for
//! context chains.

use thiserror::Error;

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("validation failed: {0}")]
    Validation(String),
}

// ─── Verification errors ─────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("invalid repository URL: {0}")]
    InvalidReference(String),

    #[error("could not fetch repository tree ({})", describe_status(.status.as_ref(), .message))]
    Fetch {
        status: Option<u16>,
        message: String,
    },

    #[error("no source files found in repository")]
    EmptyRepository,

    #[error("{0}")]
    Authenticity(String),

    #[error("failed to parse AI response: {0}")]
    ModelResponse(String),

    #[error("model backend failed: {0}")]
    Backend(String),

    /// A defect in the pipeline itself. Never folded into a rejection.
    #[error("internal error: {0}")]
    Internal(String),
}

fn describe_status(status: Option<&u16>, message: &str) -> String {
    match status {
        Some(code) => format!("HTTP {code}"),
        None => message.to_string(),
    }
}

impl VerifyError {
    /// Whether the orchestrator may turn this error into a rejection result.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Internal(_))
    }

    /// Human-readable cause placed in `evidence_summary` of a rejection.
    pub fn evidence_summary(&self) -> String {
        match self {
            Self::InvalidReference(_) | Self::Fetch { .. } => {
                format!("Could not fetch repository: {self}")
            }
            Self::EmptyRepository => "Repository contains no analyzable source files".to_string(),
            Self::Authenticity(reason) => format!("Authenticity check failed: {reason}"),
            Self::ModelResponse(_) => "AI analysis encountered an error".to_string(),
            Self::Backend(message) => format!("AI analysis error: {message}"),
            Self::Internal(message) => format!("Internal verification error: {message}"),
        }
    }
}
