//! Repository reference parsing.

use crate::error::VerifyError;
use serde::{Deserialize, Serialize};
use url::Url;

/// `owner/name` pair resolved from a user-supplied repository URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepositoryReference {
    pub owner: String,
    pub name: String,
}

impl RepositoryReference {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Parse a repository URL.
    ///
    /// Accepts `https://host/owner/repo`, `host/owner/repo` and the bare
    /// `owner/repo` shorthand. The path must hold exactly two non-empty
    /// segments once trailing slashes are trimmed.
    pub fn parse(input: &str) -> Result<Self, VerifyError> {
        let trimmed = input.trim().trim_end_matches('/');
        let invalid = || VerifyError::InvalidReference(input.trim().to_string());

        let segments: Vec<String> = match path_of(trimmed) {
            Some(path) => path
                .split('/')
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
            None => return Err(invalid()),
        };

        let [owner, name] = segments.as_slice() else {
            return Err(invalid());
        };

        let name = name.strip_suffix(".git").unwrap_or(name);
        if name.is_empty() || !is_valid_segment(owner) || !is_valid_segment(name) {
            return Err(invalid());
        }

        Ok(Self::new(owner.as_str(), name))
    }
}

impl std::fmt::Display for RepositoryReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Extract the path component, treating a leading `host.tld/` as a URL
/// without a scheme.
fn path_of(input: &str) -> Option<String> {
    if input.is_empty() {
        return None;
    }

    if input.contains("://") {
        let url = Url::parse(input).ok()?;
        url.host_str()?;
        return Some(url.path().to_string());
    }

    let first = input.split('/').next().unwrap_or_default();
    if first.contains('.') && input.contains('/') {
        let url = Url::parse(&format!("https://{input}")).ok()?;
        return Some(url.path().to_string());
    }

    Some(input.to_string())
}

fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}
