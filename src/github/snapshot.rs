//! Sampled repository content.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// One fetched source file, truncated to the sampling cap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFileSample {
    pub path: String,
    pub content: String,
    /// Branch the raw content was served from.
    pub branch: String,
}

impl SourceFileSample {
    pub fn new(
        path: impl Into<String>,
        content: &str,
        branch: impl Into<String>,
        cap: usize,
    ) -> Self {
        Self {
            path: path.into(),
            content: truncate_chars(content, cap).to_string(),
            branch: branch.into(),
        }
    }
}

/// Ordered, capped set of samples. Order is the repository tree order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSampleSet {
    samples: Vec<SourceFileSample>,
}

impl FileSampleSet {
    pub fn new(samples: Vec<SourceFileSample>) -> Self {
        Self { samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SourceFileSample> {
        self.samples.iter()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.samples.iter().map(|s| s.path.as_str())
    }

    /// `sha256:<hex>` over every sample's path and content, in order.
    ///
    /// Used as the evidence reference handed to the certificate ledger.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for sample in &self.samples {
            hasher.update(sample.path.as_bytes());
            hasher.update([0u8]);
            hasher.update(sample.content.as_bytes());
            hasher.update([0u8]);
        }
        format!("sha256:{}", hex::encode(hasher.finalize()))
    }
}

impl<'a> IntoIterator for &'a FileSampleSet {
    type Item = &'a SourceFileSample;
    type IntoIter = std::slice::Iter<'a, SourceFileSample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

/// Truncate to at most `max_chars` characters without splitting one.
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
