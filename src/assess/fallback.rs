//! Offline analyzer: sub-scores derived from a hash of the repository URL.

use super::RawAssessment;
use crate::error::VerifyError;
use crate::github::FileSampleSet;
use crate::score::ScoreAggregator;
use sha2::{Digest, Sha256};

const STRENGTHS: [&str; 6] = [
    "Clean code structure and organization",
    "Good use of modern language features",
    "Proper error handling patterns",
    "Well-organized project structure",
    "Effective use of design patterns",
    "Comprehensive README documentation",
];

const WEAKNESSES: [&str; 5] = [
    "Could benefit from more unit tests",
    "Some functions could be further decomposed",
    "Consider adding type annotations",
    "Documentation could be more detailed",
    "Edge case handling could be improved",
];

/// SHA-256 of a URL, read as a 256-bit big-endian unsigned integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UrlDigest([u8; 32]);

impl UrlDigest {
    pub fn of(url: &str) -> Self {
        Self(Sha256::digest(url.as_bytes()).into())
    }

    /// Exact `(h >> shift_bytes * 8) mod m`.
    #[allow(clippy::cast_possible_truncation)]
    pub fn shifted_mod(&self, shift_bytes: usize, m: u32) -> u32 {
        let m = u64::from(m);
        let end = self.0.len().saturating_sub(shift_bytes);
        let rem = self.0[..end]
            .iter()
            .fold(0u64, |acc, b| (acc * 256 + u64::from(*b)) % m);
        rem as u32
    }
}

#[derive(Debug, Clone, Default)]
pub struct DeterministicFallbackAnalyzer {
    aggregator: ScoreAggregator,
}

impl DeterministicFallbackAnalyzer {
    pub fn new(aggregator: ScoreAggregator) -> Self {
        Self { aggregator }
    }

    /// Sub-scores and narrative as a pure function of `repo_url`.
    pub fn scores(repo_url: &str) -> RawAssessment {
        let h = UrlDigest::of(repo_url);
        let base6 = h.shifted_mod(0, 6) as usize;
        let base5 = h.shifted_mod(0, 5) as usize;

        RawAssessment {
            code_quality: 55 + h.shifted_mod(0, 35),
            complexity: 45 + h.shifted_mod(1, 40),
            best_practices: 50 + h.shifted_mod(2, 35),
            originality: 40 + h.shifted_mod(3, 45),
            evidence_summary: String::new(),
            strengths: vec![
                STRENGTHS[base6].to_string(),
                STRENGTHS[(base6 + 3) % STRENGTHS.len()].to_string(),
            ],
            weaknesses: vec![
                WEAKNESSES[base5].to_string(),
                WEAKNESSES[(base5 + 2) % WEAKNESSES.len()].to_string(),
            ],
        }
    }

    pub fn assess(
        &self,
        repo_url: &str,
        skill: &str,
        samples: &FileSampleSet,
    ) -> Result<RawAssessment, VerifyError> {
        let mut raw = Self::scores(repo_url);
        let verdict = self.aggregator.aggregate(&raw)?;
        raw.evidence_summary = format!(
            "[Demo Mode] Analyzed {} files from the {skill} project at {repo_url}. \
             The codebase demonstrates {}-level proficiency with an overall score of {}/100.",
            samples.len(),
            verdict.skill_level.label().to_lowercase(),
            verdict.ai_score,
        );
        Ok(raw)
    }
}
