//! Score aggregation: weighted sub-scores to a verdict.
//!
//! Both analyzers feed the same [`ScoreAggregator`], so `ai_score`, skill
//! level and recommendation never depend on which strategy ran.

use crate::assess::RawAssessment;
use crate::config::ScoringConfig;
use crate::error::{ConfigError, VerifyError};
use serde::{Deserialize, Serialize};

/// Ordered proficiency label derived from `ai_score`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
)]
pub enum SkillLevel {
    #[serde(rename = "FAIL")]
    #[strum(serialize = "FAIL")]
    Fail,
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

impl SkillLevel {
    pub fn label(self) -> &'static str {
        match self {
            Self::Fail => "FAIL",
            Self::Beginner => "Beginner",
            Self::Intermediate => "Intermediate",
            Self::Advanced => "Advanced",
            Self::Expert => "Expert",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Recommendation {
    IssueCertificate,
    Reject,
}

/// Aggregated outcome for one assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub ai_score: u32,
    pub skill_level: SkillLevel,
    pub verified: bool,
    pub recommendation: Recommendation,
}

impl Verdict {
    /// The verdict attached to every rejection path.
    pub fn rejected() -> Self {
        Self {
            ai_score: 0,
            skill_level: SkillLevel::Fail,
            verified: false,
            recommendation: Recommendation::Reject,
        }
    }
}

const BASIS_POINTS: u64 = 10_000;

/// Validated weights are finite and within `0.0..=1.0`.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn basis_points(weight: f64) -> u64 {
    (weight * BASIS_POINTS as f64).round() as u64
}

#[derive(Debug, Clone, Default)]
pub struct ScoreAggregator {
    config: ScoringConfig,
}

impl ScoreAggregator {
    pub fn new(config: ScoringConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Weighted sum of the four sub-scores, rounded half away from zero.
    ///
    /// Weights are fixed to basis points first so that sums landing exactly
    /// on `.5` round up instead of drifting to `.4999` in binary floating point.
    pub fn ai_score(&self, raw: &RawAssessment) -> u64 {
        let w = &self.config.weights;
        let weighted: u64 = [
            (w.code_quality, raw.code_quality),
            (w.complexity, raw.complexity),
            (w.best_practices, raw.best_practices),
            (w.originality, raw.originality),
        ]
        .into_iter()
        .map(|(weight, score)| basis_points(weight) * u64::from(score))
        .sum();
        (weighted + BASIS_POINTS / 2) / BASIS_POINTS
    }

    pub fn level(&self, score: u32) -> SkillLevel {
        let t = &self.config.thresholds;
        [
            (t.expert, SkillLevel::Expert),
            (t.advanced, SkillLevel::Advanced),
            (t.intermediate, SkillLevel::Intermediate),
            (t.beginner, SkillLevel::Beginner),
        ]
        .into_iter()
        .find(|(min, _)| score >= *min)
        .map_or(SkillLevel::Fail, |(_, level)| level)
    }

    pub fn certify_threshold(&self) -> u32 {
        self.config.certify_threshold
    }

    /// Combine sub-scores into a verdict.
    ///
    /// Sub-scores outside 0..=100 mean an analyzer broke its contract; that
    /// surfaces as [`VerifyError::Internal`] rather than a rejection.
    pub fn aggregate(&self, raw: &RawAssessment) -> Result<Verdict, VerifyError> {
        let score = self.ai_score(raw);
        let ai_score = match u32::try_from(score) {
            Ok(score) if score <= 100 => score,
            _ => {
                return Err(VerifyError::Internal(format!(
                    "aggregated score {score} outside 0..=100 (sub-scores {}/{}/{}/{})",
                    raw.code_quality, raw.complexity, raw.best_practices, raw.originality
                )));
            }
        };

        let verified = ai_score >= self.config.certify_threshold;
        Ok(Verdict {
            ai_score,
            skill_level: self.level(ai_score),
            verified,
            recommendation: if verified {
                Recommendation::IssueCertificate
            } else {
                Recommendation::Reject
            },
        })
    }
}
