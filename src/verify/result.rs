use crate::assess::{AssessmentMode, RawAssessment};
use crate::error::VerifyError;
use crate::score::{Recommendation, SkillLevel, Verdict};
use serde::{Deserialize, Serialize};

/// Sub-scores and narrative lists as reported to callers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    pub code_quality: u32,
    pub complexity: u32,
    pub best_practices: u32,
    pub originality: u32,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    /// Failure cause on rejection paths.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<RawAssessment> for Analysis {
    fn from(raw: RawAssessment) -> Self {
        Self {
            code_quality: raw.code_quality,
            complexity: raw.complexity,
            best_practices: raw.best_practices,
            originality: raw.originality,
            strengths: raw.strengths,
            weaknesses: raw.weaknesses,
            error: None,
        }
    }
}

/// The one artifact that leaves the pipeline, on success and on failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub verified: bool,
    pub ai_score: u32,
    pub skill_level: SkillLevel,
    pub analysis: Analysis,
    pub recommendation: Recommendation,
    pub evidence_summary: String,
    /// `sha256:<hex>` fingerprint of the sampled files, when any were fetched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence_hash: Option<String>,
    pub mode: AssessmentMode,
}

impl VerificationResult {
    pub fn assessed(raw: RawAssessment, verdict: Verdict, mode: AssessmentMode) -> Self {
        let evidence_summary = raw.evidence_summary.clone();
        Self {
            verified: verdict.verified,
            ai_score: verdict.ai_score,
            skill_level: verdict.skill_level,
            analysis: Analysis::from(raw),
            recommendation: verdict.recommendation,
            evidence_summary,
            evidence_hash: None,
            mode,
        }
    }

    /// Zeroed REJECT result naming `err` as the cause.
    pub fn rejection(err: &VerifyError, mode: AssessmentMode) -> Self {
        let verdict = Verdict::rejected();
        Self {
            verified: verdict.verified,
            ai_score: verdict.ai_score,
            skill_level: verdict.skill_level,
            analysis: Analysis {
                error: Some(err.to_string()),
                ..Analysis::default()
            },
            recommendation: verdict.recommendation,
            evidence_summary: err.evidence_summary(),
            evidence_hash: None,
            mode,
        }
    }

    pub fn with_evidence_hash(mut self, hash: Option<String>) -> Self {
        self.evidence_hash = hash;
        self
    }

    pub fn is_issued(&self) -> bool {
        self.recommendation == Recommendation::IssueCertificate
    }
}
