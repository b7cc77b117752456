use serde::{Deserialize, Serialize};

/// Sub-scores and narrative produced by either analyzer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawAssessment {
    pub code_quality: u32,
    pub complexity: u32,
    pub best_practices: u32,
    pub originality: u32,
    pub evidence_summary: String,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
}
