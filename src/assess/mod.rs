//! Assessment strategies.
//!
//! [`AssessmentEngine`] is chosen once from configuration: a usable model
//! credential selects the model-backed analyzer, anything else selects the
//! deterministic fallback.

pub mod fallback;
pub mod model;
pub mod parse;
pub mod prompt;
pub mod types;

pub use fallback::{DeterministicFallbackAnalyzer, UrlDigest};
pub use model::ModelBackedAnalyzer;
pub use parse::{ParsedAssessment, coerce_score, parse_model_response, strip_code_fence};
pub use prompt::{SYSTEM_PROMPT, build_analysis_prompt};
pub use types::RawAssessment;

use crate::config::ModelConfig;
use crate::error::VerifyError;
use crate::github::FileSampleSet;
use crate::llm::LazyProvider;
use crate::score::ScoreAggregator;
use serde::{Deserialize, Serialize};

/// Which strategy produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AssessmentMode {
    Live,
    Fallback,
}

#[derive(Debug)]
pub enum AssessmentEngine {
    Model(ModelBackedAnalyzer),
    Fallback(DeterministicFallbackAnalyzer),
}

impl AssessmentEngine {
    /// Pick the strategy from credential availability. The backend client is
    /// not built until the first live assessment.
    pub fn from_config(model: &ModelConfig, aggregator: ScoreAggregator) -> Self {
        if model.usable_api_key().is_some() {
            Self::Model(ModelBackedAnalyzer::new(
                LazyProvider::openai(model),
                model.clone(),
                aggregator,
            ))
        } else {
            Self::Fallback(DeterministicFallbackAnalyzer::new(aggregator))
        }
    }

    pub fn mode(&self) -> AssessmentMode {
        match self {
            Self::Model(_) => AssessmentMode::Live,
            Self::Fallback(_) => AssessmentMode::Fallback,
        }
    }

    pub fn is_live(&self) -> bool {
        self.mode() == AssessmentMode::Live
    }

    pub async fn assess(
        &self,
        repo_url: &str,
        skill: &str,
        samples: &FileSampleSet,
    ) -> Result<RawAssessment, VerifyError> {
        match self {
            Self::Model(analyzer) => analyzer.assess(repo_url, skill, samples).await,
            Self::Fallback(analyzer) => analyzer.assess(repo_url, skill, samples),
        }
    }
}
