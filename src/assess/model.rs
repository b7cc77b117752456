use super::RawAssessment;
use super::parse::parse_model_response;
use super::prompt::{SYSTEM_PROMPT, build_analysis_prompt};
use crate::config::ModelConfig;
use crate::error::VerifyError;
use crate::github::FileSampleSet;
use crate::llm::{CompletionRequest, LazyProvider, sanitize_api_error};
use crate::score::ScoreAggregator;
use tracing::{debug, info};

/// Analyzer that asks a chat-completion backend to grade the sample.
#[derive(Debug)]
pub struct ModelBackedAnalyzer {
    provider: LazyProvider,
    config: ModelConfig,
    aggregator: ScoreAggregator,
}

impl ModelBackedAnalyzer {
    pub fn new(provider: LazyProvider, config: ModelConfig, aggregator: ScoreAggregator) -> Self {
        Self {
            provider,
            config,
            aggregator,
        }
    }

    pub async fn assess(
        &self,
        repo_url: &str,
        skill: &str,
        samples: &FileSampleSet,
    ) -> Result<RawAssessment, VerifyError> {
        let prompt = build_analysis_prompt(skill, repo_url, samples);
        let request = CompletionRequest::new(&prompt, &self.config.model)
            .with_system(SYSTEM_PROMPT)
            .with_temperature(self.config.temperature)
            .with_max_tokens(self.config.max_tokens);

        let provider = self.provider.get();
        info!(
            provider = provider.name(),
            model = %self.config.model,
            files = samples.len(),
            prompt_chars = prompt.len(),
            "requesting model assessment"
        );

        let reply = provider
            .complete(request)
            .await
            .map_err(|e| VerifyError::Backend(sanitize_api_error(&format!("{e:#}"))))?;

        let parsed = parse_model_response(&reply)?;
        if let Some(reported) = parsed.reported_overall {
            let recomputed = self.aggregator.ai_score(&parsed.assessment);
            if u64::from(reported) != recomputed {
                debug!(
                    reported,
                    recomputed, "model overall_score disagrees with weighted sub-scores"
                );
            }
        }
        Ok(parsed.assessment)
    }
}
