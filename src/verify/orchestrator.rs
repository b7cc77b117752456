use super::result::VerificationResult;
use crate::assess::{AssessmentEngine, AssessmentMode};
use crate::config::Config;
use crate::error::VerifyError;
use crate::github::{FileSampleSet, RepositoryReference, RepositorySnapshotFetcher};
use crate::guard::{AuthenticityGuard, AuthenticityVerdict};
use crate::score::ScoreAggregator;
use anyhow::Context;
use tracing::{error, info, warn};

/// Runs fetch, guard, assessment and aggregation for one repository.
///
/// Every recoverable failure comes back as a REJECT [`VerificationResult`];
/// only [`VerifyError::Internal`] is returned as `Err`.
pub struct Verifier {
    fetcher: RepositorySnapshotFetcher,
    guard: AuthenticityGuard,
    engine: AssessmentEngine,
    aggregator: ScoreAggregator,
}

impl Verifier {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let aggregator =
            ScoreAggregator::new(config.scoring.clone()).context("invalid scoring config")?;
        let fetcher = RepositorySnapshotFetcher::new(&config.github, config.sampling.clone())?;
        let guard = AuthenticityGuard::new(fetcher.client(), config.guard.clone());
        let engine = AssessmentEngine::from_config(&config.model, aggregator.clone());

        info!(
            mode = %engine.mode(),
            model = %config.model.model,
            "verifier ready"
        );
        Ok(Self::with_parts(fetcher, guard, engine, aggregator))
    }

    pub fn with_parts(
        fetcher: RepositorySnapshotFetcher,
        guard: AuthenticityGuard,
        engine: AssessmentEngine,
        aggregator: ScoreAggregator,
    ) -> Self {
        Self {
            fetcher,
            guard,
            engine,
            aggregator,
        }
    }

    pub fn mode(&self) -> AssessmentMode {
        self.engine.mode()
    }

    pub async fn verify(
        &self,
        repo_url: &str,
        skill: &str,
    ) -> Result<VerificationResult, VerifyError> {
        let (repo, samples) = match self.snapshot(repo_url).await {
            Ok(found) => found,
            Err(e) => return self.reject(repo_url, e, None),
        };
        let fingerprint = samples.fingerprint();

        match self.evaluate(&repo, repo_url, skill, &samples).await {
            Ok(result) => {
                info!(
                    owner = %repo.owner,
                    repo = %repo.name,
                    mode = %result.mode,
                    outcome = %result.recommendation,
                    ai_score = result.ai_score,
                    skill_level = %result.skill_level,
                    "verification finished"
                );
                Ok(result.with_evidence_hash(Some(fingerprint)))
            }
            Err(e) => self.reject(repo_url, e, Some(fingerprint)),
        }
    }

    async fn snapshot(
        &self,
        repo_url: &str,
    ) -> Result<(RepositoryReference, FileSampleSet), VerifyError> {
        let repo = RepositoryReference::parse(repo_url)?;
        let samples = self.fetcher.fetch_reference(&repo).await?;
        if samples.is_empty() {
            return Err(VerifyError::EmptyRepository);
        }
        Ok((repo, samples))
    }

    async fn evaluate(
        &self,
        repo: &RepositoryReference,
        repo_url: &str,
        skill: &str,
        samples: &FileSampleSet,
    ) -> Result<VerificationResult, VerifyError> {
        if self.engine.is_live()
            && let AuthenticityVerdict::Fail { reason } = self.guard.check(repo).await
        {
            return Err(VerifyError::Authenticity(reason));
        }

        let raw = self.engine.assess(repo_url, skill, samples).await?;
        let verdict = self.aggregator.aggregate(&raw)?;
        Ok(VerificationResult::assessed(raw, verdict, self.engine.mode()))
    }

    fn reject(
        &self,
        repo_url: &str,
        err: VerifyError,
        evidence_hash: Option<String>,
    ) -> Result<VerificationResult, VerifyError> {
        if !err.is_recoverable() {
            error!(repo_url, error = %err, "verification pipeline defect");
            return Err(err);
        }

        warn!(
            repo_url,
            mode = %self.engine.mode(),
            outcome = "REJECT",
            error = %err,
            "verification rejected"
        );
        Ok(VerificationResult::rejection(&err, self.engine.mode())
            .with_evidence_hash(evidence_hash))
    }
}
