pub mod schema;

pub use schema::{
    AttestationConfig, Config, GitHubConfig, GuardConfig, LevelThresholds, ModelConfig,
    SamplingConfig, ScoreWeights, ScoringConfig, is_placeholder_key,
};
