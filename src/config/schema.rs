use crate::error::ConfigError;
use anyhow::{Context, Result};
use directories::UserDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

// ── Root ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Path the config was read from, if any - not serialized
    #[serde(skip)]
    pub config_path: Option<PathBuf>,

    #[serde(default)]
    pub github: GitHubConfig,

    #[serde(default)]
    pub sampling: SamplingConfig,

    #[serde(default)]
    pub guard: GuardConfig,

    #[serde(default)]
    pub model: ModelConfig,

    #[serde(default)]
    pub scoring: ScoringConfig,

    #[serde(default)]
    pub attestation: AttestationConfig,
}

// ── GitHub ───────────────────────────────────────────────────────────────────

#[derive(Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_raw_base")]
    pub raw_base: String,
    /// Optional personal-access token for higher rate limits.
    #[serde(default)]
    pub token: Option<String>,
    /// Branches tried in order for both the tree listing and raw content.
    #[serde(default = "default_branches")]
    pub branches: Vec<String>,
    #[serde(default = "default_tree_timeout")]
    pub tree_timeout_secs: u64,
    #[serde(default = "default_content_timeout")]
    pub content_timeout_secs: u64,
    #[serde(default = "default_metadata_timeout")]
    pub metadata_timeout_secs: u64,
}

fn default_api_base() -> String {
    "https://api.github.com".into()
}
fn default_raw_base() -> String {
    "https://raw.githubusercontent.com".into()
}
fn default_branches() -> Vec<String> {
    vec!["main".into(), "master".into()]
}
fn default_tree_timeout() -> u64 {
    15
}
fn default_content_timeout() -> u64 {
    10
}
fn default_metadata_timeout() -> u64 {
    10
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            raw_base: default_raw_base(),
            token: None,
            branches: default_branches(),
            tree_timeout_secs: default_tree_timeout(),
            content_timeout_secs: default_content_timeout(),
            metadata_timeout_secs: default_metadata_timeout(),
        }
    }
}

impl std::fmt::Debug for GitHubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubConfig")
            .field("api_base", &self.api_base)
            .field("raw_base", &self.raw_base)
            .field("token", &self.token.as_ref().map(|_| "***"))
            .field("branches", &self.branches)
            .field("tree_timeout_secs", &self.tree_timeout_secs)
            .field("content_timeout_secs", &self.content_timeout_secs)
            .field("metadata_timeout_secs", &self.metadata_timeout_secs)
            .finish()
    }
}

// ── Sampling ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplingConfig {
    #[serde(default = "default_max_files")]
    pub max_files: usize,
    /// Per-file cap, counted in characters.
    #[serde(default = "default_max_file_chars")]
    pub max_file_chars: usize,
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    /// Any path containing one of these substrings is skipped.
    #[serde(default = "default_excluded_markers")]
    pub excluded_markers: Vec<String>,
}

fn default_max_files() -> usize {
    10
}
fn default_max_file_chars() -> usize {
    3000
}
fn default_extensions() -> Vec<String> {
    [
        ".py", ".js", ".jsx", ".ts", ".tsx", ".java", ".cpp", ".c", ".go", ".rs", ".html", ".css",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}
fn default_excluded_markers() -> Vec<String> {
    vec!["node_modules".into(), "dist".into(), ".min.".into()]
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            max_files: default_max_files(),
            max_file_chars: default_max_file_chars(),
            extensions: default_extensions(),
            excluded_markers: default_excluded_markers(),
        }
    }
}

// ── Authenticity guard ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardConfig {
    /// Repositories younger than this are rejected.
    #[serde(default = "default_min_repo_age")]
    pub min_repo_age_secs: i64,
    #[serde(default = "default_min_commits")]
    pub min_commits: usize,
    /// Page size for the recent-commits probe.
    #[serde(default = "default_commits_page")]
    pub commits_page_size: usize,
}

fn default_min_repo_age() -> i64 {
    600
}
fn default_min_commits() -> usize {
    3
}
fn default_commits_page() -> usize {
    5
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            min_repo_age_secs: default_min_repo_age(),
            min_commits: default_min_commits(),
            commits_page_size: default_commits_page(),
        }
    }
}

// ── Model backend ────────────────────────────────────────────────────────────

#[derive(Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Backend credential. Absent or placeholder selects the offline fallback.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_model_base_url")]
    pub base_url: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_model_timeout")]
    pub timeout_secs: u64,
}

fn default_model() -> String {
    "gpt-4o-mini".into()
}
fn default_model_base_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_temperature() -> f64 {
    0.3
}
fn default_max_tokens() -> u32 {
    800
}
fn default_model_timeout() -> u64 {
    60
}

const PLACEHOLDER_KEYS: &[&str] = &["changeme", "placeholder", "none", "xxx", "todo"];

impl ModelConfig {
    /// The configured credential, unless it is empty or an obvious placeholder.
    pub fn usable_api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !is_placeholder_key(key))
    }
}

/// True for keys copied verbatim from sample `.env` files.
pub fn is_placeholder_key(key: &str) -> bool {
    let key = key.trim();
    if key.is_empty() {
        return true;
    }
    let lower = key.to_ascii_lowercase();
    PLACEHOLDER_KEYS.contains(&lower.as_str())
        || lower.starts_with("your-")
        || lower.starts_with("your_")
        || lower.starts_with("sk-your")
        || lower.starts_with("sk-...")
        || lower.contains("api_key_here")
        || lower.contains("api-key-here")
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            base_url: default_model_base_url(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_model_timeout(),
        }
    }
}

impl std::fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

// ── Scoring ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub code_quality: f64,
    pub complexity: f64,
    pub best_practices: f64,
    pub originality: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            code_quality: 0.30,
            complexity: 0.25,
            best_practices: 0.25,
            originality: 0.20,
        }
    }
}

impl ScoreWeights {
    pub fn sum(&self) -> f64 {
        self.code_quality + self.complexity + self.best_practices + self.originality
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelThresholds {
    pub expert: u32,
    pub advanced: u32,
    pub intermediate: u32,
    pub beginner: u32,
}

impl Default for LevelThresholds {
    fn default() -> Self {
        Self {
            expert: 90,
            advanced: 75,
            intermediate: 60,
            beginner: 45,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default)]
    pub weights: ScoreWeights,
    #[serde(default)]
    pub thresholds: LevelThresholds,
    /// Minimum `ai_score` that earns `ISSUE_CERTIFICATE`.
    #[serde(default = "default_certify_threshold")]
    pub certify_threshold: u32,
}

fn default_certify_threshold() -> u32 {
    45
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: ScoreWeights::default(),
            thresholds: LevelThresholds::default(),
            certify_threshold: default_certify_threshold(),
        }
    }
}

impl ScoringConfig {
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        let w = &self.weights;
        let all = [w.code_quality, w.complexity, w.best_practices, w.originality];
        if all.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(ConfigError::Validation(
                "scoring weights must be finite and non-negative".into(),
            ));
        }
        if (w.sum() - 1.0).abs() > 1e-6 {
            return Err(ConfigError::Validation(format!(
                "scoring weights must sum to 1.0 (got {:.4})",
                w.sum()
            )));
        }

        let t = &self.thresholds;
        if !(t.expert > t.advanced && t.advanced > t.intermediate && t.intermediate > t.beginner)
        {
            return Err(ConfigError::Validation(
                "level thresholds must be strictly descending".into(),
            ));
        }
        if t.expert > 100 || self.certify_threshold > 100 {
            return Err(ConfigError::Validation(
                "thresholds must lie within 0..=100".into(),
            ));
        }
        // A certified result must never carry the FAIL level.
        if self.certify_threshold < t.beginner {
            return Err(ConfigError::Validation(format!(
                "certify_threshold ({}) must be at least thresholds.beginner ({})",
                self.certify_threshold, t.beginner
            )));
        }
        Ok(())
    }
}

// ── Attestation ──────────────────────────────────────────────────────────────

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct AttestationConfig {
    /// HMAC key. Without one a fixed demo key is used and labelled as such.
    #[serde(default)]
    pub secret: Option<String>,
    #[serde(default)]
    pub key_id: Option<String>,
}

impl std::fmt::Debug for AttestationConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttestationConfig")
            .field("secret", &self.secret.as_ref().map(|_| "***"))
            .field("key_id", &self.key_id)
            .finish()
    }
}

// ── Loading ──────────────────────────────────────────────────────────────────

impl Config {
    /// Default on-disk location: `~/.skillproof/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        UserDirs::new().map(|u| u.home_dir().join(".skillproof").join("config.toml"))
    }

    /// Read a config file. Missing sections fall back to defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config: Config = toml::from_str(&contents)
            .map_err(|e| ConfigError::Load(e.to_string()))
            .context("Failed to parse config file")?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Load from `path` if given, else from the default location when it
    /// exists, else defaults. Environment overrides are applied last and the
    /// result is validated.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(explicit) => Self::from_file(explicit)?,
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(found) => Self::from_file(&found)?,
                None => Self::default(),
            },
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        self.scoring.validate()?;
        if self.sampling.max_files == 0 {
            return Err(ConfigError::Validation("sampling.max_files must be > 0".into()));
        }
        if self.github.branches.is_empty() {
            return Err(ConfigError::Validation(
                "github.branches must name at least one branch".into(),
            ));
        }
        if !(0.0..=2.0).contains(&self.model.temperature) {
            return Err(ConfigError::Validation(
                "model.temperature must lie within 0.0..=2.0".into(),
            ));
        }
        Ok(())
    }

    pub fn apply_env_overrides(&mut self) {
        if let Ok(key) =
            std::env::var("SKILLPROOF_API_KEY").or_else(|_| std::env::var("OPENAI_API_KEY"))
            && !key.is_empty()
        {
            self.model.api_key = Some(key);
        }

        if let Ok(model) = std::env::var("SKILLPROOF_MODEL")
            && !model.is_empty()
        {
            self.model.model = model;
        }

        if let Ok(base) = std::env::var("SKILLPROOF_MODEL_BASE_URL")
            && !base.is_empty()
        {
            self.model.base_url = base;
        }

        if let Ok(token) =
            std::env::var("SKILLPROOF_GITHUB_TOKEN").or_else(|_| std::env::var("GITHUB_TOKEN"))
            && !token.is_empty()
        {
            self.github.token = Some(token);
        }

        if let Ok(base) = std::env::var("SKILLPROOF_GITHUB_API_BASE")
            && !base.is_empty()
        {
            self.github.api_base = base;
        }

        if let Ok(base) = std::env::var("SKILLPROOF_GITHUB_RAW_BASE")
            && !base.is_empty()
        {
            self.github.raw_base = base;
        }

        if let Ok(secret) = std::env::var("SKILLPROOF_ATTESTATION_SECRET")
            && !secret.is_empty()
        {
            self.attestation.secret = Some(secret);
        }

        if let Ok(temp_str) = std::env::var("SKILLPROOF_TEMPERATURE")
            && let Ok(temp) = temp_str.parse::<f64>()
            && (0.0..=2.0).contains(&temp)
        {
            self.model.temperature = temp;
        }
    }
}
