#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::unnecessary_literal_bound,
    clippy::module_name_repetitions,
    clippy::struct_field_names,
    clippy::must_use_candidate,
    clippy::new_without_default,
    clippy::return_self_not_must_use
)]

pub mod assess;
pub mod attest;
pub mod config;
pub mod error;
pub mod github;
pub mod guard;
pub mod llm;
pub mod score;
pub mod verify;

pub use assess::{AssessmentEngine, AssessmentMode, RawAssessment};
pub use attest::{Attestation, AttestationClaim, Attestor};
pub use config::Config;
pub use error::{ConfigError, VerifyError};
pub use score::{Recommendation, ScoreAggregator, SkillLevel, Verdict};
pub use verify::{Analysis, VerificationResult, Verifier};
