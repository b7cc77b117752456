pub mod orchestrator;
pub mod result;

pub use orchestrator::Verifier;
pub use result::{Analysis, VerificationResult};
