// ── Infrastructure ───────────────────────────────────────────────────────────
pub mod http_client;
pub mod scrub;
pub mod traits;

// ── Provider implementations ────────────────────────────────────────────────
pub mod lazy;
pub mod openai;
mod openai_types;

// ── Re-exports ──────────────────────────────────────────────────────────────
pub use http_client::build_provider_client_with_timeout;
pub use lazy::LazyProvider;
pub use openai::OpenAiProvider;
pub use scrub::{api_error, sanitize_api_error, scrub_secret_patterns};
pub use traits::{CompletionRequest, Provider};
