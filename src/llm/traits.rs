use std::future::Future;
use std::pin::Pin;

/// A single chat-completion call: optional system instruction plus one user
/// message.
#[derive(Debug, Clone, Copy)]
pub struct CompletionRequest<'a> {
    pub system_prompt: Option<&'a str>,
    pub message: &'a str,
    pub model: &'a str,
    pub temperature: f64,
    /// Response-token ceiling; `None` leaves it to the backend.
    pub max_tokens: Option<u32>,
}

impl<'a> CompletionRequest<'a> {
    pub fn new(message: &'a str, model: &'a str) -> Self {
        Self {
            system_prompt: None,
            message,
            model,
            temperature: 0.0,
            max_tokens: None,
        }
    }

    pub fn with_system(mut self, system_prompt: &'a str) -> Self {
        self.system_prompt = Some(system_prompt);
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

pub trait Provider: Send + Sync {
    /// Provider identifier (e.g. "openai").
    fn name(&self) -> &str;

    /// Return the assistant's text for `request`.
    fn complete<'a>(
        &'a self,
        request: CompletionRequest<'a>,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>>;
}
