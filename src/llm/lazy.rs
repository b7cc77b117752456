use super::openai::OpenAiProvider;
use super::traits::Provider;
use crate::config::ModelConfig;
use std::sync::{Arc, OnceLock};

type ProviderFactory = Box<dyn Fn() -> Arc<dyn Provider> + Send + Sync>;

/// A backend client built on first use and shared for the process lifetime.
pub struct LazyProvider {
    cell: OnceLock<Arc<dyn Provider>>,
    factory: ProviderFactory,
}

impl LazyProvider {
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> Arc<dyn Provider> + Send + Sync + 'static,
    {
        Self {
            cell: OnceLock::new(),
            factory: Box::new(factory),
        }
    }

    /// Wrap an already-constructed provider.
    pub fn ready(provider: Arc<dyn Provider>) -> Self {
        let cell = OnceLock::new();
        let _ = cell.set(Arc::clone(&provider));
        Self {
            cell,
            factory: Box::new(move || Arc::clone(&provider)),
        }
    }

    pub fn openai(config: &ModelConfig) -> Self {
        let api_key = config.usable_api_key().map(str::to_string);
        let base_url = config.base_url.clone();
        let timeout_secs = config.timeout_secs;
        Self::new(move || {
            Arc::new(OpenAiProvider::with_base_url(
                api_key.as_deref(),
                &base_url,
                timeout_secs,
            ))
        })
    }

    pub fn get(&self) -> Arc<dyn Provider> {
        Arc::clone(self.cell.get_or_init(|| (self.factory)()))
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl std::fmt::Debug for LazyProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazyProvider")
            .field("provider", &self.cell.get().map(|p| p.name().to_string()))
            .finish_non_exhaustive()
    }
}
