//! Generation requests

use crate::Provider;

/// A single prompt to send to a provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub provider: Provider,
    pub api_key: String,
    pub system_prompt: Option<String>,
    pub user_message: String,
    /// Overrides the provider's default model
    pub model: Option<String>,
}

impl GenerationRequest {
    pub fn new(provider: Provider, api_key: impl Into<String>, user_message: impl Into<String>) -> Self {
        Self {
            provider,
            api_key: api_key.into(),
            system_prompt: None,
            user_message: user_message.into(),
            model: None,
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Model to call: the explicit one if non-blank, else the provider default
    pub fn resolved_model(&self) -> &str {
        self.model
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| self.provider.default_model())
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}
