//! Error types for AI generation

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AssistantError {
    #[error("No API key configured for this provider. Add one in Settings.")]
    MissingApiKey,

    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    #[error("The provider is rate limiting requests. Please wait {wait_secs} seconds and try again.")]
    RateLimited { wait_secs: u64 },

    #[error("The provider returned an empty response")]
    EmptyResponse,

    #[error("Provider error: {0}")]
    Provider(String),
}

impl AssistantError {
    /// Errors the user fixes in settings rather than by retrying
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::MissingApiKey | Self::UnknownProvider(_))
    }

    /// Errors that go away on their own after waiting
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }
}

pub type Result<T> = std::result::Result<T, AssistantError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert!(AssistantError::MissingApiKey.is_configuration());
        assert!(AssistantError::UnknownProvider("x".into()).is_configuration());
        assert!(!AssistantError::MissingApiKey.is_transient());

        let limited = AssistantError::RateLimited { wait_secs: 20 };
        assert!(limited.is_transient());
        assert!(!limited.is_configuration());

        assert!(!AssistantError::EmptyResponse.is_transient());
        assert!(!AssistantError::Provider("boom".into()).is_configuration());
    }

    #[test]
    fn test_rate_limited_message_has_wait_hint() {
        let message = AssistantError::RateLimited { wait_secs: 42 }.to_string();
        assert!(message.contains("42 seconds"));
    }
}
