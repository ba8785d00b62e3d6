//! Transport abstraction for completion providers

use crate::{GenerationRequest, Provider};
use async_trait::async_trait;
use std::fmt;

/// A failed provider call as reported by the transport
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderFailure {
    /// HTTP status, when the call reached the provider
    pub status: Option<u16>,
    /// Provider error code (e.g. `RESOURCE_EXHAUSTED`)
    pub code: Option<String>,
    pub message: String,
    /// Suggested delay before retrying, in seconds
    pub retry_after: Option<u64>,
}

impl ProviderFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_retry_after(mut self, secs: u64) -> Self {
        self.retry_after = Some(secs);
        self
    }
}

impl fmt::Display for ProviderFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(status) = self.status {
            write!(f, "[{}] ", status)?;
        }
        if let Some(code) = &self.code {
            write!(f, "{}: ", code)?;
        }
        f.write_str(&self.message)
    }
}

/// Sends a prompt to a provider and returns its text, if any
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(
        &self,
        provider: Provider,
        model: &str,
        request: &GenerationRequest,
    ) -> Result<Option<String>, ProviderFailure>;
}
