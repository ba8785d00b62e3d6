//! Generating a reply with a single bounded rate-limit retry

use crate::{AssistantError, CompletionBackend, GenerationRequest, ProviderFailure, Result};
use regex_lite::Regex;
use std::sync::OnceLock;
use std::time::Duration;

/// Wait used when the provider gives no hint
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(20);

/// Longest wait before the single retry
pub const MAX_RETRY_DELAY: Duration = Duration::from_secs(60);

const RATE_LIMIT_CODES: [&str; 3] = ["RESOURCE_EXHAUSTED", "rate_limit_exceeded", "insufficient_quota"];

fn rate_limit_message_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)quota|rate[ _-]?limit|too many requests").expect("valid rate limit pattern")
    })
}

fn retry_in_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)retry in\s+(\d+(?:\.\d+)?)\s*s").expect("valid retry hint pattern")
    })
}

/// Whether a failure means "slow down" rather than "broken"
pub fn is_rate_limit(failure: &ProviderFailure) -> bool {
    failure.status == Some(429)
        || failure
            .code
            .as_deref()
            .is_some_and(|code| RATE_LIMIT_CODES.iter().any(|c| c.eq_ignore_ascii_case(code)))
        || rate_limit_message_re().is_match(&failure.message)
}

/// Delay to wait before retrying a rate-limited call.
///
/// Uses `retry_after` when present, else a "retry in Ns" hint from the
/// message, else [`DEFAULT_RETRY_DELAY`]; never more than [`MAX_RETRY_DELAY`].
pub fn suggested_delay(failure: &ProviderFailure) -> Duration {
    let hinted = failure.retry_after.map(Duration::from_secs).or_else(|| {
        retry_in_re()
            .captures(&failure.message)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<f64>().ok())
            .filter(|secs| secs.is_finite() && *secs >= 0.0)
            .map(|secs| Duration::from_secs(secs.ceil() as u64))
    });
    hinted.unwrap_or(DEFAULT_RETRY_DELAY).min(MAX_RETRY_DELAY)
}

fn into_reply(text: Option<String>) -> Result<String> {
    match text {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(AssistantError::EmptyResponse),
    }
}

/// Send a request, retrying once after a rate-limit failure
pub async fn generate_reply<B>(backend: &B, request: &GenerationRequest) -> Result<String>
where
    B: CompletionBackend + ?Sized,
{
    if !request.has_api_key() {
        return Err(AssistantError::MissingApiKey);
    }

    let provider = request.provider;
    let model = request.resolved_model();
    tracing::debug!(%provider, model, "sending generation request");

    match backend.complete(provider, model, request).await {
        Ok(text) => into_reply(text),
        Err(failure) if is_rate_limit(&failure) => {
            let delay = suggested_delay(&failure);
            tracing::warn!(
                %provider,
                delay_secs = delay.as_secs(),
                "rate limited, retrying once: {}",
                failure
            );
            tokio::time::sleep(delay).await;

            match backend.complete(provider, model, request).await {
                Ok(text) => into_reply(text),
                Err(failure) if is_rate_limit(&failure) => {
                    let wait_secs = suggested_delay(&failure).as_secs().max(1);
                    tracing::warn!(%provider, wait_secs, "still rate limited after retry");
                    Err(AssistantError::RateLimited { wait_secs })
                }
                Err(failure) => Err(AssistantError::Provider(failure.to_string())),
            }
        }
        Err(failure) => {
            tracing::warn!(%provider, "generation failed: {}", failure);
            Err(AssistantError::Provider(failure.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_detection() {
        assert!(is_rate_limit(&ProviderFailure::new("x").with_status(429)));
        assert!(is_rate_limit(&ProviderFailure::new("x").with_code("RESOURCE_EXHAUSTED")));
        assert!(is_rate_limit(&ProviderFailure::new("x").with_code("insufficient_quota")));
        assert!(is_rate_limit(&ProviderFailure::new("You exceeded your current quota")));
        assert!(is_rate_limit(&ProviderFailure::new("Rate limit reached for model")));
        assert!(is_rate_limit(&ProviderFailure::new("429 Too Many Requests")));

        assert!(!is_rate_limit(&ProviderFailure::new("invalid api key").with_status(401)));
        assert!(!is_rate_limit(&ProviderFailure::new("server error").with_status(500)));
    }

    #[test]
    fn test_suggested_delay_prefers_retry_after() {
        let failure = ProviderFailure::new("Please retry in 5s").with_retry_after(12);
        assert_eq!(suggested_delay(&failure), Duration::from_secs(12));
    }

    #[test]
    fn test_suggested_delay_parses_message_hint() {
        let failure = ProviderFailure::new("Quota exceeded. Please retry in 7.2s.");
        assert_eq!(suggested_delay(&failure), Duration::from_secs(8));
    }

    #[test]
    fn test_suggested_delay_default_and_cap() {
        assert_eq!(suggested_delay(&ProviderFailure::new("quota")), DEFAULT_RETRY_DELAY);
        let failure = ProviderFailure::new("quota").with_retry_after(3600);
        assert_eq!(suggested_delay(&failure), MAX_RETRY_DELAY);
        let failure = ProviderFailure::new("quota, retry in 300s");
        assert_eq!(suggested_delay(&failure), MAX_RETRY_DELAY);
    }

    #[test]
    fn test_into_reply_rejects_blank_text() {
        assert_eq!(into_reply(None), Err(AssistantError::EmptyResponse));
        assert_eq!(into_reply(Some(" \n".into())), Err(AssistantError::EmptyResponse));
        assert_eq!(into_reply(Some("ok".into())), Ok("ok".to_string()));
    }
}
