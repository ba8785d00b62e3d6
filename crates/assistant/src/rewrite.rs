//! Rewrite actions offered on a text selection

use crate::{GenerationRequest, Provider};
use serde::{Deserialize, Serialize};

const REWRITE_SYSTEM_PROMPT: &str = "You are a writing assistant inside a text editor. \
Return only the rewritten text, with no preamble, quotes or explanation.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RewriteAction {
    Improve,
    Shorten,
    Expand,
    FixGrammar,
    Professional,
    Casual,
}

impl RewriteAction {
    pub const ALL: [RewriteAction; 6] = [
        RewriteAction::Improve,
        RewriteAction::Shorten,
        RewriteAction::Expand,
        RewriteAction::FixGrammar,
        RewriteAction::Professional,
        RewriteAction::Casual,
    ];

    /// Menu label
    pub fn label(&self) -> &'static str {
        match self {
            RewriteAction::Improve => "Improve writing",
            RewriteAction::Shorten => "Make shorter",
            RewriteAction::Expand => "Make longer",
            RewriteAction::FixGrammar => "Fix spelling & grammar",
            RewriteAction::Professional => "More professional",
            RewriteAction::Casual => "More casual",
        }
    }

    fn instruction(&self) -> &'static str {
        match self {
            RewriteAction::Improve => "Improve the clarity and flow of the following text while keeping its meaning.",
            RewriteAction::Shorten => "Rewrite the following text to be more concise.",
            RewriteAction::Expand => "Expand the following text with more detail while keeping its tone.",
            RewriteAction::FixGrammar => "Correct any spelling, grammar and punctuation mistakes in the following text.",
            RewriteAction::Professional => "Rewrite the following text in a professional tone.",
            RewriteAction::Casual => "Rewrite the following text in a relaxed, casual tone.",
        }
    }
}

/// Build the request that rewrites `selection` with `action`
pub fn rewrite_request(
    action: RewriteAction,
    selection: &str,
    provider: Provider,
    api_key: impl Into<String>,
) -> GenerationRequest {
    let message = format!("{}\n\n{}", action.instruction(), selection.trim());
    GenerationRequest::new(provider, api_key, message).with_system_prompt(REWRITE_SYSTEM_PROMPT)
}
