//! Prompt-in, text-out seam shared by every generative feature.

use async_trait::async_trait;
use thiserror::Error;

use super::claude_api::ClaudeApiError;

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error(transparent)]
    Claude(#[from] ClaudeApiError),
    #[error("text completion unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait TextCompletion: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError>;
}

/// Stand-in used when no model is configured; every call fails so callers
/// take their deterministic paths.
#[derive(Debug, Clone, Default)]
pub struct DisabledCompletion;

#[async_trait]
impl TextCompletion for DisabledCompletion {
    async fn complete(&self, _prompt: &str) -> Result<String, CompletionError> {
        Err(CompletionError::Unavailable(
            "no language model configured".to_string(),
        ))
    }
}
