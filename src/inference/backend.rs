//! The generation capability seen by the planner.
//!
//! Anything that can answer a chat-style call and a plain text-generation call
//! can back the planner. The HTTP client is the production implementation;
//! tests script their own.

use async_trait::async_trait;

use super::errors::InferenceError;
use super::types::{ChatMessage, GenerationParams};

#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Human-readable name for logging.
    fn name(&self) -> &str;

    /// Chat-style completion over role-tagged messages.
    async fn chat_completion(
        &self,
        messages: &[ChatMessage],
        params: &GenerationParams,
    ) -> Result<String, InferenceError>;

    /// Plain text generation over a single prompt, greedy, without echo.
    async fn text_generation(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, InferenceError>;
}
