//! Completion engine.
//!
//! Sends an assembled prompt to the generation backend and normalizes the
//! answer into a single robot command. Generation follows a fixed two-tier
//! order:
//!
//! 1. chat completion over the system + user messages
//! 2. on any chat failure, plain text generation over the user payload,
//!    greedy and without echo, with the same token cap and stop markers
//!
//! When both fail the caller gets one error carrying both causes. A timed-out
//! chat call is fatal and does not fall back.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::inference::{ChatMessage, GenerationBackend, GenerationParams, InferenceError, PlannerConfig};

use super::assembler::{assemble_messages, flatten_user_text};
use super::errors::PlanError;
use super::prompts::ExemplarSet;
use super::sanitizer::sanitize;
use super::types::{GenerationPath, GenerationRequest, GenerationResponse};

/// Sampling limits applied to every request the engine builds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationDefaults {
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
}

impl From<&PlannerConfig> for GenerationDefaults {
    fn from(config: &PlannerConfig) -> Self {
        Self {
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            top_p: config.top_p,
        }
    }
}

/// Text produced by one of the two generation paths.
#[derive(Debug, Clone, PartialEq)]
pub struct Generated {
    pub text: String,
    pub path: GenerationPath,
}

/// Drives generation against a shared, read-only backend.
#[derive(Clone)]
pub struct CompletionEngine {
    backend: Arc<dyn GenerationBackend>,
    defaults: GenerationDefaults,
    timeout: Duration,
}

impl CompletionEngine {
    pub fn new(backend: Arc<dyn GenerationBackend>, config: &PlannerConfig) -> Self {
        Self {
            backend,
            defaults: GenerationDefaults::from(config),
            timeout: Duration::from_secs(config.request_timeout_secs),
        }
    }

    /// Build a request with the configured sampling limits.
    pub fn request(
        &self,
        query: impl Into<String>,
        exemplar_set: ExemplarSet,
        stop_markers: &[&str],
    ) -> GenerationRequest {
        GenerationRequest {
            query: query.into(),
            exemplar_set,
            stop_markers: stop_markers.iter().map(|m| m.to_string()).collect(),
            max_tokens: self.defaults.max_tokens,
            temperature: self.defaults.temperature,
            top_p: self.defaults.top_p,
        }
    }

    /// Run one stage: assemble, generate, sanitize.
    pub async fn complete(&self, request: &GenerationRequest) -> Result<GenerationResponse, PlanError> {
        request.validate()?;

        let messages = assemble_messages(request.exemplar_set, &request.query);
        let params = GenerationParams {
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            top_p: request.top_p,
            stop: request.stop_markers.clone(),
        };

        let started = Instant::now();
        let generated = self.generate(&messages, &params).await?;
        let elapsed_seconds = started.elapsed().as_secs_f64();

        tracing::info!(
            backend = self.backend.name(),
            exemplars = request.exemplar_set.as_str(),
            path = ?generated.path,
            elapsed_seconds,
            "inference complete"
        );
        tracing::debug!(raw = %generated.text, "raw model output");

        let sanitized_text = sanitize(&generated.text, &request.stop_markers).to_string();

        tracing::debug!(filtered = %sanitized_text, "filtered output (robot commands only)");

        Ok(GenerationResponse {
            raw_text: generated.text,
            sanitized_text,
            elapsed_seconds,
            path: generated.path,
        })
    }

    /// Generate text, chat first, text generation as the fallback.
    pub async fn generate(
        &self,
        messages: &[ChatMessage],
        params: &GenerationParams,
    ) -> Result<Generated, InferenceError> {
        let chat_error = match self
            .bounded(self.backend.chat_completion(messages, params))
            .await
        {
            Ok(text) => {
                return Ok(Generated {
                    text,
                    path: GenerationPath::Chat,
                })
            }
            Err(e @ InferenceError::Timeout { .. }) => return Err(e),
            Err(e) => e,
        };

        if chat_error.is_shape_error() {
            tracing::warn!(error = %chat_error, "chat completion format issue, trying text generation");
        } else {
            tracing::warn!(error = %chat_error, "chat completion failed, trying text generation");
        }

        let prompt = flatten_user_text(messages);
        match self
            .bounded(self.backend.text_generation(&prompt, params))
            .await
        {
            Ok(text) => Ok(Generated {
                text,
                path: GenerationPath::TextFallback,
            }),
            Err(text_error) => {
                tracing::error!(
                    chat_error = %chat_error,
                    text_error = %text_error,
                    "both generation methods failed"
                );
                Err(InferenceError::BothMethodsFailed {
                    chat: Box::new(chat_error),
                    text: Box::new(text_error),
                })
            }
        }
    }

    /// Bound a generation call by the configured timeout.
    async fn bounded<F>(&self, call: F) -> Result<String, InferenceError>
    where
        F: Future<Output = Result<String, InferenceError>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(InferenceError::Timeout {
                duration_secs: self.timeout.as_secs(),
            }),
        }
    }
}
