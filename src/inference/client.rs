//! HTTP inference client for the hosted model.
//!
//! Speaks the OpenAI Chat Completions API on the chat route and the
//! text-generation-inference API on the text route. Both routes authenticate
//! with the same bearer token. The client is built once at startup and shared
//! read-only; it holds no per-call state.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;

use super::backend::GenerationBackend;
use super::config::{load_credential, PlannerConfig};
use super::errors::InferenceError;
use super::responses::{parse_chat_response, parse_text_generation_response};
use super::types::{
    ChatCompletionRequest, ChatMessage, GenerationParams, TextGenerationParameters,
    TextGenerationRequest,
};

// ─── Constants ───────────────────────────────────────────────────────────────

/// TCP connection timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Temperature sent on the text route, where sampling is disabled anyway.
const GREEDY_TEMPERATURE: f32 = 0.1;

// ─── InferenceClient ─────────────────────────────────────────────────────────

/// Client for the hosted model endpoints.
pub struct InferenceClient {
    http: HttpClient,
    config: PlannerConfig,
    token: String,
}

impl InferenceClient {
    /// Build a client, reading the credential from the environment.
    ///
    /// Fails with `MissingCredential` when the token is absent. Does NOT check
    /// connectivity; that happens on the first request.
    pub fn from_config(config: PlannerConfig) -> Result<Self, InferenceError> {
        let token = load_credential()?;
        Self::with_token(config, token)
    }

    /// Build a client with an explicit credential.
    pub fn with_token(config: PlannerConfig, token: String) -> Result<Self, InferenceError> {
        if token.trim().is_empty() {
            return Err(InferenceError::MissingCredential {
                var: super::config::CREDENTIAL_VAR.to_string(),
            });
        }
        config.validate()?;

        let http = HttpClient::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| InferenceError::ConnectionFailed {
                endpoint: config.chat_base_url.clone(),
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            http,
            config,
            token,
        })
    }

    /// The hosted model id.
    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn chat_url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.chat_base_url.trim_end_matches('/')
        )
    }

    fn text_url(&self) -> String {
        format!(
            "{}/{}",
            self.config.text_base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    /// POST a JSON body and return the response text of a 2xx answer.
    async fn post_json<T: serde::Serialize + ?Sized>(
        &self,
        url: &str,
        body: &T,
    ) -> Result<String, InferenceError> {
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await
            .map_err(|e| self.map_transport_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(InferenceError::HttpError {
                status: status.as_u16(),
                body: body_text,
            });
        }

        response
            .text()
            .await
            .map_err(|e| InferenceError::ConnectionFailed {
                endpoint: url.to_string(),
                reason: format!("failed to read response body: {e}"),
            })
    }

    fn map_transport_error(&self, url: &str, e: reqwest::Error) -> InferenceError {
        if e.is_timeout() {
            InferenceError::Timeout {
                duration_secs: self.config.request_timeout_secs,
            }
        } else {
            InferenceError::ConnectionFailed {
                endpoint: url.to_string(),
                reason: e.to_string(),
            }
        }
    }
}

#[async_trait]
impl GenerationBackend for InferenceClient {
    fn name(&self) -> &str {
        &self.config.model
    }

    async fn chat_completion(
        &self,
        messages: &[ChatMessage],
        params: &GenerationParams,
    ) -> Result<String, InferenceError> {
        let url = self.chat_url();
        let body = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: messages.to_vec(),
            max_tokens: params.max_tokens,
            temperature: params.temperature,
            top_p: params.top_p,
            stop: if params.stop.is_empty() {
                None
            } else {
                Some(params.stop.clone())
            },
            stream: false,
        };

        // Log the request metadata (not the full body, the exemplars are long)
        tracing::info!(
            url = %url,
            model = %body.model,
            message_count = body.messages.len(),
            max_tokens = body.max_tokens,
            stop = ?body.stop,
            "chat completion request"
        );

        let text = self.post_json(&url, &body).await?;
        parse_chat_response(&text)
    }

    async fn text_generation(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, InferenceError> {
        let url = self.text_url();
        let body = TextGenerationRequest {
            inputs: prompt.to_string(),
            parameters: TextGenerationParameters {
                max_new_tokens: params.max_tokens,
                temperature: GREEDY_TEMPERATURE,
                do_sample: false,
                return_full_text: false,
                stop: params.stop.clone(),
            },
        };

        tracing::info!(
            url = %url,
            prompt_chars = prompt.len(),
            max_new_tokens = params.max_tokens,
            stop = ?params.stop,
            "text generation request"
        );

        let text = self.post_json(&url, &body).await?;
        parse_text_generation_response(&text)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
