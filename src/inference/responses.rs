//! Response body parsers for the chat and text-generation routes.
//!
//! Both parsers report a `MalformedResponse` when the body does not carry
//! generated text where the route promises it. For the chat route that is the
//! capability-shape error that sends the engine to the text fallback.

use serde::Deserialize;

use super::errors::InferenceError;

// ─── Chat route ──────────────────────────────────────────────────────────────

/// Extract `choices[0].message.content` from a chat completion body.
pub fn parse_chat_response(body: &str) -> Result<String, InferenceError> {
    #[derive(Deserialize)]
    struct ChatResponse {
        #[serde(default)]
        choices: Vec<ChatChoice>,
    }

    #[derive(Deserialize)]
    struct ChatChoice {
        message: Option<ChatResponseMessage>,
    }

    #[derive(Deserialize)]
    struct ChatResponseMessage {
        content: Option<String>,
    }

    let resp: ChatResponse =
        serde_json::from_str(body).map_err(|e| InferenceError::MalformedResponse {
            reason: format!("failed to parse chat response: {e}"),
        })?;

    let choice = resp
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| InferenceError::MalformedResponse {
            reason: "empty choices array".into(),
        })?;

    choice
        .message
        .and_then(|m| m.content)
        .ok_or_else(|| InferenceError::MalformedResponse {
            reason: "choice has no message content".into(),
        })
}

// ─── Text-generation route ───────────────────────────────────────────────────

/// Extract `generated_text` from a text-generation body.
///
/// Hosted endpoints answer with a one-element list; a self-hosted
/// text-generation-inference server answers with a bare object. Both are
/// accepted.
pub fn parse_text_generation_response(body: &str) -> Result<String, InferenceError> {
    #[derive(Deserialize)]
    struct Generated {
        generated_text: String,
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum TextGenerationResponse {
        Batch(Vec<Generated>),
        Single(Generated),
    }

    let resp: TextGenerationResponse =
        serde_json::from_str(body).map_err(|e| InferenceError::MalformedResponse {
            reason: format!("failed to parse text-generation response: {e}"),
        })?;

    match resp {
        TextGenerationResponse::Single(g) => Ok(g.generated_text),
        TextGenerationResponse::Batch(items) => items
            .into_iter()
            .next()
            .map(|g| g.generated_text)
            .ok_or_else(|| InferenceError::MalformedResponse {
                reason: "empty generation list".into(),
            }),
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
