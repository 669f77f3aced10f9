//! Shared types for the inference client.
//!
//! Request bodies mirror the two routes the hosted model exposes: the OpenAI
//! Chat Completions schema and the text-generation-inference schema.

use serde::{Deserialize, Serialize};

// ─── Messages ────────────────────────────────────────────────────────────────

/// A single role-tagged message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Message role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

// ─── Generation parameters ───────────────────────────────────────────────────

/// Parameters for one generation call, shared by both routes.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    /// Hard cap on generated tokens.
    pub max_tokens: u32,
    /// Chat-path temperature. The text fallback always samples greedily.
    pub temperature: f32,
    /// Chat-path nucleus sampling threshold.
    pub top_p: f32,
    /// Literal strings that end generation early. Empty means no early stop.
    pub stop: Vec<String>,
}

// ─── Request bodies ──────────────────────────────────────────────────────────

/// Request body for `POST {chat_base_url}/chat/completions`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,
    pub stream: bool,
}

/// Request body for `POST {text_base_url}/{model}`.
#[derive(Debug, Clone, Serialize)]
pub struct TextGenerationRequest {
    pub inputs: String,
    pub parameters: TextGenerationParameters,
}

/// Text-generation parameters. Sampling is disabled and the prompt is not
/// echoed back.
#[derive(Debug, Clone, Serialize)]
pub struct TextGenerationParameters {
    pub max_new_tokens: u32,
    pub temperature: f32,
    pub do_sample: bool,
    pub return_full_text: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub stop: Vec<String>,
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roles_serialize_lowercase() {
        let json = serde_json::to_string(&ChatMessage::system("be terse")).unwrap();
        assert_eq!(json, r#"{"role":"system","content":"be terse"}"#);
        let json = serde_json::to_string(&ChatMessage::user("hi")).unwrap();
        assert!(json.contains(r#""role":"user""#));
    }

    #[test]
    fn test_stop_omitted_when_none() {
        let req = ChatCompletionRequest {
            model: "test".to_string(),
            messages: vec![],
            max_tokens: 128,
            temperature: 0.1,
            top_p: 0.9,
            stop: None,
            stream: false,
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(!json.contains("stop"), "stop should be omitted when None");
        assert!(json.contains("\"top_p\":0.9"));
    }

    #[test]
    fn test_stop_included_when_some() {
        let req = ChatCompletionRequest {
            model: "test".to_string(),
            messages: vec![ChatMessage::user("x")],
            max_tokens: 128,
            temperature: 0.1,
            top_p: 0.9,
            stop: Some(vec!["#".to_string(), "objects = [".to_string()]),
            stream: false,
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains(r##""stop":["#","objects = ["]"##));
    }

    #[test]
    fn test_text_generation_body_shape() {
        let req = TextGenerationRequest {
            inputs: "prompt".to_string(),
            parameters: TextGenerationParameters {
                max_new_tokens: 128,
                temperature: 0.1,
                do_sample: false,
                return_full_text: false,
                stop: vec![],
            },
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["inputs"], "prompt");
        assert_eq!(value["parameters"]["max_new_tokens"], 128);
        assert_eq!(value["parameters"]["do_sample"], false);
        assert_eq!(value["parameters"]["return_full_text"], false);
        assert!(value["parameters"].get("stop").is_none());
    }
}
