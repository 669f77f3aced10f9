//! Scripted generation backend for planner tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::inference::{ChatMessage, GenerationBackend, GenerationParams, InferenceError};

/// What the backend does on its next call of a given kind.
pub enum Reply {
    Text(String),
    Fail(InferenceError),
    /// Never resolves; exercises the timeout path.
    Hang,
}

#[derive(Debug, Clone)]
pub struct ChatCall {
    pub messages: Vec<ChatMessage>,
    pub params: GenerationParams,
}

#[derive(Debug, Clone)]
pub struct TextCall {
    pub prompt: String,
    pub params: GenerationParams,
}

/// Replays queued replies and records every call it receives.
pub struct ScriptedBackend {
    chat_replies: Mutex<VecDeque<Reply>>,
    text_replies: Mutex<VecDeque<Reply>>,
    chat_calls: Mutex<Vec<ChatCall>>,
    text_calls: Mutex<Vec<TextCall>>,
}

impl ScriptedBackend {
    pub fn new(chat: Vec<Reply>, text: Vec<Reply>) -> Self {
        Self {
            chat_replies: Mutex::new(chat.into()),
            text_replies: Mutex::new(text.into()),
            chat_calls: Mutex::new(Vec::new()),
            text_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn chat_calls(&self) -> Vec<ChatCall> {
        self.chat_calls.lock().unwrap().clone()
    }

    pub fn text_calls(&self) -> Vec<TextCall> {
        self.text_calls.lock().unwrap().clone()
    }

    async fn play(reply: Option<Reply>) -> Result<String, InferenceError> {
        match reply {
            Some(Reply::Text(text)) => Ok(text),
            Some(Reply::Fail(err)) => Err(err),
            Some(Reply::Hang) => std::future::pending().await,
            None => Err(InferenceError::ConnectionFailed {
                endpoint: "scripted".into(),
                reason: "no scripted reply left".into(),
            }),
        }
    }
}

#[async_trait]
impl GenerationBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn chat_completion(
        &self,
        messages: &[ChatMessage],
        params: &GenerationParams,
    ) -> Result<String, InferenceError> {
        self.chat_calls.lock().unwrap().push(ChatCall {
            messages: messages.to_vec(),
            params: params.clone(),
        });
        let reply = self.chat_replies.lock().unwrap().pop_front();
        Self::play(reply).await
    }

    async fn text_generation(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, InferenceError> {
        self.text_calls.lock().unwrap().push(TextCall {
            prompt: prompt.to_string(),
            params: params.clone(),
        });
        let reply = self.text_replies.lock().unwrap().pop_front();
        Self::play(reply).await
    }
}
