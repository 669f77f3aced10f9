//! Request and result types for the planning pipeline.
//!
//! Everything here is built per call and handed back to the caller; nothing
//! is retained between invocations.

use serde::Serialize;

use super::errors::PlanError;
use super::prompts::ExemplarSet;

/// One generation call: the query, its exemplars, and sampling limits.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub query: String,
    pub exemplar_set: ExemplarSet,
    /// Applied in order during sanitization, and forwarded to the endpoint.
    pub stop_markers: Vec<String>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
}

impl GenerationRequest {
    /// Check the numeric limits before anything is sent.
    pub fn validate(&self) -> Result<(), PlanError> {
        if self.query.trim().is_empty() {
            return Err(PlanError::invalid("query must not be empty"));
        }
        if self.max_tokens == 0 {
            return Err(PlanError::invalid("max_tokens must be greater than 0"));
        }
        if self.temperature.is_nan() || self.temperature < 0.0 {
            return Err(PlanError::invalid("temperature must be >= 0"));
        }
        if !(0.0..=1.0).contains(&self.top_p) {
            return Err(PlanError::invalid("top_p must be within [0, 1]"));
        }
        Ok(())
    }
}

/// Which generation path produced the raw text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationPath {
    Chat,
    TextFallback,
}

/// The outcome of one generation stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationResponse {
    /// Text exactly as the model returned it.
    pub raw_text: String,
    /// The first `robot.` line of the truncated text, or `""` when none.
    pub sanitized_text: String,
    /// Wall-clock time of the generation call(s) only.
    pub elapsed_seconds: f64,
    pub path: GenerationPath,
}

impl GenerationResponse {
    /// Whether the stage produced an actionable command.
    pub fn has_command(&self) -> bool {
        !self.sanitized_text.is_empty()
    }
}

/// Both stages of one utterance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanResult {
    pub stage1_response: GenerationResponse,
    /// Present only when stage 1 asked for object grounding.
    pub stage2_response: Option<GenerationResponse>,
    /// Query/response trace, filled when verbose diagnostics were requested.
    pub trace: Option<String>,
}

impl PlanResult {
    /// The caller-facing pair: stage-1 command and optional stage-2 code.
    pub fn texts(&self) -> (&str, Option<&str>) {
        (
            self.stage1_response.sanitized_text.trim(),
            self.stage2_response
                .as_ref()
                .map(|r| r.sanitized_text.trim()),
        )
    }
}
