//! Planner error types.

use thiserror::Error;

use crate::inference::InferenceError;

/// Errors that can occur while turning an instruction into robot commands.
#[derive(Debug, Error)]
pub enum PlanError {
    /// The request cannot be sent as given (empty query, bad sampling values).
    #[error("invalid request: {reason}")]
    InvalidRequest { reason: String },

    /// Stage 1 asked for object grounding but the phrase could not be read.
    #[error("could not parse object phrase from line: '{line}'")]
    ObjectPhraseParse { line: String },

    /// Generation failed (configuration, transport, timeout, or both paths).
    #[error(transparent)]
    Inference(#[from] InferenceError),
}

impl PlanError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        PlanError::InvalidRequest {
            reason: reason.into(),
        }
    }
}
