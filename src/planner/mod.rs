//! Planner: natural-language instruction to robot command.
//!
//! Submodules:
//! - `prompts`: few-shot exemplar catalog (planning + grounding) and the system instruction
//! - `assembler`: query termination, payload and message construction, scene context
//! - `sanitizer`: stop-marker truncation and robot-command extraction
//! - `engine`: chat-then-text generation with a bounded wait per call
//! - `grounding`: the two-stage plan → object-grounding pipeline (`Planner::run_plan`)
//! - `types`: request / response / plan result types
//! - `errors`: planner-level error types

pub mod assembler;
pub mod engine;
pub mod errors;
pub mod grounding;
pub mod prompts;
pub mod sanitizer;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

// Re-exports for convenience
pub use assembler::scene_context;
pub use engine::CompletionEngine;
pub use errors::PlanError;
pub use grounding::Planner;
pub use prompts::ExemplarSet;
pub use types::{GenerationPath, GenerationRequest, GenerationResponse, PlanResult};
