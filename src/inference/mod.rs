//! Inference Client: access to the hosted text-generation model.
//!
//! This module handles all communication with the model endpoints:
//! - The `GenerationBackend` seam the planner depends on
//! - Chat completions (OpenAI schema) and plain text generation
//! - Response body parsing and shape checks
//! - Configuration loading from `config/planner.yaml` and the credential
//!   from the environment
//!
//! The model is interchangeable via config. Switching from Llama to Qwen is a
//! config change, not a code change.

pub mod backend;
pub mod client;
pub mod config;
pub mod errors;
pub mod responses;
pub mod types;

// Re-exports for convenience
pub use backend::GenerationBackend;
pub use client::InferenceClient;
pub use config::PlannerConfig;
pub use errors::InferenceError;
pub use types::{ChatMessage, GenerationParams, Role};
