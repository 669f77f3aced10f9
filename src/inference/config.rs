//! Planner configuration loading and validation.
//!
//! Reads `config/planner.yaml` (when present) and resolves environment
//! variables. The API credential never lives in the file: it is read from the
//! process environment, after loading a `.env` file if one exists.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::errors::InferenceError;

// ─── Constants ───────────────────────────────────────────────────────────────

/// Environment variable holding the API access token.
pub const CREDENTIAL_VAR: &str = "HUGGINGFACE_TOKEN";

/// Environment variable that overrides the config file location.
pub const CONFIG_PATH_VAR: &str = "ROBOT_PLANNER_CONFIG";

/// Config file location relative to a project directory.
const CONFIG_RELATIVE_PATH: &str = "config/planner.yaml";

// ─── Public Types ────────────────────────────────────────────────────────────

/// Model endpoint and default generation settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlannerConfig {
    /// Hosted model id, e.g. `"meta-llama/Llama-3.2-3B-Instruct"`.
    #[serde(default = "default_model")]
    pub model: String,
    /// Base URL of the OpenAI-compatible chat route (without `/chat/completions`).
    #[serde(default = "default_chat_base_url")]
    pub chat_base_url: String,
    /// Base URL of the text-generation route; the model id is appended.
    #[serde(default = "default_text_base_url")]
    pub text_base_url: String,
    /// Hard cap on generated tokens per stage.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Chat-path sampling temperature. Kept low for reproducible commands.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Chat-path nucleus sampling threshold.
    #[serde(default = "default_top_p")]
    pub top_p: f32,
    /// Upper bound on a single generation call.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_model() -> String {
    "meta-llama/Llama-3.2-3B-Instruct".to_string()
}
fn default_chat_base_url() -> String {
    "https://router.huggingface.co/v1".to_string()
}
fn default_text_base_url() -> String {
    "https://api-inference.huggingface.co/models".to_string()
}
fn default_max_tokens() -> u32 {
    128
}
fn default_temperature() -> f32 {
    0.1
}
fn default_top_p() -> f32 {
    0.9
}
fn default_request_timeout_secs() -> u64 {
    60
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            chat_base_url: default_chat_base_url(),
            text_base_url: default_text_base_url(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl PlannerConfig {
    /// Reject settings the endpoints would refuse or that make no sense.
    pub fn validate(&self) -> Result<(), InferenceError> {
        if self.model.trim().is_empty() {
            return Err(config_error("model must not be empty"));
        }
        if self.max_tokens == 0 {
            return Err(config_error("max_tokens must be greater than 0"));
        }
        if self.temperature.is_nan() || self.temperature < 0.0 {
            return Err(config_error("temperature must be >= 0"));
        }
        if !(0.0..=1.0).contains(&self.top_p) {
            return Err(config_error("top_p must be within [0, 1]"));
        }
        if self.request_timeout_secs == 0 {
            return Err(config_error("request_timeout_secs must be greater than 0"));
        }
        Ok(())
    }
}

fn config_error(reason: &str) -> InferenceError {
    InferenceError::ConfigError {
        reason: reason.to_string(),
    }
}

// ─── Loading ─────────────────────────────────────────────────────────────────

/// Locate the config file.
///
/// Checks `ROBOT_PLANNER_CONFIG` first, then searches upward from `start` for
/// `config/planner.yaml`. Returns `None` when no file exists; the caller then
/// runs on defaults.
pub fn find_config_path(start: &Path) -> Option<PathBuf> {
    if let Ok(explicit) = std::env::var(CONFIG_PATH_VAR) {
        let candidate = PathBuf::from(explicit);
        if candidate.exists() {
            return Some(candidate);
        }
        tracing::warn!(
            path = %candidate.display(),
            "{CONFIG_PATH_VAR} points to a missing file, searching upward instead"
        );
    }

    let mut dir = start.to_path_buf();
    loop {
        let candidate = dir.join(CONFIG_RELATIVE_PATH);
        if candidate.exists() {
            return Some(candidate);
        }
        if !dir.pop() {
            return None;
        }
    }
}

/// Load, interpolate, parse, and validate a config file.
pub fn load_planner_config(path: &Path) -> Result<PlannerConfig, InferenceError> {
    let raw = std::fs::read_to_string(path).map_err(|e| InferenceError::ConfigError {
        reason: format!("failed to read {}: {e}", path.display()),
    })?;

    let interpolated = interpolate_env_vars(&raw);

    let config: PlannerConfig =
        serde_yaml::from_str(&interpolated).map_err(|e| InferenceError::ConfigError {
            reason: format!("failed to parse config: {e}"),
        })?;

    config.validate()?;
    Ok(config)
}

/// Load the config found from `start`, or fall back to defaults.
pub fn resolve_planner_config(start: &Path) -> Result<PlannerConfig, InferenceError> {
    match find_config_path(start) {
        Some(path) => {
            tracing::info!(path = %path.display(), "loading planner config");
            load_planner_config(&path)
        }
        None => {
            tracing::info!("no planner config file found, using defaults");
            Ok(PlannerConfig::default())
        }
    }
}

/// Read the API credential from the environment.
///
/// Loads `.env` from the working directory (or its parents) first. A missing
/// or empty value is fatal: no model handle can be built without it.
pub fn load_credential() -> Result<String, InferenceError> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            tracing::warn!(error = %e, "failed to load .env file");
        }
    }
    credential_from_env(CREDENTIAL_VAR)
}

fn credential_from_env(var: &str) -> Result<String, InferenceError> {
    match std::env::var(var) {
        Ok(token) if !token.trim().is_empty() => Ok(token),
        _ => Err(InferenceError::MissingCredential {
            var: var.to_string(),
        }),
    }
}

// ─── Env-var interpolation ───────────────────────────────────────────────────

/// Replace `${VAR}` and `${VAR:-default}` in a string.
fn interpolate_env_vars(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && chars.peek() == Some(&'{') {
            chars.next();
            let mut var_expr = String::new();
            for c in chars.by_ref() {
                if c == '}' {
                    break;
                }
                var_expr.push(c);
            }
            result.push_str(&resolve_var_expr(&var_expr));
        } else {
            result.push(ch);
        }
    }

    result
}

/// Resolve a variable expression like `VAR` or `VAR:-default`.
fn resolve_var_expr(expr: &str) -> String {
    match expr.split_once(":-") {
        Some((var_name, default)) => {
            std::env::var(var_name).unwrap_or_else(|_| default.to_string())
        }
        None => std::env::var(expr).unwrap_or_default(),
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
