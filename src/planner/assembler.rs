//! Prompt assembly.
//!
//! Turns a query and an exemplar set into the exact payload the model sees:
//! the exemplars, then the query on its own line, then a newline. The chat
//! route receives it as a user message behind the fixed system instruction;
//! the text route receives the payload alone.

use crate::inference::{ChatMessage, Role};

use super::errors::PlanError;
use super::prompts::{ExemplarSet, SYSTEM_INSTRUCTION};

/// Terminate an instruction with a period unless it already ends with one.
pub fn terminate_query(query: &str) -> Result<String, PlanError> {
    if query.trim().is_empty() {
        return Err(PlanError::invalid("query must not be empty"));
    }
    if query.ends_with('.') {
        Ok(query.to_string())
    } else {
        Ok(format!("{query}."))
    }
}

/// Build the grounding sub-query: the scene context followed by the object
/// phrase as an instruction comment.
pub fn grounding_subquery(context: &str, object_phrase: &str) -> String {
    format!("{context}\n# {object_phrase}.")
}

/// Render a scene object list the way the exemplars declare it.
///
/// `["pear", "tray"]` becomes `objects = ["pear", "tray"]`.
pub fn scene_context<S: AsRef<str>>(objects: &[S]) -> String {
    let quoted: Vec<String> = objects
        .iter()
        .map(|o| format!("\"{}\"", o.as_ref()))
        .collect();
    format!("objects = [{}]", quoted.join(", "))
}

/// The user payload: exemplars, query, trailing newline.
pub fn assemble_payload(exemplars: &str, query: &str) -> String {
    format!("{exemplars}\n{query}\n")
}

/// The two-message list for the chat route.
pub fn assemble_messages(set: ExemplarSet, query: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(SYSTEM_INSTRUCTION),
        ChatMessage::user(assemble_payload(set.text(), query)),
    ]
}

/// Flatten a message list to the prompt used on the text route: the user
/// content only, system instruction dropped.
pub fn flatten_user_text(messages: &[ChatMessage]) -> String {
    messages
        .iter()
        .filter(|m| m.role == Role::User)
        .map(|m| m.content.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}
