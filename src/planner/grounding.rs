//! Two-stage plan → object-grounding pipeline.
//!
//! Stage 1 maps an instruction to a robot command using the planning
//! exemplars. When that command is a `robot.parse_obj("...")` lookup, the
//! described object is resolved in stage 2 against the scene context using the
//! grounding exemplars.

use std::sync::OnceLock;

use regex::Regex;
use tracing::Instrument;
use uuid::Uuid;

use super::assembler::{grounding_subquery, terminate_query};
use super::engine::CompletionEngine;
use super::errors::PlanError;
use super::prompts::ExemplarSet;
use super::types::PlanResult;

/// Substring that marks a stage-1 command as an object lookup.
pub const OBJECT_QUERY_MARKER: &str = "parse_obj";

/// Stage-1 stop markers: the next instruction comment.
pub const PLANNING_STOP_MARKERS: [&str; 1] = ["#"];

/// Stage-2 stop markers: the next comment or the next scene declaration.
pub const GROUNDING_STOP_MARKERS: [&str; 2] = ["#", "objects = ["];

fn object_phrase_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"\("(?P<phrase>.*?)"\)"#).expect("object phrase pattern is valid")
    })
}

/// Whether a sanitized stage-1 command asks for object grounding.
pub fn needs_grounding(sanitized: &str) -> bool {
    sanitized.contains(OBJECT_QUERY_MARKER)
}

fn capture_phrase(line: &str) -> Option<String> {
    object_phrase_pattern()
        .captures(line)
        .and_then(|caps| caps.name("phrase"))
        .map(|m| m.as_str().to_string())
}

/// Pull the object description out of a stage-1 response.
///
/// `robot.parse_obj("small fruit")` yields `small fruit`. Raw lines carrying
/// the marker are tried in order; when none has a `("...")` argument, the
/// sanitized command line is tried. Neither matching is a parse error that
/// reports the first offending line.
pub fn extract_object_phrase(raw: &str, sanitized: &str) -> Result<String, PlanError> {
    let mut marker_lines = raw
        .split('\n')
        .filter(|line| line.contains(OBJECT_QUERY_MARKER))
        .peekable();
    let first_line = marker_lines.peek().copied().unwrap_or(sanitized);

    marker_lines
        .find_map(capture_phrase)
        .or_else(|| capture_phrase(sanitized))
        .ok_or_else(|| PlanError::ObjectPhraseParse {
            line: first_line.to_string(),
        })
}

/// Caller-facing entry point: instruction in, stage outputs out.
#[derive(Clone)]
pub struct Planner {
    engine: CompletionEngine,
}

impl Planner {
    pub fn new(engine: CompletionEngine) -> Self {
        Self { engine }
    }

    /// Plan one utterance.
    ///
    /// `context` is the scene declaration (`objects = [...]`) used when the
    /// plan needs grounding. With `verbose`, the result carries a readable
    /// trace of every query and response.
    pub async fn run_plan(
        &self,
        query: &str,
        context: &str,
        verbose: bool,
    ) -> Result<PlanResult, PlanError> {
        let plan_id = Uuid::new_v4();
        let span = tracing::info_span!("plan", %plan_id);
        self.run_stages(query, context, verbose).instrument(span).await
    }

    async fn run_stages(
        &self,
        query: &str,
        context: &str,
        verbose: bool,
    ) -> Result<PlanResult, PlanError> {
        let query = terminate_query(query)?;

        let request = self
            .engine
            .request(query.as_str(), ExemplarSet::Planning, &PLANNING_STOP_MARKERS);
        let stage1 = self.engine.complete(&request).await?;
        let stage1_text = stage1.sanitized_text.trim();

        let mut full_trace = stage1_text.to_string();
        let mut stage2 = None;

        if needs_grounding(stage1_text) {
            let phrase = extract_object_phrase(&stage1.raw_text, stage1_text)?;
            let subquery = grounding_subquery(context, &phrase);
            tracing::info!(object_phrase = %phrase, "stage 1 requested object grounding");

            let request = self
                .engine
                .request(subquery.as_str(), ExemplarSet::Grounding, &GROUNDING_STOP_MARKERS);
            let response = self.engine.complete(&request).await?;

            let subquery_block = format!("\n{subquery}");
            full_trace = [
                stage1_text,
                subquery_block.as_str(),
                response.sanitized_text.trim(),
            ]
            .join("\n");
            stage2 = Some(response);
        }

        let trace = if verbose {
            let trace = format!("{query}\n{full_trace}");
            tracing::info!(trace = %trace, "plan trace");
            Some(trace)
        } else {
            None
        };

        Ok(PlanResult {
            stage1_response: stage1,
            stage2_response: stage2,
            trace,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::inference::{InferenceError, PlannerConfig};
    use crate::planner::prompts::GROUNDING_EXEMPLARS;
    use crate::planner::testing::{Reply, ScriptedBackend};

    const CONTEXT: &str = r#"objects = ["banana", "strawberry", "pear", "tray"]"#;

    fn planner(backend: Arc<ScriptedBackend>) -> Planner {
        Planner::new(CompletionEngine::new(backend, &PlannerConfig::default()))
    }

    #[test]
    fn test_extract_object_phrase() {
        assert_eq!(
            extract_object_phrase("robot.parse_obj(\"small fruit\")", "").unwrap(),
            "small fruit"
        );
    }

    #[test]
    fn test_extract_uses_first_marker_line() {
        let raw = "thinking...\nfruit = robot.parse_obj(\"red fruit\")\nrobot.parse_obj(\"can\")";
        assert_eq!(extract_object_phrase(raw, "").unwrap(), "red fruit");
    }

    #[test]
    fn test_extract_skips_chatter_mentioning_marker() {
        let raw = "I'll call parse_obj first.\nrobot.parse_obj(\"green one\")";
        assert_eq!(extract_object_phrase(raw, "").unwrap(), "green one");
    }

    #[test]
    fn test_extract_falls_back_to_sanitized_line() {
        let raw = "parse_obj is the lookup I need";
        let sanitized = "robot.parse_obj(\"green one\")";
        assert_eq!(extract_object_phrase(raw, sanitized).unwrap(), "green one");
    }

    #[test]
    fn test_extract_without_delimiters_is_parse_error() {
        let err =
            extract_object_phrase("robot.parse_obj(small fruit)", "robot.parse_obj(small fruit)")
                .unwrap_err();
        assert!(matches!(err, PlanError::ObjectPhraseParse { ref line } if line == "robot.parse_obj(small fruit)"));
    }

    #[test]
    fn test_needs_grounding() {
        assert!(needs_grounding("robot.parse_obj(\"green one\")"));
        assert!(!needs_grounding("robot.pick_and_place(\"pear\", \"tray\")"));
        assert!(!needs_grounding(""));
    }

    #[tokio::test]
    async fn test_plain_command_skips_grounding() {
        let backend = Arc::new(ScriptedBackend::new(
            vec![Reply::Text("robot.pick_and_place(\"pear\", \"tray\")\n# next".into())],
            vec![],
        ));
        let result = planner(backend.clone())
            .run_plan("put the pear in the tray", CONTEXT, false)
            .await
            .unwrap();

        assert_eq!(result.texts(), ("robot.pick_and_place(\"pear\", \"tray\")", None));
        assert!(result.trace.is_none());
        assert_eq!(backend.chat_calls().len(), 1);
        assert!(backend.chat_calls()[0].messages[1]
            .content
            .ends_with("\nput the pear in the tray.\n"));
    }

    #[tokio::test]
    async fn test_object_lookup_runs_grounding_stage() {
        let backend = Arc::new(ScriptedBackend::new(
            vec![
                Reply::Text("robot.parse_obj(\"small fruit\")".into()),
                Reply::Text("small_fruit = find(objects, \"small fruit\")[0]\n# done".into()),
            ],
            vec![],
        ));
        let result = planner(backend.clone())
            .run_plan("now put the small one in the right side.", CONTEXT, false)
            .await
            .unwrap();

        let chat_calls = backend.chat_calls();
        assert_eq!(chat_calls.len(), 2);
        assert_eq!(
            chat_calls[1].messages[1].content,
            format!("{GROUNDING_EXEMPLARS}\n{CONTEXT}\n# small fruit.\n")
        );
        assert_eq!(
            chat_calls[1].params.stop,
            vec!["#".to_string(), "objects = [".to_string()]
        );

        let stage2 = result.stage2_response.unwrap();
        assert_eq!(
            stage2.raw_text,
            "small_fruit = find(objects, \"small fruit\")[0]\n# done"
        );
        // Grounding code is not a robot call, so it filters to empty.
        assert_eq!(stage2.sanitized_text, "");
    }

    #[tokio::test]
    async fn test_verbose_trace_lists_both_stages() {
        let backend = Arc::new(ScriptedBackend::new(
            vec![
                Reply::Text("robot.parse_obj(\"green one\")".into()),
                Reply::Text("robot.pick_and_place(\"pear\", \"top side\")".into()),
            ],
            vec![],
        ));
        let result = planner(backend)
            .run_plan("now put the green one in the top side", CONTEXT, true)
            .await
            .unwrap();

        let expected = format!(
            "now put the green one in the top side.\nrobot.parse_obj(\"green one\")\n\n{CONTEXT}\n# green one.\nrobot.pick_and_place(\"pear\", \"top side\")"
        );
        assert_eq!(result.trace.as_deref(), Some(expected.as_str()));
    }

    #[tokio::test]
    async fn test_unparseable_lookup_is_reported() {
        let backend = Arc::new(ScriptedBackend::new(
            vec![Reply::Text("robot.parse_obj(green one)".into())],
            vec![],
        ));
        let err = planner(backend.clone())
            .run_plan("put the green one left", CONTEXT, false)
            .await
            .unwrap_err();
        assert!(matches!(err, PlanError::ObjectPhraseParse { .. }));
        assert_eq!(backend.chat_calls().len(), 1);
    }

    #[tokio::test]
    async fn test_chatter_before_lookup_still_grounds() {
        let backend = Arc::new(ScriptedBackend::new(
            vec![
                Reply::Text("I'll call parse_obj first.\nrobot.parse_obj(\"green one\")".into()),
                Reply::Text("robot.pick_and_place(\"pear\", \"left side\")".into()),
            ],
            vec![],
        ));
        let result = planner(backend.clone())
            .run_plan("put the green one left", CONTEXT, false)
            .await
            .unwrap();

        assert_eq!(
            backend.chat_calls()[1].messages[1].content,
            format!("{GROUNDING_EXEMPLARS}\n{CONTEXT}\n# green one.\n")
        );
        assert!(result.stage2_response.is_some());
    }

    #[tokio::test]
    async fn test_total_failure_returns_no_plan() {
        let backend = Arc::new(ScriptedBackend::new(
            vec![Reply::Fail(InferenceError::HttpError {
                status: 401,
                body: "invalid token".into(),
            })],
            vec![Reply::Fail(InferenceError::HttpError {
                status: 401,
                body: "invalid token".into(),
            })],
        ));
        let err = planner(backend)
            .run_plan("put all cans in the tray", CONTEXT, false)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PlanError::Inference(InferenceError::BothMethodsFailed { .. })
        ));
    }

    #[tokio::test]
    async fn test_empty_query_rejected_before_generation() {
        let backend = Arc::new(ScriptedBackend::new(vec![], vec![]));
        let err = planner(backend.clone()).run_plan("", CONTEXT, false).await.unwrap_err();
        assert!(matches!(err, PlanError::InvalidRequest { .. }));
        assert!(backend.chat_calls().is_empty());
    }
}
