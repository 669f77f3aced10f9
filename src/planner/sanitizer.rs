//! Output sanitization.
//!
//! Reduces raw model text to a single robot command:
//! 1. trim
//! 2. cut at each stop marker in order, re-trimming after every cut
//! 3. keep the first line whose trimmed form starts with `robot.`
//!
//! Every function returns a slice of its input, so the result can only ever
//! contain text the model actually produced.

/// Prefix every robot primitive call starts with.
pub const ROBOT_CALL_PREFIX: &str = "robot.";

/// Trim, then truncate before the first occurrence of each marker in turn.
pub fn truncate_at_stop_markers<'a, S: AsRef<str>>(text: &'a str, markers: &[S]) -> &'a str {
    let mut text = text.trim();
    for marker in markers {
        let marker = marker.as_ref();
        if marker.is_empty() {
            continue;
        }
        if let Some(idx) = text.find(marker) {
            text = text[..idx].trim();
        }
    }
    text
}

/// The first line that is a robot call, or `""` when there is none.
pub fn first_robot_command(text: &str) -> &str {
    text.split('\n')
        .find(|line| line.trim().starts_with(ROBOT_CALL_PREFIX))
        .unwrap_or("")
}

/// Full sanitization pipeline.
pub fn sanitize<'a, S: AsRef<str>>(raw: &'a str, markers: &[S]) -> &'a str {
    first_robot_command(truncate_at_stop_markers(raw, markers))
}
