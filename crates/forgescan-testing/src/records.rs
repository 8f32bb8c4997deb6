//! JSONL record builders.
//!
//! Each function returns one line in the shape agent session logs use, so
//! tests can describe a session as a list of calls.

use serde_json::{Value, json};

pub fn user_text(text: &str, timestamp: &str) -> String {
    json!({
        "type": "user",
        "timestamp": timestamp,
        "message": {"role": "user", "content": text},
    })
    .to_string()
}

/// User prompt without any timestamp field.
pub fn user_text_untimed(text: &str) -> String {
    json!({
        "type": "user",
        "message": {"role": "user", "content": text},
    })
    .to_string()
}

pub fn assistant_text(text: &str, timestamp: &str) -> String {
    json!({
        "type": "assistant",
        "timestamp": timestamp,
        "message": {
            "role": "assistant",
            "content": [{"type": "text", "text": text}],
        },
    })
    .to_string()
}

pub fn assistant_tool_use(id: &str, name: &str, input: Value, timestamp: &str) -> String {
    json!({
        "type": "assistant",
        "timestamp": timestamp,
        "message": {
            "role": "assistant",
            "content": [{"type": "tool_use", "id": id, "name": name, "input": input}],
        },
    })
    .to_string()
}

pub fn user_tool_result(tool_use_id: &str, content: &str, is_error: bool, timestamp: &str) -> String {
    json!({
        "type": "user",
        "timestamp": timestamp,
        "message": {
            "role": "user",
            "content": [{
                "type": "tool_result",
                "tool_use_id": tool_use_id,
                "content": content,
                "is_error": is_error,
            }],
        },
    })
    .to_string()
}

/// A non-message record
pub fn summary(text: &str) -> String {
    json!({"type": "summary", "summary": text}).to_string()
}

/// `steps` tool calls, each answered by a successful result.
///
/// Tool names rotate and inputs differ per step, so the steps never look
/// like retries of each other.
pub fn clean_steps(steps: usize, timestamp: &str) -> Vec<String> {
    const TOOLS: [&str; 5] = ["Read", "Edit", "Grep", "Glob", "Write"];
    (0..steps)
        .flat_map(|step| {
            let id = format!("toolu_step_{step}");
            [
                assistant_tool_use(
                    &id,
                    TOOLS[step % TOOLS.len()],
                    json!({"file_path": format!("src/part_{step}.rs")}),
                    timestamp,
                ),
                user_tool_result(&id, "done", false, timestamp),
            ]
        })
        .collect()
}
