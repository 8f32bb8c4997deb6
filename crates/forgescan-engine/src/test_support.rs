//! Message builders for detector tests.

use forgescan_types::{
    MessageIndex, MessageRole, NormalizedMessage, RawTimestamp, ToolInvocation, ToolResult,
};
use serde_json::{Value, json};

/// Builds a session one message at a time, assigning dense indices.
#[derive(Default)]
pub struct SessionBuilder {
    messages: Vec<NormalizedMessage>,
}

impl SessionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(
        mut self,
        role: MessageRole,
        text: &str,
        tool_invocations: Vec<ToolInvocation>,
        tool_results: Vec<ToolResult>,
    ) -> Self {
        let index = MessageIndex::new(self.messages.len());
        self.messages.push(NormalizedMessage {
            index,
            role,
            text: text.to_string(),
            tool_invocations,
            tool_results,
            timestamp: Some(RawTimestamp::Text(format!(
                "2025-03-01T10:{:02}:00Z",
                index.get() % 60
            ))),
        });
        self
    }

    pub fn user(self, text: &str) -> Self {
        self.push(MessageRole::User, text, vec![], vec![])
    }

    pub fn assistant(self, text: &str) -> Self {
        self.push(MessageRole::Assistant, text, vec![], vec![])
    }

    /// Assistant message invoking one tool.
    pub fn tool_call(self, name: &str, input: Value) -> Self {
        let id = format!("toolu_{}", self.messages.len());
        self.push(
            MessageRole::Assistant,
            "",
            vec![ToolInvocation {
                id,
                name: name.to_string(),
                input,
            }],
            vec![],
        )
    }

    /// User message carrying one successful tool result.
    pub fn tool_ok(self, content: &str) -> Self {
        let id = format!("toolu_{}", self.messages.len().saturating_sub(1));
        self.push(
            MessageRole::User,
            content,
            vec![],
            vec![ToolResult {
                tool_use_id: id,
                content: content.to_string(),
                is_error: false,
            }],
        )
    }

    /// User message carrying one tool result flagged as an error.
    pub fn tool_err(self, content: &str) -> Self {
        let id = format!("toolu_{}", self.messages.len().saturating_sub(1));
        self.push(
            MessageRole::User,
            content,
            vec![],
            vec![ToolResult {
                tool_use_id: id,
                content: content.to_string(),
                is_error: true,
            }],
        )
    }

    /// `n` clean steps: a tool call followed by a successful result, each
    /// with a distinct input so no retries fire.
    pub fn clean_steps(mut self, n: usize) -> Self {
        for step in 0..n {
            let tool = ["Read", "Edit", "Grep", "Glob", "Write", "Bash"][step % 6];
            self = self
                .tool_call(tool, json!({ "path": format!("src/module_{step}.rs") }))
                .tool_ok("ok");
        }
        self
    }

    pub fn build(self) -> Vec<NormalizedMessage> {
        self.messages
    }
}
