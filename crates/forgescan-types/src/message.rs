use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::record::{RawTimestamp, RecordKind};

/// Position of a message within the user/assistant-only stream of one session.
///
/// Indices are dense over the retained messages and unrelated to raw file line
/// numbers. They are only meaningful relative to the session that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageIndex(usize);

impl MessageIndex {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl fmt::Display for MessageIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Speaker of a retained message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    Assistant,
}

impl MessageRole {
    pub fn from_kind(kind: RecordKind) -> Option<Self> {
        match kind {
            RecordKind::User => Some(MessageRole::User),
            RecordKind::Assistant => Some(MessageRole::Assistant),
            RecordKind::Other => None,
        }
    }
}

/// A `tool_use` block
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolInvocation {
    pub id: String,
    pub name: String,
    pub input: Value,
}

/// A `tool_result` block, flattened to text
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolResult {
    pub tool_use_id: String,
    pub content: String,
    pub is_error: bool,
}

/// Uniform view of one user or assistant record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedMessage {
    pub index: MessageIndex,
    pub role: MessageRole,
    /// Text blocks and tool-result text, joined by newlines
    pub text: String,
    pub tool_invocations: Vec<ToolInvocation>,
    pub tool_results: Vec<ToolResult>,
    pub timestamp: Option<RawTimestamp>,
}

impl NormalizedMessage {
    pub fn is_user(&self) -> bool {
        self.role == MessageRole::User
    }

    pub fn is_assistant(&self) -> bool {
        self.role == MessageRole::Assistant
    }

    /// A message that carries no tool results (a typed prompt or reply).
    pub fn is_plain_text(&self) -> bool {
        self.tool_results.is_empty()
    }

    pub fn has_tool_invocations(&self) -> bool {
        !self.tool_invocations.is_empty()
    }

    /// First tool result flagged as an error.
    pub fn first_failed_result(&self) -> Option<&ToolResult> {
        self.tool_results.iter().find(|r| r.is_error)
    }

    pub fn failed_results(&self) -> impl Iterator<Item = &ToolResult> {
        self.tool_results.iter().filter(|r| r.is_error)
    }

    pub fn tool_names(&self) -> Vec<String> {
        self.tool_invocations.iter().map(|t| t.name.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_index_display() {
        let idx = MessageIndex::new(5);
        assert_eq!(idx.get(), 5);
        assert_eq!(idx.to_string(), "#5");
    }

    #[test]
    fn test_role_from_kind() {
        assert_eq!(MessageRole::from_kind(RecordKind::User), Some(MessageRole::User));
        assert_eq!(
            MessageRole::from_kind(RecordKind::Assistant),
            Some(MessageRole::Assistant)
        );
        assert_eq!(MessageRole::from_kind(RecordKind::Other), None);
    }
}
