use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::AddAssign;

use crate::message::MessageIndex;
use crate::record::RawTimestamp;

/// Maximum snippet length for single-point hits
pub const SNIPPET_CHARS: usize = 200;

/// The five categories a detector can report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    Error,
    Retry,
    Correction,
    ToolFailure,
    Workflow,
}

impl PatternKind {
    pub const ALL: [PatternKind; 5] = [
        PatternKind::Error,
        PatternKind::Retry,
        PatternKind::Correction,
        PatternKind::ToolFailure,
        PatternKind::Workflow,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PatternKind::Error => "error",
            PatternKind::Retry => "retry",
            PatternKind::Correction => "correction",
            PatternKind::ToolFailure => "tool_failure",
            PatternKind::Workflow => "workflow",
        }
    }
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How an error was recognised
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// A tool result in a user message carried the error flag
    ToolError,
    /// User message text matched an error rule
    ErrorPattern,
    /// Assistant text matched an error rule
    AssistantErrorMention,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorHit {
    pub index: MessageIndex,
    pub timestamp: Option<RawTimestamp>,
    #[serde(rename = "type")]
    pub kind: ErrorKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_use_id: Option<String>,
    /// Label of the matching rule (pattern subtypes only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule: Option<String>,
    pub snippet: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetryHit {
    pub index: MessageIndex,
    pub timestamp: Option<RawTimestamp>,
    pub tool: String,
    /// Earlier invocation this one repeats
    pub first_index: MessageIndex,
    pub similarity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrectionHit {
    pub index: MessageIndex,
    pub timestamp: Option<RawTimestamp>,
    pub rule: String,
    pub snippet: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolFailureHit {
    pub index: MessageIndex,
    pub timestamp: Option<RawTimestamp>,
    pub tool_use_id: String,
    pub snippet: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowHit {
    pub start_index: MessageIndex,
    pub end_index: MessageIndex,
    /// Number of clean tool steps in the run
    pub length: usize,
    pub timestamp: Option<RawTimestamp>,
    /// Set only when the run was closed by a plain-text user message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub positive_feedback: Option<bool>,
}

/// Where a hit points into the message stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitLocation {
    Point(MessageIndex),
    Range {
        start: MessageIndex,
        end: MessageIndex,
    },
}

/// All findings of one detection pass over one session
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionPatterns {
    pub errors: Vec<ErrorHit>,
    pub retries: Vec<RetryHit>,
    pub corrections: Vec<CorrectionHit>,
    pub tool_failures: Vec<ToolFailureHit>,
    pub successful_workflows: Vec<WorkflowHit>,
}

impl SessionPatterns {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counts(&self) -> PatternCounts {
        PatternCounts {
            errors: self.errors.len(),
            retries: self.retries.len(),
            corrections: self.corrections.len(),
            tool_failures: self.tool_failures.len(),
            successful_workflows: self.successful_workflows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.counts().total() == 0
    }

    /// Locations of every hit, single-point kinds first, workflows last.
    pub fn locations(&self) -> Vec<HitLocation> {
        let points = self
            .errors
            .iter()
            .map(|h| h.index)
            .chain(self.retries.iter().map(|h| h.index))
            .chain(self.corrections.iter().map(|h| h.index))
            .chain(self.tool_failures.iter().map(|h| h.index))
            .map(HitLocation::Point);
        let ranges = self.successful_workflows.iter().map(|h| HitLocation::Range {
            start: h.start_index,
            end: h.end_index,
        });
        points.chain(ranges).collect()
    }
}

/// Number of hits per kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternCounts {
    pub errors: usize,
    pub retries: usize,
    pub corrections: usize,
    pub tool_failures: usize,
    pub successful_workflows: usize,
}

impl PatternCounts {
    pub fn get(&self, kind: PatternKind) -> usize {
        match kind {
            PatternKind::Error => self.errors,
            PatternKind::Retry => self.retries,
            PatternKind::Correction => self.corrections,
            PatternKind::ToolFailure => self.tool_failures,
            PatternKind::Workflow => self.successful_workflows,
        }
    }

    pub fn total(&self) -> usize {
        PatternKind::ALL.iter().map(|k| self.get(*k)).sum()
    }
}

impl AddAssign for PatternCounts {
    fn add_assign(&mut self, rhs: Self) {
        self.errors += rhs.errors;
        self.retries += rhs.retries;
        self.corrections += rhs.corrections;
        self.tool_failures += rhs.tool_failures;
        self.successful_workflows += rhs.successful_workflows;
    }
}
