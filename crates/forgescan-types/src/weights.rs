use serde::{Deserialize, Serialize};

use crate::pattern::PatternKind;

/// Per-kind weights used to turn hit counts into a session score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub error: u32,
    pub retry: u32,
    pub correction: u32,
    pub tool_failure: u32,
    pub workflow: u32,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            error: 2,
            retry: 3,
            correction: 4,
            tool_failure: 2,
            workflow: 1,
        }
    }
}

impl ScoreWeights {
    pub fn weight(&self, kind: PatternKind) -> u32 {
        match kind {
            PatternKind::Error => self.error,
            PatternKind::Retry => self.retry,
            PatternKind::Correction => self.correction,
            PatternKind::ToolFailure => self.tool_failure,
            PatternKind::Workflow => self.workflow,
        }
    }
}
