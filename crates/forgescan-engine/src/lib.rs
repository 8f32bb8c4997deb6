// Engine module - pattern detection, scoring and excerpt extraction
// Pure functions over the normalized message stream of one session

pub mod detect;
pub mod error;
pub mod excerpt;
pub mod rules;
pub mod score;
pub mod similarity;

pub use detect::{Detector, detect_patterns, detect_with, message_has_error};
pub use error::{Error, Result};
pub use excerpt::{DEFAULT_CONTEXT_RADIUS, Excerpt, extract_excerpts};
pub use rules::{Rule, RuleConfig, RuleSet, RuleSets, RuleSpec};
pub use score::{score_counts, score_session};

use forgescan_types::{NormalizedMessage, PatternCounts, ScoreWeights, SessionPatterns};
use serde::Serialize;

/// Detection result plus score for one session
#[derive(Debug, Clone, Serialize)]
pub struct SessionAnalysis {
    pub patterns: SessionPatterns,
    pub counts: PatternCounts,
    pub score: u64,
}

// Façade API - the runtime layer should go through this instead of calling
// individual detectors

/// Run every detector over a session and score the findings.
pub fn analyze_session(
    messages: &[NormalizedMessage],
    rules: &RuleSets,
    weights: &ScoreWeights,
) -> SessionAnalysis {
    let patterns = detect_patterns(messages, rules);
    let counts = patterns.counts();
    let score = score_counts(&counts, weights);
    SessionAnalysis {
        patterns,
        counts,
        score,
    }
}

#[cfg(test)]
pub(crate) mod test_support;
