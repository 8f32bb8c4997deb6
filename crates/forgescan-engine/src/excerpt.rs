use forgescan_types::{
    HitLocation, MessageIndex, MessageRole, NormalizedMessage, RawTimestamp, SessionPatterns,
    truncate_chars,
};
use serde::Serialize;
use std::collections::BTreeSet;

use crate::detect::message_has_error;
use crate::rules::RuleSets;

pub const DEFAULT_CONTEXT_RADIUS: usize = 3;

/// Maximum excerpt text length
pub const EXCERPT_CHARS: usize = 500;

/// One message selected for closer inspection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Excerpt {
    pub index: MessageIndex,
    #[serde(rename = "type")]
    pub role: MessageRole,
    pub timestamp: Option<RawTimestamp>,
    pub text: String,
    /// Names of invoked tools, `None` when the message invokes none
    pub tools_used: Option<Vec<String>>,
    /// Error state of user messages, `None` for assistant messages
    pub has_error: Option<bool>,
}

impl Excerpt {
    fn from_message(msg: &NormalizedMessage, rules: &RuleSets) -> Self {
        Self {
            index: msg.index,
            role: msg.role,
            timestamp: msg.timestamp.clone(),
            text: truncate_chars(&msg.text, EXCERPT_CHARS),
            tools_used: msg.has_tool_invocations().then(|| msg.tool_names()),
            has_error: msg.is_user().then(|| message_has_error(msg, rules)),
        }
    }
}

/// Messages around every hit, deduplicated and in index order.
///
/// Point hits pull in `radius` messages on each side; workflow hits pull in
/// their whole range. Out-of-range indices are clamped away.
pub fn extract_excerpts(
    messages: &[NormalizedMessage],
    patterns: &SessionPatterns,
    radius: usize,
    rules: &RuleSets,
) -> Vec<Excerpt> {
    let Some(last) = messages.len().checked_sub(1) else {
        return Vec::new();
    };

    let mut selected = BTreeSet::new();
    for location in patterns.locations() {
        let (start, end) = match location {
            HitLocation::Point(index) => (
                index.get().saturating_sub(radius),
                index.get().saturating_add(radius),
            ),
            HitLocation::Range { start, end } => (start.get(), end.get()),
        };
        if start > last {
            continue;
        }
        selected.extend(start..=end.min(last));
    }

    selected
        .into_iter()
        .map(|i| Excerpt::from_message(&messages[i], rules))
        .collect()
}
