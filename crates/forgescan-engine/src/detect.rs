use forgescan_types::{
    CorrectionHit, ErrorHit, ErrorKind, MessageIndex, NormalizedMessage, RetryHit,
    SNIPPET_CHARS, SessionPatterns, ToolFailureHit, WorkflowHit, truncate_chars,
};
use std::str::FromStr;

use crate::rules::RuleSets;
use crate::similarity::{RETRY_WINDOW, input_similarity, is_similar};

/// Shortest run of clean tool steps reported as a workflow
pub const MIN_WORKFLOW_STEPS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detector {
    Errors,
    Retries,
    Corrections,
    ToolFailures,
    Workflows,
}

impl FromStr for Detector {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "errors" => Ok(Detector::Errors),
            "retries" => Ok(Detector::Retries),
            "corrections" => Ok(Detector::Corrections),
            "tool_failures" => Ok(Detector::ToolFailures),
            "workflows" => Ok(Detector::Workflows),
            _ => Err(format!("Unknown detector: {}", s)),
        }
    }
}

impl Detector {
    pub fn all() -> Vec<Self> {
        vec![
            Detector::Errors,
            Detector::Retries,
            Detector::Corrections,
            Detector::ToolFailures,
            Detector::Workflows,
        ]
    }
}

/// Run all five detectors over one session.
pub fn detect_patterns(messages: &[NormalizedMessage], rules: &RuleSets) -> SessionPatterns {
    detect_with(messages, rules, &Detector::all())
}

/// Run a chosen subset of detectors. Each pass is independent.
pub fn detect_with(
    messages: &[NormalizedMessage],
    rules: &RuleSets,
    detectors: &[Detector],
) -> SessionPatterns {
    let mut patterns = SessionPatterns::new();

    for detector in detectors {
        match detector {
            Detector::Errors => detect_errors(messages, rules, &mut patterns.errors),
            Detector::Retries => detect_retries(messages, &mut patterns.retries),
            Detector::Corrections => {
                detect_corrections(messages, rules, &mut patterns.corrections)
            }
            Detector::ToolFailures => detect_tool_failures(messages, &mut patterns.tool_failures),
            Detector::Workflows => {
                detect_workflows(messages, rules, &mut patterns.successful_workflows)
            }
        }
    }

    patterns
}

/// A user message has an error when a tool result is flagged or its text
/// matches an error rule. Assistant messages never do.
pub fn message_has_error(message: &NormalizedMessage, rules: &RuleSets) -> bool {
    message.is_user()
        && (message.first_failed_result().is_some() || rules.errors.is_match(&message.text))
}

fn snippet(text: &str) -> String {
    truncate_chars(text, SNIPPET_CHARS)
}

fn detect_errors(messages: &[NormalizedMessage], rules: &RuleSets, out: &mut Vec<ErrorHit>) {
    for msg in messages {
        let hit = if msg.is_user() {
            if let Some(failed) = msg.first_failed_result() {
                Some((ErrorKind::ToolError, Some(failed.tool_use_id.clone()), None))
            } else {
                rules
                    .errors
                    .first_match(&msg.text)
                    .map(|label| (ErrorKind::ErrorPattern, None, Some(label.to_string())))
            }
        } else {
            rules
                .errors
                .first_match(&msg.text)
                .map(|label| (ErrorKind::AssistantErrorMention, None, Some(label.to_string())))
        };

        if let Some((kind, tool_use_id, rule)) = hit {
            out.push(ErrorHit {
                index: msg.index,
                timestamp: msg.timestamp.clone(),
                kind,
                tool_use_id,
                rule,
                snippet: snippet(&msg.text),
            });
        }
    }
}

fn detect_corrections(
    messages: &[NormalizedMessage],
    rules: &RuleSets,
    out: &mut Vec<CorrectionHit>,
) {
    for pair in messages.windows(2) {
        let (prev, msg) = (&pair[0], &pair[1]);
        if !msg.is_user() || !msg.is_plain_text() || !prev.is_assistant() {
            continue;
        }
        if let Some(label) = rules.corrections.first_match(&msg.text) {
            out.push(CorrectionHit {
                index: msg.index,
                timestamp: msg.timestamp.clone(),
                rule: label.to_string(),
                snippet: snippet(&msg.text),
            });
        }
    }
}

fn detect_retries(messages: &[NormalizedMessage], out: &mut Vec<RetryHit>) {
    for (i, msg) in messages.iter().enumerate() {
        if !msg.is_assistant() {
            continue;
        }
        let window_start = i.saturating_sub(RETRY_WINDOW);

        for invocation in &msg.tool_invocations {
            // nearest earlier match wins
            'search: for prev in messages[window_start..i].iter().rev() {
                if !prev.is_assistant() {
                    continue;
                }
                for earlier in prev
                    .tool_invocations
                    .iter()
                    .filter(|t| t.name == invocation.name)
                {
                    let similarity = input_similarity(&invocation.input, &earlier.input);
                    if is_similar(similarity) {
                        out.push(RetryHit {
                            index: msg.index,
                            timestamp: msg.timestamp.clone(),
                            tool: invocation.name.clone(),
                            first_index: prev.index,
                            similarity,
                        });
                        break 'search;
                    }
                }
            }
        }
    }
}

fn detect_tool_failures(messages: &[NormalizedMessage], out: &mut Vec<ToolFailureHit>) {
    for msg in messages.iter().filter(|m| m.is_user()) {
        for failed in msg.failed_results() {
            out.push(ToolFailureHit {
                index: msg.index,
                timestamp: msg.timestamp.clone(),
                tool_use_id: failed.tool_use_id.clone(),
                snippet: snippet(&failed.content),
            });
        }
    }
}

/// Consecutive clean tool steps since the last break
struct RunTracker<'a> {
    messages: &'a [NormalizedMessage],
    start: usize,
    length: usize,
}

impl<'a> RunTracker<'a> {
    fn new(messages: &'a [NormalizedMessage]) -> Self {
        Self {
            messages,
            start: 0,
            length: 0,
        }
    }

    fn step(&mut self, at: usize) {
        if self.length == 0 {
            self.start = at;
        }
        self.length += 1;
    }

    /// Close the run at `end`, emitting a hit when it was long enough.
    fn close(&mut self, end: usize, positive_feedback: Option<bool>) -> Option<WorkflowHit> {
        let length = std::mem::take(&mut self.length);
        if length < MIN_WORKFLOW_STEPS {
            return None;
        }
        Some(WorkflowHit {
            start_index: MessageIndex::new(self.start),
            end_index: MessageIndex::new(end),
            length,
            timestamp: self.messages[self.start].timestamp.clone(),
            positive_feedback,
        })
    }
}

fn detect_workflows(messages: &[NormalizedMessage], rules: &RuleSets, out: &mut Vec<WorkflowHit>) {
    let mut run = RunTracker::new(messages);

    for (i, msg) in messages.iter().enumerate() {
        if msg.is_assistant() && msg.has_tool_invocations() {
            match messages.get(i + 1) {
                Some(next) if next.is_user() && !message_has_error(next, rules) => run.step(i),
                _ => out.extend(run.close(i, None)),
            }
        } else if msg.is_user() && msg.is_plain_text() {
            let positive = rules.positive.is_match(&msg.text);
            out.extend(run.close(i, Some(positive)));
        }
    }

    if let Some(last) = messages.len().checked_sub(1) {
        out.extend(run.close(last, None));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::SessionBuilder;
    use forgescan_types::PatternCounts;
    use serde_json::json;

    fn detect(messages: &[NormalizedMessage]) -> SessionPatterns {
        detect_patterns(messages, &RuleSets::default())
    }

    #[test]
    fn test_detector_from_str() {
        assert_eq!("tool_failures".parse::<Detector>(), Ok(Detector::ToolFailures));
        assert!("loops".parse::<Detector>().is_err());
        assert_eq!(Detector::all().len(), 5);
    }

    #[test]
    fn test_single_flagged_result_is_one_error_and_one_failure() {
        let messages = SessionBuilder::new()
            .tool_call("Bash", json!({"command": "make"}))
            .tool_err("make: *** [all] Error 2")
            .build();

        let patterns = detect(&messages);
        assert_eq!(
            patterns.counts(),
            PatternCounts {
                errors: 1,
                tool_failures: 1,
                ..Default::default()
            }
        );
        let error = &patterns.errors[0];
        assert_eq!(error.kind, ErrorKind::ToolError);
        assert_eq!(error.tool_use_id.as_deref(), Some("toolu_0"));
        assert_eq!(error.index, MessageIndex::new(1));
        assert_eq!(patterns.tool_failures[0].tool_use_id, "toolu_0");
    }

    #[test]
    fn test_error_subtypes() {
        let messages = SessionBuilder::new()
            .user("I get `panic: index out of range` when I run it")
            .assistant("That Error: comes from the parser")
            .user("thanks")
            .build();

        let patterns = detect(&messages);
        let kinds: Vec<_> = patterns.errors.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![ErrorKind::ErrorPattern, ErrorKind::AssistantErrorMention]
        );
        assert_eq!(patterns.errors[0].rule.as_deref(), Some("panic"));
        assert_eq!(patterns.errors[1].rule.as_deref(), Some("error_prefix"));
        assert!(patterns.tool_failures.is_empty());
    }

    #[test]
    fn test_flagged_result_stops_at_first_but_failures_list_all() {
        let mut messages = SessionBuilder::new()
            .tool_call("Bash", json!({"command": "a"}))
            .tool_err("first")
            .build();
        let extra = messages[1].tool_results[0].clone();
        messages[1].tool_results.push(forgescan_types::ToolResult {
            tool_use_id: "toolu_x".to_string(),
            content: "second".to_string(),
            ..extra
        });

        let patterns = detect(&messages);
        assert_eq!(patterns.errors.len(), 1);
        assert_eq!(patterns.tool_failures.len(), 2);
        assert_eq!(patterns.tool_failures[1].snippet, "second");
    }

    #[test]
    fn test_snippets_are_truncated() {
        let long = format!("Error: {}", "x".repeat(500));
        let messages = SessionBuilder::new().user(&long).build();
        let patterns = detect(&messages);
        assert_eq!(patterns.errors[0].snippet.chars().count(), SNIPPET_CHARS);
    }

    #[test]
    fn test_correction_requires_preceding_assistant() {
        let messages = SessionBuilder::new()
            .assistant("I renamed the module")
            .user("no, that's wrong")
            .user("actually, try again")
            .build();

        let patterns = detect(&messages);
        assert_eq!(patterns.corrections.len(), 1);
        assert_eq!(patterns.corrections[0].index, MessageIndex::new(1));
        assert_eq!(patterns.corrections[0].rule, "no");
    }

    #[test]
    fn test_correction_ignores_tool_result_messages() {
        let messages = SessionBuilder::new()
            .tool_call("Read", json!({"path": "a"}))
            .tool_ok("you should be using the other API instead")
            .build();
        assert!(detect(&messages).corrections.is_empty());
    }

    #[test]
    fn test_correction_on_first_message_is_ignored() {
        let messages = SessionBuilder::new().user("wrong, wait, stop").build();
        assert!(detect(&messages).corrections.is_empty());
    }

    #[test]
    fn test_retry_threshold_is_strict() {
        // string inputs serialize with surrounding quotes, which count too
        let below = SessionBuilder::new()
            .tool_call("Bash", json!("abc"))
            .tool_ok("ok")
            .tool_call("Bash", json!("abcdefg"))
            .build();
        // {", a, b, c} vs {", a..g}: 4 / 8 = 0.5
        assert!(detect(&below).retries.is_empty());

        // {", a, b} vs {", a, b, c, d}: 3 / 5 = 0.6, not above the threshold
        let at_threshold = SessionBuilder::new()
            .tool_call("Bash", json!("ab"))
            .tool_call("Bash", json!("abcd"))
            .build();
        assert!(detect(&at_threshold).retries.is_empty());

        // {", '0'..'G'} vs {", '0'..'W'}: 25 / 41, just above the threshold
        let base: String = ('0'..'H').collect();
        let wider: String = ('0'..'X').collect();
        let above = SessionBuilder::new()
            .tool_call("Bash", json!(base))
            .tool_call("Bash", json!(wider))
            .build();
        let retries = detect(&above).retries;
        assert_eq!(retries.len(), 1);
        assert_eq!(retries[0].index, MessageIndex::new(1));
        assert_eq!(retries[0].first_index, MessageIndex::new(0));
    }

    #[test]
    fn test_retry_counts_key_separators() {
        // `{"a": "b c"}` vs `{"a": "d"}` share braces, quotes, `a`, `:` and the space
        let messages = SessionBuilder::new()
            .tool_call("Bash", json!({"a": "b c"}))
            .tool_call("Bash", json!({"a": "d"}))
            .build();
        let retries = detect(&messages).retries;
        assert_eq!(retries.len(), 1);
        assert!((retries[0].similarity - 6.0 / 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_non_ascii_inputs_compare_as_escapes() {
        // both escape to `"\u4e..."`, so only the trailing hex digits differ
        let messages = SessionBuilder::new()
            .tool_call("Write", json!("\u{4E00}"))
            .tool_call("Write", json!("\u{4E8C}"))
            .build();
        assert_eq!(detect(&messages).retries.len(), 1);
    }

    #[test]
    fn test_retry_window_is_five_messages() {
        let input = json!({"command": "cargo test -p widgets"});

        let inside = SessionBuilder::new()
            .tool_call("Bash", input.clone())
            .user("hm")
            .assistant("one sec")
            .user("ok")
            .assistant("trying")
            .tool_call("Bash", input.clone())
            .build();
        let retries = detect(&inside).retries;
        assert_eq!(retries.len(), 1);
        assert_eq!(retries[0].first_index, MessageIndex::new(0));
        assert_eq!(retries[0].similarity, 1.0);

        let outside = SessionBuilder::new()
            .tool_call("Bash", input.clone())
            .user("hm")
            .assistant("one sec")
            .user("ok")
            .assistant("trying")
            .user("go on")
            .tool_call("Bash", input)
            .build();
        assert!(detect(&outside).retries.is_empty());
    }

    #[test]
    fn test_retry_needs_same_tool_name_and_prefers_nearest() {
        let input = json!({"pattern": "fn main"});
        let messages = SessionBuilder::new()
            .tool_call("Grep", input.clone())
            .tool_call("Grep", input.clone())
            .tool_call("Glob", input.clone())
            .tool_call("Grep", input)
            .build();

        let retries = detect(&messages).retries;
        let pairs: Vec<_> = retries
            .iter()
            .map(|r| (r.index.get(), r.first_index.get()))
            .collect();
        assert_eq!(pairs, vec![(1, 0), (3, 1)]);
    }

    #[test]
    fn test_workflow_of_three_steps() {
        let messages = SessionBuilder::new()
            .user("refactor the loader")
            .clean_steps(3)
            .user("perfect, thanks")
            .build();

        let workflows = detect(&messages).successful_workflows;
        assert_eq!(workflows.len(), 1);
        let wf = &workflows[0];
        assert_eq!(wf.length, 3);
        assert_eq!(wf.start_index, MessageIndex::new(1));
        assert_eq!(wf.end_index, MessageIndex::new(7));
        assert_eq!(wf.positive_feedback, Some(true));
        assert_eq!(wf.timestamp, messages[1].timestamp);
    }

    #[test]
    fn test_workflow_of_two_steps_is_not_reported() {
        let messages = SessionBuilder::new()
            .clean_steps(2)
            .user("looks good")
            .build();
        assert!(detect(&messages).successful_workflows.is_empty());
    }

    #[test]
    fn test_trailing_workflow_is_reported_without_feedback() {
        let messages = SessionBuilder::new().clean_steps(4).build();
        let workflows = detect(&messages).successful_workflows;
        assert_eq!(workflows.len(), 1);
        assert_eq!(workflows[0].length, 4);
        assert_eq!(workflows[0].end_index, MessageIndex::new(7));
        assert_eq!(workflows[0].positive_feedback, None);
    }

    #[test]
    fn test_error_breaks_the_run() {
        let messages = SessionBuilder::new()
            .clean_steps(3)
            .tool_call("Bash", json!({"command": "cargo build"}))
            .tool_err("error[E0308]: mismatched types")
            .clean_steps(2)
            .user("hmm, not great")
            .build();

        let workflows = detect(&messages).successful_workflows;
        assert_eq!(workflows.len(), 1);
        assert_eq!(workflows[0].start_index, MessageIndex::new(0));
        assert_eq!(workflows[0].end_index, MessageIndex::new(6));
        assert_eq!(workflows[0].positive_feedback, None);
    }

    #[test]
    fn test_negative_close_records_no_positive_feedback() {
        let messages = SessionBuilder::new()
            .clean_steps(3)
            .user("why did you touch the lockfile")
            .build();
        let workflows = detect(&messages).successful_workflows;
        assert_eq!(workflows[0].positive_feedback, Some(false));
    }

    #[test]
    fn test_detect_with_subset() {
        let messages = SessionBuilder::new()
            .tool_call("Bash", json!({"command": "ls"}))
            .tool_err("ls: cannot access 'x'")
            .build();
        let patterns = detect_with(&messages, &RuleSets::default(), &[Detector::ToolFailures]);
        assert!(patterns.errors.is_empty());
        assert_eq!(patterns.tool_failures.len(), 1);
    }

    #[test]
    fn test_empty_session_yields_nothing() {
        assert!(detect(&[]).is_empty());
    }

    #[test]
    fn test_has_error_predicate() {
        let rules = RuleSets::default();
        let messages = SessionBuilder::new()
            .assistant("Error: in my last edit")
            .user("bash: permission denied")
            .user("all good")
            .build();
        assert!(!message_has_error(&messages[0], &rules));
        assert!(message_has_error(&messages[1], &rules));
        assert!(!message_has_error(&messages[2], &rules));
    }
}
