//! Lexical rule sets used by the detectors.
//!
//! The detection vocabulary is data: each rule is a labelled regular
//! expression, matched case-insensitively. Built-in sets cover common error
//! output, user corrections and positive feedback; configuration can extend
//! or replace them.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::{Error, Result};

/// A labelled pattern as written in configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSpec {
    pub label: String,
    pub pattern: String,
}

impl RuleSpec {
    pub fn new(label: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            pattern: pattern.into(),
        }
    }
}

/// A compiled rule
#[derive(Debug, Clone)]
pub struct Rule {
    label: String,
    regex: Regex,
}

impl Rule {
    pub fn compile(spec: &RuleSpec) -> Result<Self> {
        let regex = RegexBuilder::new(&spec.pattern)
            .case_insensitive(true)
            .build()
            .map_err(|source| Error::InvalidRule {
                label: spec.label.clone(),
                source,
            })?;
        Ok(Self {
            label: spec.label.clone(),
            regex,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

/// Ordered list of rules; the first matching rule wins
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn compile(specs: &[RuleSpec]) -> Result<Self> {
        let rules = specs.iter().map(Rule::compile).collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    /// Label of the first rule matching `text`.
    pub fn first_match(&self, text: &str) -> Option<&str> {
        self.rules
            .iter()
            .find(|r| r.is_match(text))
            .map(|r| r.label())
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.first_match(text).is_some()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.label()).collect()
    }

    fn append(&mut self, other: RuleSet) {
        self.rules.extend(other.rules);
    }
}

/// User-supplied rule customisation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleConfig {
    /// Drop the built-in rules instead of appending to them
    pub replace_defaults: bool,
    pub error: Vec<RuleSpec>,
    pub correction: Vec<RuleSpec>,
    pub positive: Vec<RuleSpec>,
}

/// The three rule sets the detectors consult
#[derive(Debug, Clone)]
pub struct RuleSets {
    /// Error output ("Error:", "Traceback (", "panic:", ...)
    pub errors: RuleSet,
    /// User pushing back on the assistant ("no,", "wrong", "try again", ...)
    pub corrections: RuleSet,
    /// User approval closing a workflow ("perfect", "looks good", ...)
    pub positive: RuleSet,
}

static BUILTIN: LazyLock<RuleSets> = LazyLock::new(|| RuleSets {
    errors: RuleSet::compile(&builtin_error_rules()).expect("built-in error rules compile"),
    corrections: RuleSet::compile(&builtin_correction_rules())
        .expect("built-in correction rules compile"),
    positive: RuleSet::compile(&builtin_positive_rules())
        .expect("built-in positive rules compile"),
});

impl Default for RuleSets {
    fn default() -> Self {
        BUILTIN.clone()
    }
}

impl RuleSets {
    /// Built-in rules extended (or replaced) by `config`.
    pub fn from_config(config: &RuleConfig) -> Result<Self> {
        let mut sets = if config.replace_defaults {
            RuleSets {
                errors: RuleSet::default(),
                corrections: RuleSet::default(),
                positive: RuleSet::default(),
            }
        } else {
            RuleSets::default()
        };
        sets.errors.append(RuleSet::compile(&config.error)?);
        sets.corrections.append(RuleSet::compile(&config.correction)?);
        sets.positive.append(RuleSet::compile(&config.positive)?);
        Ok(sets)
    }
}

fn specs(pairs: &[(&str, &str)]) -> Vec<RuleSpec> {
    pairs
        .iter()
        .map(|(label, pattern)| RuleSpec::new(*label, *pattern))
        .collect()
}

pub fn builtin_error_rules() -> Vec<RuleSpec> {
    specs(&[
        ("error_prefix", r"Error:"),
        ("failed_prefix", r"Failed:"),
        ("exception", r"Exception:"),
        ("python_traceback", r"Traceback \("),
        ("failed_marker", r"FAILED"),
        ("rustc_error", r"error\["),
        ("npm_err", r"ERR!"),
        ("fatal", r"FATAL"),
        ("panic", r"panic:"),
        ("cannot_find", r"cannot find"),
        ("could_not", r"could not"),
        ("not_found", r"not found"),
        ("permission_denied", r"permission denied"),
    ])
}

// Entries ending in punctuation only anchor on the left: `\bno,\b` would
// demand a word character straight after the comma.
pub fn builtin_correction_rules() -> Vec<RuleSpec> {
    specs(&[
        ("no", r"\bno,"),
        ("dont", r"\bdon'?t\b"),
        ("instead", r"\binstead\b"),
        ("wrong", r"\bwrong\b"),
        ("actually", r"\bactually\b"),
        ("not_that", r"\bnot that\b"),
        ("wait", r"\bwait,"),
        ("stop", r"\bstop\b"),
        ("thats_not", r"\bthat'?s not\b"),
        ("i_meant", r"\bi mean(t)?\b"),
        ("should_be", r"\bshould be\b"),
        ("try_again", r"\btry again\b"),
    ])
}

pub fn builtin_positive_rules() -> Vec<RuleSpec> {
    specs(&[
        ("perfect", r"\bperfect\b"),
        ("great", r"\bgreat\b"),
        ("works", r"\bworks\b"),
        ("nice", r"\bnice\b"),
        ("thanks", r"\bthanks\b"),
        ("awesome", r"\bawesome\b"),
        ("exactly", r"\bexactly\b"),
        ("good_job", r"\bgood job\b"),
        ("thats_it", r"\bthat'?s it\b"),
        ("looks_good", r"\blooks good\b"),
        ("well_done", r"\bwell done\b"),
    ])
}
