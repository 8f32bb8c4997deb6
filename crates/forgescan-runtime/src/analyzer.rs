use forgescan_engine::{RuleSets, SessionAnalysis, analyze_session};
use forgescan_types::{NormalizedMessage, ScoreWeights};

use crate::Result;
use crate::config::{Config, Limits};

/// Compiled detection policy shared by every session of one run
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    rules: RuleSets,
    weights: ScoreWeights,
    limits: Limits,
}

impl Analyzer {
    pub fn new(rules: RuleSets, weights: ScoreWeights, limits: Limits) -> Self {
        Self {
            rules,
            weights,
            limits,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            RuleSets::from_config(&config.rules)?,
            config.weights,
            config.limits,
        ))
    }

    pub fn analyze(&self, messages: &[NormalizedMessage]) -> SessionAnalysis {
        analyze_session(messages, &self.rules, &self.weights)
    }

    pub fn rules(&self) -> &RuleSets {
        &self.rules
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }
}
