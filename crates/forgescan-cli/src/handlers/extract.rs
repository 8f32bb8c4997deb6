use crate::output::print_json;
use anyhow::Result;
use forgescan_providers::Corpus;
use forgescan_runtime::{Analyzer, Config, extract};

pub fn handle(
    corpus: &Corpus,
    config: &Config,
    session_id: &str,
    project_dir: &str,
    context: Option<usize>,
) -> Result<()> {
    let analyzer = Analyzer::from_config(config)?;
    let radius = context.unwrap_or(config.limits.context_radius);

    let report = extract(corpus, session_id, project_dir, radius, &analyzer)?;
    print_json(&report)
}
