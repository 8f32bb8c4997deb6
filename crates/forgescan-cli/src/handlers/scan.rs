use crate::output::print_json;
use anyhow::Result;
use forgescan_providers::Corpus;
use forgescan_runtime::{Analyzer, Config, DateRange, ScanOptions, scan};

pub fn handle(
    corpus: &Corpus,
    config: &Config,
    project: Option<String>,
    after: Option<String>,
    before: Option<String>,
) -> Result<()> {
    let options = ScanOptions {
        project_filter: project,
        dates: DateRange::parse(after.as_deref(), before.as_deref())?,
    };
    let analyzer = Analyzer::from_config(config)?;

    let report = scan(corpus, &options, &analyzer)?;
    print_json(&report)
}
