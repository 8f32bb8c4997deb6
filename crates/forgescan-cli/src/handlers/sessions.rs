use crate::output::print_json;
use anyhow::Result;
use forgescan_providers::{Corpus, ProjectFilter};
use forgescan_runtime::list_sessions;

pub fn handle_list(corpus: &Corpus, project_filter: &str) -> Result<()> {
    let list = list_sessions(corpus, &ProjectFilter::new(project_filter))?;
    tracing::debug!(filter = project_filter, sessions = list.total, "listed sessions");
    print_json(&list)
}
