use crate::output::print_json;
use anyhow::Result;
use forgescan_providers::Corpus;
use forgescan_runtime::list_projects;

pub fn handle_list(corpus: &Corpus) -> Result<()> {
    let list = list_projects(corpus)?;
    print_json(&list)
}
