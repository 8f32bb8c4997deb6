use forgescan_engine::{Excerpt, extract_excerpts};
use forgescan_providers::{Corpus, load_session_records, normalize_session};
use forgescan_types::PatternCounts;
use serde::Serialize;

use crate::analyzer::Analyzer;
use crate::{Error, Result};

#[derive(Debug, Clone, Serialize)]
pub struct ExtractReport {
    pub session_id: String,
    /// Project directory the session file was found in
    pub project_dir: String,
    pub total_messages: usize,
    pub excerpts_count: usize,
    pub pattern_summary: PatternCounts,
    pub excerpts: Vec<Excerpt>,
}

/// Excerpts around every pattern hit of one session.
///
/// The session is looked up under `project` first, then across all projects.
pub fn extract(
    corpus: &Corpus,
    session_id: &str,
    project: &str,
    radius: usize,
    analyzer: &Analyzer,
) -> Result<ExtractReport> {
    if !corpus.root().is_dir() {
        return Err(Error::CorpusNotFound(corpus.root().to_path_buf()));
    }
    let file = corpus
        .find_session(project, session_id)
        .ok_or_else(|| Error::SessionNotFound(session_id.to_string()))?;
    if file.project_dir != project {
        tracing::info!(requested = project, found = %file.project_dir, "session found in another project");
    }

    let messages = normalize_session(&load_session_records(&file.path));
    let analysis = analyzer.analyze(&messages);
    let excerpts = extract_excerpts(&messages, &analysis.patterns, radius, analyzer.rules());

    Ok(ExtractReport {
        session_id: file.session_id,
        project_dir: file.project_dir,
        total_messages: messages.len(),
        excerpts_count: excerpts.len(),
        pattern_summary: analysis.counts,
        excerpts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use forgescan_testing::{TestWorld, records};
    use serde_json::json;

    fn world() -> TestWorld {
        TestWorld::new()
            .with_project("-home-dev-empty")
            .with_session(
                "-home-dev-app",
                "sess-1",
                &[
                    records::user_text("run the tests", "2025-03-01T09:00:00Z"),
                    records::assistant_tool_use(
                        "toolu_1",
                        "Bash",
                        json!({"command": "cargo test"}),
                        "2025-03-01T09:00:02Z",
                    ),
                    records::user_tool_result(
                        "toolu_1",
                        "test result: FAILED. 0 passed; 2 failed",
                        true,
                        "2025-03-01T09:00:09Z",
                    ),
                    records::assistant_text("Two tests fail.", "2025-03-01T09:00:12Z"),
                ],
            )
    }

    #[test]
    fn test_extract_direct_lookup() {
        let world = world();
        let report = extract(
            &world.corpus(),
            "sess-1",
            "-home-dev-app",
            1,
            &Analyzer::default(),
        )
        .unwrap();

        assert_eq!(report.project_dir, "-home-dev-app");
        assert_eq!(report.total_messages, 4);
        assert_eq!(report.pattern_summary.errors, 1);
        assert_eq!(report.pattern_summary.tool_failures, 1);
        let indices: Vec<_> = report.excerpts.iter().map(|e| e.index.get()).collect();
        assert_eq!(indices, vec![1, 2, 3]);
        assert_eq!(report.excerpts_count, 3);
    }

    #[test]
    fn test_extract_falls_back_to_other_projects() {
        let world = world();
        let report = extract(
            &world.corpus(),
            "sess-1",
            "-home-dev-empty",
            3,
            &Analyzer::default(),
        )
        .unwrap();
        assert_eq!(report.project_dir, "-home-dev-app");
        assert_eq!(report.excerpts_count, 4);
    }

    #[test]
    fn test_extract_unknown_session() {
        let world = world();
        let err = extract(&world.corpus(), "nope", "-home-dev-app", 3, &Analyzer::default())
            .unwrap_err();
        assert!(matches!(err, Error::SessionNotFound(ref id) if id == "nope"));
    }
}
