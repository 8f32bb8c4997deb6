use crate::Result;
use crate::filter::first_timestamp;
use forgescan_providers::{
    Corpus, ProjectFilter, count_lines, display_text, load_session_records,
};
use forgescan_types::{RawRecord, RawTimestamp, RecordKind, truncate_chars};
use serde::Serialize;

/// Maximum length of the first-message preview
pub const FIRST_MESSAGE_CHARS: usize = 100;

#[derive(Debug, Clone, Serialize)]
pub struct ProjectSummary {
    pub encoded_name: String,
    pub decoded_path: String,
    pub session_count: usize,
    pub total_lines: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectList {
    pub projects: Vec<ProjectSummary>,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub project_dir: String,
    pub decoded_project: String,
    pub message_count: usize,
    pub first_message: String,
    pub timestamp: Option<RawTimestamp>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionList {
    pub sessions: Vec<SessionSummary>,
    pub total: usize,
}

/// Display text of the first user record, truncated for previews.
pub fn first_user_message(records: &[RawRecord]) -> String {
    records
        .iter()
        .find(|r| r.kind == RecordKind::User)
        .map(|r| truncate_chars(&display_text(r), FIRST_MESSAGE_CHARS))
        .unwrap_or_default()
}

pub fn list_projects(corpus: &Corpus) -> Result<ProjectList> {
    let mut projects = Vec::new();
    for project in corpus.projects()? {
        let sessions = project.sessions();
        let total_lines = sessions.iter().map(|s| count_lines(&s.path)).sum();
        projects.push(ProjectSummary {
            session_count: sessions.len(),
            total_lines,
            encoded_name: project.encoded_name,
            decoded_path: project.decoded_path,
        });
    }

    let total = projects.len();
    Ok(ProjectList { projects, total })
}

pub fn list_sessions(corpus: &Corpus, filter: &ProjectFilter) -> Result<SessionList> {
    let mut sessions = Vec::new();
    for project in corpus.projects()?.iter().filter(|p| filter.matches(p)) {
        for file in project.sessions() {
            let records = load_session_records(&file.path);
            let message_count = records
                .iter()
                .filter(|r| matches!(r.kind, RecordKind::User | RecordKind::Assistant))
                .count();
            sessions.push(SessionSummary {
                first_message: first_user_message(&records),
                timestamp: first_timestamp(&records).cloned(),
                message_count,
                session_id: file.session_id,
                project_dir: file.project_dir,
                decoded_project: project.decoded_path.clone(),
            });
        }
    }

    let total = sessions.len();
    Ok(SessionList { sessions, total })
}

#[cfg(test)]
mod tests {
    use super::*;
    use forgescan_testing::{TestWorld, records};

    #[test]
    fn test_list_projects_counts_sessions_and_lines() {
        let world = TestWorld::new()
            .with_project("-home-dev-alpha")
            .with_session(
                "-home-dev-alpha",
                "s1",
                &[records::user_text("hello", "2025-03-01T09:00:00Z"), "garbage".to_string()],
            )
            .with_session(
                "-home-dev-alpha",
                "s2",
                &[records::user_text("again", "2025-03-02T09:00:00Z")],
            )
            .with_project("-home-dev-beta");

        let list = list_projects(&world.corpus()).unwrap();
        assert_eq!(list.total, 2);
        assert_eq!(list.projects[0].encoded_name, "-home-dev-alpha");
        assert_eq!(list.projects[0].session_count, 2);
        assert_eq!(list.projects[0].total_lines, 3);
        assert_eq!(list.projects[1].session_count, 0);
        assert_eq!(list.projects[1].total_lines, 0);
    }

    #[test]
    fn test_list_sessions_filters_and_summarizes() {
        let world = TestWorld::new()
            .with_session(
                "-home-dev-WebApp",
                "abc",
                &[
                    records::summary("Refactor"),
                    records::user_text(
                        &format!("Please {}", "refactor ".repeat(30)),
                        "2025-03-01T09:00:00Z",
                    ),
                    records::assistant_text("Sure", "2025-03-01T09:00:05Z"),
                ],
            )
            .with_session(
                "-home-dev-other",
                "zzz",
                &[records::user_text("hi", "2025-03-01T09:00:00Z")],
            );

        let list = list_sessions(&world.corpus(), &ProjectFilter::new("webapp")).unwrap();
        assert_eq!(list.total, 1);
        let session = &list.sessions[0];
        assert_eq!(session.session_id, "abc");
        assert_eq!(session.project_dir, "-home-dev-WebApp");
        assert_eq!(session.message_count, 2);
        assert_eq!(session.first_message.chars().count(), FIRST_MESSAGE_CHARS);
        assert!(session.first_message.starts_with("Please refactor"));
        assert_eq!(
            session.timestamp,
            Some(RawTimestamp::Text("2025-03-01T09:00:00Z".to_string()))
        );
    }

    #[test]
    fn test_missing_corpus_is_an_error() {
        let world = TestWorld::new();
        let corpus = Corpus::new(world.temp_dir().join("missing"));
        assert!(matches!(
            list_projects(&corpus),
            Err(crate::Error::CorpusNotFound(_))
        ));
    }
}
