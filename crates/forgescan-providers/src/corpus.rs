//! Corpus layout: one directory per project, one `*.jsonl` file per session.

use crate::{Error, Result};
use std::path::{MAIN_SEPARATOR, MAIN_SEPARATOR_STR, Path, PathBuf};
use walkdir::WalkDir;

const SESSION_EXTENSION: &str = "jsonl";

/// Decode a project directory name back into the path it was derived from.
///
/// Encoding replaces `:\` with `--` and path separators with `-`, so the
/// decoding is lossy (hyphens in folder names come back as separators). Good
/// enough for display and filtering.
pub fn decode_project_name(encoded: &str) -> String {
    encoded
        .replace("--", &format!(":{}", MAIN_SEPARATOR))
        .replace('-', MAIN_SEPARATOR_STR)
}

/// Root of a session corpus
#[derive(Debug, Clone)]
pub struct Corpus {
    root: PathBuf,
}

/// One project directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDir {
    pub encoded_name: String,
    pub decoded_path: String,
    pub path: PathBuf,
}

/// One session record file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionFile {
    pub session_id: String,
    pub project_dir: String,
    pub path: PathBuf,
}

impl Corpus {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Open a corpus, failing when the root directory is missing.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let corpus = Self::new(root);
        if !corpus.root.is_dir() {
            return Err(Error::CorpusNotFound(corpus.root));
        }
        Ok(corpus)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Project directories, sorted by name.
    pub fn projects(&self) -> Result<Vec<ProjectDir>> {
        if !self.root.is_dir() {
            return Err(Error::CorpusNotFound(self.root.clone()));
        }

        let mut projects = Vec::new();
        for entry in WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(e) => e,
                Err(err) => {
                    tracing::debug!(error = %err, "skipping unreadable corpus entry");
                    continue;
                }
            };
            if !entry.file_type().is_dir() {
                continue;
            }
            let encoded_name = entry.file_name().to_string_lossy().to_string();
            projects.push(ProjectDir {
                decoded_path: decode_project_name(&encoded_name),
                encoded_name,
                path: entry.into_path(),
            });
        }
        Ok(projects)
    }

    /// Locate a session file, first under `project`, then across all projects.
    pub fn find_session(&self, project: &str, session_id: &str) -> Option<SessionFile> {
        let file_name = format!("{}.{}", session_id, SESSION_EXTENSION);

        let direct = self.root.join(project).join(&file_name);
        if direct.is_file() {
            return Some(SessionFile {
                session_id: session_id.to_string(),
                project_dir: project.to_string(),
                path: direct,
            });
        }

        let projects = self.projects().ok()?;
        projects.into_iter().find_map(|p| {
            let candidate = p.path.join(&file_name);
            candidate.is_file().then(|| SessionFile {
                session_id: session_id.to_string(),
                project_dir: p.encoded_name,
                path: candidate,
            })
        })
    }
}

impl ProjectDir {
    /// Session files directly inside this project, sorted by name.
    pub fn sessions(&self) -> Vec<SessionFile> {
        let mut sessions = Vec::new();
        for entry in WalkDir::new(&self.path)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !entry.file_type().is_file()
                || path.extension().is_none_or(|e| e != SESSION_EXTENSION)
            {
                continue;
            }
            let Some(stem) = path.file_stem() else {
                continue;
            };
            sessions.push(SessionFile {
                session_id: stem.to_string_lossy().to_string(),
                project_dir: self.encoded_name.clone(),
                path: path.to_path_buf(),
            });
        }
        sessions
    }
}

/// Case-insensitive substring filter over raw and decoded project names
#[derive(Debug, Clone)]
pub struct ProjectFilter {
    needle: String,
}

impl ProjectFilter {
    pub fn new(pattern: &str) -> Self {
        Self {
            needle: pattern.to_lowercase(),
        }
    }

    pub fn matches(&self, project: &ProjectDir) -> bool {
        project.encoded_name.to_lowercase().contains(&self.needle)
            || project.decoded_path.to_lowercase().contains(&self.needle)
    }
}
