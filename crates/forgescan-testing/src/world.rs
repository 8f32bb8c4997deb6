//! TestWorld pattern for declarative integration test setup.
//!
//! Provides a fluent interface for:
//! - Creating an isolated session corpus
//! - Writing project directories, session files and a config file
//! - Executing CLI commands pointed at that corpus

use anyhow::Result;
use assert_cmd::Command;
use forgescan_providers::Corpus;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Declarative test environment builder.
///
/// # Example
/// ```no_run
/// use forgescan_testing::{TestWorld, records};
///
/// let world = TestWorld::new().with_session(
///     "-home-dev-app",
///     "session-1",
///     &[records::user_text("hello", "2025-03-01T09:00:00Z")],
/// );
///
/// let result = world.run(&["list-projects"]).unwrap();
/// assert!(result.success());
/// ```
pub struct TestWorld {
    temp_dir: TempDir,
    corpus_root: PathBuf,
    config_path: PathBuf,
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorld {
    /// Create a new isolated test environment with an empty corpus.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let corpus_root = temp_dir.path().join(".claude").join("projects");
        let config_path = temp_dir.path().join("config.toml");

        std::fs::create_dir_all(&corpus_root).expect("Failed to create corpus dir");

        Self {
            temp_dir,
            corpus_root,
            config_path,
        }
    }

    /// Get the corpus root (the directory holding project directories).
    pub fn corpus_root(&self) -> &Path {
        &self.corpus_root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Get the temp directory root.
    pub fn temp_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn corpus(&self) -> Corpus {
        Corpus::new(&self.corpus_root)
    }

    /// Create an (empty) project directory.
    pub fn with_project(self, encoded_name: &str) -> Self {
        std::fs::create_dir_all(self.corpus_root.join(encoded_name))
            .expect("Failed to create project dir");
        self
    }

    /// Write a session file, one line per record.
    pub fn with_session(self, project: &str, session_id: &str, lines: &[String]) -> Self {
        let mut body = lines.join("\n");
        body.push('\n');
        self.with_raw_session(project, session_id, body.as_bytes())
    }

    /// Write a session file with arbitrary bytes.
    pub fn with_raw_session(self, project: &str, session_id: &str, bytes: &[u8]) -> Self {
        let dir = self.corpus_root.join(project);
        std::fs::create_dir_all(&dir).expect("Failed to create project dir");
        std::fs::write(dir.join(format!("{session_id}.jsonl")), bytes)
            .expect("Failed to write session file");
        self
    }

    /// Write the config file passed to the CLI.
    pub fn with_config(self, toml: &str) -> Self {
        std::fs::write(&self.config_path, toml).expect("Failed to write config");
        self
    }

    /// Configure a CLI command with this test environment's settings.
    ///
    /// The caller must provide the base command (e.g., from `cargo_bin_cmd!("forgescan")`).
    pub fn configure_command<'a>(&self, cmd: &'a mut Command) -> &'a mut Command {
        cmd.arg("--corpus")
            .arg(&self.corpus_root)
            .arg("--config")
            .arg(&self.config_path);

        cmd.current_dir(self.temp_dir.path());
        cmd.env_remove("RUST_LOG");

        cmd
    }

    /// Execute a command using the project's binary and return the result.
    ///
    /// Relies on the `CARGO_BIN_EXE_` environment variable, which cargo sets
    /// for integration tests of the binary's own package.
    #[allow(deprecated)]
    pub fn run(&self, args: &[&str]) -> Result<CliResult> {
        let mut cmd = Command::cargo_bin("forgescan")
            .map_err(|e| anyhow::anyhow!("Failed to find forgescan binary: {}", e))?;

        self.configure_command(&mut cmd);
        cmd.args(args);

        let output = cmd.output()?;

        Ok(CliResult {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

/// Result of a CLI command execution.
#[derive(Debug)]
pub struct CliResult {
    pub status: std::process::ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl CliResult {
    /// Check if the command succeeded.
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// Parse stdout as JSON.
    pub fn json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::from_str(&self.stdout)?)
    }

    pub fn code(&self) -> Option<i32> {
        self.status.code()
    }
}
