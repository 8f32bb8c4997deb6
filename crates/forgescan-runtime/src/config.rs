use crate::{Error, Result};
use forgescan_engine::RuleConfig;
use forgescan_types::ScoreWeights;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "FORGESCAN_CONFIG";
pub const CORPUS_ENV: &str = "FORGESCAN_CORPUS";

/// Resolve the configuration file path based on priority:
/// 1. Explicit path (with tilde expansion)
/// 2. FORGESCAN_CONFIG environment variable (with tilde expansion)
/// 3. `<config_dir>/forgescan/config.toml`
/// 4. `~/.config/forgescan/config.toml`
pub fn resolve_config_path(explicit_path: Option<&str>) -> Result<PathBuf> {
    if let Some(path) = explicit_path {
        return Ok(expand_tilde(path));
    }

    if let Ok(env_path) = std::env::var(CONFIG_ENV) {
        return Ok(expand_tilde(&env_path));
    }

    if let Some(config_dir) = dirs::config_dir() {
        return Ok(config_dir.join("forgescan").join("config.toml"));
    }

    if let Some(home) = std::env::var_os("HOME") {
        return Ok(PathBuf::from(home)
            .join(".config")
            .join("forgescan")
            .join("config.toml"));
    }

    Err(Error::Config(
        "Could not determine config path: no HOME directory or config directory found"
            .to_string(),
    ))
}

/// Resolve the session corpus root based on priority:
/// 1. Explicit path (the `--corpus` flag)
/// 2. FORGESCAN_CORPUS environment variable
/// 3. `corpus_root` from the configuration file
/// 4. `~/.claude/projects`
pub fn resolve_corpus_root(explicit_path: Option<&str>, configured: Option<&str>) -> Result<PathBuf> {
    if let Some(path) = explicit_path {
        return Ok(expand_tilde(path));
    }

    if let Ok(env_path) = std::env::var(CORPUS_ENV) {
        return Ok(expand_tilde(&env_path));
    }

    if let Some(path) = configured {
        return Ok(expand_tilde(path));
    }

    if let Some(home) = dirs::home_dir() {
        return Ok(home.join(".claude").join("projects"));
    }

    Err(Error::Config(
        "Could not determine corpus path: no HOME directory found".to_string(),
    ))
}

/// Expand tilde (~) in paths to the user's home directory
fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/")
        && let Some(home) = std::env::var_os("HOME")
    {
        return PathBuf::from(home).join(stripped);
    }
    PathBuf::from(path)
}

/// Output caps and excerpt context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub highlight_limit: usize,
    pub cluster_limit: usize,
    /// Snippet prefix length used as the cluster key
    pub cluster_key_chars: usize,
    pub context_radius: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            highlight_limit: 20,
            cluster_limit: 10,
            cluster_key_chars: 80,
            context_radius: forgescan_engine::DEFAULT_CONTEXT_RADIUS,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub corpus_root: Option<String>,
    pub weights: ScoreWeights,
    pub limits: Limits,
    pub rules: RuleConfig,
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = resolve_config_path(None)?;
        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn corpus_root(&self, explicit_path: Option<&str>) -> Result<PathBuf> {
        resolve_corpus_root(explicit_path, self.corpus_root.as_deref())
    }
}
