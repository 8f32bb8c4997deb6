// Runtime module - ties corpus access, analysis policy and output shapes
// together into the four user-facing operations

pub mod analyzer;
pub mod config;
pub mod error;
pub mod filter;
pub mod ops;

pub use analyzer::Analyzer;
pub use config::{Config, Limits, resolve_config_path, resolve_corpus_root};
pub use error::{Error, Result};
pub use filter::DateRange;
pub use ops::*;
