// Error types
pub mod error;

// Corpus layout: project directories and session files
pub mod corpus;

// Record stream loading
pub mod loader;

// Raw record -> normalized message view
pub mod normalize;

pub use corpus::{Corpus, ProjectDir, ProjectFilter, SessionFile, decode_project_name};
pub use loader::{count_lines, load_session_records, parse_records};
pub use normalize::{display_text, normalize_record, normalize_session};

pub use error::{Error, Result};
