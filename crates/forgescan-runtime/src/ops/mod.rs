pub mod extract;
pub mod projects;
pub mod scan;

pub use extract::{ExtractReport, extract};
pub use projects::{
    ProjectList, ProjectSummary, SessionList, SessionSummary, list_projects, list_sessions,
};
pub use scan::{
    ProjectStats, ScanAggregator, ScanMetadata, ScanOptions, ScanReport, ScanSummary,
    SessionHighlight, SessionOutcome, SnippetCluster, analyze_session_file, scan,
};
