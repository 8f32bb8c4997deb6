//! Corpus-wide pattern scan.
//!
//! Sessions are analyzed independently on the rayon pool, each producing an
//! owned [`SessionOutcome`]. The outcomes are then folded into a
//! [`ScanAggregator`] one at a time. Every table the aggregator builds is a
//! pure accumulation and every output list is sorted on a total key, so the
//! report does not depend on the order in which outcomes arrive.

use chrono::Utc;
use forgescan_providers::{
    Corpus, ProjectDir, ProjectFilter, SessionFile, decode_project_name, load_session_records,
    normalize_session,
};
use forgescan_types::{PatternCounts, RawTimestamp, truncate_chars};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::Result;
use crate::analyzer::Analyzer;
use crate::config::Limits;
use crate::filter::{DateRange, first_timestamp, session_start};
use crate::ops::projects::first_user_message;

#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    pub project_filter: Option<String>,
    pub dates: DateRange,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub scan_metadata: ScanMetadata,
    pub summary: ScanSummary,
    pub per_project: BTreeMap<String, ProjectStats>,
    pub session_highlights: Vec<SessionHighlight>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanMetadata {
    pub timestamp: String,
    pub project_filter: Option<String>,
    pub date_range: DateRange,
    pub projects_scanned: usize,
    pub sessions_scanned: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanSummary {
    pub total_errors: usize,
    pub total_tool_failures: usize,
    pub total_corrections: usize,
    pub top_errors: Vec<SnippetCluster>,
    pub top_tool_failures: Vec<SnippetCluster>,
}

/// Snippets sharing the same prefix, with how often they occurred
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnippetCluster {
    pub snippet: String,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProjectStats {
    pub decoded_path: String,
    pub sessions_scanned: usize,
    pub total_errors: usize,
    pub total_retries: usize,
    pub total_corrections: usize,
    pub total_tool_failures: usize,
    pub total_successful_workflows: usize,
}

impl ProjectStats {
    fn new(decoded_path: String) -> Self {
        Self {
            decoded_path,
            ..Default::default()
        }
    }

    fn record(&mut self, counts: &PatternCounts) {
        self.sessions_scanned += 1;
        self.total_errors += counts.errors;
        self.total_retries += counts.retries;
        self.total_corrections += counts.corrections;
        self.total_tool_failures += counts.tool_failures;
        self.total_successful_workflows += counts.successful_workflows;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionHighlight {
    pub session_id: String,
    pub project_dir: String,
    pub decoded_project: String,
    pub score: u64,
    pub first_message: String,
    pub timestamp: Option<RawTimestamp>,
    pub pattern_counts: PatternCounts,
}

/// Everything the aggregator needs from one analyzed session
#[derive(Debug, Clone)]
pub struct SessionOutcome {
    pub session_id: String,
    pub project_dir: String,
    pub score: u64,
    pub counts: PatternCounts,
    pub first_message: String,
    pub timestamp: Option<RawTimestamp>,
    pub error_snippets: Vec<String>,
    pub failure_snippets: Vec<String>,
}

/// Load, filter and analyze one session file.
///
/// Returns `None` when the file has no parseable records or the session
/// falls outside the date range.
pub fn analyze_session_file(
    file: &SessionFile,
    dates: &DateRange,
    analyzer: &Analyzer,
) -> Option<SessionOutcome> {
    let records = load_session_records(&file.path);
    if records.is_empty() {
        tracing::debug!(session = %file.session_id, "skipping session without records");
        return None;
    }
    if !dates.admits(session_start(&records)) {
        return None;
    }

    let messages = normalize_session(&records);
    let analysis = analyzer.analyze(&messages);

    Some(SessionOutcome {
        session_id: file.session_id.clone(),
        project_dir: file.project_dir.clone(),
        score: analysis.score,
        counts: analysis.counts,
        first_message: first_user_message(&records),
        timestamp: first_timestamp(&records).cloned(),
        error_snippets: analysis
            .patterns
            .errors
            .into_iter()
            .map(|e| e.snippet)
            .collect(),
        failure_snippets: analysis
            .patterns
            .tool_failures
            .into_iter()
            .map(|f| f.snippet)
            .collect(),
    })
}

/// Folds session outcomes into per-project totals, highlights and clusters
#[derive(Debug, Clone)]
pub struct ScanAggregator {
    limits: Limits,
    per_project: BTreeMap<String, ProjectStats>,
    highlights: Vec<SessionHighlight>,
    error_clusters: BTreeMap<String, usize>,
    failure_clusters: BTreeMap<String, usize>,
    totals: PatternCounts,
}

impl ScanAggregator {
    pub fn new(limits: Limits) -> Self {
        Self {
            limits,
            per_project: BTreeMap::new(),
            highlights: Vec::new(),
            error_clusters: BTreeMap::new(),
            failure_clusters: BTreeMap::new(),
            totals: PatternCounts::default(),
        }
    }

    /// Make a project appear in the report even if none of its sessions do.
    pub fn add_project(&mut self, project: &ProjectDir) {
        self.per_project
            .entry(project.encoded_name.clone())
            .or_insert_with(|| ProjectStats::new(project.decoded_path.clone()));
    }

    pub fn add_session(&mut self, outcome: SessionOutcome) {
        let stats = self
            .per_project
            .entry(outcome.project_dir.clone())
            .or_insert_with(|| ProjectStats::new(decode_project_name(&outcome.project_dir)));
        stats.record(&outcome.counts);
        let decoded_project = stats.decoded_path.clone();

        self.totals += outcome.counts;

        let key_chars = self.limits.cluster_key_chars;
        for snippet in &outcome.error_snippets {
            *self
                .error_clusters
                .entry(truncate_chars(snippet, key_chars))
                .or_default() += 1;
        }
        for snippet in &outcome.failure_snippets {
            *self
                .failure_clusters
                .entry(truncate_chars(snippet, key_chars))
                .or_default() += 1;
        }

        if outcome.score > 0 {
            self.highlights.push(SessionHighlight {
                session_id: outcome.session_id,
                project_dir: outcome.project_dir,
                decoded_project,
                score: outcome.score,
                first_message: outcome.first_message,
                timestamp: outcome.timestamp,
                pattern_counts: outcome.counts,
            });
        }
    }

    pub fn finish(self, options: &ScanOptions) -> ScanReport {
        let ScanAggregator {
            limits,
            per_project,
            mut highlights,
            error_clusters,
            failure_clusters,
            totals,
        } = self;

        highlights.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| a.session_id.cmp(&b.session_id))
                .then_with(|| a.project_dir.cmp(&b.project_dir))
        });
        highlights.truncate(limits.highlight_limit);

        let sessions_scanned = per_project.values().map(|p| p.sessions_scanned).sum();

        ScanReport {
            scan_metadata: ScanMetadata {
                timestamp: Utc::now().to_rfc3339(),
                project_filter: options.project_filter.clone(),
                date_range: options.dates,
                projects_scanned: per_project.len(),
                sessions_scanned,
            },
            summary: ScanSummary {
                total_errors: totals.errors,
                total_tool_failures: totals.tool_failures,
                total_corrections: totals.corrections,
                top_errors: rank_clusters(error_clusters, limits.cluster_limit),
                top_tool_failures: rank_clusters(failure_clusters, limits.cluster_limit),
            },
            per_project,
            session_highlights: highlights,
        }
    }
}

/// Most frequent first; equal counts by snippet.
fn rank_clusters(clusters: BTreeMap<String, usize>, limit: usize) -> Vec<SnippetCluster> {
    let mut ranked: Vec<SnippetCluster> = clusters
        .into_iter()
        .map(|(snippet, count)| SnippetCluster { snippet, count })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.snippet.cmp(&b.snippet)));
    ranked.truncate(limit);
    ranked
}

/// Scan every matching project of the corpus.
pub fn scan(corpus: &Corpus, options: &ScanOptions, analyzer: &Analyzer) -> Result<ScanReport> {
    let filter = options.project_filter.as_deref().map(ProjectFilter::new);
    let projects: Vec<ProjectDir> = corpus
        .projects()?
        .into_iter()
        .filter(|p| filter.as_ref().is_none_or(|f| f.matches(p)))
        .collect();

    let sessions: Vec<SessionFile> = projects.iter().flat_map(|p| p.sessions()).collect();
    tracing::info!(
        projects = projects.len(),
        sessions = sessions.len(),
        "scanning corpus"
    );

    let outcomes: Vec<SessionOutcome> = sessions
        .par_iter()
        .filter_map(|file| analyze_session_file(file, &options.dates, analyzer))
        .collect();

    let mut aggregator = ScanAggregator::new(*analyzer.limits());
    for project in &projects {
        aggregator.add_project(project);
    }
    for outcome in outcomes {
        aggregator.add_session(outcome);
    }

    let report = aggregator.finish(options);
    tracing::info!(
        sessions_scanned = report.scan_metadata.sessions_scanned,
        highlights = report.session_highlights.len(),
        "scan complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(session: &str, project: &str, score: u64, errors: &[&str]) -> SessionOutcome {
        SessionOutcome {
            session_id: session.to_string(),
            project_dir: project.to_string(),
            score,
            counts: PatternCounts {
                errors: errors.len(),
                ..Default::default()
            },
            first_message: String::new(),
            timestamp: None,
            error_snippets: errors.iter().map(|s| s.to_string()).collect(),
            failure_snippets: Vec::new(),
        }
    }

    fn fold(outcomes: Vec<SessionOutcome>, limits: Limits) -> ScanReport {
        let mut aggregator = ScanAggregator::new(limits);
        for o in outcomes {
            aggregator.add_session(o);
        }
        aggregator.finish(&ScanOptions::default())
    }

    #[test]
    fn test_aggregation_is_order_independent() {
        let outcomes = vec![
            outcome("s1", "-p-a", 4, &["Error: a", "Error: b"]),
            outcome("s2", "-p-b", 4, &["Error: a"]),
            outcome("s3", "-p-a", 0, &[]),
            outcome("s4", "-p-b", 6, &["Error: b", "Error: c", "Error: a"]),
        ];
        let mut reversed = outcomes.clone();
        reversed.reverse();

        let forward = fold(outcomes, Limits::default());
        let backward = fold(reversed, Limits::default());

        assert_eq!(forward.per_project, backward.per_project);
        assert_eq!(forward.summary, backward.summary);
        assert_eq!(forward.session_highlights, backward.session_highlights);

        let order: Vec<_> = forward
            .session_highlights
            .iter()
            .map(|h| h.session_id.as_str())
            .collect();
        assert_eq!(order, vec!["s4", "s1", "s2"]);
        assert_eq!(forward.per_project["-p-a"].sessions_scanned, 2);
        assert_eq!(forward.per_project["-p-b"].total_errors, 4);
        assert_eq!(
            forward.summary.top_errors,
            vec![
                SnippetCluster {
                    snippet: "Error: a".to_string(),
                    count: 3
                },
                SnippetCluster {
                    snippet: "Error: b".to_string(),
                    count: 2
                },
                SnippetCluster {
                    snippet: "Error: c".to_string(),
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn test_limits_cap_outputs_and_cluster_on_prefix() {
        let limits = Limits {
            highlight_limit: 2,
            cluster_limit: 1,
            cluster_key_chars: 6,
            ..Limits::default()
        };
        let report = fold(
            vec![
                outcome("s1", "-p", 2, &["Error: first"]),
                outcome("s2", "-p", 2, &["Error: second"]),
                outcome("s3", "-p", 2, &["panic: x"]),
            ],
            limits,
        );
        assert_eq!(report.session_highlights.len(), 2);
        assert_eq!(
            report.summary.top_errors,
            vec![SnippetCluster {
                snippet: "Error:".to_string(),
                count: 2
            }]
        );
    }

    #[test]
    fn test_zero_score_sessions_are_counted_but_not_highlighted() {
        let report = fold(vec![outcome("quiet", "-p", 0, &[])], Limits::default());
        assert!(report.session_highlights.is_empty());
        assert_eq!(report.scan_metadata.sessions_scanned, 1);
        assert_eq!(report.per_project["-p"].decoded_path, decode_project_name("-p"));
    }
}
