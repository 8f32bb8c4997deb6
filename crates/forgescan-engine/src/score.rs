use forgescan_types::{PatternCounts, PatternKind, ScoreWeights, SessionPatterns};

/// Weighted sum of hit counts. Zero means nothing worth highlighting.
pub fn score_counts(counts: &PatternCounts, weights: &ScoreWeights) -> u64 {
    PatternKind::ALL
        .iter()
        .map(|kind| counts.get(*kind) as u64 * u64::from(weights.weight(*kind)))
        .sum()
}

pub fn score_session(patterns: &SessionPatterns, weights: &ScoreWeights) -> u64 {
    score_counts(&patterns.counts(), weights)
}
