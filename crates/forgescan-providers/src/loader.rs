use forgescan_types::RawRecord;
use std::path::Path;

/// Read every record of one session file.
///
/// Unparseable lines are dropped and an unreadable or missing file yields an
/// empty list: partial logs are normal and never abort an analysis.
pub fn load_session_records(path: &Path) -> Vec<RawRecord> {
    match std::fs::read(path) {
        Ok(bytes) => parse_records(&String::from_utf8_lossy(&bytes)),
        Err(err) => {
            tracing::debug!(path = %path.display(), error = %err, "session file unreadable");
            Vec::new()
        }
    }
}

/// Parse a JSONL document, one record per non-blank line.
pub fn parse_records(text: &str) -> Vec<RawRecord> {
    let mut records = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match RawRecord::from_line(line) {
            Ok(record) => records.push(record),
            Err(err) => {
                tracing::debug!(line = line_no + 1, error = %err, "skipping malformed record");
            }
        }
    }
    records
}

/// Number of raw lines in a file (0 when unreadable).
pub fn count_lines(path: &Path) -> usize {
    std::fs::read(path)
        .map(|bytes| String::from_utf8_lossy(&bytes).lines().count())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use forgescan_types::RecordKind;
    use std::io::Write;

    #[test]
    fn test_parse_records_skips_malformed_lines() {
        let text = concat!(
            "{\"type\":\"user\",\"message\":{\"content\":\"hi\"}}\n",
            "\n",
            "{broken\n",
            "   \n",
            "[1,2]\n",
            "{\"type\":\"summary\"}\n",
            "{\"type\":\"assistant\",\"message\":{\"content\":[]}}\r\n",
        );
        let records = parse_records(text);
        let kinds: Vec<_> = records.iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![RecordKind::User, RecordKind::Other, RecordKind::Assistant]
        );
    }

    #[test]
    fn test_missing_file_yields_empty() {
        let records = load_session_records(Path::new("/definitely/not/here.jsonl"));
        assert!(records.is_empty());
        assert_eq!(count_lines(Path::new("/definitely/not/here.jsonl")), 0);
    }

    #[test]
    fn test_load_tolerates_invalid_utf8() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{\"type\":\"user\",\"message\":{\"content\":\"a\xffb\"}}\n")
            .unwrap();
        file.write_all(b"not json\n").unwrap();
        file.flush().unwrap();

        let records = load_session_records(file.path());
        assert_eq!(records.len(), 1);
        assert_eq!(count_lines(file.path()), 2);
    }
}
