use serde_json::Value;
use std::collections::HashSet;

/// Number of earlier messages a retry may point back to
pub const RETRY_WINDOW: usize = 5;

/// Similarity must be strictly above this to count as a retry
pub const RETRY_SIMILARITY_THRESHOLD: f64 = 0.6;

/// Serialize a JSON value with object keys sorted at every depth.
///
/// Items are separated by `", "` and keys by `": "`. Every character outside
/// printable ASCII is written as a `\uXXXX` escape, using UTF-16 surrogate
/// pairs above U+FFFF, so the character set of the output is stable.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            out.push('{');
            for (i, (key, val)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_string(key, out);
                out.push_str(": ");
                write_canonical(val, out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        Value::String(s) => write_string(s, out),
        scalar => out.push_str(&scalar.to_string()),
    }
}

fn write_string(s: &str, out: &mut String) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0C}' => out.push_str("\\f"),
            ' '..='~' => out.push(c),
            _ => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    out.push_str(&format!("\\u{unit:04x}"));
                }
            }
        }
    }
    out.push('"');
}

/// Jaccard overlap of the character sets of `a` and `b`.
///
/// Two empty strings have similarity 0.
pub fn charset_similarity(a: &str, b: &str) -> f64 {
    let set_a: HashSet<char> = a.chars().collect();
    let set_b: HashSet<char> = b.chars().collect();
    let union = set_a.union(&set_b).count();
    if union == 0 {
        return 0.0;
    }
    let intersection = set_a.intersection(&set_b).count();
    intersection as f64 / union as f64
}

/// Similarity of two tool inputs, compared in canonical form.
pub fn input_similarity(a: &Value, b: &Value) -> f64 {
    charset_similarity(&canonical_json(a), &canonical_json(b))
}

pub fn is_similar(similarity: f64) -> bool {
    similarity > RETRY_SIMILARITY_THRESHOLD
}
