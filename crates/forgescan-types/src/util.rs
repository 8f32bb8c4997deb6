/// Keep at most `max` characters of `s`.
///
/// Counts Unicode scalar values, never splitting a multi-byte character.
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((byte_idx, _)) => s[..byte_idx].to_string(),
        None => s.to_string(),
    }
}
