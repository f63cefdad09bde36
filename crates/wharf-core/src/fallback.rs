//! Value fallback and list normalization helpers

/// Returns `value` unless it is empty, in which case `fallback`.
pub fn with_fallback<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() { fallback } else { value }
}

/// Splits a comma-separated string, trims each element and drops
/// empties, preserving order. Empty input yields an empty vec; callers
/// treat "empty" and "absent" identically.
pub fn split_trim(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
