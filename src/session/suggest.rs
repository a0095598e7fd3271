//! Autocomplete over the symptom vocabulary, and the edits that accept a
//! suggestion into the input text.
//!
//! Everything here is pure and recomputed on every keystroke.

/// Upper bound on suggestions shown at once.
pub const MAX_SUGGESTIONS: usize = 6;

/// Quick-add chips offered under the input.
pub const COMMON_SYMPTOMS: [&str; 6] = [
    "headache",
    "stomach pain",
    "fatigue",
    "anxiety",
    "insomnia",
    "nausea",
];

/// The word currently being typed: text after the last whitespace.
///
/// Returns `""` when `input` ends in whitespace.
pub fn last_token(input: &str) -> &str {
    input
        .rfind(char::is_whitespace)
        .map_or(input, |idx| {
            let ws_len = input[idx..].chars().next().map_or(1, char::len_utf8);
            &input[idx + ws_len..]
        })
}

/// Vocabulary entries containing the lower-cased last token of `input`,
/// in vocabulary order, at most [`MAX_SUGGESTIONS`].
///
/// An empty `input` yields nothing. Input ending in whitespace has an empty
/// last token, which matches every entry.
pub fn filter(input: &str, vocabulary: &[String]) -> Vec<String> {
    if input.is_empty() {
        return Vec::new();
    }
    let needle = last_token(input).to_lowercase();
    vocabulary
        .iter()
        .filter(|entry| entry.to_lowercase().contains(&needle))
        .take(MAX_SUGGESTIONS)
        .cloned()
        .collect()
}

/// Replace the last token of `input` with `suggestion` and append a space.
pub fn accept(input: &str, suggestion: &str) -> String {
    let token = last_token(input);
    let prefix = &input[..input.len() - token.len()];
    format!("{prefix}{suggestion} ")
}

/// Append a symptom as a comma-separated item.
pub fn quick_add(input: &str, symptom: &str) -> String {
    if input.is_empty() {
        symptom.to_string()
    } else {
        format!("{input}, {symptom}")
    }
}
