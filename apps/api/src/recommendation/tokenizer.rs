use std::collections::BTreeSet;

/// Words of this length or shorter carry no search signal ("a", "to", "is").
const MIN_TERM_LEN: usize = 3;
const MAX_TERM_LEN: usize = 64;
const MAX_TERMS: usize = 32;

/// Extracts lower-cased query terms from free text.
///
/// Everything outside `[A-Za-z0-9 ]` is removed before splitting, so
/// punctuation inside a word joins its halves ("e-mail" -> "email").
/// The result is empty for blank or punctuation-only input.
pub fn tokenize(text: &str) -> BTreeSet<String> {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == ' ')
        .collect();

    cleaned
        .split_whitespace()
        .filter(|w| (MIN_TERM_LEN..=MAX_TERM_LEN).contains(&w.len()))
        .map(str::to_ascii_lowercase)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .take(MAX_TERMS)
        .collect()
}
