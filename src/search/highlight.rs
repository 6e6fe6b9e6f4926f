//! Wrap query words found in display text with `<mark>` tags.

use crate::search::policy::query_words;
use regex::RegexBuilder;

/// Wrap every case-insensitive occurrence of a query word (longer than one character) in
/// `<mark>...</mark>`.
///
/// The text itself is not escaped; callers strip markup from it first. Query words are escaped
/// before they go into the pattern, and longer words win where two start at the same place.
pub fn highlight(text: &str, query: &str) -> String {
    if text.is_empty() || query.trim().is_empty() {
        return text.to_string();
    }
    let mut words = query_words(query);
    if words.is_empty() {
        return text.to_string();
    }
    words.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    words.dedup();

    let pattern = words
        .iter()
        .map(|w| regex::escape(w))
        .collect::<Vec<_>>()
        .join("|");
    match RegexBuilder::new(&pattern).case_insensitive(true).build() {
        Ok(re) => re.replace_all(text, "<mark>${0}</mark>").into_owned(),
        Err(e) => {
            log::warn!("Highlight pattern for {:?} did not compile: {}", query, e);
            text.to_string()
        }
    }
}
