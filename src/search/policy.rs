//! Field matching policies: how well one text field answers a query.

/// Scores a single field of text against a query. Higher is better; 1.0 is a full match.
pub trait MatchPolicy {
    fn field_score(&self, text: &str, query: &str) -> f64;
}

/// Lowercased query words longer than one character, in query order.
pub fn query_words(query: &str) -> Vec<String> {
    query
        .split_whitespace()
        .filter(|w| w.chars().count() > 1)
        .map(|w| w.to_lowercase())
        .collect()
}

/// Whole query contained in the field, or every query word contained in the field.
///
/// No partial credit: a field scores 1.0 or 0.0. Single-character words are ignored, and a
/// query made only of them matches nothing unless it is contained as a whole.
#[derive(Clone, Copy, Debug, Default)]
pub struct AllWords;

impl MatchPolicy for AllWords {
    fn field_score(&self, text: &str, query: &str) -> f64 {
        let text = text.trim().to_lowercase();
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return 0.0;
        }
        if text.contains(&query) {
            return 1.0;
        }
        let words = query_words(&query);
        if !words.is_empty() && words.iter().all(|w| text.contains(w.as_str())) {
            1.0
        } else {
            0.0
        }
    }
}

/// Edit-distance scoring: each query word is compared with the closest word of the field.
///
/// The field score is the mean of the per-word best `similarity`. Typos still score high,
/// so pair it with a lower minimum score than `AllWords`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Similarity;

impl MatchPolicy for Similarity {
    fn field_score(&self, text: &str, query: &str) -> f64 {
        let lower_text = text.trim().to_lowercase();
        let lower_query = query.trim().to_lowercase();
        if lower_query.is_empty() {
            return 0.0;
        }
        if lower_text.contains(&lower_query) {
            return 1.0;
        }
        let words = query_words(&lower_query);
        if words.is_empty() {
            return similarity(&lower_text, &lower_query);
        }
        let total: f64 = words
            .iter()
            .map(|w| {
                lower_text
                    .split_whitespace()
                    .map(|t| similarity(t, w))
                    .fold(0.0, f64::max)
            })
            .sum();
        total / words.len() as f64
    }
}

/// Levenshtein edit distance over chars.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// Case-insensitive similarity in [0, 1].
///
/// Equal strings score 1. When one contains the other the score is boosted to
/// `0.8 + 0.2 * shorter / longer`; otherwise it is `1 - distance / longer`.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();
    if a == b {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let (len_a, len_b) = (a.chars().count(), b.chars().count());
    let longer = len_a.max(len_b) as f64;
    if a.contains(&b) || b.contains(&a) {
        let shorter = len_a.min(len_b) as f64;
        return 0.8 + 0.2 * shorter / longer;
    }
    1.0 - levenshtein(&a, &b) as f64 / longer
}
