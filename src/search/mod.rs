//! Roster search: ranking, suggestions, highlighting, and query history.

mod engine;
mod highlight;
mod history;
mod policy;

pub use engine::{
    search, search_with, suggest, SearchResult, DEFAULT_MAX_SUGGESTIONS, DEFAULT_MIN_SCORE,
};
pub use highlight::highlight;
pub use history::{KeyValueStore, MemoryStore, SearchHistory, HISTORY_KEY, MAX_HISTORY};
pub use policy::{levenshtein, query_words, similarity, AllWords, MatchPolicy, Similarity};
