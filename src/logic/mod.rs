//! Tournament business logic: seeding, bracket generation and progression, summaries.

mod bracket;
mod seeding;
mod summary;

pub use bracket::{generate, record_result, start_match};
pub use seeding::{
    bracket_size, seed_order, seed_positions, winners_rounds, LoserDrop, LoserRoutingTable,
};
pub use summary::{summarize, BracketSummary};
