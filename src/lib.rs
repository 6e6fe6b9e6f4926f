//! Kendo team tournament: library with roster models, bracket logic, and roster search.

pub mod logic;
pub mod models;
pub mod search;

pub use logic::{
    generate, record_result, seed_order, start_match, summarize, BracketSummary, LoserDrop,
    LoserRoutingTable,
};
pub use models::{
    Bracket, BracketError, BracketMatch, BracketSide, Dojo, DojoId, GrandFinal, GrandFinalGame,
    MatchId, MatchStatus, Member, MemberId, Rank, Roster, RosterError, Slot, SlotRef, Team,
    TeamAssignment, TeamId, MAX_TEAM_MEMBERS,
};
