//! Data structures for the tournament: roster, ranks, bracket matches.

mod bracket;
mod rank;
mod roster;

pub use bracket::{
    Bracket, BracketError, BracketMatch, BracketSide, GrandFinal, GrandFinalGame, MatchId,
    MatchStatus, Slot, SlotRef,
};
pub use rank::{ParseRankError, Rank};
pub use roster::{
    Dojo, DojoId, Member, MemberId, Roster, RosterError, Team, TeamAssignment, TeamId,
    MAX_TEAM_MEMBERS,
};
