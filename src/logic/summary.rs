//! Read-only bracket view for display.

use crate::models::{Bracket, BracketMatch, GrandFinal, GrandFinalGame, MatchId, TeamId};
use serde::Serialize;

/// Snapshot of a bracket for the bracket page and the court display.
#[derive(Clone, Debug, Serialize)]
pub struct BracketSummary {
    pub winners_rounds: Vec<Vec<BracketMatch>>,
    pub losers_rounds: Vec<Vec<BracketMatch>>,
    pub grand_final: GrandFinal,
    pub grand_final_game: GrandFinalGame,
    pub teams_remaining: usize,
    pub eliminated: Vec<TeamId>,
    pub champion: Option<TeamId>,
    /// Ready or in-progress matches, in program order.
    pub playable: Vec<MatchId>,
}

pub fn summarize(bracket: &Bracket) -> BracketSummary {
    let eliminated = bracket.eliminated();
    BracketSummary {
        winners_rounds: bracket.winners.clone(),
        losers_rounds: bracket.losers.clone(),
        grand_final: bracket.grand_final.clone(),
        grand_final_game: bracket.grand_final.game(),
        teams_remaining: bracket.teams_remaining(),
        eliminated,
        champion: bracket.champion(),
        playable: bracket.playable_matches().iter().map(|m| m.id).collect(),
    }
}
