//! Double-elimination bracket: matches, slots, grand final, and BracketError.

use crate::models::roster::TeamId;
use serde::{Deserialize, Serialize};

/// Unique identifier for a bracket match. Assigned sequentially in build order, starting at 1.
pub type MatchId = u32;

/// Errors that can occur when building or advancing a bracket.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum BracketError {
    /// Fewer than 2 teams, or the same team listed twice.
    InvalidInput(String),
    /// No match with this id in the bracket.
    UnknownMatch(MatchId),
    /// The given team is not one of the match's two slots.
    InvalidWinner { match_id: MatchId, team_id: TeamId },
    /// The match already has a different winner.
    AlreadyDecided { match_id: MatchId, winner: TeamId },
    /// The match is still waiting for one or both teams.
    NotReady(MatchId),
}

impl std::fmt::Display for BracketError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BracketError::InvalidInput(reason) => write!(f, "Invalid bracket input: {}", reason),
            BracketError::UnknownMatch(id) => write!(f, "Match {} not found", id),
            BracketError::InvalidWinner { match_id, .. } => {
                write!(f, "Winner is not a team in match {}", match_id)
            }
            BracketError::AlreadyDecided { match_id, .. } => {
                write!(f, "Match {} already has a different winner", match_id)
            }
            BracketError::NotReady(id) => write!(f, "Match {} is not ready to be played", id),
        }
    }
}

impl std::error::Error for BracketError {}

/// Which ladder a match belongs to.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BracketSide {
    Winners,
    Losers,
    GrandFinal,
}

/// Lifecycle of a match.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    /// At least one slot is still empty.
    #[default]
    Pending,
    /// Both slots filled, not started.
    Ready,
    /// On court.
    InProgress,
    Completed,
}

/// One of the two team slots of a match.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    One,
    Two,
}

/// Where a team goes next: a slot of a downstream match.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct SlotRef {
    pub match_id: MatchId,
    pub slot: Slot,
}

/// A single bracket match between two teams.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct BracketMatch {
    pub id: MatchId,
    pub side: BracketSide,
    /// 1-based round within its side.
    pub round: u32,
    /// 0-based position within the round.
    pub position: u32,
    /// None until fed by an upstream result.
    pub team_1: Option<TeamId>,
    pub team_2: Option<TeamId>,
    /// None until decided.
    pub winner: Option<TeamId>,
    pub status: MatchStatus,
    /// Slot the winner advances into (None for the deciding grand final game).
    pub winner_to: Option<SlotRef>,
    /// Slot the loser drops into. None means the loser is eliminated.
    pub loser_to: Option<SlotRef>,
}

impl BracketMatch {
    pub fn new(id: MatchId, side: BracketSide, round: u32, position: u32) -> Self {
        Self {
            id,
            side,
            round,
            position,
            team_1: None,
            team_2: None,
            winner: None,
            status: MatchStatus::Pending,
            winner_to: None,
            loser_to: None,
        }
    }

    pub fn slot(&self, slot: Slot) -> Option<TeamId> {
        match slot {
            Slot::One => self.team_1,
            Slot::Two => self.team_2,
        }
    }

    /// Fill a slot and promote the match to Ready once both slots are known.
    pub fn fill(&mut self, slot: Slot, team: TeamId) {
        match slot {
            Slot::One => self.team_1 = Some(team),
            Slot::Two => self.team_2 = Some(team),
        }
        if self.status == MatchStatus::Pending && self.team_1.is_some() && self.team_2.is_some() {
            self.status = MatchStatus::Ready;
        }
    }

    pub fn has_team(&self, team: TeamId) -> bool {
        self.team_1 == Some(team) || self.team_2 == Some(team)
    }

    /// The other team in the match, if both slots are filled.
    pub fn opponent_of(&self, team: TeamId) -> Option<TeamId> {
        match (self.team_1, self.team_2) {
            (Some(a), Some(b)) if a == team => Some(b),
            (Some(a), Some(b)) if b == team => Some(a),
            _ => None,
        }
    }

    pub fn loser(&self) -> Option<TeamId> {
        self.winner.and_then(|w| self.opponent_of(w))
    }
}

/// Which game of the grand final is being played.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrandFinalGame {
    One,
    /// The losers-bracket champion took game one; this game decides the title.
    Two,
}

/// Winners-bracket champion (slot One) against losers-bracket champion (slot Two).
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GrandFinal {
    pub game_one: BracketMatch,
    /// Created only when the losers-bracket champion wins game one.
    pub game_two: Option<BracketMatch>,
    /// Id reserved for game two at build time.
    pub game_two_id: MatchId,
}

impl GrandFinal {
    pub fn game(&self) -> GrandFinalGame {
        if self.game_two.is_some() {
            GrandFinalGame::Two
        } else {
            GrandFinalGame::One
        }
    }

    /// The match that decides the title: game two if it exists, else game one.
    pub fn deciding_match(&self) -> &BracketMatch {
        self.game_two.as_ref().unwrap_or(&self.game_one)
    }

    /// Tournament winner, once the deciding game is complete.
    pub fn champion(&self) -> Option<TeamId> {
        let deciding = self.deciding_match();
        if deciding.status != MatchStatus::Completed {
            return None;
        }
        // Game one won by slot Two means game two has to be created before there is a champion.
        if self.game_two.is_none() && deciding.winner != deciding.team_1 {
            return None;
        }
        deciding.winner
    }
}

/// Full bracket state: seeded teams, both ladders, and the grand final.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Bracket {
    /// Team ids in seed order (index 0 = seed 1).
    pub teams: Vec<TeamId>,
    /// Power of two the field was padded to.
    pub size: u32,
    /// Winners-bracket rounds in order; each round's matches ordered by position.
    pub winners: Vec<Vec<BracketMatch>>,
    /// Losers-bracket rounds in order.
    pub losers: Vec<Vec<BracketMatch>>,
    pub grand_final: GrandFinal,
}

impl Bracket {
    /// All matches in program order: winners rounds, losers rounds, then the grand final games.
    pub fn matches(&self) -> impl Iterator<Item = &BracketMatch> {
        self.winners
            .iter()
            .flatten()
            .chain(self.losers.iter().flatten())
            .chain(std::iter::once(&self.grand_final.game_one))
            .chain(self.grand_final.game_two.iter())
    }

    pub fn get_match(&self, id: MatchId) -> Option<&BracketMatch> {
        self.matches().find(|m| m.id == id)
    }

    pub fn get_match_mut(&mut self, id: MatchId) -> Option<&mut BracketMatch> {
        self.winners
            .iter_mut()
            .flatten()
            .chain(self.losers.iter_mut().flatten())
            .chain(std::iter::once(&mut self.grand_final.game_one))
            .chain(self.grand_final.game_two.iter_mut())
            .find(|m| m.id == id)
    }

    /// Seed number (1-based) of a team, if it is in this bracket.
    pub fn seed_of(&self, team: TeamId) -> Option<u32> {
        self.teams
            .iter()
            .position(|t| *t == team)
            .map(|i| i as u32 + 1)
    }

    pub fn champion(&self) -> Option<TeamId> {
        self.grand_final.champion()
    }

    /// Teams knocked out so far, in the order their elimination matches appear.
    pub fn eliminated(&self) -> Vec<TeamId> {
        let mut out: Vec<TeamId> = self
            .winners
            .iter()
            .flatten()
            .chain(self.losers.iter().flatten())
            .filter(|m| m.status == MatchStatus::Completed && m.loser_to.is_none())
            .filter_map(|m| m.loser())
            .collect();
        if let Some(champion) = self.champion() {
            if let Some(runner_up) = self.grand_final.deciding_match().opponent_of(champion) {
                out.push(runner_up);
            }
        }
        out
    }

    /// Number of teams not yet knocked out.
    pub fn teams_remaining(&self) -> usize {
        self.teams.len() - self.eliminated().len()
    }
}
