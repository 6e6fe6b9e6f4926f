//! Double-elimination bracket: generation from seeded teams and result propagation.

use crate::logic::seeding::{bracket_size, seed_positions, winners_rounds, LoserRoutingTable};
use crate::models::{
    Bracket, BracketError, BracketMatch, BracketSide, GrandFinal, MatchId, MatchStatus, Slot,
    SlotRef, Team, TeamId,
};
use std::collections::{HashMap, HashSet};

/// What fills a match slot while the bracket is being built.
#[derive(Clone, Copy, Debug)]
enum Feed {
    Team(TeamId),
    Winner(MatchId),
    Loser(MatchId),
    /// Nobody will ever arrive (a bye, or the loser of a match that was never created).
    Bye,
}

/// Feeds coming out of a skeleton match.
struct Outcome {
    winner: Feed,
    loser: Feed,
}

/// Flat match list; a match's id is its index + 1.
#[derive(Default)]
struct BracketBuilder {
    matches: Vec<BracketMatch>,
}

impl BracketBuilder {
    fn next_id(&self) -> MatchId {
        self.matches.len() as MatchId + 1
    }

    /// Add a skeleton match. A match with a bye on either side is not created: the live feed
    /// passes straight through as the winner and nobody drops out as the loser.
    fn add(&mut self, side: BracketSide, round: u32, position: u32, a: Feed, b: Feed) -> Outcome {
        match (a, b) {
            (Feed::Bye, Feed::Bye) => Outcome {
                winner: Feed::Bye,
                loser: Feed::Bye,
            },
            (live, Feed::Bye) | (Feed::Bye, live) => Outcome {
                winner: live,
                loser: Feed::Bye,
            },
            _ => {
                let id = self.next_id();
                self.matches.push(BracketMatch::new(id, side, round, position));
                self.connect(a, SlotRef { match_id: id, slot: Slot::One });
                self.connect(b, SlotRef { match_id: id, slot: Slot::Two });
                Outcome {
                    winner: Feed::Winner(id),
                    loser: Feed::Loser(id),
                }
            }
        }
    }

    fn connect(&mut self, feed: Feed, target: SlotRef) {
        match feed {
            Feed::Team(team) => {
                if let Some(m) = self.get_mut(target.match_id) {
                    m.fill(target.slot, team);
                }
            }
            Feed::Winner(src) => {
                if let Some(m) = self.get_mut(src) {
                    m.winner_to = Some(target);
                }
            }
            Feed::Loser(src) => {
                if let Some(m) = self.get_mut(src) {
                    m.loser_to = Some(target);
                }
            }
            Feed::Bye => {}
        }
    }

    fn get_mut(&mut self, id: MatchId) -> Option<&mut BracketMatch> {
        (id as usize).checked_sub(1).and_then(|i| self.matches.get_mut(i))
    }
}

fn seed_feed(teams: &[Team], seed: u32) -> Feed {
    match teams.get(seed as usize - 1) {
        Some(t) => Feed::Team(t.id),
        None => Feed::Bye,
    }
}

/// Group one side's matches into rounds, keeping build order.
fn into_rounds(matches: &[BracketMatch], side: BracketSide) -> Vec<Vec<BracketMatch>> {
    let mut rounds: Vec<Vec<BracketMatch>> = Vec::new();
    for m in matches.iter().filter(|m| m.side == side) {
        match rounds.last_mut() {
            Some(round) if round.first().map(|f| f.round) == Some(m.round) => round.push(m.clone()),
            _ => rounds.push(vec![m.clone()]),
        }
    }
    rounds
}

/// Build a double-elimination bracket from teams in seed order (index 0 = seed 1).
///
/// 1. Pad to the next power of two; seeds past the field are byes for the top seeds.
/// 2. Pair round 1 in standard seed order and build the winners ladder.
/// 3. Build the losers ladder, dropping winners-bracket losers in via `LoserRoutingTable`.
/// 4. Winners champion meets losers champion in the grand final.
///
/// Skeleton matches touched by a bye are never created, so every match is playable.
pub fn generate(teams: &[Team]) -> Result<Bracket, BracketError> {
    if teams.len() < 2 {
        return Err(BracketError::InvalidInput(format!(
            "need at least 2 teams, got {}",
            teams.len()
        )));
    }
    let mut seen = HashSet::new();
    for t in teams {
        if !seen.insert(t.id) {
            return Err(BracketError::InvalidInput(format!("team {} listed twice", t.name)));
        }
    }

    let size = bracket_size(teams.len());
    let table = LoserRoutingTable::for_size(size);
    let mut builder = BracketBuilder::default();
    let mut loser_feeds: HashMap<(u32, u32), Feed> = HashMap::new();

    // Winners bracket
    let mut current = Vec::with_capacity(size as usize / 2);
    for (p, pair) in seed_positions(size).chunks(2).enumerate() {
        let out = builder.add(
            BracketSide::Winners,
            1,
            p as u32,
            seed_feed(teams, pair[0]),
            seed_feed(teams, pair[1]),
        );
        loser_feeds.insert((1, p as u32), out.loser);
        current.push(out.winner);
    }
    for round in 2..=winners_rounds(size) {
        let mut next = Vec::with_capacity(current.len() / 2);
        for (p, pair) in current.chunks(2).enumerate() {
            let out = builder.add(BracketSide::Winners, round, p as u32, pair[0], pair[1]);
            loser_feeds.insert((round, p as u32), out.loser);
            next.push(out.winner);
        }
        current = next;
    }
    let winners_champion = current[0];

    // Losers bracket
    let mut dropped: HashMap<(u32, u32, Slot), Feed> = HashMap::new();
    for ((w_round, w_pos), to) in table.iter() {
        if let Some(feed) = loser_feeds.get(&(w_round, w_pos)) {
            dropped.insert((to.round, to.position, to.slot), *feed);
        }
    }
    let drop_in = |round: u32, position: u32, slot: Slot| {
        dropped
            .get(&(round, position, slot))
            .copied()
            .unwrap_or(Feed::Bye)
    };
    let mut survivors: Vec<Feed> = Vec::new();
    for round in 1..=table.losers_rounds() {
        let len = table.losers_round_len(round);
        let mut next = Vec::with_capacity(len as usize);
        for j in 0..len {
            let (a, b) = if round == 1 {
                (drop_in(1, j, Slot::One), drop_in(1, j, Slot::Two))
            } else if round % 2 == 1 {
                let j = j as usize;
                (survivors[2 * j], survivors[2 * j + 1])
            } else {
                (survivors[j as usize], drop_in(round, j, Slot::Two))
            };
            next.push(builder.add(BracketSide::Losers, round, j, a, b).winner);
        }
        survivors = next;
    }
    let losers_champion = match survivors.first() {
        Some(feed) => *feed,
        // Two-team bracket: the loser of the only match goes straight to the grand final.
        None => loser_feeds.get(&(1, 0)).copied().unwrap_or(Feed::Bye),
    };

    builder.add(BracketSide::GrandFinal, 1, 0, winners_champion, losers_champion);
    let game_two_id = builder.next_id();

    let matches = builder.matches;
    let game_one = matches
        .iter()
        .find(|m| m.side == BracketSide::GrandFinal)
        .cloned()
        .ok_or_else(|| BracketError::InvalidInput("no grand final could be built".to_string()))?;

    let bracket = Bracket {
        teams: teams.iter().map(|t| t.id).collect(),
        size,
        winners: into_rounds(&matches, BracketSide::Winners),
        losers: into_rounds(&matches, BracketSide::Losers),
        grand_final: GrandFinal {
            game_one,
            game_two: None,
            game_two_id,
        },
    };
    log::debug!(
        "Generated bracket: {} teams, size {}, {} matches",
        teams.len(),
        size,
        matches.len()
    );
    Ok(bracket)
}

impl Bracket {
    /// Record the winner of a match and move both teams on.
    ///
    /// Re-submitting the recorded winner is a no-op. All checks run before anything changes.
    pub fn record_result(&mut self, match_id: MatchId, winner: TeamId) -> Result<(), BracketError> {
        let m = self
            .get_match(match_id)
            .ok_or(BracketError::UnknownMatch(match_id))?;
        if !m.has_team(winner) {
            log::warn!("Rejected result for match {}: team is not in the match", match_id);
            return Err(BracketError::InvalidWinner {
                match_id,
                team_id: winner,
            });
        }
        match m.status {
            MatchStatus::Completed => {
                return match m.winner {
                    Some(prev) if prev == winner => Ok(()),
                    Some(prev) => {
                        log::warn!("Rejected result for match {}: already decided", match_id);
                        Err(BracketError::AlreadyDecided {
                            match_id,
                            winner: prev,
                        })
                    }
                    None => Err(BracketError::NotReady(match_id)),
                };
            }
            MatchStatus::Pending => return Err(BracketError::NotReady(match_id)),
            MatchStatus::Ready | MatchStatus::InProgress => {}
        }
        let loser = m
            .opponent_of(winner)
            .ok_or(BracketError::NotReady(match_id))?;
        let (winner_to, loser_to) = (m.winner_to, m.loser_to);

        if let Some(m) = self.get_match_mut(match_id) {
            m.winner = Some(winner);
            m.status = MatchStatus::Completed;
        }
        if let Some(to) = winner_to {
            self.advance(to, winner);
        }
        if let Some(to) = loser_to {
            self.advance(to, loser);
        }
        log::debug!(
            "Match {}: seed {:?} beat seed {:?}",
            match_id,
            self.seed_of(winner),
            self.seed_of(loser)
        );

        let game_one = &self.grand_final.game_one;
        if match_id == game_one.id && game_one.team_2 == Some(winner) {
            let mut game_two = BracketMatch::new(
                self.grand_final.game_two_id,
                BracketSide::GrandFinal,
                2,
                0,
            );
            game_two.fill(Slot::One, loser);
            game_two.fill(Slot::Two, winner);
            self.grand_final.game_two = Some(game_two);
            log::info!("Grand final reset: losers-bracket champion took game one");
        }

        if let Some(champion) = self.champion() {
            log::info!("Champion decided: seed {:?}", self.seed_of(champion));
        }
        Ok(())
    }

    /// Put a ready match on court (Ready -> InProgress). Starting it twice is a no-op.
    pub fn start_match(&mut self, match_id: MatchId) -> Result<(), BracketError> {
        let m = self
            .get_match_mut(match_id)
            .ok_or(BracketError::UnknownMatch(match_id))?;
        match m.status {
            MatchStatus::Ready => {
                m.status = MatchStatus::InProgress;
                Ok(())
            }
            MatchStatus::InProgress => Ok(()),
            MatchStatus::Pending | MatchStatus::Completed => Err(BracketError::NotReady(match_id)),
        }
    }

    /// Matches that can be put on court or are being played, in program order.
    pub fn playable_matches(&self) -> Vec<&BracketMatch> {
        self.matches()
            .filter(|m| matches!(m.status, MatchStatus::Ready | MatchStatus::InProgress))
            .collect()
    }

    fn advance(&mut self, to: SlotRef, team: TeamId) {
        if let Some(m) = self.get_match_mut(to.match_id) {
            m.fill(to.slot, team);
        }
    }
}

/// Record a result on a copy of the bracket; the input is left untouched.
pub fn record_result(
    bracket: &Bracket,
    match_id: MatchId,
    winner: TeamId,
) -> Result<Bracket, BracketError> {
    let mut next = bracket.clone();
    next.record_result(match_id, winner)?;
    Ok(next)
}

/// Start a match on a copy of the bracket.
pub fn start_match(bracket: &Bracket, match_id: MatchId) -> Result<Bracket, BracketError> {
    let mut next = bracket.clone();
    next.start_match(match_id)?;
    Ok(next)
}
