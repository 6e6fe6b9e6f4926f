//! Seeding: bracket size, standard seed order, loser drop table, and seed ordering of teams.

use crate::models::{Slot, Team};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeMap;

/// Smallest power of two that holds `n` entrants (at least 2).
pub fn bracket_size(n: usize) -> u32 {
    n.max(2).next_power_of_two() as u32
}

/// Number of winners-bracket rounds for a bracket of `size`.
pub fn winners_rounds(size: u32) -> u32 {
    size.trailing_zeros()
}

/// Seed numbers in bracket line order for a power-of-two `size`.
///
/// Adjacent pairs are the round-1 matches: 1 vs size, then the pairing that keeps 1 and 2 apart
/// until the final, recursively (size 8 gives 1,8,4,5,2,7,3,6).
pub fn seed_positions(size: u32) -> Vec<u32> {
    let mut seeds = vec![1u32];
    while seeds.len() < size as usize {
        let n = seeds.len() as u32;
        let mut next = Vec::with_capacity(seeds.len() * 2);
        for seed in seeds.iter().copied() {
            next.push(seed);
            next.push(n * 2 + 1 - seed);
        }
        seeds = next;
    }
    seeds
}

/// Where the loser of a winners-bracket match enters the losers bracket.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct LoserDrop {
    pub round: u32,
    pub position: u32,
    pub slot: Slot,
}

/// Precomputed `(winners round, position) -> LoserDrop` map for one bracket size.
///
/// Round-1 losers pair up in losers round 1. Losers of winners round r >= 2 drop into slot Two of
/// losers round 2(r-1), in reversed order on even rounds so early opponents are kept apart. A
/// size-2 bracket has no losers bracket and an empty table.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LoserRoutingTable {
    size: u32,
    entries: BTreeMap<(u32, u32), LoserDrop>,
}

impl LoserRoutingTable {
    pub fn for_size(size: u32) -> Self {
        let rounds = winners_rounds(size);
        let mut entries = BTreeMap::new();
        if rounds >= 2 {
            for p in 0..size / 2 {
                let slot = if p % 2 == 0 { Slot::One } else { Slot::Two };
                entries.insert(
                    (1, p),
                    LoserDrop {
                        round: 1,
                        position: p / 2,
                        slot,
                    },
                );
            }
            for r in 2..=rounds {
                let count = size >> r;
                for p in 0..count {
                    let position = if r % 2 == 0 { count - 1 - p } else { p };
                    entries.insert(
                        (r, p),
                        LoserDrop {
                            round: 2 * (r - 1),
                            position,
                            slot: Slot::Two,
                        },
                    );
                }
            }
        }
        Self { size, entries }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn get(&self, winners_round: u32, position: u32) -> Option<LoserDrop> {
        self.entries.get(&(winners_round, position)).copied()
    }

    /// Number of losers-bracket rounds for this size.
    pub fn losers_rounds(&self) -> u32 {
        2 * winners_rounds(self.size).saturating_sub(1)
    }

    /// Matches in a losers round (1-based) before any bye collapse.
    pub fn losers_round_len(&self, round: u32) -> u32 {
        // Rounds 2k-1 and 2k both hold size / 2^(k+1) matches.
        let k = (round + 1) / 2;
        self.size >> (k + 1)
    }

    pub fn iter(&self) -> impl Iterator<Item = ((u32, u32), LoserDrop)> + '_ {
        self.entries.iter().map(|(k, v)| (*k, *v))
    }
}

/// Order teams for bracket generation: seed rank ascending, then unseeded teams in random order.
///
/// Ties on seed rank keep their input order.
pub fn seed_order<R: Rng + ?Sized>(teams: &[Team], rng: &mut R) -> Vec<Team> {
    let mut seeded: Vec<Team> = teams.iter().filter(|t| t.seed_rank.is_some()).cloned().collect();
    seeded.sort_by_key(|t| t.seed_rank);
    let mut unseeded: Vec<Team> = teams.iter().filter(|t| t.seed_rank.is_none()).cloned().collect();
    unseeded.shuffle(rng);
    seeded.extend(unseeded);
    seeded
}
