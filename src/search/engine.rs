//! Roster search: rank dojos (with their teams and members) against a query, and suggest names.

use crate::models::{Dojo, Member, Team};
use crate::search::policy::{AllWords, MatchPolicy};
use serde::Serialize;
use std::collections::HashSet;

/// Minimum field score for a match.
pub const DEFAULT_MIN_SCORE: f64 = 0.8;
/// Suggestions returned when the caller does not say.
pub const DEFAULT_MAX_SUGGESTIONS: usize = 5;

/// One dojo in the search results, with the teams to show under it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SearchResult {
    pub dojo: Dojo,
    pub teams: Vec<Team>,
    /// Best score of the dojo or anything in it.
    pub match_score: f64,
    /// Human-readable reasons, e.g. "team: Red" or "rank: 3 Dan (John Smith)".
    pub matched_fields: Vec<String>,
}

/// Best score and deduplicated reasons collected for one dojo.
#[derive(Default)]
struct Hits {
    score: f64,
    fields: Vec<String>,
    seen: HashSet<String>,
}

impl Hits {
    fn add(&mut self, score: f64, field: String) {
        self.score = self.score.max(score);
        if self.seen.insert(field.clone()) {
            self.fields.push(field);
        }
    }
}

/// Search with the default all-words policy.
pub fn search(
    dojos: &[Dojo],
    teams: &[Team],
    members: &[Member],
    query: &str,
    min_score: f64,
) -> Vec<SearchResult> {
    search_with(&AllWords, dojos, teams, members, query, min_score)
}

/// Search with an explicit match policy.
///
/// An empty query lists every dojo with all its teams at score 1. Otherwise a dojo is listed when
/// its name, a team name, or a member's name or rank matches; its team list holds the matching
/// teams, or all of its teams when the dojo name itself matched. Results are ordered by score,
/// ties in dojo order.
pub fn search_with<P: MatchPolicy + ?Sized>(
    policy: &P,
    dojos: &[Dojo],
    teams: &[Team],
    members: &[Member],
    query: &str,
    min_score: f64,
) -> Vec<SearchResult> {
    let query = query.trim();
    if query.is_empty() {
        return dojos
            .iter()
            .map(|d| SearchResult {
                dojo: d.clone(),
                teams: teams
                    .iter()
                    .filter(|t| t.dojo_id == Some(d.id))
                    .cloned()
                    .collect(),
                match_score: 1.0,
                matched_fields: Vec::new(),
            })
            .collect();
    }

    let mut results = Vec::new();
    for dojo in dojos {
        let mut hits = Hits::default();
        let dojo_score = policy.field_score(&dojo.name, query);
        let dojo_matched = dojo_score >= min_score;
        if dojo_matched {
            hits.add(dojo_score, format!("dojo: {}", dojo.name));
        }

        let dojo_teams: Vec<&Team> = teams.iter().filter(|t| t.dojo_id == Some(dojo.id)).collect();
        let mut matching_teams = Vec::new();
        for team in &dojo_teams {
            let mut team_matched = false;
            let team_score = policy.field_score(&team.name, query);
            if team_score >= min_score {
                hits.add(team_score, format!("team: {}", team.name));
                team_matched = true;
            }
            for member in members.iter().filter(|m| m.team_id() == Some(team.id)) {
                team_matched |= score_member(policy, member, query, min_score, &mut hits);
            }
            if team_matched {
                matching_teams.push((*team).clone());
            }
        }

        if dojo_matched || !matching_teams.is_empty() {
            let teams = if dojo_matched {
                dojo_teams.into_iter().cloned().collect()
            } else {
                matching_teams
            };
            results.push(SearchResult {
                dojo: dojo.clone(),
                teams,
                match_score: hits.score,
                matched_fields: hits.fields,
            });
        }
    }

    results.sort_by(|a, b| b.match_score.total_cmp(&a.match_score));
    log::debug!("Search {:?}: {} dojo(s) matched", query, results.len());
    results
}

/// Score a member's name and rank. Words may also be split across the two ("john 3 dan").
fn score_member<P: MatchPolicy + ?Sized>(
    policy: &P,
    member: &Member,
    query: &str,
    min_score: f64,
    hits: &mut Hits,
) -> bool {
    let rank = member.rank.label();
    let participant = format!("participant: {}", member.full_name);
    let rank_field = format!("rank: {} ({})", rank, member.full_name);

    let mut matched = false;
    let name_score = policy.field_score(&member.full_name, query);
    if name_score >= min_score {
        hits.add(name_score, participant.clone());
        matched = true;
    }
    let rank_score = policy.field_score(&rank, query);
    if rank_score >= min_score {
        hits.add(rank_score, rank_field.clone());
        matched = true;
    }
    if !matched {
        let combined = policy.field_score(&format!("{} {}", member.full_name, rank), query);
        if combined >= min_score {
            hits.add(combined, participant);
            hits.add(combined, rank_field);
            matched = true;
        }
    }
    matched
}

/// Autocomplete: dojo names, then team names, member names and rank labels containing the query.
///
/// Deduplicated, first occurrence wins, at most `max_suggestions`.
pub fn suggest(
    dojos: &[Dojo],
    teams: &[Team],
    members: &[Member],
    query: &str,
    max_suggestions: usize,
) -> Vec<String> {
    let query = query.to_lowercase();
    if query.is_empty() {
        return Vec::new();
    }
    let candidates = dojos
        .iter()
        .map(|d| d.name.clone())
        .chain(teams.iter().map(|t| t.name.clone()))
        .chain(members.iter().map(|m| m.full_name.clone()))
        .chain(members.iter().map(|m| m.rank.label()));

    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for candidate in candidates {
        if out.len() >= max_suggestions {
            break;
        }
        if candidate.to_lowercase().contains(&query) && seen.insert(candidate.clone()) {
            out.push(candidate);
        }
    }
    out
}
