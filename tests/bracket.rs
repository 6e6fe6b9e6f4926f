//! Integration tests for bracket generation, result recording, and the grand final.

use kendo_tournament_web::{
    generate, record_result, start_match, summarize, Bracket, BracketError, BracketSide,
    GrandFinalGame, MatchStatus, Slot, SlotRef, Team, TeamId,
};
use std::collections::HashSet;

fn seeded_teams(n: u32) -> Vec<Team> {
    (1..=n)
        .map(|i| Team::new(format!("T{i}"), None).with_seed(i))
        .collect()
}

fn assert_invariants(b: &Bracket) {
    for m in b.matches() {
        let both = m.team_1.is_some() && m.team_2.is_some();
        match m.status {
            MatchStatus::Pending => assert!(!both, "match {} pending with both teams", m.id),
            MatchStatus::Ready | MatchStatus::InProgress => {
                assert!(both, "match {} ready without both teams", m.id);
                assert!(m.winner.is_none());
            }
            MatchStatus::Completed => {
                let w = m.winner.expect("completed match has a winner");
                assert!(m.has_team(w));
            }
        }
        for t in [m.team_1, m.team_2].into_iter().flatten() {
            assert!(b.teams.contains(&t));
        }
    }
}

/// Play every playable match in program order, letting `pick` choose the winner.
fn play_out(mut b: Bracket, pick: impl Fn(&Bracket, TeamId, TeamId) -> TeamId) -> Bracket {
    for _ in 0..1000 {
        let next = b
            .playable_matches()
            .first()
            .map(|m| (m.id, m.team_1.unwrap(), m.team_2.unwrap()));
        let Some((id, t1, t2)) = next else {
            return b;
        };
        let winner = pick(&b, t1, t2);
        b.record_result(id, winner).unwrap();
        assert_invariants(&b);
    }
    panic!("bracket did not finish");
}

fn higher_seed(b: &Bracket, x: TeamId, y: TeamId) -> TeamId {
    if b.seed_of(x) < b.seed_of(y) {
        x
    } else {
        y
    }
}

fn lower_seed(b: &Bracket, x: TeamId, y: TeamId) -> TeamId {
    if b.seed_of(x) > b.seed_of(y) {
        x
    } else {
        y
    }
}

#[test]
fn generate_requires_two_teams() {
    assert!(matches!(
        generate(&seeded_teams(1)),
        Err(BracketError::InvalidInput(_))
    ));
    assert!(matches!(generate(&[]), Err(BracketError::InvalidInput(_))));
}

#[test]
fn generate_rejects_duplicate_teams() {
    let mut teams = seeded_teams(3);
    teams.push(teams[0].clone());
    assert!(matches!(generate(&teams), Err(BracketError::InvalidInput(_))));
}

#[test]
fn power_of_two_round_one_pairs_i_with_n_plus_one_minus_i() {
    let b = generate(&seeded_teams(8)).unwrap();
    assert_eq!(b.size, 8);
    assert_eq!(b.winners.len(), 3);
    assert_eq!(b.losers.len(), 4);
    assert_eq!(b.winners[0].len(), 4);
    for m in &b.winners[0] {
        assert_eq!(m.status, MatchStatus::Ready);
        let s1 = b.seed_of(m.team_1.unwrap()).unwrap();
        let s2 = b.seed_of(m.team_2.unwrap()).unwrap();
        assert_eq!(s1 + s2, 9);
    }
    for m in b.matches().filter(|m| !(m.side == BracketSide::Winners && m.round == 1)) {
        assert_eq!(m.status, MatchStatus::Pending);
        assert_eq!((m.team_1, m.team_2), (None, None));
    }
    assert_invariants(&b);
}

#[test]
fn top_seeds_get_byes() {
    let b = generate(&seeded_teams(5)).unwrap();
    assert_eq!(b.size, 8);
    // Only 4 vs 5 is played in round 1.
    assert_eq!(b.winners[0].len(), 1);
    let m = &b.winners[0][0];
    assert_eq!(b.seed_of(m.team_1.unwrap()), Some(4));
    assert_eq!(b.seed_of(m.team_2.unwrap()), Some(5));

    // Seed 1 waits in round 2; seeds 2 and 3 both had byes and meet straight away.
    let round_two = &b.winners[1];
    assert_eq!(round_two.len(), 2);
    assert_eq!(b.seed_of(round_two[0].team_1.unwrap()), Some(1));
    assert_eq!(round_two[0].status, MatchStatus::Pending);
    assert_eq!(b.seed_of(round_two[1].team_1.unwrap()), Some(2));
    assert_eq!(b.seed_of(round_two[1].team_2.unwrap()), Some(3));
    assert_eq!(round_two[1].status, MatchStatus::Ready);
    assert_invariants(&b);
}

#[test]
fn every_field_size_plays_out_with_n_minus_one_eliminations() {
    for n in 2..=17 {
        let teams = seeded_teams(n);
        let b = play_out(generate(&teams).unwrap(), higher_seed);
        assert_eq!(b.champion(), Some(teams[0].id), "n = {n}");
        assert_eq!(b.grand_final.game(), GrandFinalGame::One);

        let eliminated = b.eliminated();
        assert_eq!(eliminated.len(), n as usize - 1, "n = {n}");
        let unique: HashSet<_> = eliminated.iter().collect();
        assert_eq!(unique.len(), eliminated.len());
        assert!(!unique.contains(&teams[0].id));
        assert!(b.matches().all(|m| m.status == MatchStatus::Completed));
        assert_eq!(b.teams_remaining(), 1);
    }
}

#[test]
fn upsets_still_finish_with_one_champion() {
    for n in 2..=12 {
        let b = play_out(generate(&seeded_teams(n)).unwrap(), lower_seed);
        let champion = b.champion().expect("champion decided");
        let eliminated = b.eliminated();
        assert_eq!(eliminated.len(), n as usize - 1, "n = {n}");
        assert!(!eliminated.contains(&champion));
        assert!(b.playable_matches().is_empty());
        assert!(b.matches().all(|m| m.status == MatchStatus::Completed));
    }
}

#[test]
fn a_team_is_eliminated_only_after_two_losses() {
    let teams = seeded_teams(8);
    let b = play_out(generate(&teams).unwrap(), lower_seed);
    let champion = b.champion().unwrap();
    for t in &teams {
        let losses = b
            .matches()
            .filter(|m| m.status == MatchStatus::Completed && m.loser() == Some(t.id))
            .count();
        if t.id == champion {
            assert!(losses <= 1);
        } else {
            assert_eq!(losses, 2, "{} lost {} time(s)", t.name, losses);
        }
    }
}

#[test]
fn round_one_losers_drop_into_losers_round_one() {
    let teams = seeded_teams(8);
    let b = generate(&teams).unwrap();
    let first = b.winners[0][0].clone();
    let second = b.winners[0][1].clone();
    let lr1 = &b.losers[0][0];
    assert_eq!(first.loser_to, Some(SlotRef { match_id: lr1.id, slot: Slot::One }));
    assert_eq!(second.loser_to, Some(SlotRef { match_id: lr1.id, slot: Slot::Two }));

    let b = record_result(&b, first.id, first.team_1.unwrap()).unwrap();
    let b = record_result(&b, second.id, second.team_1.unwrap()).unwrap();
    let lr1 = b.get_match(lr1.id).unwrap();
    assert_eq!(lr1.team_1, first.team_2);
    assert_eq!(lr1.team_2, second.team_2);
    assert_eq!(lr1.status, MatchStatus::Ready);
}

#[test]
fn record_result_is_idempotent_for_the_same_winner() {
    let b = generate(&seeded_teams(4)).unwrap();
    let m = b.winners[0][0].clone();
    let (a, z) = (m.team_1.unwrap(), m.team_2.unwrap());
    let once = record_result(&b, m.id, a).unwrap();
    let twice = record_result(&once, m.id, a).unwrap();
    assert_eq!(once, twice);
    assert_eq!(
        record_result(&twice, m.id, z),
        Err(BracketError::AlreadyDecided {
            match_id: m.id,
            winner: a
        })
    );
}

#[test]
fn record_result_validates_before_changing_anything() {
    let teams = seeded_teams(4);
    let b = generate(&teams).unwrap();
    let m = b.winners[0][0].clone();
    let outsider = b.winners[0][1].team_1.unwrap();

    assert_eq!(
        record_result(&b, 999, outsider),
        Err(BracketError::UnknownMatch(999))
    );
    assert_eq!(
        record_result(&b, m.id, outsider),
        Err(BracketError::InvalidWinner {
            match_id: m.id,
            team_id: outsider
        })
    );

    // Winners final has no teams yet.
    let final_id = b.winners[1][0].id;
    assert!(matches!(
        record_result(&b, final_id, teams[0].id),
        Err(BracketError::InvalidWinner { .. })
    ));

    // One slot filled is still not playable.
    let b = record_result(&b, m.id, m.team_1.unwrap()).unwrap();
    assert_eq!(
        record_result(&b, final_id, m.team_1.unwrap()),
        Err(BracketError::NotReady(final_id))
    );
}

#[test]
fn record_result_leaves_the_input_untouched() {
    let b = generate(&seeded_teams(4)).unwrap();
    let before = b.clone();
    let m = &b.winners[0][0];
    let after = record_result(&b, m.id, m.team_1.unwrap()).unwrap();
    assert_eq!(b, before);
    assert_ne!(after, before);
}

#[test]
fn start_match_puts_ready_match_on_court() {
    let b = generate(&seeded_teams(4)).unwrap();
    let m = b.winners[0][0].clone();
    let b = start_match(&b, m.id).unwrap();
    assert_eq!(b.get_match(m.id).unwrap().status, MatchStatus::InProgress);
    let b = start_match(&b, m.id).unwrap();
    let b = record_result(&b, m.id, m.team_2.unwrap()).unwrap();
    assert_eq!(b.get_match(m.id).unwrap().status, MatchStatus::Completed);

    assert_eq!(start_match(&b, m.id), Err(BracketError::NotReady(m.id)));
    let final_id = b.winners[1][0].id;
    assert_eq!(start_match(&b, final_id), Err(BracketError::NotReady(final_id)));
    assert_eq!(start_match(&b, 999), Err(BracketError::UnknownMatch(999)));
}

#[test]
fn grand_final_reset_when_losers_champion_wins_game_one() {
    let teams = seeded_teams(2);
    let (a, z) = (teams[0].id, teams[1].id);
    let mut b = generate(&teams).unwrap();
    assert!(b.losers.is_empty());
    let opener = b.winners[0][0].id;
    b.record_result(opener, a).unwrap();

    let gf = b.grand_final.game_one.clone();
    assert_eq!((gf.team_1, gf.team_2), (Some(a), Some(z)));
    assert_eq!(gf.status, MatchStatus::Ready);

    b.record_result(gf.id, z).unwrap();
    assert_eq!(b.grand_final.game(), GrandFinalGame::Two);
    assert_eq!(b.champion(), None);
    assert_eq!(b.teams_remaining(), 2);
    let game_two = b.grand_final.game_two.clone().unwrap();
    assert_eq!(game_two.id, b.grand_final.game_two_id);
    assert_eq!(game_two.status, MatchStatus::Ready);
    assert!(game_two.has_team(a) && game_two.has_team(z));

    // Re-submitting game one does not open another game.
    b.record_result(gf.id, z).unwrap();
    assert_eq!(b.grand_final.game_two.as_ref().unwrap().id, game_two.id);

    b.record_result(game_two.id, a).unwrap();
    assert_eq!(b.champion(), Some(a));
    assert_eq!(b.eliminated(), vec![z]);
    assert_eq!(b.teams_remaining(), 1);
}

#[test]
fn grand_final_without_reset() {
    let teams = seeded_teams(2);
    let mut b = generate(&teams).unwrap();
    b.record_result(b.winners[0][0].id, teams[0].id).unwrap();
    b.record_result(b.grand_final.game_one.id, teams[0].id).unwrap();
    assert_eq!(b.grand_final.game(), GrandFinalGame::One);
    assert_eq!(b.champion(), Some(teams[0].id));
    assert_eq!(b.eliminated(), vec![teams[1].id]);
}

#[test]
fn summary_tracks_remaining_teams() {
    let teams = seeded_teams(4);
    let b = generate(&teams).unwrap();
    let s = summarize(&b);
    assert_eq!(s.teams_remaining, 4);
    assert_eq!(s.playable.len(), 2);
    assert_eq!(s.champion, None);

    let b = play_out(b, higher_seed);
    let s = summarize(&b);
    assert_eq!(s.teams_remaining, 1);
    assert_eq!(s.eliminated.len(), 3);
    assert_eq!(s.champion, Some(teams[0].id));
    assert_eq!(s.teams_remaining, b.teams_remaining());
    assert!(s.playable.is_empty());
    assert_eq!(s.grand_final_game, GrandFinalGame::One);
}
