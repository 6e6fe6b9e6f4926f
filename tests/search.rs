//! Integration tests for roster search, suggestions, and highlighting.

use kendo_tournament_web::search::{
    highlight, search, search_with, suggest, AllWords, Similarity, DEFAULT_MIN_SCORE,
};
use kendo_tournament_web::{Dojo, Rank, Roster};

/// Two dojos, three teams, a handful of members.
fn sample_roster() -> Roster {
    let mut r = Roster::new();
    let goseikan = r.add_dojo("Goseikan", Some("Oslo".to_string())).unwrap();
    let mumeishi = r.add_dojo("Mumeishi", None).unwrap();
    let red = r.add_team("Goseikan Red", Some(goseikan)).unwrap();
    let white = r.add_team("Goseikan White", Some(goseikan)).unwrap();
    let blue = r.add_team("Blue Tigers", Some(mumeishi)).unwrap();
    for (name, rank, team) in [
        ("John Smith", Rank::Kyu(1), red),
        ("Aiko Tanaka", Rank::Dan(3), red),
        ("Lars Berg", Rank::Dan(1), white),
        ("Kenji Sato", Rank::Dan(3), blue),
        ("Maria Lopez", Rank::Mudansha, blue),
    ] {
        let id = r.add_member(name, rank).unwrap();
        r.assign_member(id, team).unwrap();
    }
    r
}

fn run(r: &Roster, query: &str) -> Vec<kendo_tournament_web::search::SearchResult> {
    search(&r.dojos, &r.teams, &r.members, query, DEFAULT_MIN_SCORE)
}

#[test]
fn empty_query_browses_everything() {
    let d1 = Dojo::new("Goseikan");
    let results = search(&[d1.clone()], &[], &[], "", DEFAULT_MIN_SCORE);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].dojo, d1);
    assert!(results[0].teams.is_empty());
    assert_eq!(results[0].match_score, 1.0);
    assert!(results[0].matched_fields.is_empty());

    let r = sample_roster();
    let results = run(&r, "   ");
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].teams.len(), 2);
    assert_eq!(results[1].teams.len(), 1);
}

#[test]
fn dojo_match_includes_all_its_teams() {
    let r = sample_roster();
    let results = run(&r, "goseikan");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].dojo.name, "Goseikan");
    assert_eq!(results[0].teams.len(), 2);
    assert_eq!(
        results[0].matched_fields,
        vec![
            "dojo: Goseikan".to_string(),
            "team: Goseikan Red".to_string(),
            "team: Goseikan White".to_string(),
        ]
    );
}

#[test]
fn member_match_includes_only_their_team() {
    let r = sample_roster();
    let results = run(&r, "tanaka");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].dojo.name, "Goseikan");
    let team_names: Vec<_> = results[0].teams.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(team_names, vec!["Goseikan Red"]);
    assert_eq!(results[0].matched_fields, vec!["participant: Aiko Tanaka".to_string()]);
}

#[test]
fn rank_matches_across_dojos() {
    let r = sample_roster();
    let results = run(&r, "3 dan");
    assert_eq!(results.len(), 2);
    // "3" is a single character and is not required, so every rank containing "dan" matches.
    assert_eq!(
        results[0].matched_fields,
        vec![
            "rank: 3 Dan (Aiko Tanaka)".to_string(),
            "rank: 1 Dan (Lars Berg)".to_string(),
        ]
    );
    assert_eq!(
        results[1].matched_fields,
        vec![
            "rank: 3 Dan (Kenji Sato)".to_string(),
            "rank: Mudansha (Maria Lopez)".to_string(),
        ]
    );
}

#[test]
fn every_word_must_be_found() {
    let r = sample_roster();
    // John Smith is 1 Kyu, so "dan" is found nowhere on him.
    assert!(run(&r, "john 3 dan").is_empty());
    assert!(run(&r, "smith tanaka").is_empty());
    // Word order does not matter.
    assert_eq!(run(&r, "smith john").len(), 1);
}

#[test]
fn words_may_span_name_and_rank() {
    let mut r = sample_roster();
    let team = r.teams[0].id;
    let id = r.add_member("John Doe", Rank::Dan(3)).unwrap();
    r.assign_member(id, team).unwrap();

    let results = run(&r, "john 3 dan");
    assert_eq!(results.len(), 1);
    assert_eq!(
        results[0].matched_fields,
        vec![
            "participant: John Doe".to_string(),
            "rank: 3 Dan (John Doe)".to_string(),
        ]
    );
}

#[test]
fn matched_fields_are_deduplicated() {
    let mut r = sample_roster();
    let team = r.teams[2].id;
    let id = r.add_member("Kenji Sato", Rank::Dan(3)).unwrap();
    r.assign_member(id, team).unwrap();
    let results = run(&r, "kenji");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].matched_fields, vec!["participant: Kenji Sato".to_string()]);
}

#[test]
fn no_match_gives_no_results() {
    let r = sample_roster();
    assert!(run(&r, "zzz").is_empty());
    assert!(run(&r, "x y").is_empty());
}

#[test]
fn similarity_policy_is_selectable() {
    let r = sample_roster();
    let strict = search_with(&AllWords, &r.dojos, &r.teams, &r.members, "mumeisi", 0.8);
    assert!(strict.is_empty());
    let fuzzy = search_with(&Similarity, &r.dojos, &r.teams, &r.members, "mumeisi", 0.8);
    assert_eq!(fuzzy.len(), 1);
    assert_eq!(fuzzy[0].dojo.name, "Mumeishi");
    assert!(fuzzy[0].match_score < 1.0);
}

#[test]
fn results_sorted_by_score_keeping_dojo_order_on_ties() {
    let r = sample_roster();
    let fuzzy = search_with(&Similarity, &r.dojos, &r.teams, &r.members, "goseikan", 0.5);
    for pair in fuzzy.windows(2) {
        assert!(pair[0].match_score >= pair[1].match_score);
    }
    let strict = run(&r, "dan");
    let names: Vec<_> = strict.iter().map(|s| s.dojo.name.as_str()).collect();
    assert_eq!(names, vec!["Goseikan", "Mumeishi"]);
}

#[test]
fn suggest_collects_in_category_order() {
    let r = sample_roster();
    assert_eq!(
        suggest(&r.dojos, &r.teams, &r.members, "gos", 5),
        vec!["Goseikan", "Goseikan Red", "Goseikan White"]
    );
    assert_eq!(
        suggest(&r.dojos, &r.teams, &r.members, "dan", 5),
        vec!["3 Dan", "1 Dan", "Mudansha"]
    );
    assert!(suggest(&r.dojos, &r.teams, &r.members, "", 5).is_empty());
}

#[test]
fn suggest_keeps_spaces_in_the_query() {
    let r = sample_roster();
    // The leading space rules out "Mudansha".
    assert_eq!(
        suggest(&r.dojos, &r.teams, &r.members, " dan", 5),
        vec!["3 Dan", "1 Dan"]
    );
    assert_eq!(
        suggest(&r.dojos, &r.teams, &r.members, " ", 2),
        vec!["Goseikan Red", "Goseikan White"]
    );
}

#[test]
fn suggest_truncates_and_deduplicates() {
    let mut r = sample_roster();
    r.add_member("Kenji Sato", Rank::Dan(3)).unwrap();
    let all = suggest(&r.dojos, &r.teams, &r.members, "a", 100);
    let unique: std::collections::HashSet<_> = all.iter().collect();
    assert_eq!(unique.len(), all.len());
    assert_eq!(all.iter().filter(|s| *s == "Kenji Sato").count(), 1);

    let two = suggest(&r.dojos, &r.teams, &r.members, "a", 2);
    assert_eq!(two, all[..2].to_vec());
}

#[test]
fn highlight_wraps_matches() {
    assert_eq!(highlight("3 Dan", "dan"), "3 <mark>Dan</mark>");
    assert_eq!(highlight("abc", ""), "abc");
    assert_eq!(
        highlight("Goseikan Red", "red goseikan"),
        "<mark>Goseikan</mark> <mark>Red</mark>"
    );
    assert_eq!(highlight("a.b", ".*"), "a.b");
}
