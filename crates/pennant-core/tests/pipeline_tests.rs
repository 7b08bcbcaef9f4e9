// End-to-end tests for the aggregation & ranking pipeline.
//
// Payloads mirror the stats service's JSON shapes and run through the public
// API: feed parsing, run aggregation, normalization, snapshots, scoring.

use std::collections::BTreeMap;

use chrono::{NaiveDate, TimeZone, Utc};
use serde_json::{json, Value};

use pennant_core::feed::{RawSchedule, RawStandings};
use pennant_core::quarters::QuarterWindow;
use pennant_core::runs::{self, CompletionStatus, GameResult, TeamRunStats};
use pennant_core::scoring::{Participant, TierPicks};
use pennant_core::teams::TeamDirectory;
use pennant_core::{run, PipelineError, PipelineInputs, SyncResult};

// ===========================================================================
// Fixtures
// ===========================================================================

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// Four-team directory: A=1, B=2, C=3, D=4.
fn directory() -> TeamDirectory {
    TeamDirectory::new([(1, "A"), (2, "B"), (3, "C"), (4, "D")]).unwrap()
}

fn standings_payload() -> Value {
    json!({
        "records": [
            { "teamRecords": [
                { "team": { "id": 1, "name": "Alphas" },
                  "leagueRecord": { "wins": 10, "losses": 5, "pct": ".667" } },
                { "team": { "id": 2, "name": "Bravos" },
                  "leagueRecord": { "wins": 8, "losses": 7, "pct": ".533" } }
            ]},
            { "teamRecords": [
                { "team": { "id": 3, "name": "Charlies" },
                  "leagueRecord": { "wins": 5, "losses": 10, "pct": ".333" } },
                { "team": { "id": 4, "name": "Deltas" },
                  "leagueRecord": { "wins": 0, "losses": 0, "pct": ".000" } },
                { "team": { "id": 999, "name": "Exhibition Club" },
                  "leagueRecord": { "wins": 1, "losses": 0, "pct": "1.000" } }
            ]}
        ]
    })
}

fn game(away: u32, home: u32, away_score: Option<u32>, home_score: Option<u32>, code: &str) -> Value {
    json!({
        "status": { "statusCode": code },
        "teams": {
            "away": { "team": { "id": away }, "score": away_score },
            "home": { "team": { "id": home }, "score": home_score }
        }
    })
}

fn schedule_payload() -> Value {
    json!({
        "dates": [
            { "date": "2025-04-01", "games": [
                game(1, 2, Some(5), Some(2), "F"),
                game(3, 1, Some(1), Some(4), "F")
            ]},
            { "date": "2025-04-02", "games": [
                game(2, 3, Some(6), Some(6), "F"),
                game(1, 999, Some(9), Some(0), "F"),
                game(3, 2, None, None, "DR")
            ]},
            { "date": "2025-04-03", "games": [
                game(2, 1, Some(3), None, "F"),
                game(1, 3, Some(7), Some(2), "I")
            ]}
        ]
    })
}

fn picks(teams: &[&str]) -> TierPicks {
    let slot = |i: usize| teams.get(i).map(|t| t.to_string());
    TierPicks {
        tier1: slot(0),
        tier2: slot(1),
        tier3: slot(2),
        tier4: slot(3),
    }
}

fn participant(id: &str, quarter_picks: &[(&str, &[&str])]) -> Participant {
    Participant {
        id: id.to_string(),
        name: format!("Player {id}"),
        quarters: quarter_picks
            .iter()
            .map(|(q, teams)| (q.to_string(), picks(teams)))
            .collect(),
    }
}

fn participants() -> Vec<Participant> {
    vec![
        participant("casey", &[("Q1", &["A", "B"]), ("Q2", &["C"])]),
        participant("sam", &[("Q1", &["C", "D"])]),
        participant("jo", &[("Q1", &["B", "A"])]),
        participant("lee", &[("Q2", &["A"])]),
        participant("ari", &[("Q1", &["A", "NOPE"])]),
    ]
}

fn quarter_windows() -> BTreeMap<String, QuarterWindow> {
    let mut m = BTreeMap::new();
    for (name, start, end) in [
        ("Q1", "2025-03-27", "2025-05-10"),
        ("Q2", "2025-05-11", "2025-06-25"),
        ("Q3", "2025-06-26", "2025-08-10"),
        ("Q4", "2025-08-11", "2025-09-28"),
    ] {
        m.insert(
            name.to_string(),
            QuarterWindow {
                start_date: date(start),
                end_date: date(end),
            },
        );
    }
    m
}

/// Run the full pipeline over the fixtures with the given reference date.
fn run_fixture(reference_date: &str, participants: &[Participant]) -> SyncResult {
    let standings = RawStandings::from_value(&standings_payload());
    let schedule = RawSchedule::from_value(&schedule_payload());
    let quarters = quarter_windows();
    let teams = directory();
    let inputs = PipelineInputs {
        season: 2025,
        standings: &standings,
        schedule: &schedule,
        participants,
        quarters: &quarters,
        teams: &teams,
        reference_date: date(reference_date),
    };
    run(&inputs, Utc.with_ymd_and_hms(2025, 5, 20, 12, 0, 0).unwrap()).expect("pipeline should succeed")
}

fn final_game(away: u32, home: u32, away_score: u32, home_score: u32) -> GameResult {
    GameResult {
        away_team_id: away,
        home_team_id: home,
        away_score: Some(away_score),
        home_score: Some(home_score),
        status: CompletionStatus::Final,
    }
}

// ===========================================================================
// Run aggregation properties
// ===========================================================================

#[test]
fn one_game_example() {
    let stats = runs::aggregate(&[final_game(1, 2, 5, 2)], &directory());
    assert_eq!(
        stats["A"],
        TeamRunStats {
            runs_scored: 5,
            runs_allowed: 2,
            games_played: 1
        }
    );
    assert_eq!(
        stats["B"],
        TeamRunStats {
            runs_scored: 2,
            runs_allowed: 5,
            games_played: 1
        }
    );
}

#[test]
fn aggregation_is_order_independent() {
    let games = vec![
        final_game(1, 2, 5, 2),
        final_game(3, 1, 1, 4),
        final_game(2, 3, 6, 6),
        final_game(4, 2, 0, 11),
        final_game(1, 4, 3, 8),
    ];
    let baseline = runs::aggregate(&games, &directory());

    let mut reversed = games.clone();
    reversed.reverse();
    assert_eq!(runs::aggregate(&reversed, &directory()), baseline);

    for shift in 1..games.len() {
        let mut rotated = games.clone();
        rotated.rotate_left(shift);
        assert_eq!(runs::aggregate(&rotated, &directory()), baseline, "rotation {shift}");
    }

    let mut interleaved: Vec<GameResult> = games.iter().step_by(2).cloned().collect();
    interleaved.extend(games.iter().skip(1).step_by(2).cloned());
    assert_eq!(runs::aggregate(&interleaved, &directory()), baseline);
}

#[test]
fn total_runs_scored_equals_total_runs_allowed() {
    let games = RawSchedule::from_value(&schedule_payload()).games();
    let stats = runs::aggregate(&games, &directory());
    let scored: u32 = stats.values().map(|s| s.runs_scored).sum();
    let allowed: u32 = stats.values().map(|s| s.runs_allowed).sum();
    assert_eq!(scored, allowed);
}

#[test]
fn only_final_games_with_known_teams_count() {
    let games = RawSchedule::from_value(&schedule_payload()).games();
    let stats = runs::aggregate(&games, &directory());

    // Counted: 1@2 5-2, 3@1 1-4, 2@3 6-6, 2@1 3-(none). The game against 999,
    // the postponed game and the in-progress game are ignored.
    assert_eq!(
        stats["A"],
        TeamRunStats {
            runs_scored: 5 + 4,
            runs_allowed: 2 + 1 + 3,
            games_played: 3
        }
    );
    assert_eq!(stats["B"].games_played, 3);
    assert_eq!(stats["C"].games_played, 2);
    assert!(!stats.contains_key("D"));
}

// ===========================================================================
// Normalization and snapshots
// ===========================================================================

#[test]
fn team_records_merge_runs_and_drop_unknown_teams() {
    let result = run_fixture("2025-05-20", &participants());
    assert_eq!(result.teams.len(), 4);

    let a = &result.teams["A"];
    assert_eq!(a.name, "Alphas");
    assert_eq!(a.wins, 10);
    assert_eq!(a.runs_scored, 9);
    assert_eq!(a.games_played, 3);
    assert_eq!(a.runs_per_game, 3.0);
    assert!((a.win_pct - 0.667).abs() < 1e-9);

    // (2 + 3 + 6) runs over 3 games = 3.666... -> 3.67
    assert_eq!(result.teams["B"].runs_per_game, 3.67);
}

#[test]
fn runs_per_game_is_zero_without_games() {
    let result = run_fixture("2025-05-20", &participants());
    for record in result.teams.values().filter(|r| r.games_played == 0) {
        assert_eq!(record.runs_per_game, 0.0, "{}", record.abbreviation);
    }
    assert_eq!(result.teams["D"].games_played, 0);
}

#[test]
fn snapshots_follow_reference_date() {
    let result = run_fixture("2025-05-20", &participants());
    assert_eq!(result.quarterly_stats.len(), 4);
    for quarter in ["Q1", "Q2"] {
        let snap = &result.quarterly_stats[quarter];
        assert_eq!(snap.len(), result.teams.len(), "{quarter}");
        assert_eq!(snap["A"].runs_scored, result.teams["A"].runs_scored);
    }
    assert!(result.quarterly_stats["Q3"].is_empty());
    assert!(result.quarterly_stats["Q4"].is_empty());

    let preseason = run_fixture("2025-03-01", &participants());
    assert!(preseason.quarterly_stats.values().all(|snap| snap.is_empty()));
}

// ===========================================================================
// Scoring and ranking
// ===========================================================================

#[test]
fn participants_without_picks_are_absent() {
    let result = run_fixture("2025-05-20", &participants());
    let q1 = &result.player_scores["Q1"];
    let q2 = &result.player_scores["Q2"];

    assert!(!q1.contains_key("lee"));
    assert!(q2.contains_key("lee"));
    assert!(!q2.contains_key("sam"));
    assert!(result.player_scores["Q3"].is_empty());
}

#[test]
fn composite_win_pct_example() {
    let result = run_fixture("2025-05-20", &participants());
    let casey = &result.player_scores["Q1"]["casey"];
    assert_eq!(casey.teams, vec!["A", "B"]);
    assert_eq!(casey.combined_win_pct, 0.6);
    // (9 + 11) runs over 30 estimated games
    assert_eq!(casey.combined_runs_per_game, 0.67);
}

#[test]
fn unknown_roster_teams_are_dropped() {
    let result = run_fixture("2025-05-20", &participants());
    let ari = &result.player_scores["Q1"]["ari"];
    assert_eq!(ari.teams, vec!["A"]);
    assert_eq!(ari.combined_win_pct, 0.667);
}

#[test]
fn identical_composites_keep_roster_order() {
    let result = run_fixture("2025-05-20", &participants());
    let q1 = &result.player_scores["Q1"];
    // casey and jo picked the same two teams; casey is listed first.
    assert_eq!(q1["ari"].rank, 1);
    assert_eq!(q1["casey"].rank, 2);
    assert_eq!(q1["jo"].rank, 3);
    assert_eq!(q1["sam"].rank, 4);

    let mut swapped = participants();
    swapped.swap(0, 2);
    let result = run_fixture("2025-05-20", &swapped);
    assert_eq!(result.player_scores["Q1"]["jo"].rank, 2);
    assert_eq!(result.player_scores["Q1"]["casey"].rank, 3);
}

#[test]
fn ranks_are_a_dense_permutation() {
    let result = run_fixture("2025-05-20", &participants());
    for (quarter, scores) in &result.player_scores {
        let mut ranks: Vec<usize> = scores.values().map(|s| s.rank).collect();
        ranks.sort_unstable();
        let expected: Vec<usize> = (1..=scores.len()).collect();
        assert_eq!(ranks, expected, "{quarter}");
    }
}

#[test]
fn leaders_are_rank_one_entries() {
    let result = run_fixture("2025-05-20", &participants());
    let leaders = result.leaders();
    assert_eq!(leaders.len(), 2);
    assert_eq!(leaders[0].0, "Q1");
    assert_eq!(leaders[0].1.name, "Player ari");
}

// ===========================================================================
// Whole-pipeline properties
// ===========================================================================

#[test]
fn rerun_is_identical() {
    let first = serde_json::to_string(&run_fixture("2025-05-20", &participants())).unwrap();
    let second = serde_json::to_string(&run_fixture("2025-05-20", &participants())).unwrap();
    assert_eq!(first, second);
}

#[test]
fn result_serializes_with_camel_case_keys() {
    let value = serde_json::to_value(run_fixture("2025-05-20", &participants())).unwrap();
    assert_eq!(value["season"], 2025);
    assert!(value["lastUpdated"].is_string());
    assert_eq!(value["teams"]["A"]["runsPerGame"], 3.0);
    assert_eq!(value["quarterlyStats"]["Q1"]["B"]["winPct"], 0.533);
    assert_eq!(value["playerScores"]["Q1"]["casey"]["combinedWinPct"], 0.6);
    assert_eq!(value["playerScores"]["Q1"]["casey"]["rank"], 2);
    assert_eq!(value["quarterlyStats"]["Q4"], json!({}));
}

#[test]
fn empty_payloads_produce_empty_tables() {
    let standings = RawStandings::from_value(&json!({}));
    let schedule = RawSchedule::from_value(&json!({}));
    let quarters = quarter_windows();
    let teams = directory();
    let roster = participants();
    let inputs = PipelineInputs {
        season: 2025,
        standings: &standings,
        schedule: &schedule,
        participants: &roster,
        quarters: &quarters,
        teams: &teams,
        reference_date: date("2025-05-20"),
    };
    let result = run(&inputs, Utc::now()).unwrap();
    assert!(result.teams.is_empty());
    assert!(result.quarterly_stats["Q1"].is_empty());
    assert_eq!(result.player_scores["Q1"]["casey"].combined_win_pct, 0.0);
}

#[test]
fn invalid_quarter_aborts_run() {
    let standings = RawStandings::from_value(&standings_payload());
    let schedule = RawSchedule::from_value(&schedule_payload());
    let mut quarters = quarter_windows();
    quarters.insert(
        "Q2".to_string(),
        QuarterWindow {
            start_date: date("2025-06-25"),
            end_date: date("2025-05-11"),
        },
    );
    let teams = directory();
    let roster = participants();
    let inputs = PipelineInputs {
        season: 2025,
        standings: &standings,
        schedule: &schedule,
        participants: &roster,
        quarters: &quarters,
        teams: &teams,
        reference_date: date("2025-05-20"),
    };
    let err = run(&inputs, Utc::now()).unwrap_err();
    assert!(matches!(err, PipelineError::InvalidQuarter { ref name, .. } if name == "Q2"));
}
