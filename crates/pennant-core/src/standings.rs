// Standings normalization: official win/loss records merged with run stats.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::runs::TeamRunStats;
use crate::teams::TeamDirectory;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One team's official record as reported by the standings feed.
#[derive(Debug, Clone, PartialEq)]
pub struct StandingsEntry {
    pub team_id: u32,
    pub name: String,
    pub wins: u32,
    pub losses: u32,
    /// Win percentage exactly as the feed reports it (0.0 - 1.0).
    pub win_pct: f64,
}

/// Per-team statistics record written to the result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamRecord {
    pub name: String,
    pub abbreviation: String,
    pub wins: u32,
    pub losses: u32,
    pub win_pct: f64,
    pub runs_scored: u32,
    pub runs_allowed: u32,
    pub games_played: u32,
    pub runs_per_game: f64,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Round `value` to `places` decimal places, halves away from zero.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// `numerator / denominator`, or 0.0 when the denominator is zero.
pub(crate) fn ratio(numerator: u32, denominator: u32) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Merge standings entries with aggregated run stats into one record per team.
///
/// Teams that did not play a counted game get zeroed run stats. The win
/// percentage is copied from the feed, never recomputed from wins and losses.
pub fn normalize(
    entries: &[StandingsEntry],
    run_stats: &BTreeMap<String, TeamRunStats>,
    teams: &TeamDirectory,
) -> BTreeMap<String, TeamRecord> {
    let mut records = BTreeMap::new();

    for entry in entries {
        let Some(abbr) = teams.resolve(entry.team_id) else {
            warn!(
                "skipping standings entry for '{}': unknown team id {}",
                entry.name, entry.team_id
            );
            continue;
        };

        let runs = run_stats.get(abbr).copied().unwrap_or_default();
        let record = TeamRecord {
            name: entry.name.clone(),
            abbreviation: abbr.to_string(),
            wins: entry.wins,
            losses: entry.losses,
            win_pct: entry.win_pct,
            runs_scored: runs.runs_scored,
            runs_allowed: runs.runs_allowed,
            games_played: runs.games_played,
            runs_per_game: round_to(ratio(runs.runs_scored, runs.games_played), 2),
        };

        if records.insert(abbr.to_string(), record).is_some() {
            warn!("duplicate standings entry for {abbr}, using latest");
        }
    }

    records
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
