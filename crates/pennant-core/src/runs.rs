// Run aggregation: fold completed games into per-team run counters.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::teams::TeamDirectory;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Whether a game has been completed. Only final games count toward runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionStatus {
    Final,
    NotFinal,
}

impl CompletionStatus {
    /// Status code the stats service uses for a completed game.
    pub const FINAL_CODE: &'static str = "F";

    /// Map a stats-service status code to a completion status.
    pub fn from_status_code(code: &str) -> Self {
        if code.trim() == Self::FINAL_CODE {
            CompletionStatus::Final
        } else {
            CompletionStatus::NotFinal
        }
    }

    pub fn is_final(self) -> bool {
        self == CompletionStatus::Final
    }
}

/// One scheduled game. Scores are `None` for postponed or unplayed games.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameResult {
    pub away_team_id: u32,
    pub home_team_id: u32,
    pub away_score: Option<u32>,
    pub home_score: Option<u32>,
    pub status: CompletionStatus,
}

/// Cumulative run counters for one team.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TeamRunStats {
    pub runs_scored: u32,
    pub runs_allowed: u32,
    pub games_played: u32,
}

impl TeamRunStats {
    /// Counters after one more game with the given score line.
    fn with_game(self, scored: u32, allowed: u32) -> Self {
        Self {
            runs_scored: self.runs_scored + scored,
            runs_allowed: self.runs_allowed + allowed,
            games_played: self.games_played + 1,
        }
    }
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Fold `games` into per-team run stats keyed by abbreviation.
///
/// Non-final games contribute nothing. A game where either side fails
/// identity resolution is skipped entirely. Each counted game updates both
/// teams in the same step, so the result does not depend on input order.
pub fn aggregate(games: &[GameResult], teams: &TeamDirectory) -> BTreeMap<String, TeamRunStats> {
    let stats = games
        .iter()
        .filter(|game| game.status.is_final())
        .filter_map(|game| {
            let Some((away, home)) = resolve_sides(game, teams) else {
                warn!(
                    "skipping game {} @ {}: unknown team id",
                    game.away_team_id, game.home_team_id
                );
                return None;
            };
            Some((away, home, game))
        })
        .fold(BTreeMap::new(), |mut acc: BTreeMap<String, TeamRunStats>, (away, home, game)| {
            let away_runs = game.away_score.unwrap_or(0);
            let home_runs = game.home_score.unwrap_or(0);

            let away_stats = acc.get(away).copied().unwrap_or_default();
            acc.insert(away.to_string(), away_stats.with_game(away_runs, home_runs));

            let home_stats = acc.get(home).copied().unwrap_or_default();
            acc.insert(home.to_string(), home_stats.with_game(home_runs, away_runs));

            acc
        });

    debug!("aggregated runs for {} teams", stats.len());
    stats
}

/// Number of games `aggregate` counts: final, with both sides resolved.
pub fn counted_games(games: &[GameResult], teams: &TeamDirectory) -> usize {
    games
        .iter()
        .filter(|game| game.status.is_final() && resolve_sides(game, teams).is_some())
        .count()
}

fn resolve_sides<'t>(game: &GameResult, teams: &'t TeamDirectory) -> Option<(&'t str, &'t str)> {
    Some((teams.resolve(game.away_team_id)?, teams.resolve(game.home_team_id)?))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
