// Raw stats-service payload shapes and lenient extraction.
//
// The standings payload groups team records by division; the schedule payload
// groups games by date. Both levels are parsed element by element, so one
// malformed record or game (or a missing array) costs only that entry.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;

use crate::runs::{CompletionStatus, GameResult};
use crate::standings::StandingsEntry;

// ---------------------------------------------------------------------------
// Raw serde structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawTeamRef {
    pub id: Option<u32>,
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawLeagueRecord {
    pub wins: u32,
    pub losses: u32,
    /// Reported as a string (".600") by the stats service; numbers accepted too.
    pub pct: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawTeamRecord {
    pub team: RawTeamRef,
    pub league_record: RawLeagueRecord,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawDivision {
    #[serde(deserialize_with = "lenient_elements")]
    pub team_records: Vec<RawTeamRecord>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawStatus {
    pub status_code: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawSide {
    pub team: RawTeamRef,
    pub score: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawMatchup {
    pub away: RawSide,
    pub home: RawSide,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawGame {
    pub status: RawStatus,
    pub teams: RawMatchup,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawDate {
    pub date: String,
    #[serde(deserialize_with = "lenient_elements")]
    pub games: Vec<RawGame>,
}

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

/// Standings payload: `{ "records": [ { "teamRecords": [...] }, ... ] }`.
#[derive(Debug, Clone, Default)]
pub struct RawStandings {
    pub records: Vec<RawDivision>,
}

/// Schedule payload: `{ "dates": [ { "date": ..., "games": [...] }, ... ] }`.
#[derive(Debug, Clone, Default)]
pub struct RawSchedule {
    pub dates: Vec<RawDate>,
}

impl RawStandings {
    /// Parse a standings payload, treating a missing or malformed `records`
    /// array as empty.
    pub fn from_value(value: &Value) -> Self {
        Self {
            records: parse_array(value, "records"),
        }
    }

    /// Flatten every division into standings entries. Entries without a team
    /// id are skipped.
    pub fn entries(&self) -> Vec<StandingsEntry> {
        self.records
            .iter()
            .flat_map(|division| division.team_records.iter())
            .filter_map(|raw| {
                let Some(team_id) = raw.team.id else {
                    warn!("skipping standings record for '{}': no team id", raw.team.name);
                    return None;
                };
                Some(StandingsEntry {
                    team_id,
                    name: raw.team.name.clone(),
                    wins: raw.league_record.wins,
                    losses: raw.league_record.losses,
                    win_pct: parse_pct(raw.league_record.pct.as_ref(), &raw.team.name),
                })
            })
            .collect()
    }
}

impl RawSchedule {
    /// Parse a schedule payload, treating a missing or malformed `dates`
    /// array as empty.
    pub fn from_value(value: &Value) -> Self {
        Self {
            dates: parse_array(value, "dates"),
        }
    }

    /// Flatten every date group into game results. Games missing either team
    /// id are skipped.
    pub fn games(&self) -> Vec<GameResult> {
        self.dates
            .iter()
            .flat_map(|date| date.games.iter().map(move |game| (date.date.as_str(), game)))
            .filter_map(|(date, raw)| {
                let (Some(away_team_id), Some(home_team_id)) =
                    (raw.teams.away.team.id, raw.teams.home.team.id)
                else {
                    warn!("skipping game on {date}: missing team id");
                    return None;
                };
                Some(GameResult {
                    away_team_id,
                    home_team_id,
                    away_score: raw.teams.away.score,
                    home_score: raw.teams.home.score,
                    status: CompletionStatus::from_status_code(&raw.status.status_code),
                })
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Deserialize each element of `value[key]`, skipping elements that fail.
fn parse_array<T: DeserializeOwned>(value: &Value, key: &str) -> Vec<T> {
    let Some(items) = value.get(key).and_then(Value::as_array) else {
        warn!("payload has no `{key}` array, treating as empty");
        return Vec::new();
    };
    parse_elements(items, key)
}

fn parse_elements<T: DeserializeOwned>(items: &[Value], what: &str) -> Vec<T> {
    items
        .iter()
        .filter_map(|item| match T::deserialize(item) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                warn!("skipping malformed `{what}` entry: {e}");
                None
            }
        })
        .collect()
}

/// Field-level counterpart of `parse_array` for nested groups: a bad element
/// is dropped on its own and a non-array value reads as empty, so neither
/// takes its siblings down with it.
fn lenient_elements<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let what = std::any::type_name::<T>().rsplit("::").next().unwrap_or("nested");
    match Value::deserialize(deserializer)? {
        Value::Array(items) => Ok(parse_elements(&items, what)),
        Value::Null => Ok(Vec::new()),
        other => {
            warn!("expected an array of `{what}`, got {other}; treating as empty");
            Ok(Vec::new())
        }
    }
}

/// Parse a win percentage reported as a string or number. Anything that does
/// not yield a finite value becomes 0.0.
fn parse_pct(pct: Option<&Value>, team_name: &str) -> f64 {
    let parsed = match pct {
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(Value::Number(n)) => n.as_f64(),
        _ => None,
    };
    match parsed {
        Some(v) if v.is_finite() => v,
        _ => {
            warn!("unparsable win pct {:?} for '{}', using 0", pct, team_name);
            0.0
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
