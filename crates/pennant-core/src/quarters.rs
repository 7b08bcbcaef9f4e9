// Quarter schedule and per-quarter team snapshots.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::PipelineError;
use crate::standings::TeamRecord;

/// Quarter names accepted in quarter definitions and roster entries.
pub const QUARTER_NAMES: [&str; 4] = ["Q1", "Q2", "Q3", "Q4"];

// ---------------------------------------------------------------------------
// Definitions
// ---------------------------------------------------------------------------

/// Date bounds of a quarter as written in the quarter definitions file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuarterWindow {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// A named, date-bounded scoring period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuarterDefinition {
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl QuarterDefinition {
    /// The quarter has started once the reference date reaches its start.
    pub fn has_started(&self, date: NaiveDate) -> bool {
        date >= self.start_date
    }

    /// Whether `date` falls within the quarter's inclusive window.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

/// Validated set of quarter definitions, ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuarterSchedule {
    quarters: Vec<QuarterDefinition>,
}

impl QuarterSchedule {
    /// Validate and order quarter windows keyed by name.
    ///
    /// Names must be one of `Q1`..`Q4` and each window must end on or after
    /// its start.
    pub fn from_windows(windows: &BTreeMap<String, QuarterWindow>) -> Result<Self, PipelineError> {
        let mut quarters = Vec::with_capacity(windows.len());

        for (name, window) in windows {
            if !QUARTER_NAMES.contains(&name.as_str()) {
                return Err(PipelineError::InvalidQuarter {
                    name: name.clone(),
                    message: format!("name must be one of {}", QUARTER_NAMES.join(", ")),
                });
            }
            if window.end_date < window.start_date {
                return Err(PipelineError::InvalidQuarter {
                    name: name.clone(),
                    message: format!(
                        "end date {} is before start date {}",
                        window.end_date, window.start_date
                    ),
                });
            }
            quarters.push(QuarterDefinition {
                name: name.clone(),
                start_date: window.start_date,
                end_date: window.end_date,
            });
        }

        Ok(Self { quarters })
    }

    pub fn quarters(&self) -> &[QuarterDefinition] {
        &self.quarters
    }

    /// The first quarter whose window contains `date`, if any.
    pub fn active_on(&self, date: NaiveDate) -> Option<&QuarterDefinition> {
        self.quarters.iter().find(|q| q.contains(date))
    }

    /// All quarters that have started by `date`.
    pub fn started_on(&self, date: NaiveDate) -> impl Iterator<Item = &QuarterDefinition> {
        self.quarters.iter().filter(move |q| q.has_started(date))
    }
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

/// Field subset of a [`TeamRecord`] copied into each quarter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamSnapshot {
    pub wins: u32,
    pub losses: u32,
    pub win_pct: f64,
    pub runs_scored: u32,
    pub runs_per_game: f64,
}

impl From<&TeamRecord> for TeamSnapshot {
    fn from(record: &TeamRecord) -> Self {
        Self {
            wins: record.wins,
            losses: record.losses,
            win_pct: record.win_pct,
            runs_scored: record.runs_scored,
            runs_per_game: record.runs_per_game,
        }
    }
}

/// Quarter name -> team abbreviation -> snapshot.
pub type QuarterSnapshot = BTreeMap<String, BTreeMap<String, TeamSnapshot>>;

/// Copy the current team records into every quarter that has started by
/// `reference_date`. Quarters not yet started map to an empty table.
///
/// Every started quarter receives the season-to-date numbers; the quarter's
/// own date window does not filter games.
pub fn snapshot(
    records: &BTreeMap<String, TeamRecord>,
    schedule: &QuarterSchedule,
    reference_date: NaiveDate,
) -> QuarterSnapshot {
    schedule
        .quarters()
        .iter()
        .map(|quarter| {
            let teams = if quarter.has_started(reference_date) {
                records
                    .iter()
                    .map(|(abbr, record)| (abbr.clone(), TeamSnapshot::from(record)))
                    .collect()
            } else {
                debug!("{} starts {}, leaving snapshot empty", quarter.name, quarter.start_date);
                BTreeMap::new()
            };
            (quarter.name.clone(), teams)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
