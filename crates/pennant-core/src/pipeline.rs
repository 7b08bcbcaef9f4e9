// Pipeline assembly: raw payloads + rosters + quarter windows -> one result.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::PipelineError;
use crate::feed::{RawSchedule, RawStandings};
use crate::quarters::{self, QuarterSchedule, QuarterSnapshot, QuarterWindow};
use crate::runs;
use crate::scoring::{self, Participant, QuarterScores};
use crate::standings::{self, TeamRecord};
use crate::teams::TeamDirectory;

/// Everything one pipeline run reads. All inputs are already fetched and
/// loaded; the pipeline performs no I/O.
#[derive(Debug, Clone, Copy)]
pub struct PipelineInputs<'a> {
    pub season: u32,
    pub standings: &'a RawStandings,
    pub schedule: &'a RawSchedule,
    pub participants: &'a [Participant],
    pub quarters: &'a BTreeMap<String, QuarterWindow>,
    pub teams: &'a TeamDirectory,
    /// "Today" for deciding which quarters have started.
    pub reference_date: NaiveDate,
}

/// The complete computed artifact, regenerated from scratch on every run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResult {
    pub last_updated: DateTime<Utc>,
    pub season: u32,
    pub teams: BTreeMap<String, TeamRecord>,
    pub quarterly_stats: QuarterSnapshot,
    pub player_scores: QuarterScores,
}

impl SyncResult {
    /// Rank-1 participant per quarter, for quarters with any scored entries.
    pub fn leaders(&self) -> Vec<(&str, &scoring::ParticipantScore)> {
        self.player_scores
            .iter()
            .filter_map(|(quarter, scores)| {
                scores
                    .values()
                    .find(|s| s.rank == 1)
                    .map(|leader| (quarter.as_str(), leader))
            })
            .collect()
    }
}

/// Run every stage in order and assemble the result.
///
/// `generated_at` is stamped into `last_updated`; it is the only field that
/// differs between runs over identical inputs.
pub fn run(inputs: &PipelineInputs<'_>, generated_at: DateTime<Utc>) -> Result<SyncResult, PipelineError> {
    let schedule = QuarterSchedule::from_windows(inputs.quarters)?;

    let games = inputs.schedule.games();
    let run_stats = runs::aggregate(&games, inputs.teams);

    let entries = inputs.standings.entries();
    let teams = standings::normalize(&entries, &run_stats, inputs.teams);

    let quarterly_stats = quarters::snapshot(&teams, &schedule, inputs.reference_date);

    let participants = scoring::sanitize_rosters(inputs.participants, inputs.teams);
    let player_scores = scoring::score(&participants, &quarterly_stats);

    info!(
        "pipeline complete: {} games listed, {} teams, {} quarters, {} participants",
        games.len(),
        teams.len(),
        quarterly_stats.len(),
        participants.len()
    );

    Ok(SyncResult {
        last_updated: generated_at,
        season: inputs.season,
        teams,
        quarterly_stats,
        player_scores,
    })
}
