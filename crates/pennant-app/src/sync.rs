// One sync run: load inputs, fetch payloads, run the pipeline, persist.

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use pennant_core::feed::{RawSchedule, RawStandings};
use pennant_core::quarters::QuarterSchedule;
use pennant_core::runs;
use pennant_core::{PipelineInputs, SyncResult};
use tracing::{debug, info};

use crate::config::Config;
use crate::inputs;
use crate::persist;
use crate::source::{FetchWindow, StatsSource};

/// Run a full sync as of `today` and write the result to the configured
/// output path.
///
/// Any failure aborts before the output file is touched, so a previous result
/// stays in place.
pub async fn run_sync(config: &Config, source: &StatsSource, today: NaiveDate) -> Result<SyncResult> {
    let reference_date = config.reference_date(today);

    let participants_path = config.resolve(&config.paths.participants);
    let participants = inputs::load_participants(&participants_path)
        .context("failed to load participants")?;
    let quarters_path = config.resolve(&config.paths.quarters);
    let quarters = inputs::load_quarters(&quarters_path).context("failed to load quarters")?;
    let quarter_schedule = QuarterSchedule::from_windows(&quarters).context("invalid quarters")?;

    let window = FetchWindow {
        season: config.season.year,
        start: config.season.opening_day,
        end: reference_date,
    };
    let payloads = source.fetch(window).await.context("failed to fetch stats")?;

    let standings = RawStandings::from_value(&payloads.standings);
    let schedule = RawSchedule::from_value(&payloads.schedule);

    let pipeline_inputs = PipelineInputs {
        season: config.season.year,
        standings: &standings,
        schedule: &schedule,
        participants: &participants,
        quarters: &quarters,
        teams: &config.teams,
        reference_date,
    };
    let result = pennant_core::run(&pipeline_inputs, Utc::now()).context("pipeline failed")?;

    let output = config.resolve(&config.paths.output);
    persist::write_result(&output, &result)
        .await
        .context("failed to persist result")?;
    info!("wrote {}", output.display());

    let games_counted = runs::counted_games(&schedule.games(), &config.teams);
    log_summary(&result, games_counted, &quarter_schedule, reference_date);

    Ok(result)
}

fn log_summary(
    result: &SyncResult,
    games_counted: usize,
    schedule: &QuarterSchedule,
    reference_date: NaiveDate,
) {
    info!(
        "season {}: {} teams, {} games counted as of {}",
        result.season,
        result.teams.len(),
        games_counted,
        reference_date
    );

    let started: Vec<&str> = schedule
        .started_on(reference_date)
        .map(|q| q.name.as_str())
        .collect();
    debug!("quarters started: {started:?}");

    match schedule.active_on(reference_date) {
        Some(quarter) => info!("active quarter: {} (ends {})", quarter.name, quarter.end_date),
        None => info!("no quarter active on {reference_date}"),
    }

    for (quarter, leader) in result.leaders() {
        info!(
            "{quarter} leader: {} ({}) win pct {:.3}, {:.2} runs/game",
            leader.name,
            leader.teams.join("/"),
            leader.combined_win_pct,
            leader.combined_runs_per_game
        );
    }
}
