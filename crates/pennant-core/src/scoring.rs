// Roster scoring and ranking.
//
// Each participant picks up to four teams per quarter (one per tier). The
// participant's composite score combines the quarter snapshot numbers of
// those teams; participants are then ranked within each quarter.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::quarters::{QuarterSnapshot, TeamSnapshot};
use crate::standings::{ratio, round_to};
use crate::teams::TeamDirectory;

// ---------------------------------------------------------------------------
// Roster types
// ---------------------------------------------------------------------------

/// Team picks for one quarter, one optional abbreviation per tier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierPicks {
    pub tier1: Option<String>,
    pub tier2: Option<String>,
    pub tier3: Option<String>,
    pub tier4: Option<String>,
}

impl TierPicks {
    /// Filled slots in tier order. Blank strings count as empty.
    pub fn teams(&self) -> Vec<&str> {
        [&self.tier1, &self.tier2, &self.tier3, &self.tier4]
            .into_iter()
            .filter_map(|slot| slot.as_deref())
            .map(str::trim)
            .filter(|abbr| !abbr.is_empty())
            .collect()
    }

    /// Copy with every slot not accepted by `keep` cleared.
    fn retain(&self, mut keep: impl FnMut(&str) -> bool) -> Self {
        let mut filter = |slot: &Option<String>| {
            slot.as_deref()
                .map(str::trim)
                .filter(|abbr| !abbr.is_empty() && keep(*abbr))
                .map(str::to_string)
        };
        Self {
            tier1: filter(&self.tier1),
            tier2: filter(&self.tier2),
            tier3: filter(&self.tier3),
            tier4: filter(&self.tier4),
        }
    }
}

/// A pool participant and their picks, keyed by quarter name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: String,
    pub name: String,
    /// Quarters without an entry have no picks submitted yet.
    #[serde(default)]
    pub quarters: BTreeMap<String, TierPicks>,
}

// ---------------------------------------------------------------------------
// Score types
// ---------------------------------------------------------------------------

/// A participant's composite numbers for one quarter, before ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeScore {
    pub participant_id: String,
    pub name: String,
    pub teams: Vec<String>,
    pub combined_win_pct: f64,
    pub combined_runs_per_game: f64,
}

/// A ranked participant entry as written to the result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantScore {
    pub name: String,
    pub teams: Vec<String>,
    pub combined_win_pct: f64,
    pub combined_runs_per_game: f64,
    pub rank: usize,
}

/// Quarter name -> participant id -> ranked score.
pub type QuarterScores = BTreeMap<String, BTreeMap<String, ParticipantScore>>;

// ---------------------------------------------------------------------------
// Roster validation
// ---------------------------------------------------------------------------

/// Drop picks that name unknown teams and participants whose id repeats an
/// earlier one. Input order is preserved.
pub fn sanitize_rosters(participants: &[Participant], teams: &TeamDirectory) -> Vec<Participant> {
    let mut seen = HashSet::new();
    let mut cleaned = Vec::with_capacity(participants.len());

    for participant in participants {
        if !seen.insert(participant.id.as_str()) {
            warn!(
                "skipping duplicate participant id '{}' ({})",
                participant.id, participant.name
            );
            continue;
        }

        let quarters = participant
            .quarters
            .iter()
            .map(|(quarter, picks)| {
                let kept = picks.retain(|abbr| {
                    let known = teams.is_known(abbr);
                    if !known {
                        warn!(
                            "dropping unknown team '{}' from {} picks of '{}'",
                            abbr, quarter, participant.id
                        );
                    }
                    known
                });
                (quarter.clone(), kept)
            })
            .collect();

        cleaned.push(Participant {
            id: participant.id.clone(),
            name: participant.name.clone(),
            quarters,
        });
    }

    cleaned
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

/// Combine a participant's picks for one quarter into a composite score.
///
/// Returns `None` when the participant has no picks for the quarter. Picked
/// teams absent from the snapshot contribute nothing. Games played is
/// estimated as wins + losses.
pub fn composite_score(
    participant: &Participant,
    quarter: &str,
    snapshot: &BTreeMap<String, TeamSnapshot>,
) -> Option<CompositeScore> {
    let picks = participant.quarters.get(quarter)?;
    let teams = picks.teams();
    if teams.is_empty() {
        return None;
    }

    let (wins, losses, runs) = teams
        .iter()
        .filter_map(|abbr| snapshot.get(*abbr))
        .fold((0u32, 0u32, 0u32), |(w, l, r), team| {
            (w + team.wins, l + team.losses, r + team.runs_scored)
        });
    let estimated_games = wins + losses;

    Some(CompositeScore {
        participant_id: participant.id.clone(),
        name: participant.name.clone(),
        teams: teams.iter().map(|abbr| abbr.to_string()).collect(),
        combined_win_pct: round_to(ratio(wins, estimated_games), 3),
        combined_runs_per_game: round_to(ratio(runs, estimated_games), 2),
    })
}

/// Order composite scores and assign ranks.
///
/// Sorted by win pct descending, then runs per game descending. The sort is
/// stable: entries tied on both keys keep their input order. Ranks are the
/// 1-based sorted positions, so ties still receive distinct ranks.
pub fn rank(mut scores: Vec<CompositeScore>) -> Vec<(String, ParticipantScore)> {
    scores.sort_by(|a, b| {
        b.combined_win_pct
            .total_cmp(&a.combined_win_pct)
            .then_with(|| b.combined_runs_per_game.total_cmp(&a.combined_runs_per_game))
    });

    scores
        .into_iter()
        .enumerate()
        .map(|(idx, s)| {
            (
                s.participant_id,
                ParticipantScore {
                    name: s.name,
                    teams: s.teams,
                    combined_win_pct: s.combined_win_pct,
                    combined_runs_per_game: s.combined_runs_per_game,
                    rank: idx + 1,
                },
            )
        })
        .collect()
}

/// Score and rank every participant for every quarter in `snapshots`.
///
/// Participants without picks for a quarter are left out of that quarter's
/// table rather than scored as zero.
pub fn score(participants: &[Participant], snapshots: &QuarterSnapshot) -> QuarterScores {
    snapshots
        .iter()
        .map(|(quarter, snapshot)| {
            let composites: Vec<CompositeScore> = participants
                .iter()
                .filter_map(|p| composite_score(p, quarter, snapshot))
                .collect();
            debug!("{quarter}: scored {} of {} participants", composites.len(), participants.len());
            (quarter.clone(), rank(composites).into_iter().collect())
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
