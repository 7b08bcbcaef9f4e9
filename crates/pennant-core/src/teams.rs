// Team identity resolution: external stats-service team id -> abbreviation.

use std::collections::{HashMap, HashSet};

use crate::error::PipelineError;

// ---------------------------------------------------------------------------
// Built-in table
// ---------------------------------------------------------------------------

/// The thirty major-league clubs keyed by the stats service's team id.
pub const MLB_TEAMS: &[(u32, &str)] = &[
    (108, "LAA"),
    (109, "ARI"),
    (110, "BAL"),
    (111, "BOS"),
    (112, "CHC"),
    (113, "CIN"),
    (114, "CLE"),
    (115, "COL"),
    (116, "DET"),
    (117, "HOU"),
    (118, "KC"),
    (119, "LAD"),
    (120, "WSH"),
    (121, "NYM"),
    (133, "OAK"),
    (134, "PIT"),
    (135, "SD"),
    (136, "SEA"),
    (137, "SF"),
    (138, "STL"),
    (139, "TB"),
    (140, "TEX"),
    (141, "TOR"),
    (142, "MIN"),
    (143, "PHI"),
    (144, "ATL"),
    (145, "CWS"),
    (146, "MIA"),
    (147, "NYY"),
    (158, "MIL"),
];

// ---------------------------------------------------------------------------
// TeamDirectory
// ---------------------------------------------------------------------------

/// Immutable id -> abbreviation lookup table.
///
/// Built once per run and passed to every stage that needs it, so tests can
/// swap in a small table without touching process-wide state.
#[derive(Debug, Clone)]
pub struct TeamDirectory {
    by_id: HashMap<u32, String>,
    abbreviations: HashSet<String>,
}

impl TeamDirectory {
    /// Build a directory from `(id, abbreviation)` pairs.
    ///
    /// The mapping must be a bijection: a repeated id or a repeated
    /// abbreviation is rejected.
    pub fn new<I, S>(entries: I) -> Result<Self, PipelineError>
    where
        I: IntoIterator<Item = (u32, S)>,
        S: Into<String>,
    {
        let mut by_id = HashMap::new();
        let mut abbreviations = HashSet::new();

        for (id, abbreviation) in entries {
            let abbreviation = abbreviation.into();
            if by_id.contains_key(&id) {
                return Err(PipelineError::DuplicateTeamId { id });
            }
            if !abbreviations.insert(abbreviation.clone()) {
                return Err(PipelineError::DuplicateAbbreviation { abbreviation });
            }
            by_id.insert(id, abbreviation);
        }

        Ok(Self {
            by_id,
            abbreviations,
        })
    }

    /// The built-in major-league table.
    pub fn mlb() -> Self {
        let by_id: HashMap<u32, String> = MLB_TEAMS
            .iter()
            .map(|&(id, abbr)| (id, abbr.to_string()))
            .collect();
        let abbreviations = by_id.values().cloned().collect();
        Self {
            by_id,
            abbreviations,
        }
    }

    /// Look up the abbreviation for an external team id.
    ///
    /// `None` is a normal outcome (exhibition and international clubs are not
    /// in the table); callers log and skip.
    pub fn resolve(&self, id: u32) -> Option<&str> {
        self.by_id.get(&id).map(String::as_str)
    }

    /// Whether `abbreviation` is an output of this directory.
    pub fn is_known(&self, abbreviation: &str) -> bool {
        self.abbreviations.contains(abbreviation)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

impl Default for TeamDirectory {
    fn default() -> Self {
        Self::mlb()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
