// Roster and quarter-definition loading (participants.json, quarters.json).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use pennant_core::quarters::QuarterWindow;
use pennant_core::scoring::Participant;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Shape of quarters.json: `{ "quarters": { "Q1": { "startDate": ..., "endDate": ... } } }`.
#[derive(Debug, Clone, Deserialize)]
struct QuartersFile {
    quarters: BTreeMap<String, QuarterWindow>,
}

/// Load the participant list in file order. The order matters: it is the
/// tie-break for participants with identical composite scores.
pub fn load_participants(path: &Path) -> Result<Vec<Participant>, InputError> {
    let participants: Vec<Participant> = read_json(path)?;
    debug!("loaded {} participants from {}", participants.len(), path.display());
    Ok(participants)
}

/// Load quarter windows keyed by quarter name.
pub fn load_quarters(path: &Path) -> Result<BTreeMap<String, QuarterWindow>, InputError> {
    let file: QuartersFile = read_json(path)?;
    debug!("loaded {} quarter definitions from {}", file.quarters.len(), path.display());
    Ok(file.quarters)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, InputError> {
    let text = std::fs::read_to_string(path).map_err(|source| InputError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| InputError::Json {
        path: path.to_path_buf(),
        source,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
