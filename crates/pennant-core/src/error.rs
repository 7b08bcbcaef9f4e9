// Error type for the pipeline stages.

use thiserror::Error;

/// Failures that abort a pipeline run. Data problems inside the payloads
/// (unknown teams, missing scores, malformed entries) are never errors; they
/// are skipped with a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error("team id {id} is mapped more than once")]
    DuplicateTeamId { id: u32 },

    #[error("abbreviation `{abbreviation}` is mapped to more than one team id")]
    DuplicateAbbreviation { abbreviation: String },

    #[error("invalid quarter `{name}`: {message}")]
    InvalidQuarter { name: String, message: String },
}
