// Library root for the standings aggregation & ranking pipeline.
//
// Stages, leaves first: team identity resolution, run aggregation, standings
// normalization, quarter snapshots, roster scoring & ranking. `pipeline` wires
// them into one result object.

pub mod error;
pub mod feed;
pub mod pipeline;
pub mod quarters;
pub mod runs;
pub mod scoring;
pub mod standings;
pub mod teams;

pub use error::PipelineError;
pub use pipeline::{run, PipelineInputs, SyncResult};
