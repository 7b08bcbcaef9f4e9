// Library root: the sync application's collaborators around the pipeline
// (configuration, input files, payload retrieval, persistence).

pub mod config;
pub mod inputs;
pub mod persist;
pub mod source;
pub mod sync;
