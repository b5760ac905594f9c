//! Pipeline module: on-demand harvest runs
//!
//! # Components
//!
//! - `Pipeline`: sequences the search and crawl stages for one run
//! - `PipelineReport`: per-stage success and failure counters

mod orchestrator;
mod report;

pub use orchestrator::{ExecutionMode, Pipeline, Stages};
pub use report::PipelineReport;
