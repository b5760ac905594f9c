//! Batch dispatch over the network boundary
//!
//! - `BatchDispatcher` shards work lists and fans batches out concurrently
//! - `ActionClient` delivers a batch to the downstream scrape or search action

mod actions;
mod batch;

pub use actions::{ActionClient, ActionError};
pub use batch::{partition, BatchDispatcher, DispatchOutcome};
