//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlPhase`: where a seed is in its fetch/filter/extract lifecycle
//! - `SeedOutcome`: how a seed's crawl ended
//! - `PhaseTracker`: enforces legal phase transitions for one seed

mod crawl_phase;

pub use crawl_phase::{CrawlPhase, PhaseTracker, SeedOutcome};
