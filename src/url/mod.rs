//! URL handling module for Contact-Harvest
//!
//! This module provides origin reduction for search hits and links,
//! canonical normalization for scrape targets, and host pattern matching
//! for explicitly allowed origins.

mod matcher;
mod normalize;
mod origin;

pub use matcher::matches_host_pattern;
pub use normalize::normalize_target;
pub use origin::{host_of, origin_of, origin_of_str};
