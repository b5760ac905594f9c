//! Search expansion: free-text queries to deduplicated site origins
//!
//! The provider is a seam (`SearchProvider`); the expander only ever sees
//! result hrefs and reduces them to origins.

mod expander;
mod provider;

pub use expander::{collect_origins, ExpansionReport, SearchExpander};
pub use provider::{
    parse_results, DuckDuckGoProvider, SearchError, SearchHit, SearchParams, SearchProvider,
};
