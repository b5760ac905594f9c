//! Extraction of contact data from fetched pages

mod email;

pub use email::{extract_emails, is_valid_email, normalize_email};
