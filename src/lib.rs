//! Collates line-delimited JSON support-ticket exports into one merged dataset
//! and reports counts per year, tag and custom-field category.

pub mod aggregate;
pub mod collate;
pub mod config;
pub mod error;
pub mod fields;
pub mod loader;
pub mod logging;
pub mod report;
pub mod summary;
pub mod timestamp;
pub mod validate;
