//! Bank and card statement ingestion, keyword categorization and spending
//! analysis.
//!
//! The pipeline runs `table` → `columns` → `extractor` → `normalizer`, with
//! `importer` driving it per file. `categorizer` and `reports` work on the
//! canonical [`models::Transaction`] list that comes out the other end.

pub mod categorizer;
pub mod cli;
pub mod columns;
pub mod db;
pub mod error;
pub mod extractor;
pub mod fmt;
pub mod importer;
pub mod models;
pub mod normalizer;
pub mod parse;
pub mod reports;
pub mod settings;
pub mod table;
