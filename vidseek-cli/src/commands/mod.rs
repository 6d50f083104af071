//! Subcommand implementations.

pub mod ingest;
pub mod inspect;
pub mod search;
