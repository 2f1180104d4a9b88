//! Error types for the herald-roster crate.

use std::io;

use thiserror::Error;

use crate::row::RowId;

/// Errors from roster mutations.
#[derive(Debug, Error)]
pub enum RosterError {
    /// A patch targeted a row that is not in the roster. The orchestrator
    /// only patches rows it is iterating, so this indicates an internal
    /// consistency bug rather than an expected runtime condition.
    #[error("Row not found: {0}")]
    RowNotFound(RowId),
}

/// Errors from tabular ingestion.
#[derive(Debug, Error)]
pub enum IngestError {
    /// I/O failure reading the input.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Malformed tabular data.
    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),
}
