//! Recipient roster: the ordered, observable collection of campaign rows.
//!
//! This crate owns everything about recipient data at rest:
//! - Ingesting tabular contact lists into rows
//! - Detecting which columns carry the email/phone roles
//! - Holding the rows and applying per-row delivery state transitions
//! - Projecting rollup statistics over the current state

pub mod columns;
pub mod error;
pub mod ingest;
pub mod row;
pub mod store;
pub mod summary;

pub use columns::{ColumnDetector, ColumnMap, HeuristicDetector};
pub use error::{IngestError, RosterError};
pub use ingest::Ingested;
pub use row::{RecipientRow, RowId, RowPatch};
pub use store::Roster;
pub use summary::StatusSummary;
