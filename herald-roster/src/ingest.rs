//! Tabular ingestion.
//!
//! Contact lists arrive as CSV with whatever columns the operator exported.
//! No column is required; every cell is kept as an opaque string. Rows are
//! assigned their [`RowId`] here, in input order, and keep it for life.

use std::{fs::File, io::Read, path::Path};

use ahash::AHashMap;
use tracing::debug;

use crate::{
    error::IngestError,
    row::{RecipientRow, RowId},
};

/// The parsed contact list: header order plus initialized rows.
#[derive(Debug, Clone, Default)]
pub struct Ingested {
    pub headers: Vec<String>,
    pub rows: Vec<RecipientRow>,
}

/// Ingest CSV data from any reader.
///
/// Tolerates a UTF-8 byte-order mark, CRLF line endings, and ragged records
/// (missing cells become empty strings, surplus cells are dropped). Records
/// whose cells are all empty are skipped.
///
/// # Errors
///
/// Returns [`IngestError`] on I/O failure or malformed CSV.
pub fn ingest_reader<R: Read>(mut reader: R) -> Result<Ingested, IngestError> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    let text = text.replace('\u{feff}', "");

    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(ToString::to_string)
        .collect();

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }

        let mut fields = AHashMap::with_capacity(headers.len());
        for (position, header) in headers.iter().enumerate() {
            let value = record.get(position).unwrap_or_default();
            fields.insert(header.clone(), value.to_string());
        }
        rows.push(RecipientRow::new(RowId::generate(), fields));
    }

    debug!(
        rows = rows.len(),
        columns = headers.len(),
        "Ingested contact list"
    );

    Ok(Ingested { headers, rows })
}

/// Ingest a CSV file from disk.
///
/// # Errors
///
/// Returns [`IngestError`] if the file cannot be read or parsed.
pub fn ingest_path<P: AsRef<Path>>(path: P) -> Result<Ingested, IngestError> {
    ingest_reader(File::open(path)?)
}
