use std::path::Path;

use encoding_rs::Encoding;
use log::debug;

use crate::{
    data::Value,
    error::{EtlError, Result},
    io_utils,
    table::Table,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellSyntax {
    /// Raw exports: blank cells and missing-value markers are null.
    Raw,
    /// Snapshots from the writer: only the empty cell is null.
    Prepared,
}

impl CellSyntax {
    fn parse(self, cell: &str) -> Value {
        match self {
            CellSyntax::Raw => Value::parse(cell),
            CellSyntax::Prepared => Value::parse_prepared(cell),
        }
    }
}

/// Reads `path` into memory, keeping the raw header names. A header with no
/// data rows yields an empty table that still carries its fields.
pub fn read_table(path: &Path, encoding: &'static Encoding, cells: CellSyntax) -> Result<Table> {
    let mut reader = io_utils::open_csv_reader_from_path(path, io_utils::DEFAULT_DELIMITER)?;
    let raw_headers = reader
        .byte_headers()
        .map_err(|err| io_utils::csv_error(path, err))?
        .clone();
    if raw_headers.is_empty() {
        return Err(EtlError::parse(path, "Missing header row"));
    }
    let headers = io_utils::decode_record(&raw_headers, encoding, path, 1)?;
    let mut table = Table::new(headers);

    for (row_idx, record) in reader.byte_records().enumerate() {
        let line = row_idx + 2;
        let record = record.map_err(|err| io_utils::csv_error(path, err))?;
        let decoded = io_utils::decode_record(&record, encoding, path, line)?;
        table
            .push_row(decoded.iter().map(|cell| cells.parse(cell)).collect())
            .map_err(|err| EtlError::parse(path, format!("Line {line}: {err}")))?;
    }

    debug!(
        "Read {} row(s) across {} field(s) from {:?}",
        table.len(),
        table.headers().len(),
        path
    );
    Ok(table)
}
