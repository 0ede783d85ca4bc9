use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use encoding_rs::Encoding;
use log::{debug, warn};

use crate::{data::Value, io_utils, table::Table};

/// Resolves `logical_name.extension` inside `dir`, matching the filename
/// case-insensitively. Legacy exports ship `JNL.CSV`, `Jnl.csv`, and
/// `jnl.csv` interchangeably.
pub fn resolve_table_path(dir: &Path, logical_name: &str, extension: &str) -> Option<PathBuf> {
    let wanted = format!("{logical_name}.{extension}");
    let entries = fs::read_dir(dir).ok()?;
    for entry in entries.flatten() {
        let name = entry.file_name();
        if let Some(name) = name.to_str()
            && name.eq_ignore_ascii_case(&wanted)
            && entry.path().is_file()
        {
            return Some(entry.path());
        }
    }
    None
}

/// Reads one named table from a store directory.
///
/// A missing directory, missing file, or unreadable file degrades to an
/// empty table with a warning; reference tables are optional and the caller
/// decides how much a missing one matters.
pub fn read_table(
    dir: &Path,
    logical_name: &str,
    extension: &str,
    delimiter: Option<u8>,
    encoding: &'static Encoding,
) -> Table {
    let Some(path) = resolve_table_path(dir, logical_name, extension) else {
        warn!("Table '{logical_name}' not found under {dir:?}; continuing with an empty table");
        return Table::default();
    };
    match read_csv_table(&path, delimiter, encoding) {
        Ok(table) => {
            debug!(
                "Read {} row(s) x {} column(s) from {path:?}",
                table.row_count(),
                table.column_count()
            );
            table
        }
        Err(err) => {
            warn!("Failed to read {path:?}: {err:#}; continuing with an empty table");
            Table::default()
        }
    }
}

fn read_csv_table(path: &Path, delimiter: Option<u8>, encoding: &'static Encoding) -> Result<Table> {
    let delimiter = io_utils::resolve_input_delimiter(path, delimiter);
    let mut reader = io_utils::open_csv_reader_from_path(path, delimiter)?;
    let headers = io_utils::reader_headers(&mut reader, encoding)?;
    let mut table = Table::new(headers);
    for (row_idx, record) in reader.byte_records().enumerate() {
        let record = record.with_context(|| format!("Reading row {}", row_idx + 2))?;
        let decoded = io_utils::decode_record(&record, encoding)?;
        table.rows.push(
            decoded
                .into_iter()
                .map(|field| {
                    if field.is_empty() {
                        None
                    } else {
                        Some(Value::Text(field))
                    }
                })
                .collect(),
        );
    }
    Ok(table)
}
