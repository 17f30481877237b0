use csv::{ReaderBuilder, StringRecord};
use fs_err::File;
use serde::Serialize;
use std::{io::Read, path::Path};
use tracing::{debug, info};

use super::error::{Error, Result};

pub const STOP_ID: &str = "stop_id";
pub const NAME: &str = "name";

/// One station of the display. `led_index` is never read from the input: it is
/// the 0-based position of the row in the source table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StationRecord {
    pub led_index: usize,
    pub stop_id: String,
    pub name: String,
}

/// Stations in LED chain order. Indices always run `0..len()` without gaps.
#[derive(Debug, Default, Serialize)]
#[serde(transparent)]
pub struct StationTable(Vec<StationRecord>);

impl StationTable {
    pub fn from_rows<I, S, N>(rows: I) -> Self
    where
        I: IntoIterator<Item = (S, N)>,
        S: Into<String>,
        N: Into<String>,
    {
        StationTable(
            rows.into_iter()
                .enumerate()
                .map(|(led_index, (stop_id, name))| StationRecord {
                    led_index,
                    stop_id: stop_id.into(),
                    name: name.into(),
                })
                .collect(),
        )
    }

    pub fn records(&self) -> &[StationRecord] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Reads the whole table; the file is closed before this returns.
pub fn read_table(path: &Path) -> Result<StationTable> {
    info!("Reading station table {}", path.display());
    let file = File::open(path).map_err(|e| Error::file_access(path, e))?;
    let table = parse(file, path)?;
    info!("Station table has {} rows", table.len());
    Ok(table)
}

fn parse<R: Read>(reader: R, path: &Path) -> Result<StationTable> {
    // Short rows must surface as a missing field, not as a csv length error.
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = rdr
        .headers()
        .map_err(|e| table_error(path, e))?
        .clone();
    let stop_id_column = column(&headers, STOP_ID, path)?;
    let name_column = column(&headers, NAME, path)?;
    debug!(stop_id_column, name_column, "Located required columns");

    let mut rows = Vec::new();
    for (position, record) in rdr.records().enumerate() {
        let record = record.map_err(|e| table_error(path, e))?;
        let row = position + 1;
        rows.push((
            field(&record, stop_id_column, STOP_ID, row, path)?,
            field(&record, name_column, NAME, row, path)?,
        ));
    }
    Ok(StationTable::from_rows(rows))
}

fn column(headers: &StringRecord, name: &'static str, path: &Path) -> Result<usize> {
    headers
        .iter()
        .position(|header| header == name)
        .ok_or_else(|| Error::MissingField {
            path: path.to_path_buf(),
            field: name,
            row: None,
        })
}

fn field(
    record: &StringRecord,
    column: usize,
    name: &'static str,
    row: usize,
    path: &Path,
) -> Result<String> {
    record
        .get(column)
        .map(str::to_string)
        .ok_or_else(|| Error::MissingField {
            path: path.to_path_buf(),
            field: name,
            row: Some(row),
        })
}

fn table_error(path: &Path, source: csv::Error) -> Error {
    if source.is_io_error() {
        Error::file_access(path, std::io::Error::other(source))
    } else {
        Error::MalformedTable {
            path: path.to_path_buf(),
            source,
        }
    }
}
