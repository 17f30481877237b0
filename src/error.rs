use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot access {}", .path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// `row` is `None` when the column is absent from the header.
    #[error("{} is missing required field `{field}`{}", .path.display(), row_suffix(.row))]
    MissingField {
        path: PathBuf,
        field: &'static str,
        row: Option<usize>,
    },
    #[error("malformed station table {}", .path.display())]
    MalformedTable {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("invalid configuration {}: {message}", .path.display())]
    Config { path: PathBuf, message: String },
    #[error("invalid timestamp `{value}`, expected YYYY-MM-DD HH:MM:SS")]
    Timestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

fn row_suffix(row: &Option<usize>) -> String {
    match row {
        Some(row) => format!(" in row {row}"),
        None => " in its header".to_string(),
    }
}

impl Error {
    pub fn file_access(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::FileAccess {
            path: path.into(),
            source,
        }
    }
}
