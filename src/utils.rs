use fs_err::File;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::{
    io::{BufWriter, Write},
    path::Path,
};
use tracing::info;

use super::error::{Error, Result};

/// Creates a progress bar for monitoring function progress.
pub fn progress_bar_for_count(count: usize) -> ProgressBar {
    ProgressBar::new(count as u64).with_style(
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{wide_bar:.cyan/blue}] {human_pos}/{human_len} ({per_sec}, {eta})",
        )
        .expect("progress template is valid"),
    )
}

/// Replaces the whole file with `contents`.
pub fn write_text_file(path: &Path, contents: &str) -> Result<()> {
    info!("Writing to {}", path.display());
    fs_err::write(path, contents).map_err(|e| Error::file_access(path, e))
}

pub fn write_json_file<T: Serialize>(path: &Path, data: &T) -> Result<()> {
    info!("Writing to {}", path.display());
    let file = File::create(path).map_err(|e| Error::file_access(path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, data)
        .map_err(|e| Error::file_access(path, e.into()))?;
    writer.flush().map_err(|e| Error::file_access(path, e))
}
