use fs_err::read_to_string;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

use super::error::{Error, Result};

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputLanguage {
    /// Header declaring the map plus a source file defining it.
    #[default]
    Cpp,
    /// A single module returning the table from a function.
    Rust,
}

/// Paths and symbol names used for one generation run.
///
/// Every field has a default, so running with no configuration reproduces the
/// firmware layout: the table sits next to the generator in `scripts/` and the
/// artifacts land in the sibling `include/` and `src/` directories.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    pub input: PathBuf,
    pub language: OutputLanguage,
    pub header_output: PathBuf,
    /// Falls back to a per-language default when unset.
    pub source_output: Option<PathBuf>,
    pub json_output: Option<PathBuf>,
    pub symbol: String,
    pub record_type: String,
    pub record_header: String,
    pub include_guard: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            input: PathBuf::from("stations.csv"),
            language: OutputLanguage::Cpp,
            header_output: PathBuf::from("../include/GeneratedStationMap.h"),
            source_output: None,
            json_output: None,
            symbol: "stationMap".to_string(),
            record_type: "Station".to_string(),
            record_header: "Station.h".to_string(),
            include_guard: "STATION_MAP_H".to_string(),
        }
    }
}

impl GeneratorConfig {
    /// Loads a TOML overlay; keys it leaves out keep their defaults.
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        info!("Loading configuration {}", path.display());
        let text = read_to_string(path).map_err(|e| Error::file_access(path, e))?;
        toml::from_str(&text).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn source_output(&self) -> PathBuf {
        match (&self.source_output, self.language) {
            (Some(path), _) => path.clone(),
            (None, OutputLanguage::Cpp) => PathBuf::from("../src/GeneratedStationMap.cpp"),
            (None, OutputLanguage::Rust) => PathBuf::from("station_table.rs"),
        }
    }
}
