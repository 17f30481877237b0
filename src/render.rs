use chrono::{Local, NaiveDateTime};
use indicatif::ParallelProgressIterator;
use rayon::prelude::*;
use std::{
    fmt,
    path::{Path, PathBuf},
};
use tracing::info;

use super::config::{GeneratorConfig, OutputLanguage};
use super::error::{Error, Result};
use super::records::{StationRecord, StationTable};
use super::utils::progress_bar_for_count;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const DO_NOT_EDIT: [&str; 2] = [
    "DO NOT EDIT: changes are overwritten the next time the map is generated.",
    "Entry order follows the physical LED chain: index N drives LED N.",
];

/// Timestamp written into every artifact's comment block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GenerationTime(NaiveDateTime);

impl GenerationTime {
    pub fn now() -> Self {
        GenerationTime(Local::now().naive_local())
    }

    pub fn parse(value: &str) -> Result<Self> {
        NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
            .map(GenerationTime)
            .map_err(|source| Error::Timestamp {
                value: value.to_string(),
                source,
            })
    }
}

impl fmt::Display for GenerationTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(TIMESTAMP_FORMAT))
    }
}

#[derive(Debug, PartialEq)]
pub struct GeneratedArtifact {
    pub path: PathBuf,
    pub contents: String,
}

/// Renders every artifact for the configured language, in memory.
pub fn artifacts(
    table: &StationTable,
    config: &GeneratorConfig,
    generated_on: GenerationTime,
) -> Vec<GeneratedArtifact> {
    info!(
        "Rendering {} stations as {:?} ({})",
        table.len(),
        config.language,
        generated_on
    );
    match config.language {
        OutputLanguage::Cpp => vec![
            GeneratedArtifact {
                path: config.header_output.clone(),
                contents: declaration(config, generated_on),
            },
            GeneratedArtifact {
                path: config.source_output(),
                contents: definition(table, config, generated_on),
            },
        ],
        OutputLanguage::Rust => vec![GeneratedArtifact {
            path: config.source_output(),
            contents: rust_module(table, config, generated_on),
        }],
    }
}

/// The C++ header: declares the map symbol without giving it storage, so it
/// can be included from any number of translation units.
pub fn declaration(config: &GeneratorConfig, generated_on: GenerationTime) -> String {
    let guard = &config.include_guard;
    let comment = block_comment(&[
        "Auto-generated station map header file".to_string(),
        format!("Generated on: {generated_on}"),
        String::new(),
        DO_NOT_EDIT[0].to_string(),
        DO_NOT_EDIT[1].to_string(),
        String::new(),
        format!(
            "Only declares the {} symbol. The definition is generated in",
            config.symbol
        ),
        format!(
            "{} so a single copy exists across translation units.",
            file_name(&config.source_output())
        ),
    ]);
    format!(
        "#ifndef {guard}\n\
         #define {guard}\n\
         \n\
         {comment}\
         \n\
         #include <string>\n\
         #include <map>\n\
         #include \"{header}\"\n\
         \n\
         extern {symbol};\n\
         \n\
         #endif // {guard}\n",
        header = config.record_header,
        symbol = map_symbol(config),
    )
}

/// The C++ source holding the one definition of the map, one entry per
/// station in ascending index order.
pub fn definition(
    table: &StationTable,
    config: &GeneratorConfig,
    generated_on: GenerationTime,
) -> String {
    let comment = block_comment(&[
        "Auto-generated station map definition".to_string(),
        format!("Generated on: {generated_on}"),
        String::new(),
        DO_NOT_EDIT[0].to_string(),
        DO_NOT_EDIT[1].to_string(),
    ]);
    let record_type = &config.record_type;
    let entries = render_entries(table, |station| {
        format!(
            "    {{{}, {record_type}(\"{}\", \"{}\")}},\n",
            station.led_index,
            escape_cpp(&station.stop_id),
            escape_cpp(&station.name)
        )
    });
    format!(
        "{comment}\
         \n\
         #include \"{header}\"\n\
         \n\
         {symbol} = {{\n\
         {entries}\
         }};\n",
        header = file_name(&config.header_output),
        symbol = map_symbol(config),
    )
}

/// A self-contained Rust module. The table is built by a function so the
/// caller owns its instance instead of sharing a global.
pub fn rust_module(
    table: &StationTable,
    config: &GeneratorConfig,
    generated_on: GenerationTime,
) -> String {
    let record_type = &config.record_type;
    let entries = render_entries(table, |station| {
        format!(
            "        {record_type} {{ led_index: {}, stop_id: \"{}\", name: \"{}\" }},\n",
            station.led_index,
            escape_rust(&station.stop_id),
            escape_rust(&station.name)
        )
    });
    format!(
        "// Auto-generated station table\n\
         // Generated on: {generated_on}\n\
         //\n\
         // {edit}\n\
         // {order}\n\
         \n\
         #[derive(Clone, Debug, PartialEq, Eq)]\n\
         pub struct {record_type} {{\n\
         \x20   pub led_index: usize,\n\
         \x20   pub stop_id: &'static str,\n\
         \x20   pub name: &'static str,\n\
         }}\n\
         \n\
         /// Position `n` holds the station lit by LED `n`.\n\
         pub fn station_table() -> Vec<{record_type}> {{\n\
         \x20   vec![\n\
         {entries}\
         \x20   ]\n\
         }}\n",
        edit = DO_NOT_EDIT[0],
        order = DO_NOT_EDIT[1],
    )
}

/// Escapes a value for a C++ narrow string literal. Control characters use
/// octal escapes since hex escapes would swallow following hex digits.
pub fn escape_cpp(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            c if c.is_ascii_control() => escaped.push_str(&format!("\\{:03o}", c as u32)),
            c => escaped.push(c),
        }
    }
    escaped
}

pub fn escape_rust(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            c if c.is_control() => escaped.push_str(&format!("\\u{{{:x}}}", c as u32)),
            c => escaped.push(c),
        }
    }
    escaped
}

// Order-preserving: collect on an indexed parallel iterator keeps input order.
fn render_entries<F>(table: &StationTable, render: F) -> String
where
    F: Fn(&StationRecord) -> String + Sync + Send,
{
    let progress = progress_bar_for_count(table.len());
    let lines: Vec<String> = table
        .records()
        .par_iter()
        .progress_with(progress.clone())
        .map(render)
        .collect();
    progress.finish_and_clear();
    lines.concat()
}

fn block_comment(lines: &[String]) -> String {
    let mut comment = String::from("/**\n");
    for line in lines {
        if line.is_empty() {
            comment.push_str(" *\n");
        } else {
            comment.push_str(&format!(" * {line}\n"));
        }
    }
    comment.push_str(" */\n");
    comment
}

fn map_symbol(config: &GeneratorConfig) -> String {
    format!("std::map<int, {}> {}", config.record_type, config.symbol)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .unwrap_or(path.as_os_str())
        .to_string_lossy()
        .into_owned()
}
