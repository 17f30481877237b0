mod config;
mod error;
mod records;
mod render;
mod utils;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{
    filter::{EnvFilter, LevelFilter},
    layer::SubscriberExt as _,
    util::SubscriberInitExt as _,
};

use config::{GeneratorConfig, OutputLanguage};
use render::GenerationTime;

/// Generates the LED-ordered station map from a station table.
///
/// With no arguments it reads `stations.csv` and writes
/// `../include/GeneratedStationMap.h` and `../src/GeneratedStationMap.cpp`.
#[derive(Parser)]
#[clap(version)]
struct Args {
    /// TOML file overriding the built-in defaults.
    #[clap(long)]
    config: Option<PathBuf>,
    /// Station table with `stop_id` and `name` columns.
    #[clap(long)]
    input: Option<PathBuf>,
    #[clap(long, value_enum)]
    language: Option<OutputLanguage>,
    #[clap(long)]
    header_output: Option<PathBuf>,
    #[clap(long)]
    source_output: Option<PathBuf>,
    /// Also dump the station table as JSON.
    #[clap(long)]
    json_output: Option<PathBuf>,
    /// Fixed generation time (`YYYY-MM-DD HH:MM:SS`) instead of now.
    #[clap(long)]
    timestamp: Option<String>,
}

fn resolve_config(args: &Args) -> Result<GeneratorConfig> {
    let mut config = match &args.config {
        Some(path) => GeneratorConfig::from_toml_file(path)?,
        None => GeneratorConfig::default(),
    };
    if let Some(input) = &args.input {
        config.input = input.clone();
    }
    if let Some(language) = args.language {
        config.language = language;
    }
    if let Some(header_output) = &args.header_output {
        config.header_output = header_output.clone();
    }
    if let Some(source_output) = &args.source_output {
        config.source_output = Some(source_output.clone());
    }
    if let Some(json_output) = &args.json_output {
        config.json_output = Some(json_output.clone());
    }
    Ok(config)
}

fn run(args: Args) -> Result<()> {
    info!("Launching station-map-gen...");
    let config = resolve_config(&args)?;
    let generated_on = match &args.timestamp {
        Some(value) => GenerationTime::parse(value)?,
        None => GenerationTime::now(),
    };

    // Everything is read and rendered before the first write, so a bad table
    // never leaves fresh output behind.
    let table = records::read_table(&config.input)?;
    let artifacts = render::artifacts(&table, &config, generated_on);

    for artifact in &artifacts {
        utils::write_text_file(&artifact.path, &artifact.contents)?;
        println!("Generated {} successfully.", artifact.path.display());
    }
    if let Some(json_output) = &config.json_output {
        utils::write_json_file(json_output, &table)?;
        println!("Generated {} successfully.", json_output.display());
    }
    Ok(())
}

fn init_logger() {
    let default_level = LevelFilter::INFO;
    let rust_log =
        std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or_else(|_| default_level.to_string());
    let env_filter_subscriber = EnvFilter::try_new(rust_log).unwrap_or_else(|e| {
        eprintln!(
            "invalid {}, falling back to level '{}' - {}",
            EnvFilter::DEFAULT_ENV,
            default_level,
            e,
        );
        EnvFilter::new(default_level.to_string())
    });
    // stdout only carries the confirmation lines.
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(env_filter_subscriber)
        .init();
}

fn main() {
    init_logger();
    if let Err(err) = run(Args::parse()) {
        for cause in err.chain() {
            eprintln!("{}", cause);
        }
        std::process::exit(1);
    }
}
