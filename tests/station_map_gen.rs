use assert_cmd::{assert::Assert, cargo_bin, prelude::*};
use pretty_assertions::assert_eq;
use std::{fs, path::Path, process::Command};
use tempfile::TempDir;

const TIMESTAMP: &str = "2025-09-27 14:23:37";

/// Lays out `scripts/`, `include/` and `src/` like the firmware tree, with
/// the station table copied into `scripts/`.
fn firmware_tree(table: &str) -> TempDir {
    let root = TempDir::new().expect("create temp dir failed");
    for dir in ["scripts", "include", "src"] {
        fs::create_dir(root.path().join(dir)).unwrap();
    }
    fs::copy(
        Path::new("tests/fixtures").join(table),
        root.path().join("scripts/stations.csv"),
    )
    .unwrap();
    root
}

fn read(path: impl AsRef<Path>) -> String {
    fs::read_to_string(path.as_ref())
        .unwrap_or_else(|_| panic!("file {:?} not found", path.as_ref()))
}

#[test]
fn test_default_paths() {
    let root = firmware_tree("stations.csv");
    Command::new(cargo_bin!("station-map-gen"))
        .current_dir(root.path().join("scripts"))
        .arg("--timestamp")
        .arg(TIMESTAMP)
        .assert()
        .success()
        .stdout(
            "Generated ../include/GeneratedStationMap.h successfully.\n\
             Generated ../src/GeneratedStationMap.cpp successfully.\n",
        );
    assert_eq!(
        read(root.path().join("include/GeneratedStationMap.h")),
        read("tests/fixtures/expected/GeneratedStationMap.h")
    );
    assert_eq!(
        read(root.path().join("src/GeneratedStationMap.cpp")),
        read("tests/fixtures/expected/GeneratedStationMap.cpp")
    );
}

#[test]
fn test_regeneration_is_byte_identical_and_overwrites() {
    let root = firmware_tree("stations.csv");
    let source = root.path().join("src/GeneratedStationMap.cpp");
    fs::write(&source, "stale content that is longer than nothing at all").unwrap();

    let mut outputs = Vec::new();
    for _ in 0..2 {
        Command::new(cargo_bin!("station-map-gen"))
            .current_dir(root.path().join("scripts"))
            .arg("--timestamp")
            .arg(TIMESTAMP)
            .assert()
            .success();
        outputs.push(fs::read(&source).unwrap());
    }
    assert_eq!(outputs[0], outputs[1]);
    assert_eq!(
        String::from_utf8(outputs[0].clone()).unwrap(),
        read("tests/fixtures/expected/GeneratedStationMap.cpp")
    );
}

#[test]
fn test_missing_name_column_writes_nothing() {
    let root = firmware_tree("missing_name.csv");
    let assert = Command::new(cargo_bin!("station-map-gen"))
        .current_dir(root.path().join("scripts"))
        .assert()
        .failure()
        .code(1);
    assert!(stderr(&assert).contains("missing required field `name`"));
    assert!(!root.path().join("include/GeneratedStationMap.h").exists());
    assert!(!root.path().join("src/GeneratedStationMap.cpp").exists());
}

#[test]
fn test_header_only_table() {
    let root = firmware_tree("header_only.csv");
    Command::new(cargo_bin!("station-map-gen"))
        .current_dir(root.path().join("scripts"))
        .arg("--timestamp")
        .arg(TIMESTAMP)
        .assert()
        .success();
    let source = read(root.path().join("src/GeneratedStationMap.cpp"));
    assert!(source.ends_with("std::map<int, Station> stationMap = {\n};\n"));
}

#[test]
fn test_unwritable_output() {
    let root = firmware_tree("stations.csv");
    let assert = Command::new(cargo_bin!("station-map-gen"))
        .current_dir(root.path().join("scripts"))
        .arg("--header-output")
        .arg("../no-such-dir/GeneratedStationMap.h")
        .assert()
        .failure();
    assert!(stderr(&assert).contains("cannot access ../no-such-dir/GeneratedStationMap.h"));
}

#[test]
fn test_missing_input() {
    let root = TempDir::new().expect("create temp dir failed");
    let assert = Command::new(cargo_bin!("station-map-gen"))
        .current_dir(root.path())
        .assert()
        .failure();
    assert!(stderr(&assert).contains("cannot access stations.csv"));
}

#[test]
fn test_rust_output_and_json_sidecar() {
    let root = firmware_tree("stations.csv");
    let module = root.path().join("station_table.rs");
    let json = root.path().join("stations.json");
    Command::new(cargo_bin!("station-map-gen"))
        .arg("--input")
        .arg(root.path().join("scripts/stations.csv"))
        .arg("--language")
        .arg("rust")
        .arg("--source-output")
        .arg(&module)
        .arg("--json-output")
        .arg(&json)
        .arg("--timestamp")
        .arg(TIMESTAMP)
        .assert()
        .success();

    let module = read(module);
    let entries: Vec<&str> = module
        .lines()
        .filter(|line| line.trim_start().starts_with("Station {"))
        .collect();
    assert_eq!(entries.len(), 4);
    assert_eq!(
        entries[3].trim(),
        "Station { led_index: 3, stop_id: \"106\", name: \"Marble Hill-225 St\" },"
    );
    assert!(!root.path().join("include/GeneratedStationMap.h").exists());

    let stations: serde_json::Value = serde_json::from_str(&read(json)).unwrap();
    assert_eq!(
        stations[1],
        serde_json::json!({ "led_index": 1, "stop_id": "103", "name": "238 St" })
    );
    assert_eq!(stations.as_array().unwrap().len(), 4);
}

#[test]
fn test_config_file() {
    let root = firmware_tree("stations.csv");
    let config = root.path().join("station_map.toml");
    fs::write(
        &config,
        "symbol = \"ledStations\"\ninclude_guard = \"LED_STATIONS_H\"\n",
    )
    .unwrap();
    Command::new(cargo_bin!("station-map-gen"))
        .current_dir(root.path().join("scripts"))
        .arg("--config")
        .arg(&config)
        .assert()
        .success();
    let header = read(root.path().join("include/GeneratedStationMap.h"));
    assert!(header.starts_with("#ifndef LED_STATIONS_H\n"));
    assert!(header.contains("extern std::map<int, Station> ledStations;\n"));
}

fn stderr(assert: &Assert) -> String {
    String::from_utf8_lossy(&assert.get_output().stderr).into_owned()
}
