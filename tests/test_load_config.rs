use std::fs::write;
use std::path::Path;

use stats_backfill::load_config::load_config;
use tempfile::NamedTempFile;

/// With no file given, the loader produces the built-in deployment defaults.
#[test]
fn load_config_defaults_when_no_file_is_given() {
    let config = load_config(None).expect("Defaults should load");

    assert_eq!(config.stats.base_url, "https://www.blaseball.com");
    assert_eq!(config.ingest.base_url, "http://localhost:4011");
    assert_eq!(config.games.seasons.len(), 2);
    assert_eq!(config.games.seasons[0].season, 0);
    assert_eq!(config.games.seasons[0].days, 115);
    assert_eq!(config.games.seasons[1].days, 99);
    assert_eq!(config.site.branch, "main");
    assert_eq!(config.site.fetch_limit, 8);
    assert!(
        config.site.formatter_command().is_some(),
        "Formatting is on by default"
    );
}

/// A partial file only overrides the keys it names; everything else keeps
/// its default.
#[test]
fn load_config_overrides_only_named_keys() {
    let config_yaml = r#"
ingest:
  base_url: http://ingest.internal:9000
site:
  formatter: none
  fetch_limit: 2
"#;
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), config_yaml).unwrap();

    let config = load_config(Some(config_file.path())).expect("Config should load");
    assert_eq!(config.ingest.base_url, "http://ingest.internal:9000");
    assert_eq!(
        config.ingest.player_source, "c57920eb-dcca-438b-bdc6-b0ca3deb0368",
        "Unnamed keys keep their defaults"
    );
    assert_eq!(config.site.formatter_command(), None);
    assert_eq!(config.site.fetch_limit, 2);
    assert_eq!(config.stats.base_url, "https://www.blaseball.com");
}

/// The season table is replaced wholesale when given.
#[test]
fn load_config_parses_a_season_table() {
    let config_yaml = r#"
games:
  seasons:
    - season: 3
      days: 20
"#;
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), config_yaml).unwrap();

    let config = load_config(Some(config_file.path())).expect("Config should load");
    assert_eq!(config.games.seasons.len(), 1);
    assert_eq!(config.games.seasons[0].season, 3);
    assert_eq!(config.games.seasons[0].days, 20);
}

/// Invalid YAML errors out with a parse diagnostic.
#[test]
fn load_config_errors_for_invalid_yaml() {
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), b"not-yaml: [:::").unwrap();

    let err = load_config(Some(config_file.path())).unwrap_err();
    let msg = err.to_string();
    assert!(
        msg.contains("parse") || msg.contains("YAML"),
        "Parse error expected, got: {msg}"
    );
}

/// A missing file is an error, not a silent fallback to defaults.
#[test]
fn load_config_errors_for_missing_file() {
    let err = load_config(Some(Path::new("/nonexistent/backfill.yaml"))).unwrap_err();
    assert!(
        err.to_string().contains("read"),
        "Read error expected, got: {err}"
    );
}
