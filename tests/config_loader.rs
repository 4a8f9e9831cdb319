use std::fs;

use record_browser::config::{BrowserConfig, ConfigError, Defaults, MAX_CATALOG_DEPTH};
use record_browser::filter::SortPolicy;
use tempfile::TempDir;

fn write_config(content: &str) -> (TempDir, std::path::PathBuf) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("config.toml");
    fs::write(&path, content).expect("Failed to write config");
    (dir, path)
}

/// Test that BrowserConfig::default() produces the documented values.
#[test]
fn test_config_default_values() {
    let config = BrowserConfig::default();
    assert_eq!(config.defaults.page_size, 20);
    assert_eq!(config.defaults.layout, "table");
    assert_eq!(config.defaults.catalog_depth, 1);
    assert!(!config.sort.text_descending);
    assert!(config.sort.other_descending);
}

/// Test that config_path() points into the record-browser directory.
#[test]
fn test_config_path_ends_with_expected() {
    let path = BrowserConfig::config_path();
    assert!(path.ends_with("record-browser/config.toml"));
}

/// Test that a partial file keeps defaults for missing keys.
#[test]
fn test_partial_file_fills_defaults() {
    let (_dir, path) = write_config(
        r#"
[defaults]
page_size = 50

[sort]
other_descending = false
"#,
    );
    let config = BrowserConfig::load_from(&path).unwrap();
    assert_eq!(config.defaults.page_size, 50);
    assert_eq!(config.defaults.layout, "table");
    assert_eq!(
        config.sort,
        SortPolicy {
            text_descending: false,
            other_descending: false,
        }
    );
}

/// Test that an empty file is the default config.
#[test]
fn test_empty_file_is_default() {
    let (_dir, path) = write_config("");
    assert_eq!(BrowserConfig::load_from(&path).unwrap(), BrowserConfig::default());
}

#[test]
fn test_validation_rejects_zero_page_size() {
    let config = BrowserConfig {
        defaults: Defaults {
            page_size: 0,
            ..Defaults::default()
        },
        ..BrowserConfig::default()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::ValidationError { .. })
    ));
}

#[test]
fn test_validation_rejects_deep_catalog() {
    let (_dir, path) = write_config(&format!(
        "[defaults]\ncatalog_depth = {}\n",
        MAX_CATALOG_DEPTH + 1
    ));
    let err = BrowserConfig::load_from(&path).unwrap_err();
    assert!(err.to_string().contains("Catalog depth"));
}

#[test]
fn test_malformed_toml_is_parse_error() {
    let (_dir, path) = write_config("[defaults\npage_size = ");
    assert!(matches!(
        BrowserConfig::load_from(&path),
        Err(ConfigError::ParseError { .. })
    ));
}

#[test]
fn test_missing_file_is_read_error() {
    let dir = TempDir::new().unwrap();
    let result = BrowserConfig::load_from(&dir.path().join("absent.toml"));
    assert!(matches!(result, Err(ConfigError::ReadError { .. })));
}
