//! Configuration file tests
//!
//! Values from the file fill settings left unset on the command line or in
//! the environment.

use clap::Parser;
use serial_test::serial;
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;
use toml::Table;
use vulnguard::app::cli::args::Args;

fn parse(extra: &[&str]) -> Args {
    let mut argv = vec!["vulnguard", "http://example.com"];
    argv.extend_from_slice(extra);
    Args::try_parse_from(argv).unwrap()
}

fn table(source: &str) -> Table {
    toml::from_str(source).unwrap()
}

#[test]
fn test_file_fills_unset_values() {
    let mut args = Args::default();
    let config = table(
        r#"
        zap-url = "http://zap.internal:8090"
        max-children = 40
        scan-policy = "Light"
        spider-timeout = 900
        report-format = "html"
        "#,
    );

    args.apply_toml_values(&config).unwrap();

    assert_eq!(args.zap_url.as_deref(), Some("http://zap.internal:8090"));
    let scan = args.scan_config();
    assert_eq!(scan.max_children, 40);
    assert_eq!(scan.scan_policy, "Light");
    assert_eq!(scan.discovery.timeout, Duration::from_secs(900));
    assert_eq!(scan.scanner_report_format.as_deref(), Some("html"));
}

#[test]
fn test_command_line_overrides_file() {
    let mut args = parse(&["--max-children", "3", "--zap-url", "http://cli:8080"]);
    let config = table(
        r#"
        zap-url = "http://file:8080"
        max-children = 40
        "#,
    );

    args.apply_toml_values(&config).unwrap();

    assert_eq!(args.zap_url.as_deref(), Some("http://cli:8080"));
    assert_eq!(args.max_children, Some(3));
}

#[test]
#[serial]
fn test_environment_api_key_overrides_file() {
    std::env::set_var("ZAP_API_KEY", "from-env");
    let mut args = parse(&[]);
    std::env::remove_var("ZAP_API_KEY");

    args.apply_toml_values(&table(r#"api-key = "from-file""#))
        .unwrap();

    assert_eq!(args.api_key.as_deref(), Some("from-env"));
}

#[test]
#[serial]
fn test_file_api_key_used_without_environment() {
    std::env::remove_var("ZAP_API_KEY");
    let mut args = parse(&[]);

    args.apply_toml_values(&table(r#"api-key = "from-file""#))
        .unwrap();

    assert_eq!(args.api_key.as_deref(), Some("from-file"));
}

#[test]
fn test_file_can_disable_but_not_enable_phases() {
    let mut disabled = parse(&[]);
    disabled
        .apply_toml_values(&table("spider = false\nrecurse = false"))
        .unwrap();
    let scan = disabled.scan_config();
    assert!(!scan.run_discovery);
    assert!(!scan.recurse);
    assert!(scan.run_active);

    let mut kept_off = parse(&["--no-active"]);
    kept_off.apply_toml_values(&table("active = true")).unwrap();
    assert!(!kept_off.scan_config().run_active);
}

#[test]
fn test_unknown_key_rejected() {
    let mut args = Args::default();
    let err = args
        .apply_toml_values(&table("spider-depth = 3"))
        .unwrap_err();
    assert!(err.to_string().contains("spider-depth"));
}

#[test]
fn test_wrong_value_type_rejected() {
    let mut args = Args::default();
    assert!(args
        .apply_toml_values(&table(r#"max-children = "ten""#))
        .is_err());
    assert!(args.apply_toml_values(&table("spider = 1")).is_err());
    assert!(args.apply_toml_values(&table("ready-timeout = -5")).is_err());
}

#[tokio::test]
async fn test_load_explicit_config_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "active-timeout = 120\nscope-alerts = true").unwrap();

    let path = file.path().to_str().unwrap().to_string();
    let mut args = parse(&["--config-file", &path]);

    let applied = args.load_config_file().await.unwrap();

    assert_eq!(applied.as_deref(), Some(file.path()));
    let scan = args.scan_config();
    assert_eq!(scan.active.timeout, Duration::from_secs(120));
    assert!(scan.scope_alerts_to_target);
}

#[tokio::test]
async fn test_missing_explicit_config_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.toml");
    let mut args = parse(&["--config-file", missing.to_str().unwrap()]);

    assert!(args.load_config_file().await.is_err());
}

#[tokio::test]
async fn test_malformed_config_file_is_an_error() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "max-children = [").unwrap();
    let mut args = parse(&["--config-file", file.path().to_str().unwrap()]);

    let err = args.load_config_file().await.unwrap_err();
    assert!(err.to_string().contains("parsing"));
}

#[test]
fn test_log_format_from_file_is_validated() {
    let mut args = parse(&[]);
    args.apply_toml_values(&table(r#"log-format = "yaml""#))
        .unwrap();

    assert!(args.validate().is_err());

    let mut ext = parse(&[]);
    ext.apply_toml_values(&table(r#"log-format = "ext""#)).unwrap();
    assert_eq!(
        ext.log_format().unwrap(),
        vulnguard::core::logging::LogFormat::Extended
    );
}
