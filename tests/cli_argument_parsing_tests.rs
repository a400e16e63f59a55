//! Tests for CLI argument parsing and configuration layering
//!
//! These tests verify that subcommands and global flags parse into the
//! expected values, and that command line options override the config file.

use physical_access_engine::types::config::{CliArgs, Command};
use physical_access_engine::types::{
    AreaId, ClientId, Cutoff, EngineConfig, EventId, NeverDisabledPolicy, OutputFormat,
};
use chrono::NaiveDate;
use clap::Parser;
use std::fs;
use tempfile::TempDir;

/// Test that a bare invocation parses with defaults
#[test]
fn test_defaults_without_command() {
    let args = CliArgs::try_parse_from(["physical-access"]).unwrap();
    assert!(args.command.is_none());
    assert!(!args.verbose);
    assert!(!args.strict_window);

    let config = EngineConfig::from_cli_args(&args).unwrap();
    assert_eq!(config.dataset_path, "physical-access.json");
    assert_eq!(config.get_output_format().unwrap(), OutputFormat::Json);
}

/// Test zero-filter defaults on query subcommands
#[test]
fn test_event_query_subcommand() {
    let args = CliArgs::try_parse_from(["physical-access", "events", "2024-01-01", "2024-01-31"])
        .unwrap();

    match args.command {
        Some(Command::Events { start, end, client, area }) => {
            assert_eq!(start, Cutoff::Day(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()));
            assert_eq!(end, Cutoff::Day(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()));
            assert_eq!(client, ClientId(0));
            assert_eq!(area, AreaId(0));
        }
        other => panic!("unexpected command: {:?}", other),
    }

    let args = CliArgs::try_parse_from([
        "physical-access",
        "raw-events",
        "2024-01-01T08:00",
        "2024-01-01",
        "--client",
        "CLIENT_42",
        "--area",
        "3",
    ])
    .unwrap();
    match args.command {
        Some(Command::RawEvents { client, area, .. }) => {
            assert_eq!(client, ClientId(42));
            assert_eq!(area, AreaId(3));
        }
        other => panic!("unexpected command: {:?}", other),
    }
}

/// Test alias defaults and the --at option
#[test]
fn test_currently_in_subcommand() {
    let args = CliArgs::try_parse_from(["physical-access", "currently-in"]).unwrap();
    match args.command {
        Some(Command::CurrentlyIn { alias, at }) => {
            assert_eq!(alias, "all");
            assert!(at.is_none());
        }
        other => panic!("unexpected command: {:?}", other),
    }

    let args = CliArgs::try_parse_from([
        "physical-access",
        "currently-in",
        "cleanroom",
        "--at",
        "2024-01-01T10:15",
    ])
    .unwrap();
    match args.command {
        Some(Command::CurrentlyIn { alias, at }) => {
            assert_eq!(alias, "cleanroom");
            assert!(matches!(at, Some(Cutoff::At(_))));
        }
        other => panic!("unexpected command: {:?}", other),
    }
}

/// Test identifier and day-count arguments
#[test]
fn test_search_and_reenable_subcommands() {
    let args =
        CliArgs::try_parse_from(["physical-access", "previous-in", "EVENT_7", "2024-01-01"]).unwrap();
    assert!(matches!(args.command, Some(Command::PreviousIn { event: EventId(7), .. })));

    let args =
        CliArgs::try_parse_from(["physical-access", "allow-reenable", "42", "--days", "10"]).unwrap();
    assert!(matches!(
        args.command,
        Some(Command::AllowReenable { client: ClientId(42), days: Some(10) })
    ));
}

/// Test malformed arguments are rejected by the parser
#[test]
fn test_invalid_arguments_rejected() {
    assert!(CliArgs::try_parse_from(["physical-access", "events", "yesterday", "2024-01-01"])
        .is_err());
    assert!(CliArgs::try_parse_from(["physical-access", "badges", "BADGE_1"]).is_err());
    assert!(CliArgs::try_parse_from(["physical-access", "add-client", "42"]).is_err());
}

/// Test global flags override config file values
#[test]
fn test_cli_overrides_config_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("engine.json");
    fs::write(
        &path,
        r#"{
            "dataset_path": "from-file.json",
            "output_format": "csv",
            "never_disabled_policy": "allow",
            "default_reenable_days": 14
        }"#,
    )
    .unwrap();

    let args = CliArgs::try_parse_from([
        "physical-access",
        "--config",
        path.to_str().unwrap(),
        "--dataset",
        "from-cli.json",
        "--never-disabled-policy",
        "deny",
        "--strict-window",
        "--require-active-card",
    ])
    .unwrap();
    let config = EngineConfig::from_cli_args(&args).unwrap();

    assert_eq!(config.dataset_path, "from-cli.json");
    assert_eq!(config.get_output_format().unwrap(), OutputFormat::Csv);
    assert_eq!(config.default_reenable_days, 14);
    assert_eq!(config.never_disabled_policy, NeverDisabledPolicy::Deny);
    assert!(config.occupancy_requires_active_card);
    assert!(!config.violation_look_behind);
    assert!(!config.violation_look_ahead);
    assert!(config.validate().is_ok());
}

/// Test invalid policy values surface as configuration errors
#[test]
fn test_invalid_policy_value() {
    let args =
        CliArgs::try_parse_from(["physical-access", "--never-disabled-policy", "maybe"]).unwrap();
    assert!(EngineConfig::from_cli_args(&args).is_err());
}

/// Test validation catches an unsupported output format
#[test]
fn test_invalid_output_format_fails_validation() {
    let args = CliArgs::try_parse_from(["physical-access", "--output-format", "xml"]).unwrap();
    let config = EngineConfig::from_cli_args(&args).unwrap();
    assert!(config.validate().is_err());
}

/// Test negated flags revert settings enabled by the config file
#[test]
fn test_negated_flags_override_config_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("engine.json");
    fs::write(
        &path,
        r#"{
            "occupancy_requires_active_card": true,
            "violation_look_behind": false,
            "violation_look_ahead": false
        }"#,
    )
    .unwrap();
    let config_path = path.to_str().unwrap();

    let args = CliArgs::try_parse_from(["physical-access", "--config", config_path]).unwrap();
    let config = EngineConfig::from_cli_args(&args).unwrap();
    assert!(config.occupancy_requires_active_card);
    assert!(!config.violation_look_ahead);

    let args = CliArgs::try_parse_from([
        "physical-access",
        "--config",
        config_path,
        "--no-require-active-card",
        "--no-strict-window",
    ])
    .unwrap();
    let config = EngineConfig::from_cli_args(&args).unwrap();
    assert!(!config.occupancy_requires_active_card);
    assert!(config.violation_look_behind);
    assert!(config.violation_look_ahead);

    // The last of a flag pair wins
    let args = CliArgs::try_parse_from([
        "physical-access",
        "--strict-window",
        "--no-strict-window",
        "--no-require-active-card",
        "--require-active-card",
    ])
    .unwrap();
    assert!(!args.strict_window && args.no_strict_window);
    assert!(args.require_active_card && !args.no_require_active_card);
}
