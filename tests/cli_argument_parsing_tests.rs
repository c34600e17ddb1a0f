//! Tests for CLI argument parsing functionality
//!
//! These tests verify that command line arguments are properly parsed, that
//! they override configuration file values, and that invalid settings are
//! reported by validation.

use clap::Parser;
use ehr_access_simulator::types::config::{CliArgs, ConfigError, SimulationConfig};
use ehr_access_simulator::types::{ConfigValidationError, ShiftType};
use std::io::Write;
use tempfile::Builder;

/// Test parsing of the days argument
#[test]
fn test_days_argument_parsing() {
    let cli_args = CliArgs::try_parse_from(["test"]).unwrap();
    assert_eq!(cli_args.days, None);

    let cli_args = CliArgs::try_parse_from(["test", "--days", "28"]).unwrap();
    assert_eq!(cli_args.days, Some(28));

    let config = SimulationConfig::from_cli_args(cli_args).unwrap();
    assert_eq!(config.days, 28);
    assert_eq!(config.horizon_minutes(), 28 * 1440);
}

/// Omitted arguments fall back to defaults
#[test]
fn test_defaults_without_arguments() {
    let cli_args = CliArgs::try_parse_from(["test"]).unwrap();
    let config = SimulationConfig::from_cli_args(cli_args).unwrap();

    assert_eq!(config, SimulationConfig::default());
    assert_eq!(config.days, 336);
    assert_eq!(config.window_hours, 24);
    assert!(config.validate().is_ok());
}

/// Test parsing of population and seed arguments
#[test]
fn test_population_and_seed_arguments() {
    let cli_args = CliArgs::try_parse_from([
        "test",
        "--seed",
        "7",
        "--practitioner-count",
        "12",
        "--initial-patients",
        "30",
        "--target-population",
        "40",
        "--p-discharge",
        "0.05",
        "--cooldown-minutes",
        "2880",
    ])
    .unwrap();
    let config = SimulationConfig::from_cli_args(cli_args).unwrap();

    assert_eq!(config.seed, 7);
    assert_eq!(config.practitioner_count, 12);
    assert_eq!(config.population.initial_patients, 30);
    assert_eq!(config.population.target_population, 40);
    assert_eq!(config.population.p_discharge, 0.05);
    assert_eq!(config.population.cooldown_minutes, 2880);
}

/// Shift mix is a comma-separated list
#[test]
fn test_shift_mix_argument() {
    let cli_args =
        CliArgs::try_parse_from(["test", "--shift-mix", "full_time,evening,rotating_8_hour"])
            .unwrap();
    assert_eq!(
        cli_args.shift_mix,
        Some(vec![
            ShiftType::FullTime,
            ShiftType::EveningShift,
            ShiftType::Rotating8Hour
        ])
    );

    assert!(CliArgs::try_parse_from(["test", "--shift-mix", "graveyard"]).is_err());
}

/// A negative cooldown parses but fails validation
#[test]
fn test_negative_cooldown_is_rejected() {
    let cli_args = CliArgs::try_parse_from(["test", "--cooldown-minutes", "-5"]).unwrap();
    let config = SimulationConfig::from_cli_args(cli_args).unwrap();

    assert!(matches!(
        config.validate(),
        Err(ConfigValidationError::NegativeCooldown(-5))
    ));
}

/// Zero days and non-Monday start dates fail validation
#[test]
fn test_days_and_start_date_validation() {
    let cli_args = CliArgs::try_parse_from(["test", "--days", "0"]).unwrap();
    let config = SimulationConfig::from_cli_args(cli_args).unwrap();
    assert!(matches!(
        config.validate(),
        Err(ConfigValidationError::InvalidDaysCount(0))
    ));

    let cli_args = CliArgs::try_parse_from(["test", "--start-date", "2024-01-03"]).unwrap();
    let config = SimulationConfig::from_cli_args(cli_args).unwrap();
    assert!(matches!(
        config.validate(),
        Err(ConfigValidationError::InvalidStartDate(..))
    ));
}

/// CLI arguments take precedence over the configuration file
#[test]
fn test_cli_overrides_config_file() {
    let mut file = Builder::new().suffix(".json").tempfile().unwrap();
    write!(
        file,
        r#"{{"practitioner_count": 3, "days": 14, "seed": 11, "window_hours": 12}}"#
    )
    .unwrap();
    let path = file.path().to_string_lossy().to_string();

    let cli_args =
        CliArgs::try_parse_from(["test", "--config", path.as_str(), "--days", "21"]).unwrap();
    let config = SimulationConfig::from_cli_args(cli_args).unwrap();

    assert_eq!(config.practitioner_count, 3);
    assert_eq!(config.seed, 11);
    assert_eq!(config.window_hours, 12);
    assert_eq!(config.window_minutes(), 720);
    assert_eq!(config.days, 21);
}

/// Partial nested sections keep defaults for omitted fields
#[test]
fn test_partial_population_section() {
    let mut file = Builder::new().suffix(".json").tempfile().unwrap();
    write!(file, r#"{{"population": {{"cooldown_minutes": 720}}}}"#).unwrap();

    let config = SimulationConfig::from_file(file.path()).unwrap();
    assert_eq!(config.population.cooldown_minutes, 720);
    assert_eq!(
        config.population.initial_patients,
        SimulationConfig::default().population.initial_patients
    );
}

/// Missing and unsupported configuration files are reported
#[test]
fn test_config_file_errors() {
    assert!(matches!(
        SimulationConfig::from_file("/nonexistent/config.json"),
        Err(ConfigError::FileNotFound(_))
    ));

    let file = Builder::new().suffix(".yaml").tempfile().unwrap();
    assert!(matches!(
        SimulationConfig::from_file(file.path()),
        Err(ConfigError::UnsupportedFormat(_))
    ));
}

/// Saved configurations load back unchanged
#[test]
fn test_save_and_reload_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    let config = SimulationConfig {
        practitioner_count: 9,
        seed: 1234,
        ..Default::default()
    };

    config.save_to_file(&path).unwrap();
    let loaded = SimulationConfig::from_file(&path).unwrap();
    assert_eq!(loaded, config);
}
