//! Configuration structures for the EHR activity simulator
//!
//! This module contains the simulation configuration structure and validation logic
//! used to control the behavior and parameters of the simulation system.

use super::{DelayDistribution, DistributionError, ShiftType};
use chrono::{Datelike, NaiveDate, Weekday};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Command line arguments structure
#[derive(Debug, Clone, Default, Parser)]
#[command(
    name = "ehr-access-simulator",
    version = "0.1.0",
    about = "EHR Activity Simulator - Generates labeled synthetic healthcare access logs",
    long_about = "Generates appointments, encounters, observations and record access events for a population of practitioners and patients, then labels every (patient, practitioner, window) tuple as Normal or Anomaly using a fixed 16-row classification table.

EXAMPLES:
    # Run with default settings (5 practitioners, 50 patients, 48 weeks)
    ehr-access-simulator --events-output events.jsonl

    # Use a configuration file
    ehr-access-simulator --config config.json

    # Override specific settings
    ehr-access-simulator --practitioner-count 10 --days 28 --seed 7

    # Classify over 12 hour windows
    ehr-access-simulator --window-hours 12 --classification-output labels.jsonl

    # Generate configuration template
    ehr-access-simulator --print-config > my-config.json

    # Validate configuration without running
    ehr-access-simulator --config my-config.json --dry-run

CONFIGURATION:
    Configuration can be provided via:
    1. Command line arguments (highest priority)
    2. Configuration file (--config flag)
    3. Default values (lowest priority)

    Supported configuration file formats: JSON (.json)

    Use --print-config to generate a template configuration file."
)]
pub struct CliArgs {
    /// Configuration file path (JSON format)
    #[arg(
        short,
        long,
        help = "Configuration file path (JSON format)",
        long_help = "Path to a JSON configuration file. CLI arguments will override file settings."
    )]
    pub config: Option<String>,

    /// Number of practitioners to simulate
    #[arg(
        long,
        help = "Number of practitioners",
        long_help = "Number of practitioners in the simulation. Must be greater than 0. Default: 5"
    )]
    pub practitioner_count: Option<usize>,

    /// Shift types to draw practitioners from
    #[arg(
        long,
        value_delimiter = ',',
        help = "Comma-separated shift types to draw from",
        long_help = "Shift types practitioners are drawn from, e.g. full_time,evening_shift,rotating_8_hour. Default: all six shift types"
    )]
    pub shift_mix: Option<Vec<ShiftType>>,

    /// Number of patients at simulation start
    #[arg(long, help = "Initial patient population")]
    pub initial_patients: Option<usize>,

    /// Population the addition process grows toward
    #[arg(long, help = "Target patient population")]
    pub target_population: Option<usize>,

    /// Probability of adding a patient at each population check
    #[arg(long, help = "Patient addition probability (0.0-1.0)")]
    pub p_add: Option<f64>,

    /// Probability of discharging each idle patient at each population check
    #[arg(long, help = "Patient discharge probability (0.0-1.0)")]
    pub p_discharge: Option<f64>,

    /// Minimum minutes between a patient's consecutive appointments
    #[arg(
        long,
        allow_hyphen_values = true,
        help = "Patient cooldown between appointments (minutes)",
        long_help = "Minimum simulated minutes between two appointments of the same patient. Must not be negative. Default: 1440"
    )]
    pub cooldown_minutes: Option<i64>,

    /// Number of days to simulate
    #[arg(
        long,
        help = "Number of days to simulate",
        long_help = "Number of simulated days (the horizon). Must be greater than 0. Default: 336 (48 weeks)"
    )]
    pub days: Option<usize>,

    /// Random seed for reproducible results
    #[arg(long, help = "Random seed for reproducible results")]
    pub seed: Option<u64>,

    /// Aggregation window for classification, in hours
    #[arg(long, help = "Classification window size in hours")]
    pub window_hours: Option<u64>,

    /// Calendar date of simulated minute 0 (must be a Monday)
    #[arg(long, help = "Calendar date of simulation start (YYYY-MM-DD, a Monday)")]
    pub start_date: Option<NaiveDate>,

    /// Output path for the event log
    #[arg(long, help = "Output path for events JSONL file (default: stdout)")]
    pub events_output: Option<String>,

    /// Output path for classification records
    #[arg(long, help = "Output path for classification records JSONL file")]
    pub classification_output: Option<String>,

    /// Output path for the classification histogram
    #[arg(long, help = "Output path for classification histogram JSON file")]
    pub histogram_output: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, help = "Enable verbose logging")]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(short, long, help = "Enable debug logging")]
    pub debug: bool,

    /// Dry run mode - validate configuration without running simulation
    #[arg(long, help = "Validate configuration without running simulation")]
    pub dry_run: bool,

    /// Print default configuration and exit
    #[arg(long, help = "Print default configuration in JSON format and exit")]
    pub print_config: bool,
}

/// Patient population dynamics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    /// Patients admitted at minute 0
    pub initial_patients: usize,

    /// Population the addition process grows toward
    pub target_population: usize,

    /// Fraction of the target below which patients are added unconditionally
    pub min_population_ratio: f64,

    /// Most patients added by a single refill below the floor
    pub max_additions_per_check: usize,

    /// Probability of adding one patient per check while below target
    pub p_add: f64,

    /// Probability of discharging each idle patient per check
    pub p_discharge: f64,

    /// Probability of discharging a patient when one of its chains ends
    pub discharge_after_chain_probability: f64,

    /// Minutes between population checks
    pub check_interval_minutes: u64,

    /// Minimum minutes between a patient's consecutive appointments
    pub cooldown_minutes: i64,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            initial_patients: 50,
            target_population: 50,
            min_population_ratio: 0.7,
            max_additions_per_check: 3,
            p_add: 0.1,
            p_discharge: 0.01,
            discharge_after_chain_probability: 0.05,
            check_interval_minutes: 1440,
            cooldown_minutes: 1440,
        }
    }
}

impl PopulationConfig {
    /// Active population below which additions are forced
    pub fn population_floor(&self) -> usize {
        (self.target_population as f64 * self.min_population_ratio).floor() as usize
    }
}

/// Event chain generation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequenceConfig {
    /// Relative weights of the Appointment-, Encounter- and Observation-first templates
    pub template_weights: [f64; 3],

    /// Probability that a kept appointment leads to an encounter
    pub encounter_probability: f64,

    /// Probability that an encounter leads to observations
    pub observation_probability: f64,

    /// Probability that observations lead to a break-glass access
    pub break_glass_probability: f64,

    /// Probability that a booked appointment is cancelled
    pub cancellation_probability: f64,

    /// Probability that a booked appointment is a no-show
    pub no_show_probability: f64,

    /// Visit lengths in minutes, drawn uniformly
    pub visit_durations: Vec<u64>,

    /// Most observations recorded per observation stage
    pub max_observations: usize,

    /// Minutes between generation ticks
    pub generation_interval: DelayDistribution,

    /// Minutes from booking to the earliest slot searched
    pub booking_lead: DelayDistribution,

    /// Offset of the encounter into its appointment, clamped to fit
    pub encounter_delay: DelayDistribution,

    /// Minutes from encounter start to the observation stage, clamped to the encounter
    pub observation_delay: DelayDistribution,

    /// Minutes from the observation stage to a break-glass access
    pub break_glass_delay: DelayDistribution,

    /// How far ahead an appointment slot is searched, in minutes
    pub booking_lookahead_minutes: u64,

    /// Alignment of candidate appointment slots, in minutes
    pub slot_granularity_minutes: u64,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            template_weights: [0.75, 0.20, 0.05],
            encounter_probability: 0.5,
            observation_probability: 0.5,
            break_glass_probability: 0.025,
            cancellation_probability: 0.1,
            no_show_probability: 0.1,
            visit_durations: vec![15, 30, 45, 60],
            max_observations: 5,
            generation_interval: DelayDistribution::Exponential { mean: 15.0 },
            booking_lead: DelayDistribution::Uniform { min: 0, max: 2880 },
            encounter_delay: DelayDistribution::Uniform { min: 0, max: 15 },
            observation_delay: DelayDistribution::Uniform { min: 0, max: 10 },
            break_glass_delay: DelayDistribution::Uniform { min: 0, max: 10 },
            booking_lookahead_minutes: 7 * 24 * 60,
            slot_granularity_minutes: 15,
        }
    }
}

/// Independent access events not tied to a chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StandaloneAccessConfig {
    /// Minutes between standalone access ticks
    pub tick_interval: DelayDistribution,

    /// Probability that a tick emits a break-glass access
    pub break_glass_probability: f64,

    /// Probability that a tick emits a normal access
    pub normal_access_probability: f64,
}

impl Default for StandaloneAccessConfig {
    fn default() -> Self {
        Self {
            tick_interval: DelayDistribution::Uniform { min: 60, max: 1440 },
            break_glass_probability: 0.0125,
            normal_access_probability: 0.0125,
        }
    }
}

/// Configuration file structure (allows partial configuration)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigFile {
    /// Number of practitioners to simulate
    pub practitioner_count: Option<usize>,

    /// Shift types to draw practitioners from
    pub shift_mix: Option<Vec<ShiftType>>,

    /// Patient population dynamics
    pub population: Option<PopulationConfig>,

    /// Event chain generation parameters
    pub sequence: Option<SequenceConfig>,

    /// Standalone access events
    pub standalone_access: Option<StandaloneAccessConfig>,

    /// Random seed for reproducible results
    pub seed: Option<u64>,

    /// Number of days to simulate
    pub days: Option<usize>,

    /// Classification window size in hours
    pub window_hours: Option<u64>,

    /// Calendar date of simulated minute 0
    pub start_date: Option<NaiveDate>,

    /// Output path for the event log
    pub events_output: Option<String>,

    /// Output path for classification records
    pub classification_output: Option<String>,

    /// Output path for the classification histogram
    pub histogram_output: Option<String>,
}

/// Configuration for the EHR activity simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Number of practitioners to simulate
    pub practitioner_count: usize,

    /// Shift types to draw practitioners from (empty means all types)
    pub shift_mix: Vec<ShiftType>,

    /// Patient population dynamics
    pub population: PopulationConfig,

    /// Event chain generation parameters
    pub sequence: SequenceConfig,

    /// Standalone access events
    pub standalone_access: StandaloneAccessConfig,

    /// Random seed for reproducible results
    pub seed: u64,

    /// Number of days to simulate
    pub days: usize,

    /// Classification window size in hours
    pub window_hours: u64,

    /// Calendar date of simulated minute 0 (a Monday)
    pub start_date: NaiveDate,

    /// Output path for the event log (stdout when absent)
    pub events_output: Option<String>,

    /// Output path for classification records
    pub classification_output: Option<String>,

    /// Output path for the classification histogram
    pub histogram_output: Option<String>,
}

/// Configuration loading and validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// Configuration file read error
    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    /// JSON parsing error
    #[error("Failed to parse JSON configuration: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Unsupported configuration file format
    #[error("Unsupported configuration file format: {0} (supported: .json)")]
    UnsupportedFormat(String),
}

/// Validation errors for simulation configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    /// Practitioner count is invalid
    #[error("Practitioner count must be greater than 0, got {0}")]
    InvalidPractitionerCount(usize),

    /// Days count is invalid
    #[error("Days count must be greater than 0, got {0}")]
    InvalidDaysCount(usize),

    /// Classification window is invalid
    #[error("Classification window must be greater than 0 hours, got {0}")]
    InvalidWindow(u64),

    /// Target population is invalid
    #[error("Target population must be greater than 0, got {0}")]
    InvalidTargetPopulation(usize),

    /// Percentage value is out of range
    #[error("Invalid percentage for {field}: {value} (must be between 0.0 and 1.0)")]
    InvalidPercentage {
        /// Name of the field with invalid percentage
        field: String,
        /// The invalid percentage value
        value: f64,
    },

    /// Mutually exclusive outcomes add up to more than 1.0
    #[error("Probabilities for {field} must sum to at most 1.0, got {sum}")]
    InvalidProbabilitySum {
        /// Name of the outcome group
        field: String,
        /// The actual sum
        sum: f64,
    },

    /// Template weights are unusable
    #[error("Invalid template weights {0:?}: weights must be non-negative with a positive sum")]
    InvalidTemplateWeights([f64; 3]),

    /// Cooldown is negative
    #[error("Cooldown must not be negative, got {0}")]
    NegativeCooldown(i64),

    /// Visit durations are unusable
    #[error("Visit durations must be non-empty and positive, got {0:?}")]
    InvalidVisitDurations(Vec<u64>),

    /// A minute interval that must be positive is zero
    #[error("{0} must be greater than 0")]
    ZeroInterval(String),

    /// A delay distribution has invalid parameters
    #[error("Invalid delay distribution for {field}: {source}")]
    InvalidDistribution {
        /// Name of the distribution field
        field: String,
        /// Parameter problem
        #[source]
        source: DistributionError,
    },

    /// Start date is not a Monday
    #[error("Start date must be a Monday, got {0} ({1})")]
    InvalidStartDate(NaiveDate, Weekday),
}

/// Default calendar date of simulated minute 0
fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or(NaiveDate::MIN)
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            practitioner_count: 5,
            shift_mix: Vec::new(),
            population: PopulationConfig::default(),
            sequence: SequenceConfig::default(),
            standalone_access: StandaloneAccessConfig::default(),
            seed: 42,
            days: 7 * 12 * 4,
            window_hours: 24,
            start_date: default_start_date(),
            events_output: None,
            classification_output: None,
            histogram_output: None,
        }
    }
}

impl SimulationConfig {
    /// Create configuration from parsed CLI arguments
    pub fn from_cli_args(args: CliArgs) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(config_path) = &args.config {
            config = Self::from_file(config_path)?;
        }

        // CLI takes precedence over the file
        Self::apply_cli_overrides(&mut config, args);

        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => {
                let content = fs::read_to_string(path)?;
                let config_file: ConfigFile = serde_json::from_str(&content)?;
                Ok(Self::from_config_file(config_file))
            }
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
            None => Err(ConfigError::UnsupportedFormat("no extension".to_string())),
        }
    }

    /// Create configuration from a config file, merging with defaults
    fn from_config_file(config_file: ConfigFile) -> Self {
        let defaults = Self::default();

        Self {
            practitioner_count: config_file
                .practitioner_count
                .unwrap_or(defaults.practitioner_count),
            shift_mix: config_file.shift_mix.unwrap_or(defaults.shift_mix),
            population: config_file.population.unwrap_or(defaults.population),
            sequence: config_file.sequence.unwrap_or(defaults.sequence),
            standalone_access: config_file
                .standalone_access
                .unwrap_or(defaults.standalone_access),
            seed: config_file.seed.unwrap_or(defaults.seed),
            days: config_file.days.unwrap_or(defaults.days),
            window_hours: config_file.window_hours.unwrap_or(defaults.window_hours),
            start_date: config_file.start_date.unwrap_or(defaults.start_date),
            events_output: config_file.events_output.or(defaults.events_output),
            classification_output: config_file
                .classification_output
                .or(defaults.classification_output),
            histogram_output: config_file.histogram_output.or(defaults.histogram_output),
        }
    }

    /// Apply CLI argument overrides to configuration
    fn apply_cli_overrides(config: &mut Self, args: CliArgs) {
        if let Some(value) = args.practitioner_count {
            config.practitioner_count = value;
        }
        if let Some(value) = args.shift_mix {
            config.shift_mix = value;
        }
        if let Some(value) = args.initial_patients {
            config.population.initial_patients = value;
        }
        if let Some(value) = args.target_population {
            config.population.target_population = value;
        }
        if let Some(value) = args.p_add {
            config.population.p_add = value;
        }
        if let Some(value) = args.p_discharge {
            config.population.p_discharge = value;
        }
        if let Some(value) = args.cooldown_minutes {
            config.population.cooldown_minutes = value;
        }
        if let Some(value) = args.days {
            config.days = value;
        }
        if let Some(value) = args.seed {
            config.seed = value;
        }
        if let Some(value) = args.window_hours {
            config.window_hours = value;
        }
        if let Some(value) = args.start_date {
            config.start_date = value;
        }
        if let Some(value) = args.events_output {
            config.events_output = Some(value);
        }
        if let Some(value) = args.classification_output {
            config.classification_output = Some(value);
        }
        if let Some(value) = args.histogram_output {
            config.histogram_output = Some(value);
        }
    }

    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Print configuration as JSON
    pub fn print_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate the configuration parameters
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.practitioner_count == 0 {
            return Err(ConfigValidationError::InvalidPractitionerCount(
                self.practitioner_count,
            ));
        }

        if self.days == 0 {
            return Err(ConfigValidationError::InvalidDaysCount(self.days));
        }

        if self.window_hours == 0 {
            return Err(ConfigValidationError::InvalidWindow(self.window_hours));
        }

        if self.start_date.weekday() != Weekday::Mon {
            return Err(ConfigValidationError::InvalidStartDate(
                self.start_date,
                self.start_date.weekday(),
            ));
        }

        self.validate_population()?;
        self.validate_sequence()?;
        self.validate_standalone_access()?;

        Ok(())
    }

    fn validate_population(&self) -> Result<(), ConfigValidationError> {
        let population = &self.population;

        if population.target_population == 0 {
            return Err(ConfigValidationError::InvalidTargetPopulation(
                population.target_population,
            ));
        }

        if population.cooldown_minutes < 0 {
            return Err(ConfigValidationError::NegativeCooldown(
                population.cooldown_minutes,
            ));
        }

        if population.check_interval_minutes == 0 {
            return Err(ConfigValidationError::ZeroInterval(
                "population.check_interval_minutes".to_string(),
            ));
        }

        validate_percentage("population.min_population_ratio", population.min_population_ratio)?;
        validate_percentage("population.p_add", population.p_add)?;
        validate_percentage("population.p_discharge", population.p_discharge)?;
        validate_percentage(
            "population.discharge_after_chain_probability",
            population.discharge_after_chain_probability,
        )?;

        Ok(())
    }

    fn validate_sequence(&self) -> Result<(), ConfigValidationError> {
        let sequence = &self.sequence;

        let weights = sequence.template_weights;
        let weight_sum: f64 = weights.iter().sum();
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) || weight_sum <= 0.0 {
            return Err(ConfigValidationError::InvalidTemplateWeights(weights));
        }

        validate_percentage("sequence.encounter_probability", sequence.encounter_probability)?;
        validate_percentage("sequence.observation_probability", sequence.observation_probability)?;
        validate_percentage("sequence.break_glass_probability", sequence.break_glass_probability)?;
        validate_percentage("sequence.cancellation_probability", sequence.cancellation_probability)?;
        validate_percentage("sequence.no_show_probability", sequence.no_show_probability)?;

        let outcome_sum = sequence.cancellation_probability + sequence.no_show_probability;
        if outcome_sum > 1.0 {
            return Err(ConfigValidationError::InvalidProbabilitySum {
                field: "sequence.cancellation_probability + sequence.no_show_probability"
                    .to_string(),
                sum: outcome_sum,
            });
        }

        if sequence.visit_durations.is_empty() || sequence.visit_durations.contains(&0) {
            return Err(ConfigValidationError::InvalidVisitDurations(
                sequence.visit_durations.clone(),
            ));
        }

        if sequence.max_observations == 0 {
            return Err(ConfigValidationError::ZeroInterval(
                "sequence.max_observations".to_string(),
            ));
        }
        if sequence.booking_lookahead_minutes == 0 {
            return Err(ConfigValidationError::ZeroInterval(
                "sequence.booking_lookahead_minutes".to_string(),
            ));
        }
        if sequence.slot_granularity_minutes == 0 {
            return Err(ConfigValidationError::ZeroInterval(
                "sequence.slot_granularity_minutes".to_string(),
            ));
        }

        validate_distribution("sequence.generation_interval", &sequence.generation_interval)?;
        validate_distribution("sequence.booking_lead", &sequence.booking_lead)?;
        validate_distribution("sequence.encounter_delay", &sequence.encounter_delay)?;
        validate_distribution("sequence.observation_delay", &sequence.observation_delay)?;
        validate_distribution("sequence.break_glass_delay", &sequence.break_glass_delay)?;

        Ok(())
    }

    fn validate_standalone_access(&self) -> Result<(), ConfigValidationError> {
        let standalone = &self.standalone_access;

        validate_percentage(
            "standalone_access.break_glass_probability",
            standalone.break_glass_probability,
        )?;
        validate_percentage(
            "standalone_access.normal_access_probability",
            standalone.normal_access_probability,
        )?;

        let sum = standalone.break_glass_probability + standalone.normal_access_probability;
        if sum > 1.0 {
            return Err(ConfigValidationError::InvalidProbabilitySum {
                field: "standalone_access".to_string(),
                sum,
            });
        }

        validate_distribution("standalone_access.tick_interval", &standalone.tick_interval)
    }

    /// Simulation horizon in minutes
    pub fn horizon_minutes(&self) -> u64 {
        self.days as u64 * 24 * 60
    }

    /// Classification window length in minutes
    pub fn window_minutes(&self) -> u64 {
        self.window_hours * 60
    }

    /// Shift types practitioners are drawn from
    pub fn effective_shift_mix(&self) -> &[ShiftType] {
        if self.shift_mix.is_empty() {
            &ShiftType::ALL
        } else {
            &self.shift_mix
        }
    }
}

/// Helper to validate probability values
fn validate_percentage(field: &str, value: f64) -> Result<(), ConfigValidationError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigValidationError::InvalidPercentage {
            field: field.to_string(),
            value,
        });
    }
    Ok(())
}

fn validate_distribution(
    field: &str,
    distribution: &DelayDistribution,
) -> Result<(), ConfigValidationError> {
    distribution
        .validate()
        .map_err(|source| ConfigValidationError::InvalidDistribution {
            field: field.to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulation_config_default() {
        let config = SimulationConfig::default();

        assert_eq!(config.practitioner_count, 5);
        assert!(config.shift_mix.is_empty());
        assert_eq!(config.population.initial_patients, 50);
        assert_eq!(config.population.target_population, 50);
        assert_eq!(config.population.population_floor(), 35);
        assert_eq!(config.population.cooldown_minutes, 1440);
        assert_eq!(config.sequence.template_weights, [0.75, 0.20, 0.05]);
        assert_eq!(config.sequence.break_glass_probability, 0.025);
        assert_eq!(config.standalone_access.break_glass_probability, 0.0125);
        assert_eq!(config.seed, 42);
        assert_eq!(config.days, 336);
        assert_eq!(config.window_hours, 24);
        assert_eq!(config.start_date.weekday(), Weekday::Mon);
    }

    #[test]
    fn test_cli_parsing() {
        let args = vec![
            "test",
            "--days",
            "5",
            "--shift-mix",
            "full_time,weekend",
            "--start-date",
            "2024-01-08",
        ];
        let cli_args = CliArgs::try_parse_from(args).unwrap();
        assert_eq!(cli_args.days, Some(5));
        assert_eq!(
            cli_args.shift_mix,
            Some(vec![ShiftType::FullTime, ShiftType::WeekendOnly])
        );
        assert_eq!(cli_args.start_date, NaiveDate::from_ymd_opt(2024, 1, 8));

        let cli_args = CliArgs::try_parse_from(vec!["test"]).unwrap();
        assert_eq!(cli_args.days, None);
    }

    #[test]
    fn test_cli_overrides() {
        let args = CliArgs {
            practitioner_count: Some(8),
            p_add: Some(0.2),
            cooldown_minutes: Some(720),
            seed: Some(54321),
            days: Some(3),
            window_hours: Some(12),
            ..Default::default()
        };

        let config = SimulationConfig::from_cli_args(args).unwrap();

        assert_eq!(config.practitioner_count, 8);
        assert_eq!(config.population.p_add, 0.2);
        assert_eq!(config.population.cooldown_minutes, 720);
        assert_eq!(config.seed, 54321);
        assert_eq!(config.days, 3);
        assert_eq!(config.window_minutes(), 720);
        // Non-overridden fields keep their defaults
        assert_eq!(config.population.initial_patients, 50);
    }

    #[test]
    fn test_config_file_loading() {
        use std::io::Write;
        use tempfile::Builder;

        let mut temp_file = Builder::new().suffix(".json").tempfile().unwrap();
        let config_json = r#"{
            "practitioner_count": 3,
            "shift_mix": ["full_time", "rotating_8_hour"],
            "population": { "initial_patients": 20, "target_population": 30 },
            "sequence": {
                "break_glass_delay": { "kind": "exponential", "mean": 4.0 }
            },
            "seed": 12345,
            "days": 14
        }"#;

        temp_file.write_all(config_json.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = SimulationConfig::from_file(temp_file.path()).unwrap();

        assert_eq!(config.practitioner_count, 3);
        assert_eq!(
            config.shift_mix,
            vec![ShiftType::FullTime, ShiftType::Rotating8Hour]
        );
        assert_eq!(config.population.initial_patients, 20);
        assert_eq!(config.population.target_population, 30);
        // Unspecified nested fields fall back to defaults
        assert_eq!(config.population.cooldown_minutes, 1440);
        assert_eq!(
            config.sequence.break_glass_delay,
            DelayDistribution::Exponential { mean: 4.0 }
        );
        assert_eq!(config.sequence.template_weights, [0.75, 0.20, 0.05]);
        assert_eq!(config.seed, 12345);
        assert_eq!(config.days, 14);
    }

    #[test]
    fn test_config_file_errors() {
        assert!(matches!(
            SimulationConfig::from_file("/nonexistent/config.json"),
            Err(ConfigError::FileNotFound(_))
        ));

        let temp_file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        assert!(matches!(
            SimulationConfig::from_file(temp_file.path()),
            Err(ConfigError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_simulation_config_validation_success() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_bad_probability() {
        let mut config = SimulationConfig::default();
        config.population.p_discharge = 1.5;

        match config.validate() {
            Err(ConfigValidationError::InvalidPercentage { field, value }) => {
                assert_eq!(field, "population.p_discharge");
                assert_eq!(value, 1.5);
            }
            other => panic!("Expected InvalidPercentage error, got {:?}", other),
        }
    }

    #[test]
    fn test_validation_rejects_negative_cooldown() {
        let mut config = SimulationConfig::default();
        config.population.cooldown_minutes = -1;

        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::NegativeCooldown(-1))
        ));
    }

    #[test]
    fn test_validation_rejects_negative_delay() {
        let mut config = SimulationConfig::default();
        config.sequence.encounter_delay = DelayDistribution::Fixed { minutes: -10 };

        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::InvalidDistribution { .. })
        ));
    }

    #[test]
    fn test_validation_rejects_outcome_sum() {
        let mut config = SimulationConfig::default();
        config.sequence.cancellation_probability = 0.6;
        config.sequence.no_show_probability = 0.6;

        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::InvalidProbabilitySum { .. })
        ));
    }

    #[test]
    fn test_validation_rejects_zero_counts() {
        let mut config = SimulationConfig::default();
        config.practitioner_count = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::InvalidPractitionerCount(0))
        ));

        let mut config = SimulationConfig::default();
        config.days = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::InvalidDaysCount(0))
        ));

        let mut config = SimulationConfig::default();
        config.window_hours = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::InvalidWindow(0))
        ));
    }

    #[test]
    fn test_validation_rejects_template_weights() {
        let mut config = SimulationConfig::default();
        config.sequence.template_weights = [0.0, 0.0, 0.0];
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::InvalidTemplateWeights(_))
        ));
    }

    #[test]
    fn test_validation_rejects_non_monday_start() {
        let mut config = SimulationConfig::default();
        config.start_date = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::InvalidStartDate(_, Weekday::Wed))
        ));
    }

    #[test]
    fn test_config_json_round_trip() {
        let config = SimulationConfig::default();
        let json = config.print_json().unwrap();
        let parsed: SimulationConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_effective_shift_mix() {
        let mut config = SimulationConfig::default();
        assert_eq!(config.effective_shift_mix().len(), 6);

        config.shift_mix = vec![ShiftType::PartTime];
        assert_eq!(config.effective_shift_mix(), &[ShiftType::PartTime]);
    }
}
