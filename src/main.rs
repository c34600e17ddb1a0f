// EHR Access Simulator - Main Entry Point
//
// You can run it via Cargo:
//
// ```console
// $ cargo build --release
// $ ./target/release/ehr-access-simulator --events-output events.jsonl
// ```
//
// Or with custom configuration:
//
// ```console
// $ ./target/release/ehr-access-simulator --config config.json --classification-output labels.jsonl --verbose
// ```

use anyhow::{Context, Result};
use clap::Parser;
use ehr_access_simulator::classification::{histogram, ClassificationRecord, ClassificationSummary};
use ehr_access_simulator::events::{EventLog, JsonlEventLog};
use ehr_access_simulator::simulation::{LoggingConfig, SimulationOrchestrator};
use ehr_access_simulator::types::config::CliArgs;
use ehr_access_simulator::types::{Label, SimulationConfig};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::process;
use tracing::{error, info};

fn main() {
    // Parse CLI arguments first to check for special flags
    let args = CliArgs::parse();

    if args.print_config {
        match SimulationConfig::default().print_json() {
            Ok(json) => {
                println!("{}", json);
                return;
            }
            Err(e) => {
                eprintln!("Failed to serialize default configuration: {}", e);
                process::exit(1);
            }
        }
    }

    // Initialize logging based on CLI flags
    let logging_result = if args.debug {
        LoggingConfig::init_debug()
    } else if args.verbose {
        LoggingConfig::init_verbose()
    } else {
        LoggingConfig::new().with_level(tracing::Level::WARN).init()
    };

    let _logging_guard = match logging_result {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            process::exit(1);
        }
    };

    info!("Starting EHR Access Simulator");

    if let Err(e) = run(args) {
        error!("Simulation failed: {:#}", e);
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }

    info!("EHR Access Simulator completed successfully");
}

fn run(args: CliArgs) -> Result<()> {
    let dry_run = args.dry_run;
    let config =
        SimulationConfig::from_cli_args(args).context("Failed to load configuration")?;
    config
        .validate()
        .context("Configuration validation failed")?;
    info!("Configuration loaded and validated successfully");

    if dry_run {
        eprintln!("Configuration validation successful!");
        eprintln!("Dry run mode - simulation will not be executed.");
        print_configuration_summary(&config);
        return Ok(());
    }

    print_startup_banner(&config);

    match config.events_output.clone() {
        Some(path) => {
            let file = File::create(&path)
                .with_context(|| format!("Failed to create events output file '{}'", path))?;
            run_simulation(config, JsonlEventLog::new(BufWriter::new(file)))?;
            eprintln!("Events written to: {}", path);
        }
        None => run_simulation(config, JsonlEventLog::new(BufWriter::new(io::stdout())))?,
    }

    Ok(())
}

/// Run the simulation into `log`, then classify and report
fn run_simulation<W: Write + std::fmt::Debug>(
    config: SimulationConfig,
    log: JsonlEventLog<W>,
) -> Result<()> {
    let mut orchestrator = SimulationOrchestrator::new(config.clone(), log)
        .context("Failed to initialize simulation")?;
    eprintln!(
        "Generating events for {} days ({} practitioners)...",
        config.days,
        orchestrator.practitioners().len()
    );

    orchestrator.run().context("Simulation run failed")?;
    eprintln!("{}", orchestrator.statistics().generate_summary_report());

    let records = orchestrator
        .classify()
        .context("Failed to classify events")?;
    report_classification(&config, &records)?;

    let (_, memory) = orchestrator
        .into_log()
        .into_parts()
        .context("Failed to flush events output")?;
    info!("Flushed {} events", memory.len());
    Ok(())
}

/// Print the classification summary and write the optional outputs
fn report_classification(config: &SimulationConfig, records: &[ClassificationRecord]) -> Result<()> {
    let summary = ClassificationSummary::from_records(records);
    let bins = histogram(records);

    eprintln!("Classification ({} hour windows):", config.window_hours);
    eprintln!("   {}", summary);
    for bin in bins.iter().filter(|bin| bin.count > 0) {
        eprintln!("   Row {:>2} ({}): {}", bin.table_id, bin.label, bin.count);
    }
    let unrelated_anomalies = records
        .iter()
        .filter(|r| r.label == Label::Anomaly && r.prior_relationship == Some(false))
        .count();
    eprintln!("   Anomalies without a prior relationship: {}", unrelated_anomalies);
    eprintln!();

    if let Some(path) = &config.classification_output {
        let file = File::create(path)
            .with_context(|| format!("Failed to create classification output file '{}'", path))?;
        let mut writer = BufWriter::new(file);
        for record in records {
            let line = serde_json::to_string(record).context("Failed to serialize record")?;
            writeln!(writer, "{}", line).context("Failed to write classification record")?;
        }
        writer.flush().context("Failed to flush classification output")?;
        eprintln!("Classification records written to: {}", path);
    }

    if let Some(path) = &config.histogram_output {
        let json = serde_json::to_string_pretty(&bins).context("Failed to serialize histogram")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write histogram output file '{}'", path))?;
        eprintln!("Histogram written to: {}", path);
    }

    Ok(())
}

/// Print startup banner and configuration summary
fn print_startup_banner(config: &SimulationConfig) {
    eprintln!("EHR Access Simulator");
    eprintln!("====================");
    eprintln!("Synthetic healthcare activity logs with Normal/Anomaly labels");
    eprintln!();

    print_configuration_summary(config);
}

/// Print configuration summary
fn print_configuration_summary(config: &SimulationConfig) {
    eprintln!("Configuration:");
    eprintln!("  Practitioners: {}", config.practitioner_count);
    eprintln!(
        "  Shift Mix: {}",
        config
            .effective_shift_mix()
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    );
    eprintln!(
        "  Patients: {} initial, {} target",
        config.population.initial_patients, config.population.target_population
    );
    eprintln!(
        "  Population Dynamics: p_add {:.3}, p_discharge {:.3}",
        config.population.p_add, config.population.p_discharge
    );
    eprintln!("  Cooldown: {} minutes", config.population.cooldown_minutes);
    eprintln!("  Days: {} (from {})", config.days, config.start_date);
    eprintln!("  Window: {} hours", config.window_hours);
    eprintln!("  Random Seed: {}", config.seed);
    eprintln!();
}
