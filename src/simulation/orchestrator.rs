//! Main simulation orchestrator
//!
//! Owns every component of a run and drives them through the scheduler: the
//! population processes are handled here, chain stages and standalone ticks
//! are handed to the [`SequenceGenerator`].

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Instant;
use tracing::{debug, info, instrument};

use crate::classification::{ClassificationEngine, ClassificationRecord};
use crate::events::{EventLog, GenerationContext, SequenceGenerator};
use crate::patient::PopulationManager;
use crate::practitioner::{Practitioner, PractitionerGenerator};
use crate::simulation::process::Process;
use crate::simulation::scheduler::{RunSummary, RunUntil, Scheduler};
use crate::simulation::{SimulationError, SimulationResult, SimulationStatistics, TimeManager};
use crate::types::SimulationConfig;

/// Main simulation orchestrator that coordinates all components
#[derive(Debug)]
pub struct SimulationOrchestrator<L: EventLog> {
    config: SimulationConfig,
    scheduler: Scheduler<Process>,
    rng: StdRng,
    practitioners: Vec<Practitioner>,
    population: PopulationManager,
    generator: SequenceGenerator,
    log: L,
    statistics: SimulationStatistics,
    time_manager: TimeManager,
}

impl<L: EventLog> SimulationOrchestrator<L> {
    /// Validate the configuration and set up practitioners, patients and recurring processes
    #[instrument(skip(config, log), fields(practitioners = config.practitioner_count, seed = config.seed))]
    pub fn new(config: SimulationConfig, log: L) -> SimulationResult<Self> {
        config.validate()?;
        info!(
            "Initializing simulation with {} practitioners and {} patients over {} days",
            config.practitioner_count, config.population.initial_patients, config.days
        );

        let mut rng = StdRng::seed_from_u64(config.seed);
        let practitioners = PractitionerGenerator::new()
            .generate(&config, &mut rng)
            .map_err(SimulationError::configuration_error)?;
        let population = PopulationManager::with_initial_patients(config.population.clone(), &mut rng);
        let generator =
            SequenceGenerator::new(config.sequence.clone(), config.standalone_access.clone())?;

        let mut statistics = SimulationStatistics::new();
        statistics.practitioner_count = practitioners.len();
        statistics.initial_population = population.active_count();
        statistics.days_simulated = config.days;

        let mut scheduler = Scheduler::new();
        scheduler.schedule_after(0, Process::SequenceTick)?;
        scheduler.schedule_after(0, Process::StandaloneAccessTick)?;
        let check_interval = config.population.check_interval_minutes as i64;
        scheduler.schedule_after(check_interval, Process::PopulationAddition)?;
        scheduler.schedule_after(check_interval, Process::PopulationDischarge)?;

        let time_manager = TimeManager::new(config.start_date);

        Ok(Self {
            config,
            scheduler,
            rng,
            practitioners,
            population,
            generator,
            log,
            statistics,
            time_manager,
        })
    }

    /// Run the simulation up to the configured horizon
    ///
    /// Continuations due at or after the horizon are abandoned and partial
    /// chains stay in the log. A scheduling or persistence failure stops the
    /// run; everything logged before it is kept.
    #[instrument(skip(self), fields(horizon = self.config.horizon_minutes()))]
    pub fn run(&mut self) -> SimulationResult<RunSummary> {
        let horizon = self.config.horizon_minutes();
        let started = Instant::now();
        info!(
            "Starting simulation from {} to {}",
            self.time_manager.format(0),
            self.time_manager.format(horizon)
        );

        let Self {
            scheduler,
            rng,
            practitioners,
            population,
            generator,
            log,
            statistics,
            config,
            ..
        } = self;
        let check_interval = config.population.check_interval_minutes as i64;

        let summary = scheduler.run(
            RunUntil::Time(horizon),
            |scheduler: &mut Scheduler<Process>, process: Process| -> SimulationResult<()> {
                debug!(process = process.name(), now = scheduler.now(), "dispatching");
                match process {
                    Process::PopulationAddition => {
                        let change = population.addition_tick(scheduler.now(), &mut *rng);
                        statistics.patients_added += change.added.len() as u64;
                        scheduler.schedule_after(check_interval, Process::PopulationAddition)?;
                        Ok(())
                    }
                    Process::PopulationDischarge => {
                        let change = population.discharge_tick(scheduler.now(), &mut *rng);
                        statistics.patients_discharged += change.discharged.len() as u64;
                        statistics.discharges_deferred += change.discharge_deferred as u64;
                        scheduler.schedule_after(check_interval, Process::PopulationDischarge)?;
                        Ok(())
                    }
                    process => {
                        let mut ctx = GenerationContext {
                            scheduler,
                            rng: &mut *rng,
                            practitioners: practitioners.as_slice(),
                            population: &mut *population,
                            log: &mut *log,
                            statistics: &mut *statistics,
                        };
                        dispatch_generation(generator, &mut ctx, process)
                    }
                }
            },
        )
        .map_err(SimulationError::logged)?;

        self.statistics.dispatched_processes = summary.dispatched;
        self.statistics.final_sim_minute = summary.final_time;
        self.statistics.final_active_population = self.population.active_count();
        self.statistics.chains_abandoned = self
            .population
            .all_patients()
            .iter()
            .map(|p| u64::from(p.in_flight_chains))
            .sum();
        self.statistics.simulation_duration = started.elapsed();

        info!(
            "Simulation finished at {}: {}",
            self.time_manager.format(summary.final_time),
            self.statistics
        );
        Ok(summary)
    }

    /// Classify the logged events with the configured window length
    ///
    /// Records carry whether each pair had a prior care relationship.
    pub fn classify(&self) -> SimulationResult<Vec<ClassificationRecord>> {
        Ok(ClassificationEngine::new(self.config.window_minutes()).classify_log(&self.log)?)
    }

    /// Run configuration
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Run statistics
    pub fn statistics(&self) -> &SimulationStatistics {
        &self.statistics
    }

    /// Practitioner roster
    pub fn practitioners(&self) -> &[Practitioner] {
        &self.practitioners
    }

    /// Patient population
    pub fn population(&self) -> &PopulationManager {
        &self.population
    }

    /// Event log
    pub fn log(&self) -> &L {
        &self.log
    }

    /// Simulated-minute to calendar mapping
    pub fn time_manager(&self) -> &TimeManager {
        &self.time_manager
    }

    /// Hand the event log back
    pub fn into_log(self) -> L {
        self.log
    }
}

fn dispatch_generation(
    generator: &SequenceGenerator,
    ctx: &mut GenerationContext<'_>,
    process: Process,
) -> SimulationResult<()> {
    match process {
        Process::SequenceTick => generator.sequence_tick(ctx),
        Process::StandaloneAccessTick => generator.standalone_tick(ctx),
        Process::AwaitingEncounter {
            chain,
            appointment_id,
            start,
            duration,
        } => generator.encounter_stage(ctx, chain, appointment_id, start, duration),
        Process::AwaitingObservation {
            chain,
            encounter_id,
            window_end,
        } => generator.observation_stage(ctx, chain, encounter_id, window_end),
        Process::AwaitingBreakGlass {
            chain,
            observation_id,
        } => generator.break_glass_stage(ctx, chain, observation_id),
        Process::PopulationAddition | Process::PopulationDischarge => Err(
            SimulationError::event_generation_error("population process routed to the generator"),
        ),
    }
}
