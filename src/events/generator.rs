//! Event sequence generation
//!
//! Turns scheduler ticks into event chains. A chain starts from one of three
//! templates, and each later stage is an independent Bernoulli trial taken
//! after the previous stage was emitted. A failed trial ends the chain, which
//! is a normal outcome. Standalone break-glass and normal accesses come from a
//! separate tick that ignores relationships entirely.

use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, instrument, trace};

use super::event_log::EventLog;
use super::{AccessContext, Event, EventPayload};
use crate::patient::PopulationManager;
use crate::practitioner::{Practitioner, SlotSearch};
use crate::sim_event;
use crate::simulation::process::{ChainContext, Process};
use crate::simulation::scheduler::Scheduler;
use crate::simulation::statistics::SimulationStatistics;
use crate::simulation::time_manager::{SimMinutes, TimeWindow};
use crate::simulation::{SimulationError, SimulationResult};
use crate::types::{
    bernoulli, AppointmentStatus, ChainId, DelayDistribution, EventId, EventKind, PatientId, SequenceConfig,
    SequenceTemplate, StandaloneAccessConfig,
};

/// Vitals recorded by the observation stage, in recording order
pub const VITAL_SIGNS: [(&str, &str); 5] = [
    ("8310-5", "Body Temperature"),
    ("8867-4", "Heart Rate"),
    ("9279-1", "Respiratory Rate"),
    ("8480-6", "Blood Pressure"),
    ("2345-7", "Blood Glucose"),
];

const CANCELLATION_REASON: &str = "Patient cancelled";
const STANDALONE_BREAK_GLASS_PURPOSE: &str = "Emergency access - standalone event";
const NORMAL_ACCESS_PURPOSE: &str = "Routine record review";

/// Mutable simulation state a generation step works against
#[derive(Debug)]
pub struct GenerationContext<'a> {
    /// Scheduler for follow-up stages and ticks
    pub scheduler: &'a mut Scheduler<Process>,
    /// The run's only source of randomness
    pub rng: &'a mut StdRng,
    /// Practitioner roster
    pub practitioners: &'a [Practitioner],
    /// Patient population
    pub population: &'a mut PopulationManager,
    /// Event sink
    pub log: &'a mut dyn EventLog,
    /// Run counters
    pub statistics: &'a mut SimulationStatistics,
}

impl GenerationContext<'_> {
    fn now(&self) -> SimMinutes {
        self.scheduler.now()
    }

    fn emit(
        &mut self,
        chain: Option<&ChainContext>,
        patient: PatientId,
        practitioner: &Practitioner,
        payload: EventPayload,
    ) -> SimulationResult<EventId> {
        let id = EventId::generate(&mut *self.rng);
        let event = Event::new(
            id,
            patient,
            practitioner.id,
            self.now(),
            chain.map(|c| c.chain_id),
            payload,
        );
        trace!(id = %id, kind = %event.kind(), anchor = event.anchor_time(), "emitting event");
        // Only events the log accepted are counted
        let counted = event.clone();
        self.log.append(event)?;
        self.statistics.record_event(&counted);
        Ok(id)
    }

    fn practitioner(&self, chain: &ChainContext) -> SimulationResult<&Practitioner> {
        self.practitioners
            .iter()
            .find(|p| p.id == chain.practitioner)
            .ok_or_else(|| {
                SimulationError::event_generation_error(format!(
                    "chain {} references unknown practitioner {}",
                    chain.chain_id, chain.practitioner
                ))
            })
    }

    /// Intervals the practitioner is already committed to inside `range`
    fn busy_intervals(
        &self,
        practitioner: &Practitioner,
        range: TimeWindow,
    ) -> SimulationResult<Vec<TimeWindow>> {
        Ok(self
            .log
            .query_practitioner(practitioner.id, range)?
            .iter()
            .filter_map(|event| event.payload.occupied_interval())
            .collect())
    }
}

/// Creates event chains and standalone accesses
#[derive(Debug, Clone)]
pub struct SequenceGenerator {
    sequence: SequenceConfig,
    standalone: StandaloneAccessConfig,
    slots: SlotSearch,
    templates: WeightedIndex<f64>,
}

impl SequenceGenerator {
    /// Create a generator from validated configuration
    pub fn new(
        sequence: SequenceConfig,
        standalone: StandaloneAccessConfig,
    ) -> SimulationResult<Self> {
        let templates = WeightedIndex::new(sequence.template_weights).map_err(|e| {
            SimulationError::configuration_error(format!("invalid template weights: {}", e))
        })?;
        let slots = SlotSearch {
            lookahead: sequence.booking_lookahead_minutes,
            granularity: sequence.slot_granularity_minutes,
        };

        Ok(Self {
            sequence,
            standalone,
            slots,
            templates,
        })
    }

    /// Delay until the next generation tick (at least one minute)
    pub fn next_generation_delay(&self, rng: &mut StdRng) -> SimulationResult<i64> {
        Ok(self.sequence.generation_interval.sample(rng)?.max(1))
    }

    /// Delay until the next standalone access tick (at least one minute)
    pub fn next_standalone_delay(&self, rng: &mut StdRng) -> SimulationResult<i64> {
        Ok(self.standalone.tick_interval.sample(rng)?.max(1))
    }

    /// Draw a template by its configured weight
    pub fn pick_template(&self, rng: &mut StdRng) -> SequenceTemplate {
        SequenceTemplate::ALL[self.templates.sample(rng)]
    }

    /// Generation tick: reschedule, then try to start one chain
    #[instrument(level = "trace", skip_all, fields(now = ctx.now()))]
    pub fn sequence_tick(&self, ctx: &mut GenerationContext<'_>) -> SimulationResult<()> {
        let delay = self.next_generation_delay(ctx.rng)?;
        ctx.scheduler.schedule_after(delay, Process::SequenceTick)?;
        ctx.statistics.generation_ticks += 1;

        let Some(patient) = ctx.population.select_idle_patient(&mut *ctx.rng) else {
            ctx.statistics.no_eligible_patient_skips += 1;
            trace!("no idle patient for generation tick");
            return Ok(());
        };
        let template = self.pick_template(ctx.rng);
        let Some(practitioner) = ctx.practitioners.choose(&mut *ctx.rng) else {
            ctx.statistics.practitioner_unavailable_skips += 1;
            return Ok(());
        };

        let chain = ChainContext {
            chain_id: ChainId::generate(&mut *ctx.rng),
            patient,
            practitioner: practitioner.id,
            template,
        };

        match template {
            SequenceTemplate::AppointmentFirst => self.start_with_appointment(ctx, chain),
            SequenceTemplate::EncounterFirst => self.start_with_encounter(ctx, chain),
            SequenceTemplate::ObservationFirst => self.start_with_observation(ctx, chain),
        }
    }

    fn start_with_appointment(
        &self,
        ctx: &mut GenerationContext<'_>,
        chain: ChainContext,
    ) -> SimulationResult<()> {
        let now = ctx.now();
        if !ctx.population.can_schedule_appointment(chain.patient, now) {
            ctx.statistics.cooldown_skips += 1;
            trace!(patient = %chain.patient, "patient in cooldown");
            return Ok(());
        }

        let duration = self.visit_duration(ctx.rng);
        let lead = u64::try_from(self.sequence.booking_lead.sample(&mut *ctx.rng)?).unwrap_or(0);
        let from = now
            .saturating_add(lead)
            .max(ctx.population.next_eligible_appointment(chain.patient));

        let practitioner = ctx.practitioner(&chain)?.clone();
        let range = TimeWindow::new(from, from + self.slots.lookahead + duration);
        let busy = ctx.busy_intervals(&practitioner, range)?;
        let Some(start) = self
            .slots
            .find_next_available(&practitioner, from, duration, &busy)
        else {
            ctx.statistics.no_slot_skips += 1;
            debug!(practitioner = %practitioner.id, from, duration, "no free appointment slot");
            return Ok(());
        };

        let status = self.appointment_status(ctx.rng);
        ctx.population.begin_chain(chain.patient);
        ctx.statistics.record_chain_started(chain.template);

        let appointment_id = ctx.emit(
            Some(&chain),
            chain.patient,
            &practitioner,
            EventPayload::Appointment {
                start,
                duration,
                status,
                cancellation_reason: (status == AppointmentStatus::Cancelled)
                    .then(|| CANCELLATION_REASON.to_string()),
            },
        )?;
        ctx.population.record_appointment(chain.patient, start);
        sim_event!(debug, now, "appointment booked",
            patient = display(chain.patient),
            practitioner = display(practitioner.id),
            start = start,
            status = display(status)
        );

        if !status.is_attended() || !bernoulli(&mut *ctx.rng, self.sequence.encounter_probability) {
            return self.finish_chain(ctx, &chain, EventKind::Appointment);
        }

        // The encounter covers at least half the visit and stays inside it
        let half = duration.div_ceil(2).max(1);
        let encounter_duration = ctx.rng.gen_range(half..=duration).max(15).min(duration);
        let slack = duration - encounter_duration;
        let offset = self.clamped_delay(&self.sequence.encounter_delay, ctx.rng, slack)?;

        ctx.scheduler.schedule_at(
            start + offset,
            Process::AwaitingEncounter {
                chain,
                appointment_id: Some(appointment_id),
                start: start + offset,
                duration: encounter_duration,
            },
        )?;
        Ok(())
    }

    fn start_with_encounter(
        &self,
        ctx: &mut GenerationContext<'_>,
        chain: ChainContext,
    ) -> SimulationResult<()> {
        let now = ctx.now();
        let duration = self.visit_duration(ctx.rng);
        let practitioner = ctx.practitioner(&chain)?.clone();
        let busy = ctx.busy_intervals(&practitioner, TimeWindow::new(now, now + duration))?;
        if !practitioner.is_free(now, duration, &busy) {
            ctx.statistics.practitioner_unavailable_skips += 1;
            trace!(practitioner = %practitioner.id, "practitioner unavailable for encounter");
            return Ok(());
        }

        ctx.population.begin_chain(chain.patient);
        ctx.statistics.record_chain_started(chain.template);
        self.encounter_stage(ctx, chain, None, now, duration)
    }

    fn start_with_observation(
        &self,
        ctx: &mut GenerationContext<'_>,
        chain: ChainContext,
    ) -> SimulationResult<()> {
        let now = ctx.now();
        let practitioner = ctx.practitioner(&chain)?.clone();
        let busy = ctx.busy_intervals(&practitioner, TimeWindow::new(now, now + 1))?;
        if !practitioner.is_free(now, 1, &busy) {
            ctx.statistics.practitioner_unavailable_skips += 1;
            trace!(practitioner = %practitioner.id, "practitioner unavailable for observation");
            return Ok(());
        }

        ctx.population.begin_chain(chain.patient);
        ctx.statistics.record_chain_started(chain.template);
        self.observation_stage(ctx, chain, None, now + 1)
    }

    /// Emit the encounter of a chain and roll for observations
    pub fn encounter_stage(
        &self,
        ctx: &mut GenerationContext<'_>,
        chain: ChainContext,
        appointment_id: Option<EventId>,
        start: SimMinutes,
        duration: SimMinutes,
    ) -> SimulationResult<()> {
        let practitioner = ctx.practitioner(&chain)?.clone();
        let encounter_id = ctx.emit(
            Some(&chain),
            chain.patient,
            &practitioner,
            EventPayload::Encounter {
                start,
                duration,
                appointment_id,
            },
        )?;

        if !bernoulli(&mut *ctx.rng, self.sequence.observation_probability) {
            return self.finish_chain(ctx, &chain, EventKind::Encounter);
        }

        let delay = self.clamped_delay(
            &self.sequence.observation_delay,
            ctx.rng,
            duration.saturating_sub(1),
        )?;
        let window_end = start + duration;
        ctx.scheduler.schedule_after(
            delay as i64,
            Process::AwaitingObservation {
                chain,
                encounter_id: Some(encounter_id),
                window_end,
            },
        )?;
        Ok(())
    }

    /// Emit 1 to `max_observations` vitals inside `[now, window_end)` and roll for break-glass
    pub fn observation_stage(
        &self,
        ctx: &mut GenerationContext<'_>,
        chain: ChainContext,
        encounter_id: Option<EventId>,
        window_end: SimMinutes,
    ) -> SimulationResult<()> {
        let now = ctx.now();
        let practitioner = ctx.practitioner(&chain)?.clone();
        let last = window_end.max(now + 1) - 1;
        let count = ctx.rng.gen_range(1..=self.sequence.max_observations.max(1));

        let mut times: Vec<SimMinutes> = (0..count).map(|_| ctx.rng.gen_range(now..=last)).collect();
        times.sort_unstable();

        let mut last_observation = None;
        for (i, timestamp) in times.into_iter().enumerate() {
            let (code, display) = VITAL_SIGNS[i % VITAL_SIGNS.len()];
            let value = if i % VITAL_SIGNS.len() == 0 {
                format!("{:.1} °F", ctx.rng.gen_range(96.0..99.0))
            } else {
                ctx.rng.gen_range(60..=100).to_string()
            };
            let id = ctx.emit(
                Some(&chain),
                chain.patient,
                &practitioner,
                EventPayload::Observation {
                    timestamp,
                    code: code.to_string(),
                    display: display.to_string(),
                    value,
                    encounter_id,
                },
            )?;
            last_observation = Some((id, timestamp));
        }

        let Some((observation_id, observed_at)) = last_observation else {
            return self.finish_chain(ctx, &chain, EventKind::Observation);
        };
        if !bernoulli(&mut *ctx.rng, self.sequence.break_glass_probability) {
            return self.finish_chain(ctx, &chain, EventKind::Observation);
        }

        let delay = self.clamped_delay(&self.sequence.break_glass_delay, ctx.rng, SimMinutes::MAX)?;
        ctx.scheduler.schedule_at(
            observed_at.saturating_add(delay),
            Process::AwaitingBreakGlass {
                chain,
                observation_id,
            },
        )?;
        Ok(())
    }

    /// Emit the break-glass access closing a chain
    pub fn break_glass_stage(
        &self,
        ctx: &mut GenerationContext<'_>,
        chain: ChainContext,
        observation_id: EventId,
    ) -> SimulationResult<()> {
        let practitioner = ctx.practitioner(&chain)?.clone();
        let now = ctx.now();
        ctx.emit(
            Some(&chain),
            chain.patient,
            &practitioner,
            EventPayload::BreakGlassAccess {
                timestamp: now,
                purpose_of_event: format!("Emergency access during {}", EventKind::Observation),
                context: AccessContext::Observation { observation_id },
            },
        )?;
        sim_event!(info, now, "break-glass access in chain",
            patient = display(chain.patient),
            practitioner = display(practitioner.id)
        );
        self.finish_chain(ctx, &chain, EventKind::BreakGlassAccess)
    }

    /// Standalone tick: reschedule, then maybe emit a break-glass or normal access
    #[instrument(level = "trace", skip_all, fields(now = ctx.now()))]
    pub fn standalone_tick(&self, ctx: &mut GenerationContext<'_>) -> SimulationResult<()> {
        let delay = self.next_standalone_delay(ctx.rng)?;
        ctx.scheduler
            .schedule_after(delay, Process::StandaloneAccessTick)?;
        ctx.statistics.standalone_ticks += 1;

        let roll: f64 = ctx.rng.gen();
        let break_glass = self.standalone.break_glass_probability;
        let normal = self.standalone.normal_access_probability;
        if roll >= break_glass + normal {
            return Ok(());
        }

        let Some(patient) = ctx.population.select_any_active(&mut *ctx.rng) else {
            ctx.statistics.no_eligible_patient_skips += 1;
            return Ok(());
        };
        let practitioners = ctx.practitioners;
        let Some(practitioner) = practitioners.choose(&mut *ctx.rng) else {
            return Ok(());
        };
        let now = ctx.now();

        if roll < break_glass {
            ctx.emit(
                None,
                patient,
                practitioner,
                EventPayload::BreakGlassAccess {
                    timestamp: now,
                    purpose_of_event: STANDALONE_BREAK_GLASS_PURPOSE.to_string(),
                    context: AccessContext::Standalone,
                },
            )?;
            ctx.statistics.standalone_break_glass += 1;
            sim_event!(info, now, "standalone break-glass access",
                patient = display(patient),
                practitioner = display(practitioner.id)
            );
        } else {
            ctx.emit(
                None,
                patient,
                practitioner,
                EventPayload::NormalAccess {
                    timestamp: now,
                    purpose_of_event: NORMAL_ACCESS_PURPOSE.to_string(),
                },
            )?;
            ctx.statistics.standalone_normal_access += 1;
        }
        Ok(())
    }

    fn finish_chain(
        &self,
        ctx: &mut GenerationContext<'_>,
        chain: &ChainContext,
        last_stage: EventKind,
    ) -> SimulationResult<()> {
        ctx.population.end_chain(chain.patient);
        ctx.statistics.record_chain_ended(last_stage);
        trace!(chain = %chain.chain_id, last_stage = %last_stage, "chain concluded");

        let now = ctx.now();
        let p = ctx.population.config().discharge_after_chain_probability;
        if bernoulli(&mut *ctx.rng, p) && ctx.population.discharge(chain.patient, now) {
            ctx.statistics.patients_discharged += 1;
        }
        Ok(())
    }

    fn visit_duration(&self, rng: &mut StdRng) -> SimMinutes {
        self.sequence
            .visit_durations
            .choose(rng)
            .copied()
            .unwrap_or(30)
    }

    fn appointment_status(&self, rng: &mut StdRng) -> AppointmentStatus {
        let roll: f64 = rng.gen();
        if roll < self.sequence.cancellation_probability {
            AppointmentStatus::Cancelled
        } else if roll < self.sequence.cancellation_probability + self.sequence.no_show_probability {
            AppointmentStatus::NoShow
        } else {
            AppointmentStatus::Booked
        }
    }

    /// Sample a delay and clamp it to `[0, max]`
    fn clamped_delay(
        &self,
        distribution: &DelayDistribution,
        rng: &mut StdRng,
        max: SimMinutes,
    ) -> SimulationResult<SimMinutes> {
        let sample = distribution.sample(rng)?;
        Ok(u64::try_from(sample).unwrap_or(0).min(max))
    }
}
