//! Run statistics
//!
//! Counters updated centrally by the orchestrator and generator while the
//! simulation runs. Expected non-events (cooldown, no free slot, practitioner
//! off shift) are only ever visible here.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use crate::events::{Event, EventPayload};
use crate::types::{AppointmentStatus, EventKind, SequenceTemplate};

/// Counters collected over one simulation run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SimulationStatistics {
    /// Events logged per kind
    pub events_by_kind: BTreeMap<EventKind, u64>,
    /// Appointments attended
    pub appointments_booked: u64,
    /// Appointments cancelled
    pub appointments_cancelled: u64,
    /// Appointments with no-show
    pub appointments_no_show: u64,

    /// Chains started per entry template
    pub chains_started: BTreeMap<SequenceTemplate, u64>,
    /// Chains concluded, keyed by the last stage emitted
    pub chains_ended_at: BTreeMap<EventKind, u64>,
    /// Chains still in flight when the horizon was reached
    pub chains_abandoned: u64,

    /// Generation ticks dispatched
    pub generation_ticks: u64,
    /// Ticks skipped because the patient was in cooldown
    pub cooldown_skips: u64,
    /// Ticks skipped because no appointment slot was free
    pub no_slot_skips: u64,
    /// Ticks skipped because the practitioner was off shift or busy
    pub practitioner_unavailable_skips: u64,
    /// Ticks skipped because no idle patient was available
    pub no_eligible_patient_skips: u64,

    /// Standalone access ticks dispatched
    pub standalone_ticks: u64,
    /// Standalone break-glass accesses emitted
    pub standalone_break_glass: u64,
    /// Standalone normal accesses emitted
    pub standalone_normal_access: u64,

    /// Patients present at minute 0
    pub initial_population: usize,
    /// Patients admitted during the run
    pub patients_added: u64,
    /// Patients discharged during the run
    pub patients_discharged: u64,
    /// Discharge draws deferred because a chain was in flight
    pub discharges_deferred: u64,
    /// Active patients when the run ended
    pub final_active_population: usize,

    /// Number of practitioners
    pub practitioner_count: usize,
    /// Continuations dispatched by the scheduler
    pub dispatched_processes: u64,
    /// Days covered by the horizon
    pub days_simulated: usize,
    /// Clock when the run ended
    pub final_sim_minute: u64,
    /// Wall-clock run time
    pub simulation_duration: Duration,
}

impl SimulationStatistics {
    /// Create empty statistics
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one logged event
    pub fn record_event(&mut self, event: &Event) {
        *self.events_by_kind.entry(event.kind()).or_insert(0) += 1;
        if let EventPayload::Appointment { status, .. } = &event.payload {
            match status {
                AppointmentStatus::Booked => self.appointments_booked += 1,
                AppointmentStatus::Cancelled => self.appointments_cancelled += 1,
                AppointmentStatus::NoShow => self.appointments_no_show += 1,
            }
        }
    }

    /// Count a chain start
    pub fn record_chain_started(&mut self, template: SequenceTemplate) {
        *self.chains_started.entry(template).or_insert(0) += 1;
    }

    /// Count a chain conclusion at `last_stage`
    pub fn record_chain_ended(&mut self, last_stage: EventKind) {
        *self.chains_ended_at.entry(last_stage).or_insert(0) += 1;
    }

    /// Events of one kind
    pub fn events_of(&self, kind: EventKind) -> u64 {
        self.events_by_kind.get(&kind).copied().unwrap_or(0)
    }

    /// Total events logged
    pub fn total_events(&self) -> u64 {
        self.events_by_kind.values().sum()
    }

    /// Total chains started
    pub fn total_chains(&self) -> u64 {
        self.chains_started.values().sum()
    }

    /// Total generation attempts that produced nothing
    pub fn total_skips(&self) -> u64 {
        self.cooldown_skips
            + self.no_slot_skips
            + self.practitioner_unavailable_skips
            + self.no_eligible_patient_skips
    }

    /// Share of appointments that were cancelled or no-shows
    pub fn unattended_appointment_percentage(&self) -> f64 {
        let total = self.events_of(EventKind::Appointment);
        if total == 0 {
            0.0
        } else {
            (self.appointments_cancelled + self.appointments_no_show) as f64 / total as f64 * 100.0
        }
    }

    /// Average events per simulated day
    pub fn average_events_per_day(&self) -> f64 {
        if self.days_simulated == 0 {
            0.0
        } else {
            self.total_events() as f64 / self.days_simulated as f64
        }
    }

    /// Multi-line report printed at the end of a run
    pub fn generate_summary_report(&self) -> String {
        let mut output = String::new();

        output.push_str("EHR Activity Simulation Complete\n");
        output.push_str("================================\n\n");

        output.push_str("Simulation Summary:\n");
        output.push_str(&format!("   Days Simulated: {}\n", self.days_simulated));
        output.push_str(&format!(
            "   Duration: {:.2} seconds ({} continuations dispatched)\n",
            self.simulation_duration.as_secs_f64(),
            self.dispatched_processes
        ));
        output.push_str(&format!(
            "   Population: {} practitioners, {} initial patients, {} added, {} discharged, {} active at end\n\n",
            self.practitioner_count,
            self.initial_population,
            self.patients_added,
            self.patients_discharged,
            self.final_active_population
        ));

        output.push_str("Event Statistics:\n");
        output.push_str(&format!("   Total Events: {}\n", self.total_events()));
        if self.days_simulated > 0 {
            output.push_str(&format!(
                "   Daily Average: {:.1} events/day\n",
                self.average_events_per_day()
            ));
        }
        for (kind, count) in &self.events_by_kind {
            output.push_str(&format!("   {}: {}\n", kind, count));
        }
        output.push_str(&format!(
            "   Appointments: {} booked, {} cancelled, {} no-show ({:.1}% unattended)\n\n",
            self.appointments_booked,
            self.appointments_cancelled,
            self.appointments_no_show,
            self.unattended_appointment_percentage()
        ));

        output.push_str("Chains:\n");
        for (template, count) in &self.chains_started {
            output.push_str(&format!("   {} started: {}\n", template, count));
        }
        for (stage, count) in &self.chains_ended_at {
            output.push_str(&format!("   Ended after {}: {}\n", stage, count));
        }
        output.push_str(&format!(
            "   Abandoned at horizon: {}\n\n",
            self.chains_abandoned
        ));

        output.push_str("Skipped Attempts:\n");
        output.push_str(&format!("   Patient cooldown: {}\n", self.cooldown_skips));
        output.push_str(&format!("   No free slot: {}\n", self.no_slot_skips));
        output.push_str(&format!(
            "   Practitioner unavailable: {}\n",
            self.practitioner_unavailable_skips
        ));
        output.push_str(&format!(
            "   No eligible patient: {}\n\n",
            self.no_eligible_patient_skips
        ));

        output.push_str("Standalone Access:\n");
        output.push_str(&format!(
            "   {} ticks, {} break-glass, {} normal\n",
            self.standalone_ticks, self.standalone_break_glass, self.standalone_normal_access
        ));

        output
    }

    /// One-line summary
    pub fn compact_summary(&self) -> String {
        format!(
            "{} events over {} days ({} chains, {} skipped attempts)",
            self.total_events(),
            self.days_simulated,
            self.total_chains(),
            self.total_skips()
        )
    }
}

impl fmt::Display for SimulationStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.compact_summary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EventId, PatientId, PractitionerId};
    use uuid::Uuid;

    fn appointment(status: AppointmentStatus) -> Event {
        Event::new(
            EventId(Uuid::nil()),
            PatientId(Uuid::nil()),
            PractitionerId(Uuid::nil()),
            0,
            None,
            EventPayload::Appointment {
                start: 540,
                duration: 30,
                status,
                cancellation_reason: None,
            },
        )
    }

    #[test]
    fn test_record_event_counts_status() {
        let mut stats = SimulationStatistics::new();
        stats.record_event(&appointment(AppointmentStatus::Booked));
        stats.record_event(&appointment(AppointmentStatus::Cancelled));
        stats.record_event(&appointment(AppointmentStatus::NoShow));
        stats.record_event(&appointment(AppointmentStatus::Booked));

        assert_eq!(stats.events_of(EventKind::Appointment), 4);
        assert_eq!(stats.appointments_booked, 2);
        assert_eq!(stats.appointments_cancelled, 1);
        assert_eq!(stats.appointments_no_show, 1);
        assert_eq!(stats.unattended_appointment_percentage(), 50.0);
        assert_eq!(stats.total_events(), 4);
    }

    #[test]
    fn test_chain_counters() {
        let mut stats = SimulationStatistics::new();
        stats.record_chain_started(SequenceTemplate::AppointmentFirst);
        stats.record_chain_started(SequenceTemplate::AppointmentFirst);
        stats.record_chain_started(SequenceTemplate::ObservationFirst);
        stats.record_chain_ended(EventKind::Appointment);

        assert_eq!(stats.total_chains(), 3);
        assert_eq!(stats.chains_ended_at[&EventKind::Appointment], 1);
    }

    #[test]
    fn test_empty_statistics() {
        let stats = SimulationStatistics::new();
        assert_eq!(stats.average_events_per_day(), 0.0);
        assert_eq!(stats.unattended_appointment_percentage(), 0.0);
        assert_eq!(stats.total_skips(), 0);
    }

    #[test]
    fn test_summary_report_sections() {
        let mut stats = SimulationStatistics::new();
        stats.days_simulated = 2;
        stats.record_event(&appointment(AppointmentStatus::Booked));
        stats.cooldown_skips = 3;

        let report = stats.generate_summary_report();
        assert!(report.contains("Days Simulated: 2"));
        assert!(report.contains("Appointment: 1"));
        assert!(report.contains("Patient cooldown: 3"));
        assert_eq!(stats.to_string(), "1 events over 2 days (0 chains, 3 skipped attempts)");
    }
}
