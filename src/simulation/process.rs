//! Scheduled process states
//!
//! Every pending continuation in the scheduler is one of these variants. A
//! chain stage carries everything the next stage needs: the chain identity,
//! the (patient, practitioner) pair and the id of the event it descends from.

use crate::simulation::time_manager::SimMinutes;
use crate::types::{ChainId, EventId, PatientId, PractitionerId, SequenceTemplate};

/// Identity of one event chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainContext {
    /// Chain identifier stamped on every event in the chain
    pub chain_id: ChainId,
    /// Patient fixed at chain start
    pub patient: PatientId,
    /// Practitioner fixed at chain start
    pub practitioner: PractitionerId,
    /// Entry template
    pub template: SequenceTemplate,
}

/// A continuation waiting in the scheduler
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Process {
    /// Recurring population addition check
    PopulationAddition,
    /// Recurring population discharge check
    PopulationDischarge,
    /// Recurring chain generation tick
    SequenceTick,
    /// Recurring standalone access tick
    StandaloneAccessTick,
    /// Encounter stage of a chain
    AwaitingEncounter {
        /// Chain the encounter belongs to
        chain: ChainContext,
        /// Appointment being fulfilled
        appointment_id: Option<EventId>,
        /// Encounter start
        start: SimMinutes,
        /// Encounter length
        duration: SimMinutes,
    },
    /// Observation stage of a chain
    AwaitingObservation {
        /// Chain the observations belong to
        chain: ChainContext,
        /// Encounter the observations are taken in
        encounter_id: Option<EventId>,
        /// Observations must be taken before this minute
        window_end: SimMinutes,
    },
    /// Break-glass stage of a chain
    AwaitingBreakGlass {
        /// Chain the access belongs to
        chain: ChainContext,
        /// Observation that triggered the access
        observation_id: EventId,
    },
}

impl Process {
    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Process::PopulationAddition => "population_addition",
            Process::PopulationDischarge => "population_discharge",
            Process::SequenceTick => "sequence_tick",
            Process::StandaloneAccessTick => "standalone_access_tick",
            Process::AwaitingEncounter { .. } => "awaiting_encounter",
            Process::AwaitingObservation { .. } => "awaiting_observation",
            Process::AwaitingBreakGlass { .. } => "awaiting_break_glass",
        }
    }

    /// Chain this continuation belongs to, if it is a chain stage
    pub fn chain(&self) -> Option<&ChainContext> {
        match self {
            Process::AwaitingEncounter { chain, .. }
            | Process::AwaitingObservation { chain, .. }
            | Process::AwaitingBreakGlass { chain, .. } => Some(chain),
            _ => None,
        }
    }
}
