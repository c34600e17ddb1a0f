//! Patient entity

use serde::{Deserialize, Serialize};

use crate::simulation::time_manager::SimMinutes;
use crate::types::{MembershipState, PatientId};

/// A patient and its scheduling state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    /// Unique identifier
    pub id: PatientId,
    /// Whether the patient is still in the active population
    pub state: MembershipState,
    /// Minute the patient joined the population
    pub admitted_at: SimMinutes,
    /// Minute the patient was discharged
    pub discharged_at: Option<SimMinutes>,
    /// Start of the patient's latest appointment
    pub last_appointment_time: Option<SimMinutes>,
    /// Chains started for this patient that have not concluded
    pub in_flight_chains: u32,
}

impl Patient {
    /// Create an active patient
    pub fn new(id: PatientId, admitted_at: SimMinutes) -> Self {
        Self {
            id,
            state: MembershipState::Active,
            admitted_at,
            discharged_at: None,
            last_appointment_time: None,
            in_flight_chains: 0,
        }
    }

    /// Whether the patient is in the active population
    pub fn is_active(&self) -> bool {
        self.state == MembershipState::Active
    }

    /// Whether the patient is active with no chain in progress
    pub fn is_idle(&self) -> bool {
        self.is_active() && self.in_flight_chains == 0
    }

    /// Whether an appointment starting at `time` respects the cooldown
    ///
    /// An appointment may not start earlier than `cooldown` minutes after the
    /// patient's latest appointment, which also rules out slotting one in
    /// before an appointment that is already booked.
    pub fn cooldown_elapsed(&self, time: SimMinutes, cooldown: SimMinutes) -> bool {
        match self.last_appointment_time {
            Some(last) => time >= last.saturating_add(cooldown),
            None => true,
        }
    }

    /// Earliest minute a new appointment may start
    pub fn next_eligible_appointment(&self, cooldown: SimMinutes) -> SimMinutes {
        self.last_appointment_time
            .map_or(0, |last| last.saturating_add(cooldown))
    }
}
