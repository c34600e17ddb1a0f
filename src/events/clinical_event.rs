//! Clinical and access events
//!
//! Events are write-once records. Each carries the (patient, practitioner)
//! pair, the simulated minute it was emitted at, the chain it belongs to (if
//! any) and a payload variant holding only the fields valid for its kind.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::simulation::time_manager::{SimMinutes, TimeWindow};
use crate::types::{AppointmentStatus, ChainId, EventId, EventKind, PatientId, PractitionerId};

/// Purpose-of-use code for emergency access
pub const PURPOSE_BREAK_GLASS: &str = "BTG";
/// Purpose-of-use code for routine care management access
pub const PURPOSE_CARE_MANAGEMENT: &str = "CAREMGT";

/// What a break-glass access was reaching for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "resource", rename_all = "snake_case")]
pub enum AccessContext {
    /// Triggered from an observation in a chain
    Observation {
        /// The observation that preceded the access
        observation_id: EventId,
    },
    /// Not tied to any clinical event
    Standalone,
}

impl fmt::Display for AccessContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessContext::Observation { observation_id } => {
                write!(f, "Observation {}", observation_id)
            }
            AccessContext::Standalone => write!(f, "standalone"),
        }
    }
}

/// Kind-specific event fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EventPayload {
    /// A booked visit slot
    Appointment {
        /// Visit start
        start: SimMinutes,
        /// Visit length in minutes
        duration: SimMinutes,
        /// Outcome, fixed at booking
        status: AppointmentStatus,
        /// Free-text reason when cancelled
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cancellation_reason: Option<String>,
    },
    /// A clinical encounter
    Encounter {
        /// Encounter start
        start: SimMinutes,
        /// Encounter length in minutes
        duration: SimMinutes,
        /// Appointment this encounter fulfils
        #[serde(default, skip_serializing_if = "Option::is_none")]
        appointment_id: Option<EventId>,
    },
    /// A recorded measurement
    Observation {
        /// Measurement time
        timestamp: SimMinutes,
        /// LOINC code
        code: String,
        /// Human-readable name of the code
        display: String,
        /// Rendered value
        value: String,
        /// Encounter the measurement was taken in
        #[serde(default, skip_serializing_if = "Option::is_none")]
        encounter_id: Option<EventId>,
    },
    /// Emergency access overriding normal controls
    BreakGlassAccess {
        /// Access time
        timestamp: SimMinutes,
        /// Free-text purpose
        purpose_of_event: String,
        /// What triggered the access
        context: AccessContext,
    },
    /// Routine access outside a clinical chain
    NormalAccess {
        /// Access time
        timestamp: SimMinutes,
        /// Free-text purpose
        purpose_of_event: String,
    },
}

impl EventPayload {
    /// Event kind of this payload
    pub fn kind(&self) -> EventKind {
        match self {
            EventPayload::Appointment { .. } => EventKind::Appointment,
            EventPayload::Encounter { .. } => EventKind::Encounter,
            EventPayload::Observation { .. } => EventKind::Observation,
            EventPayload::BreakGlassAccess { .. } => EventKind::BreakGlassAccess,
            EventPayload::NormalAccess { .. } => EventKind::NormalAccess,
        }
    }

    /// Time the event is attributed to: the start of duration events, the
    /// timestamp of instant events
    pub fn anchor_time(&self) -> SimMinutes {
        match self {
            EventPayload::Appointment { start, .. } | EventPayload::Encounter { start, .. } => {
                *start
            }
            EventPayload::Observation { timestamp, .. }
            | EventPayload::BreakGlassAccess { timestamp, .. }
            | EventPayload::NormalAccess { timestamp, .. } => *timestamp,
        }
    }

    /// Purpose-of-use code for access events
    pub fn purpose_code(&self) -> Option<&'static str> {
        match self {
            EventPayload::BreakGlassAccess { .. } => Some(PURPOSE_BREAK_GLASS),
            EventPayload::NormalAccess { .. } => Some(PURPOSE_CARE_MANAGEMENT),
            _ => None,
        }
    }

    /// Practitioner time taken up by the event
    ///
    /// Cancelled appointments and access events occupy nothing; observations
    /// occupy one minute.
    pub fn occupied_interval(&self) -> Option<TimeWindow> {
        match self {
            EventPayload::Appointment {
                status: AppointmentStatus::Cancelled,
                ..
            } => None,
            EventPayload::Appointment { start, duration, .. }
            | EventPayload::Encounter { start, duration, .. } => {
                Some(TimeWindow::new(*start, start + duration))
            }
            EventPayload::Observation { timestamp, .. } => {
                Some(TimeWindow::new(*timestamp, timestamp + 1))
            }
            EventPayload::BreakGlassAccess { .. } | EventPayload::NormalAccess { .. } => None,
        }
    }
}

/// A logged event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Event identifier
    pub id: EventId,
    /// Patient the event concerns
    pub patient_id: PatientId,
    /// Practitioner who acted
    pub practitioner_id: PractitionerId,
    /// Simulated minute the event was emitted at
    pub recorded_at: SimMinutes,
    /// Chain this event belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<ChainId>,
    /// Kind-specific fields
    #[serde(flatten)]
    pub payload: EventPayload,
}

impl Event {
    /// Create a new event
    pub fn new(
        id: EventId,
        patient_id: PatientId,
        practitioner_id: PractitionerId,
        recorded_at: SimMinutes,
        chain_id: Option<ChainId>,
        payload: EventPayload,
    ) -> Self {
        Self {
            id,
            patient_id,
            practitioner_id,
            recorded_at,
            chain_id,
            payload,
        }
    }

    /// Event kind
    pub fn kind(&self) -> EventKind {
        self.payload.kind()
    }

    /// See [`EventPayload::anchor_time`]
    pub fn anchor_time(&self) -> SimMinutes {
        self.payload.anchor_time()
    }

    /// The (patient, practitioner) pair
    pub fn pair(&self) -> (PatientId, PractitionerId) {
        (self.patient_id, self.practitioner_id)
    }
}
