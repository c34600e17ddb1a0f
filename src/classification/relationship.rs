//! Relationship tracking
//!
//! Read-only queries over the event log that answer whether a practitioner has
//! a care relationship with a patient, and which feature bits a set of events
//! sets inside one classification window.

use serde::{Deserialize, Serialize};

use crate::events::{Event, EventLog, EventPayload, PersistenceError};
use crate::simulation::time_manager::{SimMinutes, TimeWindow};
use crate::types::{EventKind, PatientId, PractitionerId};

/// The four feature bits a classification row is keyed by
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeatureVector {
    /// An appointment (any status) starts in the window
    pub has_appointment: bool,
    /// An observation is recorded in the window
    pub has_observation: bool,
    /// An encounter starts in the window
    pub has_encounter: bool,
    /// A break-glass access happens in the window
    pub has_break_glass: bool,
}

impl FeatureVector {
    /// Build from the four bits
    pub const fn new(
        has_appointment: bool,
        has_observation: bool,
        has_encounter: bool,
        has_break_glass: bool,
    ) -> Self {
        Self {
            has_appointment,
            has_observation,
            has_encounter,
            has_break_glass,
        }
    }

    /// Position in the classification table (0-15)
    pub const fn index(&self) -> usize {
        (self.has_appointment as usize) * 8
            + (self.has_observation as usize) * 4
            + (self.has_encounter as usize) * 2
            + (self.has_break_glass as usize)
    }

    /// Classification table row id (1-16)
    pub const fn row_id(&self) -> u8 {
        self.index() as u8 + 1
    }

    /// Inverse of [`FeatureVector::index`]
    pub const fn from_index(index: usize) -> Self {
        Self::new(
            index & 8 != 0,
            index & 4 != 0,
            index & 2 != 0,
            index & 1 != 0,
        )
    }

    /// Set the bit a single event contributes
    pub fn observe(&mut self, event: &Event) {
        match event.kind() {
            EventKind::Appointment => self.has_appointment = true,
            EventKind::Observation => self.has_observation = true,
            EventKind::Encounter => self.has_encounter = true,
            EventKind::BreakGlassAccess => self.has_break_glass = true,
            EventKind::NormalAccess => {}
        }
    }
}

/// Answers relationship questions from the event log
#[derive(Debug, Default, Clone, Copy)]
pub struct RelationshipTracker;

impl RelationshipTracker {
    /// Whether `practitioner` has a care relationship with `patient` as of `as_of`
    ///
    /// True when any appointment, observation or encounter of the pair is
    /// anchored at or before `as_of`, or when an appointment of the pair is
    /// booked to start after it.
    pub fn has_relationship(
        log: &dyn EventLog,
        patient: PatientId,
        practitioner: PractitionerId,
        as_of: SimMinutes,
    ) -> Result<bool, PersistenceError> {
        let events = log.query(patient, practitioner, TimeWindow::new(0, SimMinutes::MAX))?;
        Ok(events.iter().any(|event| match &event.payload {
            EventPayload::Appointment { .. } => true,
            _ => event.kind().is_clinical() && event.anchor_time() <= as_of,
        }))
    }

    /// Feature bits set by the events anchored inside `window`
    pub fn features_in_window<'a>(
        events: impl IntoIterator<Item = &'a Event>,
        window: TimeWindow,
    ) -> FeatureVector {
        let mut features = FeatureVector::default();
        for event in events {
            if window.contains(event.anchor_time()) {
                features.observe(event);
            }
        }
        features
    }
}
