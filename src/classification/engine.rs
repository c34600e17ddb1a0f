//! Classification engine
//!
//! Batch pass over a finished event log. Every (patient, practitioner, window)
//! tuple with at least one event anchored in the window gets a record holding
//! its feature bits, the row of the static table they select and that row's
//! label. Windows are fixed-length, half-open and counted from minute 0.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{info, instrument};

use super::relationship::{FeatureVector, RelationshipTracker};
use crate::events::{Event, EventLog, PersistenceError};
use crate::simulation::time_manager::{SimMinutes, TimeWindow};
use crate::types::{EventKind, Label, PatientId, PractitionerId};

/// One row of the classification table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClassificationRow {
    /// Row id (1-16)
    pub id: u8,
    /// Feature bits this row matches
    pub features: FeatureVector,
    /// Label assigned to matching tuples
    pub label: Label,
}

const fn row(id: u8, [a, o, e, b]: [bool; 4], label: Label) -> ClassificationRow {
    ClassificationRow {
        id,
        features: FeatureVector::new(a, o, e, b),
        label,
    }
}

/// Fixed feature-to-label table, indexed by [`FeatureVector::index`]
///
/// Feature columns are (appointment, observation, encounter, break-glass).
pub static CLASSIFICATION_TABLE: [ClassificationRow; 16] = [
    row(1, [false, false, false, false], Label::Anomaly),
    row(2, [false, false, false, true], Label::Normal),
    row(3, [false, false, true, false], Label::Anomaly),
    row(4, [false, false, true, true], Label::Normal),
    row(5, [false, true, false, false], Label::Anomaly),
    row(6, [false, true, false, true], Label::Normal),
    row(7, [false, true, true, false], Label::Anomaly),
    row(8, [false, true, true, true], Label::Normal),
    row(9, [true, false, false, false], Label::Normal),
    row(10, [true, false, false, true], Label::Anomaly),
    row(11, [true, false, true, false], Label::Normal),
    row(12, [true, false, true, true], Label::Normal),
    row(13, [true, true, false, false], Label::Normal),
    row(14, [true, true, false, true], Label::Normal),
    row(15, [true, true, true, false], Label::Normal),
    row(16, [true, true, true, true], Label::Normal),
];

/// Table row matching a feature vector
pub fn lookup(features: FeatureVector) -> &'static ClassificationRow {
    &CLASSIFICATION_TABLE[features.index()]
}

/// Classification result for one (patient, practitioner, window) tuple
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationRecord {
    /// Patient of the tuple
    pub patient_id: PatientId,
    /// Practitioner of the tuple
    pub practitioner_id: PractitionerId,
    /// Window index counted from minute 0
    pub window_index: u64,
    /// Window bounds
    pub window: TimeWindow,
    /// Feature bits
    #[serde(flatten)]
    pub features: FeatureVector,
    /// Whether a normal access fell in the window (informational only)
    pub has_normal_access: bool,
    /// Whether the pair had a care relationship at the window start
    /// (informational only; filled by [`ClassificationEngine::classify_log`])
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prior_relationship: Option<bool>,
    /// Matching table row
    pub table_id: u8,
    /// Label of the matching row
    pub label: Label,
}

/// Labels (patient, practitioner, window) tuples
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassificationEngine {
    window_minutes: SimMinutes,
}

impl ClassificationEngine {
    /// Create an engine with the given window length (at least one minute)
    pub fn new(window_minutes: SimMinutes) -> Self {
        Self {
            window_minutes: window_minutes.max(1),
        }
    }

    /// Window length in minutes
    pub fn window_minutes(&self) -> SimMinutes {
        self.window_minutes
    }

    /// Classify every tuple that has events
    ///
    /// Records are ordered by window, then patient, then practitioner. The
    /// pass is pure: the same events always produce the same records.
    #[instrument(skip_all, fields(events = events.len(), window_minutes = self.window_minutes))]
    pub fn classify(&self, events: &[Event]) -> Vec<ClassificationRecord> {
        let mut groups: BTreeMap<(u64, PatientId, PractitionerId), Vec<&Event>> = BTreeMap::new();
        for event in events {
            let index = TimeWindow::index_of(event.anchor_time(), self.window_minutes);
            groups
                .entry((index, event.patient_id, event.practitioner_id))
                .or_default()
                .push(event);
        }

        let records: Vec<ClassificationRecord> = groups
            .into_iter()
            .map(|((window_index, patient_id, practitioner_id), group)| {
                let window = TimeWindow::nth(window_index, self.window_minutes);
                let features = RelationshipTracker::features_in_window(group.iter().copied(), window);
                let row = lookup(features);
                ClassificationRecord {
                    patient_id,
                    practitioner_id,
                    window_index,
                    window,
                    features,
                    has_normal_access: group.iter().any(|e| e.kind() == EventKind::NormalAccess),
                    prior_relationship: None,
                    table_id: row.id,
                    label: row.label,
                }
            })
            .collect();

        info!(records = records.len(), "Classified activity windows");
        records
    }

    /// Classify a whole log and note, per record, whether the pair already
    /// had a care relationship when the window opened
    pub fn classify_log(
        &self,
        log: &dyn EventLog,
    ) -> Result<Vec<ClassificationRecord>, PersistenceError> {
        let mut records = self.classify(log.events());
        for record in &mut records {
            record.prior_relationship = Some(RelationshipTracker::has_relationship(
                log,
                record.patient_id,
                record.practitioner_id,
                record.window.start,
            )?);
        }
        Ok(records)
    }
}

/// Count of records for one table row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HistogramBin {
    /// Table row id
    pub table_id: u8,
    /// Row label
    pub label: Label,
    /// Records that matched the row
    pub count: u64,
}

/// Record counts for all 16 table rows, zero rows included
pub fn histogram(records: &[ClassificationRecord]) -> Vec<HistogramBin> {
    let mut counts = [0u64; 16];
    for record in records {
        counts[usize::from(record.table_id.clamp(1, 16)) - 1] += 1;
    }
    CLASSIFICATION_TABLE
        .iter()
        .zip(counts)
        .map(|(row, count)| HistogramBin {
            table_id: row.id,
            label: row.label,
            count,
        })
        .collect()
}

/// Normal/Anomaly totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ClassificationSummary {
    /// Records labeled Normal
    pub normal: u64,
    /// Records labeled Anomaly
    pub anomaly: u64,
}

impl ClassificationSummary {
    /// Tally a set of records
    pub fn from_records(records: &[ClassificationRecord]) -> Self {
        records.iter().fold(Self::default(), |mut summary, record| {
            match record.label {
                Label::Normal => summary.normal += 1,
                Label::Anomaly => summary.anomaly += 1,
            }
            summary
        })
    }

    /// Total records
    pub fn total(&self) -> u64 {
        self.normal + self.anomaly
    }

    /// Share of anomalous records
    pub fn anomaly_percentage(&self) -> f64 {
        if self.total() == 0 {
            0.0
        } else {
            self.anomaly as f64 / self.total() as f64 * 100.0
        }
    }
}

impl fmt::Display for ClassificationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} windows classified: {} normal, {} anomaly ({:.2}%)",
            self.total(),
            self.normal,
            self.anomaly,
            self.anomaly_percentage()
        )
    }
}
