//! Append-only event log
//!
//! The simulation writes every emitted event through the [`EventLog`] trait
//! and reads the log back for practitioner busy checks, relationship lookups
//! and classification. Appends are never retried: a failed append aborts the
//! run and whatever was already logged stays as-is.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::io::Write;
use thiserror::Error;
use tracing::trace;

use super::Event;
use crate::simulation::time_manager::TimeWindow;
use crate::types::{PatientId, PractitionerId};

/// Errors raised by an event log
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Writing to the backing sink failed
    #[error("event log write failed: {0}")]
    Io(#[from] std::io::Error),

    /// An event could not be encoded
    #[error("event could not be serialized: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The store rejected the operation
    #[error("event store error: {0}")]
    Storage(String),
}

/// Append/query interface over the simulation's events
pub trait EventLog: fmt::Debug {
    /// Append one event
    fn append(&mut self, event: Event) -> Result<(), PersistenceError>;

    /// Events of a (patient, practitioner) pair anchored inside `range`, in append order
    fn query(
        &self,
        patient: PatientId,
        practitioner: PractitionerId,
        range: TimeWindow,
    ) -> Result<Vec<Event>, PersistenceError>;

    /// Events of a practitioner whose occupied interval overlaps `range`, in append order
    fn query_practitioner(
        &self,
        practitioner: PractitionerId,
        range: TimeWindow,
    ) -> Result<Vec<Event>, PersistenceError>;

    /// Every event, in append order
    fn events(&self) -> &[Event];

    /// Number of events logged
    fn len(&self) -> usize {
        self.events().len()
    }

    /// Whether nothing has been logged
    fn is_empty(&self) -> bool {
        self.events().is_empty()
    }
}

/// Event log held in memory with per-pair and per-practitioner indexes
#[derive(Debug, Default, Clone)]
pub struct InMemoryEventLog {
    events: Vec<Event>,
    by_pair: HashMap<(PatientId, PractitionerId), Vec<usize>>,
    // (occupied start, event index) per practitioner
    occupancy: HashMap<PractitionerId, BTreeSet<(u64, usize)>>,
    longest_occupancy: u64,
}

impl InMemoryEventLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a log from already-emitted events
    pub fn from_events(events: impl IntoIterator<Item = Event>) -> Self {
        let mut log = Self::new();
        for event in events {
            log.push(event);
        }
        log
    }

    fn push(&mut self, event: Event) {
        let index = self.events.len();
        self.by_pair.entry(event.pair()).or_default().push(index);
        if let Some(interval) = event.payload.occupied_interval() {
            self.longest_occupancy = self.longest_occupancy.max(interval.len());
            self.occupancy
                .entry(event.practitioner_id)
                .or_default()
                .insert((interval.start, index));
        }
        self.events.push(event);
    }

    fn collect(
        &self,
        indexes: impl IntoIterator<Item = usize>,
        keep: impl Fn(&Event) -> bool,
    ) -> Vec<Event> {
        indexes
            .into_iter()
            .map(|i| &self.events[i])
            .filter(|event| keep(event))
            .cloned()
            .collect()
    }
}

impl EventLog for InMemoryEventLog {
    fn append(&mut self, event: Event) -> Result<(), PersistenceError> {
        trace!(id = %event.id, kind = %event.kind(), "appending event");
        self.push(event);
        Ok(())
    }

    fn query(
        &self,
        patient: PatientId,
        practitioner: PractitionerId,
        range: TimeWindow,
    ) -> Result<Vec<Event>, PersistenceError> {
        let indexes = self
            .by_pair
            .get(&(patient, practitioner))
            .into_iter()
            .flatten()
            .copied();
        Ok(self.collect(indexes, |event| range.contains(event.anchor_time())))
    }

    fn query_practitioner(
        &self,
        practitioner: PractitionerId,
        range: TimeWindow,
    ) -> Result<Vec<Event>, PersistenceError> {
        let Some(starts) = self.occupancy.get(&practitioner) else {
            return Ok(Vec::new());
        };

        // Nothing starting earlier than this can still be running inside the range
        let lower = range.start.saturating_sub(self.longest_occupancy);
        let mut indexes: Vec<usize> = starts
            .range((lower, 0)..(range.end, 0))
            .map(|&(_, index)| index)
            .collect();
        indexes.sort_unstable();

        Ok(self.collect(indexes, |event| {
            event
                .payload
                .occupied_interval()
                .is_some_and(|interval| interval.overlaps(&range))
        }))
    }

    fn events(&self) -> &[Event] {
        &self.events
    }
}

/// Event log that mirrors every append as one JSON line to a writer
#[derive(Debug)]
pub struct JsonlEventLog<W: Write> {
    inner: InMemoryEventLog,
    writer: W,
}

impl<W: Write> JsonlEventLog<W> {
    /// Wrap a writer
    pub fn new(writer: W) -> Self {
        Self {
            inner: InMemoryEventLog::new(),
            writer,
        }
    }

    /// Flush buffered lines to the writer
    pub fn flush(&mut self) -> Result<(), PersistenceError> {
        self.writer.flush()?;
        Ok(())
    }

    /// Flush and return the writer and the in-memory log
    pub fn into_parts(mut self) -> Result<(W, InMemoryEventLog), PersistenceError> {
        self.flush()?;
        Ok((self.writer, self.inner))
    }
}

impl<W: Write + fmt::Debug> EventLog for JsonlEventLog<W> {
    fn append(&mut self, event: Event) -> Result<(), PersistenceError> {
        // Only events that reached the sink are indexed
        let line = serde_json::to_string(&event)?;
        writeln!(self.writer, "{}", line)?;
        self.inner.append(event)
    }

    fn query(
        &self,
        patient: PatientId,
        practitioner: PractitionerId,
        range: TimeWindow,
    ) -> Result<Vec<Event>, PersistenceError> {
        self.inner.query(patient, practitioner, range)
    }

    fn query_practitioner(
        &self,
        practitioner: PractitionerId,
        range: TimeWindow,
    ) -> Result<Vec<Event>, PersistenceError> {
        self.inner.query_practitioner(practitioner, range)
    }

    fn events(&self) -> &[Event] {
        self.inner.events()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventPayload;
    use crate::types::{AppointmentStatus, EventId};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::io;

    #[derive(Debug)]
    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "disk full"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn observation(
        rng: &mut StdRng,
        patient: PatientId,
        practitioner: PractitionerId,
        at: u64,
    ) -> Event {
        Event::new(
            EventId::generate(rng),
            patient,
            practitioner,
            at,
            None,
            EventPayload::Observation {
                timestamp: at,
                code: "8867-4".to_string(),
                display: "Heart Rate".to_string(),
                value: "70".to_string(),
                encounter_id: None,
            },
        )
    }

    #[test]
    fn test_query_filters_pair_and_range() {
        let mut rng = StdRng::seed_from_u64(11);
        let patient = PatientId::generate(&mut rng);
        let other_patient = PatientId::generate(&mut rng);
        let practitioner = PractitionerId::generate(&mut rng);

        let mut log = InMemoryEventLog::new();
        log.append(observation(&mut rng, patient, practitioner, 10)).unwrap();
        log.append(observation(&mut rng, patient, practitioner, 50)).unwrap();
        log.append(observation(&mut rng, other_patient, practitioner, 20)).unwrap();

        let hits = log
            .query(patient, practitioner, TimeWindow::new(0, 50))
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].anchor_time(), 10);

        let all = log
            .query(patient, practitioner, TimeWindow::new(0, 51))
            .unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn test_practitioner_query_uses_occupied_interval() {
        let mut rng = StdRng::seed_from_u64(12);
        let patient = PatientId::generate(&mut rng);
        let practitioner = PractitionerId::generate(&mut rng);

        let mut log = InMemoryEventLog::new();
        log.append(Event::new(
            EventId::generate(&mut rng),
            patient,
            practitioner,
            0,
            None,
            EventPayload::Appointment {
                start: 540,
                duration: 60,
                status: AppointmentStatus::Booked,
                cancellation_reason: None,
            },
        ))
        .unwrap();

        // Starts before the range but still occupies it
        let busy = log
            .query_practitioner(practitioner, TimeWindow::new(570, 585))
            .unwrap();
        assert_eq!(busy.len(), 1);

        let free = log
            .query_practitioner(practitioner, TimeWindow::new(600, 615))
            .unwrap();
        assert!(free.is_empty());
    }

    #[test]
    fn test_jsonl_log_writes_one_line_per_event() {
        let mut rng = StdRng::seed_from_u64(13);
        let patient = PatientId::generate(&mut rng);
        let practitioner = PractitionerId::generate(&mut rng);

        let mut log = JsonlEventLog::new(Vec::new());
        log.append(observation(&mut rng, patient, practitioner, 1)).unwrap();
        log.append(observation(&mut rng, patient, practitioner, 2)).unwrap();

        let (buffer, memory) = log.into_parts().unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(memory.len(), 2);

        let first: Event = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(&first, &memory.events()[0]);

        let reloaded: Vec<Event> = lines
            .iter()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        let rebuilt = InMemoryEventLog::from_events(reloaded);
        assert_eq!(
            rebuilt.query(patient, practitioner, TimeWindow::new(0, 10)).unwrap(),
            memory.query(patient, practitioner, TimeWindow::new(0, 10)).unwrap()
        );
    }

    #[test]
    fn test_failed_write_surfaces_persistence_error() {
        let mut rng = StdRng::seed_from_u64(14);
        let patient = PatientId::generate(&mut rng);
        let practitioner = PractitionerId::generate(&mut rng);

        let mut log = JsonlEventLog::new(FailingWriter);
        let result = log.append(observation(&mut rng, patient, practitioner, 1));

        assert!(matches!(result, Err(PersistenceError::Io(_))));
        assert!(log.is_empty());
    }
}
