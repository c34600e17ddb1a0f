//! Clinical events, the event log and chain generation
//!
//! # Overview
//!
//! - **Event / EventPayload**: write-once records of appointments, encounters,
//!   observations and access events
//! - **EventLog**: append/query interface with in-memory and JSON-lines implementations
//! - **SequenceGenerator**: turns scheduler ticks into event chains and standalone accesses
//!
//! # Usage Example
//!
//! ```rust
//! use ehr_access_simulator::events::*;
//! use ehr_access_simulator::simulation::TimeWindow;
//! use ehr_access_simulator::types::*;
//!
//! let patient = PatientId::new();
//! let practitioner = PractitionerId::new();
//! let event = Event::new(
//!     EventId::new(),
//!     patient,
//!     practitioner,
//!     0,
//!     None,
//!     EventPayload::NormalAccess {
//!         timestamp: 90,
//!         purpose_of_event: "Routine record review".to_string(),
//!     },
//! );
//!
//! let mut log = InMemoryEventLog::new();
//! log.append(event).unwrap();
//! let hits = log.query(patient, practitioner, TimeWindow::new(0, 1440)).unwrap();
//! assert_eq!(hits.len(), 1);
//! ```

pub mod clinical_event;
pub mod event_log;
pub mod generator;

// Re-export all public types for convenience
pub use clinical_event::*;
pub use event_log::*;
pub use generator::*;
