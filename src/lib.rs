//! EHR Access Simulator
//!
//! A discrete-event simulation that generates synthetic, temporally realistic
//! electronic health record activity logs (appointments, encounters,
//! observations, break-the-glass and routine accesses) for a population of
//! practitioners and patients, labeled Normal/Anomaly by a fixed 16-row rule
//! table.
//!
//! # Overview
//!
//! The generated logs are benchmark data for EHR-access anomaly detection.
//! A run is fully determined by its configuration and seed.
//!
//! ## Key Features
//!
//! - **Discrete-Event Scheduling**: a single simulated clock advanced only by dispatch
//! - **Practitioner Availability**: weekly shift patterns and appointment slot search
//! - **Population Dynamics**: patient additions, discharges and appointment cooldowns
//! - **Event Chains**: Appointment → Encounter → Observation → Break-Glass with
//!   per-stage probabilities and delay distributions
//! - **Classification**: per (patient, practitioner, window) feature bits and labels
//!
//! ## Quick Start
//!
//! ```rust
//! use ehr_access_simulator::*;
//!
//! let config = SimulationConfig {
//!     practitioner_count: 3,
//!     days: 7,
//!     seed: 7,
//!     ..Default::default()
//! };
//!
//! let mut orchestrator = SimulationOrchestrator::new(config, InMemoryEventLog::new())?;
//! orchestrator.run()?;
//!
//! let records = orchestrator.classify()?;
//! let summary = ClassificationSummary::from_records(&records);
//! println!("{} events, {}", orchestrator.log().len(), summary);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Module Organization
//!
//! - [`types`]: Core types, identifiers, delay distributions and configuration
//! - [`practitioner`]: Practitioners, shift windows and slot search
//! - [`patient`]: Patients and population dynamics
//! - [`events`]: Event records, the event log and chain generation
//! - [`classification`]: Relationship tracking and window labeling
//! - [`simulation`]: Scheduler, orchestration, statistics and logging
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐    ┌──────────────┐    ┌─────────────┐
//! │   Types     │    │ Practitioner │    │   Patient   │
//! │             │    │              │    │             │
//! │ Identifiers │◄───┤ Shifts       │    │ Population  │
//! │ Config      │    │ Slot Search  │    │ Cooldown    │
//! └─────────────┘    └──────────────┘    └─────────────┘
//!        ▲                   ▲                   ▲
//!        │                   │                   │
//! ┌──────────────┐   ┌─────────────┐    ┌─────────────┐
//! │Classification│   │   Events    │    │ Simulation  │
//! │              │   │             │    │             │
//! │ Relationship │◄──┤ Event Log   │◄───┤ Scheduler   │
//! │ Rule Table   │   │ Generator   │    │ Orchestrator│
//! └──────────────┘   └─────────────┘    └─────────────┘
//! ```
#![warn(missing_docs, missing_debug_implementations, unreachable_pub)]

// Module declarations
pub mod classification;
pub mod events;
pub mod patient;
pub mod practitioner;
pub mod simulation;
pub mod types;

// Core types and identifiers
pub use types::{
    AppointmentStatus, ChainId, ConfigValidationError, DelayDistribution, EventId, EventKind,
    Label, PatientId, PractitionerId, SequenceTemplate, ShiftType, SimulationConfig,
};

// Practitioners and patients
pub use patient::{Patient, PopulationManager};
pub use practitioner::{Practitioner, PractitionerGenerator, SlotSearch};

// Events and the event log
pub use events::{
    AccessContext, Event, EventLog, EventPayload, InMemoryEventLog, JsonlEventLog,
    PersistenceError, SequenceGenerator,
};

// Classification
pub use classification::{
    ClassificationEngine, ClassificationRecord, ClassificationSummary, FeatureVector,
    RelationshipTracker,
};

// Simulation types and functionality
pub use simulation::{
    RunSummary, RunUntil, Scheduler, SchedulingError, SimMinutes, SimulationError,
    SimulationOrchestrator, SimulationStatistics, TimeManager, TimeWindow,
};
