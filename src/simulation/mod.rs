//! Simulation orchestration and control
//!
//! This module contains the discrete-event scheduler, the orchestrator that
//! drives a run, time handling, statistics collection and error handling.
//!
//! # Overview
//!
//! - **Scheduler**: priority queue of pending [`Process`] states and the simulated clock
//! - **SimulationOrchestrator**: owns every component and dispatches scheduled processes
//! - **TimeManager / TimeWindow**: simulated minutes, shift-day helpers and calendar rendering
//! - **SimulationStatistics**: run counters and the summary report
//! - **SimulationError**: error taxonomy of a run
//!
//! # Usage Example
//!
//! ```rust
//! use ehr_access_simulator::events::InMemoryEventLog;
//! use ehr_access_simulator::simulation::*;
//! use ehr_access_simulator::types::*;
//!
//! let config = SimulationConfig {
//!     practitioner_count: 2,
//!     days: 2,
//!     ..Default::default()
//! };
//!
//! let mut orchestrator = SimulationOrchestrator::new(config, InMemoryEventLog::new()).unwrap();
//! let summary = orchestrator.run().unwrap();
//! assert!(summary.final_time < 2 * MINUTES_PER_DAY);
//! ```

pub mod error;
pub mod logging;
pub mod orchestrator;
pub mod process;
pub mod scheduler;
pub mod statistics;
pub mod time_manager;

// Re-export all public types for convenience
pub use error::*;
pub use logging::*;
pub use orchestrator::*;
pub use process::*;
pub use scheduler::*;
pub use statistics::*;
pub use time_manager::*;
