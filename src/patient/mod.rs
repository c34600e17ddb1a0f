//! Patients and population dynamics
//!
//! - **Patient**: membership state, cooldown bookkeeping and in-flight chain count
//! - **PopulationManager**: addition and discharge processes, cooldown checks and patient selection

#[allow(clippy::module_inception)]
pub mod patient;
pub mod population;

// Re-export all public types for convenience
pub use patient::Patient;
pub use population::{PopulationChange, PopulationManager};
