//! Core types and identifiers for the EHR activity simulator
//!
//! This module contains fundamental types, identifiers, and configuration structures
//! used throughout the simulation system.
//!
//! # Overview
//!
//! - **Identifiers**: prefixed UUID identifiers for patients, practitioners, events and chains
//! - **Enums**: shift types, event kinds, appointment outcomes, templates and labels
//! - **Distributions**: per-transition delay distributions
//! - **Configuration**: simulation configuration with validation and CLI support
//!
//! # Usage Example
//!
//! ```rust
//! use ehr_access_simulator::types::*;
//! use rand::SeedableRng;
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(42);
//! let patient_id = PatientId::generate(&mut rng);
//! assert!(patient_id.to_string().starts_with("PAT_"));
//!
//! let config = SimulationConfig {
//!     practitioner_count: 10,
//!     days: 28,
//!     ..Default::default()
//! };
//! assert!(config.validate().is_ok());
//! ```

pub mod config;
pub mod distribution;
pub mod enums;
pub mod identifiers;

// Re-export all public types for convenience
pub use config::*;
pub use distribution::*;
pub use enums::*;
pub use identifiers::*;
