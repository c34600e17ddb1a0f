//! Practitioners and their working patterns
//!
//! - **Practitioner**: identifier, shift type and rotation offset
//! - **Availability**: shift windows, on-shift checks and appointment slot search
//! - **PractitionerGenerator**: draws a roster from the configured shift mix

pub mod availability;
pub mod generator;
#[allow(clippy::module_inception)]
pub mod practitioner;

// Re-export all public types for convenience
pub use availability::{shift_windows, SlotSearch};
pub use generator::{PractitionerGenerator, PractitionerStats};
pub use practitioner::Practitioner;
