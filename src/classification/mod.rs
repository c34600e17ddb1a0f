//! Post-run classification of activity windows
//!
//! - **RelationshipTracker**: care-relationship queries and per-window feature bits
//! - **ClassificationEngine**: labels every (patient, practitioner, window) tuple
//!   with a row of the fixed 16-row table
//! - **histogram / ClassificationSummary**: per-row counts and Normal/Anomaly totals

pub mod engine;
pub mod relationship;

// Re-export all public types for convenience
pub use engine::{
    histogram, lookup, ClassificationEngine, ClassificationRecord, ClassificationRow,
    ClassificationSummary, HistogramBin, CLASSIFICATION_TABLE,
};
pub use relationship::{FeatureVector, RelationshipTracker};
