//! Error types and handling
//!
//! This module contains the error taxonomy of a simulation run. Configuration
//! problems are fatal at startup; scheduling and persistence failures abort a
//! run in progress. Expected non-events (a failed Bernoulli trial, a patient in
//! cooldown, a busy practitioner) are never errors and only show up in the
//! run statistics.

use crate::events::PersistenceError;
use crate::types::{ConfigError, ConfigValidationError, DistributionError};
use thiserror::Error;
use tracing::error;

use super::scheduler::SchedulingError;

/// Errors that can occur during simulation
#[derive(Debug, Error)]
pub enum SimulationError {
    /// Configuration validation failed
    #[error("Configuration validation failed: {0}")]
    ConfigurationError(String),

    /// The scheduler rejected a continuation
    #[error("Scheduling error: {0}")]
    SchedulingError(#[from] SchedulingError),

    /// The event log rejected an append or query
    #[error("Persistence error: {0}")]
    PersistenceError(#[from] PersistenceError),

    /// Event generation failed
    #[error("Event generation failed: {0}")]
    EventGenerationError(String),

    /// I/O error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl From<ConfigError> for SimulationError {
    fn from(error: ConfigError) -> Self {
        SimulationError::ConfigurationError(error.to_string())
    }
}

impl From<ConfigValidationError> for SimulationError {
    fn from(error: ConfigValidationError) -> Self {
        SimulationError::ConfigurationError(error.to_string())
    }
}

impl From<DistributionError> for SimulationError {
    fn from(error: DistributionError) -> Self {
        SimulationError::ConfigurationError(error.to_string())
    }
}

impl From<String> for SimulationError {
    fn from(s: String) -> Self {
        SimulationError::EventGenerationError(s)
    }
}

impl From<&str> for SimulationError {
    fn from(s: &str) -> Self {
        SimulationError::EventGenerationError(s.to_string())
    }
}

impl From<anyhow::Error> for SimulationError {
    fn from(error: anyhow::Error) -> Self {
        SimulationError::EventGenerationError(error.to_string())
    }
}

impl SimulationError {
    /// Create a configuration error
    pub fn configuration_error(msg: impl Into<String>) -> Self {
        Self::ConfigurationError(msg.into())
    }

    /// Create an event generation error
    pub fn event_generation_error(msg: impl Into<String>) -> Self {
        Self::EventGenerationError(msg.into())
    }

    /// Get the error category
    pub fn category(&self) -> &'static str {
        match self {
            SimulationError::ConfigurationError(_) => "Configuration",
            SimulationError::SchedulingError(_) => "Scheduling",
            SimulationError::PersistenceError(_) => "Persistence",
            SimulationError::EventGenerationError(_) => "Event Generation",
            SimulationError::IoError(_) => "IO",
            SimulationError::SerializationError(_) => "Serialization",
        }
    }

    /// Log the error with its category and return it
    pub fn logged(self) -> Self {
        error!(category = self.category(), "{}", self);
        self
    }
}

/// Result type for simulation operations
pub type SimulationResult<T> = Result<T, SimulationError>;
