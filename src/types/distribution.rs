//! Inter-event delay distributions
//!
//! Every stage transition in a generated chain waits a sampled number of
//! simulated minutes. The distribution is configured per transition and sampled
//! from the run's seeded generator, so delays are reproducible for a fixed seed.

use rand::Rng;
use rand_distr::{Distribution, Exp, LogNormal};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Distribution of a delay in whole simulated minutes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DelayDistribution {
    /// Always the same delay
    Fixed {
        /// Delay in minutes
        minutes: i64,
    },
    /// Uniform over `[min, max]` (inclusive)
    Uniform {
        /// Smallest delay in minutes
        min: i64,
        /// Largest delay in minutes
        max: i64,
    },
    /// Exponential with the given mean, rounded to whole minutes
    Exponential {
        /// Mean delay in minutes
        mean: f64,
    },
    /// Log-normal with the given parameters of the underlying normal
    LogNormal {
        /// Mean of ln(delay)
        mu: f64,
        /// Standard deviation of ln(delay)
        sigma: f64,
    },
}

/// Invalid distribution parameters
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid {kind} distribution: {reason}")]
pub struct DistributionError {
    /// Distribution kind
    pub kind: &'static str,
    /// What is wrong with the parameters
    pub reason: String,
}

impl DelayDistribution {
    /// Short name of the distribution kind
    pub fn kind(&self) -> &'static str {
        match self {
            DelayDistribution::Fixed { .. } => "fixed",
            DelayDistribution::Uniform { .. } => "uniform",
            DelayDistribution::Exponential { .. } => "exponential",
            DelayDistribution::LogNormal { .. } => "log_normal",
        }
    }

    /// Check that the distribution can only produce non-negative delays
    pub fn validate(&self) -> Result<(), DistributionError> {
        let reason = match *self {
            DelayDistribution::Fixed { minutes } if minutes < 0 => {
                Some(format!("delay must not be negative, got {}", minutes))
            }
            DelayDistribution::Uniform { min, .. } if min < 0 => {
                Some(format!("min must not be negative, got {}", min))
            }
            DelayDistribution::Uniform { min, max } if min > max => {
                Some(format!("min ({}) must be <= max ({})", min, max))
            }
            DelayDistribution::Exponential { mean } if !(mean.is_finite() && mean > 0.0) => {
                Some(format!("mean must be positive and finite, got {}", mean))
            }
            DelayDistribution::LogNormal { mu, sigma }
                if !(mu.is_finite() && sigma.is_finite() && sigma >= 0.0) =>
            {
                Some(format!("mu must be finite and sigma non-negative, got mu={} sigma={}", mu, sigma))
            }
            _ => None,
        };

        match reason {
            Some(reason) => Err(DistributionError {
                kind: self.kind(),
                reason,
            }),
            None => Ok(()),
        }
    }

    /// Draw a delay in whole minutes
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<i64, DistributionError> {
        self.validate()?;

        let minutes = match *self {
            DelayDistribution::Fixed { minutes } => minutes,
            DelayDistribution::Uniform { min, max } => rng.gen_range(min..=max),
            DelayDistribution::Exponential { mean } => {
                let exp = Exp::new(1.0 / mean).map_err(|e| self.error(e))?;
                exp.sample(rng).round() as i64
            }
            DelayDistribution::LogNormal { mu, sigma } => {
                let log_normal = LogNormal::new(mu, sigma).map_err(|e| self.error(e))?;
                log_normal.sample(rng).round() as i64
            }
        };

        Ok(minutes)
    }

    fn error(&self, cause: impl fmt::Display) -> DistributionError {
        DistributionError {
            kind: self.kind(),
            reason: cause.to_string(),
        }
    }
}

/// Bernoulli trial; probabilities outside `[0, 1]` saturate instead of panicking
pub fn bernoulli<R: Rng + ?Sized>(rng: &mut R, p: f64) -> bool {
    rng.gen::<f64>() < p
}

impl fmt::Display for DelayDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DelayDistribution::Fixed { minutes } => write!(f, "fixed({}m)", minutes),
            DelayDistribution::Uniform { min, max } => write!(f, "uniform({}m..={}m)", min, max),
            DelayDistribution::Exponential { mean } => write!(f, "exponential(mean={}m)", mean),
            DelayDistribution::LogNormal { mu, sigma } => {
                write!(f, "log_normal(mu={}, sigma={})", mu, sigma)
            }
        }
    }
}
