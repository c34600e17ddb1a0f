//! Practitioner generation and statistics

use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, info};

use super::Practitioner;
use crate::types::{ShiftType, SimulationConfig};

/// Creates the practitioner roster for a run
#[derive(Debug, Default, Clone, Copy)]
pub struct PractitionerGenerator;

impl PractitionerGenerator {
    /// Create a generator
    pub fn new() -> Self {
        Self
    }

    /// Draw `config.practitioner_count` practitioners with shifts from the configured mix
    pub fn generate<R: Rng + ?Sized>(
        &self,
        config: &SimulationConfig,
        rng: &mut R,
    ) -> Result<Vec<Practitioner>, String> {
        let mix = config.effective_shift_mix();
        let mut practitioners = Vec::with_capacity(config.practitioner_count);

        for _ in 0..config.practitioner_count {
            let shift = *mix
                .choose(rng)
                .ok_or_else(|| "Cannot generate practitioners from an empty shift mix".to_string())?;
            let practitioner = Practitioner::random(shift, rng);
            debug!(id = %practitioner.id, shift = %shift, "generated practitioner");
            practitioners.push(practitioner);
        }

        let stats = PractitionerStats::from_practitioners(&practitioners);
        info!("Generated practitioner roster: {}", stats);
        Ok(practitioners)
    }
}

/// Count of practitioners per shift type
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PractitionerStats {
    /// Practitioners per shift type
    pub by_shift: BTreeMap<ShiftType, usize>,
}

impl PractitionerStats {
    /// Tally a roster
    pub fn from_practitioners(practitioners: &[Practitioner]) -> Self {
        let mut by_shift = BTreeMap::new();
        for practitioner in practitioners {
            *by_shift.entry(practitioner.shift).or_insert(0) += 1;
        }
        Self { by_shift }
    }

    /// Total practitioners
    pub fn total(&self) -> usize {
        self.by_shift.values().sum()
    }
}

impl fmt::Display for PractitionerStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} practitioners", self.total())?;
        for (shift, count) in &self.by_shift {
            write!(f, ", {} {}", count, shift)?;
        }
        Ok(())
    }
}
