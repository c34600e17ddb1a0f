//! Practitioner entity

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{PractitionerId, ShiftType};

/// A practitioner with a fixed working pattern
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Practitioner {
    /// Unique identifier
    pub id: PractitionerId,
    /// Working pattern, immutable for the run
    pub shift: ShiftType,
    /// Offset into the weekly block rotation (only used by rotating shifts)
    pub rotation_offset: u8,
}

impl Practitioner {
    /// Create a practitioner with no rotation offset
    pub fn new(id: PractitionerId, shift: ShiftType) -> Self {
        Self {
            id,
            shift,
            rotation_offset: 0,
        }
    }

    /// Set the rotation offset (taken modulo 3)
    pub fn with_rotation_offset(mut self, offset: u8) -> Self {
        self.rotation_offset = offset % 3;
        self
    }

    /// Create a practitioner with an id and rotation offset drawn from `rng`
    pub fn random<R: Rng + ?Sized>(shift: ShiftType, rng: &mut R) -> Self {
        let id = PractitionerId::generate(rng);
        let offset = if shift == ShiftType::Rotating8Hour {
            rng.gen_range(0..3)
        } else {
            0
        };
        Self::new(id, shift).with_rotation_offset(offset)
    }
}

impl fmt::Display for Practitioner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.id, self.shift)
    }
}
