//! Unique identifier types for the EHR activity simulator
//!
//! Patients, practitioners, events and event chains are keyed by UUID newtypes
//! that render with a short kind prefix (`PAT_`, `PRAC_`, `EVT_`, `CHN_`).
//! Identifiers minted during a simulation run are derived from the run's
//! seeded random generator, so two runs with the same seed produce the same ids.

use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use uuid::{Builder, Uuid};

macro_rules! prefixed_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new random identifier (not reproducible)
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Derive an identifier from the given random generator
            pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
                Self(Builder::from_random_bytes(rng.gen()).into_uuid())
            }

            /// Prefix used when rendering this identifier
            pub const PREFIX: &'static str = $prefix;
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $prefix, self.0.simple())
            }
        }

        impl Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: Serializer,
            {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                // Raw UUIDs are accepted too
                let raw = s.strip_prefix($prefix).unwrap_or(&s);
                let uuid = Uuid::parse_str(raw).map_err(serde::de::Error::custom)?;
                Ok($name(uuid))
            }
        }
    };
}

prefixed_id!(
    /// Unique identifier for a patient
    PatientId,
    "PAT_"
);

prefixed_id!(
    /// Unique identifier for a practitioner
    PractitionerId,
    "PRAC_"
);

prefixed_id!(
    /// Unique identifier for a logged event
    EventId,
    "EVT_"
);

prefixed_id!(
    /// Identifier shared by every event descending from the same chain origin
    ChainId,
    "CHN_"
);
