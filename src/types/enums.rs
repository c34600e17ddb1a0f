//! Enumeration types for the EHR activity simulator
//!
//! This module contains the enumerations shared across the simulation:
//! practitioner shift types, event kinds, appointment outcomes, chain
//! templates and classification labels.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Working pattern of a practitioner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftType {
    /// Monday to Friday, 09:00-17:00
    FullTime,
    /// Monday to Friday, 14:00-22:00
    EveningShift,
    /// Monday to Friday, 09:00-12:00 and 14:00-18:00
    SplitShift,
    /// Tuesday, Thursday and Saturday, 08:00-12:00
    PartTime,
    /// Saturday and Sunday, 10:00-16:00
    WeekendOnly,
    /// Every day, one eight hour block rotating weekly
    Rotating8Hour,
}

impl ShiftType {
    /// All shift types, in declaration order
    pub const ALL: [ShiftType; 6] = [
        ShiftType::FullTime,
        ShiftType::EveningShift,
        ShiftType::SplitShift,
        ShiftType::PartTime,
        ShiftType::WeekendOnly,
        ShiftType::Rotating8Hour,
    ];
}

impl fmt::Display for ShiftType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShiftType::FullTime => write!(f, "full_time"),
            ShiftType::EveningShift => write!(f, "evening_shift"),
            ShiftType::SplitShift => write!(f, "split_shift"),
            ShiftType::PartTime => write!(f, "part_time"),
            ShiftType::WeekendOnly => write!(f, "weekend_only"),
            ShiftType::Rotating8Hour => write!(f, "rotating_8_hour"),
        }
    }
}

impl FromStr for ShiftType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "full_time" | "fulltime" => Ok(ShiftType::FullTime),
            "evening_shift" | "evening" => Ok(ShiftType::EveningShift),
            "split_shift" | "split" => Ok(ShiftType::SplitShift),
            "part_time" | "parttime" => Ok(ShiftType::PartTime),
            "weekend_only" | "weekend" => Ok(ShiftType::WeekendOnly),
            "rotating_8_hour" | "rotating8hour" | "rotating" => Ok(ShiftType::Rotating8Hour),
            _ => Err(format!("Unknown shift type: {}", s)),
        }
    }
}

/// Kind of a logged event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventKind {
    /// Scheduled visit (booked, cancelled or no-show)
    Appointment,
    /// Clinical encounter
    Encounter,
    /// Recorded measurement
    Observation,
    /// Emergency access overriding normal controls
    BreakGlassAccess,
    /// Routine record access outside a clinical chain
    NormalAccess,
}

impl EventKind {
    /// Whether events of this kind establish a care relationship
    pub fn is_clinical(&self) -> bool {
        matches!(
            self,
            EventKind::Appointment | EventKind::Encounter | EventKind::Observation
        )
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Appointment => write!(f, "Appointment"),
            EventKind::Encounter => write!(f, "Encounter"),
            EventKind::Observation => write!(f, "Observation"),
            EventKind::BreakGlassAccess => write!(f, "BreakGlassAccess"),
            EventKind::NormalAccess => write!(f, "NormalAccess"),
        }
    }
}

impl FromStr for EventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "appointment" => Ok(EventKind::Appointment),
            "encounter" => Ok(EventKind::Encounter),
            "observation" => Ok(EventKind::Observation),
            "breakglassaccess" | "break_glass" | "btg" => Ok(EventKind::BreakGlassAccess),
            "normalaccess" | "normal_access" | "normal" => Ok(EventKind::NormalAccess),
            _ => Err(format!("Unknown event kind: {}", s)),
        }
    }
}

/// Outcome of a booked appointment, fixed when the appointment is logged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    /// Patient attended
    Booked,
    /// Cancelled before the visit
    Cancelled,
    /// Patient did not show up
    NoShow,
}

impl AppointmentStatus {
    /// Whether the chain may continue past this appointment
    pub fn is_attended(&self) -> bool {
        matches!(self, AppointmentStatus::Booked)
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Booked => write!(f, "booked"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
            AppointmentStatus::NoShow => write!(f, "noshow"),
        }
    }
}

impl FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "booked" | "fulfilled" => Ok(AppointmentStatus::Booked),
            "cancelled" | "canceled" => Ok(AppointmentStatus::Cancelled),
            "noshow" | "no_show" | "no-show" => Ok(AppointmentStatus::NoShow),
            _ => Err(format!("Unknown appointment status: {}", s)),
        }
    }
}

/// Entry point of a generated event chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SequenceTemplate {
    /// Appointment, then Encounter, Observation and BreakGlass
    AppointmentFirst,
    /// Encounter, then Observation and BreakGlass
    EncounterFirst,
    /// Observation, then BreakGlass
    ObservationFirst,
}

impl SequenceTemplate {
    /// Templates in selection-weight order
    pub const ALL: [SequenceTemplate; 3] = [
        SequenceTemplate::AppointmentFirst,
        SequenceTemplate::EncounterFirst,
        SequenceTemplate::ObservationFirst,
    ];

    /// One-based template number
    pub fn number(&self) -> u8 {
        match self {
            SequenceTemplate::AppointmentFirst => 1,
            SequenceTemplate::EncounterFirst => 2,
            SequenceTemplate::ObservationFirst => 3,
        }
    }
}

impl fmt::Display for SequenceTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SequenceTemplate::AppointmentFirst => write!(f, "Appointment-first"),
            SequenceTemplate::EncounterFirst => write!(f, "Encounter-first"),
            SequenceTemplate::ObservationFirst => write!(f, "Observation-first"),
        }
    }
}

/// Classification label of a (patient, practitioner, window) tuple
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    /// Activity consistent with a care relationship
    Normal,
    /// Activity to be flagged
    Anomaly,
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Normal => write!(f, "Normal"),
            Label::Anomaly => write!(f, "Anomaly"),
        }
    }
}

impl FromStr for Label {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "normal" => Ok(Label::Normal),
            "anomaly" | "anomalous" => Ok(Label::Anomaly),
            _ => Err(format!("Unknown label: {}", s)),
        }
    }
}

/// Membership of a patient in the active population
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MembershipState {
    /// Eligible for new chains
    Active,
    /// Left the population; past events are untouched
    Discharged,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shift_type_parsing() {
        assert_eq!("full_time".parse::<ShiftType>().unwrap(), ShiftType::FullTime);
        assert_eq!("Evening".parse::<ShiftType>().unwrap(), ShiftType::EveningShift);
        assert_eq!("rotating-8-hour".parse::<ShiftType>().unwrap(), ShiftType::Rotating8Hour);
        assert!("night".parse::<ShiftType>().is_err());
    }

    #[test]
    fn test_shift_type_display_round_trips() {
        for shift in ShiftType::ALL {
            assert_eq!(shift.to_string().parse::<ShiftType>().unwrap(), shift);
        }
    }

    #[test]
    fn test_shift_type_serde_uses_snake_case() {
        let json = serde_json::to_string(&ShiftType::WeekendOnly).unwrap();
        assert_eq!(json, "\"weekend_only\"");
    }

    #[test]
    fn test_clinical_event_kinds() {
        assert!(EventKind::Appointment.is_clinical());
        assert!(EventKind::Encounter.is_clinical());
        assert!(EventKind::Observation.is_clinical());
        assert!(!EventKind::BreakGlassAccess.is_clinical());
        assert!(!EventKind::NormalAccess.is_clinical());
    }

    #[test]
    fn test_appointment_status() {
        assert!(AppointmentStatus::Booked.is_attended());
        assert!(!AppointmentStatus::Cancelled.is_attended());
        assert!(!AppointmentStatus::NoShow.is_attended());
        assert_eq!("no-show".parse::<AppointmentStatus>().unwrap(), AppointmentStatus::NoShow);
    }

    #[test]
    fn test_template_numbers() {
        let numbers: Vec<u8> = SequenceTemplate::ALL.iter().map(|t| t.number()).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn test_label_parsing() {
        assert_eq!("ANOMALY".parse::<Label>().unwrap(), Label::Anomaly);
        assert_eq!(Label::Normal.to_string(), "Normal");
    }
}
