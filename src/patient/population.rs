//! Patient population manager
//!
//! Keeps the set of patients in admission order and applies the addition and
//! discharge processes. Selection iterates the admission-ordered list, so a
//! fixed seed always picks the same patients. Discharge only flips a patient's
//! membership state; it never touches logged events.

use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashMap;
use tracing::{debug, info};

use super::Patient;
use crate::simulation::time_manager::SimMinutes;
use crate::types::{bernoulli, MembershipState, PatientId, PopulationConfig};

/// Result of one population check
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PopulationChange {
    /// Patients admitted
    pub added: Vec<PatientId>,
    /// Patients discharged
    pub discharged: Vec<PatientId>,
    /// Patients that would have been discharge candidates but had a chain in flight
    pub discharge_deferred: usize,
}

/// Active and discharged patients
#[derive(Debug, Clone)]
pub struct PopulationManager {
    config: PopulationConfig,
    patients: Vec<Patient>,
    index: HashMap<PatientId, usize>,
}

impl PopulationManager {
    /// Create an empty population
    pub fn new(config: PopulationConfig) -> Self {
        Self {
            config,
            patients: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Create a population with `initial_patients` admitted at minute 0
    pub fn with_initial_patients<R: Rng + ?Sized>(config: PopulationConfig, rng: &mut R) -> Self {
        let initial = config.initial_patients;
        let mut manager = Self::new(config);
        for _ in 0..initial {
            manager.admit(0, rng);
        }
        info!(patients = initial, "Seeded initial patient population");
        manager
    }

    /// Population parameters
    pub fn config(&self) -> &PopulationConfig {
        &self.config
    }

    /// Admit a new patient
    pub fn admit<R: Rng + ?Sized>(&mut self, now: SimMinutes, rng: &mut R) -> PatientId {
        let id = PatientId::generate(rng);
        self.index.insert(id, self.patients.len());
        self.patients.push(Patient::new(id, now));
        debug!(patient = %id, now, "patient admitted");
        id
    }

    /// Look up a patient
    pub fn get(&self, id: PatientId) -> Option<&Patient> {
        self.index.get(&id).map(|&i| &self.patients[i])
    }

    fn get_mut(&mut self, id: PatientId) -> Option<&mut Patient> {
        self.index.get(&id).map(|&i| &mut self.patients[i])
    }

    /// Every patient ever admitted, in admission order
    pub fn all_patients(&self) -> &[Patient] {
        &self.patients
    }

    /// Patients currently in the active population, in admission order
    pub fn active_patients(&self) -> impl Iterator<Item = &Patient> {
        self.patients.iter().filter(|p| p.is_active())
    }

    /// Number of active patients
    pub fn active_count(&self) -> usize {
        self.active_patients().count()
    }

    /// Pick an active patient with no chain in flight
    pub fn select_idle_patient<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<PatientId> {
        let idle: Vec<PatientId> = self
            .patients
            .iter()
            .filter(|p| p.is_idle())
            .map(|p| p.id)
            .collect();
        idle.choose(rng).copied()
    }

    /// Pick any active patient
    pub fn select_any_active<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<PatientId> {
        let active: Vec<PatientId> = self.active_patients().map(|p| p.id).collect();
        active.choose(rng).copied()
    }

    /// Whether an appointment for `patient` may start at `time`
    ///
    /// Unknown and discharged patients can never be scheduled.
    pub fn can_schedule_appointment(&self, patient: PatientId, time: SimMinutes) -> bool {
        self.get(patient)
            .is_some_and(|p| p.is_active() && p.cooldown_elapsed(time, self.cooldown()))
    }

    /// Earliest minute a new appointment for `patient` may start
    pub fn next_eligible_appointment(&self, patient: PatientId) -> SimMinutes {
        self.get(patient)
            .map_or(0, |p| p.next_eligible_appointment(self.cooldown()))
    }

    /// Record that an appointment starting at `start` was booked
    pub fn record_appointment(&mut self, patient: PatientId, start: SimMinutes) {
        if let Some(p) = self.get_mut(patient) {
            p.last_appointment_time = Some(p.last_appointment_time.map_or(start, |t| t.max(start)));
        }
    }

    /// Mark a chain as started for `patient`
    pub fn begin_chain(&mut self, patient: PatientId) {
        if let Some(p) = self.get_mut(patient) {
            p.in_flight_chains += 1;
        }
    }

    /// Mark a chain as concluded for `patient`
    pub fn end_chain(&mut self, patient: PatientId) {
        if let Some(p) = self.get_mut(patient) {
            p.in_flight_chains = p.in_flight_chains.saturating_sub(1);
        }
    }

    /// Discharge a patient unless it has a chain in flight
    ///
    /// Returns whether the patient left the population.
    pub fn discharge(&mut self, patient: PatientId, now: SimMinutes) -> bool {
        match self.get_mut(patient) {
            Some(p) if p.is_idle() => {
                p.state = MembershipState::Discharged;
                p.discharged_at = Some(now);
                debug!(patient = %patient, now, "patient discharged");
                true
            }
            _ => false,
        }
    }

    /// Addition process
    ///
    /// Below the population floor, patients are added unconditionally (up to
    /// `max_additions_per_check`); otherwise one patient is added with
    /// probability `p_add` while the population is below target.
    pub fn addition_tick<R: Rng + ?Sized>(&mut self, now: SimMinutes, rng: &mut R) -> PopulationChange {
        let active = self.active_count();
        let target = self.config.target_population;
        let mut change = PopulationChange::default();

        let to_add = if active < self.config.population_floor() {
            self.config
                .max_additions_per_check
                .min(target.saturating_sub(active))
        } else if active < target && bernoulli(rng, self.config.p_add) {
            1
        } else {
            0
        };

        for _ in 0..to_add {
            change.added.push(self.admit(now, rng));
        }

        if !change.added.is_empty() {
            info!(
                added = change.added.len(),
                active = active + change.added.len(),
                now,
                "Added patients"
            );
        }
        change
    }

    /// Discharge process: each active patient leaves with probability `p_discharge`
    pub fn discharge_tick<R: Rng + ?Sized>(&mut self, now: SimMinutes, rng: &mut R) -> PopulationChange {
        let mut change = PopulationChange::default();
        let p_discharge = self.config.p_discharge;

        for i in 0..self.patients.len() {
            let patient = &mut self.patients[i];
            if !patient.is_active() {
                continue;
            }
            if !bernoulli(rng, p_discharge) {
                continue;
            }
            if patient.in_flight_chains > 0 {
                change.discharge_deferred += 1;
                continue;
            }
            patient.state = MembershipState::Discharged;
            patient.discharged_at = Some(now);
            change.discharged.push(patient.id);
        }

        if !change.discharged.is_empty() {
            info!(
                discharged = change.discharged.len(),
                active = self.active_count(),
                now,
                "Discharged patients"
            );
        }
        change
    }

    fn cooldown(&self) -> SimMinutes {
        u64::try_from(self.config.cooldown_minutes).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn config() -> PopulationConfig {
        PopulationConfig {
            initial_patients: 10,
            target_population: 10,
            ..Default::default()
        }
    }

    #[test]
    fn test_initial_population() {
        let mut rng = StdRng::seed_from_u64(1);
        let manager = PopulationManager::with_initial_patients(config(), &mut rng);
        assert_eq!(manager.active_count(), 10);
        assert!(manager.active_patients().all(|p| p.admitted_at == 0));
    }

    #[test]
    fn test_cooldown_blocks_scheduling() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut manager = PopulationManager::with_initial_patients(config(), &mut rng);
        let patient = manager.all_patients()[0].id;

        assert!(manager.can_schedule_appointment(patient, 0));
        manager.record_appointment(patient, 600);
        assert!(!manager.can_schedule_appointment(patient, 600 + 1439));
        assert!(manager.can_schedule_appointment(patient, 600 + 1440));
        assert_eq!(manager.next_eligible_appointment(patient), 2040);
    }

    #[test]
    fn test_discharge_skips_in_flight_chain() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut manager = PopulationManager::with_initial_patients(config(), &mut rng);
        let patient = manager.all_patients()[0].id;

        manager.begin_chain(patient);
        assert!(!manager.discharge(patient, 50));
        assert!(manager.get(patient).unwrap().is_active());

        manager.end_chain(patient);
        assert!(manager.discharge(patient, 60));
        assert_eq!(manager.get(patient).unwrap().discharged_at, Some(60));
        assert!(!manager.can_schedule_appointment(patient, 10_000));
    }

    #[test]
    fn test_discharge_tick_defers_busy_patients() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut cfg = config();
        cfg.p_discharge = 1.0;
        let mut manager = PopulationManager::with_initial_patients(cfg, &mut rng);
        let busy = manager.all_patients()[3].id;
        manager.begin_chain(busy);

        let change = manager.discharge_tick(100, &mut rng);

        assert_eq!(change.discharged.len(), 9);
        assert_eq!(change.discharge_deferred, 1);
        assert_eq!(manager.active_count(), 1);
        assert!(manager.get(busy).unwrap().is_active());
    }

    #[test]
    fn test_addition_refills_below_floor() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut cfg = config();
        cfg.initial_patients = 2;
        cfg.p_add = 0.0;
        let mut manager = PopulationManager::with_initial_patients(cfg, &mut rng);

        // Floor is 7; at most 3 per check
        let change = manager.addition_tick(1440, &mut rng);
        assert_eq!(change.added.len(), 3);
        assert_eq!(manager.active_count(), 5);
    }

    #[test]
    fn test_addition_stops_at_target() {
        let mut rng = StdRng::seed_from_u64(6);
        let mut cfg = config();
        cfg.p_add = 1.0;
        let mut manager = PopulationManager::with_initial_patients(cfg, &mut rng);

        let change = manager.addition_tick(1440, &mut rng);
        assert!(change.added.is_empty());

        manager.discharge(manager.all_patients()[0].id, 1500);
        let change = manager.addition_tick(2880, &mut rng);
        assert_eq!(change.added.len(), 1);
        assert_eq!(manager.active_count(), 10);
    }

    #[test]
    fn test_idle_selection_excludes_busy_patients() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut cfg = config();
        cfg.initial_patients = 2;
        let mut manager = PopulationManager::with_initial_patients(cfg, &mut rng);
        let first = manager.all_patients()[0].id;
        let second = manager.all_patients()[1].id;
        manager.begin_chain(first);

        for _ in 0..20 {
            assert_eq!(manager.select_idle_patient(&mut rng), Some(second));
        }

        manager.begin_chain(second);
        assert_eq!(manager.select_idle_patient(&mut rng), None);
        assert!(manager.select_any_active(&mut rng).is_some());
    }
}
