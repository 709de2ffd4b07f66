// libs/appointment-cell/src/services/ledger.rs
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::{Appointment, AppointmentError, AppointmentSearchQuery, SearchPage};

/// Composite key a live appointment claims: no two live records may share one.
type ClaimKey = (Uuid, NaiveDate, String);

/// What a committed update does to the record's slot claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimAction {
    /// Status change does not affect slot occupancy.
    Keep,
    /// Record leaves the live set; the slot becomes bookable again.
    Release,
    /// Record re-enters the live set and must win its slot back. Fails with
    /// `SlotConflict` if another live appointment took the tuple meanwhile.
    Reacquire,
}

#[derive(Default)]
struct LedgerState {
    records: HashMap<Uuid, Appointment>,
    /// Occupied `(doctor, date, slot)` tuples. Only live appointments appear
    /// here; this map is the single enforcement point for the no-double-
    /// booking invariant.
    claims: HashMap<ClaimKey, Uuid>,
    by_doctor_date: HashMap<(Uuid, NaiveDate), HashSet<Uuid>>,
    by_patient: HashMap<Uuid, HashSet<Uuid>>,
}

impl LedgerState {
    fn index(&mut self, appointment: &Appointment) {
        self.by_doctor_date
            .entry((appointment.doctor_id, appointment.date))
            .or_default()
            .insert(appointment.id);
        self.by_patient
            .entry(appointment.patient_id)
            .or_default()
            .insert(appointment.id);
    }
}

/// Durable keyed storage of appointment records.
///
/// All writes go through a single guard, so the claim check and the record
/// commit are one atomic step: a conditional write keyed on the composite
/// tuple. Everything else in the system trusts this rather than re-deriving
/// the invariant.
pub struct AppointmentLedger {
    state: RwLock<LedgerState>,
}

impl AppointmentLedger {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(LedgerState::default()),
        }
    }

    /// Conditional insert: succeeds only if no live appointment currently
    /// occupies `(doctor_id, date, time_slot)`, and otherwise fails without
    /// side effect. Exactly one of any set of concurrent callers for the
    /// same tuple wins.
    pub fn insert_if_absent(&self, appointment: Appointment) -> Result<Appointment, AppointmentError> {
        let mut state = self.state.write().expect("ledger lock poisoned");

        let key = claim_key(&appointment);
        if state.claims.contains_key(&key) {
            warn!(
                "Slot {} on {} for doctor {} already claimed",
                appointment.time_slot, appointment.date, appointment.doctor_id
            );
            return Err(AppointmentError::SlotConflict);
        }

        state.claims.insert(key, appointment.id);
        state.index(&appointment);
        state.records.insert(appointment.id, appointment.clone());

        debug!("Appointment {} committed to ledger", appointment.id);
        Ok(appointment)
    }

    pub fn get(&self, id: Uuid) -> Option<Appointment> {
        self.state
            .read()
            .expect("ledger lock poisoned")
            .records
            .get(&id)
            .cloned()
    }

    /// Atomically apply an update to a stored record. The closure receives
    /// the current record and returns the replacement plus the claim action;
    /// if it errors, or the reacquired slot is taken, nothing is written.
    pub fn update<F>(&self, id: Uuid, apply: F) -> Result<Appointment, AppointmentError>
    where
        F: FnOnce(&Appointment) -> Result<(Appointment, ClaimAction), AppointmentError>,
    {
        let mut state = self.state.write().expect("ledger lock poisoned");

        let current = state.records.get(&id).ok_or(AppointmentError::NotFound)?;
        let (updated, claim_action) = apply(current)?;

        // Identity and slot coordinates are immutable; a changed time is a
        // cancel plus a new booking, never an in-place edit.
        if updated.id != current.id
            || updated.patient_id != current.patient_id
            || updated.doctor_id != current.doctor_id
            || updated.date != current.date
            || updated.time_slot != current.time_slot
            || updated.created_at != current.created_at
        {
            return Err(AppointmentError::Validation(
                "Appointment identity fields cannot be modified".to_string(),
            ));
        }

        let key = claim_key(&updated);
        match claim_action {
            ClaimAction::Keep => {}
            ClaimAction::Release => {
                if state.claims.get(&key) == Some(&id) {
                    state.claims.remove(&key);
                }
            }
            ClaimAction::Reacquire => {
                if let Some(holder) = state.claims.get(&key) {
                    if *holder != id {
                        warn!(
                            "Cannot reacquire slot {} on {}: held by appointment {}",
                            updated.time_slot, updated.date, holder
                        );
                        return Err(AppointmentError::SlotConflict);
                    }
                } else {
                    state.claims.insert(key, id);
                }
            }
        }

        state.records.insert(id, updated.clone());
        debug!("Appointment {} updated to {}", id, updated.status);
        Ok(updated)
    }

    /// Slots currently held by live appointments for a doctor on a date;
    /// feeds the resolver's `existing_claims` input.
    pub fn claims_for(&self, doctor_id: Uuid, date: NaiveDate) -> HashSet<String> {
        let state = self.state.read().expect("ledger lock poisoned");
        state
            .claims
            .iter()
            .filter(|((d, t, _), _)| *d == doctor_id && *t == date)
            .map(|((_, _, slot), _)| slot.clone())
            .collect()
    }

    /// Filtered, ordered listing for the dashboard query surface. `total`
    /// counts every match; `limit`/`offset` only window the returned page.
    pub fn search(&self, query: &AppointmentSearchQuery) -> SearchPage {
        let state = self.state.read().expect("ledger lock poisoned");

        // Narrow through an index when the filter allows it.
        let single_day = match (query.from_date, query.to_date) {
            (Some(from), Some(to)) if from == to => Some(from),
            _ => None,
        };
        let candidate_ids: Vec<Uuid> = if let (Some(doctor_id), Some(date)) = (query.doctor_id, single_day) {
            state
                .by_doctor_date
                .get(&(doctor_id, date))
                .map(|ids| ids.iter().copied().collect())
                .unwrap_or_default()
        } else if let Some(patient_id) = query.patient_id {
            state
                .by_patient
                .get(&patient_id)
                .map(|ids| ids.iter().copied().collect())
                .unwrap_or_default()
        } else {
            state.records.keys().copied().collect()
        };

        let mut results: Vec<Appointment> = candidate_ids
            .into_iter()
            .filter_map(|id| state.records.get(&id))
            .filter(|a| query.patient_id.map_or(true, |p| a.patient_id == p))
            .filter(|a| query.doctor_id.map_or(true, |d| a.doctor_id == d))
            .filter(|a| query.status.map_or(true, |s| a.status == s))
            .filter(|a| query.appointment_type.map_or(true, |t| a.appointment_type == t))
            .filter(|a| query.from_date.map_or(true, |f| a.date >= f))
            .filter(|a| query.to_date.map_or(true, |t| a.date <= t))
            .cloned()
            .collect();

        results.sort_by(|a, b| {
            (a.date, &a.time_slot, a.created_at).cmp(&(b.date, &b.time_slot, b.created_at))
        });

        let total = results.len();
        let offset = query.offset.unwrap_or(0);
        let limit = query.limit.unwrap_or(usize::MAX);
        SearchPage {
            appointments: results.into_iter().skip(offset).take(limit).collect(),
            total,
        }
    }
}

impl Default for AppointmentLedger {
    fn default() -> Self {
        Self::new()
    }
}

fn claim_key(appointment: &Appointment) -> ClaimKey {
    (
        appointment.doctor_id,
        appointment.date,
        appointment.time_slot.clone(),
    )
}
