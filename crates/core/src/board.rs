//! The board: local projection of wards, beds and the unassigned pool.
//!
//! Every mutation goes through [`Board::apply`], which checks the intent's preconditions, captures
//! a deep copy of the wards (and of the pool when an assignment removes from it), and only then
//! mutates. The returned
//! [`Undo`] is handed back to [`Board::rollback`] if the remote system refuses the change, which
//! overwrites the board with the captured copy instead of computing an inverse.

use crate::intent::Intent;
use crate::model::{unassigned_pool, Bed, BedState, BedStatus, Patient, VacantStatus, Ward};
use crate::BoardResult;
use api_shared::wire;
use std::collections::HashSet;
use ward_types::{BedId, PatientId, WardId};

/// Why an intent cannot be applied to the current board.
///
/// The board client treats these as no-op gestures; the ward API reports them to callers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("patient {0} is not in the unassigned pool")]
    PatientNotInPool(PatientId),
    #[error("bed {0} does not exist")]
    BedNotFound(BedId),
    #[error("bed {0} is already occupied")]
    BedOccupied(BedId),
    #[error("bed {0} is not occupied")]
    BedNotOccupied(BedId),
    #[error("bed {bed_id} is already {status}")]
    StatusUnchanged { bed_id: BedId, status: VacantStatus },
}

/// A consistency problem found by [`Board::check_invariants`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation {
    #[error("patient {0} is both in the pool and occupying a bed")]
    PooledOccupant(PatientId),
    #[error("patient {0} appears more than once")]
    DuplicatePatient(PatientId),
    #[error("bed {0} appears more than once")]
    DuplicateBed(BedId),
    #[error("ward {ward_id} has more than one bed numbered {bed_number}")]
    DuplicateBedNumber { ward_id: WardId, bed_number: String },
}

/// Deep copy of the whole board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub wards: Vec<Ward>,
    pub pool: Vec<Patient>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PoolUndo {
    Keep,
    Restore(Vec<Patient>),
    RemoveSpeculative(PatientId),
}

/// What is needed to take back one optimistic mutation: a copy of every ward as it stood before
/// the mutation, and how to undo the pool change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Undo {
    wards: Vec<Ward>,
    pool: PoolUndo,
}

/// Per-ward bed counts.
#[derive(Debug, Clone, PartialEq)]
pub struct OccupancySummary {
    pub ward_id: WardId,
    pub ward_name: String,
    pub floor: i32,
    pub capacity: u32,
    pub available: usize,
    pub occupied: usize,
    pub maintenance: usize,
    pub cleaning: usize,
    pub reserved: usize,
}

impl OccupancySummary {
    pub fn total_beds(&self) -> usize {
        self.available + self.occupied + self.maintenance + self.cleaning + self.reserved
    }

    /// Occupied beds as a fraction of ward capacity. Zero for a ward without capacity.
    pub fn occupancy_rate(&self) -> f64 {
        if self.capacity == 0 {
            return 0.0;
        }
        self.occupied as f64 / f64::from(self.capacity)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Board {
    wards: Vec<Ward>,
    pool: Vec<Patient>,
}

impl Board {
    /// Build a board, dropping pool entries that already occupy a bed or repeat an earlier entry.
    pub fn new(wards: Vec<Ward>, pool: Vec<Patient>) -> Self {
        let mut board = Self { wards, pool };
        board.drop_placed_from_pool();
        board
    }

    /// Remove pool entries that occupy a bed or repeat an earlier pool entry.
    fn drop_placed_from_pool(&mut self) {
        let mut seen: HashSet<PatientId> = self.occupants().map(|p| p.id).collect();
        self.pool.retain(|patient| {
            let fresh = seen.insert(patient.id);
            if !fresh {
                tracing::warn!("dropping patient {} from unassigned pool: already placed", patient.id);
            }
            fresh
        });
    }

    /// Build a board from `GET /wards` and `GET /patients` responses.
    pub fn from_wire(wards: Vec<wire::Ward>, patients: &[wire::Patient]) -> BoardResult<Self> {
        let wards = wards
            .into_iter()
            .map(Ward::try_from)
            .collect::<BoardResult<Vec<_>>>()?;
        Ok(Self::new(wards, unassigned_pool(patients)))
    }

    pub fn wards(&self) -> &[Ward] {
        &self.wards
    }

    pub fn pool(&self) -> &[Patient] {
        &self.pool
    }

    pub fn find_bed(&self, bed_id: BedId) -> Option<(&Ward, &Bed)> {
        self.wards
            .iter()
            .find_map(|ward| ward.beds.iter().find(|b| b.id == bed_id).map(|bed| (ward, bed)))
    }

    pub fn bed(&self, bed_id: BedId) -> Option<&Bed> {
        self.find_bed(bed_id).map(|(_, bed)| bed)
    }

    fn bed_mut(&mut self, bed_id: BedId) -> Option<&mut Bed> {
        self.wards
            .iter_mut()
            .flat_map(|ward| ward.beds.iter_mut())
            .find(|b| b.id == bed_id)
    }

    pub fn pool_patient(&self, patient_id: PatientId) -> Option<&Patient> {
        self.pool.iter().find(|p| p.id == patient_id)
    }

    /// The bed currently holding `patient_id`, if any.
    pub fn bed_of(&self, patient_id: PatientId) -> Option<&Bed> {
        self.wards
            .iter()
            .flat_map(|ward| ward.beds.iter())
            .find(|b| b.occupant().is_some_and(|p| p.id == patient_id))
    }

    pub fn occupants(&self) -> impl Iterator<Item = &Patient> {
        self.wards
            .iter()
            .flat_map(|ward| ward.beds.iter())
            .filter_map(Bed::occupant)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            wards: self.wards.clone(),
            pool: self.pool.clone(),
        }
    }

    /// Overwrite the whole board with a snapshot.
    pub fn restore(&mut self, snapshot: Snapshot) {
        self.wards = snapshot.wards;
        self.pool = snapshot.pool;
    }

    /// Check an intent's preconditions without mutating.
    pub fn check(&self, intent: &Intent) -> Result<(), Rejection> {
        match *intent {
            Intent::AssignPatientToBed { patient_id, bed_id } => {
                if self.pool_patient(patient_id).is_none() {
                    return Err(Rejection::PatientNotInPool(patient_id));
                }
                let bed = self.bed(bed_id).ok_or(Rejection::BedNotFound(bed_id))?;
                if bed.status() == BedStatus::Occupied {
                    return Err(Rejection::BedOccupied(bed_id));
                }
                Ok(())
            }
            Intent::UnassignBed { bed_id } => {
                let bed = self.bed(bed_id).ok_or(Rejection::BedNotFound(bed_id))?;
                if bed.occupant().is_none() {
                    return Err(Rejection::BedNotOccupied(bed_id));
                }
                Ok(())
            }
            Intent::ChangeBedStatus { bed_id, new_status } => {
                let bed = self.bed(bed_id).ok_or(Rejection::BedNotFound(bed_id))?;
                if bed.status() == BedStatus::Occupied {
                    return Err(Rejection::BedOccupied(bed_id));
                }
                if bed.status() == new_status.status() {
                    return Err(Rejection::StatusUnchanged {
                        bed_id,
                        status: new_status,
                    });
                }
                Ok(())
            }
        }
    }

    /// Apply an intent optimistically.
    ///
    /// On `Err` the board is untouched. On `Ok` the returned [`Undo`] restores the collections the
    /// intent touched to their state immediately before this call.
    pub fn apply(&mut self, intent: &Intent) -> Result<Undo, Rejection> {
        self.check(intent)?;

        match *intent {
            Intent::AssignPatientToBed { patient_id, bed_id } => {
                let undo = Undo {
                    wards: self.wards.clone(),
                    pool: PoolUndo::Restore(self.pool.clone()),
                };
                let position = self
                    .pool
                    .iter()
                    .position(|p| p.id == patient_id)
                    .ok_or(Rejection::PatientNotInPool(patient_id))?;
                let patient = self.pool.remove(position);
                let bed = self.bed_mut(bed_id).ok_or(Rejection::BedNotFound(bed_id))?;
                bed.state = BedState::Occupied(patient);
                Ok(undo)
            }
            Intent::UnassignBed { bed_id } => {
                let wards = self.wards.clone();
                let bed = self.bed_mut(bed_id).ok_or(Rejection::BedNotFound(bed_id))?;
                let patient = match std::mem::replace(&mut bed.state, BedState::Available) {
                    BedState::Occupied(patient) => patient,
                    other => {
                        bed.state = other;
                        return Err(Rejection::BedNotOccupied(bed_id));
                    }
                };
                let undo = Undo {
                    wards,
                    pool: PoolUndo::RemoveSpeculative(patient.id),
                };
                self.pool.push(patient);
                Ok(undo)
            }
            Intent::ChangeBedStatus { bed_id, new_status } => {
                let undo = Undo {
                    wards: self.wards.clone(),
                    pool: PoolUndo::Keep,
                };
                let bed = self.bed_mut(bed_id).ok_or(Rejection::BedNotFound(bed_id))?;
                bed.state = new_status.into_state();
                Ok(undo)
            }
        }
    }

    /// Take back an optimistic mutation.
    ///
    /// The wards are overwritten with the copy taken by [`apply`](Self::apply). When other
    /// mutations overlapped this one, that copy can place a patient the current pool also holds;
    /// the bed wins and the pool entry is dropped, so the pool never shares a patient with a bed.
    pub fn rollback(&mut self, undo: Undo) {
        self.wards = undo.wards;
        match undo.pool {
            PoolUndo::Keep => {}
            PoolUndo::Restore(pool) => self.pool = pool,
            PoolUndo::RemoveSpeculative(patient_id) => {
                if let Some(position) = self.pool.iter().position(|p| p.id == patient_id) {
                    self.pool.remove(position);
                }
            }
        }
        self.drop_placed_from_pool();
    }

    pub fn occupancy(&self) -> Vec<OccupancySummary> {
        self.wards
            .iter()
            .map(|ward| {
                let mut summary = OccupancySummary {
                    ward_id: ward.id,
                    ward_name: ward.name.to_string(),
                    floor: ward.floor,
                    capacity: ward.capacity,
                    available: 0,
                    occupied: 0,
                    maintenance: 0,
                    cleaning: 0,
                    reserved: 0,
                };
                for bed in &ward.beds {
                    match bed.status() {
                        BedStatus::Available => summary.available += 1,
                        BedStatus::Occupied => summary.occupied += 1,
                        BedStatus::Maintenance => summary.maintenance += 1,
                        BedStatus::Cleaning => summary.cleaning += 1,
                        BedStatus::Reserved => summary.reserved += 1,
                    }
                }
                summary
            })
            .collect()
    }

    /// Verify the cross-entity invariants the type system cannot express.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let mut bed_ids = HashSet::new();
        let mut occupant_ids = HashSet::new();

        for ward in &self.wards {
            let mut numbers = HashSet::new();
            for bed in &ward.beds {
                if !bed_ids.insert(bed.id) {
                    return Err(InvariantViolation::DuplicateBed(bed.id));
                }
                if !numbers.insert(bed.bed_number.as_str()) {
                    return Err(InvariantViolation::DuplicateBedNumber {
                        ward_id: ward.id,
                        bed_number: bed.bed_number.to_string(),
                    });
                }
                if let Some(patient) = bed.occupant() {
                    if !occupant_ids.insert(patient.id) {
                        return Err(InvariantViolation::DuplicatePatient(patient.id));
                    }
                }
            }
        }

        let mut pool_ids = HashSet::new();
        for patient in &self.pool {
            if occupant_ids.contains(&patient.id) {
                return Err(InvariantViolation::PooledOccupant(patient.id));
            }
            if !pool_ids.insert(patient.id) {
                return Err(InvariantViolation::DuplicatePatient(patient.id));
            }
        }

        Ok(())
    }
}
