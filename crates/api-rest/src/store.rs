//! In-memory ward store behind the development API.
//!
//! The store keeps a [`Board`] for beds and the unassigned pool, plus a registry of every known
//! patient so that `GET /patients` can list discharged patients and occupants alongside the
//! pool. Mutations go through the same precondition checks the board client uses; a failed check
//! is answered with `success: false` and the rejection text.

use crate::seed::{Seed, SeedError, SeedResult};
use api_shared::wire;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use ward_core::{Board, Intent, PatientId, VacantStatus};

#[derive(Debug, Clone)]
struct RegisteredPatient {
    first_name: String,
    last_name: String,
    status: String,
}

#[derive(Debug)]
struct Inner {
    board: Board,
    registry: BTreeMap<PatientId, RegisteredPatient>,
}

#[derive(Debug)]
pub struct WardStore {
    inner: Mutex<Inner>,
}

impl WardStore {
    /// Build a store from a seed.
    ///
    /// # Errors
    ///
    /// Returns a `SeedError` if the seed is internally inconsistent.
    pub fn from_seed(seed: Seed) -> SeedResult<Self> {
        let (wards, patients) = seed.into_wire()?;

        let registry = patients
            .iter()
            .map(|p| {
                (
                    PatientId::new(p.id),
                    RegisteredPatient {
                        first_name: p.first_name.clone(),
                        last_name: p.last_name.clone(),
                        status: p.status.clone(),
                    },
                )
            })
            .collect();

        let board =
            Board::from_wire(wards, &patients).map_err(|e| SeedError::Board(e.to_string()))?;
        board
            .check_invariants()
            .map_err(|e| SeedError::Board(e.to_string()))?;

        tracing::info!(
            "ward store seeded: {} wards, {} patients",
            board.wards().len(),
            patients.len()
        );

        Ok(Self {
            inner: Mutex::new(Inner { board, registry }),
        })
    }

    pub fn builtin() -> SeedResult<Self> {
        Self::from_seed(Seed::builtin()?)
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn wards(&self) -> Vec<wire::Ward> {
        self.lock().board.wards().iter().map(wire::Ward::from).collect()
    }

    pub fn patients(&self) -> Vec<wire::Patient> {
        let inner = self.lock();
        inner
            .registry
            .iter()
            .map(|(id, patient)| wire::Patient {
                id: id.get(),
                first_name: patient.first_name.clone(),
                last_name: patient.last_name.clone(),
                status: patient.status.clone(),
                bed_id: inner.board.bed_of(*id).map(|bed| bed.id.get()),
            })
            .collect()
    }

    fn apply(&self, intent: Intent) -> wire::MutationRes {
        let mut inner = self.lock();
        match inner.board.apply(&intent) {
            Ok(_) => {
                tracing::info!("{intent}");
                wire::MutationRes::ok()
            }
            Err(rejection) => {
                tracing::info!("refused to {intent}: {rejection}");
                wire::MutationRes::rejected(rejection.to_string())
            }
        }
    }

    pub fn assign(&self, req: &wire::AssignBedReq) -> wire::MutationRes {
        self.apply(Intent::AssignPatientToBed {
            patient_id: req.patient_id.into(),
            bed_id: req.bed_id.into(),
        })
    }

    pub fn unassign(&self, req: &wire::UnassignBedReq) -> wire::MutationRes {
        self.apply(Intent::UnassignBed {
            bed_id: req.bed_id.into(),
        })
    }

    pub fn change_status(&self, req: &wire::BedStatusReq) -> wire::MutationRes {
        match VacantStatus::try_from(req.new_status) {
            Ok(new_status) => self.apply(Intent::ChangeBedStatus {
                bed_id: req.bed_id.into(),
                new_status,
            }),
            Err(e) => wire::MutationRes::rejected(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> WardStore {
        WardStore::builtin().expect("builtin seed should load")
    }

    #[test]
    fn test_patients_report_their_bed() {
        let store = store();
        let patients = store.patients();

        let maya = patients.iter().find(|p| p.id == 1).expect("Maya is listed");
        assert_eq!(maya.bed_id, Some(101));
        let ken = patients.iter().find(|p| p.id == 7).expect("Ken is listed");
        assert_eq!(ken.status, "discharged");
        assert_eq!(ken.bed_id, None);
    }

    #[test]
    fn test_assign_updates_beds_and_patients() {
        let store = store();

        let res = store.assign(&wire::AssignBedReq {
            patient_id: 4,
            bed_id: 102,
        });
        assert!(res.success);

        let bed = store
            .wards()
            .into_iter()
            .flat_map(|w| w.beds)
            .find(|b| b.id == 102)
            .expect("bed 102 exists");
        assert_eq!(bed.status, wire::BedStatus::Occupied);
        assert_eq!(bed.patient_id, Some(4));
        assert_eq!(bed.first_name.as_deref(), Some("Ann"));

        let ann = store
            .patients()
            .into_iter()
            .find(|p| p.id == 4)
            .expect("Ann is listed");
        assert_eq!(ann.bed_id, Some(102));
    }

    #[test]
    fn test_assign_to_occupied_bed_is_refused_with_message() {
        let res = store().assign(&wire::AssignBedReq {
            patient_id: 4,
            bed_id: 101,
        });
        assert_eq!(res, wire::MutationRes::rejected("bed 101 is already occupied"));
    }

    #[test]
    fn test_discharged_patient_cannot_be_assigned() {
        let res = store().assign(&wire::AssignBedReq {
            patient_id: 7,
            bed_id: 102,
        });
        assert!(!res.success);
    }

    #[test]
    fn test_unassign_returns_patient_to_pool() {
        let store = store();
        assert!(store.unassign(&wire::UnassignBedReq { bed_id: 101 }).success);

        let maya = store
            .patients()
            .into_iter()
            .find(|p| p.id == 1)
            .expect("Maya is listed");
        assert_eq!(maya.bed_id, None);
        assert!(
            store
                .assign(&wire::AssignBedReq {
                    patient_id: 1,
                    bed_id: 104,
                })
                .success
        );
    }

    #[test]
    fn test_status_change_refuses_occupied() {
        let res = store().change_status(&wire::BedStatusReq {
            bed_id: 102,
            new_status: wire::BedStatus::Occupied,
        });
        assert!(!res.success);
        assert!(res
            .message
            .as_deref()
            .is_some_and(|m| m.contains("assigning a patient")));
    }

    #[test]
    fn test_status_change_on_unknown_bed_is_refused() {
        let res = store().change_status(&wire::BedStatusReq {
            bed_id: 999,
            new_status: wire::BedStatus::Cleaning,
        });
        assert_eq!(res, wire::MutationRes::rejected("bed 999 does not exist"));
    }
}
