//! Domain model of the bed board.
//!
//! Wards, beds and patients are owned by the remote ward API. The types here are the board's
//! local projection of them. A bed's occupant lives inside [`BedState::Occupied`], so a bed has an
//! occupant exactly when it is occupied and no other combination can be represented.

use crate::constants::ACTIVE_PATIENT_STATUS;
use crate::{BoardError, BoardResult};
use api_shared::wire;
pub use api_shared::wire::BedStatus;
use ward_types::{BedId, NonEmptyText, PatientId, WardId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patient {
    pub id: PatientId,
    pub first_name: String,
    pub last_name: String,
}

impl Patient {
    pub fn new(id: u64, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            id: PatientId::new(id),
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BedState {
    Available,
    Occupied(Patient),
    Maintenance,
    Cleaning,
    Reserved,
}

impl BedState {
    pub fn status(&self) -> BedStatus {
        match self {
            BedState::Available => BedStatus::Available,
            BedState::Occupied(_) => BedStatus::Occupied,
            BedState::Maintenance => BedStatus::Maintenance,
            BedState::Cleaning => BedStatus::Cleaning,
            BedState::Reserved => BedStatus::Reserved,
        }
    }

    pub fn occupant(&self) -> Option<&Patient> {
        match self {
            BedState::Occupied(patient) => Some(patient),
            _ => None,
        }
    }
}

/// A bed status that can be set directly.
///
/// `occupied` is deliberately absent: a bed only becomes occupied through an assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VacantStatus {
    Available,
    Maintenance,
    Cleaning,
    Reserved,
}

impl VacantStatus {
    pub fn into_state(self) -> BedState {
        match self {
            VacantStatus::Available => BedState::Available,
            VacantStatus::Maintenance => BedState::Maintenance,
            VacantStatus::Cleaning => BedState::Cleaning,
            VacantStatus::Reserved => BedState::Reserved,
        }
    }

    pub fn status(self) -> BedStatus {
        self.into_state().status()
    }
}

impl TryFrom<BedStatus> for VacantStatus {
    type Error = BoardError;

    fn try_from(status: BedStatus) -> BoardResult<Self> {
        match status {
            BedStatus::Available => Ok(VacantStatus::Available),
            BedStatus::Maintenance => Ok(VacantStatus::Maintenance),
            BedStatus::Cleaning => Ok(VacantStatus::Cleaning),
            BedStatus::Reserved => Ok(VacantStatus::Reserved),
            BedStatus::Occupied => Err(BoardError::InvalidStatus(
                "occupied can only be set by assigning a patient".into(),
            )),
        }
    }
}

impl std::str::FromStr for VacantStatus {
    type Err = BoardError;

    fn from_str(s: &str) -> BoardResult<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        let status = BedStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == wanted)
            .ok_or_else(|| BoardError::InvalidStatus(s.to_string()))?;
        VacantStatus::try_from(status)
    }
}

impl std::fmt::Display for VacantStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.status().as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bed {
    pub id: BedId,
    pub bed_number: NonEmptyText,
    pub state: BedState,
}

impl Bed {
    pub fn status(&self) -> BedStatus {
        self.state.status()
    }

    pub fn occupant(&self) -> Option<&Patient> {
        self.state.occupant()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ward {
    pub id: WardId,
    pub name: NonEmptyText,
    pub floor: i32,
    pub capacity: u32,
    pub beds: Vec<Bed>,
}

// ============================================================================
// WIRE CONVERSIONS
// ============================================================================

impl TryFrom<wire::Bed> for Bed {
    type Error = BoardError;

    fn try_from(bed: wire::Bed) -> BoardResult<Self> {
        let id = BedId::new(bed.id);
        let inconsistent = || BoardError::InconsistentBed {
            bed_id: id,
            status: bed.status.to_string(),
        };

        let state = match (bed.status, bed.patient_id) {
            (BedStatus::Occupied, Some(patient_id)) => BedState::Occupied(Patient {
                id: PatientId::new(patient_id),
                first_name: bed.first_name.clone().unwrap_or_default(),
                last_name: bed.last_name.clone().unwrap_or_default(),
            }),
            (BedStatus::Occupied, None) | (_, Some(_)) => return Err(inconsistent()),
            (BedStatus::Available, None) => BedState::Available,
            (BedStatus::Maintenance, None) => BedState::Maintenance,
            (BedStatus::Cleaning, None) => BedState::Cleaning,
            (BedStatus::Reserved, None) => BedState::Reserved,
        };

        Ok(Bed {
            id,
            bed_number: NonEmptyText::new(&bed.bed_number)?,
            state,
        })
    }
}

impl From<&Bed> for wire::Bed {
    fn from(bed: &Bed) -> Self {
        let occupant = bed.occupant();
        wire::Bed {
            id: bed.id.get(),
            bed_number: bed.bed_number.to_string(),
            status: bed.status(),
            patient_id: occupant.map(|p| p.id.get()),
            first_name: occupant.map(|p| p.first_name.clone()),
            last_name: occupant.map(|p| p.last_name.clone()),
        }
    }
}

impl TryFrom<wire::Ward> for Ward {
    type Error = BoardError;

    fn try_from(ward: wire::Ward) -> BoardResult<Self> {
        let beds = ward
            .beds
            .into_iter()
            .map(Bed::try_from)
            .collect::<BoardResult<Vec<_>>>()?;

        Ok(Ward {
            id: WardId::new(ward.id),
            name: NonEmptyText::new(&ward.name)?,
            floor: ward.floor,
            capacity: ward.capacity,
            beds,
        })
    }
}

impl From<&Ward> for wire::Ward {
    fn from(ward: &Ward) -> Self {
        wire::Ward {
            id: ward.id.get(),
            name: ward.name.to_string(),
            floor: ward.floor,
            capacity: ward.capacity,
            beds: ward.beds.iter().map(wire::Bed::from).collect(),
        }
    }
}

impl From<&wire::Patient> for Patient {
    fn from(patient: &wire::Patient) -> Self {
        Patient {
            id: PatientId::new(patient.id),
            first_name: patient.first_name.clone(),
            last_name: patient.last_name.clone(),
        }
    }
}

/// Whether a listed patient belongs in the unassigned pool.
pub fn is_assignable(patient: &wire::Patient) -> bool {
    patient.bed_id.is_none() && patient.status.eq_ignore_ascii_case(ACTIVE_PATIENT_STATUS)
}

/// Keep only active patients that have no bed.
pub fn unassigned_pool(patients: &[wire::Patient]) -> Vec<Patient> {
    patients
        .iter()
        .filter(|p| is_assignable(p))
        .map(Patient::from)
        .collect()
}
