//! Seed data for the development ward API.
//!
//! The server starts from a YAML description of wards and patients. Beds name their occupant by
//! patient id; names are filled in from the patient list so they cannot drift apart.
//!
//! ```yaml
//! wards:
//!   - id: 1
//!     name: General Medicine
//!     floor: 2
//!     capacity: 4
//!     beds:
//!       - { id: 101, bed_number: GM-01, status: occupied, patient_id: 1 }
//!       - { id: 102, bed_number: GM-02 }
//! patients:
//!   - { id: 1, first_name: Ann, last_name: Lee }
//!   - { id: 2, first_name: Bo, last_name: Chen, status: discharged }
//! ```

use api_shared::wire::{self, BedStatus};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

/// Seed used when no `WARD_SEED_FILE` is configured.
pub const BUILTIN_SEED: &str = r#"
wards:
  - id: 1
    name: General Medicine
    floor: 2
    capacity: 6
    beds:
      - { id: 101, bed_number: GM-01, status: occupied, patient_id: 1 }
      - { id: 102, bed_number: GM-02 }
      - { id: 103, bed_number: GM-03, status: cleaning }
      - { id: 104, bed_number: GM-04 }
      - { id: 105, bed_number: GM-05, status: occupied, patient_id: 2 }
      - { id: 106, bed_number: GM-06, status: maintenance }
  - id: 2
    name: Surgical Recovery
    floor: 3
    capacity: 4
    beds:
      - { id: 201, bed_number: SR-01 }
      - { id: 202, bed_number: SR-02, status: reserved }
      - { id: 203, bed_number: SR-03, status: occupied, patient_id: 3 }
      - { id: 204, bed_number: SR-04 }
patients:
  - { id: 1, first_name: Maya, last_name: Okafor }
  - { id: 2, first_name: Tom, last_name: Varga }
  - { id: 3, first_name: Lena, last_name: Fischer }
  - { id: 4, first_name: Ann, last_name: Lee }
  - { id: 5, first_name: Raj, last_name: Patel }
  - { id: 6, first_name: Sofia, last_name: Marquez }
  - { id: 7, first_name: Ken, last_name: Ito, status: discharged }
"#;

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("failed to read seed file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to parse seed YAML: {0}")]
    Yaml(serde_yaml::Error),
    #[error("bed {bed_id} names unknown patient {patient_id}")]
    UnknownOccupant { bed_id: u64, patient_id: u64 },
    #[error("bed {bed_id} is {status} but names patient {patient_id}")]
    OccupantOnVacantBed {
        bed_id: u64,
        status: BedStatus,
        patient_id: u64,
    },
    #[error("bed {0} is occupied but names no patient")]
    MissingOccupant(u64),
    #[error("patient {0} occupies more than one bed")]
    PatientInTwoBeds(u64),
    #[error("patient id {0} is listed more than once")]
    DuplicatePatient(u64),
    #[error("seed is inconsistent: {0}")]
    Board(String),
}

pub type SeedResult<T> = Result<T, SeedError>;

fn default_status() -> BedStatus {
    BedStatus::Available
}

fn default_patient_status() -> String {
    "active".into()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedBed {
    pub id: u64,
    pub bed_number: String,
    #[serde(default = "default_status")]
    pub status: BedStatus,
    #[serde(default)]
    pub patient_id: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedWard {
    pub id: u64,
    pub name: String,
    pub floor: i32,
    pub capacity: u32,
    #[serde(default)]
    pub beds: Vec<SeedBed>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedPatient {
    pub id: u64,
    pub first_name: String,
    pub last_name: String,
    #[serde(default = "default_patient_status")]
    pub status: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Seed {
    #[serde(default)]
    pub wards: Vec<SeedWard>,
    #[serde(default)]
    pub patients: Vec<SeedPatient>,
}

impl Seed {
    pub fn builtin() -> SeedResult<Self> {
        Self::from_yaml(BUILTIN_SEED)
    }

    pub fn from_yaml(yaml: &str) -> SeedResult<Self> {
        serde_yaml::from_str(yaml).map_err(SeedError::Yaml)
    }

    pub fn from_file(path: &Path) -> SeedResult<Self> {
        let yaml = std::fs::read_to_string(path).map_err(SeedError::FileRead)?;
        Self::from_yaml(&yaml)
    }

    /// Resolve the seed from a `WARD_SEED_FILE` value. Unset or blank means the built-in seed.
    pub fn from_env_value(value: Option<String>) -> SeedResult<Self> {
        match value.as_deref().map(str::trim) {
            Some(path) if !path.is_empty() => {
                tracing::info!("loading seed from {path}");
                Self::from_file(Path::new(path))
            }
            _ => Self::builtin(),
        }
    }

    /// Expand the seed into wire-shaped wards and patients.
    ///
    /// # Errors
    ///
    /// Returns a `SeedError` if bed occupancy and the patient list disagree.
    pub fn into_wire(self) -> SeedResult<(Vec<wire::Ward>, Vec<wire::Patient>)> {
        let mut ids = HashSet::new();
        for patient in &self.patients {
            if !ids.insert(patient.id) {
                return Err(SeedError::DuplicatePatient(patient.id));
            }
        }

        let mut placed: Vec<(u64, u64)> = Vec::new();
        let mut wards = Vec::with_capacity(self.wards.len());

        for ward in self.wards {
            let mut beds = Vec::with_capacity(ward.beds.len());
            for bed in ward.beds {
                let occupant = match (bed.status, bed.patient_id) {
                    (BedStatus::Occupied, Some(patient_id)) => {
                        let patient = self
                            .patients
                            .iter()
                            .find(|p| p.id == patient_id)
                            .ok_or(SeedError::UnknownOccupant {
                                bed_id: bed.id,
                                patient_id,
                            })?;
                        if placed.iter().any(|(_, p)| *p == patient_id) {
                            return Err(SeedError::PatientInTwoBeds(patient_id));
                        }
                        placed.push((bed.id, patient_id));
                        Some(patient)
                    }
                    (BedStatus::Occupied, None) => return Err(SeedError::MissingOccupant(bed.id)),
                    (status, Some(patient_id)) => {
                        return Err(SeedError::OccupantOnVacantBed {
                            bed_id: bed.id,
                            status,
                            patient_id,
                        })
                    }
                    (_, None) => None,
                };

                beds.push(wire::Bed {
                    id: bed.id,
                    bed_number: bed.bed_number,
                    status: bed.status,
                    patient_id: occupant.map(|p| p.id),
                    first_name: occupant.map(|p| p.first_name.clone()),
                    last_name: occupant.map(|p| p.last_name.clone()),
                });
            }

            wards.push(wire::Ward {
                id: ward.id,
                name: ward.name,
                floor: ward.floor,
                capacity: ward.capacity,
                beds,
            });
        }

        let patients = self
            .patients
            .into_iter()
            .map(|p| wire::Patient {
                bed_id: placed
                    .iter()
                    .find(|(_, patient_id)| *patient_id == p.id)
                    .map(|(bed_id, _)| *bed_id),
                id: p.id,
                first_name: p.first_name,
                last_name: p.last_name,
                status: p.status,
            })
            .collect();

        Ok((wards, patients))
    }
}
