//! Mutation intents and drag-and-drop gestures.

use crate::model::VacantStatus;
use ward_types::{BedId, PatientId};

/// A user-initiated change to the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    AssignPatientToBed { patient_id: PatientId, bed_id: BedId },
    UnassignBed { bed_id: BedId },
    ChangeBedStatus { bed_id: BedId, new_status: VacantStatus },
}

impl Intent {
    pub fn bed_id(&self) -> BedId {
        match *self {
            Intent::AssignPatientToBed { bed_id, .. }
            | Intent::UnassignBed { bed_id }
            | Intent::ChangeBedStatus { bed_id, .. } => bed_id,
        }
    }

    /// Short description used in logs and alerts.
    pub fn describe(&self) -> String {
        match self {
            Intent::AssignPatientToBed { patient_id, bed_id } => {
                format!("assign patient {patient_id} to bed {bed_id}")
            }
            Intent::UnassignBed { bed_id } => format!("unassign bed {bed_id}"),
            Intent::ChangeBedStatus { bed_id, new_status } => {
                format!("set bed {bed_id} to {new_status}")
            }
        }
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.describe())
    }
}

/// What the user picked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragSource {
    /// A patient card from the unassigned pool.
    Pool(PatientId),
    /// The occupant card of a bed.
    Bed(BedId),
}

/// Where the user let go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropTarget {
    Pool,
    Bed(BedId),
}

/// Translate a drag gesture into an intent.
///
/// Dropping onto the container the item came from, or moving an occupant directly between two
/// beds, yields no intent. Whether the intent's preconditions hold is decided later by the board.
pub fn resolve_drop(source: DragSource, target: DropTarget) -> Option<Intent> {
    match (source, target) {
        (DragSource::Pool(patient_id), DropTarget::Bed(bed_id)) => {
            Some(Intent::AssignPatientToBed { patient_id, bed_id })
        }
        (DragSource::Bed(bed_id), DropTarget::Pool) => Some(Intent::UnassignBed { bed_id }),
        (DragSource::Pool(_), DropTarget::Pool) | (DragSource::Bed(_), DropTarget::Bed(_)) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_to_bed_is_an_assignment() {
        let intent = resolve_drop(DragSource::Pool(PatientId::new(7)), DropTarget::Bed(BedId::new(3)));
        assert_eq!(
            intent,
            Some(Intent::AssignPatientToBed {
                patient_id: PatientId::new(7),
                bed_id: BedId::new(3),
            })
        );
    }

    #[test]
    fn test_bed_to_pool_is_an_unassignment() {
        let intent = resolve_drop(DragSource::Bed(BedId::new(3)), DropTarget::Pool);
        assert_eq!(intent, Some(Intent::UnassignBed { bed_id: BedId::new(3) }));
    }

    #[test]
    fn test_drops_onto_own_container_resolve_to_nothing() {
        assert_eq!(resolve_drop(DragSource::Pool(PatientId::new(7)), DropTarget::Pool), None);
        assert_eq!(
            resolve_drop(DragSource::Bed(BedId::new(3)), DropTarget::Bed(BedId::new(3))),
            None
        );
    }

    #[test]
    fn test_bed_to_other_bed_is_not_an_intent() {
        assert_eq!(
            resolve_drop(DragSource::Bed(BedId::new(3)), DropTarget::Bed(BedId::new(4))),
            None
        );
    }

    #[test]
    fn test_describe_names_the_change() {
        let intent = Intent::ChangeBedStatus {
            bed_id: BedId::new(5),
            new_status: VacantStatus::Maintenance,
        };
        assert_eq!(intent.describe(), "set bed 5 to maintenance");
    }
}
