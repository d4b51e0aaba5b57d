//! JSON wire types for the ward API.
//!
//! Field names are camelCase on the wire. Identifiers are bare integers. A bed's occupant is
//! flattened into optional `patientId`/`firstName`/`lastName` fields that are only present when
//! `status` is `occupied`.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Status of a bed as carried on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BedStatus {
    Available,
    Occupied,
    Maintenance,
    Cleaning,
    Reserved,
}

impl BedStatus {
    pub const ALL: [BedStatus; 5] = [
        BedStatus::Available,
        BedStatus::Occupied,
        BedStatus::Maintenance,
        BedStatus::Cleaning,
        BedStatus::Reserved,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BedStatus::Available => "available",
            BedStatus::Occupied => "occupied",
            BedStatus::Maintenance => "maintenance",
            BedStatus::Cleaning => "cleaning",
            BedStatus::Reserved => "reserved",
        }
    }
}

impl std::fmt::Display for BedStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Bed {
    pub id: u64,
    pub bed_number: String,
    pub status: BedStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Ward {
    pub id: u64,
    pub name: String,
    pub floor: i32,
    pub capacity: u32,
    #[serde(default)]
    pub beds: Vec<Bed>,
}

/// A patient as listed by `GET /patients`.
///
/// `status` is free text owned by the remote system; the board only treats `active` patients
/// without a `bedId` as assignable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: u64,
    pub first_name: String,
    pub last_name: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bed_id: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignBedReq {
    pub patient_id: u64,
    pub bed_id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UnassignBedReq {
    pub bed_id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BedStatusReq {
    pub bed_id: u64,
    pub new_status: BedStatus,
}

/// Response to every bed mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MutationRes {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl MutationRes {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bed_uses_camel_case_and_omits_empty_occupant() {
        let bed = Bed {
            id: 3,
            bed_number: "A-03".into(),
            status: BedStatus::Available,
            patient_id: None,
            first_name: None,
            last_name: None,
        };
        let json = serde_json::to_value(&bed).expect("should serialize bed");
        assert_eq!(
            json,
            serde_json::json!({"id": 3, "bedNumber": "A-03", "status": "available"})
        );
    }

    #[test]
    fn test_occupied_bed_parses_occupant_fields() {
        let bed: Bed = serde_json::from_str(
            r#"{"id":3,"bedNumber":"A-03","status":"occupied","patientId":7,"firstName":"Ann","lastName":"Lee"}"#,
        )
        .expect("should parse occupied bed");
        assert_eq!(bed.status, BedStatus::Occupied);
        assert_eq!(bed.patient_id, Some(7));
        assert_eq!(bed.first_name.as_deref(), Some("Ann"));
    }

    #[test]
    fn test_unknown_status_is_a_parse_error() {
        let result: Result<Bed, _> =
            serde_json::from_str(r#"{"id":1,"bedNumber":"X","status":"exploded"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_status_request_body_shape() {
        let req = BedStatusReq {
            bed_id: 5,
            new_status: BedStatus::Maintenance,
        };
        let json = serde_json::to_value(&req).expect("should serialize request");
        assert_eq!(
            json,
            serde_json::json!({"bedId": 5, "newStatus": "maintenance"})
        );
    }

    #[test]
    fn test_mutation_response_without_message() {
        let res: MutationRes =
            serde_json::from_str(r#"{"success":false}"#).expect("should parse response");
        assert!(!res.success);
        assert_eq!(res.message, None);
    }
}
