//! The seam between the board and the remote ward API.
//!
//! [`BedApi`] is implemented over HTTP by `ward-client` and by in-memory stubs in tests. Transport
//! failures, non-2xx responses and undecodable bodies are all reported as `Err`; an answer of
//! `success: false` is a well-formed `Ok(MutationRes)` that [`mutation_result`] turns into
//! [`BoardError::Rejected`].

use crate::board::Board;
use crate::intent::Intent;
use crate::{BoardError, BoardResult};
use api_shared::wire;

#[async_trait::async_trait]
pub trait BedApi: Send + Sync {
    /// `GET` wards with their beds.
    async fn fetch_wards(&self) -> BoardResult<Vec<wire::Ward>>;

    /// `GET` all patients.
    async fn fetch_patients(&self) -> BoardResult<Vec<wire::Patient>>;

    async fn assign_bed(&self, req: wire::AssignBedReq) -> BoardResult<wire::MutationRes>;

    async fn unassign_bed(&self, req: wire::UnassignBedReq) -> BoardResult<wire::MutationRes>;

    async fn change_bed_status(&self, req: wire::BedStatusReq) -> BoardResult<wire::MutationRes>;
}

/// Fetch wards and patients together and build a fresh board.
pub async fn fetch_board<A>(api: &A) -> BoardResult<Board>
where
    A: BedApi + ?Sized,
{
    let (wards, patients) = tokio::try_join!(api.fetch_wards(), api.fetch_patients())?;
    Board::from_wire(wards, &patients)
}

/// Send the persistence request for an intent.
pub async fn persist<A>(api: &A, intent: &Intent) -> BoardResult<()>
where
    A: BedApi + ?Sized,
{
    let res = match *intent {
        Intent::AssignPatientToBed { patient_id, bed_id } => {
            api.assign_bed(wire::AssignBedReq {
                patient_id: patient_id.get(),
                bed_id: bed_id.get(),
            })
            .await?
        }
        Intent::UnassignBed { bed_id } => {
            api.unassign_bed(wire::UnassignBedReq {
                bed_id: bed_id.get(),
            })
            .await?
        }
        Intent::ChangeBedStatus { bed_id, new_status } => {
            api.change_bed_status(wire::BedStatusReq {
                bed_id: bed_id.get(),
                new_status: new_status.status(),
            })
            .await?
        }
    };
    mutation_result(res)
}

/// Interpret a mutation response body.
pub fn mutation_result(res: wire::MutationRes) -> BoardResult<()> {
    if res.success {
        return Ok(());
    }
    let message = res
        .message
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| "the ward API rejected the change".into());
    Err(BoardError::Rejected(message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_response_is_ok() {
        assert!(mutation_result(wire::MutationRes::ok()).is_ok());
    }

    #[test]
    fn test_rejection_message_is_kept_verbatim() {
        let err = mutation_result(wire::MutationRes::rejected("Bed 3 is being cleaned"))
            .expect_err("rejection should be an error");
        assert_eq!(err.to_string(), "Bed 3 is being cleaned");
    }

    #[test]
    fn test_rejection_without_message_gets_default_text() {
        let err = mutation_result(wire::MutationRes {
            success: false,
            message: Some("   ".into()),
        })
        .expect_err("rejection should be an error");
        assert!(matches!(err, BoardError::Rejected(ref m) if m == "the ward API rejected the change"));
    }
}
