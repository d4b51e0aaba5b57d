//! Scripted in-memory `BedApi` used by the controller and reconciler tests.

use crate::api::BedApi;
use crate::{BoardError, BoardResult};
use api_shared::wire;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    Assign(wire::AssignBedReq),
    Unassign(wire::UnassignBedReq),
    Status(wire::BedStatusReq),
}

#[derive(Default)]
pub(crate) struct ScriptedApi {
    wards: Mutex<Vec<wire::Ward>>,
    patients: Mutex<Vec<wire::Patient>>,
    responses: Mutex<VecDeque<BoardResult<wire::MutationRes>>>,
    calls: Mutex<Vec<Call>>,
    fetches: AtomicUsize,
    stalled: AtomicBool,
    gate: Option<Arc<Semaphore>>,
}

impl ScriptedApi {
    pub(crate) fn new(wards: Vec<wire::Ward>, patients: Vec<wire::Patient>) -> Self {
        Self {
            wards: Mutex::new(wards),
            patients: Mutex::new(patients),
            ..Self::default()
        }
    }

    /// Mutation responses wait for a permit on the returned semaphore.
    pub(crate) fn gated(mut self) -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        self.gate = Some(gate.clone());
        (self, gate)
    }

    /// Queue the next mutation response. An empty queue answers `success: true`.
    pub(crate) fn respond(&self, res: BoardResult<wire::MutationRes>) {
        self.responses.lock().unwrap().push_back(res);
    }

    pub(crate) fn reject(&self, message: &str) {
        self.respond(Ok(wire::MutationRes::rejected(message)));
    }

    pub(crate) fn fail_transport(&self) {
        self.respond(Err(BoardError::Transport("connection refused".into())));
    }

    pub(crate) fn set_wards(&self, wards: Vec<wire::Ward>) {
        *self.wards.lock().unwrap() = wards;
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Every later `fetch_wards` call never completes.
    pub(crate) fn stall_fetches(&self) {
        self.stalled.store(true, Ordering::SeqCst);
    }

    pub(crate) fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    async fn answer(&self, call: Call) -> BoardResult<wire::MutationRes> {
        self.calls.lock().unwrap().push(call);
        if let Some(gate) = &self.gate {
            gate.acquire().await.expect("gate should stay open").forget();
        }
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(wire::MutationRes::ok()))
    }
}

#[async_trait::async_trait]
impl BedApi for ScriptedApi {
    async fn fetch_wards(&self) -> BoardResult<Vec<wire::Ward>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.stalled.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        Ok(self.wards.lock().unwrap().clone())
    }

    async fn fetch_patients(&self) -> BoardResult<Vec<wire::Patient>> {
        Ok(self.patients.lock().unwrap().clone())
    }

    async fn assign_bed(&self, req: wire::AssignBedReq) -> BoardResult<wire::MutationRes> {
        self.answer(Call::Assign(req)).await
    }

    async fn unassign_bed(&self, req: wire::UnassignBedReq) -> BoardResult<wire::MutationRes> {
        self.answer(Call::Unassign(req)).await
    }

    async fn change_bed_status(&self, req: wire::BedStatusReq) -> BoardResult<wire::MutationRes> {
        self.answer(Call::Status(req)).await
    }
}

pub(crate) fn wire_bed(id: u64, status: wire::BedStatus, occupant: Option<(u64, &str, &str)>) -> wire::Bed {
    wire::Bed {
        id,
        bed_number: format!("B-{id:02}"),
        status,
        patient_id: occupant.map(|(id, _, _)| id),
        first_name: occupant.map(|(_, first, _)| first.to_string()),
        last_name: occupant.map(|(_, _, last)| last.to_string()),
    }
}

pub(crate) fn wire_patient(id: u64, first: &str, last: &str, bed_id: Option<u64>) -> wire::Patient {
    wire::Patient {
        id,
        first_name: first.into(),
        last_name: last.into(),
        status: "active".into(),
        bed_id,
    }
}

/// One ward with bed 3 available, bed 4 occupied by Bo Chen (9) and bed 5 available; patients
/// Ann Lee (7) and Cy Diaz (8) unassigned.
pub(crate) fn sample_api() -> ScriptedApi {
    let ward = wire::Ward {
        id: 1,
        name: "General Medicine".into(),
        floor: 2,
        capacity: 4,
        beds: vec![
            wire_bed(3, wire::BedStatus::Available, None),
            wire_bed(4, wire::BedStatus::Occupied, Some((9, "Bo", "Chen"))),
            wire_bed(5, wire::BedStatus::Available, None),
        ],
    };
    ScriptedApi::new(
        vec![ward],
        vec![
            wire_patient(7, "Ann", "Lee", None),
            wire_patient(8, "Cy", "Diaz", None),
            wire_patient(9, "Bo", "Chen", Some(4)),
        ],
    )
}
