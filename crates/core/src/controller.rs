//! Optimistic mutation controller.
//!
//! The controller owns the board. A mutation runs in two phases:
//!
//! 1. [`BoardController::begin`] checks preconditions, captures an [`Undo`] and applies the
//!    intent synchronously. Nothing has touched the network yet.
//! 2. [`BoardController::confirm`] sends the persistence request. On success the board is left
//!    as it is; on any failure the captured state is written back and an alert is produced.
//!
//! [`BoardController::dispatch`] runs both phases in sequence, and [`BoardController::spawn`]
//! runs phase 2 on a background task so the caller regains control straight after the
//! optimistic apply.
//!
//! Overlapping mutations are allowed. Each rollback only restores what its own mutation
//! captured, which may already include another mutation's optimistic change. The next
//! reconciliation settles any divergence that leaves behind.
//!
//! The board sits behind a `std::sync::Mutex` that is never held across an `.await`.

use crate::api::{self, BedApi};
use crate::board::{Board, Rejection, Undo};
use crate::constants::REVERT_NOTICE;
use crate::intent::{resolve_drop, DragSource, DropTarget, Intent};
use crate::model::VacantStatus;
use crate::{BoardError, BoardResult};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinHandle;
use ward_types::{BedId, PatientId};

#[derive(Debug, Default)]
struct Shared {
    board: Board,
    in_flight: usize,
    generation: u64,
}

/// Result of a mutation attempt.
#[derive(Debug)]
pub enum MutationOutcome {
    /// Nothing was applied or sent. `reason` is `None` when a gesture resolved to no intent.
    Ignored { reason: Option<Rejection> },
    /// The ward API accepted the change; the optimistic state stands.
    Confirmed { intent: Intent },
    /// The ward API refused the change or could not be reached; the board was restored.
    RolledBack {
        intent: Intent,
        error: BoardError,
        alert: String,
    },
}

impl MutationOutcome {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, MutationOutcome::Confirmed { .. })
    }

    pub fn is_rolled_back(&self) -> bool {
        matches!(self, MutationOutcome::RolledBack { .. })
    }

    /// User-facing alert text, present only for rolled-back mutations.
    pub fn alert(&self) -> Option<&str> {
        match self {
            MutationOutcome::RolledBack { alert, .. } => Some(alert),
            _ => None,
        }
    }
}

/// Decrements the in-flight count when the mutation settles or is abandoned.
struct InFlightGuard {
    shared: Arc<Mutex<Shared>>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let mut shared = self.shared.lock().unwrap_or_else(PoisonError::into_inner);
        shared.in_flight = shared.in_flight.saturating_sub(1);
    }
}

/// An optimistically applied mutation awaiting remote confirmation.
pub struct PendingMutation {
    intent: Intent,
    undo: Undo,
    guard: InFlightGuard,
}

impl PendingMutation {
    pub fn intent(&self) -> &Intent {
        &self.intent
    }
}

/// Proof that no mutation was in flight when a reconciliation fetch started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshTicket {
    generation: u64,
}

pub struct BoardController<A> {
    api: Arc<A>,
    shared: Arc<Mutex<Shared>>,
}

impl<A> Clone for BoardController<A> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            shared: self.shared.clone(),
        }
    }
}

impl<A: BedApi> BoardController<A> {
    /// Create a controller with an empty board. Call [`load`](Self::load) to populate it.
    pub fn new(api: Arc<A>) -> Self {
        Self::with_board(api, Board::default())
    }

    pub fn with_board(api: Arc<A>, board: Board) -> Self {
        Self {
            api,
            shared: Arc::new(Mutex::new(Shared {
                board,
                ..Shared::default()
            })),
        }
    }

    pub fn api(&self) -> &Arc<A> {
        &self.api
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fetch the full projection and replace the board unconditionally.
    pub async fn load(&self) -> BoardResult<()> {
        let board = api::fetch_board(self.api.as_ref()).await?;
        let mut shared = self.lock();
        shared.board = board;
        shared.generation += 1;
        tracing::info!(
            "board loaded: {} wards, {} unassigned patients",
            shared.board.wards().len(),
            shared.board.pool().len()
        );
        Ok(())
    }

    /// A copy of the current board.
    pub fn board(&self) -> Board {
        self.lock().board.clone()
    }

    /// Run `f` against the current board. `f` must not call back into the controller.
    pub fn read<R>(&self, f: impl FnOnce(&Board) -> R) -> R {
        f(&self.lock().board)
    }

    /// Number of mutations applied locally but not yet settled.
    pub fn in_flight(&self) -> usize {
        self.lock().in_flight
    }

    /// Apply an intent optimistically.
    ///
    /// # Errors
    ///
    /// Returns the [`Rejection`] if the intent's preconditions do not hold. The board is left
    /// untouched in that case and no request should be sent.
    pub fn begin(&self, intent: Intent) -> Result<PendingMutation, Rejection> {
        let mut shared = self.lock();
        let undo = shared.board.apply(&intent)?;
        shared.in_flight += 1;
        shared.generation += 1;
        tracing::debug!("applied optimistically: {intent}");

        Ok(PendingMutation {
            intent,
            undo,
            guard: InFlightGuard {
                shared: self.shared.clone(),
            },
        })
    }

    /// Persist a pending mutation, rolling it back on any failure.
    pub async fn confirm(&self, pending: PendingMutation) -> MutationOutcome {
        let PendingMutation {
            intent,
            undo,
            guard,
        } = pending;

        let outcome = match api::persist(self.api.as_ref(), &intent).await {
            Ok(()) => {
                tracing::info!("confirmed: {intent}");
                MutationOutcome::Confirmed { intent }
            }
            Err(error) => {
                {
                    let mut shared = self.lock();
                    shared.board.rollback(undo);
                    shared.generation += 1;
                }
                let alert = format!("Failed to {intent}: {error}. {REVERT_NOTICE}");
                tracing::warn!("{alert}");
                MutationOutcome::RolledBack {
                    intent,
                    error,
                    alert,
                }
            }
        };

        drop(guard);
        outcome
    }

    /// Apply, persist and, if needed, roll back one intent.
    pub async fn dispatch(&self, intent: Intent) -> MutationOutcome {
        match self.begin(intent) {
            Ok(pending) => self.confirm(pending).await,
            Err(reason) => {
                tracing::debug!("ignoring {intent}: {reason}");
                MutationOutcome::Ignored {
                    reason: Some(reason),
                }
            }
        }
    }

    pub async fn assign_patient(&self, patient_id: PatientId, bed_id: BedId) -> MutationOutcome {
        self.dispatch(Intent::AssignPatientToBed { patient_id, bed_id })
            .await
    }

    pub async fn unassign_bed(&self, bed_id: BedId) -> MutationOutcome {
        self.dispatch(Intent::UnassignBed { bed_id }).await
    }

    pub async fn change_bed_status(&self, bed_id: BedId, new_status: VacantStatus) -> MutationOutcome {
        self.dispatch(Intent::ChangeBedStatus { bed_id, new_status })
            .await
    }

    /// Handle a drag-and-drop gesture.
    pub async fn drop_item(&self, source: DragSource, target: DropTarget) -> MutationOutcome {
        match resolve_drop(source, target) {
            Some(intent) => self.dispatch(intent).await,
            None => MutationOutcome::Ignored { reason: None },
        }
    }

    /// Reserve the right to replace the board with a fresh fetch.
    ///
    /// Returns `None` while any mutation is in flight.
    pub fn refresh_ticket(&self) -> Option<RefreshTicket> {
        let shared = self.lock();
        (shared.in_flight == 0).then_some(RefreshTicket {
            generation: shared.generation,
        })
    }

    /// Replace the board with a fetched one if nothing changed since `ticket` was issued.
    ///
    /// Returns whether the board was replaced.
    pub fn install(&self, ticket: RefreshTicket, board: Board) -> bool {
        let mut shared = self.lock();
        if shared.in_flight > 0 || shared.generation != ticket.generation {
            return false;
        }
        shared.board = board;
        shared.generation += 1;
        true
    }
}

impl<A: BedApi + 'static> BoardController<A> {
    /// Apply an intent now and confirm it on a background task.
    ///
    /// Returns `None` without sending anything if the intent's preconditions do not hold.
    pub fn spawn(&self, intent: Intent) -> Option<JoinHandle<MutationOutcome>> {
        let pending = match self.begin(intent) {
            Ok(pending) => pending,
            Err(reason) => {
                tracing::debug!("ignoring {intent}: {reason}");
                return None;
            }
        };
        let controller = self.clone();
        Some(tokio::spawn(async move { controller.confirm(pending).await }))
    }
}
