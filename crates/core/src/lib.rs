//! # Ward Core
//!
//! Core logic of the bed board: a local projection of wards, beds and unassigned patients,
//! mutated optimistically and reconciled against the remote ward API.
//!
//! This crate contains:
//! - The domain model ([`model`]) with a tagged bed state
//! - The board ([`board`]) with snapshot, apply and rollback
//! - The optimistic mutation controller ([`controller`])
//! - Periodic reconciliation ([`reconcile`])
//! - The [`BedApi`] seam to the remote system
//!
//! **No transport concerns**: the HTTP client lives in `ward-client`, the development server in
//! `api-rest`.

pub mod api;
pub mod board;
pub mod config;
pub mod constants;
pub mod controller;
pub mod error;
pub mod intent;
pub mod model;
pub mod reconcile;

#[cfg(test)]
pub(crate) mod stub;

pub use api::BedApi;
pub use board::{Board, InvariantViolation, OccupancySummary, Rejection, Snapshot, Undo};
pub use config::BoardConfig;
pub use controller::{BoardController, MutationOutcome, PendingMutation, RefreshTicket};
pub use error::{BoardError, BoardResult};
pub use intent::{resolve_drop, DragSource, DropTarget, Intent};
pub use model::{Bed, BedState, BedStatus, Patient, VacantStatus, Ward};
pub use reconcile::{Reconciler, RefreshOutcome};

// Re-export shared primitive types so front ends only need this crate.
pub use ward_types::{BedId, IdError, NonEmptyText, PatientId, TextError, WardId};
