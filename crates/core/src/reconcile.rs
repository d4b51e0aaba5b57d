//! Periodic reconciliation of the board against the ward API.
//!
//! There is no push channel, so the board is refetched wholesale on a fixed interval. A refresh
//! is skipped when a mutation is in flight, and a fetched board is discarded if any mutation
//! started or rolled back while the fetch was outstanding.

use crate::api::{self, BedApi};
use crate::board::Board;
use crate::config::BoardConfig;
use crate::controller::BoardController;
use crate::{BoardError, BoardResult};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The board was replaced with the fetched projection.
    Applied,
    /// A mutation was in flight when the refresh was due; nothing was fetched.
    SkippedInFlight,
    /// The board changed while the fetch was outstanding; the fetched projection was dropped.
    SkippedStale,
}

pub struct Reconciler<A> {
    controller: BoardController<A>,
    interval: Duration,
}

impl<A: BedApi + 'static> Reconciler<A> {
    pub fn new(controller: BoardController<A>, cfg: &BoardConfig) -> Self {
        Self {
            controller,
            interval: cfg.refresh_interval(),
        }
    }

    /// # Errors
    ///
    /// Returns `BoardError::Config` if `interval` is zero.
    pub fn with_interval(controller: BoardController<A>, interval: Duration) -> BoardResult<Self> {
        if interval.is_zero() {
            return Err(BoardError::Config(
                "refresh interval must be greater than zero".into(),
            ));
        }
        Ok(Self {
            controller,
            interval,
        })
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Fetch once and replace the board if no mutation interfered.
    ///
    /// # Errors
    ///
    /// Returns the fetch or decode error. The board is left as it was.
    pub async fn refresh_once(&self) -> BoardResult<RefreshOutcome> {
        let Some(ticket) = self.controller.refresh_ticket() else {
            tracing::debug!("reconciliation skipped: mutation in flight");
            return Ok(RefreshOutcome::SkippedInFlight);
        };

        let board = api::fetch_board(self.controller.api().as_ref()).await?;

        if self.controller.install(ticket, board) {
            tracing::debug!("reconciliation applied");
            Ok(RefreshOutcome::Applied)
        } else {
            tracing::debug!("reconciliation discarded: board changed during fetch");
            Ok(RefreshOutcome::SkippedStale)
        }
    }

    /// Refresh on every tick until `shutdown` turns `true` or its sender is dropped. A fetch still
    /// outstanding at shutdown is abandoned.
    ///
    /// The first refresh happens immediately. `on_refresh` receives each successful outcome
    /// together with a copy of the board as it stands afterwards.
    pub async fn run<F>(self, mut shutdown: watch::Receiver<bool>, mut on_refresh: F)
    where
        F: FnMut(RefreshOutcome, &Board) + Send,
    {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tracing::info!("reconciling every {}s", self.interval.as_secs());

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = shutdown.wait_for(|stop| *stop) => break,
            }

            let refreshed = tokio::select! {
                refreshed = self.refresh_once() => refreshed,
                _ = shutdown.wait_for(|stop| *stop) => break,
            };
            match refreshed {
                Ok(outcome) => {
                    let board = self.controller.board();
                    on_refresh(outcome, &board);
                }
                Err(e) => tracing::warn!("reconciliation fetch failed: {e}"),
            }
        }
        tracing::info!("reconciliation stopped");
    }
}
