//! Completion signal of a reconcile.
//!
//! Two phases report back independently, possibly from different threads.
//! The latch counts pending phases and fires its callbacks once the count
//! reaches zero.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use super::error::{Phase, PhaseStatus, ReconcileError, ReconcileResult, SurfaceResult};
use super::surface::CommitCallback;

// =============================================================================
// Outcome
// =============================================================================

/// Per-phase result of a finished reconcile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub reload: PhaseStatus,
    pub rearrange: PhaseStatus,
}

impl ReconcileOutcome {
    /// Both phases succeeded.
    pub fn succeeded(&self) -> bool {
        self.reload.is_success() && self.rearrange.is_success()
    }

    /// Convert into a result, keeping both statuses on failure.
    pub fn into_result(self) -> ReconcileResult<()> {
        if self.succeeded() {
            Ok(())
        } else {
            Err(ReconcileError::Transaction {
                reload: self.reload,
                rearrange: self.rearrange,
            })
        }
    }

    pub(crate) fn log(&self) {
        if self.succeeded() {
            tracing::debug!("reconcile completed");
        } else {
            tracing::warn!(reload = %self.reload, rearrange = %self.rearrange, "reconcile failed");
        }
    }
}

// =============================================================================
// Latch
// =============================================================================

type OutcomeCallback = Box<dyn FnOnce(&ReconcileOutcome) + Send + 'static>;

const PHASES: usize = 2;

struct LatchState {
    pending: usize,
    reload: Option<PhaseStatus>,
    rearrange: Option<PhaseStatus>,
    outcome: Option<ReconcileOutcome>,
    callbacks: Vec<OutcomeCallback>,
}

struct Latch {
    state: Mutex<LatchState>,
    ready: Condvar,
}

/// Handle to the completion signal of one reconcile.
///
/// Cloning is cheap; all clones observe the same signal.
#[derive(Clone)]
pub struct Completion {
    latch: Arc<Latch>,
}

impl Completion {
    pub(crate) fn new() -> Self {
        Self {
            latch: Arc::new(Latch {
                state: Mutex::new(LatchState {
                    pending: PHASES,
                    reload: None,
                    rearrange: None,
                    outcome: None,
                    callbacks: Vec::new(),
                }),
                ready: Condvar::new(),
            }),
        }
    }

    /// Commit callback reporting `phase` into this latch.
    pub(crate) fn phase_callback(&self, phase: Phase, issued: SurfaceResult<()>) -> CommitCallback {
        let this = self.clone();
        Box::new(move |committed| this.report(phase, PhaseStatus::from_commit(issued, committed)))
    }

    fn report(&self, phase: Phase, status: PhaseStatus) {
        let (outcome, callbacks) = {
            let mut state = self.latch.state.lock();
            let slot = match phase {
                Phase::Reload => &mut state.reload,
                Phase::Rearrange => &mut state.rearrange,
            };
            if slot.is_some() {
                tracing::warn!(%phase, "phase reported more than once, ignoring");
                return;
            }
            *slot = Some(status);
            state.pending -= 1;
            if state.pending > 0 {
                return;
            }
            let (Some(reload), Some(rearrange)) = (state.reload.clone(), state.rearrange.clone())
            else {
                return;
            };
            let outcome = ReconcileOutcome { reload, rearrange };
            state.outcome = Some(outcome.clone());
            (outcome, std::mem::take(&mut state.callbacks))
        };

        self.latch.ready.notify_all();
        outcome.log();
        for callback in callbacks {
            callback(&outcome);
        }
    }

    /// Whether both phases have reported.
    pub fn is_complete(&self) -> bool {
        self.latch.state.lock().outcome.is_some()
    }

    /// The outcome, if both phases have reported.
    pub fn outcome(&self) -> Option<ReconcileOutcome> {
        self.latch.state.lock().outcome.clone()
    }

    /// Block until both phases have reported.
    pub fn wait(&self) -> ReconcileOutcome {
        let mut state = self.latch.state.lock();
        loop {
            if let Some(outcome) = &state.outcome {
                return outcome.clone();
            }
            self.latch.ready.wait(&mut state);
        }
    }

    /// Block until both phases have reported or `timeout` elapses.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<ReconcileOutcome> {
        let deadline = Instant::now() + timeout;
        let mut state = self.latch.state.lock();
        loop {
            if let Some(outcome) = &state.outcome {
                return Some(outcome.clone());
            }
            if self.latch.ready.wait_until(&mut state, deadline).timed_out() {
                return state.outcome.clone();
            }
        }
    }

    /// Run `callback` once both phases have reported.
    ///
    /// Runs immediately on the calling thread if already complete, otherwise
    /// on the thread delivering the last phase report.
    pub fn on_complete(&self, callback: impl FnOnce(&ReconcileOutcome) + Send + 'static) {
        let mut state = self.latch.state.lock();
        match state.outcome.clone() {
            Some(outcome) => {
                drop(state);
                callback(&outcome);
            }
            None => state.callbacks.push(Box::new(callback)),
        }
    }
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.latch.state.lock();
        f.debug_struct("Completion")
            .field("pending", &state.pending)
            .field("outcome", &state.outcome)
            .finish()
    }
}
