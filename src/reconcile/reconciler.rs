//! Two-phase application of a plan to a mutation surface.

use super::batch::BatchPlan;
use super::error::{Phase, ReconcileResult};
use super::latch::Completion;
use super::surface::MutationSurface;

#[cfg(feature = "async")]
use super::{error::PhaseStatus, latch::ReconcileOutcome, surface::AsyncMutationSurface};

/// Reconciler behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileConfig {
    /// Validate every position against the surface before issuing any call.
    pub check_bounds: bool,
    /// Do not issue batch calls with no positions.
    pub skip_empty: bool,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            check_bounds: true,
            skip_empty: true,
        }
    }
}

impl ReconcileConfig {
    /// Leave bound checking to the surface.
    pub fn trusting() -> Self {
        Self {
            check_bounds: false,
            ..Self::default()
        }
    }
}

/// Applies a [`BatchPlan`] to a [`MutationSurface`] in two phases.
///
/// 1. **Reload**: one transaction holding only reloads, at pre-mutation positions.
/// 2. **Rearrange**: one transaction that first runs `update_data`, then issues
///    deletes, inserts and moves. Sections go before the items nested in them.
///
/// The surface is borrowed for the duration of the call only. The returned
/// [`Completion`] fires once both commits have reported back.
#[derive(Debug, Clone, Copy, Default)]
pub struct Reconciler {
    config: ReconcileConfig,
}

impl Reconciler {
    pub fn new(config: ReconcileConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReconcileConfig {
        &self.config
    }

    /// Apply `plan` to `surface`.
    ///
    /// Fails with [`ReconcileError::OutOfRange`](super::ReconcileError::OutOfRange)
    /// before any surface call when bound checking is on and a position does
    /// not fit. Failures after that point are reported through the
    /// [`Completion`]: a failing call stops the rest of its phase, the phase
    /// is still committed and reported as errored.
    ///
    /// # Example
    ///
    /// ```
    /// use tola_listdiff::{convert, diff, IndexedSurface, Reconciler};
    ///
    /// let (old, new) = (vec![1, 2, 3], vec![3, 1]);
    /// let plan = convert(&diff(&old, &new), 0);
    ///
    /// let mut surface = IndexedSurface::with_counts([old.len()]);
    /// let mut live = old.clone();
    /// let completion = Reconciler::default()
    ///     .apply(&mut surface, &plan, || live = new.clone())
    ///     .unwrap();
    ///
    /// assert!(completion.wait().succeeded());
    /// assert_eq!(surface.counts(), &[2]);
    /// ```
    pub fn apply<S, B, F>(&self, surface: &mut S, plan: &B, update_data: F) -> ReconcileResult<Completion>
    where
        S: MutationSurface + ?Sized,
        B: BatchPlan,
        F: FnOnce(),
    {
        self.preflight(surface, plan)?;
        let completion = Completion::new();
        let skip_empty = self.config.skip_empty;

        tracing::debug!(phase = %Phase::Reload, "begin");
        surface.begin_transaction(Phase::Reload);
        let issued = plan.issue_reloads(surface, skip_empty);
        log_issue(Phase::Reload, &issued);
        surface.commit_transaction(completion.phase_callback(Phase::Reload, issued));

        tracing::debug!(phase = %Phase::Rearrange, "begin");
        surface.begin_transaction(Phase::Rearrange);
        update_data();
        let issued = plan.issue_rearranges(surface, skip_empty);
        log_issue(Phase::Rearrange, &issued);
        surface.commit_transaction(completion.phase_callback(Phase::Rearrange, issued));

        Ok(completion)
    }

    /// Apply `plan` to a surface with awaitable commits.
    ///
    /// Both phases are issued before either commit is awaited; the two
    /// commit futures are then joined.
    #[cfg(feature = "async")]
    pub async fn apply_async<S, B, F>(
        &self,
        surface: &mut S,
        plan: &B,
        update_data: F,
    ) -> ReconcileResult<ReconcileOutcome>
    where
        S: AsyncMutationSurface,
        B: BatchPlan,
        F: FnOnce(),
    {
        self.preflight(surface, plan)?;
        let skip_empty = self.config.skip_empty;

        surface.begin_transaction(Phase::Reload);
        let reload_issued = plan.issue_reloads(surface, skip_empty);
        log_issue(Phase::Reload, &reload_issued);
        let reload = surface.commit_async();

        surface.begin_transaction(Phase::Rearrange);
        update_data();
        let rearrange_issued = plan.issue_rearranges(surface, skip_empty);
        log_issue(Phase::Rearrange, &rearrange_issued);
        let rearrange = surface.commit_async();

        let (reload, rearrange) = futures_util::future::join(reload, rearrange).await;
        let outcome = ReconcileOutcome {
            reload: PhaseStatus::from_commit(reload_issued, reload),
            rearrange: PhaseStatus::from_commit(rearrange_issued, rearrange),
        };
        outcome.log();
        Ok(outcome)
    }

    fn preflight<S, B>(&self, surface: &S, plan: &B) -> ReconcileResult<()>
    where
        S: MutationSurface + ?Sized,
        B: BatchPlan,
    {
        tracing::debug!(
            positions = plan.len(),
            check_bounds = self.config.check_bounds,
            "reconcile"
        );
        if self.config.check_bounds {
            plan.check_bounds(surface)?;
        }
        Ok(())
    }
}

fn log_issue(phase: Phase, issued: &super::error::SurfaceResult<()>) {
    if let Err(err) = issued {
        tracing::warn!(%phase, %err, "surface call failed, rest of phase skipped");
    }
}
