//! Chemistry solver abstraction.

use kf_chem::ChemicalState;
use kf_core::units::Time;

use crate::error::SolverResult;

/// Counters a solver keeps about its own activity.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SolveStats {
    /// Queries issued to the underlying engine.
    pub queries: u64,
    /// Queries that failed.
    pub failures: u64,
    /// Successful table persists.
    pub persists: u64,
    /// Cumulative wall time spent inside the engine [s].
    pub engine_time_s: f64,
}

/// A chemistry-solving strategy for one worker.
///
/// Implementations own per-worker state and are driven from a single
/// thread at a time (`Send`, not `Sync`).
pub trait ChemistrySolver: Send {
    /// Strategy name for logs and diagnostics.
    fn name(&self) -> &str;

    /// Advance the reacting state over `dt` in place and return the
    /// recommended next chemical sub-step.
    ///
    /// On error the state is left as it was passed in.
    fn solve(&mut self, state: &mut ChemicalState, dt: Time) -> SolverResult<Time>;

    /// Persist solver-managed artifacts (e.g. a tabulation table) on a
    /// host write event.
    ///
    /// Default is a no-op for strategies with nothing to persist.
    fn persist(&mut self) -> SolverResult<()> {
        Ok(())
    }
}
