//! Chemistry disabled: a solver that leaves the state frozen.

use kf_chem::ChemicalState;
use kf_core::units::Time;

use crate::error::{SolverError, SolverResult};
use crate::solver::ChemistrySolver;

/// No-op strategy for runs with chemistry switched off.
///
/// The state passes through unchanged and the requested interval comes
/// back as the recommendation, since nothing constrains the next
/// sub-step.
#[derive(Debug, Default)]
pub struct NoChemistry;

impl NoChemistry {
    pub fn new() -> Self {
        Self
    }
}

impl ChemistrySolver for NoChemistry {
    fn name(&self) -> &str {
        "none"
    }

    fn solve(&mut self, state: &mut ChemicalState, dt: Time) -> SolverResult<Time> {
        let dt_s = dt.value;
        if !dt_s.is_finite() || dt_s <= 0.0 {
            return Err(SolverError::InvalidState {
                what: "requested interval must be positive and finite",
            });
        }
        state.validate()?;
        Ok(dt)
    }
}
