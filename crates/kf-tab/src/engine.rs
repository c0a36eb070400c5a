//! Tabulation engine abstraction.
//!
//! The [`TabulationEngine`] trait is the seam between chemistry solvers
//! and tabulation backends. Everything crossing it is in CGS units; the
//! caller owns all unit conversion.

use crate::error::TabResult;

/// Tolerances and table sizing handed to an engine at initialization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineParams {
    /// Absolute error tolerance for table retrieves.
    pub tab_abs_err: f64,
    /// Relative error tolerance for table retrieves.
    pub tab_rel_err: f64,
    /// Absolute error tolerance for the direct ODE integrator.
    pub ode_abs_err: f64,
    /// Relative error tolerance for the direct ODE integrator.
    pub ode_rel_err: f64,
    /// Table storage budget [MB].
    pub table_size_mb: f64,
    /// Whether pressure is constant across all queries.
    pub constant_pressure: bool,
    /// Whether reaction rates come from an external routine.
    pub external_rates: bool,
}

/// Auxiliary thermodynamic inputs for one query, CGS units.
///
/// In variable-pressure mode the engine updates `pressure_dyn_cm2` in
/// place.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueryAux {
    /// Mixture mass density [g/cm³].
    pub density_g_cm3: f64,
    /// Pressure [dyn/cm²].
    pub pressure_dyn_cm2: f64,
    /// Enthalpy datum offset [erg/g].
    pub h_datum_erg_g: f64,
}

/// Per-query outputs besides the mapped composition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueryReply {
    /// Engine-recommended next sub-step [s].
    pub recommended_dt_s: f64,
}

/// A chemistry tabulation engine.
///
/// An engine owns one table. Instances are driven from a single thread
/// at a time (`Send`, not `Sync`); hosts give each worker its own
/// engine.
pub trait TabulationEngine: Send {
    /// Engine name for logs and diagnostics.
    fn name(&self) -> &str;

    /// Prepare the engine for queries of `ncv` controlled variables.
    ///
    /// Must be called exactly once before the first query.
    fn initialize(&mut self, ncv: usize, params: &EngineParams) -> TabResult<()>;

    /// Advance the composition `x` over `dt_s` seconds in place.
    ///
    /// `x` holds `ncv` controlled variables: species concentrations
    /// [mol/cm³] followed by temperature [K]. Callers pass a positive,
    /// finite `dt_s`.
    fn query(&mut self, dt_s: f64, x: &mut [f64], aux: &mut QueryAux) -> TabResult<QueryReply>;

    /// Write the accumulated table to engine-managed storage.
    fn save(&mut self) -> TabResult<()>;
}
