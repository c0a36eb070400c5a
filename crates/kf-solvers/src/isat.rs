//! ISAT chemistry acceleration adapter.
//!
//! [`IsatSolver`] bridges the host's [`ChemistrySolver`] abstraction
//! onto an external tabulation engine: it converts the state to CGS,
//! forms the auxiliary density/pressure/enthalpy-datum block, issues
//! exactly one engine query per call, and converts the mapped state
//! back to SI. All tabulation logic lives behind the engine seam.

use kf_chem::{ChemicalState, ThermoDatabase};
use kf_core::timing;
use kf_core::units::{Time, cgs, k, pa, s};
use kf_tab::{QueryAux, TabError, TabulationEngine};
use tracing::{debug, warn};

use crate::config::{ChemistryConfig, IsatCoeffs, UnitSystem};
use crate::error::{SolverError, SolverResult};
use crate::solver::{ChemistrySolver, SolveStats};

/// Chemistry solver that delegates kinetics to a tabulation engine.
pub struct IsatSolver {
    coeffs: IsatCoeffs,
    molar_masses: Vec<f64>,
    ref_enthalpies: Vec<f64>,
    ncv: usize,
    worker: usize,
    engine: Box<dyn TabulationEngine>,
    engine_ready: bool,
    stats: SolveStats,
    // Reusable controlled-variable buffer in engine (CGS) units.
    x: Vec<f64>,
}

impl IsatSolver {
    /// Build the adapter for one worker.
    ///
    /// Fails when the declared unit system is not SI, when the
    /// coefficient block is invalid, or when the species database is
    /// malformed.
    pub fn new(
        config: &ChemistryConfig,
        thermo: &ThermoDatabase,
        engine: Box<dyn TabulationEngine>,
    ) -> SolverResult<Self> {
        if config.units != UnitSystem::Si {
            return Err(SolverError::Config {
                what: "ISAT conversion layer requires SI host units".to_string(),
            });
        }
        config.isat.validate()?;
        thermo.validate()?;

        let molar_masses = thermo.molar_masses();
        let ref_enthalpies = thermo.ref_enthalpies();
        let ncv = thermo.n_species() + 1;

        Ok(Self {
            coeffs: config.isat,
            molar_masses,
            ref_enthalpies,
            ncv,
            worker: config.worker,
            engine,
            engine_ready: false,
            stats: SolveStats::default(),
            x: vec![0.0; ncv],
        })
    }

    /// Controlled-variable count handed to the engine (species count
    /// plus temperature).
    pub fn ncv(&self) -> usize {
        self.ncv
    }

    /// Number of species the adapter was built for.
    pub fn n_species(&self) -> usize {
        self.ncv - 1
    }

    /// Activity counters.
    pub fn stats(&self) -> SolveStats {
        self.stats
    }

    /// Initialize the engine on first use.
    fn ensure_engine(&mut self) -> SolverResult<()> {
        if self.engine_ready {
            return Ok(());
        }
        let params = self.coeffs.engine_params();
        self.engine.initialize(self.ncv, &params)?;
        self.engine_ready = true;
        debug!(
            engine = self.engine.name(),
            ncv = self.ncv,
            worker = self.worker,
            "tabulation engine initialized"
        );
        Ok(())
    }
}

impl ChemistrySolver for IsatSolver {
    fn name(&self) -> &str {
        "ISAT"
    }

    fn solve(&mut self, state: &mut ChemicalState, dt: Time) -> SolverResult<Time> {
        let dt_s = dt.value;
        if !dt_s.is_finite() || dt_s <= 0.0 {
            return Err(SolverError::InvalidState {
                what: "requested interval must be positive and finite",
            });
        }
        if state.n_species() != self.n_species() {
            return Err(SolverError::DimensionMismatch {
                expected: self.n_species(),
                actual: state.n_species(),
            });
        }
        state.validate()?;
        self.ensure_engine()?;

        // Marshal in engine order: concentrations then temperature.
        for (slot, &c) in self.x.iter_mut().zip(&state.concentrations) {
            *slot = cgs::conc_to_cgs(c);
        }
        self.x[self.ncv - 1] = state.temperature.value;

        let rho = state.density_kg_m3(&self.molar_masses)?;
        let h_datum = state.ref_enthalpy_j_kg(&self.molar_masses, &self.ref_enthalpies)?;
        let mut aux = QueryAux {
            density_g_cm3: cgs::density_to_cgs(rho),
            pressure_dyn_cm2: cgs::pressure_to_cgs(state.pressure.value),
            h_datum_erg_g: cgs::enthalpy_to_cgs(h_datum),
        };

        self.stats.queries += 1;
        let start = std::time::Instant::now();
        let reply = self.engine.query(dt_s, &mut self.x, &mut aux);
        let elapsed = start.elapsed().as_secs_f64();
        self.stats.engine_time_s += elapsed;
        if timing::is_enabled() {
            timing::tab_timing::ENGINE_QUERIES.record(elapsed);
        }
        let reply = match reply {
            Ok(r) => r,
            Err(e) => {
                self.stats.failures += 1;
                warn!(worker = self.worker, error = %e, "engine query failed");
                return Err(map_query_error(e));
            }
        };

        // Validate the mapped state before touching the host state, so
        // a retryable failure leaves the inputs intact. Concentrations
        // may undershoot zero by no more than the retrieve tolerance.
        let n_conc = self.ncv - 1;
        let floor = -self.coeffs.isatab_abs_err;
        for &slot in &self.x[..n_conc] {
            if !slot.is_finite() || slot < floor {
                self.stats.failures += 1;
                return Err(SolverError::Integration {
                    message: format!("mapped concentration {slot} mol/cm³ is non-physical"),
                });
            }
        }
        let t_new = self.x[n_conc];
        if !t_new.is_finite() || t_new <= 0.0 {
            self.stats.failures += 1;
            return Err(SolverError::Integration {
                message: format!("mapped temperature {t_new} K is non-physical"),
            });
        }
        let p_new = cgs::pressure_from_cgs(aux.pressure_dyn_cm2);
        if !p_new.is_finite() || p_new <= 0.0 {
            self.stats.failures += 1;
            return Err(SolverError::Integration {
                message: format!("mapped pressure {p_new} Pa is non-physical"),
            });
        }
        let sub_dt = reply.recommended_dt_s;
        if !sub_dt.is_finite() || sub_dt <= 0.0 {
            self.stats.failures += 1;
            return Err(SolverError::Integration {
                message: format!("recommended sub-step {sub_dt} s is unusable"),
            });
        }

        for (c, &slot) in state.concentrations.iter_mut().zip(&self.x[..n_conc]) {
            *c = cgs::conc_from_cgs(slot.max(0.0));
        }
        state.temperature = k(t_new);
        state.pressure = pa(p_new);

        Ok(s(sub_dt))
    }

    fn persist(&mut self) -> SolverResult<()> {
        if !self.coeffs.save_isat_tree {
            return Ok(());
        }
        if !self.engine_ready {
            // Nothing queried yet, so there is no table to write.
            return Ok(());
        }

        let start = std::time::Instant::now();
        let result = self.engine.save();
        let elapsed = start.elapsed().as_secs_f64();
        self.stats.engine_time_s += elapsed;
        if timing::is_enabled() {
            timing::tab_timing::ENGINE_SAVES.record(elapsed);
        }

        match result {
            Ok(()) => {
                self.stats.persists += 1;
                debug!(worker = self.worker, "tabulation table saved");
                Ok(())
            }
            Err(e) => {
                warn!(worker = self.worker, error = %e, "table save failed");
                Err(SolverError::Persistence {
                    message: e.to_string(),
                })
            }
        }
    }
}

fn map_query_error(e: TabError) -> SolverError {
    match e {
        TabError::Nonconvergent { what } => SolverError::Integration {
            message: format!("engine reported non-convergence: {what}"),
        },
        TabError::NonFinite { what } => SolverError::Integration {
            message: format!("engine produced non-finite {what}"),
        },
        TabError::DimensionMismatch { expected, actual } => {
            SolverError::DimensionMismatch { expected, actual }
        }
        other => SolverError::Tab(other),
    }
}
