//! End-to-end tests for the ISAT chemistry adapter, driven through
//! scripted tabulation engines with known behavior.

use std::sync::{Arc, Mutex};

use kf_chem::{ChemicalState, SpeciesThermo, ThermoDatabase};
use kf_core::numeric::{Tolerances, nearly_equal};
use kf_core::units::{k, pa, s};
use kf_solvers::{ChemistryConfig, ChemistrySolver, IsatSolver, SolverError, UnitSystem};
use kf_tab::{
    EngineParams, QueryAux, QueryReply, ScriptedEngine, TabResult, TableDecision,
    TabulationEngine,
};

fn methane_air() -> ThermoDatabase {
    ThermoDatabase::from_entries(vec![
        SpeciesThermo {
            name: "CH4".to_string(),
            molar_mass_kg_kmol: 16.043,
            h_ref_j_kg: -4.675e6,
        },
        SpeciesThermo {
            name: "O2".to_string(),
            molar_mass_kg_kmol: 31.999,
            h_ref_j_kg: 0.0,
        },
        SpeciesThermo {
            name: "CO2".to_string(),
            molar_mass_kg_kmol: 44.010,
            h_ref_j_kg: -8.942e6,
        },
        SpeciesThermo {
            name: "H2O".to_string(),
            molar_mass_kg_kmol: 18.015,
            h_ref_j_kg: -1.342e7,
        },
        SpeciesThermo {
            name: "N2".to_string(),
            molar_mass_kg_kmol: 28.014,
            h_ref_j_kg: 0.0,
        },
    ])
    .unwrap()
}

/// Lean premixed charge: fresh CH4/O2/N2, no products yet.
fn reacting_state() -> ChemicalState {
    ChemicalState::new(
        vec![0.004, 0.008, 0.0, 0.0, 0.03],
        k(1500.0),
        pa(101_325.0),
    )
    .unwrap()
}

fn identity_engine() -> ScriptedEngine {
    ScriptedEngine::new(0.0, 0.0)
}

fn adapter(engine: ScriptedEngine) -> IsatSolver {
    IsatSolver::new(&ChemistryConfig::default(), &methane_air(), Box::new(engine)).unwrap()
}

#[test]
fn controlled_variable_count_is_species_plus_one() {
    let solver = adapter(identity_engine());
    assert_eq!(solver.n_species(), 5);
    assert_eq!(solver.ncv(), 6);

    let single = ThermoDatabase::from_entries(vec![SpeciesThermo {
        name: "N2".to_string(),
        molar_mass_kg_kmol: 28.014,
        h_ref_j_kg: 0.0,
    }])
    .unwrap();
    let solver = IsatSolver::new(
        &ChemistryConfig::default(),
        &single,
        Box::new(identity_engine()),
    )
    .unwrap();
    assert_eq!(solver.ncv(), 2);
}

#[test]
fn identity_engine_round_trips_the_state() {
    let mut solver = adapter(identity_engine());
    let mut state = reacting_state();
    let before = state.clone();

    let sub_dt = solver.solve(&mut state, s(1e-6)).unwrap();

    let tol = Tolerances {
        abs: 0.0,
        rel: 1e-12,
    };
    for (after, orig) in state.concentrations.iter().zip(&before.concentrations) {
        assert!(
            nearly_equal(*after, *orig, tol),
            "concentration drifted through unit conversion: {after} vs {orig}"
        );
    }
    assert_eq!(state.temperature.value, 1500.0);
    assert!(nearly_equal(state.pressure.value, 101_325.0, tol));
    assert_eq!(sub_dt.value, 5e-7);
}

#[test]
fn engine_is_initialized_once_on_first_use() {
    let engine = identity_engine();
    let log = engine.log_handle();
    let mut solver = adapter(engine);

    assert_eq!(log.lock().unwrap().init_count, 0);

    let mut state = reacting_state();
    solver.solve(&mut state, s(1e-6)).unwrap();
    let mut state = reacting_state();
    solver.solve(&mut state, s(1e-6)).unwrap();

    assert_eq!(log.lock().unwrap().init_count, 1);
    assert_eq!(log.lock().unwrap().queries, 2);
}

#[test]
fn non_physical_inputs_are_rejected_before_any_query() {
    let engine = identity_engine();
    let log = engine.log_handle();
    let mut solver = adapter(engine);

    let mut negative = reacting_state();
    negative.concentrations[1] = -0.001;
    assert!(solver.solve(&mut negative, s(1e-6)).is_err());

    let mut cold = reacting_state();
    cold.temperature = k(0.0);
    assert!(solver.solve(&mut cold, s(1e-6)).is_err());

    let mut vacuum = reacting_state();
    vacuum.pressure = pa(-5.0);
    assert!(solver.solve(&mut vacuum, s(1e-6)).is_err());

    let mut state = reacting_state();
    assert!(matches!(
        solver.solve(&mut state, s(0.0)),
        Err(SolverError::InvalidState { .. })
    ));

    assert_eq!(log.lock().unwrap().queries, 0);
    assert_eq!(solver.stats().queries, 0);
}

#[test]
fn state_width_must_match_the_species_database() {
    let mut solver = adapter(identity_engine());
    let mut narrow = ChemicalState::new(vec![0.01, 0.02], k(1200.0), pa(101_325.0)).unwrap();

    let err = solver.solve(&mut narrow, s(1e-6)).unwrap_err();
    assert!(matches!(
        err,
        SolverError::DimensionMismatch {
            expected: 5,
            actual: 2
        }
    ));
}

#[test]
fn repeated_query_point_is_retrieved_from_the_table() {
    let engine = identity_engine();
    let log = engine.log_handle();
    let mut solver = adapter(engine);

    let mut first = reacting_state();
    solver.solve(&mut first, s(1e-6)).unwrap();
    let mut second = reacting_state();
    solver.solve(&mut second, s(1e-6)).unwrap();

    assert_eq!(
        log.lock().unwrap().decisions,
        vec![TableDecision::Added, TableDecision::Retrieved]
    );
}

#[test]
fn invalid_configuration_is_fatal_at_construction() {
    let mut config = ChemistryConfig::default();
    config.isat.isatab_size_mb = 0.0;
    let result = IsatSolver::new(&config, &methane_air(), Box::new(identity_engine()));
    assert!(matches!(result, Err(SolverError::Config { .. })));

    let mut config = ChemistryConfig::default();
    config.units = UnitSystem::Cgs;
    let result = IsatSolver::new(&config, &methane_air(), Box::new(identity_engine()));
    assert!(matches!(result, Err(SolverError::Config { .. })));
}

#[test]
fn combustion_step_produces_physical_state_and_bounded_sub_step() {
    // Fast first-order consumption with a 5e5 K/s heat release rate,
    // stepped over one microsecond.
    let engine = ScriptedEngine::new(1.0e4, 5.0e5);
    let mut config = ChemistryConfig::default();
    config.isat.isatab_abs_err = 1e-5;
    let mut solver = IsatSolver::new(&config, &methane_air(), Box::new(engine)).unwrap();

    let mut state = reacting_state();
    let dt = s(1e-6);
    let sub_dt = solver.solve(&mut state, dt).unwrap();

    for c in &state.concentrations {
        assert!(c.is_finite() && *c >= 0.0);
    }
    let tol = Tolerances {
        abs: 0.0,
        rel: 1e-12,
    };
    let expected_ch4 = 0.004 * (-1.0e4_f64 * 1e-6).exp();
    assert!(nearly_equal(state.concentrations[0], expected_ch4, tol));
    assert!((state.temperature.value - 1500.5).abs() < 1e-9);
    assert!(sub_dt.value > 0.0 && sub_dt.value <= dt.value);
    assert_eq!(solver.stats().queries, 1);
    assert_eq!(solver.stats().failures, 0);
    assert!(solver.stats().engine_time_s.is_finite());
    assert!(solver.stats().engine_time_s >= 0.0);
}

#[test]
fn non_convergent_query_is_retryable_and_leaves_the_state_intact() {
    let mut engine = identity_engine();
    engine.fail_next_queries = 1;
    let mut solver = adapter(engine);

    let mut state = reacting_state();
    let before = state.clone();

    let err = solver.solve(&mut state, s(1e-6)).unwrap_err();
    assert!(err.retryable());
    assert!(matches!(err, SolverError::Integration { .. }));
    assert_eq!(state, before);
    assert_eq!(solver.stats().queries, 1);
    assert_eq!(solver.stats().failures, 1);

    solver.solve(&mut state, s(1e-6)).unwrap();
    assert_eq!(solver.stats().queries, 2);
    assert_eq!(solver.stats().failures, 1);
}

#[test]
fn persist_without_save_flag_is_a_no_op() {
    let engine = identity_engine();
    let log = engine.log_handle();
    let mut solver = adapter(engine);

    let mut state = reacting_state();
    solver.solve(&mut state, s(1e-6)).unwrap();
    solver.persist().unwrap();

    assert_eq!(log.lock().unwrap().saves, 0);
    assert_eq!(solver.stats().persists, 0);
}

#[test]
fn persist_saves_once_the_engine_has_been_used() {
    let engine = identity_engine();
    let log = engine.log_handle();
    let mut config = ChemistryConfig::default();
    config.isat.save_isat_tree = true;
    let mut solver = IsatSolver::new(&config, &methane_air(), Box::new(engine)).unwrap();

    // Before any query there is no table to write.
    solver.persist().unwrap();
    assert_eq!(log.lock().unwrap().saves, 0);

    let mut state = reacting_state();
    solver.solve(&mut state, s(1e-6)).unwrap();
    solver.persist().unwrap();

    assert_eq!(log.lock().unwrap().saves, 1);
    assert_eq!(solver.stats().persists, 1);
}

#[test]
fn failed_table_save_is_reported_and_the_solver_stays_usable() {
    let mut engine = identity_engine();
    engine.fail_saves = true;
    let mut config = ChemistryConfig::default();
    config.isat.save_isat_tree = true;
    let mut solver = IsatSolver::new(&config, &methane_air(), Box::new(engine)).unwrap();

    let mut state = reacting_state();
    solver.solve(&mut state, s(1e-6)).unwrap();

    let err = solver.persist().unwrap_err();
    assert!(matches!(err, SolverError::Persistence { .. }));
    assert!(!err.retryable());
    assert_eq!(solver.stats().persists, 0);

    solver.solve(&mut state, s(1e-6)).unwrap();
}

/// Engine that shifts every concentration slot by a fixed amount, for
/// exercising the adapter's handling of retrieval undershoot.
struct OffsetEngine {
    offset: f64,
    ncv: usize,
}

impl OffsetEngine {
    fn new(offset: f64) -> Self {
        Self { offset, ncv: 0 }
    }
}

impl TabulationEngine for OffsetEngine {
    fn name(&self) -> &str {
        "offset"
    }

    fn initialize(&mut self, ncv: usize, _params: &EngineParams) -> TabResult<()> {
        self.ncv = ncv;
        Ok(())
    }

    fn query(&mut self, dt_s: f64, x: &mut [f64], _aux: &mut QueryAux) -> TabResult<QueryReply> {
        for c in &mut x[..self.ncv - 1] {
            *c += self.offset;
        }
        Ok(QueryReply {
            recommended_dt_s: dt_s,
        })
    }

    fn save(&mut self) -> TabResult<()> {
        Ok(())
    }
}

#[test]
fn sub_tolerance_undershoot_is_clamped_to_zero() {
    // A 5e-6 mol/cm³ undershoot stays within the 1e-5 retrieve
    // tolerance, so slots driven negative come back as exactly zero.
    let mut solver = IsatSolver::new(
        &ChemistryConfig::default(),
        &methane_air(),
        Box::new(OffsetEngine::new(-5.0e-6)),
    )
    .unwrap();

    let mut state = reacting_state();
    solver.solve(&mut state, s(1e-6)).unwrap();

    assert_eq!(state.concentrations[0], 0.0);
    assert_eq!(state.concentrations[2], 0.0);
    assert_eq!(state.concentrations[3], 0.0);
    let tol = Tolerances {
        abs: 0.0,
        rel: 1e-9,
    };
    assert!(nearly_equal(state.concentrations[1], 3.0e-3, tol));
    assert!(nearly_equal(state.concentrations[4], 2.5e-2, tol));
}

#[test]
fn excessive_negative_concentration_fails_the_solve() {
    let mut solver = IsatSolver::new(
        &ChemistryConfig::default(),
        &methane_air(),
        Box::new(OffsetEngine::new(-2.0e-5)),
    )
    .unwrap();

    let mut state = reacting_state();
    let before = state.clone();
    let err = solver.solve(&mut state, s(1e-6)).unwrap_err();

    assert!(matches!(err, SolverError::Integration { .. }));
    assert!(err.retryable());
    assert_eq!(state, before);
    assert_eq!(solver.stats().failures, 1);
}

#[derive(Debug, Default)]
struct Captured {
    dt_s: f64,
    x: Vec<f64>,
    aux: Option<QueryAux>,
}

/// Engine that records exactly what the adapter hands it.
struct CapturingEngine {
    captured: Arc<Mutex<Captured>>,
}

impl TabulationEngine for CapturingEngine {
    fn name(&self) -> &str {
        "capturing"
    }

    fn initialize(&mut self, _ncv: usize, _params: &EngineParams) -> TabResult<()> {
        Ok(())
    }

    fn query(&mut self, dt_s: f64, x: &mut [f64], aux: &mut QueryAux) -> TabResult<QueryReply> {
        let mut captured = self.captured.lock().unwrap();
        captured.dt_s = dt_s;
        captured.x = x.to_vec();
        captured.aux = Some(*aux);
        Ok(QueryReply {
            recommended_dt_s: dt_s,
        })
    }

    fn save(&mut self) -> TabResult<()> {
        Ok(())
    }
}

#[test]
fn engine_sees_cgs_quantities() {
    let captured = Arc::new(Mutex::new(Captured::default()));
    let engine = CapturingEngine {
        captured: Arc::clone(&captured),
    };
    let mut solver =
        IsatSolver::new(&ChemistryConfig::default(), &methane_air(), Box::new(engine)).unwrap();

    let mut state = reacting_state();
    solver.solve(&mut state, s(1e-6)).unwrap();

    let captured = captured.lock().unwrap();
    let tol = Tolerances {
        abs: 0.0,
        rel: 1e-12,
    };

    assert_eq!(captured.dt_s, 1e-6);
    assert_eq!(captured.x.len(), 6);
    assert!(nearly_equal(captured.x[0], 4.0e-6, tol));
    assert!(nearly_equal(captured.x[1], 8.0e-6, tol));
    assert_eq!(captured.x[2], 0.0);
    assert!(nearly_equal(captured.x[4], 3.0e-5, tol));
    assert_eq!(captured.x[5], 1500.0);

    let aux = captured.aux.unwrap();
    let rho = 0.004 * 16.043 + 0.008 * 31.999 + 0.03 * 28.014;
    let h_datum = (0.004 * 16.043 * -4.675e6) / rho;
    assert!(nearly_equal(aux.density_g_cm3, rho * 1e-3, tol));
    assert!(nearly_equal(aux.pressure_dyn_cm2, 101_325.0 * 10.0, tol));
    assert!(nearly_equal(aux.h_datum_erg_g, h_datum * 1e4, tol));
}

#[test]
fn pressure_update_flows_back_in_variable_pressure_mode() {
    let mut engine = identity_engine();
    engine.pressure_scale = 2.0;
    let mut solver = adapter(engine);

    let mut state = reacting_state();
    solver.solve(&mut state, s(1e-6)).unwrap();

    let tol = Tolerances {
        abs: 0.0,
        rel: 1e-12,
    };
    assert!(nearly_equal(state.pressure.value, 202_650.0, tol));
}

#[test]
fn pressure_is_preserved_in_constant_pressure_mode() {
    let mut engine = identity_engine();
    engine.pressure_scale = 2.0;
    let mut config = ChemistryConfig::default();
    config.isat.constant_pressure = true;
    let mut solver = IsatSolver::new(&config, &methane_air(), Box::new(engine)).unwrap();

    let mut state = reacting_state();
    solver.solve(&mut state, s(1e-6)).unwrap();

    let tol = Tolerances {
        abs: 0.0,
        rel: 1e-12,
    };
    assert!(nearly_equal(state.pressure.value, 101_325.0, tol));
}
