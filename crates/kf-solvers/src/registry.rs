//! Name-keyed registry of chemistry solver strategies.
//!
//! Strategies are registered explicitly at startup and looked up by the
//! `solver` entry of the chemistry configuration. There is no global
//! state; each worker owns its registry.

use std::collections::HashMap;

use kf_chem::ThermoDatabase;
use kf_tab::{IsatCk7Engine, TabulationEngine};

use crate::config::ChemistryConfig;
use crate::error::{SolverError, SolverResult};
use crate::isat::IsatSolver;
use crate::none::NoChemistry;
use crate::solver::ChemistrySolver;

/// Everything a strategy constructor may draw on.
pub struct SolverContext<'a> {
    /// Chemistry configuration for this worker.
    pub config: &'a ChemistryConfig,
    /// Species database in mechanism order.
    pub thermo: &'a ThermoDatabase,
    /// Tabulation engine override. When `None`, strategies that need an
    /// engine load the shared library named by the environment.
    pub engine: Option<Box<dyn TabulationEngine>>,
}

impl<'a> SolverContext<'a> {
    pub fn new(config: &'a ChemistryConfig, thermo: &'a ThermoDatabase) -> Self {
        Self {
            config,
            thermo,
            engine: None,
        }
    }

    /// Supply a pre-built engine instead of loading one from the
    /// environment.
    pub fn with_engine(mut self, engine: Box<dyn TabulationEngine>) -> Self {
        self.engine = Some(engine);
        self
    }
}

/// Constructor for one strategy.
pub type SolverBuilder = fn(&mut SolverContext) -> SolverResult<Box<dyn ChemistrySolver>>;

/// Maps strategy names to constructors.
pub struct SolverRegistry {
    builders: HashMap<String, SolverBuilder>,
}

impl SolverRegistry {
    /// Empty registry with no strategies.
    pub fn new() -> Self {
        Self {
            builders: HashMap::new(),
        }
    }

    /// Registry holding the built-in strategies `ISAT` and `none`.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("ISAT", build_isat);
        registry.register("none", build_none);
        registry
    }

    /// Register a strategy, replacing any previous one of the same name.
    pub fn register(&mut self, name: &str, builder: SolverBuilder) {
        self.builders.insert(name.to_string(), builder);
    }

    /// Registered strategy names, sorted for stable listings.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.builders.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Construct the strategy named by `ctx.config.solver`.
    pub fn create(&self, ctx: &mut SolverContext) -> SolverResult<Box<dyn ChemistrySolver>> {
        let name = ctx.config.solver.as_str();
        let builder = self
            .builders
            .get(name)
            .ok_or_else(|| SolverError::UnknownSolver {
                name: name.to_string(),
            })?;
        builder(ctx)
    }
}

impl Default for SolverRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

fn build_isat(ctx: &mut SolverContext) -> SolverResult<Box<dyn ChemistrySolver>> {
    let engine: Box<dyn TabulationEngine> = match ctx.engine.take() {
        Some(engine) => engine,
        None => Box::new(IsatCk7Engine::from_env()?),
    };
    let solver = IsatSolver::new(ctx.config, ctx.thermo, engine)?;
    Ok(Box::new(solver))
}

fn build_none(_ctx: &mut SolverContext) -> SolverResult<Box<dyn ChemistrySolver>> {
    Ok(Box::new(NoChemistry::new()))
}
