//! kf-solvers: chemistry solver strategies for the flow host.
//!
//! The central strategy is [`IsatSolver`], which maps SI host states
//! onto an external in-situ adaptive tabulation engine and back.
//! [`NoChemistry`] leaves the state frozen for runs with chemistry
//! switched off. Strategies are constructed by name through
//! [`SolverRegistry`].

pub mod config;
pub mod error;
pub mod isat;
pub mod none;
pub mod registry;
pub mod solver;

pub use config::{ChemistryConfig, IsatCoeffs, UnitSystem};
pub use error::{SolverError, SolverResult};
pub use isat::IsatSolver;
pub use none::NoChemistry;
pub use registry::{SolverBuilder, SolverContext, SolverRegistry};
pub use solver::{ChemistrySolver, SolveStats};
