//! Error types for chemistry solver operations.

use kf_chem::ChemError;
use kf_core::KfError;
use kf_tab::TabError;
use thiserror::Error;

/// Errors that can occur while building or driving a chemistry solver.
#[derive(Error, Debug)]
pub enum SolverError {
    /// Configuration rejected at construction. Fatal for the worker.
    #[error("Configuration error: {what}")]
    Config { what: String },

    /// No solver registered under the requested name.
    #[error("Unknown chemistry solver: {name}")]
    UnknownSolver { name: String },

    /// Width disagreement between the adapter and what it is driving.
    /// Fatal for the worker; continuing would corrupt the table.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Caller handed the solver an unusable state or interval.
    #[error("Invalid state: {what}")]
    InvalidState { what: &'static str },

    /// The reaction mapping failed. The host may retry with a smaller
    /// outer step.
    #[error("Integration failed: {message}")]
    Integration { message: String },

    /// Table persistence failed. Non-fatal; solving can continue.
    #[error("Persistence failed: {message}")]
    Persistence { message: String },

    /// Thermochemical data error.
    #[error("Chemistry error: {0}")]
    Chem(#[from] ChemError),

    /// Tabulation engine error.
    #[error("Engine error: {0}")]
    Tab(#[from] TabError),
}

pub type SolverResult<T> = Result<T, SolverError>;

impl SolverError {
    /// Whether the failed operation is worth retrying with a smaller
    /// step.
    pub fn retryable(&self) -> bool {
        matches!(self, SolverError::Integration { .. })
    }
}

impl From<SolverError> for KfError {
    fn from(e: SolverError) -> Self {
        match e {
            SolverError::Config { what: _ } => KfError::InvalidArg {
                what: "chemistry configuration",
            },
            SolverError::UnknownSolver { name: _ } => KfError::InvalidArg {
                what: "chemistry solver name",
            },
            SolverError::DimensionMismatch { expected, actual } => KfError::LengthMismatch {
                what: "chemistry dimensions",
                expected,
                actual,
            },
            SolverError::InvalidState { what } => KfError::InvalidArg { what },
            SolverError::Integration { message: _ } => KfError::Invariant {
                what: "chemistry integration",
            },
            SolverError::Persistence { message: _ } => KfError::Invariant {
                what: "table persistence",
            },
            SolverError::Chem(e) => e.into(),
            SolverError::Tab(_) => KfError::Invariant {
                what: "tabulation engine",
            },
        }
    }
}
