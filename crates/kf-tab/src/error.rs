//! Tabulation engine errors.

use kf_core::KfError;
use thiserror::Error;

/// Result type for tabulation engine operations.
pub type TabResult<T> = Result<T, TabError>;

/// Errors that can occur inside a tabulation engine.
#[derive(Error, Debug)]
pub enum TabError {
    /// The engine shared library could not be found or loaded.
    #[error("Engine library load failed: {message}")]
    LibraryLoad { message: String },

    /// A required symbol was not found in the engine library.
    #[error("Symbol not found in engine library: {symbol}")]
    SymbolNotFound { symbol: String },

    /// The engine was used before `initialize`.
    #[error("Engine not initialized")]
    NotInitialized,

    /// `initialize` was called a second time.
    #[error("Engine already initialized")]
    AlreadyInitialized,

    /// Composition width does not match the initialized width.
    #[error("Dimension mismatch: expected {expected} controlled variables, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// The engine rejected the supplied parameters.
    #[error("Engine rejected parameters: {what}")]
    ParamsRejected { what: &'static str },

    /// The reaction mapping did not converge over the requested interval.
    #[error("Reaction mapping did not converge: {what}")]
    Nonconvergent { what: String },

    /// The engine produced a non-finite value.
    #[error("Engine produced non-finite {what}")]
    NonFinite { what: &'static str },

    /// The table could not be written out.
    #[error("Table save failed: {message}")]
    SaveFailed { message: String },
}

impl From<TabError> for KfError {
    fn from(e: TabError) -> Self {
        match e {
            TabError::LibraryLoad { message: _ } => KfError::InvalidArg {
                what: "engine library",
            },
            TabError::SymbolNotFound { symbol: _ } => KfError::InvalidArg {
                what: "engine symbol",
            },
            TabError::NotInitialized => KfError::Invariant {
                what: "engine not initialized",
            },
            TabError::AlreadyInitialized => KfError::Invariant {
                what: "engine already initialized",
            },
            TabError::DimensionMismatch { expected, actual } => KfError::LengthMismatch {
                what: "controlled variables",
                expected,
                actual,
            },
            TabError::ParamsRejected { what } => KfError::InvalidArg { what },
            TabError::Nonconvergent { what: _ } => KfError::Invariant {
                what: "reaction mapping",
            },
            TabError::NonFinite { what } => KfError::NonFinite {
                what,
                value: f64::NAN,
            },
            TabError::SaveFailed { message: _ } => KfError::Invariant {
                what: "table persistence",
            },
        }
    }
}
