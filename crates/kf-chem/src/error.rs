//! Thermochemical data errors.

use kf_core::KfError;
use thiserror::Error;

/// Result type for chemistry data operations.
pub type ChemResult<T> = Result<T, ChemError>;

/// Errors that can occur while handling thermochemical data.
#[derive(Error, Debug)]
pub enum ChemError {
    /// Non-physical values (negative concentration, temperature, etc.).
    #[error("Non-physical value for {what}")]
    NonPhysical { what: &'static str },

    /// Invalid argument.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// Malformed species database.
    #[error("Species database error: {what}")]
    Database { what: String },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl From<ChemError> for KfError {
    fn from(e: ChemError) -> Self {
        match e {
            ChemError::NonPhysical { what } => KfError::Invariant { what },
            ChemError::InvalidArg { what } => KfError::InvalidArg { what },
            ChemError::Database { what: _ } => KfError::InvalidArg {
                what: "species database",
            },
            ChemError::Io(_) => KfError::Invariant {
                what: "chemistry I/O",
            },
            ChemError::Yaml(_) => KfError::InvalidArg {
                what: "chemistry YAML",
            },
        }
    }
}
