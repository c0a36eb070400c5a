//! Chemistry solver configuration.

use serde::{Deserialize, Serialize};

use crate::error::{SolverError, SolverResult};
use kf_tab::EngineParams;

/// Host unit system declaration.
///
/// The ISAT adapter hard-codes SI→CGS conversion and refuses any other
/// declared unit system at construction. The engine itself cannot
/// detect a mismatch, so it must be caught here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    /// SI base units (kg, m, s, K, Pa).
    #[default]
    Si,
    /// CGS base units (g, cm, s, K, dyn/cm²).
    Cgs,
}

/// Options for the ISAT chemistry solver.
///
/// YAML field spellings follow the host's coefficient dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IsatCoeffs {
    /// Save the generated table on persist events.
    #[serde(rename = "saveISATtree")]
    pub save_isat_tree: bool,
    /// Use an external rate-law routine instead of the built-in one.
    #[serde(rename = "externalCKWYP")]
    pub external_ckwyp: bool,
    /// Declare pressure constant across all queries.
    #[serde(rename = "constantPressure")]
    pub constant_pressure: bool,
    /// Absolute error tolerance for table retrieves.
    #[serde(rename = "ISATABabsErr")]
    pub isatab_abs_err: f64,
    /// Relative error tolerance for table retrieves.
    #[serde(rename = "ISATABrelErr")]
    pub isatab_rel_err: f64,
    /// Absolute error tolerance for the direct integrator.
    #[serde(rename = "DDASACabsErr")]
    pub ddasac_abs_err: f64,
    /// Relative error tolerance for the direct integrator.
    #[serde(rename = "DDASACrelErr")]
    pub ddasac_rel_err: f64,
    /// Table storage budget [MB].
    #[serde(rename = "ISATABsizeMB")]
    pub isatab_size_mb: f64,
}

impl Default for IsatCoeffs {
    fn default() -> Self {
        Self {
            save_isat_tree: false,
            external_ckwyp: false,
            constant_pressure: false,
            isatab_abs_err: 1e-5,
            isatab_rel_err: 0.0,
            ddasac_abs_err: 1e-8,
            ddasac_rel_err: 1e-9,
            isatab_size_mb: 500.0,
        }
    }
}

impl IsatCoeffs {
    /// Validate tolerances and sizing.
    pub fn validate(&self) -> SolverResult<()> {
        if !self.isatab_size_mb.is_finite() || self.isatab_size_mb <= 0.0 {
            return Err(SolverError::Config {
                what: format!("ISATABsizeMB must be positive, got {}", self.isatab_size_mb),
            });
        }

        for (name, v) in [
            ("ISATABabsErr", self.isatab_abs_err),
            ("ISATABrelErr", self.isatab_rel_err),
            ("DDASACrelErr", self.ddasac_rel_err),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(SolverError::Config {
                    what: format!("{name} must be non-negative, got {v}"),
                });
            }
        }

        if self.isatab_abs_err == 0.0 && self.isatab_rel_err == 0.0 {
            return Err(SolverError::Config {
                what: "at least one of ISATABabsErr/ISATABrelErr must be positive".to_string(),
            });
        }

        if !self.ddasac_abs_err.is_finite() || self.ddasac_abs_err <= 0.0 {
            return Err(SolverError::Config {
                what: format!("DDASACabsErr must be positive, got {}", self.ddasac_abs_err),
            });
        }

        Ok(())
    }

    /// Engine parameters derived from these options.
    pub fn engine_params(&self) -> EngineParams {
        EngineParams {
            tab_abs_err: self.isatab_abs_err,
            tab_rel_err: self.isatab_rel_err,
            ode_abs_err: self.ddasac_abs_err,
            ode_rel_err: self.ddasac_rel_err,
            table_size_mb: self.isatab_size_mb,
            constant_pressure: self.constant_pressure,
            external_rates: self.external_ckwyp,
        }
    }
}

/// Top-level chemistry configuration for one worker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChemistryConfig {
    /// Strategy name looked up in the solver registry.
    #[serde(default = "default_solver")]
    pub solver: String,
    /// Host unit system; the ISAT solver requires `si`.
    #[serde(default)]
    pub units: UnitSystem,
    /// Worker index for logs and diagnostics.
    #[serde(default)]
    pub worker: usize,
    /// ISAT options.
    #[serde(default, rename = "ISATCoeffs")]
    pub isat: IsatCoeffs,
}

fn default_solver() -> String {
    "ISAT".to_string()
}

impl Default for ChemistryConfig {
    fn default() -> Self {
        Self {
            solver: default_solver(),
            units: UnitSystem::default(),
            worker: 0,
            isat: IsatCoeffs::default(),
        }
    }
}

/// Load and validate a chemistry configuration from a YAML file.
pub fn load_yaml(path: &std::path::Path) -> SolverResult<ChemistryConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| SolverError::Config {
        what: format!("{}: {e}", path.display()),
    })?;
    let config: ChemistryConfig = serde_yaml::from_str(&content).map_err(|e| SolverError::Config {
        what: format!("{}: {e}", path.display()),
    })?;
    config.isat.validate()?;
    Ok(config)
}

/// Save a chemistry configuration to a YAML file.
pub fn save_yaml(path: &std::path::Path, config: &ChemistryConfig) -> SolverResult<()> {
    config.isat.validate()?;
    let content = serde_yaml::to_string(config).map_err(|e| SolverError::Config {
        what: format!("{}: {e}", path.display()),
    })?;
    std::fs::write(path, content).map_err(|e| SolverError::Config {
        what: format!("{}: {e}", path.display()),
    })?;
    Ok(())
}
