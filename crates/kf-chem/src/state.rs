//! Reacting mixture state.

use crate::error::{ChemError, ChemResult};
use kf_core::units::{Pressure, Temperature};

/// Molar concentration [kmol/m³].
///
/// Not part of uom's standard set, so we use f64 with clear documentation.
pub type Concentration = f64;

/// State of a reacting mixture at a point: species concentrations,
/// temperature, and pressure.
///
/// Fields are public because chemistry solvers advance the state in place.
/// Concentrations are indexed in species database order.
#[derive(Debug, Clone, PartialEq)]
pub struct ChemicalState {
    /// Species concentrations [kmol/m³], database order.
    pub concentrations: Vec<Concentration>,
    /// Mixture temperature.
    pub temperature: Temperature,
    /// Mixture pressure.
    pub pressure: Pressure,
}

impl ChemicalState {
    /// Create a state, validating that it is physically meaningful.
    pub fn new(
        concentrations: Vec<Concentration>,
        temperature: Temperature,
        pressure: Pressure,
    ) -> ChemResult<Self> {
        let state = Self {
            concentrations,
            temperature,
            pressure,
        };
        state.validate()?;
        Ok(state)
    }

    /// Validate concentrations, temperature, and pressure.
    pub fn validate(&self) -> ChemResult<()> {
        for &c in &self.concentrations {
            if !c.is_finite() || c < 0.0 {
                return Err(ChemError::NonPhysical {
                    what: "concentration must be non-negative and finite",
                });
            }
        }

        let t = self.temperature.value;
        if !t.is_finite() || t <= 0.0 {
            return Err(ChemError::NonPhysical {
                what: "temperature must be positive and finite",
            });
        }

        let p = self.pressure.value;
        if !p.is_finite() || p <= 0.0 {
            return Err(ChemError::NonPhysical {
                what: "pressure must be positive and finite",
            });
        }

        Ok(())
    }

    /// Number of species carried by this state.
    pub fn n_species(&self) -> usize {
        self.concentrations.len()
    }

    /// Mixture mass density [kg/m³].
    ///
    /// `molar_masses` [kg/kmol] must be in database order.
    pub fn density_kg_m3(&self, molar_masses: &[f64]) -> ChemResult<f64> {
        if molar_masses.len() != self.concentrations.len() {
            return Err(ChemError::InvalidArg {
                what: "molar mass table length must match species count",
            });
        }
        Ok(self
            .concentrations
            .iter()
            .zip(molar_masses)
            .map(|(c, w)| c * w)
            .sum())
    }

    /// Mass-weighted mixture reference enthalpy [J/kg].
    ///
    /// Returns 0.0 for a zero-density mixture (nothing to weight).
    pub fn ref_enthalpy_j_kg(&self, molar_masses: &[f64], h_ref: &[f64]) -> ChemResult<f64> {
        if h_ref.len() != self.concentrations.len() {
            return Err(ChemError::InvalidArg {
                what: "reference enthalpy table length must match species count",
            });
        }
        let rho = self.density_kg_m3(molar_masses)?;
        if rho <= 0.0 {
            return Ok(0.0);
        }
        let h_total: f64 = self
            .concentrations
            .iter()
            .zip(molar_masses)
            .zip(h_ref)
            .map(|((c, w), h)| c * w * h)
            .sum();
        Ok(h_total / rho)
    }
}
