//! Species thermochemical data.

use crate::error::{ChemError, ChemResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Thermochemical data for a single chemical species.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpeciesThermo {
    /// Species name as spelled by the reaction mechanism (e.g. "CH4").
    pub name: String,
    /// Molar mass [kg/kmol].
    pub molar_mass_kg_kmol: f64,
    /// Reference enthalpy at the mechanism datum [J/kg].
    #[serde(default)]
    pub h_ref_j_kg: f64,
}

/// Ordered species database for a reaction mechanism.
///
/// Species order is significant: concentration vectors throughout the
/// solver are indexed in database order, which must match the order the
/// reaction mechanism was compiled with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ThermoDatabase {
    pub species: Vec<SpeciesThermo>,
}

impl ThermoDatabase {
    /// Build a database from entries, rejecting malformed data.
    pub fn from_entries(species: Vec<SpeciesThermo>) -> ChemResult<Self> {
        let db = Self { species };
        db.validate()?;
        Ok(db)
    }

    /// Validate the database contents.
    pub fn validate(&self) -> ChemResult<()> {
        if self.species.is_empty() {
            return Err(ChemError::Database {
                what: "species list is empty".to_string(),
            });
        }

        let mut names = HashSet::new();
        for entry in &self.species {
            if entry.name.trim().is_empty() {
                return Err(ChemError::Database {
                    what: "species with empty name".to_string(),
                });
            }
            if !names.insert(entry.name.as_str()) {
                return Err(ChemError::Database {
                    what: format!("duplicate species {}", entry.name),
                });
            }
            if !entry.molar_mass_kg_kmol.is_finite() || entry.molar_mass_kg_kmol <= 0.0 {
                return Err(ChemError::Database {
                    what: format!("non-positive molar mass for {}", entry.name),
                });
            }
            if !entry.h_ref_j_kg.is_finite() {
                return Err(ChemError::Database {
                    what: format!("non-finite reference enthalpy for {}", entry.name),
                });
            }
        }

        Ok(())
    }

    /// Number of species in the mechanism.
    pub fn n_species(&self) -> usize {
        self.species.len()
    }

    /// Position of a species by name, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.species.iter().position(|s| s.name == name)
    }

    /// Species names in database order.
    pub fn names(&self) -> Vec<&str> {
        self.species.iter().map(|s| s.name.as_str()).collect()
    }

    /// Molar masses [kg/kmol] in database order.
    pub fn molar_masses(&self) -> Vec<f64> {
        self.species.iter().map(|s| s.molar_mass_kg_kmol).collect()
    }

    /// Reference enthalpies [J/kg] in database order.
    pub fn ref_enthalpies(&self) -> Vec<f64> {
        self.species.iter().map(|s| s.h_ref_j_kg).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn methane_air() -> Vec<SpeciesThermo> {
        vec![
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
                name: "N2".to_string(),
                molar_mass_kg_kmol: 28.014,
                h_ref_j_kg: 0.0,
            },
        ]
    }

    #[test]
    fn build_valid_database() {
        let db = ThermoDatabase::from_entries(methane_air()).unwrap();
        assert_eq!(db.n_species(), 3);
        assert_eq!(db.index_of("O2"), Some(1));
        assert_eq!(db.index_of("AR"), None);
    }

    #[test]
    fn molar_masses_preserve_order() {
        let db = ThermoDatabase::from_entries(methane_air()).unwrap();
        let w = db.molar_masses();
        assert_eq!(w, vec![16.043, 31.999, 28.014]);
    }

    #[test]
    fn reject_empty_database() {
        let result = ThermoDatabase::from_entries(vec![]);
        assert!(result.is_err());
    }

    #[test]
    fn reject_duplicate_species() {
        let mut entries = methane_air();
        entries.push(SpeciesThermo {
            name: "CH4".to_string(),
            molar_mass_kg_kmol: 16.043,
            h_ref_j_kg: 0.0,
        });
        let result = ThermoDatabase::from_entries(entries);
        assert!(matches!(result, Err(ChemError::Database { .. })));
    }

    #[test]
    fn reject_non_positive_molar_mass() {
        let mut entries = methane_air();
        entries[0].molar_mass_kg_kmol = 0.0;
        assert!(ThermoDatabase::from_entries(entries).is_err());
    }

    #[test]
    fn reject_non_finite_reference_enthalpy() {
        let mut entries = methane_air();
        entries[2].h_ref_j_kg = f64::NAN;
        assert!(ThermoDatabase::from_entries(entries).is_err());
    }
}
