//! kf-chem: species thermochemical data and reacting mixture state.

pub mod error;
pub mod species;
pub mod state;

pub use error::{ChemError, ChemResult};
pub use species::{SpeciesThermo, ThermoDatabase};
pub use state::{ChemicalState, Concentration};

/// Load and validate a species database from a YAML file.
pub fn load_yaml(path: &std::path::Path) -> ChemResult<ThermoDatabase> {
    let content = std::fs::read_to_string(path)?;
    let db: ThermoDatabase = serde_yaml::from_str(&content)?;
    db.validate()?;
    Ok(db)
}

/// Save a species database to a YAML file.
pub fn save_yaml(path: &std::path::Path, db: &ThermoDatabase) -> ChemResult<()> {
    db.validate()?;
    let content = serde_yaml::to_string(db)?;
    std::fs::write(path, content)?;
    Ok(())
}
