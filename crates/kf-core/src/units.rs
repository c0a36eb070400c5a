// kf-core/src/units.rs

use uom::si::f64::{
    Pressure as UomPressure, ThermodynamicTemperature as UomThermodynamicTemperature,
    Time as UomTime,
};

// Public canonical unit types (SI, f64)
pub type Pressure = UomPressure;
pub type Temperature = UomThermodynamicTemperature;
pub type Time = UomTime;

#[inline]
pub fn pa(v: f64) -> Pressure {
    use uom::si::pressure::pascal;
    Pressure::new::<pascal>(v)
}

#[inline]
pub fn k(v: f64) -> Temperature {
    use uom::si::thermodynamic_temperature::kelvin;
    Temperature::new::<kelvin>(v)
}

#[inline]
pub fn s(v: f64) -> Time {
    use uom::si::time::second;
    Time::new::<second>(v)
}

/// SI ↔ CGS conversion for the tabulation wire format.
///
/// The external tabulation library operates entirely in CGS: molar
/// concentrations in mol/cm³, pressure in dyn/cm², mass density in g/cm³,
/// specific enthalpy in erg/g. Temperature (K) and time (s) are shared
/// between the two systems and pass through unchanged.
pub mod cgs {
    /// kmol/m³ → mol/cm³
    pub const CONC_SI_TO_CGS: f64 = 1e-3;
    /// mol/cm³ → kmol/m³
    pub const CONC_CGS_TO_SI: f64 = 1e3;
    /// Pa → dyn/cm²
    pub const PRESSURE_SI_TO_CGS: f64 = 10.0;
    /// dyn/cm² → Pa
    pub const PRESSURE_CGS_TO_SI: f64 = 0.1;
    /// kg/m³ → g/cm³
    pub const DENSITY_SI_TO_CGS: f64 = 1e-3;
    /// g/cm³ → kg/m³
    pub const DENSITY_CGS_TO_SI: f64 = 1e3;
    /// J/kg → erg/g
    pub const ENTHALPY_SI_TO_CGS: f64 = 1e4;
    /// erg/g → J/kg
    pub const ENTHALPY_CGS_TO_SI: f64 = 1e-4;

    #[inline]
    pub fn conc_to_cgs(c_kmol_m3: f64) -> f64 {
        c_kmol_m3 * CONC_SI_TO_CGS
    }

    #[inline]
    pub fn conc_from_cgs(c_mol_cm3: f64) -> f64 {
        c_mol_cm3 * CONC_CGS_TO_SI
    }

    #[inline]
    pub fn pressure_to_cgs(p_pa: f64) -> f64 {
        p_pa * PRESSURE_SI_TO_CGS
    }

    #[inline]
    pub fn pressure_from_cgs(p_dyn_cm2: f64) -> f64 {
        p_dyn_cm2 * PRESSURE_CGS_TO_SI
    }

    #[inline]
    pub fn density_to_cgs(rho_kg_m3: f64) -> f64 {
        rho_kg_m3 * DENSITY_SI_TO_CGS
    }

    #[inline]
    pub fn density_from_cgs(rho_g_cm3: f64) -> f64 {
        rho_g_cm3 * DENSITY_CGS_TO_SI
    }

    #[inline]
    pub fn enthalpy_to_cgs(h_j_kg: f64) -> f64 {
        h_j_kg * ENTHALPY_SI_TO_CGS
    }

    #[inline]
    pub fn enthalpy_from_cgs(h_erg_g: f64) -> f64 {
        h_erg_g * ENTHALPY_CGS_TO_SI
    }
}


#[cfg(test)]
mod proptests {
    use super::cgs;
    use crate::numeric::{Tolerances, nearly_equal};
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn cgs_round_trip(v in 1e-30_f64..1e30_f64) {
            let tol = Tolerances { abs: 0.0, rel: 1e-12 };
            prop_assert!(nearly_equal(cgs::conc_from_cgs(cgs::conc_to_cgs(v)), v, tol));
            prop_assert!(nearly_equal(cgs::pressure_from_cgs(cgs::pressure_to_cgs(v)), v, tol));
            prop_assert!(nearly_equal(cgs::density_from_cgs(cgs::density_to_cgs(v)), v, tol));
            prop_assert!(nearly_equal(cgs::enthalpy_from_cgs(cgs::enthalpy_to_cgs(v)), v, tol));
        }
    }
}
