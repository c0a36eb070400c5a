use crate::KfError;

/// Floating point type used throughout the toolkit
pub type Real = f64;

/// One tolerance for everything
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, KfError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(KfError::NonFinite { what, value: v })
    }
}

/// Finite and strictly positive, as required for temperatures, pressures
/// and integration intervals.
pub fn ensure_positive(v: Real, what: &'static str) -> Result<Real, KfError> {
    if !v.is_finite() {
        return Err(KfError::NonFinite { what, value: v });
    }
    if v <= 0.0 {
        return Err(KfError::InvalidArg { what });
    }
    Ok(v)
}
