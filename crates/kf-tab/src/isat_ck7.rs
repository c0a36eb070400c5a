//! Tabulation engine backed by the external ISAT-CK7 library.

use std::os::raw::{c_double, c_int};
use std::path::Path;

use crate::engine::{EngineParams, QueryAux, QueryReply, TabulationEngine};
use crate::error::{TabError, TabResult};
use crate::sys::{self, IsatCk7Lib};

/// [`TabulationEngine`] over a dynamically loaded ISAT-CK7 library.
///
/// The library keeps its table in process-global Fortran state, so a
/// worker process should own at most one instance.
pub struct IsatCk7Engine {
    lib: IsatCk7Lib,
    ncv: Option<usize>,
    // Reusable mapped-composition output buffer for cirxn_ (the library
    // requires distinct in/out buffers).
    ct: Vec<f64>,
}

impl IsatCk7Engine {
    /// Load the engine from a shared-library path.
    pub fn load(path: &Path) -> TabResult<Self> {
        Ok(Self {
            lib: IsatCk7Lib::load(path)?,
            ncv: None,
            ct: Vec::new(),
        })
    }

    /// Load the engine from the path named by
    /// [`sys::LIBRARY_ENV_VAR`].
    pub fn from_env() -> TabResult<Self> {
        Ok(Self {
            lib: IsatCk7Lib::from_env()?,
            ncv: None,
            ct: Vec::new(),
        })
    }
}

impl TabulationEngine for IsatCk7Engine {
    fn name(&self) -> &str {
        "ISAT-CK7"
    }

    fn initialize(&mut self, ncv: usize, params: &EngineParams) -> TabResult<()> {
        if self.ncv.is_some() {
            return Err(TabError::AlreadyInitialized);
        }
        if ncv < 2 {
            return Err(TabError::ParamsRejected {
                what: "ncv must cover at least one species plus temperature",
            });
        }

        let ci_info: [c_int; sys::INFO_LEN] = [0; sys::INFO_LEN];
        let ci_rinfo: [c_double; sys::RINFO_LEN] = [
            params.tab_abs_err,
            params.tab_rel_err,
            params.ode_abs_err,
            params.ode_rel_err,
            params.table_size_mb,
        ];
        let mut info: [c_int; sys::INFO_LEN] = [0; sys::INFO_LEN];
        let mut rinfo: [c_double; sys::RINFO_LEN] = [0.0; sys::RINFO_LEN];

        let mut modeci: c_int = 0;
        if params.constant_pressure {
            modeci |= sys::MODE_CONSTANT_PRESSURE;
        }
        if params.external_rates {
            modeci |= sys::MODE_EXTERNAL_RATES;
        }

        let ncv_c = ncv as c_int;
        let mut nfull: c_int = 0;

        // SAFETY: all pointers reference live stack arrays of the
        // documented lengths.
        unsafe {
            self.lib.ciparam(
                ci_info.as_ptr(),
                ci_rinfo.as_ptr(),
                info.as_mut_ptr(),
                rinfo.as_mut_ptr(),
            );
            self.lib.ciinit(&ncv_c, &modeci, &mut nfull);
        }

        if nfull < ncv_c {
            return Err(TabError::ParamsRejected {
                what: "library reports fewer variables than requested",
            });
        }

        self.ct = vec![0.0; ncv];
        self.ncv = Some(ncv);
        Ok(())
    }

    fn query(&mut self, dt_s: f64, x: &mut [f64], aux: &mut QueryAux) -> TabResult<QueryReply> {
        let ncv = self.ncv.ok_or(TabError::NotInitialized)?;
        if x.len() != ncv {
            return Err(TabError::DimensionMismatch {
                expected: ncv,
                actual: x.len(),
            });
        }

        let t: c_double = dt_s;
        let ncv_c = ncv as c_int;
        let mut dpt: [c_double; sys::DPT_LEN] = [
            aux.density_g_cm3,
            aux.pressure_dyn_cm2,
            aux.h_datum_erg_g,
            0.0,
        ];

        // SAFETY: c0 and ct are distinct buffers of ncv elements; dpt
        // has DPT_LEN elements.
        unsafe {
            self.lib
                .cirxn(&t, &ncv_c, x.as_ptr(), self.ct.as_mut_ptr(), dpt.as_mut_ptr());
        }

        let sub_dt = dpt[sys::DPT_SUB_DT];
        if !sub_dt.is_finite() {
            return Err(TabError::NonFinite {
                what: "recommended sub-step",
            });
        }
        if sub_dt < 0.0 {
            return Err(TabError::Nonconvergent {
                what: format!("mapping over {dt_s} s"),
            });
        }
        for &v in &self.ct {
            if !v.is_finite() {
                return Err(TabError::NonFinite {
                    what: "mapped composition",
                });
            }
        }

        x.copy_from_slice(&self.ct);
        aux.pressure_dyn_cm2 = dpt[sys::DPT_PRESSURE];
        Ok(QueryReply {
            recommended_dt_s: sub_dt,
        })
    }

    fn save(&mut self) -> TabResult<()> {
        if self.ncv.is_none() {
            return Err(TabError::NotInitialized);
        }
        let istate: c_int = 1;
        // SAFETY: istate outlives the call.
        unsafe { self.lib.cisave(&istate) };
        Ok(())
    }
}
