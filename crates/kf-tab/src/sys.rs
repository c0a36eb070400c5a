//! Raw FFI bindings for the ISAT-CK7 chemistry interface.
//!
//! The shared library is loaded at runtime via [`libloading`] and all
//! entry points are pre-resolved at construction time, so calls are
//! plain function-pointer calls.
//!
//! The interface is Fortran: every argument passes by reference and all
//! quantities cross in CGS units. Positional conventions:
//!
//! - `ciparam_(ci_info, ci_rinfo, info, rinfo)` stages control
//!   parameters ahead of `ciinit_`. `ci_rinfo` is
//!   `[tab_abs_err, tab_rel_err, ode_abs_err, ode_rel_err, table_size_mb]`;
//!   `ci_info` is reserved integer slots. The `info`/`rinfo` outputs
//!   return the settings the library accepted.
//! - `ciinit_(ncv, modeci, nfull)` builds the table for `ncv`
//!   controlled variables. `modeci` is a mode bitmask
//!   ([`MODE_CONSTANT_PRESSURE`], [`MODE_EXTERNAL_RATES`]); `nfull`
//!   returns the full composition width the library works with.
//! - `cirxn_(t, ncv, c0, ct, dpt)` maps composition `c0` across `t`
//!   seconds into `ct`. `dpt` is the auxiliary block
//!   `[density g/cm³, pressure dyn/cm², enthalpy datum erg/g, sub-step]`;
//!   on return `dpt[3]` holds the recommended next sub-step [s],
//!   negative when the mapping did not converge. Variable-pressure mode
//!   rewrites `dpt[1]`.
//! - `cisave_(istate)` writes the table to library-managed storage when
//!   `istate == 1`.

use std::os::raw::{c_double, c_int};
use std::path::Path;

use libloading::Library;

use crate::error::{TabError, TabResult};

/// Length of the real control-parameter block for `ciparam_`.
pub const RINFO_LEN: usize = 5;
/// Length of the integer control-parameter block for `ciparam_`.
pub const INFO_LEN: usize = 2;
/// Length of the auxiliary `dpt` block for `cirxn_`.
pub const DPT_LEN: usize = 4;

/// Index of mixture density [g/cm³] in the `dpt` block.
pub const DPT_DENSITY: usize = 0;
/// Index of pressure [dyn/cm²] in the `dpt` block.
pub const DPT_PRESSURE: usize = 1;
/// Index of the enthalpy datum offset [erg/g] in the `dpt` block.
pub const DPT_H_DATUM: usize = 2;
/// Index of the returned recommended sub-step [s] in the `dpt` block.
pub const DPT_SUB_DT: usize = 3;

/// `ciinit_` mode bit: pressure constant across all queries.
pub const MODE_CONSTANT_PRESSURE: c_int = 1;
/// `ciinit_` mode bit: reaction rates from an external routine.
pub const MODE_EXTERNAL_RATES: c_int = 2;

/// Environment variable naming the ISAT-CK7 shared library path.
pub const LIBRARY_ENV_VAR: &str = "KINFLOW_ISAT_LIB";

type FnCiparam = unsafe extern "C" fn(*const c_int, *const c_double, *mut c_int, *mut c_double);
type FnCiinit = unsafe extern "C" fn(*const c_int, *const c_int, *mut c_int);
type FnCirxn =
    unsafe extern "C" fn(*const c_double, *const c_int, *const c_double, *mut c_double, *mut c_double);
type FnCisave = unsafe extern "C" fn(*const c_int);

/// A dynamically-loaded ISAT-CK7 library with pre-resolved function
/// pointers.
///
/// All entry points are resolved at load time; a missing symbol fails
/// construction instead of panicking later. Methods are `unsafe`
/// because they forward raw pointers to Fortran code the compiler
/// cannot check.
pub struct IsatCk7Lib {
    // Keeps the shared object mapped; the function pointers are only
    // valid while it lives.
    _lib: Library,

    fn_ciparam: FnCiparam,
    fn_ciinit: FnCiinit,
    fn_cirxn: FnCirxn,
    fn_cisave: FnCisave,
}

impl IsatCk7Lib {
    /// Resolve a single symbol as a typed function pointer.
    fn resolve<T: Copy>(lib: &Library, name: &[u8]) -> TabResult<T> {
        // SAFETY: the type aliases above match the Fortran calling
        // convention declared by the ISAT-CK7 chemistry interface.
        let sym: libloading::Symbol<T> = unsafe { lib.get(name) }.map_err(|_| {
            // Strip the trailing \0 for display.
            let symbol =
                String::from_utf8_lossy(&name[..name.len().saturating_sub(1)]).to_string();
            TabError::SymbolNotFound { symbol }
        })?;
        Ok(*sym)
    }

    /// Resolve all required symbols from an already-loaded library.
    /// Fails on the first missing symbol.
    fn resolve_all(lib: Library) -> TabResult<Self> {
        Ok(Self {
            fn_ciparam: Self::resolve(&lib, b"ciparam_\0")?,
            fn_ciinit: Self::resolve(&lib, b"ciinit_\0")?,
            fn_cirxn: Self::resolve(&lib, b"cirxn_\0")?,
            fn_cisave: Self::resolve(&lib, b"cisave_\0")?,
            _lib: lib,
        })
    }

    /// Load the ISAT-CK7 shared library from an exact file path.
    pub fn load(path: &Path) -> TabResult<Self> {
        let lib = unsafe { Library::new(path) }.map_err(|e| TabError::LibraryLoad {
            message: format!("{}: {e}", path.display()),
        })?;
        Self::resolve_all(lib)
    }

    /// Load the library named by the [`LIBRARY_ENV_VAR`] environment
    /// variable.
    pub fn from_env() -> TabResult<Self> {
        let path = std::env::var(LIBRARY_ENV_VAR).map_err(|_| TabError::LibraryLoad {
            message: format!("{LIBRARY_ENV_VAR} is not set"),
        })?;
        Self::load(Path::new(&path))
    }

    /// Stage control parameters. Call before [`Self::ciinit`].
    pub unsafe fn ciparam(
        &self,
        ci_info: *const c_int,
        ci_rinfo: *const c_double,
        info: *mut c_int,
        rinfo: *mut c_double,
    ) {
        unsafe { (self.fn_ciparam)(ci_info, ci_rinfo, info, rinfo) };
    }

    /// Build the table for `ncv` controlled variables.
    pub unsafe fn ciinit(&self, ncv: *const c_int, modeci: *const c_int, nfull: *mut c_int) {
        unsafe { (self.fn_ciinit)(ncv, modeci, nfull) };
    }

    /// Map `c0` across `t` seconds into `ct`; auxiliary block in `dpt`.
    pub unsafe fn cirxn(
        &self,
        t: *const c_double,
        ncv: *const c_int,
        c0: *const c_double,
        ct: *mut c_double,
        dpt: *mut c_double,
    ) {
        unsafe { (self.fn_cirxn)(t, ncv, c0, ct, dpt) };
    }

    /// Write the table out when `istate == 1`.
    pub unsafe fn cisave(&self, istate: *const c_int) {
        unsafe { (self.fn_cisave)(istate) };
    }
}
