//! In-process tabulation engine double with a known analytical mapping.
//!
//! [`ScriptedEngine`] acts like a tabulation engine whose chemistry is
//! first-order decay with a closed-form solution, so tests can check
//! mapped values exactly. It records every call and can inject
//! failures.

use std::sync::{Arc, Mutex, MutexGuard};

use kf_core::numeric::{Tolerances, nearly_equal};

use crate::engine::{EngineParams, QueryAux, QueryReply, TabulationEngine};
use crate::error::{TabError, TabResult};

/// What the table did with one query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableDecision {
    /// No stored entry was close enough; a new entry was added.
    Added,
    /// A stored entry within the retrieve tolerance was reused.
    Retrieved,
}

/// Call log kept by [`ScriptedEngine`] for assertions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineLog {
    /// Number of `initialize` calls that succeeded.
    pub init_count: u32,
    /// Number of `query` calls, including injected failures.
    pub queries: u64,
    /// Number of `save` calls that succeeded.
    pub saves: u64,
    /// Table decision per converged query, in call order.
    pub decisions: Vec<TableDecision>,
}

/// Scripted engine: first-order decay on every concentration slot and a
/// linear rise on the temperature slot.
///
/// Concentrations follow dy/dt = -k*y, so y(dt) = y0 * exp(-k*dt);
/// temperature follows T(dt) = T0 + r*dt. Both have exact solutions the
/// tests compare against.
pub struct ScriptedEngine {
    /// Decay rate k [1/s] applied to every concentration slot.
    pub decay_rate: f64,
    /// Temperature rise r [K/s] applied to the temperature slot.
    pub temperature_rise_k_s: f64,
    /// Recommended sub-step as a fraction of the queried interval.
    pub sub_dt_factor: f64,
    /// Pressure factor applied per query in variable-pressure mode.
    pub pressure_scale: f64,
    /// Fail this many upcoming queries as non-convergent.
    pub fail_next_queries: u32,
    /// Fail every save.
    pub fail_saves: bool,

    ncv: Option<usize>,
    params: Option<EngineParams>,
    table: Vec<Vec<f64>>,
    log: Arc<Mutex<EngineLog>>,
}

impl ScriptedEngine {
    pub fn new(decay_rate: f64, temperature_rise_k_s: f64) -> Self {
        Self {
            decay_rate,
            temperature_rise_k_s,
            sub_dt_factor: 0.5,
            pressure_scale: 1.0,
            fail_next_queries: 0,
            fail_saves: false,
            ncv: None,
            params: None,
            table: Vec::new(),
            log: Arc::new(Mutex::new(EngineLog::default())),
        }
    }

    /// Closed-form concentration after `t` seconds.
    pub fn analytical_concentration(&self, c0: f64, t: f64) -> f64 {
        c0 * (-self.decay_rate * t).exp()
    }

    /// Closed-form temperature after `t` seconds.
    pub fn analytical_temperature(&self, t0: f64, t: f64) -> f64 {
        t0 + self.temperature_rise_k_s * t
    }

    /// Snapshot of the call log.
    pub fn log(&self) -> EngineLog {
        self.lock_log().clone()
    }

    /// Shared handle to the call log. Clone it before boxing the engine
    /// so assertions stay possible after ownership moves.
    pub fn log_handle(&self) -> Arc<Mutex<EngineLog>> {
        Arc::clone(&self.log)
    }

    /// Number of stored table entries.
    pub fn table_len(&self) -> usize {
        self.table.len()
    }

    fn lock_log(&self) -> MutexGuard<'_, EngineLog> {
        self.log.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for ScriptedEngine {
    fn default() -> Self {
        Self::new(1.0, 0.0)
    }
}

impl TabulationEngine for ScriptedEngine {
    fn name(&self) -> &str {
        "scripted"
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
        self.ncv = Some(ncv);
        self.params = Some(*params);
        self.lock_log().init_count += 1;
        Ok(())
    }

    fn query(&mut self, dt_s: f64, x: &mut [f64], aux: &mut QueryAux) -> TabResult<QueryReply> {
        let ncv = self.ncv.ok_or(TabError::NotInitialized)?;
        let params = self.params.ok_or(TabError::NotInitialized)?;
        if x.len() != ncv {
            return Err(TabError::DimensionMismatch {
                expected: ncv,
                actual: x.len(),
            });
        }
        self.lock_log().queries += 1;

        if self.fail_next_queries > 0 {
            self.fail_next_queries -= 1;
            return Err(TabError::Nonconvergent {
                what: format!("scripted failure over {dt_s} s"),
            });
        }

        // Table bookkeeping: retrieve when a stored query point matches
        // within the retrieve tolerance in every slot, add otherwise.
        let tol = Tolerances {
            abs: params.tab_abs_err,
            rel: params.tab_rel_err,
        };
        let hit = self
            .table
            .iter()
            .any(|entry| entry.iter().zip(x.iter()).all(|(a, b)| nearly_equal(*a, *b, tol)));
        if hit {
            self.lock_log().decisions.push(TableDecision::Retrieved);
        } else {
            self.table.push(x.to_vec());
            self.lock_log().decisions.push(TableDecision::Added);
        }

        let (conc, temp) = x.split_at_mut(ncv - 1);
        let decay = (-self.decay_rate * dt_s).exp();
        for c in conc {
            *c *= decay;
        }
        temp[0] += self.temperature_rise_k_s * dt_s;

        if !params.constant_pressure {
            aux.pressure_dyn_cm2 *= self.pressure_scale;
        }

        Ok(QueryReply {
            recommended_dt_s: self.sub_dt_factor * dt_s,
        })
    }

    fn save(&mut self) -> TabResult<()> {
        if self.ncv.is_none() {
            return Err(TabError::NotInitialized);
        }
        if self.fail_saves {
            return Err(TabError::SaveFailed {
                message: "scripted save failure".to_string(),
            });
        }
        self.lock_log().saves += 1;
        Ok(())
    }
}
