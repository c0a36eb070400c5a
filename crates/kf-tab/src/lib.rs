//! kf-tab: chemistry tabulation engine abstraction and backends.
//!
//! The [`TabulationEngine`] trait is the narrow seam between chemistry
//! solvers and tabulation backends: the dynamically loaded ISAT-CK7
//! library in production, a scripted in-process double in tests.
//! Everything crossing the seam is in CGS units.

pub mod engine;
pub mod error;
pub mod isat_ck7;
pub mod scripted;
pub mod sys;

pub use engine::{EngineParams, QueryAux, QueryReply, TabulationEngine};
pub use error::{TabError, TabResult};
pub use isat_ck7::IsatCk7Engine;
pub use scripted::{EngineLog, ScriptedEngine, TableDecision};
