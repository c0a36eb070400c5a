//! kf-core: stable foundation for kinflow.
//!
//! Contains:
//! - units (uom SI types + constructors, CGS conversion factors)
//! - numeric (Real + tolerances + float helpers)
//! - timing (opt-in performance counters)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod timing;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{KfError, KfResult};
pub use numeric::*;
pub use units::*;
