//! Utility types and functions shared across the crate.
//!
//! - [`Error`] / [`Result`] - Error handling
//! - Unit tables and [`UnitContext`]
//! - Math type re-exports from glam

mod error;
mod math;
mod units;

pub use error::*;
pub use math::*;
pub use units::*;
