//! Space conversion: channel completion, Euler continuity filtering and
//! the engine that re-expresses channel groups under a different parent
//! transform.

mod complete;
mod euler;
mod space;

pub use complete::*;
pub use euler::*;
pub use space::*;
