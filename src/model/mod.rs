//! In-memory curve model: header, keyframes, channels and documents.
//!
//! The model is built fresh for every read or write pass and holds no
//! cross-call state. Channels are mutated in place by channel completion
//! and space conversion, then consumed by the grammar writer or handed
//! to the host importer.

mod channel;
mod document;
mod header;
mod keyframe;

pub use channel::*;
pub use document::*;
pub use header::*;
pub use keyframe::*;
