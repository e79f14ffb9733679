//! # maya-anim
//!
//! Rust implementation of the Maya ASCII animation curve format (.anim).
//!
//! Original format defined by Autodesk Maya's animImportExport plugin.
//! All rights to the original belong to the authors. This is an
//! independent Rust implementation aiming to read and write files the
//! original tooling accepts.
//!
//! ## Modules
//!
//! - [`util`] - Basic types (units, math, errors)
//! - [`model`] - Document model (header, nodes, channels, keyframes)
//! - [`text`] - Text grammar reader and writer
//! - [`tangent`] - Tangent and interpolation mapping tables
//! - [`convert`] - Channel completion and space conversion
//! - [`anim`] - Whole-document encode/decode
//!
//! ## Example
//!
//! ```ignore
//! use maya_anim::anim;
//!
//! let decoded = anim::decode_file("walk_cycle.anim")?;
//! for node in &decoded.document.nodes {
//!     println!("{} ({} channels)", node.name, node.groups.channel_count());
//! }
//! ```

pub mod util;
pub mod model;
pub mod text;
pub mod tangent;
pub mod convert;
pub mod anim;

// Re-export commonly used types
pub use util::{Error, Result};
pub use model::{AnimDocument, AnimHeader, AnimNode, Channel, Keyframe};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::anim::{
        apply_import_transforms, decode, decode_file, encode, encode_to_file, AnimDecode,
        DecodeAbort, DecodeReport, EncodeOptions, ImportOptions, SanitizePolicy,
    };
    pub use crate::convert::{Direction, LinearEval, NodeKind, NodeSpace, SpaceConversion};
    pub use crate::model::{
        AnimDocument, AnimHeader, AnimNode, Channel, ChannelSettings, Keyframe, PropertyKind,
    };
    pub use crate::util::{
        AngularUnit, Error, LinearUnit, OutputUnit, Result, TimeUnit, UnitContext,
    };
}
