//! Keyframe and tangent wire types.

use crate::util::{Error, Result};

/// Tangent type keyword of the text format.
///
/// `Step` only carries meaning as an out-tangent; constant interpolation
/// has no incoming slope. The writer never emits it on the in side.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TangentType {
    Auto,
    Spline,
    Linear,
    Fixed,
    Step,
}

impl TangentType {
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Spline => "spline",
            Self::Linear => "linear",
            Self::Fixed => "fixed",
            Self::Step => "step",
        }
    }

    /// Closed table; unknown keywords are fatal for the document.
    pub fn parse(name: &str) -> Result<Self> {
        match name {
            "auto" => Ok(Self::Auto),
            "spline" => Ok(Self::Spline),
            "linear" => Ok(Self::Linear),
            "fixed" => Ok(Self::Fixed),
            "step" => Ok(Self::Step),
            _ => Err(Error::UnknownTangentType(name.to_string())),
        }
    }
}

/// Pre/post infinity behavior of a channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Infinity {
    #[default]
    Constant,
    Linear,
    Cycle,
    /// Repeat with accumulating offset.
    CycleRelative,
    /// Mirrored repeat.
    Oscillate,
}

impl Infinity {
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::Constant => "constant",
            Self::Linear => "linear",
            Self::Cycle => "cycle",
            Self::CycleRelative => "cycleRelative",
            Self::Oscillate => "oscillate",
        }
    }

    pub fn parse(name: &str) -> Result<Self> {
        match name {
            "constant" => Ok(Self::Constant),
            "linear" => Ok(Self::Linear),
            "cycle" => Ok(Self::Cycle),
            "cycleRelative" => Ok(Self::CycleRelative),
            "oscillate" => Ok(Self::Oscillate),
            _ => Err(Error::UnknownInfinityType(name.to_string())),
        }
    }
}

/// Angle/magnitude encoding of a fixed tangent.
///
/// The angle is expressed in the document's angular unit; the weight is
/// the Euclidean length of the handle vector in time/value space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FixedTangent {
    pub angle: f64,
    pub weight: f64,
}

/// One key on one channel.
///
/// `in_fixed`/`out_fixed` are present iff the corresponding tangent type
/// is [`TangentType::Fixed`]. Because the handle geometry is stored
/// relative to the key (angle plus magnitude), shifting `value` leaves
/// the tangent shape intact with no further bookkeeping.
#[derive(Clone, Debug, PartialEq)]
pub struct Keyframe {
    /// Frame number.
    pub time: f64,
    /// Value in the channel's declared output unit.
    pub value: f64,
    pub in_tangent: TangentType,
    pub out_tangent: TangentType,
    pub tangent_lock: bool,
    /// Always false for keys this crate writes; handle length is never
    /// locked by the codec.
    pub weight_lock: bool,
    pub breakdown: bool,
    pub in_fixed: Option<FixedTangent>,
    pub out_fixed: Option<FixedTangent>,
}

impl Keyframe {
    /// Plain auto/auto key, the shape used by channel completion and by
    /// keys inserted while baking.
    pub fn simple(time: f64, value: f64) -> Self {
        Self {
            time,
            value,
            in_tangent: TangentType::Auto,
            out_tangent: TangentType::Auto,
            tangent_lock: true,
            weight_lock: false,
            breakdown: false,
            in_fixed: None,
            out_fixed: None,
        }
    }
}
