//! Tangent codec: maps between a host's handle/interpolation vocabulary
//! and the format's tangent keywords, and between geometric handle
//! vectors and the angle + magnitude encoding of `fixed` tangents.
//!
//! Both mapping tables are closed; the host vocabulary is the usual
//! bezier-curve set (auto-clamped, auto, vector, aligned, free handles,
//! plus per-key bezier/linear/constant interpolation).

use crate::model::{FixedTangent, Infinity, TangentType};
use crate::util::{round6, AngularUnit, DVec2};

/// Host-side handle type of one side of a key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HandleType {
    AutoClamped,
    Auto,
    Vector,
    Aligned,
    Free,
}

impl HandleType {
    /// Forward table into the format's vocabulary. Aligned and free
    /// handles both become `fixed`; the tangent-lock flag tells them
    /// apart again on the way back.
    pub fn tangent_type(self) -> TangentType {
        match self {
            Self::AutoClamped => TangentType::Auto,
            Self::Auto => TangentType::Spline,
            Self::Vector => TangentType::Linear,
            Self::Aligned | Self::Free => TangentType::Fixed,
        }
    }
}

/// Host-side per-key interpolation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interpolation {
    Bezier,
    Linear,
    Constant,
}

impl Interpolation {
    pub fn tangent_type(self) -> TangentType {
        match self {
            Self::Bezier => TangentType::Spline,
            Self::Linear => TangentType::Linear,
            Self::Constant => TangentType::Step,
        }
    }
}

/// Host-side curve extrapolation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Extrapolation {
    Constant,
    Linear,
}

/// Host-side cyclic modifier mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CycleMode {
    Repeat,
    RepeatOffset,
    Mirror,
}

/// Out-tangent of a key: non-bezier interpolation wins over the handle.
pub fn out_tangent(interpolation: Interpolation, right_handle: HandleType) -> TangentType {
    match interpolation {
        Interpolation::Bezier => right_handle.tangent_type(),
        other => other.tangent_type(),
    }
}

/// In-tangent of a key: when the span leading into this key is
/// non-bezier (the previous key's interpolation), the tangent follows
/// this key's interpolation; otherwise the left handle decides. The
/// first key of a curve always uses its left handle.
pub fn in_tangent(
    prev_interpolation: Option<Interpolation>,
    interpolation: Interpolation,
    left_handle: HandleType,
) -> TangentType {
    match prev_interpolation {
        Some(Interpolation::Bezier) | None => left_handle.tangent_type(),
        Some(_) => interpolation.tangent_type(),
    }
}

/// Tangents are locked unless either handle is fully independent.
pub fn tangent_lock(left: HandleType, right: HandleType) -> bool {
    left != HandleType::Free && right != HandleType::Free
}

/// Inverse table: tangent keyword back to a handle type. `fixed` splits
/// on the lock flag; `step` has no handle of its own and decodes to
/// auto (the consuming interpolation is constant anyway).
pub fn host_handle(tangent: TangentType, locked: bool) -> HandleType {
    match tangent {
        TangentType::Auto => HandleType::AutoClamped,
        TangentType::Spline => HandleType::Auto,
        TangentType::Linear => HandleType::Vector,
        TangentType::Fixed => {
            if locked {
                HandleType::Aligned
            } else {
                HandleType::Free
            }
        }
        TangentType::Step => HandleType::Auto,
    }
}

/// Interpolation of the span out of a key: a step/linear out-tangent
/// matching the next key's in-tangent collapses to constant/linear
/// interpolation; everything else stays bezier.
pub fn host_interpolation(out: TangentType, next_in: Option<TangentType>) -> Interpolation {
    match (out, next_in) {
        (TangentType::Step, Some(TangentType::Step)) => Interpolation::Constant,
        (TangentType::Linear, Some(TangentType::Linear)) => Interpolation::Linear,
        _ => Interpolation::Bezier,
    }
}

/// Which side of the key a handle sits on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HandleSide {
    Left,
    Right,
}

/// Encode a handle position as angle + magnitude.
///
/// The slope between key and handle becomes an angle in the document's
/// angular unit, clamped to zero within 1e-3; a vertical handle
/// (Δtime = 0) becomes a quarter turn signed by Δvalue. The magnitude is
/// the Euclidean handle length in time/value space. Both are rounded to
/// six decimals, the precision the text format keeps.
pub fn encode_handle(key: DVec2, handle: DVec2, angular: AngularUnit) -> FixedTangent {
    let dx = key.x - handle.x;
    let dy = key.y - handle.y;

    let angle = if dx != 0.0 {
        let angle = angular.from_radians((dy / dx).atan());
        if angle.abs() < 1.0e-3 {
            0.0
        } else {
            angle
        }
    } else {
        let quarter = angular.from_radians(std::f64::consts::FRAC_PI_2);
        quarter.copysign(dy)
    };

    FixedTangent { angle: round6(angle), weight: round6(dx.hypot(dy)) }
}

/// Reconstruct a handle position from a fixed tangent.
pub fn decode_handle(
    key: DVec2,
    tangent: FixedTangent,
    side: HandleSide,
    angular: AngularUnit,
) -> DVec2 {
    let radians = angular.to_radians(tangent.angle);
    let dir = DVec2::new(radians.cos(), radians.sin()) * tangent.weight;
    match side {
        HandleSide::Left => key - dir,
        HandleSide::Right => key + dir,
    }
}

/// Pre/post infinity from extrapolation and an optional cyclic modifier;
/// the modifier mode wins when present.
pub fn infinity_from(extrapolation: Extrapolation, cycle: Option<CycleMode>) -> Infinity {
    match cycle {
        Some(CycleMode::Repeat) => Infinity::Cycle,
        Some(CycleMode::RepeatOffset) => Infinity::CycleRelative,
        Some(CycleMode::Mirror) => Infinity::Oscillate,
        None => match extrapolation {
            Extrapolation::Constant => Infinity::Constant,
            Extrapolation::Linear => Infinity::Linear,
        },
    }
}

/// Inverse of [`infinity_from`]: a cyclic infinity forces constant
/// extrapolation plus a cycle modifier on the host side.
pub fn infinity_to(infinity: Infinity) -> (Extrapolation, Option<CycleMode>) {
    match infinity {
        Infinity::Constant => (Extrapolation::Constant, None),
        Infinity::Linear => (Extrapolation::Linear, None),
        Infinity::Cycle => (Extrapolation::Constant, Some(CycleMode::Repeat)),
        Infinity::CycleRelative => (Extrapolation::Constant, Some(CycleMode::RepeatOffset)),
        Infinity::Oscillate => (Extrapolation::Constant, Some(CycleMode::Mirror)),
    }
}
