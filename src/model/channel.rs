//! Channels: one animation curve per transform component or custom
//! attribute.

use crate::model::{Infinity, Keyframe};
use crate::util::{lerp, AngularUnit, OutputUnit};

/// Which property of a node a channel group animates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PropertyKind {
    Location,
    RotationEuler,
    RotationQuaternion,
    Scale,
    /// Anything outside the transform set; the channel carries its own
    /// attribute name.
    Custom,
}

impl PropertyKind {
    /// Number of components a complete group of this kind has, `None`
    /// for custom attributes (any width).
    pub fn component_count(self) -> Option<usize> {
        match self {
            Self::Location | Self::RotationEuler | Self::Scale => Some(3),
            Self::RotationQuaternion => Some(4),
            Self::Custom => None,
        }
    }

    /// Attribute name used in `anim` declarations.
    pub fn attr_name(self) -> Option<&'static str> {
        match self {
            Self::Location => Some("translate"),
            Self::RotationEuler | Self::RotationQuaternion => Some("rotate"),
            Self::Scale => Some("scale"),
            Self::Custom => None,
        }
    }

    /// Component letter for the declaration, by ASCII offset from the
    /// base letter: `X` for vector groups, `W` for quaternions.
    pub fn component_letter(self, component: usize) -> char {
        let base = if self == Self::RotationQuaternion { b'W' } else { b'X' };
        (base + component as u8) as char
    }

    /// True for the kinds the space-conversion engine rebases.
    pub fn is_transform(self) -> bool {
        matches!(self, Self::Location | Self::RotationEuler | Self::RotationQuaternion)
    }
}

/// Per-channel settings from the `animData` block.
#[derive(Clone, Debug, PartialEq)]
pub struct ChannelSettings {
    /// Input domain; the format always drives curves by time.
    pub input: OutputUnit,
    pub output: OutputUnit,
    /// Weighted tangents; always true for curves this engine writes.
    pub weighted: bool,
    /// Present only when some keyframe carries a fixed tangent.
    pub tangent_angle_unit: Option<AngularUnit>,
    pub pre_infinity: Infinity,
    pub post_infinity: Infinity,
}

impl Default for ChannelSettings {
    fn default() -> Self {
        Self {
            input: OutputUnit::Time,
            output: OutputUnit::Unitless,
            weighted: true,
            tangent_angle_unit: None,
            pre_infinity: Infinity::Constant,
            post_infinity: Infinity::Constant,
        }
    }
}

impl ChannelSettings {
    /// Settings a freshly exported channel of the given kind gets.
    pub fn for_kind(kind: PropertyKind) -> Self {
        let output = match kind {
            PropertyKind::Location => OutputUnit::Linear,
            PropertyKind::RotationEuler | PropertyKind::RotationQuaternion => OutputUnit::Angular,
            PropertyKind::Scale | PropertyKind::Custom => OutputUnit::Unitless,
        };
        Self { output, ..Default::default() }
    }
}

/// One animation curve.
#[derive(Clone, Debug, PartialEq)]
pub struct Channel {
    pub kind: PropertyKind,
    /// Component index within the property group (0..2 vector,
    /// 0..3 quaternion).
    pub component: usize,
    /// Attribute name for custom channels; transform kinds derive theirs
    /// from [`PropertyKind::attr_name`].
    pub custom_attr: Option<String>,
    pub settings: ChannelSettings,
    /// Ordered by time by convention. Duplicate times are permitted;
    /// only the first is honored when scanning.
    pub keys: Vec<Keyframe>,
}

impl Channel {
    pub fn new(kind: PropertyKind, component: usize) -> Self {
        Self {
            kind,
            component,
            custom_attr: None,
            settings: ChannelSettings::for_kind(kind),
            keys: Vec::new(),
        }
    }

    /// Attribute name this channel is declared under.
    pub fn attr_name(&self) -> &str {
        self.kind
            .attr_name()
            .or(self.custom_attr.as_deref())
            .unwrap_or("custom")
    }

    /// Sample the curve at an arbitrary time.
    ///
    /// An exact key wins (first match for duplicate times); otherwise the
    /// value is linearly interpolated between the neighboring keys, and
    /// held constant before the first and after the last key. Hosts with
    /// richer curve evaluation plug in through
    /// [`crate::convert::CurveEval`] instead.
    pub fn sample(&self, time: f64) -> f64 {
        if let Some(key) = self.keys.iter().find(|k| k.time == time) {
            return key.value;
        }

        let mut prev: Option<&Keyframe> = None;
        for key in &self.keys {
            if key.time > time {
                return match prev {
                    Some(p) => {
                        let span = key.time - p.time;
                        if span == 0.0 {
                            p.value
                        } else {
                            lerp(p.value, key.value, (time - p.time) / span)
                        }
                    }
                    None => key.value,
                };
            }
            prev = Some(key);
        }
        prev.map(|k| k.value).unwrap_or(0.0)
    }

    /// First key time at or after `time`, if any key exists there.
    pub fn key_at(&self, time: f64) -> Option<&Keyframe> {
        self.keys.iter().find(|k| k.time == time)
    }

    /// True when any keyframe uses a fixed tangent on either side.
    pub fn has_fixed_tangents(&self) -> bool {
        self.keys.iter().any(|k| k.in_fixed.is_some() || k.out_fixed.is_some())
    }
}

/// Split a declaration attribute like `translate.translateX` into its
/// base name and trailing component letter.
pub fn split_attr(attr: &str) -> (&str, Option<char>) {
    match attr.split_once('.') {
        Some((base, long)) => (base, long.chars().last()),
        None => (attr, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel_with(keys: &[(f64, f64)]) -> Channel {
        let mut ch = Channel::new(PropertyKind::Location, 0);
        ch.keys = keys.iter().map(|&(t, v)| Keyframe::simple(t, v)).collect();
        ch
    }

    #[test]
    fn test_component_letters() {
        assert_eq!(PropertyKind::Location.component_letter(0), 'X');
        assert_eq!(PropertyKind::Location.component_letter(2), 'Z');
        assert_eq!(PropertyKind::RotationQuaternion.component_letter(0), 'W');
        assert_eq!(PropertyKind::RotationQuaternion.component_letter(3), 'Z');
    }

    #[test]
    fn test_sample_exact_and_duplicate() {
        let mut ch = channel_with(&[(0.0, 1.0), (10.0, 5.0)]);
        // duplicate time: first is honored
        ch.keys.push(Keyframe::simple(10.0, 99.0));
        ch.keys.sort_by(|a, b| a.time.partial_cmp(&b.time).unwrap());
        assert_eq!(ch.sample(10.0), 5.0);
    }

    #[test]
    fn test_sample_interpolates() {
        let ch = channel_with(&[(0.0, 0.0), (10.0, 5.0)]);
        assert_eq!(ch.sample(5.0), 2.5);
        assert_eq!(ch.sample(2.0), 1.0);
    }

    #[test]
    fn test_sample_constant_ends() {
        let ch = channel_with(&[(5.0, 2.0), (10.0, 4.0)]);
        assert_eq!(ch.sample(0.0), 2.0);
        assert_eq!(ch.sample(20.0), 4.0);
    }

    #[test]
    fn test_sample_empty() {
        let ch = channel_with(&[]);
        assert_eq!(ch.sample(3.0), 0.0);
    }

    #[test]
    fn test_split_attr() {
        assert_eq!(split_attr("translate.translateX"), ("translate", Some('X')));
        assert_eq!(split_attr("rotate.rotateW"), ("rotate", Some('W')));
        assert_eq!(split_attr("visibility"), ("visibility", None));
    }
}
