//! Grammar writer: emits header statements, `anim` declarations and
//! `animData` blocks into a string buffer.
//!
//! Numeric policy: key values are fixed to six decimal digits; frame
//! numbers and tangent angle/weight fields use the shortest form that
//! drops a redundant `.0`.

use std::fmt::Write as _;

use crate::model::{AnimHeader, Channel, Keyframe};
use crate::util::round6;

/// Format a value with six fixed decimals, as the format stores values.
pub fn fmt_value(v: f64) -> String {
    format!("{v:.6}")
}

/// Shortest representation after rounding to six decimals; whole numbers
/// lose the fractional part entirely.
pub fn fmt_number(v: f64) -> String {
    let v = round6(v);
    if v.is_finite() && v.fract() == 0.0 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}

/// Appends document text. One writer per encode pass.
#[derive(Default)]
pub struct Writer {
    out: String,
}

impl Writer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn finish(self) -> String {
        self.out
    }

    pub fn write_header(&mut self, header: &AnimHeader) {
        let _ = writeln!(self.out, "animVersion {};", header.version);
        let _ = writeln!(self.out, "mayaVersion {};", header.app_version);
        let _ = writeln!(self.out, "timeUnit {};", header.time_unit.wire_name());
        let _ = writeln!(self.out, "linearUnit {};", header.linear_unit.wire_name());
        let _ = writeln!(self.out, "angularUnit {};", header.angular_unit.wire_name());
        let _ = writeln!(self.out, "startTime {};", header.start);
        let _ = writeln!(self.out, "endTime {};", header.end);
        for (key, value) in &header.extras {
            let _ = writeln!(self.out, "{key} {value};");
        }
    }

    /// Bare structural line for a node with no animation; keeps the
    /// hierarchy bookkeeping of the decoder consistent.
    pub fn write_node_line(&mut self, name: &str, children: u32) {
        let _ = writeln!(self.out, "anim {name} 0 {children} 0;");
    }

    /// Channel declaration plus its `animData` block. Transform channels
    /// carry a `base.baseX` compound attribute; custom attributes are
    /// declared under their plain name.
    pub fn write_channel(&mut self, node_name: &str, children: u32, index: usize, channel: &Channel) {
        let attr = channel.attr_name();
        if channel.kind == crate::model::PropertyKind::Custom {
            let _ = writeln!(self.out, "anim {attr} {attr} {node_name} 0 {children} {index};");
        } else {
            let letter = channel.kind.component_letter(channel.component);
            let _ = writeln!(
                self.out,
                "anim {attr}.{attr}{letter} {attr}{letter} {node_name} 0 {children} {index};"
            );
        }
        self.write_anim_data(channel);
    }

    fn write_anim_data(&mut self, channel: &Channel) {
        let s = &channel.settings;
        self.out.push_str("animData {\n");
        let _ = writeln!(self.out, "  input {};", s.input.wire_name());
        let _ = writeln!(self.out, "  output {};", s.output.wire_name());
        let _ = writeln!(self.out, "  weighted {};", s.weighted as u8);
        if let Some(unit) = s.tangent_angle_unit {
            let _ = writeln!(self.out, "  tangentAngleUnit {};", unit.wire_name());
        }
        let _ = writeln!(self.out, "  preInfinity {};", s.pre_infinity.wire_name());
        let _ = writeln!(self.out, "  postInfinity {};", s.post_infinity.wire_name());
        self.out.push_str("  keys {\n");
        for key in &channel.keys {
            self.write_key(key);
        }
        self.out.push_str("  }\n");
        self.out.push_str("}\n");
    }

    fn write_key(&mut self, key: &Keyframe) {
        let _ = write!(
            self.out,
            "    {} {} {} {} {} {} {}",
            fmt_number(key.time),
            fmt_value(key.value),
            key.in_tangent.wire_name(),
            key.out_tangent.wire_name(),
            key.tangent_lock as u8,
            key.weight_lock as u8,
            key.breakdown as u8,
        );
        for fixed in [&key.in_fixed, &key.out_fixed].into_iter().flatten() {
            let _ = write!(self.out, " {} {}", fmt_number(fixed.angle), fmt_number(fixed.weight));
        }
        self.out.push_str(";\n");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Channel, FixedTangent, Keyframe, PropertyKind, TangentType};

    #[test]
    fn test_fmt_number_drops_redundant_fraction() {
        assert_eq!(fmt_number(1.0), "1");
        assert_eq!(fmt_number(1.5), "1.5");
        assert_eq!(fmt_number(-0.25), "-0.25");
        assert_eq!(fmt_number(1.23456789), "1.234568");
    }

    #[test]
    fn test_fmt_value_six_decimals() {
        assert_eq!(fmt_value(45.0), "45.000000");
        assert_eq!(fmt_value(-0.5), "-0.500000");
    }

    #[test]
    fn test_write_header_statements() {
        let header = AnimHeader {
            app_version: "3.4.0".to_string(),
            time_unit: crate::util::TimeUnit::Ntsc,
            start: 0,
            end: 30,
            ..Default::default()
        };
        let mut w = Writer::new();
        w.write_header(&header);
        let text = w.finish();
        assert!(text.contains("animVersion 1.1;\n"));
        assert!(text.contains("timeUnit ntsc;\n"));
        assert!(text.contains("linearUnit cm;\n"));
        assert!(text.contains("angularUnit deg;\n"));
        assert!(text.contains("startTime 0;\n"));
        assert!(text.contains("endTime 30;\n"));
    }

    #[test]
    fn test_write_channel_block() {
        let mut ch = Channel::new(PropertyKind::Location, 0);
        ch.keys.push(Keyframe::simple(0.0, 0.0));
        ch.keys.push(Keyframe::simple(10.0, 5.0));

        let mut w = Writer::new();
        w.write_channel("Root", 2, 0, &ch);
        let text = w.finish();
        assert!(text.starts_with("anim translate.translateX translateX Root 0 2 0;\n"));
        assert!(text.contains("  input time;\n"));
        assert!(text.contains("  output linear;\n"));
        assert!(text.contains("    0 0.000000 auto auto 1 0 0;\n"));
        assert!(text.contains("    10 5.000000 auto auto 1 0 0;\n"));
    }

    #[test]
    fn test_write_key_with_fixed_pairs() {
        let mut ch = Channel::new(PropertyKind::RotationEuler, 1);
        ch.keys.push(Keyframe {
            in_tangent: TangentType::Fixed,
            out_tangent: TangentType::Fixed,
            in_fixed: Some(FixedTangent { angle: 15.0, weight: 2.0 }),
            out_fixed: Some(FixedTangent { angle: -10.0, weight: 1.5 }),
            ..Keyframe::simple(0.0, 45.0)
        });
        let mut w = Writer::new();
        w.write_channel("Root", 0, 0, &ch);
        let text = w.finish();
        assert!(text.contains("    0 45.000000 fixed fixed 1 0 0 15 2 -10 1.5;\n"));
        assert!(text.contains("anim rotate.rotateY rotateY Root 0 0 0;\n"));
    }
}
