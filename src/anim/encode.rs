//! Whole-document encoding: header validation, per-node channel
//! preparation (completion, space baking, unit conversion) and emission
//! through the grammar writer.

use std::path::Path;

use tracing::{debug, warn};

use crate::convert::{complete_group, Direction, LinearEval, NodeSpace, SpaceConversion};
use crate::model::{AnimDocument, Channel, PropertyGroups, PropertyKind};
use crate::text::Writer;
use crate::util::{Error, OutputUnit, Result, UnitContext};

use super::{sanitize_name, SanitizePolicy};

/// Options for one encode pass.
#[derive(Clone, Debug)]
pub struct EncodeOptions {
    /// Units stamped into the header and targeted by value conversion.
    pub units: UnitContext,
    /// Extra factor applied to joint translations while baking.
    pub global_scale: f64,
    /// Re-express transform channels in parent space before writing.
    /// Requires one [`NodeSpace`] per document node.
    pub bake_transforms: bool,
    /// Treat channel values as native (meters and radians) and convert
    /// them into the document units. Disable when re-encoding a decoded
    /// document, whose values already carry document units.
    pub convert_units: bool,
    pub sanitize: SanitizePolicy,
    /// Keep only keys inside this frame range.
    pub time_range: Option<(f64, f64)>,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            units: UnitContext::default(),
            global_scale: 1.0,
            bake_transforms: false,
            convert_units: true,
            sanitize: SanitizePolicy::default(),
            time_range: None,
        }
    }
}

/// Encode a document to text.
///
/// `spaces` is consulted only when `bake_transforms` is set, in which
/// case it must carry one entry per node, in node order.
pub fn encode(doc: &AnimDocument, spaces: &[NodeSpace], options: &EncodeOptions) -> Result<String> {
    let mut header = doc.header.clone();
    header.time_unit = options.units.time;
    header.linear_unit = options.units.linear;
    header.angular_unit = options.units.angular;
    header.validate()?;
    if options.bake_transforms && spaces.len() != doc.nodes.len() {
        return Err(Error::NodeSpaceMismatch {
            nodes: doc.nodes.len(),
            spaces: spaces.len(),
        });
    }

    let mut writer = Writer::new();
    writer.write_header(&header);

    for (i, node) in doc.nodes.iter().enumerate() {
        let name = sanitize_name(&node.name, options.sanitize);
        if node.groups.is_empty() {
            // present but unanimated: bare line keeps the hierarchy
            // bookkeeping of readers consistent
            writer.write_node_line(&name, node.children);
            continue;
        }
        debug!(node = %name, channels = node.groups.channel_count(), "encoding node");

        let mut groups = node.groups.clone();
        if !groups.rotation_euler.is_empty() && !groups.rotation_quaternion.is_empty() {
            warn!(node = %node.name, "both rotation representations present, keeping euler");
            groups.rotation_quaternion.clear();
        }

        for kind in PropertyGroups::KINDS {
            let group = groups.get_mut(kind);
            if group.is_empty() {
                continue;
            }
            if kind.is_transform() && options.bake_transforms {
                complete_group(group, header.start as f64);
                SpaceConversion::new(&spaces[i], Direction::ToParent, options.global_scale)
                    .apply(group, &LinearEval);
            }
            group.sort_by_key(|c| c.component);
            for channel in group.iter_mut() {
                finalize_channel(channel, options);
            }
        }

        // channels can lose every key to the time range; a node with no
        // keyed channel left degrades to the bare structural line
        if groups.iter().all(|(_, g)| g.iter().all(|c| c.keys.is_empty())) {
            writer.write_node_line(&name, node.children);
            continue;
        }

        let mut curve_index = 0usize;
        for (_, group) in groups.iter() {
            for channel in group {
                if channel.keys.is_empty() {
                    continue;
                }
                writer.write_channel(&name, node.children, curve_index, channel);
                curve_index += 1;
            }
        }
    }

    Ok(writer.finish())
}

/// Encode and write to a file.
pub fn encode_to_file(
    doc: &AnimDocument,
    spaces: &[NodeSpace],
    options: &EncodeOptions,
    path: impl AsRef<Path>,
) -> Result<()> {
    let text = encode(doc, spaces, options)?;
    std::fs::write(path, text)?;
    Ok(())
}

fn finalize_channel(channel: &mut Channel, options: &EncodeOptions) {
    if let Some((start, end)) = options.time_range {
        channel.keys.retain(|k| k.time >= start && k.time <= end);
    }
    // scale stays unitless regardless of what its settings claim
    if options.convert_units && channel.kind != PropertyKind::Scale {
        match channel.settings.output {
            OutputUnit::Linear => {
                for key in &mut channel.keys {
                    key.value = options.units.linear_to_document(key.value);
                }
            }
            OutputUnit::Angular => {
                for key in &mut channel.keys {
                    key.value = options.units.angular_to_document(key.value);
                }
            }
            OutputUnit::Time | OutputUnit::Unitless => {}
        }
    }
    // the statement is present exactly when some key needs it
    channel.settings.tangent_angle_unit =
        channel.has_fixed_tangents().then_some(options.units.angular);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnimNode, FixedTangent, Keyframe, TangentType};
    use crate::util::DMat4;

    fn keyed_channel(kind: PropertyKind, component: usize, keys: &[(f64, f64)]) -> Channel {
        let mut ch = Channel::new(kind, component);
        ch.keys = keys.iter().map(|&(t, v)| Keyframe::simple(t, v)).collect();
        ch
    }

    fn doc_with(nodes: Vec<AnimNode>) -> AnimDocument {
        let mut doc = AnimDocument::default();
        doc.header.end = 30;
        doc.nodes = nodes;
        doc
    }

    #[test]
    fn test_bare_node_line() {
        let doc = doc_with(vec![AnimNode::new("Hips", 3)]);
        let text = encode(&doc, &[], &EncodeOptions::default()).unwrap();
        assert!(text.contains("anim Hips 0 3 0;\n"));
    }

    #[test]
    fn test_invalid_range_rejected() {
        let mut doc = doc_with(vec![]);
        doc.header.start = 10;
        doc.header.end = 5;
        assert!(matches!(
            encode(&doc, &[], &EncodeOptions::default()),
            Err(Error::InvalidHeader(_))
        ));
    }

    #[test]
    fn test_space_count_mismatch() {
        let doc = doc_with(vec![AnimNode::new("a", 0), AnimNode::new("b", 0)]);
        let options = EncodeOptions { bake_transforms: true, ..Default::default() };
        let spaces = [NodeSpace::object(DMat4::IDENTITY)];
        assert!(matches!(
            encode(&doc, &spaces, &options),
            Err(Error::NodeSpaceMismatch { nodes: 2, spaces: 1 })
        ));
    }

    #[test]
    fn test_mixed_rotation_keeps_euler() {
        let mut node = AnimNode::new("Root", 0);
        node.groups.rotation_euler = vec![
            keyed_channel(PropertyKind::RotationEuler, 0, &[(0.0, 0.5)]),
            keyed_channel(PropertyKind::RotationEuler, 1, &[(0.0, 0.0)]),
            keyed_channel(PropertyKind::RotationEuler, 2, &[(0.0, 0.0)]),
        ];
        node.groups.rotation_quaternion =
            vec![keyed_channel(PropertyKind::RotationQuaternion, 0, &[(0.0, 1.0)])];
        let doc = doc_with(vec![node]);

        let text = encode(&doc, &[], &EncodeOptions::default()).unwrap();
        assert!(!text.contains("rotateW"));
        assert_eq!(text.matches("anim rotate.rotate").count(), 3);
    }

    #[test]
    fn test_unit_conversion_on_values() {
        let mut node = AnimNode::new("Root", 0);
        node.groups.location = vec![
            keyed_channel(PropertyKind::Location, 0, &[(0.0, 1.0)]),
            keyed_channel(PropertyKind::Location, 1, &[(0.0, 0.0)]),
            keyed_channel(PropertyKind::Location, 2, &[(0.0, 0.0)]),
        ];
        node.groups.rotation_euler = vec![
            keyed_channel(PropertyKind::RotationEuler, 0, &[(0.0, std::f64::consts::PI)]),
            keyed_channel(PropertyKind::RotationEuler, 1, &[(0.0, 0.0)]),
            keyed_channel(PropertyKind::RotationEuler, 2, &[(0.0, 0.0)]),
        ];
        let doc = doc_with(vec![node]);

        // defaults: centimeters and degrees
        let text = encode(&doc, &[], &EncodeOptions::default()).unwrap();
        assert!(text.contains("0 100.000000 auto auto"), "{text}");
        assert!(text.contains("0 180.000000 auto auto"), "{text}");
    }

    #[test]
    fn test_scale_exempt_from_unit_conversion() {
        let mut node = AnimNode::new("Root", 0);
        node.groups.scale = vec![
            keyed_channel(PropertyKind::Scale, 0, &[(0.0, 2.0)]),
            keyed_channel(PropertyKind::Scale, 1, &[(0.0, 2.0)]),
            keyed_channel(PropertyKind::Scale, 2, &[(0.0, 2.0)]),
        ];
        let doc = doc_with(vec![node]);
        let text = encode(&doc, &[], &EncodeOptions::default()).unwrap();
        assert!(text.contains("0 2.000000 auto auto"), "{text}");
    }

    #[test]
    fn test_tangent_angle_unit_only_with_fixed() {
        let mut node = AnimNode::new("Root", 0);
        let mut fixed = keyed_channel(PropertyKind::Location, 0, &[]);
        fixed.keys.push(Keyframe {
            out_tangent: TangentType::Fixed,
            out_fixed: Some(FixedTangent { angle: 10.0, weight: 1.0 }),
            ..Keyframe::simple(0.0, 0.0)
        });
        node.groups.location = vec![
            fixed,
            keyed_channel(PropertyKind::Location, 1, &[(0.0, 0.0)]),
            keyed_channel(PropertyKind::Location, 2, &[(0.0, 0.0)]),
        ];
        let doc = doc_with(vec![node]);
        let text = encode(&doc, &[], &EncodeOptions::default()).unwrap();
        assert_eq!(text.matches("tangentAngleUnit deg;").count(), 1);
    }

    #[test]
    fn test_time_range_filter() {
        let mut node = AnimNode::new("Root", 0);
        node.groups.custom =
            vec![keyed_channel(PropertyKind::Custom, 0, &[(0.0, 1.0), (50.0, 2.0)])];
        node.groups.custom[0].custom_attr = Some("visibility".to_string());
        let doc = doc_with(vec![node]);

        let options = EncodeOptions { time_range: Some((0.0, 30.0)), ..Default::default() };
        let text = encode(&doc, &[], &options).unwrap();
        assert!(text.contains("anim visibility visibility Root 0 0 0;\n"));
        assert!(text.contains("    0 1.000000"));
        assert!(!text.contains("    50 "));
    }

    #[test]
    fn test_keyless_node_degrades_to_bare_line() {
        let mut node = AnimNode::new("Root", 0);
        node.groups.custom =
            vec![keyed_channel(PropertyKind::Custom, 0, &[(50.0, 2.0)])];
        node.groups.custom[0].custom_attr = Some("visibility".to_string());
        let doc = doc_with(vec![node]);

        let options = EncodeOptions { time_range: Some((0.0, 30.0)), ..Default::default() };
        let text = encode(&doc, &[], &options).unwrap();
        assert!(!text.contains("visibility"), "{text}");
        assert!(!text.contains("animData"), "{text}");
        assert!(text.contains("anim Root 0 0 0;\n"));
    }

    #[test]
    fn test_keyless_channel_skipped_but_siblings_written() {
        let mut node = AnimNode::new("Root", 0);
        node.groups.location = vec![
            keyed_channel(PropertyKind::Location, 0, &[(0.0, 1.0)]),
            keyed_channel(PropertyKind::Location, 1, &[]),
            keyed_channel(PropertyKind::Location, 2, &[(0.0, 3.0)]),
        ];
        let doc = doc_with(vec![node]);

        let text = encode(&doc, &[], &EncodeOptions::default()).unwrap();
        assert!(text.contains("anim translate.translateX translateX Root 0 0 0;\n"));
        assert!(!text.contains("translateY"));
        // the channel index stays contiguous over what is written
        assert!(text.contains("anim translate.translateZ translateZ Root 0 0 1;\n"));
    }

    #[test]
    fn test_baking_uses_node_space() {
        let mut node = AnimNode::new("Root", 0);
        node.groups.location =
            vec![keyed_channel(PropertyKind::Location, 0, &[(0.0, 1.0)])];
        let doc = doc_with(vec![node]);

        let spaces = [NodeSpace::object(DMat4::from_translation(
            crate::util::DVec3::new(0.0, 2.0, 0.0),
        ))];
        let options = EncodeOptions {
            bake_transforms: true,
            convert_units: false,
            ..Default::default()
        };
        let text = encode(&doc, &spaces, &options).unwrap();
        // completion synthesized Y and Z, baking moved Y by the parent offset
        assert!(text.contains("anim translate.translateY"));
        assert!(text.contains("0 2.000000 auto auto"), "{text}");
    }
}
