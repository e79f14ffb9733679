//! Whole-document decoding: declaration dispatch, channel
//! classification, best-effort recovery from structural damage, and the
//! import-side transform pipeline.

use std::path::Path;

use tracing::warn;

use crate::convert::{
    complete_group, euler_group_to_quaternion, Direction, LinearEval, NodeSpace, SpaceConversion,
};
use crate::model::{
    split_attr, AnimDocument, AnimNode, Channel, PropertyGroups, PropertyKind,
};
use crate::text::{clean_line, AnimDecl, Reader};
use crate::util::{Error, OutputUnit, Result, UnitContext};

/// Where and why a decode stopped early.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodeAbort {
    pub line: usize,
    pub reason: String,
}

/// Bookkeeping from one decode pass. A non-empty report never implies an
/// empty result: everything read before the abort point is kept.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DecodeReport {
    /// Malformed floats replaced by NaN.
    pub nan_substitutions: usize,
    /// Set when structural damage cut the decode short.
    pub abort: Option<DecodeAbort>,
}

impl DecodeReport {
    /// True when the document was read without substitutions or aborts.
    pub fn is_clean(&self) -> bool {
        self.nan_substitutions == 0 && self.abort.is_none()
    }
}

/// A decoded document plus its report.
#[derive(Clone, Debug)]
pub struct AnimDecode {
    pub document: AnimDocument,
    pub report: DecodeReport,
}

/// Channel declaration waiting for its `animData` block.
struct PendingChannel {
    node: usize,
    attr: String,
}

/// Decode a document from text.
///
/// Values stay in the units the header declares; see
/// [`apply_import_transforms`] for conversion into native units and
/// node-local space. Structural damage aborts the remainder of the file
/// but returns everything decoded so far; unknown enum keywords and I/O
/// failures are fatal.
///
/// Declarations accumulate: an `animData` block binds to the most
/// recent channel declaration, a declaration without one yields no
/// channel, and repeat declarations for a node name merge into the
/// existing node.
pub fn decode(text: &str) -> Result<AnimDecode> {
    let mut reader = Reader::new(text);
    let header = reader.read_header()?;
    let mut nodes: Vec<AnimNode> = Vec::new();
    let mut abort = None;
    let mut pending: Option<PendingChannel> = None;

    while let Some(raw) = reader.peek() {
        let clean = clean_line(raw);
        if clean.is_empty() {
            reader.next_line();
            continue;
        }

        if clean == "animData {" {
            let Some(decl) = pending.take() else {
                abort = Some(DecodeAbort {
                    line: reader.line_number() + 1,
                    reason: "animData block without a channel declaration".to_string(),
                });
                break;
            };
            let (settings, keys) = match reader.read_anim_data() {
                Ok(v) => v,
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    abort =
                        Some(DecodeAbort { line: reader.line_number(), reason: e.to_string() });
                    break;
                }
            };

            let (kind, component, custom_attr) =
                classify_attr(&decl.attr, &nodes[decl.node].groups);
            let mut channel = Channel::new(kind, component);
            channel.custom_attr = custom_attr;
            channel.settings = settings;
            channel.keys = keys;
            nodes[decl.node].groups.get_mut(kind).push(channel);
            continue;
        }

        let decl = match reader.read_anim_decl() {
            Ok(decl) => decl,
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                abort = Some(DecodeAbort { line: reader.line_number(), reason: e.to_string() });
                break;
            }
        };
        if let Some(dropped) = pending.take() {
            warn!(attr = %dropped.attr, "channel declaration without animData dropped");
        }
        match decl {
            AnimDecl::Node { name, children } => {
                node_index(&mut nodes, &name, children);
            }
            AnimDecl::Channel { attr, node, children, index: _ } => {
                let node = node_index(&mut nodes, &node, children);
                pending = Some(PendingChannel { node, attr });
            }
        }
    }
    if let Some(dropped) = pending.take() {
        warn!(attr = %dropped.attr, "channel declaration without animData dropped");
    }

    let report = DecodeReport { nan_substitutions: reader.nan_substitutions(), abort };
    Ok(AnimDecode { document: AnimDocument { header, nodes }, report })
}

/// Index of the node with this name, creating it on first sight.
/// Declarations for one node need not be contiguous.
fn node_index(nodes: &mut Vec<AnimNode>, name: &str, children: u32) -> usize {
    match nodes.iter().position(|n| n.name == name) {
        Some(i) => i,
        None => {
            nodes.push(AnimNode::new(name, children));
            nodes.len() - 1
        }
    }
}

/// Decode a document from a file.
pub fn decode_file(path: impl AsRef<Path>) -> Result<AnimDecode> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Error::FileNotFound(path.to_path_buf()),
        _ => Error::Io(e),
    })?;
    decode(&text)
}

/// Map a declaration attribute onto a property kind and component.
///
/// `rotate` is ambiguous between the two rotation representations: a
/// `W` component always means quaternion, and once the quaternion group
/// exists (writers emit `W` first) the remaining letters follow it.
fn classify_attr(attr: &str, groups: &PropertyGroups) -> (PropertyKind, usize, Option<String>) {
    let (base, letter) = split_attr(attr);
    match (base, letter) {
        ("translate", Some(l)) => (PropertyKind::Location, component_from(l, b'X'), None),
        ("scale", Some(l)) => (PropertyKind::Scale, component_from(l, b'X'), None),
        ("rotate", Some('W')) => (PropertyKind::RotationQuaternion, 0, None),
        ("rotate", Some(l)) => {
            if groups.rotation_quaternion.is_empty() {
                (PropertyKind::RotationEuler, component_from(l, b'X'), None)
            } else {
                (PropertyKind::RotationQuaternion, component_from(l, b'X') + 1, None)
            }
        }
        _ => (PropertyKind::Custom, groups.custom.len(), Some(attr.to_string())),
    }
}

fn component_from(letter: char, base: u8) -> usize {
    (letter as u8).saturating_sub(base) as usize
}

/// Options for [`apply_import_transforms`].
#[derive(Clone, Copy, Debug)]
pub struct ImportOptions {
    /// Inverse of the export-time factor on joint translations.
    pub global_scale: f64,
    /// The host applies an axis-conversion matrix; implies linear unit
    /// conversion so the matrix sees metric values.
    pub axis_transform: bool,
    /// Convert linear values into meters even without an axis transform.
    pub apply_unit_linear: bool,
    /// Shift all key times by this many frames.
    pub anim_offset: f64,
    /// Materialize rotation as a quaternion group for hosts whose target
    /// rotation representation is quaternion.
    pub quaternion_target: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            global_scale: 1.0,
            axis_transform: false,
            apply_unit_linear: false,
            anim_offset: 0.0,
            quaternion_target: false,
        }
    }
}

/// Convert one decoded node into native units and node-local space.
///
/// Angular values always become radians. Linear values become meters
/// only when an axis transform or explicit linear conversion is
/// requested; scale is never converted. Transform groups are completed
/// and rebased through the inverse of `space`.
pub fn apply_import_transforms(
    node: &mut AnimNode,
    space: &NodeSpace,
    units: &UnitContext,
    options: &ImportOptions,
) {
    if !node.groups.rotation_euler.is_empty() && !node.groups.rotation_quaternion.is_empty() {
        warn!(node = %node.name, "both rotation representations present, keeping euler");
        node.groups.rotation_quaternion.clear();
    }

    let convert_linear = options.axis_transform || options.apply_unit_linear;
    for kind in PropertyGroups::KINDS {
        let group = node.groups.get_mut(kind);
        for channel in group.iter_mut() {
            match channel.settings.output {
                OutputUnit::Angular => {
                    for key in &mut channel.keys {
                        key.value = units.angular_to_native(key.value);
                    }
                }
                OutputUnit::Linear if convert_linear && kind != PropertyKind::Scale => {
                    for key in &mut channel.keys {
                        key.value = units.linear_to_native(key.value);
                    }
                }
                _ => {}
            }
        }

        if kind.is_transform() && !group.is_empty() {
            let first = group
                .iter()
                .filter_map(|c| c.keys.first())
                .map(|k| k.time)
                .fold(f64::INFINITY, f64::min);
            complete_group(group, if first.is_finite() { first } else { 0.0 });
            SpaceConversion::new(space, Direction::ToLocal, options.global_scale)
                .apply(group, &LinearEval);
        }
    }

    if options.quaternion_target && !node.groups.rotation_euler.is_empty() {
        node.groups.rotation_quaternion =
            euler_group_to_quaternion(&node.groups.rotation_euler, &LinearEval);
        node.groups.rotation_euler.clear();
    }

    if options.anim_offset != 0.0 {
        for kind in PropertyGroups::KINDS {
            for channel in node.groups.get_mut(kind) {
                for key in &mut channel.keys {
                    key.time += options.anim_offset;
                }
            }
        }
    }
}
