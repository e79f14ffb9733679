//! Space conversion engine: re-express a full channel group's per-frame
//! values under a different parent transform.
//!
//! The engine works on one property group at a time. It first snapshots
//! one component vector per distinct keyed frame from the original curve
//! data, then writes converted values back; reading and writing never
//! interleave, so evaluating channel Y at a frame can not observe a
//! half-converted channel X. Euler output is filtered for rotation
//! continuity and therefore processed strictly in increasing frame
//! order.

use smallvec::SmallVec;
use tracing::warn;

use crate::convert::{euler_to_quat, quat_to_euler_with_reference};
use crate::model::{Channel, ChannelSettings, Keyframe, PropertyKind};
use crate::util::{DMat4, DQuat, DVec3};

/// Sample a channel at an arbitrary time. The default implementation
/// linearly interpolates between neighboring keys; hosts with richer
/// curve evaluation substitute their own.
pub trait CurveEval {
    fn evaluate(&self, channel: &Channel, time: f64) -> f64;
}

/// Neighbor-key linear interpolation via [`Channel::sample`].
#[derive(Clone, Copy, Debug, Default)]
pub struct LinearEval;

impl CurveEval for LinearEval {
    fn evaluate(&self, channel: &Channel, time: f64) -> f64 {
        channel.sample(time)
    }
}

/// What a node is in the host scene. Joints get the global scale applied
/// to their translations; plain objects do not.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Object,
    Joint,
}

/// A node's rest-pose transform relative to its parent. Nodes without a
/// parent carry the world/armature matrix instead. Computed once per
/// node per conversion pass and discarded afterwards.
#[derive(Clone, Copy, Debug)]
pub struct NodeSpace {
    pub kind: NodeKind,
    pub rest_matrix: DMat4,
}

impl NodeSpace {
    pub fn object(rest_matrix: DMat4) -> Self {
        Self { kind: NodeKind::Object, rest_matrix }
    }

    pub fn joint(rest_matrix: DMat4) -> Self {
        Self { kind: NodeKind::Joint, rest_matrix }
    }
}

/// Conversion direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Compose with the parent space (export: local, rest-relative
    /// values become posed parent-space values).
    ToParent,
    /// Compose with the inverted parent space (import).
    ToLocal,
}

/// One node's conversion pass.
pub struct SpaceConversion {
    matrix: DMat4,
    rotation: DQuat,
    global_scale: f64,
    joint: bool,
}

impl SpaceConversion {
    pub fn new(space: &NodeSpace, direction: Direction, global_scale: f64) -> Self {
        let matrix = match direction {
            Direction::ToParent => space.rest_matrix,
            Direction::ToLocal => space.rest_matrix.inverse(),
        };
        let (_, rotation, _) = matrix.to_scale_rotation_translation();
        Self {
            matrix,
            rotation,
            global_scale,
            joint: space.kind == NodeKind::Joint,
        }
    }

    /// Convert a group in place. Scale and custom groups pass through
    /// untouched (parent-scale composition is intentionally not
    /// supported); rotation groups come out as Euler XYZ, with a
    /// quaternion group truncated to its three Euler channels.
    pub fn apply<E: CurveEval>(&self, group: &mut Vec<Channel>, eval: &E) {
        let Some(first) = group.first() else { return };
        match first.kind {
            PropertyKind::Location => self.rebase_location(group, eval),
            PropertyKind::RotationEuler | PropertyKind::RotationQuaternion => {
                self.rebase_rotation(group, eval)
            }
            PropertyKind::Scale | PropertyKind::Custom => {}
        }
    }

    fn rebase_location<E: CurveEval>(&self, group: &mut [Channel], eval: &E) {
        if group.len() != 3 {
            warn!(channels = group.len(), "location group not completed, skipping conversion");
            return;
        }
        let frames = keyed_frames(group);
        let snapshot = gather(group, &frames, eval);

        for (frame, values) in frames.iter().zip(&snapshot) {
            let mut v = DVec3::new(values[0], values[1], values[2]);
            if self.joint {
                v *= self.global_scale;
            }
            let v = self.matrix.transform_point3(v);
            scatter(group, *frame, &[v.x, v.y, v.z]);
        }
    }

    fn rebase_rotation<E: CurveEval>(&self, group: &mut Vec<Channel>, eval: &E) {
        let quaternion = group[0].kind == PropertyKind::RotationQuaternion;
        let expected = if quaternion { 4 } else { 3 };
        if group.len() != expected {
            warn!(channels = group.len(), "rotation group not completed, skipping conversion");
            return;
        }
        let frames = keyed_frames(group);
        let snapshot = gather(group, &frames, eval);

        // sequential: each frame's Euler seeds the next one's branch choice
        let mut reference: Option<DVec3> = None;
        let mut eulers = Vec::with_capacity(frames.len());
        for values in &snapshot {
            let source = if quaternion {
                DQuat::from_xyzw(values[1], values[2], values[3], values[0])
            } else {
                euler_to_quat(DVec3::new(values[0], values[1], values[2]))
            };
            let composed = self.rotation * source;
            let euler = quat_to_euler_with_reference(composed, reference);
            reference = Some(euler);
            eulers.push(euler);
        }

        for (frame, euler) in frames.iter().zip(&eulers) {
            scatter(&mut group[..3], *frame, &[euler.x, euler.y, euler.z]);
        }

        // the format carries rotations as Euler XYZ; drop the scalar
        // channel and relabel the rest
        if quaternion {
            group.truncate(3);
            for channel in group.iter_mut() {
                channel.kind = PropertyKind::RotationEuler;
            }
        }
    }
}

/// Union of keyed frame times across a group, ascending, deduplicated.
pub fn keyed_frames(group: &[Channel]) -> Vec<f64> {
    let mut frames: Vec<f64> = group
        .iter()
        .flat_map(|c| c.keys.iter().map(|k| k.time))
        .collect();
    frames.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    frames.dedup();
    frames
}

/// Snapshot one component vector per frame from the original curves.
/// Exact keys win; anything else is evaluated.
fn gather<E: CurveEval>(
    group: &[Channel],
    frames: &[f64],
    eval: &E,
) -> Vec<SmallVec<[f64; 4]>> {
    frames
        .iter()
        .map(|&frame| {
            group
                .iter()
                .map(|channel| match channel.key_at(frame) {
                    Some(key) => key.value,
                    None => eval.evaluate(channel, frame),
                })
                .collect()
        })
        .collect()
}

/// Write converted component values back. A channel without a key at the
/// frame gets a fresh auto/auto key inserted in time order: baking, and
/// an intentional increase in curve density. Overwritten keys keep their
/// tangent shape because fixed tangents are stored relative to the key.
fn scatter(group: &mut [Channel], frame: f64, values: &[f64]) {
    for (channel, &value) in group.iter_mut().zip(values) {
        if let Some(key) = channel.keys.iter_mut().find(|k| k.time == frame) {
            key.value = value;
        } else {
            let at = channel
                .keys
                .iter()
                .position(|k| k.time > frame)
                .unwrap_or(channel.keys.len());
            channel.keys.insert(at, Keyframe::simple(frame, value));
        }
    }
}

/// Build a quaternion channel group from a converted Euler group, one
/// simple key per frame. Import-side helper for hosts whose target
/// rotation representation is quaternion.
pub fn euler_group_to_quaternion<E: CurveEval>(group: &[Channel], eval: &E) -> Vec<Channel> {
    let settings = group
        .first()
        .map(|c| c.settings.clone())
        .unwrap_or_else(ChannelSettings::default);
    let mut out: Vec<Channel> = (0..4)
        .map(|component| {
            let mut ch = Channel::new(PropertyKind::RotationQuaternion, component);
            ch.settings = settings.clone();
            ch
        })
        .collect();

    for frame in keyed_frames(group) {
        let euler = DVec3::new(
            value_at(&group[0], frame, eval),
            value_at(&group[1], frame, eval),
            value_at(&group[2], frame, eval),
        );
        let q = euler_to_quat(euler);
        for (channel, value) in out.iter_mut().zip([q.w, q.x, q.y, q.z]) {
            channel.keys.push(Keyframe::simple(frame, value));
        }
    }
    out
}

fn value_at<E: CurveEval>(channel: &Channel, frame: f64, eval: &E) -> f64 {
    match channel.key_at(frame) {
        Some(key) => key.value,
        None => eval.evaluate(channel, frame),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::complete_group;

    fn location_group(keys: &[&[(f64, f64)]]) -> Vec<Channel> {
        keys.iter()
            .enumerate()
            .map(|(i, ks)| {
                let mut ch = Channel::new(PropertyKind::Location, i);
                ch.keys = ks.iter().map(|&(t, v)| Keyframe::simple(t, v)).collect();
                ch
            })
            .collect()
    }

    #[test]
    fn test_translation_composition() {
        let parent = DMat4::from_translation(DVec3::new(1.0, 2.0, 3.0));
        let space = NodeSpace::object(parent);
        let conv = SpaceConversion::new(&space, Direction::ToParent, 1.0);

        let mut group = location_group(&[
            &[(0.0, 1.0)],
            &[(0.0, 0.0)],
            &[(0.0, 0.0)],
        ]);
        conv.apply(&mut group, &LinearEval);
        assert_eq!(group[0].keys[0].value, 2.0);
        assert_eq!(group[1].keys[0].value, 2.0);
        assert_eq!(group[2].keys[0].value, 3.0);
    }

    #[test]
    fn test_translation_roundtrip() {
        let parent = DMat4::from_scale_rotation_translation(
            DVec3::ONE,
            euler_to_quat(DVec3::new(0.3, -0.4, 0.9)),
            DVec3::new(2.0, -1.0, 5.0),
        );
        let space = NodeSpace::joint(parent);
        let original = [(0.0, 1.5), (10.0, -2.0)];

        let mut group = location_group(&[
            &original,
            &[(0.0, 0.5), (10.0, 0.5)],
            &[(0.0, -4.0), (10.0, 3.0)],
        ]);
        let before = group.clone();

        SpaceConversion::new(&space, Direction::ToParent, 1.0).apply(&mut group, &LinearEval);
        SpaceConversion::new(&space, Direction::ToLocal, 1.0).apply(&mut group, &LinearEval);

        for (a, b) in group.iter().zip(&before) {
            for (ka, kb) in a.keys.iter().zip(&b.keys) {
                assert!((ka.value - kb.value).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_joint_global_scale() {
        let space = NodeSpace::joint(DMat4::IDENTITY);
        let conv = SpaceConversion::new(&space, Direction::ToParent, 100.0);
        let mut group = location_group(&[&[(0.0, 0.1)], &[(0.0, 0.0)], &[(0.0, 0.0)]]);
        conv.apply(&mut group, &LinearEval);
        assert!((group[0].keys[0].value - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_object_ignores_global_scale() {
        let space = NodeSpace::object(DMat4::IDENTITY);
        let conv = SpaceConversion::new(&space, Direction::ToParent, 100.0);
        let mut group = location_group(&[&[(0.0, 0.1)], &[(0.0, 0.0)], &[(0.0, 0.0)]]);
        conv.apply(&mut group, &LinearEval);
        assert!((group[0].keys[0].value - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_missing_key_is_baked() {
        let space = NodeSpace::object(DMat4::from_translation(DVec3::new(1.0, 0.0, 0.0)));
        let conv = SpaceConversion::new(&space, Direction::ToParent, 1.0);
        // y channel has no key at frame 10; conversion must insert one
        let mut group = location_group(&[
            &[(0.0, 0.0), (10.0, 4.0)],
            &[(0.0, 2.0)],
            &[(0.0, 0.0), (10.0, 0.0)],
        ]);
        conv.apply(&mut group, &LinearEval);
        assert_eq!(group[1].keys.len(), 2);
        assert_eq!(group[1].keys[1].time, 10.0);
        assert!((group[1].keys[1].value - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_two_pass_snapshot_before_write() {
        // a parent translation along x must not leak into values gathered
        // for later frames through evaluation of already-written keys
        let space = NodeSpace::object(DMat4::from_translation(DVec3::new(5.0, 0.0, 0.0)));
        let conv = SpaceConversion::new(&space, Direction::ToParent, 1.0);
        let mut group = location_group(&[
            &[(0.0, 1.0)],
            &[(0.0, 0.0), (10.0, 0.0)],
            &[(0.0, 0.0), (10.0, 0.0)],
        ]);
        conv.apply(&mut group, &LinearEval);
        // x at frame 10 evaluates the *original* constant 1.0, not the
        // already converted 6.0
        let x = &group[0];
        assert_eq!(x.keys.len(), 2);
        assert!((x.keys[1].value - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_scale_group_untouched() {
        let space = NodeSpace::object(DMat4::from_translation(DVec3::new(5.0, 5.0, 5.0)));
        let conv = SpaceConversion::new(&space, Direction::ToParent, 1.0);
        let mut group: Vec<Channel> = (0..3)
            .map(|i| {
                let mut ch = Channel::new(PropertyKind::Scale, i);
                ch.keys.push(Keyframe::simple(0.0, 2.0));
                ch
            })
            .collect();
        let before = group.clone();
        conv.apply(&mut group, &LinearEval);
        assert_eq!(group, before);
    }

    #[test]
    fn test_rotation_roundtrip() {
        let parent_rot = euler_to_quat(DVec3::new(0.2, 0.7, -0.1));
        let space = NodeSpace::joint(DMat4::from_quat(parent_rot));

        let source = [
            DVec3::new(0.1, 0.0, 0.0),
            DVec3::new(0.3, 0.2, -0.4),
            DVec3::new(0.5, 0.4, -0.8),
        ];
        let mut group: Vec<Channel> = (0..3)
            .map(|i| {
                let mut ch = Channel::new(PropertyKind::RotationEuler, i);
                for (f, e) in source.iter().enumerate() {
                    ch.keys.push(Keyframe::simple(f as f64 * 5.0, e[i]));
                }
                ch
            })
            .collect();

        SpaceConversion::new(&space, Direction::ToParent, 1.0).apply(&mut group, &LinearEval);
        SpaceConversion::new(&space, Direction::ToLocal, 1.0).apply(&mut group, &LinearEval);

        for (f, e) in source.iter().enumerate() {
            // equivalent rotation, branch may differ
            let a = euler_to_quat(DVec3::new(
                group[0].keys[f].value,
                group[1].keys[f].value,
                group[2].keys[f].value,
            ));
            let b = euler_to_quat(*e);
            assert!(a.dot(b).abs() > 1.0 - 1e-9, "frame {f}");
        }
    }

    #[test]
    fn test_quaternion_group_becomes_euler() {
        let space = NodeSpace::joint(DMat4::IDENTITY);
        let q = euler_to_quat(DVec3::new(0.4, -0.2, 0.9));
        let mut group: Vec<Channel> = [q.w, q.x, q.y, q.z]
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                let mut ch = Channel::new(PropertyKind::RotationQuaternion, i);
                ch.keys.push(Keyframe::simple(0.0, v));
                ch
            })
            .collect();

        SpaceConversion::new(&space, Direction::ToParent, 1.0).apply(&mut group, &LinearEval);
        assert_eq!(group.len(), 3);
        assert!(group.iter().all(|c| c.kind == PropertyKind::RotationEuler));
        let euler = DVec3::new(
            group[0].keys[0].value,
            group[1].keys[0].value,
            group[2].keys[0].value,
        );
        assert!(euler_to_quat(euler).dot(q).abs() > 1.0 - 1e-9);
    }

    #[test]
    fn test_incomplete_group_completed_then_converted() {
        let space = NodeSpace::object(DMat4::from_translation(DVec3::new(0.0, 1.0, 0.0)));
        let mut group = location_group(&[&[(0.0, 3.0)]]);
        complete_group(&mut group, 0.0);
        SpaceConversion::new(&space, Direction::ToParent, 1.0).apply(&mut group, &LinearEval);
        assert_eq!(group[1].keys[0].value, 1.0);
    }
}
