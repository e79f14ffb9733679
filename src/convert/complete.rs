//! Channel completion: synthesize missing sibling channels so a property
//! group always carries its full component set before space conversion.

use tracing::debug;

use crate::model::{Channel, Keyframe, PropertyKind};

/// Identity value of one component: unauthored channels hold the rest
/// pose, which is zero everywhere except a quaternion's scalar part.
fn identity_value(kind: PropertyKind, component: usize) -> f64 {
    if kind == PropertyKind::RotationQuaternion && component == 0 {
        1.0
    } else {
        0.0
    }
}

/// Fill in the missing components of a partially-keyed group.
///
/// Synthesized channels clone the first channel's settings and hold one
/// auto/auto key at `first_frame` with the identity value. Groups that
/// are already full are returned unchanged, which also makes the
/// operation idempotent. Empty groups are left alone; there is no first
/// frame to synthesize from, and callers skip them entirely.
pub fn complete_group(group: &mut Vec<Channel>, first_frame: f64) {
    let Some(first) = group.first() else { return };
    let kind = first.kind;
    let settings = first.settings.clone();
    let Some(expected) = kind.component_count() else { return };
    if group.len() >= expected {
        return;
    }

    for component in 0..expected {
        if group.iter().any(|c| c.component == component) {
            continue;
        }
        debug!(?kind, component, first_frame, "synthesizing missing channel");
        let mut channel = Channel::new(kind, component);
        channel.settings = settings.clone();
        channel.keys.push(Keyframe::simple(first_frame, identity_value(kind, component)));
        group.push(channel);
    }
    group.sort_by_key(|c| c.component);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyed_channel(kind: PropertyKind, component: usize, keys: &[(f64, f64)]) -> Channel {
        let mut ch = Channel::new(kind, component);
        ch.keys = keys.iter().map(|&(t, v)| Keyframe::simple(t, v)).collect();
        ch
    }

    #[test]
    fn test_partial_location_group() {
        // only X keyed: 0 -> 0.0, 10 -> 5.0
        let mut group = vec![keyed_channel(
            PropertyKind::Location,
            0,
            &[(0.0, 0.0), (10.0, 5.0)],
        )];
        complete_group(&mut group, 0.0);

        assert_eq!(group.len(), 3);
        for (i, ch) in group.iter().enumerate() {
            assert_eq!(ch.component, i);
        }
        for ch in &group[1..] {
            assert_eq!(ch.keys.len(), 1);
            assert_eq!(ch.keys[0].time, 0.0);
            assert_eq!(ch.keys[0].value, 0.0);
        }
        assert_eq!(group[0].keys.len(), 2);
    }

    #[test]
    fn test_quaternion_identity() {
        let mut group = vec![keyed_channel(
            PropertyKind::RotationQuaternion,
            2,
            &[(5.0, 0.7)],
        )];
        complete_group(&mut group, 5.0);

        assert_eq!(group.len(), 4);
        assert_eq!(group[0].component, 0);
        assert_eq!(group[0].keys[0].value, 1.0);
        assert_eq!(group[1].keys[0].value, 0.0);
        assert_eq!(group[3].keys[0].value, 0.0);
        // the keyed channel survived untouched
        assert_eq!(group[2].keys[0].value, 0.7);
    }

    #[test]
    fn test_synthesized_channels_share_settings() {
        let mut seed = keyed_channel(PropertyKind::Location, 0, &[(1.0, 2.0)]);
        seed.settings.pre_infinity = crate::model::Infinity::Cycle;
        let mut group = vec![seed];
        complete_group(&mut group, 1.0);

        assert_eq!(group.len(), 3);
        for ch in &group[1..] {
            assert_eq!(ch.settings.pre_infinity, crate::model::Infinity::Cycle);
            assert_eq!(ch.keys[0].time, 1.0);
        }
    }

    #[test]
    fn test_idempotent() {
        let mut group = vec![keyed_channel(PropertyKind::Location, 1, &[(2.0, 3.0)])];
        complete_group(&mut group, 2.0);
        let once = group.clone();
        complete_group(&mut group, 2.0);
        assert_eq!(group, once);
    }

    #[test]
    fn test_full_group_unchanged() {
        let mut group = vec![
            keyed_channel(PropertyKind::Scale, 0, &[(0.0, 1.0)]),
            keyed_channel(PropertyKind::Scale, 1, &[(0.0, 1.0)]),
            keyed_channel(PropertyKind::Scale, 2, &[(0.0, 1.0)]),
        ];
        let before = group.clone();
        complete_group(&mut group, 0.0);
        assert_eq!(group, before);
    }

    #[test]
    fn test_empty_group_skipped() {
        let mut group: Vec<Channel> = Vec::new();
        complete_group(&mut group, 0.0);
        assert!(group.is_empty());
    }
}
