//! Documents: per-node property groups in hierarchy order.

use crate::model::{AnimHeader, Channel, PropertyKind};

/// The five per-node channel buckets.
///
/// At most one of the two rotation representations is written per node;
/// both may be populated after decoding files produced by other tools.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PropertyGroups {
    pub location: Vec<Channel>,
    pub rotation_euler: Vec<Channel>,
    pub rotation_quaternion: Vec<Channel>,
    pub scale: Vec<Channel>,
    pub custom: Vec<Channel>,
}

impl PropertyGroups {
    /// Bucket order used for emission.
    pub const KINDS: [PropertyKind; 5] = [
        PropertyKind::Location,
        PropertyKind::RotationEuler,
        PropertyKind::RotationQuaternion,
        PropertyKind::Scale,
        PropertyKind::Custom,
    ];

    pub fn get(&self, kind: PropertyKind) -> &Vec<Channel> {
        match kind {
            PropertyKind::Location => &self.location,
            PropertyKind::RotationEuler => &self.rotation_euler,
            PropertyKind::RotationQuaternion => &self.rotation_quaternion,
            PropertyKind::Scale => &self.scale,
            PropertyKind::Custom => &self.custom,
        }
    }

    pub fn get_mut(&mut self, kind: PropertyKind) -> &mut Vec<Channel> {
        match kind {
            PropertyKind::Location => &mut self.location,
            PropertyKind::RotationEuler => &mut self.rotation_euler,
            PropertyKind::RotationQuaternion => &mut self.rotation_quaternion,
            PropertyKind::Scale => &mut self.scale,
            PropertyKind::Custom => &mut self.custom,
        }
    }

    /// Iterate buckets in emission order.
    pub fn iter(&self) -> impl Iterator<Item = (PropertyKind, &Vec<Channel>)> {
        Self::KINDS.into_iter().map(move |k| (k, self.get(k)))
    }

    /// True when no bucket holds any channel.
    pub fn is_empty(&self) -> bool {
        self.iter().all(|(_, g)| g.is_empty())
    }

    /// Total number of channels across all buckets.
    pub fn channel_count(&self) -> usize {
        self.iter().map(|(_, g)| g.len()).sum()
    }
}

/// One node's worth of animation: identity plus channel groups.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnimNode {
    pub name: String,
    /// Child count used for structural hinting in the text form; the
    /// decoder reconstructs the hierarchy from emission order plus this.
    pub children: u32,
    pub groups: PropertyGroups,
}

impl AnimNode {
    pub fn new(name: impl Into<String>, children: u32) -> Self {
        Self { name: name.into(), children, groups: PropertyGroups::default() }
    }
}

/// A complete document: header plus nodes in hierarchy order
/// (parent before children).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnimDocument {
    pub header: AnimHeader,
    pub nodes: Vec<AnimNode>,
}

impl AnimDocument {
    pub fn find_node(&self, name: &str) -> Option<&AnimNode> {
        self.nodes.iter().find(|n| n.name == name)
    }
}

/// Reconstruct parent indices from emission order and per-node child
/// counts. The wire format carries structure only implicitly; this turns
/// it back into an explicit parent-indexed tree.
///
/// Pre-order walk with a stack of nodes still owed children. Nodes in
/// excess of every open child count become roots.
pub fn hierarchy_parents(nodes: &[AnimNode]) -> Vec<Option<usize>> {
    let mut parents = Vec::with_capacity(nodes.len());
    // (node index, children not yet claimed)
    let mut stack: Vec<(usize, u32)> = Vec::new();

    for (i, node) in nodes.iter().enumerate() {
        let mut parent = None;
        while let Some(top) = stack.last_mut() {
            if top.1 == 0 {
                stack.pop();
                continue;
            }
            top.1 -= 1;
            parent = Some(top.0);
            break;
        }
        parents.push(parent);
        stack.push((i, node.children));
    }
    parents
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(name: &str, children: u32) -> AnimNode {
        AnimNode::new(name, children)
    }

    #[test]
    fn test_hierarchy_flat() {
        let nodes = [node("a", 0), node("b", 0), node("c", 0)];
        assert_eq!(hierarchy_parents(&nodes), vec![None, None, None]);
    }

    #[test]
    fn test_hierarchy_chain() {
        let nodes = [node("root", 1), node("mid", 1), node("tip", 0)];
        assert_eq!(hierarchy_parents(&nodes), vec![None, Some(0), Some(1)]);
    }

    #[test]
    fn test_hierarchy_branching() {
        // root has two children; first child has one of its own.
        let nodes = [
            node("root", 2),
            node("arm", 1),
            node("hand", 0),
            node("leg", 0),
            node("loose", 0),
        ];
        assert_eq!(
            hierarchy_parents(&nodes),
            vec![None, Some(0), Some(1), Some(0), None]
        );
    }
}
