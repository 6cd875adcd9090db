//! Parent/child resolution and paint ordering.
//!
//! The builder turns a flat list of object records into a rooted tree
//! stored in an arena, in pre-order. Every node gets a world transform and
//! a [`DepthKey`]; keys of distinct nodes never compare equal.
//!
//! # Example
//!
//! ```ignore
//! let tree = HierarchyBuilder::new().build(&contents.records)?;
//! for node in tree.iter() {
//!     println!("{}{}", "  ".repeat(node.depth.level()), node.name);
//! }
//! ```

pub mod depth;
mod node;

use std::collections::HashMap;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::container::{NodeId, ObjectRecord};
use crate::error::{CharexError, Result};
use crate::types::Transform2D;

pub use depth::{DepthKey, DepthStep};
pub use node::HierarchyNode;

/// Name given to the synthesized grouping root.
pub const IMPLICIT_ROOT_NAME: &str = "<root>";

/// What to do when several records have no parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RootPolicy {
    /// Group all parentless records under an implicit root (id 0).
    #[default]
    Synthesize,
    /// Fail with `MultipleRoots`.
    RequireSingle,
}

/// A resolved, immutable tree.
#[derive(Debug)]
pub struct Hierarchy {
    /// Nodes in pre-order; `nodes[0]` is the root.
    nodes: Vec<HierarchyNode>,
    index: HashMap<NodeId, usize>,
}

impl Hierarchy {
    pub fn root(&self) -> &HierarchyNode {
        &self.nodes[0]
    }

    pub fn get(&self, id: NodeId) -> Option<&HierarchyNode> {
        self.index.get(&id).map(|&i| &self.nodes[i])
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.index.contains_key(&id)
    }

    /// Nodes in pre-order.
    pub fn iter(&self) -> impl Iterator<Item = &HierarchyNode> {
        self.nodes.iter()
    }

    /// Children of a node, in order. Empty for unknown ids.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = &HierarchyNode> {
        self.get(id)
            .map(|n| n.children.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(|c| self.get(*c))
    }

    /// Walk from a node up to the root, starting with the node itself.
    pub fn ancestry(&self, id: NodeId) -> Ancestry<'_> {
        Ancestry {
            tree: self,
            next: self.get(id),
        }
    }

    /// Top-level units: the implicit root's children, or the single root.
    pub fn units(&self) -> Vec<NodeId> {
        let root = self.root();
        if root.implicit {
            root.children.clone()
        } else {
            vec![root.id]
        }
    }

    /// Whether the root was synthesized.
    pub fn has_implicit_root(&self) -> bool {
        self.root().implicit
    }

    pub fn depth_key(&self, id: NodeId) -> Option<&DepthKey> {
        self.get(id).map(|n| &n.depth)
    }

    pub fn world(&self, id: NodeId) -> Option<Transform2D> {
        self.get(id).map(|n| n.world)
    }

    /// Number of nodes, including an implicit root.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when no record was placed (only the implicit root exists).
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1 && self.nodes[0].implicit
    }
}

/// Iterator returned by [`Hierarchy::ancestry`].
pub struct Ancestry<'a> {
    tree: &'a Hierarchy,
    next: Option<&'a HierarchyNode>,
}

impl<'a> Iterator for Ancestry<'a> {
    type Item = &'a HierarchyNode;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.parent.and_then(|p| self.tree.get(p));
        Some(current)
    }
}

/// Builds a [`Hierarchy`] from object records.
#[derive(Debug, Clone, Default)]
pub struct HierarchyBuilder {
    policy: RootPolicy,
}

/// Arena slot being placed during the walk.
#[derive(Clone, Copy)]
enum Slot {
    Implicit,
    Record(usize),
}

#[derive(Clone, Copy, PartialEq)]
enum Mark {
    Unvisited,
    OnPath,
    Done,
}

impl HierarchyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn policy(mut self, policy: RootPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Resolve parents, check the structure, and assign keys.
    pub fn build(&self, records: &[ObjectRecord]) -> Result<Hierarchy> {
        let index = index_records(records)?;

        // Record index -> parent record index.
        let mut parents: Vec<Option<usize>> = Vec::with_capacity(records.len());
        for record in records {
            let parent = match record.parent {
                Some(p) => Some(*index.get(&p).ok_or(CharexError::DanglingParentReference {
                    node: record.id,
                    parent: p,
                })?),
                None => None,
            };
            parents.push(parent);
        }

        check_cycles(records, &parents)?;

        let mut children: Vec<Vec<usize>> = vec![Vec::new(); records.len()];
        let mut roots = Vec::new();
        for (i, parent) in parents.iter().enumerate() {
            match parent {
                Some(p) => children[*p].push(i),
                None => roots.push(i),
            }
        }
        let by_sibling = |&i: &usize| (records[i].sibling_index, i);
        for list in &mut children {
            list.sort_by_key(by_sibling);
        }
        roots.sort_by_key(by_sibling);

        let (root, top) = if roots.len() == 1 {
            (Slot::Record(roots[0]), Vec::new())
        } else if roots.len() > 1 && self.policy == RootPolicy::RequireSingle {
            return Err(CharexError::MultipleRoots {
                roots: roots.iter().map(|&i| records[i].id).collect(),
            });
        } else {
            (Slot::Implicit, roots)
        };

        let nodes = place(records, &children, root, top);
        debug!(
            "hierarchy: {} nodes, {}",
            nodes.len(),
            if nodes[0].implicit { "implicit root" } else { "single root" }
        );

        let index = nodes.iter().enumerate().map(|(i, n)| (n.id, i)).collect();
        Ok(Hierarchy { nodes, index })
    }
}

fn index_records(records: &[ObjectRecord]) -> Result<HashMap<NodeId, usize>> {
    let mut index = HashMap::with_capacity(records.len());
    for (i, record) in records.iter().enumerate() {
        if record.id.is_none() {
            return Err(CharexError::CorruptContainer {
                offset: record.offset,
                message: format!("record '{}' uses the reserved id 0", record.name),
                help: None,
            });
        }
        if let Some(first) = index.insert(record.id, i) {
            return Err(CharexError::CorruptContainer {
                offset: record.offset,
                message: format!(
                    "records '{}' and '{}' share id {}",
                    records[first].name, record.name, record.id
                ),
                help: Some("Record ids must be unique within a container".to_string()),
            });
        }
    }
    Ok(index)
}

/// Follow every parent chain once, marking nodes on the current path.
/// Reaching a node already on the path closes a cycle.
fn check_cycles(records: &[ObjectRecord], parents: &[Option<usize>]) -> Result<()> {
    let mut marks = vec![Mark::Unvisited; records.len()];
    let mut path: Vec<usize> = Vec::new();

    for start in 0..records.len() {
        path.clear();
        let mut current = Some(start);

        while let Some(i) = current {
            match marks[i] {
                Mark::Done => break,
                Mark::OnPath => {
                    let from = path.iter().position(|&p| p == i).unwrap_or(0);
                    let mut cycle: Vec<NodeId> = path[from..].iter().map(|&p| records[p].id).collect();
                    cycle.push(records[i].id);
                    return Err(CharexError::CycleDetected { cycle });
                }
                Mark::Unvisited => {
                    marks[i] = Mark::OnPath;
                    path.push(i);
                    current = parents[i];
                }
            }
        }

        for &i in &path {
            marks[i] = Mark::Done;
        }
    }

    Ok(())
}

/// Pre-order walk with an explicit stack, building the node arena.
fn place(records: &[ObjectRecord], children: &[Vec<usize>], root: Slot, top: Vec<usize>) -> Vec<HierarchyNode> {
    let mut nodes: Vec<HierarchyNode> = Vec::with_capacity(records.len() + 1);
    let mut stack: Vec<(Slot, Option<usize>)> = vec![(root, None)];

    while let Some((slot, parent_pos)) = stack.pop() {
        let preorder = nodes.len() as u32;
        let mut node = match slot {
            Slot::Implicit => HierarchyNode {
                id: NodeId::NONE,
                name: IMPLICIT_ROOT_NAME.to_string(),
                parent: None,
                children: top.iter().map(|&i| records[i].id).collect(),
                local: Transform2D::IDENTITY,
                world: Transform2D::IDENTITY,
                sibling_index: 0,
                sorting_order: 0,
                has_sprite: false,
                active: true,
                depth: DepthKey { layer: 0, path: Vec::new() },
                preorder,
                implicit: true,
            },
            Slot::Record(i) => {
                let record = &records[i];
                HierarchyNode {
                    id: record.id,
                    name: record.name.clone(),
                    parent: None,
                    children: children[i].iter().map(|&c| records[c].id).collect(),
                    local: record.transform,
                    world: record.transform,
                    sibling_index: record.sibling_index,
                    sorting_order: record.sorting_order,
                    has_sprite: record.sprite.is_some(),
                    active: record.active,
                    depth: DepthKey { layer: record.sorting_order, path: Vec::new() },
                    preorder,
                    implicit: false,
                }
            }
        };

        if let Some(p) = parent_pos {
            let parent = &nodes[p];
            node.parent = Some(parent.id);
            node.world = node.local.under(&parent.world);
            node.depth.path = parent.depth.path.clone();
        }
        node.depth.path.push(DepthStep {
            sibling: node.sibling_index,
            preorder,
        });

        let pos = nodes.len();
        nodes.push(node);

        let kids = match slot {
            Slot::Implicit => top.as_slice(),
            Slot::Record(i) => children[i].as_slice(),
        };
        for &child in kids.iter().rev() {
            stack.push((Slot::Record(child), Some(pos)));
        }
    }

    nodes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Rect, Vec2};
    use pretty_assertions::assert_eq;

    fn names(tree: &Hierarchy) -> Vec<&str> {
        tree.iter().map(|n| n.name.as_str()).collect()
    }

    fn character() -> Vec<ObjectRecord> {
        vec![
            ObjectRecord::new(3, "Cheek").with_parent(2).with_order(2),
            ObjectRecord::new(1, "Body").with_sprite(1, Rect::default()),
            ObjectRecord::new(2, "Face").with_parent(1).with_order(1).at(0.0, 0.5),
            ObjectRecord::new(4, "Hair").with_parent(1).with_sibling_index(1),
        ]
    }

    #[test]
    fn test_single_root_is_kept() {
        let tree = HierarchyBuilder::new().build(&character()).unwrap();
        assert_eq!(tree.root().id, NodeId(1));
        assert!(!tree.has_implicit_root());
        assert_eq!(names(&tree), vec!["Body", "Face", "Cheek", "Hair"]);
        assert_eq!(tree.units(), vec![NodeId(1)]);
        assert!(tree.get(NodeId(1)).unwrap().has_sprite);
    }

    #[test]
    fn test_children_ordered_by_sibling_index_then_container_order() {
        let records = vec![
            ObjectRecord::new(1, "Root"),
            ObjectRecord::new(2, "B").with_parent(1).with_sibling_index(1),
            ObjectRecord::new(3, "A").with_parent(1).with_sibling_index(0),
            ObjectRecord::new(4, "C").with_parent(1).with_sibling_index(1),
        ];
        let tree = HierarchyBuilder::new().build(&records).unwrap();
        let kids: Vec<_> = tree.children(NodeId(1)).map(|n| n.name.as_str()).collect();
        assert_eq!(kids, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_world_transform_accumulates() {
        let mut records = vec![
            ObjectRecord::new(1, "Body").at(1.0, 1.0),
            ObjectRecord::new(2, "Face").with_parent(1).at(0.0, 0.5),
        ];
        records[0].transform.scale = Vec2::new(2.0, 2.0);

        let tree = HierarchyBuilder::new().build(&records).unwrap();
        let face = tree.world(NodeId(2)).unwrap();
        assert_eq!(face.position, Vec2::new(1.0, 2.0));
        assert_eq!(face.scale, Vec2::new(2.0, 2.0));
    }

    #[test]
    fn test_parent_chains_terminate_at_root() {
        let tree = HierarchyBuilder::new().build(&character()).unwrap();
        for node in tree.iter() {
            let chain: Vec<_> = tree.ancestry(node.id).collect();
            assert!(chain.len() <= tree.len());
            assert_eq!(chain.last().unwrap().id, tree.root().id);
        }
    }

    #[test]
    fn test_depth_keys_are_strict_total_order() {
        let mut records = character();
        records.push(ObjectRecord::new(5, "Eye").with_parent(2).with_order(2));
        records.push(ObjectRecord::new(6, "Other").with_parent(2).with_order(2));
        let tree = HierarchyBuilder::new().build(&records).unwrap();

        let keys: Vec<_> = tree.iter().map(|n| n.depth.clone()).collect();
        for a in &keys {
            for b in &keys {
                if std::ptr::eq(a, b) {
                    continue;
                }
                assert!((a < b) ^ (b < a), "{} vs {}", a, b);
            }
        }

        let mut sorted = keys.clone();
        sorted.sort();
        for w in sorted.windows(2) {
            assert!(w[0] < w[1]);
        }
    }

    #[test]
    fn test_descendant_after_ancestor_on_same_layer() {
        let records = vec![
            ObjectRecord::new(1, "Body"),
            ObjectRecord::new(2, "Face").with_parent(1),
            ObjectRecord::new(3, "Cheek").with_parent(2),
        ];
        let tree = HierarchyBuilder::new().build(&records).unwrap();
        let body = tree.depth_key(NodeId(1)).unwrap();
        let face = tree.depth_key(NodeId(2)).unwrap();
        let cheek = tree.depth_key(NodeId(3)).unwrap();
        assert!(body < face && face < cheek);
    }

    #[test]
    fn test_dangling_parent() {
        let records = vec![
            ObjectRecord::new(1, "Body"),
            ObjectRecord::new(2, "Face").with_parent(9),
        ];
        let err = HierarchyBuilder::new().build(&records).unwrap_err();
        assert!(matches!(
            err,
            CharexError::DanglingParentReference { node: NodeId(2), parent: NodeId(9) }
        ));
    }

    #[test]
    fn test_cycle_detected() {
        let records = vec![
            ObjectRecord::new(1, "Root"),
            ObjectRecord::new(2, "A").with_parent(3),
            ObjectRecord::new(3, "B").with_parent(4),
            ObjectRecord::new(4, "C").with_parent(2),
        ];
        match HierarchyBuilder::new().build(&records).unwrap_err() {
            CharexError::CycleDetected { cycle } => {
                assert_eq!(cycle, vec![NodeId(2), NodeId(3), NodeId(4), NodeId(2)]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_self_parent_is_cycle() {
        let records = vec![ObjectRecord::new(1, "Loop").with_parent(1)];
        let err = HierarchyBuilder::new().build(&records).unwrap_err();
        assert!(matches!(err, CharexError::CycleDetected { ref cycle } if cycle.len() == 2));
    }

    #[test]
    fn test_multiple_roots_synthesized() {
        let records = vec![
            ObjectRecord::new(1, "Hero"),
            ObjectRecord::new(2, "Hero Arm").with_parent(1),
            ObjectRecord::new(3, "Pet"),
        ];
        let tree = HierarchyBuilder::new().build(&records).unwrap();
        assert!(tree.has_implicit_root());
        assert_eq!(tree.root().id, NodeId::NONE);
        assert_eq!(tree.root().name, IMPLICIT_ROOT_NAME);
        assert_eq!(tree.units(), vec![NodeId(1), NodeId(3)]);
        assert_eq!(tree.get(NodeId(3)).unwrap().parent, Some(NodeId::NONE));
    }

    #[test]
    fn test_multiple_roots_rejected_when_required() {
        let records = vec![ObjectRecord::new(1, "Hero"), ObjectRecord::new(3, "Pet")];
        let err = HierarchyBuilder::new()
            .policy(RootPolicy::RequireSingle)
            .build(&records)
            .unwrap_err();
        match err {
            CharexError::MultipleRoots { roots } => assert_eq!(roots, vec![NodeId(1), NodeId(3)]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_duplicate_ids_are_corrupt() {
        let records = vec![ObjectRecord::new(1, "A"), ObjectRecord::new(1, "B")];
        let err = HierarchyBuilder::new().build(&records).unwrap_err();
        // Hand-built records have no byte position to point at.
        assert!(matches!(err, CharexError::CorruptContainer { offset: None, .. }));
        assert_eq!(err.to_string(), "Corrupt container: records 'A' and 'B' share id #1");

        let mut second = ObjectRecord::new(1, "B");
        second.offset = Some(77);
        let records = vec![ObjectRecord::new(1, "A"), second];
        let err = HierarchyBuilder::new().build(&records).unwrap_err();
        assert!(matches!(err, CharexError::CorruptContainer { offset: Some(77), .. }));
    }

    #[test]
    fn test_empty_records() {
        let tree = HierarchyBuilder::new()
            .policy(RootPolicy::RequireSingle)
            .build(&[])
            .unwrap();
        assert!(tree.is_empty());
        assert_eq!(tree.len(), 1);
        assert!(tree.units().is_empty());
    }

    #[test]
    fn test_root_policy_from_yaml() {
        let policy: RootPolicy = serde_yaml::from_str("require-single").unwrap();
        assert_eq!(policy, RootPolicy::RequireSingle);
    }
}
