//! Tree node type.

use crate::container::NodeId;
use crate::types::Transform2D;

use super::depth::DepthKey;

/// One node of the resolved tree.
#[derive(Debug, Clone)]
pub struct HierarchyNode {
    pub id: NodeId,
    pub name: String,
    /// `None` only for the root.
    pub parent: Option<NodeId>,
    /// Children in paint-relevant order (sibling index, then container order).
    pub children: Vec<NodeId>,
    /// Transform relative to the parent.
    pub local: Transform2D,
    /// Transform accumulated from the root.
    pub world: Transform2D,
    pub sibling_index: u32,
    pub sorting_order: i32,
    pub has_sprite: bool,
    pub active: bool,
    pub depth: DepthKey,
    /// Position in a pre-order walk of the tree.
    pub preorder: u32,
    /// True for the grouping root added when a container holds several units.
    pub implicit: bool,
}
