//! Depth-order keys.
//!
//! A key is the renderer layer followed by the path from the root down to a
//! node, one `(sibling index, pre-order position)` step per level. Keys sort
//! by layer, then by path. An ancestor's path is a prefix of its
//! descendants' paths and therefore sorts first.

use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;

/// One level of a depth path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct DepthStep {
    /// Explicit sibling order declared by the record.
    pub sibling: u32,
    /// Position of the node in a pre-order walk of the whole tree.
    pub preorder: u32,
}

/// Comparable paint-order key. Lower keys paint first (further back).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DepthKey {
    pub layer: i32,
    pub path: Vec<DepthStep>,
}

impl DepthKey {
    /// The same key with its layer replaced.
    pub fn with_layer(&self, layer: i32) -> DepthKey {
        DepthKey {
            layer,
            path: self.path.clone(),
        }
    }

    /// Distance from the root (the root is 0).
    pub fn level(&self) -> usize {
        self.path.len().saturating_sub(1)
    }
}

impl Ord for DepthKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.layer
            .cmp(&other.layer)
            .then_with(|| self.path.cmp(&other.path))
    }
}

impl PartialOrd for DepthKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for DepthKey {
    /// e.g. `2@0.0/1.3/0.4`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@", self.layer)?;
        for (i, step) in self.path.iter().enumerate() {
            if i > 0 {
                write!(f, "/")?;
            }
            write!(f, "{}.{}", step.sibling, step.preorder)?;
        }
        Ok(())
    }
}
