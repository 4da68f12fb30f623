//! Caller-assembled tree nodes.
//!
//! [`ExplicitNode`] is the crate's concrete [`SpatialTree`]: a
//! scale-hierarchy node whose shape is handed in by the caller and validated
//! on assembly. There is deliberately no construction from raw point data:
//! splitting heuristics and node layout belong to the tree structures this
//! engine consumes, not to the engine itself.

use crate::error::{Result, TraversalError};
use crate::tree::{ChildRef, LEAF_SCALE, SpatialTree};

/// One node of an explicitly assembled scale-hierarchy tree.
///
/// Invariants, checked by [`ExplicitNode::new`]:
/// - children sit at strictly smaller scales than their parent;
/// - child 0 shares the parent's representative point (the self-child);
/// - leaves carry no children, non-leaves carry at least one;
/// - the bound is finite and non-negative.
#[derive(Debug, Clone)]
pub struct ExplicitNode {
    point: usize,
    scale: i32,
    bound: f64,
    children: Vec<ExplicitNode>,
}

impl ExplicitNode {
    /// A terminal node covering exactly its own point.
    pub fn leaf(point: usize) -> Self {
        Self {
            point,
            scale: LEAF_SCALE,
            bound: 0.0,
            children: Vec::new(),
        }
    }

    /// Assemble a node, validating the scale-hierarchy invariants.
    ///
    /// `bound` is the furthest-descendant distance: an upper bound on the
    /// distance from `point` to any point covered by this subtree, under
    /// whatever metric the caller's rules will use.
    pub fn new(point: usize, scale: i32, bound: f64, children: Vec<ExplicitNode>) -> Result<Self> {
        if !bound.is_finite() || bound < 0.0 {
            return Err(TraversalError::InvalidBound(bound));
        }

        if scale == LEAF_SCALE {
            if !children.is_empty() {
                return Err(TraversalError::LeafWithChildren(point));
            }
        } else {
            let first = children
                .first()
                .ok_or(TraversalError::ChildlessInternal { point, scale })?;
            if first.point != point {
                return Err(TraversalError::SelfChildMismatch {
                    parent: point,
                    child: first.point,
                });
            }
            for child in &children {
                if child.scale >= scale {
                    return Err(TraversalError::ScaleOrder {
                        parent: scale,
                        child: child.scale,
                    });
                }
            }
        }

        Ok(Self {
            point,
            scale,
            bound,
            children,
        })
    }

    /// The validated bound handed in at assembly.
    pub fn bound(&self) -> f64 {
        self.bound
    }

    /// The children, in stored order (self-child first for non-leaves).
    pub fn children(&self) -> &[ExplicitNode] {
        &self.children
    }

    /// Number of nodes in this subtree, including this one.
    pub fn subtree_len(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(ExplicitNode::subtree_len)
            .sum::<usize>()
    }
}

impl SpatialTree for ExplicitNode {
    fn point(&self) -> usize {
        self.point
    }

    fn scale(&self) -> i32 {
        self.scale
    }

    fn num_children(&self) -> usize {
        self.children.len()
    }

    fn child(&self, index: usize) -> ChildRef<'_, Self> {
        let child = &self.children[index];
        if index == 0 && child.point == self.point {
            ChildRef::SelfChild(child)
        } else {
            ChildRef::Other(child)
        }
    }

    fn furthest_descendant_distance(&self) -> f64 {
        self.bound
    }
}
