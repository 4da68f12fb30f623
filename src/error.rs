//! Error types for the traversal engine.
//!
//! Traversal itself is pure computation and raises no recoverable errors;
//! everything here comes from assembly-time validation of explicit nodes.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TraversalError>;

/// Errors produced while assembling an explicit tree node.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TraversalError {
    /// A child's scale must be strictly below its parent's.
    #[error("child scale {child} is not strictly below parent scale {parent}")]
    ScaleOrder { parent: i32, child: i32 },

    /// Child 0 of a scale-hierarchy node must share the parent's point.
    #[error("self-child point {child} does not match parent point {parent}")]
    SelfChildMismatch { parent: usize, child: usize },

    /// Leaves are terminal by definition.
    #[error("leaf node for point {0} cannot carry children")]
    LeafWithChildren(usize),

    /// A node above the leaf sentinel must cover at least its own point.
    #[error("node for point {point} at scale {scale} has no children")]
    ChildlessInternal { point: usize, scale: i32 },

    /// Bounding radii must be finite and non-negative.
    #[error("bound must be finite and non-negative, got {0}")]
    InvalidBound(f64),
}
