//! Generic dual-tree branch-and-bound traversal for exact pairwise-point
//! computations.
//!
//! The engine recurses simultaneously over a query tree and a reference
//! tree, pruning subtree pairs that provably cannot affect the result. What
//! "affect the result" means is owned by a pluggable [`DualTreeRule`]; the
//! trees are anything implementing [`SpatialTree`].
//!
//! ```rust
//! use dualtree::{DualTreeRule, DualTreeTraverser, ExplicitNode, Score, SpatialTree};
//!
//! // Count pairs of 1-D points within distance 1.5 of each other.
//! struct ClosePairs {
//!     coords: Vec<f64>,
//!     pairs: usize,
//! }
//!
//! impl DualTreeRule<ExplicitNode> for ClosePairs {
//!     fn base_case(&mut self, q: usize, r: usize) -> f64 {
//!         let d = (self.coords[q] - self.coords[r]).abs();
//!         if d <= 1.5 {
//!             self.pairs += 1;
//!         }
//!         d
//!     }
//!
//!     fn score(&mut self, q: &ExplicitNode, r: &ExplicitNode, base: Option<f64>) -> Score {
//!         let center = base
//!             .unwrap_or_else(|| (self.coords[q.point()] - self.coords[r.point()]).abs());
//!         let lower =
//!             center - q.furthest_descendant_distance() - r.furthest_descendant_distance();
//!         if lower > 1.5 {
//!             Score::Prune
//!         } else {
//!             Score::Priority(lower.max(0.0))
//!         }
//!     }
//!
//!     fn rescore(&mut self, q: &ExplicitNode, r: &ExplicitNode, _old: f64) -> Score {
//!         self.score(q, r, None)
//!     }
//! }
//!
//! // Points 0.0, 1.0, 10.0 under one root.
//! let tree = ExplicitNode::new(0, 4, 10.0, vec![
//!     ExplicitNode::leaf(0),
//!     ExplicitNode::leaf(1),
//!     ExplicitNode::leaf(2),
//! ])?;
//!
//! let rule = ClosePairs { coords: vec![0.0, 1.0, 10.0], pairs: 0 };
//! let mut traverser = DualTreeTraverser::new(rule);
//! traverser.traverse(&tree, &tree);
//!
//! // (0,0), (0,1), (1,0), (1,1), (2,2); the far pairs were pruned.
//! assert_eq!(traverser.rule().pairs, 5);
//! assert!(traverser.num_prunes() > 0);
//! # Ok::<(), dualtree::TraversalError>(())
//! ```

pub mod config;
pub mod counters;
pub mod error;
pub mod metric;
pub mod node;
pub mod rule;
pub mod traverse;
pub mod tree;

pub use config::TraversalConfig;
pub use counters::PruneCounters;
pub use error::{Result, TraversalError};
pub use metric::{DistanceMetric, Metric, distance_between};
pub use node::ExplicitNode;
pub use rule::{DualTreeRule, Score, SingleTreeRule};
pub use traverse::{DualTreeTraverser, SingleTreeTraverser};
pub use tree::{ChildRef, LEAF_SCALE, SpatialTree};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{DualTreeRule, DualTreeTraverser, Score, SingleTreeRule, SingleTreeTraverser};

    pub use crate::{ChildRef, ExplicitNode, LEAF_SCALE, SpatialTree};

    pub use crate::{DistanceMetric, Metric, distance_between};

    pub use crate::{PruneCounters, Result, TraversalConfig, TraversalError};
}
