//! Traversal engines.
//!
//! Two drivers over the same rule machinery: [`SingleTreeTraverser`] fixes
//! one query point against a reference tree, [`DualTreeTraverser`] recurses
//! over a query tree and a reference tree simultaneously. Both own their
//! rule and their prune counters; all per-call state lives and dies inside
//! one `traverse` invocation.

use std::collections::BTreeMap;

use smallvec::SmallVec;

mod dual;
mod single;

pub use dual::DualTreeTraverser;
pub use single::SingleTreeTraverser;

/// One pending reference candidate in a dual traversal.
///
/// Carries the point ids the cached base case was computed with so that
/// later frames can tell whether the value is still valid for them.
pub(crate) struct WorkItem<'r, T> {
    pub(crate) node: &'r T,
    pub(crate) score: f64,
    pub(crate) query_index: usize,
    pub(crate) reference_index: usize,
    pub(crate) base_case: f64,
}

impl<T> Clone for WorkItem<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for WorkItem<'_, T> {}

/// Candidates pending at one scale.
pub(crate) type Bucket<'r, T> = SmallVec<[WorkItem<'r, T>; 8]>;

/// The per-query-node working set: candidates bucketed by scale, drained
/// strictly from the highest scale down.
pub(crate) type ScaleMap<'r, T> = BTreeMap<i32, Bucket<'r, T>>;
