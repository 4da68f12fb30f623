//! The pluggable scoring policy that drives pruning.
//!
//! A rule owns everything algorithm-specific: the bound arithmetic that
//! decides what can be pruned, the metric it was constructed with, and the
//! result structures it accumulates into. The traversers only orchestrate
//! which pairs the rule gets to see.

use crate::tree::SpatialTree;

/// Outcome of scoring a (query, reference) pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Score {
    /// Keep recursing, with the given priority. Lower values are more
    /// promising and are expanded first.
    Priority(f64),
    /// The reference subtree provably cannot affect the result for this
    /// query node; it is dropped along with all of its descendants.
    Prune,
}

impl Score {
    /// Whether this outcome excludes the subtree.
    pub fn is_prune(&self) -> bool {
        matches!(self, Score::Prune)
    }

    /// The priority, if the pair survived.
    pub fn priority(&self) -> Option<f64> {
        match self {
            Score::Priority(priority) => Some(*priority),
            Score::Prune => None,
        }
    }
}

/// Scoring policy for dual-tree traversal.
///
/// Prune decisions must be stable: a pair pruned at one level must never
/// need reconsideration deeper in the same query subtree. The engine relies
/// on this and never re-adds pruned work. Priorities must be orderable;
/// returning NaN is a contract violation caught only by debug assertions.
pub trait DualTreeRule<T: SpatialTree> {
    /// Evaluate the pairwise contribution of one query point and one
    /// reference point, updating any rule-owned results as a side effect.
    ///
    /// Must be idempotent: the engine reuses cached evaluations wherever
    /// the pair ids allow (on scale-hierarchy trees, always), but the
    /// contract permits repeats.
    fn base_case(&mut self, query_index: usize, reference_index: usize) -> f64;

    /// Score `reference` against `query`.
    ///
    /// `base_case` is `Some` exactly when the engine holds a cached
    /// base-case value for this pair of representative points; rules use it
    /// to skip recomputing the point-point distance. With `None` the rule
    /// must fall back to bound geometry, which is what lets it prune a
    /// reference child before that child's base case is ever evaluated.
    fn score(&mut self, query: &T, reference: &T, base_case: Option<f64>) -> Score;

    /// Revisit a previously computed score after the query side changed or
    /// rule state tightened, without redoing full geometry when avoidable.
    fn rescore(&mut self, query: &T, reference: &T, old_score: f64) -> Score;
}

/// Scoring policy for single-tree traversal: one fixed query point against
/// a reference tree. Same contract as [`DualTreeRule`], with the query side
/// reduced to a point id.
pub trait SingleTreeRule<T: SpatialTree> {
    /// See [`DualTreeRule::base_case`].
    fn base_case(&mut self, query_index: usize, reference_index: usize) -> f64;

    /// Score `reference` against the fixed query point. `base_case` carries
    /// the cached pairwise value when the engine already holds one.
    fn score_point(&mut self, query_index: usize, reference: &T, base_case: Option<f64>)
    -> Score;

    /// Revisit a candidate's score after rule state tightened.
    fn rescore_point(&mut self, query_index: usize, reference: &T, old_score: f64) -> Score;
}
