//! Dual-tree traversal with scale-ordered reference expansion.
//!
//! Each query-node visit operates on a working set of reference candidates
//! bucketed by scale. The visit proceeds in three phases:
//!
//! 1. **Reference recursion**: buckets above the query node's scale are
//!    drained from the highest scale down. Each surviving candidate is
//!    expanded: its children are scored individually and enqueued at their
//!    own scales. A drained scale is never revisited at this level.
//! 2. **Query descent**: once the reference side has caught up, the query
//!    node hands the working set to its children. Non-self children get a
//!    freshly filtered copy (a different query point can yield different
//!    bounds); the self-child shares the parent's representative point and
//!    takes over the parent's map in place, keeping its base-case cache.
//! 3. **Base-case floor**: when the query node is a leaf, everything left
//!    in the working set is a leaf too, and the remaining work is direct
//!    base-case evaluation, deduplicated against cached pairs.
//!
//! Pruning is all-or-nothing per reference subtree and must be stable (see
//! [`DualTreeRule`]); pruned work is never re-added. Base cases are cached
//! per candidate and re-evaluated only when the (query point, reference
//! point) pair actually changed. On scale-hierarchy trees, where a point is
//! shared only along a self-child chain, this means no pair is ever
//! evaluated twice in one traversal.

use crate::config::TraversalConfig;
use crate::counters::PruneCounters;
use crate::rule::{DualTreeRule, Score};
use crate::tree::{ChildRef, LEAF_SCALE, SpatialTree};

use super::{Bucket, ScaleMap, WorkItem};

/// Coordinated branch-and-bound recursion over a query tree and a
/// reference tree.
///
/// Binds one rule instance for its lifetime; results accumulate inside the
/// rule and are read back through [`rule`](DualTreeTraverser::rule) or
/// [`into_rule`](DualTreeTraverser::into_rule). A traverser may run many
/// traversals; counters accumulate across them until
/// [`reset`](PruneCounters::reset).
pub struct DualTreeTraverser<R> {
    rule: R,
    config: TraversalConfig,
    counters: PruneCounters,
}

impl<R> DualTreeTraverser<R> {
    /// Bind `rule` to a new traverser with the default configuration.
    pub fn new(rule: R) -> Self {
        Self::with_config(rule, TraversalConfig::default())
    }

    pub fn with_config(rule: R, config: TraversalConfig) -> Self {
        Self {
            rule,
            config,
            counters: PruneCounters::new(),
        }
    }

    pub fn rule(&self) -> &R {
        &self.rule
    }

    pub fn rule_mut(&mut self) -> &mut R {
        &mut self.rule
    }

    /// Consume the traverser and hand the rule (and its results) back.
    pub fn into_rule(self) -> R {
        self.rule
    }

    pub fn counters(&self) -> &PruneCounters {
        &self.counters
    }

    /// Clear the counters; whether and when to do this between traversals
    /// is the caller's choice.
    pub fn reset_counters(&mut self) {
        self.counters.reset();
    }

    /// Cumulative prune count across all traversals run so far.
    pub fn num_prunes(&self) -> u64 {
        self.counters.total()
    }

    /// Run a full traversal. Returns when every required base case has been
    /// evaluated or legitimately pruned.
    pub fn traverse<T>(&mut self, query_root: &T, reference_root: &T)
    where
        T: SpatialTree,
        R: DualTreeRule<T>,
    {
        let base_case = self
            .rule
            .base_case(query_root.point(), reference_root.point());

        let mut map = ScaleMap::new();
        map.entry(reference_root.scale()).or_default().push(WorkItem {
            node: reference_root,
            // The root pair is always recursed into.
            score: 0.0,
            query_index: query_root.point(),
            reference_index: reference_root.point(),
            base_case,
        });

        self.traverse_map(query_root, &mut map);
        log::debug!(
            "dual-tree traversal done: {} prunes, {} duplicate skips",
            self.counters.total(),
            self.counters.duplicate_skips()
        );
    }

    /// One query-node visit.
    fn traverse_map<'r, T>(&mut self, query: &T, map: &mut ScaleMap<'r, T>)
    where
        T: SpatialTree,
        R: DualTreeRule<T>,
    {
        if map.is_empty() {
            return;
        }
        log::trace!(
            "visit query point {} at scale {}",
            query.point(),
            query.scale()
        );

        self.reference_recursion(query, map);

        if query.scale() != LEAF_SCALE {
            let Some(&max_scale) = map.keys().next_back() else {
                return;
            };
            if query.scale() >= max_scale {
                debug_assert!(query.num_children() > 0, "non-leaf node without children");

                // Non-self children first; each query child recursion's
                // results are separate and independent, so each gets an
                // independently filtered copy of the working set.
                let mut self_child = None;
                for index in 0..query.num_children() {
                    match query.child(index) {
                        ChildRef::SelfChild(child) => {
                            debug_assert!(self_child.is_none(), "more than one self-child");
                            self_child = Some(child);
                        }
                        ChildRef::Other(child) => {
                            let mut child_map = self.filtered_child_map(child, map);
                            self.traverse_map(child, &mut child_map);
                        }
                    }
                }

                // The self-child shares this node's representative point, so
                // it can take over the working set without a copy.
                if let Some(child) = self_child {
                    self.filter_map_in_place(child, map);
                    self.traverse_map(child, map);
                }
            }
            // Base cases are only evaluated at the leaf level.
            return;
        }

        // Base-case floor: reference recursion has drained every scale
        // above the leaf sentinel.
        debug_assert!(map.keys().all(|&scale| scale == LEAF_SCALE));
        let Some(bucket) = map.get(&LEAF_SCALE) else {
            return;
        };
        for frame in bucket.iter() {
            if frame.reference_index == frame.node.point() && frame.query_index == query.point()
            {
                // Already evaluated for exactly this pair.
                self.counters.record_duplicate_skip();
                continue;
            }
            if self.rule.rescore(query, frame.node, frame.score).is_prune() {
                let scale = self.scale_key(frame.node);
                self.counters.record_rescore_prune(scale);
                continue;
            }
            self.rule.base_case(query.point(), frame.node.point());
        }
    }

    /// Drain the working set from its highest scale down to the query
    /// node's scale (or the leaf sentinel), expanding each surviving
    /// candidate into its children.
    fn reference_recursion<'r, T>(&mut self, query: &T, map: &mut ScaleMap<'r, T>)
    where
        T: SpatialTree,
        R: DualTreeRule<T>,
    {
        loop {
            let Some(&top_scale) = map.keys().next_back() else {
                return;
            };
            if top_scale <= query.scale() {
                return;
            }
            let Some(mut bucket) = map.remove(&top_scale) else {
                return;
            };

            // Expanding promising candidates first lets the rule tighten
            // its bounds before the rest of the bucket is scored.
            if self.config.sort_candidates {
                bucket.sort_by(|a, b| a.score.total_cmp(&b.score));
            }
            log::trace!(
                "expand {} candidates at scale {} for query point {}",
                bucket.len(),
                top_scale,
                query.point()
            );

            for frame in bucket {
                let node = frame.node;
                debug_assert_eq!(node.scale(), top_scale);

                if self.rule.rescore(query, node, frame.score).is_prune() {
                    let scale = self.scale_key(node);
                    self.counters.record_rescore_prune(scale);
                    continue;
                }

                // A candidate arriving through a self-child chain carries a
                // still-valid base case; anything else is refreshed here.
                let base_case = if frame.reference_index == node.point()
                    && frame.query_index == query.point()
                {
                    frame.base_case
                } else {
                    self.rule.base_case(query.point(), node.point())
                };

                // All-or-nothing gate: pruning here excludes every child
                // before any of them is individually visited.
                if self.rule.score(query, node, Some(base_case)).is_prune() {
                    let scale = self.scale_key(node);
                    self.counters
                        .record_subtree_prune(scale, node.num_children() as u64);
                    continue;
                }

                for index in 0..node.num_children() {
                    let child_ref = node.child(index);
                    debug_assert!(
                        child_ref.node().scale() < top_scale,
                        "child scale must be strictly finer than its parent's"
                    );
                    match child_ref {
                        ChildRef::SelfChild(child) => {
                            // Same representative point: the base case is
                            // already evaluated.
                            debug_assert_eq!(child.point(), node.point());
                            match self.rule.score(query, child, Some(base_case)) {
                                Score::Priority(score) => Self::enqueue(
                                    map,
                                    WorkItem {
                                        node: child,
                                        score,
                                        query_index: query.point(),
                                        reference_index: child.point(),
                                        base_case,
                                    },
                                ),
                                Score::Prune => {
                                    let scale = self.scale_key(child);
                                    self.counters.record_score_prune(scale);
                                }
                            }
                        }
                        ChildRef::Other(child) => {
                            // Bound-only scoring first: a pruned child never
                            // pays for a base case.
                            match self.rule.score(query, child, None) {
                                Score::Priority(score) => {
                                    let base_case =
                                        self.rule.base_case(query.point(), child.point());
                                    Self::enqueue(
                                        map,
                                        WorkItem {
                                            node: child,
                                            score,
                                            query_index: query.point(),
                                            reference_index: child.point(),
                                            base_case,
                                        },
                                    );
                                }
                                Score::Prune => {
                                    let scale = self.scale_key(child);
                                    self.counters.record_score_prune(scale);
                                }
                            }
                        }
                    }
                }
            }
        }
    }

    /// Build the working set for a non-self query child: every surviving
    /// candidate is rescored, re-evaluated, and rescored again for the new
    /// query point. Leaf candidates are carried over untouched; the
    /// base-case floor re-validates them against the final query point.
    fn filtered_child_map<'r, T>(&mut self, child: &T, map: &ScaleMap<'r, T>) -> ScaleMap<'r, T>
    where
        T: SpatialTree,
        R: DualTreeRule<T>,
    {
        let mut filtered = ScaleMap::new();
        for (&scale, bucket) in map.iter().rev() {
            if scale == LEAF_SCALE {
                filtered.insert(LEAF_SCALE, bucket.clone());
                continue;
            }
            let mut kept = Bucket::new();
            for frame in bucket.iter() {
                if self.rule.rescore(child, frame.node, frame.score).is_prune() {
                    let scale = self.scale_key(frame.node);
                    self.counters.record_rescore_prune(scale);
                    continue;
                }
                // The query point changed, so the cached pair is stale.
                let base_case = self.rule.base_case(child.point(), frame.node.point());
                match self.rule.score(child, frame.node, Some(base_case)) {
                    Score::Priority(score) => {
                        debug_assert!(!score.is_nan(), "rule produced a NaN priority");
                        kept.push(WorkItem {
                            node: frame.node,
                            score,
                            query_index: child.point(),
                            reference_index: frame.node.point(),
                            base_case,
                        });
                    }
                    Score::Prune => {
                        let scale = self.scale_key(frame.node);
                        self.counters.record_score_prune(scale);
                    }
                }
            }
            if !kept.is_empty() {
                filtered.insert(scale, kept);
            }
        }
        filtered
    }

    /// Same filtering as `filtered_child_map`, applied in place for the
    /// self-child. Candidates whose cached pair already matches the
    /// self-child's point skip the rescore and base-case steps entirely.
    fn filter_map_in_place<'r, T>(&mut self, child: &T, map: &mut ScaleMap<'r, T>)
    where
        T: SpatialTree,
        R: DualTreeRule<T>,
    {
        let scales: Vec<i32> = map
            .keys()
            .rev()
            .copied()
            .filter(|&scale| scale != LEAF_SCALE)
            .collect();

        for scale in scales {
            let Some(bucket) = map.remove(&scale) else {
                continue;
            };
            let mut kept = Bucket::new();
            for frame in bucket {
                let cached = frame.reference_index == frame.node.point()
                    && frame.query_index == child.point();
                let base_case = if cached {
                    frame.base_case
                } else {
                    if self.rule.rescore(child, frame.node, frame.score).is_prune() {
                        let scale = self.scale_key(frame.node);
                        self.counters.record_rescore_prune(scale);
                        continue;
                    }
                    self.rule.base_case(child.point(), frame.node.point())
                };
                match self.rule.score(child, frame.node, Some(base_case)) {
                    Score::Priority(score) => {
                        debug_assert!(!score.is_nan(), "rule produced a NaN priority");
                        kept.push(WorkItem {
                            node: frame.node,
                            score,
                            query_index: child.point(),
                            reference_index: frame.node.point(),
                            base_case,
                        });
                    }
                    Score::Prune => {
                        let scale = self.scale_key(frame.node);
                        self.counters.record_score_prune(scale);
                    }
                }
            }
            if !kept.is_empty() {
                map.insert(scale, kept);
            }
        }
    }

    fn enqueue<'r, T: SpatialTree>(map: &mut ScaleMap<'r, T>, item: WorkItem<'r, T>) {
        debug_assert!(!item.score.is_nan(), "rule produced a NaN priority");
        map.entry(item.node.scale()).or_default().push(item);
    }

    fn scale_key<T: SpatialTree>(&self, node: &T) -> Option<i32> {
        self.config.collect_scale_stats.then(|| node.scale())
    }
}
