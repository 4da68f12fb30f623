//! Single-tree traversal: one fixed query point against a reference tree.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::config::TraversalConfig;
use crate::counters::PruneCounters;
use crate::rule::{Score, SingleTreeRule};
use crate::tree::{ChildRef, SpatialTree};

/// A scored reference node waiting on the heap, ordered so the lowest
/// score pops first.
struct Candidate<'r, T> {
    score: f64,
    base_case: f64,
    node: &'r T,
}

impl<T> PartialEq for Candidate<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        self.score.total_cmp(&other.score) == Ordering::Equal
    }
}

impl<T> Eq for Candidate<'_, T> {}

impl<T> Ord for Candidate<'_, T> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap, we want the most promising
        // (lowest) score on top.
        other.score.total_cmp(&self.score)
    }
}

impl<T> PartialOrd for Candidate<'_, T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Priority-ordered pruning recursion for a fixed query point.
///
/// Candidates pop in ascending score order and are rescored on arrival, so
/// bounds tightened by earlier base cases retroactively prune work that
/// looked promising when it was pushed.
pub struct SingleTreeTraverser<R> {
    rule: R,
    config: TraversalConfig,
    counters: PruneCounters,
}

impl<R> SingleTreeTraverser<R> {
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

    /// Traverse the reference tree for one query point.
    pub fn traverse<T>(&mut self, query_index: usize, reference_root: &T)
    where
        T: SpatialTree,
        R: SingleTreeRule<T>,
    {
        let mut heap = BinaryHeap::new();

        let base_case = self.rule.base_case(query_index, reference_root.point());
        match self
            .rule
            .score_point(query_index, reference_root, Some(base_case))
        {
            Score::Priority(score) => {
                debug_assert!(!score.is_nan(), "rule produced a NaN priority");
                heap.push(Candidate {
                    score,
                    base_case,
                    node: reference_root,
                });
            }
            Score::Prune => {
                let scale = self.scale_key(reference_root);
                self.counters.record_score_prune(scale);
            }
        }

        while let Some(candidate) = heap.pop() {
            // The rule's bounds may have tightened since this candidate was
            // pushed.
            if self
                .rule
                .rescore_point(query_index, candidate.node, candidate.score)
                .is_prune()
            {
                let scale = self.scale_key(candidate.node);
                self.counters.record_rescore_prune(scale);
                continue;
            }

            for index in 0..candidate.node.num_children() {
                match candidate.node.child(index) {
                    ChildRef::SelfChild(child) => {
                        // Same representative point: reuse the cached base
                        // case.
                        match self
                            .rule
                            .score_point(query_index, child, Some(candidate.base_case))
                        {
                            Score::Priority(score) => {
                                debug_assert!(!score.is_nan(), "rule produced a NaN priority");
                                heap.push(Candidate {
                                    score,
                                    base_case: candidate.base_case,
                                    node: child,
                                });
                            }
                            Score::Prune => {
                                let scale = self.scale_key(child);
                                self.counters.record_score_prune(scale);
                            }
                        }
                    }
                    ChildRef::Other(child) => {
                        // Bound-only scoring first; the base case is only
                        // evaluated for survivors.
                        match self.rule.score_point(query_index, child, None) {
                            Score::Priority(score) => {
                                debug_assert!(!score.is_nan(), "rule produced a NaN priority");
                                let base_case =
                                    self.rule.base_case(query_index, child.point());
                                heap.push(Candidate {
                                    score,
                                    base_case,
                                    node: child,
                                });
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

        log::debug!(
            "single-tree traversal done for query {}: {} prunes",
            query_index,
            self.counters.total()
        );
    }

    fn scale_key<T: SpatialTree>(&self, node: &T) -> Option<i32> {
        self.config.collect_scale_stats.then(|| node.scale())
    }
}
