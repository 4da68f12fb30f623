//! Shared fixtures for the integration suites: deterministic point sets,
//! hand-assembled scale-hierarchy trees, and rule implementations bound to
//! a metric and the input data.
#![allow(dead_code)]

use std::collections::HashMap;

use dualtree::{
    DistanceMetric, DualTreeRule, ExplicitNode, Score, SingleTreeRule, SpatialTree,
    distance_between,
};
use geo::Point;

/// Staggered planar grid; deterministic and collision-free.
pub fn grid(nx: usize, ny: usize, spacing: f64) -> Vec<Point> {
    let mut points = Vec::with_capacity(nx * ny);
    for i in 0..nx {
        for j in 0..ny {
            let x = i as f64 * spacing + if j % 2 == 0 { 0.0 } else { spacing * 0.31 };
            let y = j as f64 * spacing * 0.83;
            points.push(Point::new(x, y));
        }
    }
    points
}

/// Assemble a balanced scale-hierarchy tree over `points` by repeated
/// bisection. The first point of a range is its representative, so child 0
/// always shares the parent's point; bounds are exact furthest-descendant
/// distances under `metric`.
pub fn balanced_tree(points: &[Point], metric: DistanceMetric) -> ExplicitNode {
    assert!(!points.is_empty(), "fixture needs at least one point");
    let depth = points.len().next_power_of_two().trailing_zeros() as i32;
    build(points, 0, points.len(), depth.max(1), metric, false)
}

/// Worst-case shape: every split peels off a single point, so the tree
/// degenerates to a path of depth `points.len()`.
pub fn skewed_tree(points: &[Point], metric: DistanceMetric) -> ExplicitNode {
    assert!(!points.is_empty(), "fixture needs at least one point");
    build(points, 0, points.len(), points.len() as i32, metric, true)
}

fn build(
    points: &[Point],
    lo: usize,
    hi: usize,
    scale: i32,
    metric: DistanceMetric,
    skew: bool,
) -> ExplicitNode {
    if hi - lo == 1 {
        return ExplicitNode::leaf(lo);
    }
    let mid = if skew { lo + 1 } else { lo + (hi - lo) / 2 };
    let bound = points[lo..hi]
        .iter()
        .map(|point| distance_between(&points[lo], point, metric))
        .fold(0.0_f64, f64::max);
    let children = vec![
        build(points, lo, mid, scale - 1, metric, skew),
        build(points, mid, hi, scale - 1, metric, skew),
    ];
    ExplicitNode::new(lo, scale, bound, children).expect("fixture tree is well formed")
}

/// Exhaustive all-pairs count of pairs within `radius`.
pub fn brute_force_in_range(
    queries: &[Point],
    references: &[Point],
    metric: DistanceMetric,
    radius: f64,
) -> u64 {
    let mut count = 0;
    for query in queries {
        for reference in references {
            if distance_between(query, reference, metric) <= radius {
                count += 1;
            }
        }
    }
    count
}

/// Exhaustive nearest distance per query point.
pub fn brute_force_nearest(
    queries: &[Point],
    references: &[Point],
    metric: DistanceMetric,
) -> Vec<f64> {
    queries
        .iter()
        .map(|query| {
            references
                .iter()
                .map(|reference| distance_between(query, reference, metric))
                .fold(f64::INFINITY, f64::min)
        })
        .collect()
}

/// Records every base-case pair; optionally prunes one reference point's
/// subtree. Never otherwise interferes with the traversal.
pub struct RecordingRule {
    pub calls: Vec<(usize, usize)>,
    pub prune_reference: Option<usize>,
}

impl RecordingRule {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            prune_reference: None,
        }
    }

    pub fn pruning(target: usize) -> Self {
        Self {
            calls: Vec::new(),
            prune_reference: Some(target),
        }
    }
}

impl DualTreeRule<ExplicitNode> for RecordingRule {
    fn base_case(&mut self, query_index: usize, reference_index: usize) -> f64 {
        self.calls.push((query_index, reference_index));
        0.0
    }

    fn score(&mut self, _: &ExplicitNode, reference: &ExplicitNode, _: Option<f64>) -> Score {
        if self.prune_reference == Some(reference.point()) {
            Score::Prune
        } else {
            Score::Priority(0.0)
        }
    }

    fn rescore(&mut self, _: &ExplicitNode, _: &ExplicitNode, old_score: f64) -> Score {
        Score::Priority(old_score)
    }
}

/// Counts (query, reference) pairs within `radius`, pruning subtree pairs
/// whose closest possible distance already exceeds it. Also tracks how
/// often each pair was evaluated, for the no-duplicates property.
pub struct RangeCountRule<'a> {
    pub queries: &'a [Point],
    pub references: &'a [Point],
    pub metric: DistanceMetric,
    pub radius: f64,
    pub in_range: u64,
    pub base_cases: u64,
    pub seen: HashMap<(usize, usize), u32>,
}

impl<'a> RangeCountRule<'a> {
    pub fn new(queries: &'a [Point], references: &'a [Point], radius: f64) -> Self {
        Self {
            queries,
            references,
            metric: DistanceMetric::Euclidean,
            radius,
            in_range: 0,
            base_cases: 0,
            seen: HashMap::new(),
        }
    }

    fn center_distance(&self, query_index: usize, reference_index: usize) -> f64 {
        distance_between(
            &self.queries[query_index],
            &self.references[reference_index],
            self.metric,
        )
    }

    fn bound_score(&self, query: &ExplicitNode, reference: &ExplicitNode, center: f64) -> Score {
        let lower = center
            - query.furthest_descendant_distance()
            - reference.furthest_descendant_distance();
        if lower > self.radius {
            Score::Prune
        } else {
            Score::Priority(lower.max(0.0))
        }
    }
}

impl DualTreeRule<ExplicitNode> for RangeCountRule<'_> {
    fn base_case(&mut self, query_index: usize, reference_index: usize) -> f64 {
        self.base_cases += 1;
        *self.seen.entry((query_index, reference_index)).or_insert(0) += 1;
        let distance = self.center_distance(query_index, reference_index);
        if distance <= self.radius {
            self.in_range += 1;
        }
        distance
    }

    fn score(
        &mut self,
        query: &ExplicitNode,
        reference: &ExplicitNode,
        base_case: Option<f64>,
    ) -> Score {
        let center = base_case
            .unwrap_or_else(|| self.center_distance(query.point(), reference.point()));
        self.bound_score(query, reference, center)
    }

    fn rescore(&mut self, query: &ExplicitNode, reference: &ExplicitNode, _old_score: f64) -> Score {
        let center = self.center_distance(query.point(), reference.point());
        self.bound_score(query, reference, center)
    }
}

/// Dual-tree nearest neighbor with a deliberately conservative prune bound:
/// a subtree pair is dropped only when its closest possible distance cannot
/// improve the current worst best distance across all query points.
pub struct NearestNeighborRule<'a> {
    pub queries: &'a [Point],
    pub references: &'a [Point],
    pub metric: DistanceMetric,
    pub best: Vec<f64>,
}

impl<'a> NearestNeighborRule<'a> {
    pub fn new(queries: &'a [Point], references: &'a [Point]) -> Self {
        Self {
            queries,
            references,
            metric: DistanceMetric::Euclidean,
            best: vec![f64::INFINITY; queries.len()],
        }
    }

    fn center_distance(&self, query_index: usize, reference_index: usize) -> f64 {
        distance_between(
            &self.queries[query_index],
            &self.references[reference_index],
            self.metric,
        )
    }

    fn worst_best(&self) -> f64 {
        self.best.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }
}

impl DualTreeRule<ExplicitNode> for NearestNeighborRule<'_> {
    fn base_case(&mut self, query_index: usize, reference_index: usize) -> f64 {
        let distance = self.center_distance(query_index, reference_index);
        if distance < self.best[query_index] {
            self.best[query_index] = distance;
        }
        distance
    }

    fn score(
        &mut self,
        query: &ExplicitNode,
        reference: &ExplicitNode,
        base_case: Option<f64>,
    ) -> Score {
        let center = base_case
            .unwrap_or_else(|| self.center_distance(query.point(), reference.point()));
        let lower = (center
            - query.furthest_descendant_distance()
            - reference.furthest_descendant_distance())
        .max(0.0);
        if lower > self.worst_best() {
            Score::Prune
        } else {
            Score::Priority(lower)
        }
    }

    fn rescore(&mut self, query: &ExplicitNode, reference: &ExplicitNode, _old_score: f64) -> Score {
        self.score(query, reference, None)
    }
}

/// Single-tree nearest neighbor: one best distance per query point,
/// tightened as base cases land.
pub struct SingleNearestRule<'a> {
    pub queries: &'a [Point],
    pub references: &'a [Point],
    pub metric: DistanceMetric,
    pub best: Vec<f64>,
}

impl<'a> SingleNearestRule<'a> {
    pub fn new(queries: &'a [Point], references: &'a [Point]) -> Self {
        Self {
            queries,
            references,
            metric: DistanceMetric::Euclidean,
            best: vec![f64::INFINITY; queries.len()],
        }
    }

    fn center_distance(&self, query_index: usize, reference_index: usize) -> f64 {
        distance_between(
            &self.queries[query_index],
            &self.references[reference_index],
            self.metric,
        )
    }
}

impl SingleTreeRule<ExplicitNode> for SingleNearestRule<'_> {
    fn base_case(&mut self, query_index: usize, reference_index: usize) -> f64 {
        let distance = self.center_distance(query_index, reference_index);
        if distance < self.best[query_index] {
            self.best[query_index] = distance;
        }
        distance
    }

    fn score_point(
        &mut self,
        query_index: usize,
        reference: &ExplicitNode,
        base_case: Option<f64>,
    ) -> Score {
        let center =
            base_case.unwrap_or_else(|| self.center_distance(query_index, reference.point()));
        let lower = (center - reference.furthest_descendant_distance()).max(0.0);
        if lower > self.best[query_index] {
            Score::Prune
        } else {
            Score::Priority(lower)
        }
    }

    fn rescore_point(
        &mut self,
        query_index: usize,
        reference: &ExplicitNode,
        _old_score: f64,
    ) -> Score {
        self.score_point(query_index, reference, None)
    }
}
