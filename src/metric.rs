//! Distance metrics, leveraging the `geo` crate.
//!
//! The traversers never measure distance themselves: a metric is bound into
//! a rule at construction, and only the rule's base-case and scoring
//! callbacks consult it. This module provides the seam ([`Metric`]) and a
//! ready-made implementation over geographic and planar points.

use geo::{Distance, Euclidean, Geodesic, Haversine, Point, Rhumb};

/// Symmetric distance over some point representation.
///
/// Implementations must satisfy `distance(a, b) == distance(b, a)` and
/// return non-negative, finite values for the points a rule will see; the
/// pruning bounds built on top assume the triangle inequality holds.
pub trait Metric<P> {
    fn distance(&self, a: &P, b: &P) -> f64;
}

/// Distance metrics for spatial calculations.
///
/// Different metrics are appropriate for different use cases:
/// - **Haversine**: fast spherical distance, good for most lon/lat data
/// - **Geodesic**: more accurate ellipsoidal distance (Karney 2013), slower
/// - **Rhumb**: constant bearing distance, useful for navigation
/// - **Euclidean**: planar distance, only for projected coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DistanceMetric {
    /// Haversine formula - assumes spherical Earth, fast and accurate
    /// enough for most uses
    #[default]
    Haversine,
    /// Geodesic distance using Karney (2013) - accounts for Earth's
    /// ellipsoid
    Geodesic,
    /// Rhumb line (loxodrome) - maintains constant bearing
    Rhumb,
    /// Euclidean distance - for planar/projected coordinates only
    Euclidean,
}

/// Calculate the distance between two points using the specified metric.
///
/// # Arguments
///
/// * `point1` - First point
/// * `point2` - Second point
/// * `metric` - Distance metric to use
///
/// # Returns
///
/// Distance in meters (planar units for `Euclidean`)
///
/// # Examples
///
/// ```rust
/// use dualtree::metric::{DistanceMetric, distance_between};
/// use geo::Point;
///
/// let nyc = Point::new(-74.0060, 40.7128);
/// let la = Point::new(-118.2437, 34.0522);
///
/// let dist = distance_between(&nyc, &la, DistanceMetric::Haversine);
/// assert!(dist > 3_900_000.0); // ~3,944 km
/// ```
pub fn distance_between(point1: &Point, point2: &Point, metric: DistanceMetric) -> f64 {
    match metric {
        DistanceMetric::Haversine => Haversine.distance(*point1, *point2),
        DistanceMetric::Geodesic => Geodesic.distance(*point1, *point2),
        DistanceMetric::Rhumb => Rhumb.distance(*point1, *point2),
        DistanceMetric::Euclidean => Euclidean.distance(*point1, *point2),
    }
}

impl Metric<Point> for DistanceMetric {
    fn distance(&self, a: &Point, b: &Point) -> f64 {
        distance_between(a, b, *self)
    }
}
