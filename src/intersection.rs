//! Planar predicates and intersections used while unfolding windows.

use crate::primitive::ray::Ray2;
use crate::primitive::segment::Segment2;
use nalgebra::{Point2, Vector2};

/// Relative tolerance (a sine of an angle) under which three points count as collinear.
pub const ORIENTATION_TOLERANCE: f64 = 1.0e-10;

/// Slack on segment parameters, so that a ray through an endpoint still hits it.
const PARAMETER_TOLERANCE: f64 = 1.0e-9;

const FLOAT_COMPARE: f64 = 1.0e-12;

/// Which way the path p -> q -> r turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Counter-clockwise; r is left of the directed line p -> q.
    LeftTurn,
    /// Clockwise; r is right of the directed line p -> q.
    RightTurn,
    Collinear,
}

/// Tolerance-aware orientation of three points.
pub fn orientation(p: Point2<f64>, q: Point2<f64>, r: Point2<f64>) -> Orientation {
    let pq = q - p;
    let pr = r - p;
    let cross = pq.perp(&pr);
    let scale = pq.norm() * pr.norm();

    if cross.abs() <= ORIENTATION_TOLERANCE * scale {
        Orientation::Collinear
    } else if cross > 0.0 {
        Orientation::LeftTurn
    } else {
        Orientation::RightTurn
    }
}

/// Computes the intersection parameters of two parametric lines in 2D space.
///
/// Returns `[t1, t2]` such that `pt1 + dir1 * t1 == pt2 + dir2 * t2`,
/// or `None` if the lines are parallel or coincident.
pub fn parametric_line_intersection(
    pt1: Point2<f64>,
    dir1: Vector2<f64>,
    pt2: Point2<f64>,
    dir2: Vector2<f64>,
) -> Option<[f64; 2]> {
    let det = dir1.perp(&dir2);

    if det.abs() <= FLOAT_COMPARE * dir1.norm() * dir2.norm() {
        return None;
    }

    let delta = pt2 - pt1;
    let t1 = delta.perp(&dir2) / det;
    let t2 = delta.perp(&dir1) / det;

    Some([t1, t2])
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RaySegmentIntersection {
    /// The ray meets the segment; `[ray parameter, segment parameter]`, the latter clamped to `[0, 1]`.
    Intersection([f64; 2]),
    /// The ray is parallel to the segment.
    Parallel,
    /// The ray does not meet the segment.
    NoIntersection,
}

impl RaySegmentIntersection {
    pub fn intersection(&self) -> Option<[f64; 2]> {
        match self {
            RaySegmentIntersection::Intersection(t) => Some(*t),
            _ => None,
        }
    }
}

/// Computes the intersection parameters of a ray and a segment.
pub fn ray_segment_intersection(ray: Ray2, segment: Segment2) -> RaySegmentIntersection {
    match line_segment_intersection(ray, segment) {
        RaySegmentIntersection::Intersection([t1, _]) if t1 < -PARAMETER_TOLERANCE => {
            RaySegmentIntersection::NoIntersection
        }
        other => other,
    }
}

/// Like [`ray_segment_intersection`], but extends the ray to its whole supporting line.
pub fn line_segment_intersection(line: Ray2, segment: Segment2) -> RaySegmentIntersection {
    match parametric_line_intersection(
        line.origin,
        line.direction(),
        segment.a,
        segment.direction(),
    ) {
        None => RaySegmentIntersection::Parallel,
        Some([t1, t2]) => {
            if (-PARAMETER_TOLERANCE..=1.0 + PARAMETER_TOLERANCE).contains(&t2) {
                RaySegmentIntersection::Intersection([t1, t2.clamp(0.0, 1.0)])
            } else {
                RaySegmentIntersection::NoIntersection
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proptest::{arbitrary_point2, arbitrary_unit_vector2};
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn orientation_of_a_counter_clockwise_triangle() {
        let p = Point2::new(0.0, 0.0);
        let q = Point2::new(1.0, 0.0);
        assert_eq!(orientation(p, q, Point2::new(0.5, 1.0)), Orientation::LeftTurn);
        assert_eq!(orientation(p, q, Point2::new(0.5, -1.0)), Orientation::RightTurn);
        assert_eq!(orientation(p, q, Point2::new(3.0, 0.0)), Orientation::Collinear);
        assert_eq!(orientation(p, q, Point2::new(3.0, 1.0e-14)), Orientation::Collinear);
    }

    #[test]
    fn ray_through_segment_endpoint_hits_it() {
        let segment = Segment2::new(Point2::new(0.0, 1.0), Point2::new(1.0, 1.0));
        let ray = Ray2::new(Point2::new(0.0, 0.0), Point2::new(1.0, 1.0));
        let [t_ray, t_segment] = ray_segment_intersection(ray, segment).intersection().unwrap();
        assert_relative_eq!(t_ray, 1.0);
        assert_relative_eq!(t_segment, 1.0);
    }

    #[test]
    fn ray_pointing_away_misses() {
        let segment = Segment2::new(Point2::new(-1.0, 1.0), Point2::new(1.0, 1.0));
        let ray = Ray2::new(Point2::new(0.0, 0.0), Point2::new(0.0, -1.0));
        assert_eq!(
            ray_segment_intersection(ray, segment),
            RaySegmentIntersection::NoIntersection
        );
        assert!(line_segment_intersection(ray, segment).intersection().is_some());
    }

    proptest! {
        #[test]
        fn test_parametric_line_intersection(
            intersection_point in arbitrary_point2(),
            v1 in arbitrary_unit_vector2(),
            v2 in arbitrary_unit_vector2(),
            min1 in -10.0 .. 0.0,
            max1 in 0.01 .. 10.0,
            min2 in -10.0 .. 0.0,
            max2 in 0.01 .. 10.0,
        ) {
            let segment1 = Segment2::new(intersection_point + v1 * min1, intersection_point + v1 * max1);
            let segment2 = Segment2::new(intersection_point + v2 * min2, intersection_point + v2 * max2);

            match parametric_line_intersection(segment1.a, segment1.direction(), segment2.a, segment2.direction()) {
                Some([t1, t2]) => {
                    prop_assume!(v1.perp(&v2).abs() > 1.0e-6);
                    let pt1 = segment1.interpolate(t1);
                    let pt2 = segment2.interpolate(t2);

                    prop_assert!((pt1 - intersection_point).norm() < 1.0e-6);
                    prop_assert!((pt2 - intersection_point).norm() < 1.0e-6);
                }
                None => {
                    prop_assert!(v1.perp(&v2).abs() < 1.0e-6);
                }
            }
        }
    }
}
