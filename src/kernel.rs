//! The geometric kernel consumed by the wavefront propagation.
//!
//! All window geometry lives in a 2D plane into which faces are unfolded one at a time.
//! The propagation only ever talks to that plane through [`ShortestPathKernel`], so an
//! alternative kernel (e.g. with exact predicates) can be dropped in.

use crate::intersection::{
    line_segment_intersection, orientation, parametric_line_intersection,
    ray_segment_intersection, Orientation,
};
use crate::mesh::halfedge::HalfEdgeTopology;
use crate::mesh::trimesh::{TriangleMesh, VertexIndex};
use crate::primitive::ray::Ray2;
use crate::primitive::segment::Segment2;
use crate::primitive::triangle::{Triangle, Triangle2};
use nalgebra::{Point2, Vector2};
use std::cmp::Ordering;
use std::f64::consts::TAU;

/// Angle excess (radians) a vertex needs before it counts as a saddle.
const SADDLE_TOLERANCE: f64 = 1.0e-9;

/// Crossings closer than this fraction of their segments count as the same point.
const CROSSING_TOLERANCE: f64 = 1.0e-9;

pub trait ShortestPathKernel {
    /// Lays a triangle flat with corner `a` at the origin and corner `b` on the positive x axis.
    /// Corner `c` ends up in the upper half plane.
    fn project_triangle(&self, triangle: &Triangle) -> Triangle2;

    /// Lays a triangle flat with corners `a` and `b` on the ends of `base`, and corner `c`
    /// on the left of `base`.
    fn flatten_triangle_along_segment(&self, triangle: &Triangle, base: &Segment2) -> Triangle2;

    fn orientation(&self, p: Point2<f64>, q: Point2<f64>, r: Point2<f64>) -> Orientation;

    /// The single point where `ray` crosses `segment`; `None` when they miss or overlap.
    fn intersect_segment_ray(&self, segment: &Segment2, ray: &Ray2) -> Option<Point2<f64>>;

    /// The single point where the supporting line of `line` crosses `segment`.
    fn intersect_segment_line(&self, segment: &Segment2, line: &Ray2) -> Option<Point2<f64>>;

    /// Compares where `l1` crosses the line of `s1` with where `l2` crosses the line of `s2`,
    /// each measured as a fraction of its own segment. Crossings at the same point, up to
    /// rounding, are `Equal`.
    fn compare_relative_intersection_along_segment(
        &self,
        s1: &Segment2,
        l1: &Ray2,
        s2: &Segment2,
        l2: &Ray2,
    ) -> Ordering;

    /// The fraction of the way from `a` to `b` at which `p` projects.
    fn parametric_distance_along_segment(
        &self,
        a: Point2<f64>,
        b: Point2<f64>,
        p: Point2<f64>,
    ) -> f64;

    /// Whether the faces around `v` add up to more than a full turn.
    fn is_saddle_vertex(
        &self,
        v: VertexIndex,
        mesh: &TriangleMesh,
        topology: &HalfEdgeTopology,
    ) -> bool;
}

/// Floating point kernel with tolerance-aware predicates.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultKernel;

/// Position of corner `c` relative to the base `a -> b`: distance along the base,
/// then distance to its left.
fn apex_offsets(triangle: &Triangle) -> (f64, f64) {
    let ab = triangle.b - triangle.a;
    let ac = triangle.c - triangle.a;
    let base = ab.norm();
    (ac.dot(&ab) / base, ab.cross(&ac).norm() / base)
}

impl ShortestPathKernel for DefaultKernel {
    fn project_triangle(&self, triangle: &Triangle) -> Triangle2 {
        let base = (triangle.b - triangle.a).norm();
        let (along, up) = apex_offsets(triangle);
        Triangle2::new(
            Point2::origin(),
            Point2::new(base, 0.0),
            Point2::new(along, up),
        )
    }

    fn flatten_triangle_along_segment(&self, triangle: &Triangle, base: &Segment2) -> Triangle2 {
        let (along, up) = apex_offsets(triangle);
        let u = base.direction() / base.length();
        let left = Vector2::new(-u.y, u.x);
        Triangle2::new(base.a, base.b, base.a + u * along + left * up)
    }

    fn orientation(&self, p: Point2<f64>, q: Point2<f64>, r: Point2<f64>) -> Orientation {
        orientation(p, q, r)
    }

    fn intersect_segment_ray(&self, segment: &Segment2, ray: &Ray2) -> Option<Point2<f64>> {
        ray_segment_intersection(*ray, *segment)
            .intersection()
            .map(|[_, t]| segment.interpolate(t))
    }

    fn intersect_segment_line(&self, segment: &Segment2, line: &Ray2) -> Option<Point2<f64>> {
        line_segment_intersection(*line, *segment)
            .intersection()
            .map(|[_, t]| segment.interpolate(t))
    }

    fn compare_relative_intersection_along_segment(
        &self,
        s1: &Segment2,
        l1: &Ray2,
        s2: &Segment2,
        l2: &Ray2,
    ) -> Ordering {
        let along = |s: &Segment2, l: &Ray2| {
            parametric_line_intersection(s.a, s.direction(), l.origin, l.direction())
                .map(|[t, _]| t)
        };
        match (along(s1, l1), along(s2, l2)) {
            (Some(t1), Some(t2)) if (t1 - t2).abs() > CROSSING_TOLERANCE => {
                t1.partial_cmp(&t2).unwrap_or(Ordering::Equal)
            }
            _ => Ordering::Equal,
        }
    }

    fn parametric_distance_along_segment(
        &self,
        a: Point2<f64>,
        b: Point2<f64>,
        p: Point2<f64>,
    ) -> f64 {
        let ab = b - a;
        (p - a).dot(&ab) / ab.norm_squared()
    }

    fn is_saddle_vertex(
        &self,
        v: VertexIndex,
        mesh: &TriangleMesh,
        topology: &HalfEdgeTopology,
    ) -> bool {
        let angle_sum: f64 = topology
            .incoming_halfedges(v)
            .filter(|&e| !topology.is_border(e))
            .map(|e| topology.triangle_from_halfedge(e, mesh).angle_at(1))
            .sum();
        angle_sum > TAU + SADDLE_TOLERANCE
    }
}
