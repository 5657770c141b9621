use crate::primitive::barycentric::Barycentric;
use crate::primitive::segment::Segment2;
use nalgebra::{Point2, Point3, Vector3};

/// Enum to designate one of the triangle edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub enum TriangleEdge {
    EdgeAB,
    EdgeBC,
    EdgeCA,
}

impl TriangleEdge {
    /// Position of the edge's origin corner, which is also the offset of its
    /// half-edge within the face.
    pub fn index(self) -> usize {
        match self {
            TriangleEdge::EdgeAB => 0,
            TriangleEdge::EdgeBC => 1,
            TriangleEdge::EdgeCA => 2,
        }
    }

    pub fn from_index(i: usize) -> Self {
        match i % 3 {
            0 => TriangleEdge::EdgeAB,
            1 => TriangleEdge::EdgeBC,
            _ => TriangleEdge::EdgeCA,
        }
    }
}

/// A triangle in 3D space defined by three points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    /// The first vertex of the triangle.
    pub a: Point3<f64>,
    /// The second vertex of the triangle.
    pub b: Point3<f64>,
    /// The third vertex of the triangle.
    pub c: Point3<f64>,
}

impl Triangle {
    pub fn new(a: Point3<f64>, b: Point3<f64>, c: Point3<f64>) -> Self {
        Self { a, b, c }
    }

    pub fn raw_normal(&self) -> Vector3<f64> {
        (self.b - self.a).cross(&(self.c - self.a))
    }

    pub fn corners(&self) -> [Point3<f64>; 3] {
        [self.a, self.b, self.c]
    }

    /// Interior angle at corner `i`, in radians.
    pub fn angle_at(&self, i: usize) -> f64 {
        let corners = self.corners();
        let apex = corners[i % 3];
        let u = corners[(i + 1) % 3] - apex;
        let v = corners[(i + 2) % 3] - apex;
        u.cross(&v).norm().atan2(u.dot(&v))
    }

    pub fn location(&self, barycentric: Barycentric) -> Point3<f64> {
        let [wa, wb, wc] = barycentric.0;
        Point3::from(self.a.coords * wa + self.b.coords * wb + self.c.coords * wc)
    }

    pub fn area(&self) -> f64 {
        0.5 * self.raw_normal().norm()
    }
}

impl From<parry3d_f64::shape::Triangle> for Triangle {
    fn from(triangle: parry3d_f64::shape::Triangle) -> Self {
        Self {
            a: Point3::from(triangle.a),
            b: Point3::from(triangle.b),
            c: Point3::from(triangle.c),
        }
    }
}

/// A triangle laid out in the unfolding plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle2 {
    pub a: Point2<f64>,
    pub b: Point2<f64>,
    pub c: Point2<f64>,
}

impl Triangle2 {
    pub fn new(a: Point2<f64>, b: Point2<f64>, c: Point2<f64>) -> Self {
        Self { a, b, c }
    }

    pub fn vertex(&self, i: usize) -> Point2<f64> {
        match i % 3 {
            0 => self.a,
            1 => self.b,
            _ => self.c,
        }
    }

    pub fn edge(&self, edge: TriangleEdge) -> Segment2 {
        let i = edge.index();
        Segment2::new(self.vertex(i), self.vertex(i + 1))
    }

    /// The same triangle with corner `shift` moved to the front.
    pub fn rotated(&self, shift: usize) -> Self {
        Self::new(
            self.vertex(shift),
            self.vertex(shift + 1),
            self.vertex(shift + 2),
        )
    }

    pub fn location(&self, barycentric: Barycentric) -> Point2<f64> {
        let [wa, wb, wc] = barycentric.0;
        Point2::from(self.a.coords * wa + self.b.coords * wb + self.c.coords * wc)
    }

    /// Twice the signed area; positive for counter-clockwise triangles.
    pub fn signed_double_area(&self) -> f64 {
        let ab = self.b - self.a;
        let ac = self.c - self.a;
        ab.perp(&ac)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::proptest::arbitrary_triangle;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn right_angle_is_measured_at_the_corner() {
        let tri = Triangle::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 2.0, 0.0),
        );
        assert_relative_eq!(tri.angle_at(0), std::f64::consts::FRAC_PI_2);
        assert_relative_eq!(
            tri.angle_at(0) + tri.angle_at(1) + tri.angle_at(2),
            std::f64::consts::PI
        );
    }

    #[test]
    fn converts_from_parry_triangle() {
        let triangle = Triangle::from(parry3d_f64::shape::Triangle::new(
            parry3d_f64::math::Point::new(0.0, 0.0, 0.0),
            parry3d_f64::math::Point::new(2.0, 0.0, 0.0),
            parry3d_f64::math::Point::new(0.0, 1.0, 0.0),
        ));
        assert_eq!(triangle.b, Point3::new(2.0, 0.0, 0.0));
        assert_relative_eq!(triangle.area(), 1.0);
    }

    proptest! {
        #[test]
        fn triangle2_edges_follow_corner_order(edge: TriangleEdge) {
            let tri = Triangle2::new(Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), Point2::new(0.0, 1.0));
            let segment = tri.edge(edge);
            prop_assert_eq!(segment.a, tri.vertex(edge.index()));
            prop_assert_eq!(segment.b, tri.vertex(edge.index() + 1));
            prop_assert_eq!(TriangleEdge::from_index(edge.index()), edge);
        }

        #[test]
        fn angles_of_a_triangle_sum_to_pi(triangle in arbitrary_triangle()) {
            prop_assume!(triangle.area() > 1.0e-3);
            let sum = triangle.angle_at(0) + triangle.angle_at(1) + triangle.angle_at(2);
            prop_assert!((sum - std::f64::consts::PI).abs() < 1.0e-9);
        }
    }
}
