use nalgebra::{Point2, Vector2};

/// A line segment in the unfolding plane.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct Segment2 {
    /// The starting point of the segment.
    pub a: Point2<f64>,
    /// The ending point of the segment.
    pub b: Point2<f64>,
}

impl Segment2 {
    pub fn new(a: Point2<f64>, b: Point2<f64>) -> Self {
        Self { a, b }
    }

    pub fn direction(&self) -> Vector2<f64> {
        self.b - self.a
    }

    /// The point at parameter `t`, with `t = 0` at `a` and `t = 1` at `b`.
    pub fn interpolate(&self, t: f64) -> Point2<f64> {
        self.a + self.direction() * t
    }

    pub fn closest_point(&self, point: Point2<f64>) -> Point2<f64> {
        let edge_dir = self.direction();
        let length_squared = edge_dir.norm_squared();
        if length_squared == 0.0 {
            return self.a;
        }
        let t = ((point - self.a).dot(&edge_dir) / length_squared).clamp(0.0, 1.0);
        self.a + edge_dir * t
    }

    pub fn distance_to_point(&self, point: Point2<f64>) -> f64 {
        (self.closest_point(point) - point).norm()
    }

    pub fn length(&self) -> f64 {
        self.direction().norm()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn distance_is_measured_to_the_nearest_point() {
        let segment = Segment2::new(Point2::new(0.0, 0.0), Point2::new(2.0, 0.0));
        assert_relative_eq!(segment.distance_to_point(Point2::new(1.0, 3.0)), 3.0);
        assert_relative_eq!(segment.distance_to_point(Point2::new(5.0, 4.0)), 5.0);
        assert_relative_eq!(segment.interpolate(0.25), Point2::new(0.5, 0.0));
    }

    #[test]
    fn degenerate_segment_distance_is_point_distance() {
        let segment = Segment2::new(Point2::new(1.0, 1.0), Point2::new(1.0, 1.0));
        assert_relative_eq!(segment.distance_to_point(Point2::new(4.0, 5.0)), 5.0);
    }
}
