use nalgebra::{Point2, Vector2};

/// A ray in the unfolding plane, starting at `origin` and passing through `through`.
///
/// Rays are kept in two-point form so that a window boundary that passes exactly
/// through a mesh vertex stores that vertex unchanged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray2 {
    pub origin: Point2<f64>,
    pub through: Point2<f64>,
}

impl Ray2 {
    pub fn new(origin: Point2<f64>, through: Point2<f64>) -> Self {
        Self { origin, through }
    }

    pub fn direction(&self) -> Vector2<f64> {
        self.through - self.origin
    }
}
