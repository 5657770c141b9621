use crate::intersection::{orientation, Orientation};
use nalgebra::Point2;

/// An unbounded wedge in the unfolding plane: everything between the ray from
/// `origin` through `left` and the ray from `origin` through `right`.
///
/// Seen from the origin, `left` is on the left hand. The wedge spans less than
/// half a turn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InfiniteTriangle {
    pub origin: Point2<f64>,
    pub left: Point2<f64>,
    pub right: Point2<f64>,
}

impl InfiniteTriangle {
    pub fn new(origin: Point2<f64>, left: Point2<f64>, right: Point2<f64>) -> Self {
        Self {
            origin,
            left,
            right,
        }
    }

    /// Whether `pt` is on or right of the left boundary line.
    pub fn within_left_bound(&self, pt: Point2<f64>) -> bool {
        orientation(self.origin, self.left, pt) != Orientation::LeftTurn
    }

    /// Whether `pt` is on or left of the right boundary line.
    pub fn within_right_bound(&self, pt: Point2<f64>) -> bool {
        orientation(self.origin, self.right, pt) != Orientation::RightTurn
    }

    /// Whether `pt` lies in the closed wedge. Points within the collinearity
    /// tolerance of either boundary count as inside.
    pub fn contains_point(&self, pt: Point2<f64>) -> bool {
        self.within_left_bound(pt) && self.within_right_bound(pt)
    }
}
