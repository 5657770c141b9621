use crate::primitive::triangle::TriangleEdge;

const SIMPLEX_SUM_TOLERANCE: f64 = 1.0e-9;

/// Barycentric weights over the three corners of a triangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Barycentric(pub [f64; 3]);

/// Where a barycentric coordinate sits on its triangle, decided by its exact zero pattern.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BarycentricKind {
    /// All three weights are non-zero.
    Interior,
    /// Exactly one weight is zero; the point lies on the given edge.
    Edge(TriangleEdge),
    /// Two weights are zero; the point is the given corner.
    Vertex(usize),
}

impl Barycentric {
    pub fn new(a: f64, b: f64, c: f64) -> Self {
        Self([a, b, c])
    }

    /// The weights that place a point exactly on corner `i`.
    pub fn corner(i: usize) -> Self {
        let mut weights = [0.0; 3];
        weights[i % 3] = 1.0;
        Self(weights)
    }

    pub fn centroid() -> Self {
        Self([1.0 / 3.0; 3])
    }

    /// Whether the weights describe a point of the closed triangle.
    pub fn is_valid(&self) -> bool {
        self.0.iter().all(|w| w.is_finite() && *w >= 0.0)
            && (self.0.iter().sum::<f64>() - 1.0).abs() <= SIMPLEX_SUM_TOLERANCE
    }

    pub fn classify(&self) -> BarycentricKind {
        let zeros = self.0.iter().filter(|w| **w == 0.0).count();
        match zeros {
            0 => BarycentricKind::Interior,
            1 => {
                // The point lies on the edge opposite the zero weight.
                let zero = self.0.iter().position(|w| *w == 0.0).unwrap_or(0);
                BarycentricKind::Edge(TriangleEdge::from_index(zero + 1))
            }
            _ => {
                let corner = self.0.iter().position(|w| *w != 0.0).unwrap_or(0);
                BarycentricKind::Vertex(corner)
            }
        }
    }

    /// The same point with corners relabelled so that corner `shift` becomes corner 0.
    pub fn shifted(&self, shift: usize) -> Self {
        let w = self.0;
        Self([w[shift % 3], w[(shift + 1) % 3], w[(shift + 2) % 3]])
    }

    pub fn weight(&self, i: usize) -> f64 {
        self.0[i % 3]
    }
}

impl From<[f64; 3]> for Barycentric {
    fn from(weights: [f64; 3]) -> Self {
        Self(weights)
    }
}

impl From<(f64, f64, f64)> for Barycentric {
    fn from((a, b, c): (f64, f64, f64)) -> Self {
        Self([a, b, c])
    }
}
