//! Receivers for reconstructed shortest paths.
//!
//! Paths are reported from the query location back to the source. A path is a sequence
//! of edge crossings and vertex visits, closed by the source itself when it does not lie
//! on a vertex.

use crate::mesh::halfedge::HalfEdgeTopology;
use crate::mesh::halfedge::HalfEdgeIndex;
use crate::mesh::trimesh::{FaceLocation, TriangleMesh, VertexIndex};
use itertools::Itertools;
use nalgebra::{distance, Point3};

/// Receives the steps of a shortest path.
pub trait PathVisitor {
    /// The path crosses `edge` at `origin + alpha * (target - origin)`.
    fn edge(&mut self, edge: HalfEdgeIndex, alpha: f64);

    /// The path goes through a vertex.
    fn vertex(&mut self, vertex: VertexIndex);

    /// The path reaches a source lying on a face or an edge.
    fn face(&mut self, location: FaceLocation);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathEvent {
    Edge { edge: HalfEdgeIndex, alpha: f64 },
    Vertex(VertexIndex),
    Face(FaceLocation),
}

impl PathVisitor for Vec<PathEvent> {
    fn edge(&mut self, edge: HalfEdgeIndex, alpha: f64) {
        self.push(PathEvent::Edge { edge, alpha });
    }

    fn vertex(&mut self, vertex: VertexIndex) {
        self.push(PathEvent::Vertex(vertex));
    }

    fn face(&mut self, location: FaceLocation) {
        self.push(PathEvent::Face(location));
    }
}

/// Receives the points of a shortest path.
pub trait PointPathVisitor {
    fn point(&mut self, point: Point3<f64>);
}

impl PointPathVisitor for Vec<Point3<f64>> {
    fn point(&mut self, point: Point3<f64>) {
        self.push(point);
    }
}

impl<V: PointPathVisitor + ?Sized> PointPathVisitor for &mut V {
    fn point(&mut self, point: Point3<f64>) {
        (**self).point(point);
    }
}

/// Turns path steps into 3D points and hands them on.
pub struct PointPathAdapter<'a, V> {
    mesh: &'a TriangleMesh,
    topology: &'a HalfEdgeTopology,
    visitor: V,
}

impl<'a, V: PointPathVisitor> PointPathAdapter<'a, V> {
    pub fn new(mesh: &'a TriangleMesh, topology: &'a HalfEdgeTopology, visitor: V) -> Self {
        Self {
            mesh,
            topology,
            visitor,
        }
    }

    pub fn into_inner(self) -> V {
        self.visitor
    }
}

impl<V: PointPathVisitor> PathVisitor for PointPathAdapter<'_, V> {
    fn edge(&mut self, edge: HalfEdgeIndex, alpha: f64) {
        let [a, b] = self.topology.edge_points(edge, self.mesh);
        self.visitor.point(a + (b - a) * alpha);
    }

    fn vertex(&mut self, vertex: VertexIndex) {
        self.visitor.point(self.mesh.vertex(vertex));
    }

    fn face(&mut self, location: FaceLocation) {
        self.visitor.point(self.mesh.face_location_point(location));
    }
}

/// Total length of a polyline.
pub fn polyline_length(points: &[Point3<f64>]) -> f64 {
    points
        .iter()
        .tuple_windows()
        .map(|(a, b)| distance(a, b))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::trimesh::FaceIndex;
    use crate::primitive::triangle::TriangleEdge;
    use crate::proptest::single_triangle;
    use approx::assert_relative_eq;

    #[test]
    fn adapter_places_points_on_the_mesh() {
        let mesh = single_triangle();
        let topology = HalfEdgeTopology::index_of_mesh(&mesh).unwrap();
        let mut adapter = PointPathAdapter::new(&mesh, &topology, Vec::new());

        // Edge from vertex 1 to vertex 2.
        adapter.edge(topology.face_halfedge(FaceIndex(0), TriangleEdge::EdgeBC), 0.25);
        adapter.vertex(VertexIndex(2));
        adapter.face(FaceLocation::new(FaceIndex(0), [0.5, 0.5, 0.0]));

        let points = adapter.into_inner();
        assert_relative_eq!(points[0], Point3::new(0.75, 0.25, 0.0));
        assert_relative_eq!(points[1], Point3::new(0.0, 1.0, 0.0));
        assert_relative_eq!(points[2], Point3::new(0.5, 0.0, 0.0));
        assert_relative_eq!(polyline_length(&points), (0.75f64.powi(2) * 2.0).sqrt() + 1.25f64.sqrt());
    }

    #[test]
    fn polyline_length_of_short_inputs_is_zero() {
        assert_eq!(polyline_length(&[]), 0.0);
        assert_eq!(polyline_length(&[Point3::new(1.0, 2.0, 3.0)]), 0.0);
    }
}
