use crate::primitive::barycentric::Barycentric;
use crate::primitive::triangle::{Triangle, TriangleEdge};
use nalgebra::Point3;
use std::collections::HashMap;
use union_find::{QuickUnionUf, UnionBySize, UnionFind};

/// Represents an index of a vertex in a mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexIndex(pub usize);

/// Represents an index of a triangle in a mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FaceIndex(pub usize);

/// Represents a triangle in a mesh, defined by three vertex indices in counter-clockwise order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndexTriangle {
    /// The first vertex index of the triangle.
    pub a: VertexIndex,
    /// The second vertex index of the triangle.
    pub b: VertexIndex,
    /// The third vertex index of the triangle.
    pub c: VertexIndex,
}

impl IndexTriangle {
    pub fn new(a: VertexIndex, b: VertexIndex, c: VertexIndex) -> Self {
        Self { a, b, c }
    }

    /// The three directed edges AB, BC, CA.
    pub fn edges(&self) -> [[VertexIndex; 2]; 3] {
        [[self.a, self.b], [self.b, self.c], [self.c, self.a]]
    }

    pub fn edge_vertices(&self, triangle_edge: TriangleEdge) -> [VertexIndex; 2] {
        self.edges()[triangle_edge.index()]
    }

    pub fn vertices(&self) -> [VertexIndex; 3] {
        [self.a, self.b, self.c]
    }
}

/// A point on the surface of a mesh, given as a face and barycentric weights
/// over that face's corners (in `IndexTriangle` order).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FaceLocation {
    pub face: FaceIndex,
    pub barycentric: Barycentric,
}

impl FaceLocation {
    pub fn new(face: FaceIndex, barycentric: impl Into<Barycentric>) -> Self {
        Self {
            face,
            barycentric: barycentric.into(),
        }
    }
}

/// Represents a triangle mesh, consisting of vertices and triangle indices.
#[derive(Debug, Clone)]
pub struct TriangleMesh {
    /// A list of vertices in the mesh.
    pub vertices: Vec<Point3<f64>>,
    /// A list of triangles, each defined by three vertex indices.
    pub indices: Vec<IndexTriangle>,
}

impl TriangleMesh {
    pub fn new(vertices: Vec<Point3<f64>>, indices: Vec<IndexTriangle>) -> Self {
        Self { vertices, indices }
    }

    /// Builds a mesh from raw `[a, b, c]` index triples.
    pub fn from_triangles(vertices: Vec<Point3<f64>>, triangles: &[[usize; 3]]) -> Self {
        let indices = triangles
            .iter()
            .map(|&[a, b, c]| IndexTriangle::new(VertexIndex(a), VertexIndex(b), VertexIndex(c)))
            .collect();
        Self::new(vertices, indices)
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.indices.len()
    }

    pub fn vertex(&self, vertex_index: VertexIndex) -> Point3<f64> {
        self.vertices[vertex_index.0]
    }

    pub fn triangle(&self, face_id: FaceIndex) -> IndexTriangle {
        self.indices[face_id.0]
    }

    pub fn euclidean_triangle(&self, face_id: FaceIndex) -> Triangle {
        let tri = self.triangle(face_id);
        Triangle {
            a: self.vertices[tri.a.0],
            b: self.vertices[tri.b.0],
            c: self.vertices[tri.c.0],
        }
    }

    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        self.indices.iter().map(move |tri| Triangle {
            a: self.vertices[tri.a.0],
            b: self.vertices[tri.b.0],
            c: self.vertices[tri.c.0],
        })
    }

    /// The 3D point described by a face location.
    pub fn face_location_point(&self, location: FaceLocation) -> Point3<f64> {
        self.euclidean_triangle(location.face)
            .location(location.barycentric)
    }

    /// The face location of a vertex, expressed in the first face that uses it.
    pub fn vertex_location(&self, vertex: VertexIndex) -> Option<FaceLocation> {
        self.indices.iter().enumerate().find_map(|(f, tri)| {
            tri.vertices()
                .iter()
                .position(|&v| v == vertex)
                .map(|corner| FaceLocation::new(FaceIndex(f), Barycentric::corner(corner)))
        })
    }

    /// Appends the vertices and faces of `other`, offsetting its indices.
    pub fn union(mut self, other: &Self) -> Self {
        let offset = self.vertices.len();

        self.vertices.extend(other.vertices.iter().cloned());
        self.indices
            .extend(other.indices.iter().map(|t| IndexTriangle {
                a: VertexIndex(t.a.0 + offset),
                b: VertexIndex(t.b.0 + offset),
                c: VertexIndex(t.c.0 + offset),
            }));

        self
    }

    pub fn rescaled(mut self, scale_factor: f64) -> Self {
        for vertex in &mut self.vertices {
            *vertex = Point3::from(vertex.coords * scale_factor);
        }
        self
    }
}

impl From<parry3d_f64::shape::TriMesh> for TriangleMesh {
    fn from(mesh: parry3d_f64::shape::TriMesh) -> Self {
        let vertices = mesh
            .vertices()
            .iter()
            .map(|v| Point3::new(v.x, v.y, v.z))
            .collect();
        let indices = mesh
            .indices()
            .iter()
            .map(|f| IndexTriangle {
                a: VertexIndex(f[0] as usize),
                b: VertexIndex(f[1] as usize),
                c: VertexIndex(f[2] as usize),
            })
            .collect();
        TriangleMesh::new(vertices, indices)
    }
}

/// Groups vertices and faces into edge-connected components.
///
/// A source only ever reaches the component it lies in, which makes this
/// the ground truth for reachability.
pub struct ConnectedComponents {
    pub components: Vec<Vec<VertexIndex>>,
    pub triangle_components: Vec<Vec<FaceIndex>>,
    vertex_to_component: Vec<usize>,
}

impl ConnectedComponents {
    pub fn connected_components_of_mesh(mesh: &TriangleMesh) -> Self {
        let mut uf = QuickUnionUf::<UnionBySize>::new(mesh.vertices.len());

        for tri in &mesh.indices {
            uf.union(tri.a.0, tri.b.0);
            uf.union(tri.b.0, tri.c.0);
        }

        // Re-index the union-find roots as 0..m.
        let mut component_map = HashMap::new();
        let mut next_index = 0;

        let vertex_to_component = (0..mesh.vertices.len())
            .map(|i| {
                let component = uf.find(i);
                *component_map.entry(component).or_insert_with(|| {
                    let index = next_index;
                    next_index += 1;
                    index
                })
            })
            .collect::<Vec<_>>();

        let mut components = vec![Vec::new(); next_index];
        for (i, &component) in vertex_to_component.iter().enumerate() {
            components[component].push(VertexIndex(i));
        }

        let mut triangle_components = vec![Vec::new(); next_index];
        for (i, tri) in mesh.indices.iter().enumerate() {
            triangle_components[vertex_to_component[tri.a.0]].push(FaceIndex(i));
        }

        Self {
            components,
            triangle_components,
            vertex_to_component,
        }
    }

    pub fn component_of(&self, vertex: VertexIndex) -> usize {
        self.vertex_to_component[vertex.0]
    }

    pub fn same_component(&self, u: VertexIndex, v: VertexIndex) -> bool {
        self.component_of(u) == self.component_of(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proptest::{single_triangle, unit_cube};
    use approx::assert_relative_eq;

    #[test]
    fn test_connected_components_of_union() {
        let cube = unit_cube();
        let triangle = single_triangle().rescaled(2.0);
        let combined = cube.clone().union(&triangle);

        assert_eq!(combined.vertex_count(), 8 + 3);
        assert_eq!(combined.face_count(), 12 + 1);

        let components = ConnectedComponents::connected_components_of_mesh(&combined);
        assert_eq!(components.components.len(), 2);
        assert_eq!(components.components[0].len(), 8);
        assert_eq!(components.triangle_components[1], vec![FaceIndex(12)]);
        assert!(components.same_component(VertexIndex(0), VertexIndex(7)));
        assert!(!components.same_component(VertexIndex(0), VertexIndex(8)));
    }

    #[test]
    fn face_location_point_interpolates_corners() {
        let cube = unit_cube();
        let location = FaceLocation::new(FaceIndex(2), [0.2, 0.3, 0.5]);
        let tri = cube.euclidean_triangle(FaceIndex(2));
        let expected = tri.a.coords * 0.2 + tri.b.coords * 0.3 + tri.c.coords * 0.5;
        assert_relative_eq!(cube.face_location_point(location).coords, expected);
    }

    #[test]
    fn vertex_location_points_at_the_vertex() {
        let cube = unit_cube();
        for v in 0..cube.vertex_count() {
            let location = cube.vertex_location(VertexIndex(v)).unwrap();
            assert_relative_eq!(
                cube.face_location_point(location),
                cube.vertex(VertexIndex(v))
            );
        }
    }

    #[test]
    fn converts_from_parry_trimesh() {
        let cube = unit_cube();
        let vertices = cube
            .vertices
            .iter()
            .map(|v| parry3d_f64::math::Point::new(v.x, v.y, v.z))
            .collect();
        let indices = cube
            .indices
            .iter()
            .map(|f| [f.a.0 as u32, f.b.0 as u32, f.c.0 as u32])
            .collect();
        let parry_mesh = parry3d_f64::shape::TriMesh::new(vertices, indices).unwrap();

        let back = TriangleMesh::from(parry_mesh);
        assert_eq!(back.face_count(), cube.face_count());
        assert_eq!(back.vertex_count(), cube.vertex_count());
        for (a, b) in back.triangles().zip(cube.triangles()) {
            assert_relative_eq!(a.area(), b.area());
        }
    }
}
