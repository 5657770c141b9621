use crate::error::TopologyError;
use crate::mesh::trimesh::{FaceIndex, TriangleMesh, VertexIndex};
use crate::primitive::triangle::{Triangle, TriangleEdge};
use nalgebra::Point3;
use std::collections::HashMap;

/// Index type for half-edges.
///
/// Half-edge `3 * f + i` runs from corner `i` to corner `i + 1` of face `f`.
/// Border half-edges, which have no face, are numbered after all face half-edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HalfEdgeIndex(pub usize);

/// Data associated with a vertex in the half-edge structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexData {
    /// A half-edge pointing at this vertex, if any face uses it.
    pub incoming_edge: Option<HalfEdgeIndex>,
}

/// Data associated with a half-edge in the half-edge structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HalfEdgeData {
    /// The vertex at the origin of this half-edge.
    pub origin_vertex: VertexIndex,
    /// The half-edge in the opposite direction; a border half-edge where no face exists.
    pub twin_edge: HalfEdgeIndex,
    /// The next half-edge in the face, or along the boundary loop.
    pub next_edge: HalfEdgeIndex,
    /// The previous half-edge in the face, or along the boundary loop.
    pub prev_edge: HalfEdgeIndex,
    /// The face to which this half-edge belongs; `None` on the border.
    pub incident_face: Option<FaceIndex>,
}

/// Data associated with a face in the half-edge structure.
#[derive(Debug, Clone, Copy)]
pub struct FaceData {
    /// The AB half-edge of the face.
    pub incident_edge: HalfEdgeIndex,
}

/// The half-edge topology of a (possibly open) manifold triangle mesh.
///
/// Every directed edge of every triangle gets a half-edge. Edges used by a single
/// triangle additionally get a border half-edge in the other direction, and the
/// border half-edges of each hole are linked into a loop through `next`/`prev`.
/// With that in place `twin` is total, and walking `twin(next(e))` around a vertex
/// visits each incident face exactly once plus, on the boundary, one border half-edge.
pub struct HalfEdgeTopology {
    pub vertices: Vec<VertexData>,
    pub half_edges: Vec<HalfEdgeData>,
    pub faces: Vec<FaceData>,
}

impl HalfEdgeTopology {
    /// Constructs a `HalfEdgeTopology` from a given `TriangleMesh`.
    ///
    /// Triangles must be consistently oriented and the mesh must be manifold;
    /// boundaries are allowed.
    pub fn index_of_mesh(mesh: &TriangleMesh) -> Result<Self, TopologyError> {
        let vertex_count = mesh.vertices.len();

        for (f, triangle) in mesh.indices.iter().enumerate() {
            let [a, b, c] = triangle.vertices();
            if let Some(&vertex) = [a, b, c].iter().find(|v| v.0 >= vertex_count) {
                return Err(TopologyError::VertexOutOfRange {
                    face: FaceIndex(f),
                    vertex,
                    vertex_count,
                });
            }
            if a == b || b == c || c == a {
                return Err(TopologyError::DegenerateTriangle(FaceIndex(f)));
            }
        }

        let index_assignment = assign_indices_to_halfedges(mesh)?;

        let mut half_edges: Vec<HalfEdgeData> = mesh
            .indices
            .iter()
            .enumerate()
            .flat_map(|(face_index, triangle)| {
                let edges = triangle.edges();
                (0..3).map(move |i| HalfEdgeData {
                    origin_vertex: edges[i][0],
                    // Patched below once border half-edges exist.
                    twin_edge: HalfEdgeIndex(usize::MAX),
                    next_edge: HalfEdgeIndex(3 * face_index + (i + 1) % 3),
                    prev_edge: HalfEdgeIndex(3 * face_index + (i + 2) % 3),
                    incident_face: Some(FaceIndex(face_index)),
                })
            })
            .collect();

        // Pair up twins, creating a border half-edge wherever the reverse edge is missing.
        let face_half_edge_count = half_edges.len();
        let mut border_leaving: HashMap<VertexIndex, HalfEdgeIndex> = HashMap::new();

        for e in 0..face_half_edge_count {
            let from = half_edges[e].origin_vertex;
            let to = half_edges[half_edges[e].next_edge.0].origin_vertex;

            match index_assignment.get(&[to, from]) {
                Some(&twin) => half_edges[e].twin_edge = twin,
                None => {
                    let border = HalfEdgeIndex(half_edges.len());
                    half_edges.push(HalfEdgeData {
                        origin_vertex: to,
                        twin_edge: HalfEdgeIndex(e),
                        next_edge: HalfEdgeIndex(usize::MAX),
                        prev_edge: HalfEdgeIndex(usize::MAX),
                        incident_face: None,
                    });
                    half_edges[e].twin_edge = border;

                    if border_leaving.insert(to, border).is_some() {
                        return Err(TopologyError::NonManifoldVertex(to));
                    }
                }
            }
        }

        // Chain border half-edges into boundary loops.
        for b in face_half_edge_count..half_edges.len() {
            // The loop continues with the border half-edge leaving this one's target.
            let target = half_edges[half_edges[b].twin_edge.0].origin_vertex;
            let next = *border_leaving
                .get(&target)
                .ok_or(TopologyError::NonManifoldVertex(target))?;
            half_edges[b].next_edge = next;
            half_edges[next.0].prev_edge = HalfEdgeIndex(b);
        }

        let mut vertices = vec![
            VertexData {
                incoming_edge: None
            };
            vertex_count
        ];
        for (e, data) in half_edges.iter().enumerate() {
            let target = half_edges[data.twin_edge.0].origin_vertex;
            vertices[target.0].incoming_edge.get_or_insert(HalfEdgeIndex(e));
        }

        let faces = (0..mesh.indices.len())
            .map(|f| FaceData {
                incident_edge: HalfEdgeIndex(3 * f),
            })
            .collect();

        Ok(Self {
            vertices,
            half_edges,
            faces,
        })
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Number of half-edges, border half-edges included.
    pub fn half_edge_count(&self) -> usize {
        self.half_edges.len()
    }

    /// Returns the next half-edge in the face (or boundary loop).
    pub fn next(&self, e: HalfEdgeIndex) -> HalfEdgeIndex {
        self.half_edges[e.0].next_edge
    }

    /// Returns the previous half-edge in the face (or boundary loop).
    pub fn prev(&self, e: HalfEdgeIndex) -> HalfEdgeIndex {
        self.half_edges[e.0].prev_edge
    }

    /// Returns the twin half-edge.
    pub fn twin(&self, e: HalfEdgeIndex) -> HalfEdgeIndex {
        self.half_edges[e.0].twin_edge
    }

    /// Returns the vertex at the origin of the half-edge.
    pub fn origin(&self, e: HalfEdgeIndex) -> VertexIndex {
        self.half_edges[e.0].origin_vertex
    }

    /// Returns the vertex the half-edge points at.
    pub fn target(&self, e: HalfEdgeIndex) -> VertexIndex {
        self.origin(self.twin(e))
    }

    /// Returns the face to which the half-edge belongs.
    pub fn incident_face(&self, e: HalfEdgeIndex) -> Option<FaceIndex> {
        self.half_edges[e.0].incident_face
    }

    pub fn is_border(&self, e: HalfEdgeIndex) -> bool {
        self.incident_face(e).is_none()
    }

    /// Returns the incident half-edge of a face.
    pub fn incident_edge_of_face(&self, f: FaceIndex) -> HalfEdgeIndex {
        self.faces[f.0].incident_edge
    }

    /// The half-edge of `face` leaving corner `edge.index()`.
    pub fn face_halfedge(&self, face: FaceIndex, edge: TriangleEdge) -> HalfEdgeIndex {
        HalfEdgeIndex(self.incident_edge_of_face(face).0 + edge.index())
    }

    /// Which edge of its face a half-edge is; `None` for border half-edges.
    pub fn triangle_edge(&self, e: HalfEdgeIndex) -> Option<TriangleEdge> {
        self.incident_face(e)
            .map(|_| TriangleEdge::from_index(e.0 % 3))
    }

    /// Returns an iterator over the half-edges of a face.
    pub fn face_halfedges(&self, f: FaceIndex) -> impl Iterator<Item = HalfEdgeIndex> + '_ {
        let first_edge = self.incident_edge_of_face(f);
        std::iter::successors(Some(first_edge), move |&e| {
            let next = self.next(e);
            (next != first_edge).then_some(next)
        })
    }

    /// Returns the vertices of an edge.
    pub fn edge_vertices(&self, e: HalfEdgeIndex) -> [VertexIndex; 2] {
        [self.origin(e), self.target(e)]
    }

    /// Returns the points of an edge.
    pub fn edge_points(&self, e: HalfEdgeIndex, mesh: &TriangleMesh) -> [Point3<f64>; 2] {
        let [u, v] = self.edge_vertices(e);
        [mesh.vertex(u), mesh.vertex(v)]
    }

    /// The triangle `(origin(e), target(e), target(next(e)))`.
    ///
    /// For a border half-edge, the third corner is the next vertex along the boundary.
    pub fn triangle_from_halfedge(&self, e: HalfEdgeIndex, mesh: &TriangleMesh) -> Triangle {
        Triangle::new(
            mesh.vertex(self.origin(e)),
            mesh.vertex(self.target(e)),
            mesh.vertex(self.target(self.next(e))),
        )
    }

    /// Returns an iterator over the half-edges pointing at a vertex.
    ///
    /// The walk goes from one incoming half-edge `h` to `twin(next(h))` until it
    /// returns to the start. It yields one half-edge per incident face and, for
    /// a boundary vertex, exactly one border half-edge. Isolated vertices yield nothing.
    pub fn incoming_halfedges(&self, v: VertexIndex) -> impl Iterator<Item = HalfEdgeIndex> + '_ {
        let first_edge = self.vertices[v.0].incoming_edge;

        std::iter::successors(first_edge, move |&e| {
            let next = self.twin(self.next(e));
            (Some(next) != first_edge).then_some(next)
        })
    }

    /// Whether any half-edge around the vertex lies on the border.
    pub fn is_boundary_vertex(&self, v: VertexIndex) -> bool {
        self.incoming_halfedges(v).any(|e| self.is_border(e))
    }

    /// Whether some face uses the vertex.
    pub fn is_used_vertex(&self, v: VertexIndex) -> bool {
        self.vertices[v.0].incoming_edge.is_some()
    }
}

/// Assigns indices to the face half-edges of a given `TriangleMesh`, keyed by their
/// `[origin, target]` vertex pair.
fn assign_indices_to_halfedges(
    mesh: &TriangleMesh,
) -> Result<HashMap<[VertexIndex; 2], HalfEdgeIndex>, TopologyError> {
    let mut index_assignment = HashMap::with_capacity(mesh.indices.len() * 3);

    for (i, edge) in mesh.indices.iter().flat_map(|t| t.edges()).enumerate() {
        if index_assignment.insert(edge, HalfEdgeIndex(i)).is_some() {
            return Err(TopologyError::DuplicateHalfEdge {
                from: edge[0],
                to: edge[1],
            });
        }
    }

    Ok(index_assignment)
}
