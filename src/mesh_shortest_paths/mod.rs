//! Exact geodesic distances and shortest paths over the surface of a triangle mesh.
//!
//! Distances are computed by growing a tree of unfolded visibility cones outwards from
//! one or more sources (the Chen-Han approach), in order of a lower bound on the distance
//! they can still reach, the way Dijkstra's algorithm settles a graph. Per-edge and
//! per-vertex occupancy records prune cones that are beaten by a shorter arrival, and the
//! Xin-Wang filter rejects cones before they are created.
//!
//! It is based on the documentation https://doc.cgal.org/5.6.2/Surface_mesh_shortest_path/index.html

pub mod cone_tree;
pub mod expansion;
pub mod occupancy;
pub mod path;
mod propagation;

use crate::error::{Result, ShortestPathError};
use crate::kernel::{DefaultKernel, ShortestPathKernel};
use crate::mesh::halfedge::{HalfEdgeIndex, HalfEdgeTopology};
use crate::mesh::trimesh::{FaceIndex, FaceLocation, TriangleMesh, VertexIndex};
use crate::mesh_shortest_paths::cone_tree::{Cone, ConeTree, NodeId, NodeKind};
use crate::mesh_shortest_paths::expansion::ExpansionQueue;
use crate::mesh_shortest_paths::occupancy::OccupancyTable;
use crate::mesh_shortest_paths::path::{PathVisitor, PointPathAdapter, PointPathVisitor};
use crate::primitive::barycentric::{Barycentric, BarycentricKind};
use crate::primitive::ray::Ray2;
use nalgebra::{Point2, Point3};
use ordered_float::OrderedFloat;
use tracing::debug;

/// Edge crossings within this fraction of an edge's end are reported as that vertex.
const VERTEX_CROSSING_TOLERANCE: f64 = 1.0e-9;

/// Tuning knobs of a [`SurfaceShortestPath`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShortestPathOptions {
    /// Emit a `trace!` record for every processed event, eviction and filtered window.
    pub debug_output: bool,
    /// Relative slack on the distance filter, so that rounding never rejects a window that ties.
    pub filter_tolerance: f64,
    /// Clipped child windows narrower than this fraction of their edge are not scheduled.
    pub min_window_width: f64,
}

impl Default for ShortestPathOptions {
    fn default() -> Self {
        Self {
            debug_output: false,
            filter_tolerance: 1.0e-10,
            min_window_width: 1.0e-12,
        }
    }
}

impl ShortestPathOptions {
    pub fn with_debug_output(mut self, debug_output: bool) -> Self {
        self.debug_output = debug_output;
        self
    }

    pub fn with_filter_tolerance(mut self, filter_tolerance: f64) -> Self {
        self.filter_tolerance = filter_tolerance;
        self
    }

    pub fn with_min_window_width(mut self, min_window_width: f64) -> Self {
        self.min_window_width = min_window_width;
        self
    }
}

/// Counters describing the last computation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PropagationStats {
    pub nodes_created: usize,
    pub nodes_deleted: usize,
    pub events_pushed: usize,
    pub events_processed: usize,
    pub events_cancelled: usize,
    pub windows_filtered: usize,
    pub max_level: usize,
}

#[derive(Debug, Clone, Copy)]
struct SourceRoot {
    location: FaceLocation,
    root: NodeId,
}

/// Single- or multi-source geodesic distance field over a mesh.
///
/// Run [`Self::compute_shortest_paths`] (or [`Self::compute_shortest_paths_from`]) first;
/// queries then read the converged cone tree. Before any computation every target is
/// unreachable.
pub struct SurfaceShortestPath<'a, K = DefaultKernel> {
    mesh: &'a TriangleMesh,
    topology: &'a HalfEdgeTopology,
    kernel: K,
    options: ShortestPathOptions,
    /// Boundary and saddle vertices, from which new wavefronts fan out.
    pseudo_source_vertices: Vec<bool>,
    tree: ConeTree,
    queue: ExpansionQueue,
    edge_occupants: OccupancyTable<HalfEdgeIndex>,
    vertex_occupants: OccupancyTable<VertexIndex>,
    sources: Vec<SourceRoot>,
    /// For every face, the nodes whose cone covers it, by increasing source distance.
    face_occupants: Vec<Vec<NodeId>>,
    stats: PropagationStats,
}

impl<'a> SurfaceShortestPath<'a, DefaultKernel> {
    pub fn new(mesh: &'a TriangleMesh, topology: &'a HalfEdgeTopology) -> Self {
        Self::with_kernel(mesh, topology, DefaultKernel, ShortestPathOptions::default())
    }
}

impl<'a, K: ShortestPathKernel> SurfaceShortestPath<'a, K> {
    /// # Panics
    ///
    /// If `topology` was not built from `mesh`.
    pub fn with_kernel(
        mesh: &'a TriangleMesh,
        topology: &'a HalfEdgeTopology,
        kernel: K,
        options: ShortestPathOptions,
    ) -> Self {
        assert_eq!(
            mesh.face_count(),
            topology.face_count(),
            "The topology was built for a different mesh."
        );

        let pseudo_source_vertices = (0..mesh.vertex_count())
            .map(VertexIndex)
            .map(|v| {
                topology.is_used_vertex(v)
                    && (topology.is_boundary_vertex(v) || kernel.is_saddle_vertex(v, mesh, topology))
            })
            .collect();

        Self {
            mesh,
            topology,
            kernel,
            options,
            pseudo_source_vertices,
            tree: ConeTree::new(),
            queue: ExpansionQueue::new(),
            edge_occupants: OccupancyTable::new(topology.half_edge_count()),
            vertex_occupants: OccupancyTable::new(mesh.vertex_count()),
            sources: Vec::new(),
            face_occupants: vec![Vec::new(); mesh.face_count()],
            stats: PropagationStats::default(),
        }
    }

    pub fn with_options(mut self, options: ShortestPathOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &ShortestPathOptions {
        &self.options
    }

    pub fn mesh(&self) -> &TriangleMesh {
        self.mesh
    }

    pub fn topology(&self) -> &HalfEdgeTopology {
        self.topology
    }

    pub fn stats(&self) -> PropagationStats {
        self.stats
    }

    pub fn cone_tree(&self) -> &ConeTree {
        &self.tree
    }

    /// Whether `v` lies on the boundary or is a saddle.
    pub fn is_pseudo_source_vertex(&self, v: VertexIndex) -> bool {
        self.pseudo_source_vertices.get(v.0).copied().unwrap_or(false)
    }

    /// The sources of the last computation, in the order they were given.
    pub fn source_locations(&self) -> impl Iterator<Item = FaceLocation> + '_ {
        self.sources.iter().map(|source| source.location)
    }

    pub fn face_location_point(&self, location: FaceLocation) -> Point3<f64> {
        self.mesh.face_location_point(location)
    }

    /// Computes distances from a single source.
    ///
    /// # Panics
    ///
    /// If the face is not part of the mesh or the barycentric coordinate is outside the unit simplex.
    pub fn compute_shortest_paths(&mut self, face: FaceIndex, barycentric: impl Into<Barycentric>) {
        self.compute_shortest_paths_from([FaceLocation::new(face, barycentric)]);
    }

    /// Computes distances to the nearest of several sources, discarding any earlier result.
    ///
    /// # Panics
    ///
    /// If a source face is not part of the mesh or a source barycentric coordinate is
    /// outside the unit simplex.
    pub fn compute_shortest_paths_from<I>(&mut self, sources: I)
    where
        I: IntoIterator<Item = FaceLocation>,
    {
        self.reset();

        for location in sources {
            assert!(
                location.face.0 < self.mesh.face_count(),
                "Source face {:?} is not part of the mesh.",
                location.face
            );
            assert!(
                location.barycentric.is_valid(),
                "Source barycentric coordinate {:?} is outside the unit simplex.",
                location.barycentric.0
            );
            self.expand_root(location);
        }

        debug!(
            sources = self.sources.len(),
            faces = self.mesh.face_count(),
            "Propagating shortest paths."
        );

        self.propagate();
        self.stats.events_cancelled = self.queue.discarded_count();
        self.build_face_occupants();

        debug!(
            live_nodes = self.tree.live_count(),
            nodes_created = self.stats.nodes_created,
            nodes_deleted = self.stats.nodes_deleted,
            events_processed = self.stats.events_processed,
            events_cancelled = self.stats.events_cancelled,
            windows_filtered = self.stats.windows_filtered,
            max_level = self.stats.max_level,
            "Shortest path propagation finished."
        );
    }

    fn reset(&mut self) {
        self.tree.clear();
        self.queue.clear();
        self.edge_occupants.reset(self.topology.half_edge_count());
        self.vertex_occupants.reset(self.mesh.vertex_count());
        self.sources.clear();
        self.face_occupants = vec![Vec::new(); self.mesh.face_count()];
        self.stats = PropagationStats::default();
    }

    fn build_face_occupants(&mut self) {
        for (id, node) in self.tree.iter_live() {
            if let Some(face) = node.cone.and_then(|cone| cone.face) {
                self.face_occupants[face.0].push(id);
            }
        }

        let tree = &self.tree;
        for occupants in &mut self.face_occupants {
            occupants.sort_by_key(|id| OrderedFloat(tree.cone(*id).source_distance));
        }
    }

    ////////////////
    // Queries:   //
    ////////////////

    pub fn shortest_distance_to_vertex(&self, v: VertexIndex) -> Result<f64> {
        self.validate_vertex(v)?;
        let distance = self.vertex_occupants.get(v).distance;
        if distance.is_finite() {
            Ok(distance)
        } else {
            Err(ShortestPathError::Unreachable)
        }
    }

    pub fn shortest_distance_to_location(&self, location: FaceLocation) -> Result<f64> {
        self.nearest_on_face(location).map(|(_, distance)| distance)
    }

    /// The node whose cone gives the shortest distance to a face location, and that distance.
    pub fn nearest_on_face(&self, location: FaceLocation) -> Result<(NodeId, f64)> {
        self.validate_location(location)?;

        let mut best: Option<(NodeId, f64)> = None;

        for &id in &self.face_occupants[location.face.0] {
            let cone = self.tree.cone(id);

            // Sorted by source distance: nothing further along can do better.
            if best.is_some_and(|(_, distance)| cone.source_distance >= distance) {
                break;
            }

            let point = self.location_in_cone(cone, location);
            if cone.wedge().contains_point(point) {
                let distance = cone.distance_to_root(point);
                if best.map_or(true, |(_, best_distance)| distance < best_distance) {
                    best = Some((id, distance));
                }
            }
        }

        best.ok_or(ShortestPathError::Unreachable)
    }

    /// Reports the shortest path from `v` back to its source.
    pub fn shortest_path_sequence_to_vertex(
        &self,
        v: VertexIndex,
        visitor: &mut impl PathVisitor,
    ) -> Result<()> {
        self.validate_vertex(v)?;
        let node = self
            .vertex_occupants
            .get(v)
            .node
            .ok_or(ShortestPathError::Unreachable)?;

        match self.tree.node(node).cone {
            Some(cone) => self.visit_path(node, cone.target_location(), visitor),
            // The vertex is a source.
            None => Ok(()),
        }
    }

    /// Reports the shortest path from a face location back to its source.
    pub fn shortest_path_sequence_to_location(
        &self,
        location: FaceLocation,
        visitor: &mut impl PathVisitor,
    ) -> Result<()> {
        let (node, _) = self.nearest_on_face(location)?;
        let point = self.location_in_cone(self.tree.cone(node), location);
        self.visit_path(node, point, visitor)
    }

    /// Emits the points of the shortest path from `v` to its source, `v` first.
    pub fn shortest_path_points_to_vertex(
        &self,
        v: VertexIndex,
        visitor: &mut impl PointPathVisitor,
    ) -> Result<()> {
        self.validate_vertex(v)?;
        if self.vertex_occupants.get(v).node.is_none() {
            return Err(ShortestPathError::Unreachable);
        }
        visitor.point(self.mesh.vertex(v));
        let mut adapter = PointPathAdapter::new(self.mesh, self.topology, visitor);
        self.shortest_path_sequence_to_vertex(v, &mut adapter)
    }

    /// Emits the points of the shortest path from a face location to its source, the
    /// location itself first.
    pub fn shortest_path_points_to_location(
        &self,
        location: FaceLocation,
        visitor: &mut impl PointPathVisitor,
    ) -> Result<()> {
        let (node, _) = self.nearest_on_face(location)?;
        let point = self.location_in_cone(self.tree.cone(node), location);

        visitor.point(self.mesh.face_location_point(location));
        let mut adapter = PointPathAdapter::new(self.mesh, self.topology, visitor);
        self.visit_path(node, point, &mut adapter)
    }

    /// Walks from `start` up to its root, re-expressing `point` in each ancestor's unfolding.
    ///
    /// A path running through a vertex crosses several of its edges at their ends; the
    /// vertex is reported once for all of them.
    fn visit_path(
        &self,
        start: NodeId,
        mut point: Point2<f64>,
        visitor: &mut impl PathVisitor,
    ) -> Result<()> {
        let mut current = start;
        let mut last_vertex = None;

        loop {
            let node = self.tree.node(current);
            let (Some(cone), Some(parent)) = (node.cone, node.parent) else {
                return Ok(());
            };

            match node.kind {
                NodeKind::Interval => {
                    let entry = cone.entry_segment();
                    let crossing = self
                        .kernel
                        .intersect_segment_line(&entry, &Ray2::new(cone.source_image, point))
                        .ok_or(ShortestPathError::DegeneratePath(cone.entry_edge))?;
                    let alpha = self
                        .kernel
                        .parametric_distance_along_segment(entry.a, entry.b, crossing)
                        .clamp(0.0, 1.0);

                    let corner = if alpha <= VERTEX_CROSSING_TOLERANCE {
                        Some(self.topology.origin(cone.entry_edge))
                    } else if alpha >= 1.0 - VERTEX_CROSSING_TOLERANCE {
                        Some(self.topology.target(cone.entry_edge))
                    } else {
                        None
                    };
                    match corner {
                        Some(vertex) if last_vertex == Some(vertex) => {}
                        Some(vertex) => visitor.vertex(vertex),
                        None => visitor.edge(cone.entry_edge, alpha),
                    }
                    last_vertex = corner;

                    let parent_cone = self.tree.cone(parent);
                    let base = if self.tree.is_left_child(current) {
                        parent_cone.left_child_base_segment()
                    } else {
                        parent_cone.right_child_base_segment()
                    };
                    point = base.interpolate(alpha);
                }
                NodeKind::VertexSource => {
                    let vertex = self.topology.target(cone.entry_edge);
                    if last_vertex != Some(vertex) {
                        visitor.vertex(vertex);
                    }
                    last_vertex = Some(vertex);

                    if let Some(parent_cone) = self.tree.node(parent).cone {
                        point = parent_cone.target_location();
                    }
                }
                NodeKind::EdgeSource => {
                    let location = self.sources[node.tree_id].location;
                    if let Some((edge, alpha)) = self.source_edge_crossing(location) {
                        visitor.edge(edge, alpha);
                    }
                    return Ok(());
                }
                NodeKind::FaceSource => {
                    visitor.face(self.sources[node.tree_id].location);
                    return Ok(());
                }
                NodeKind::Root => return Ok(()),
            }

            current = parent;
        }
    }

    /// The source's position on its edge, as a half-edge and a fraction along it.
    fn source_edge_crossing(&self, location: FaceLocation) -> Option<(HalfEdgeIndex, f64)> {
        match location.barycentric.classify() {
            BarycentricKind::Edge(edge) => Some((
                self.topology.face_halfedge(location.face, edge),
                location.barycentric.weight(edge.index() + 1),
            )),
            _ => None,
        }
    }

    /// The location in the unfolding of `cone`, which must lie on the location's face.
    fn location_in_cone(&self, cone: &Cone, location: FaceLocation) -> Point2<f64> {
        let shift = self
            .topology
            .triangle_edge(cone.entry_edge)
            .map_or(0, |edge| edge.index());
        cone.layout.location(location.barycentric.shifted(shift))
    }

    fn validate_vertex(&self, v: VertexIndex) -> Result<()> {
        if v.0 < self.mesh.vertex_count() {
            Ok(())
        } else {
            Err(ShortestPathError::InvalidVertex(v))
        }
    }

    fn validate_location(&self, location: FaceLocation) -> Result<()> {
        if location.face.0 >= self.mesh.face_count() {
            Err(ShortestPathError::InvalidFace(location.face))
        } else if !location.barycentric.is_valid() {
            Err(ShortestPathError::InvalidBarycentric(location.barycentric.0))
        } else {
            Ok(())
        }
    }
}
