//! The propagation tree: unfolded visibility cones and their parent/child links.
//!
//! Nodes live in an arena and refer to each other by [`NodeId`]. Deleting a node leaves
//! a tombstone; ids are never reused within a computation, so a stale id can always
//! be detected with [`ConeTree::is_alive`].

use crate::intersection::Orientation;
use crate::kernel::ShortestPathKernel;
use crate::mesh::halfedge::{HalfEdgeIndex, HalfEdgeTopology};
use crate::mesh::trimesh::{FaceIndex, VertexIndex};
use crate::mesh_shortest_paths::expansion::EventId;
use crate::primitive::infinite_triangle::InfiniteTriangle;
use crate::primitive::ray::Ray2;
use crate::primitive::segment::Segment2;
use crate::primitive::triangle::Triangle2;
use nalgebra::Point2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// One per source location; carries no geometry of its own.
    Root,
    /// A cone leaving a source that lies strictly inside a face.
    FaceSource,
    /// A cone leaving a source that lies on an edge.
    EdgeSource,
    /// A cone leaving a vertex: either a vertex source or a pseudo-source.
    VertexSource,
    /// A cone that entered its face across an edge from its parent's face.
    Interval,
}

impl NodeKind {
    pub fn is_source(self) -> bool {
        matches!(
            self,
            NodeKind::FaceSource | NodeKind::EdgeSource | NodeKind::VertexSource
        )
    }
}

/// Unfolded geometry of a non-root node.
///
/// The layout triangle holds `(origin(entry), target(entry), target(next(entry)))`.
/// The source image sits on the right of the entry segment, or on it for source nodes.
/// The window is bounded by the rays from the source image through `window_left` and
/// `window_right`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cone {
    pub entry_edge: HalfEdgeIndex,
    /// `None` for the cones a boundary pseudo-source sends along the border.
    pub face: Option<FaceIndex>,
    pub target_vertex: VertexIndex,
    pub layout: Triangle2,
    pub source_image: Point2<f64>,
    /// Geodesic distance from the true source to the (pseudo-)source this cone emanates from.
    pub source_distance: f64,
    pub window_left: Point2<f64>,
    pub window_right: Point2<f64>,
}

impl Cone {
    pub fn new(
        entry_edge: HalfEdgeIndex,
        topology: &HalfEdgeTopology,
        layout: Triangle2,
        source_image: Point2<f64>,
        source_distance: f64,
        window_left: Point2<f64>,
        window_right: Point2<f64>,
    ) -> Self {
        Self {
            entry_edge,
            face: topology.incident_face(entry_edge),
            target_vertex: topology.target(topology.next(entry_edge)),
            layout,
            source_image,
            source_distance,
            window_left,
            window_right,
        }
    }

    pub fn is_null_face(&self) -> bool {
        self.face.is_none()
    }

    pub fn distance_to_root(&self, point: Point2<f64>) -> f64 {
        (point - self.source_image).norm() + self.source_distance
    }

    pub fn target_location(&self) -> Point2<f64> {
        self.layout.c
    }

    pub fn distance_to_target(&self) -> f64 {
        self.distance_to_root(self.target_location())
    }

    pub fn entry_segment(&self) -> Segment2 {
        Segment2::new(self.layout.a, self.layout.b)
    }

    /// The edge shared with the face across `twin(prev(entry))`.
    pub fn left_child_base_segment(&self) -> Segment2 {
        Segment2::new(self.layout.a, self.layout.c)
    }

    /// The edge shared with the face across `twin(next(entry))`.
    pub fn right_child_base_segment(&self) -> Segment2 {
        Segment2::new(self.layout.c, self.layout.b)
    }

    pub fn ray_to_target(&self) -> Ray2 {
        Ray2::new(self.source_image, self.target_location())
    }

    pub fn wedge(&self) -> InfiniteTriangle {
        InfiniteTriangle::new(self.source_image, self.window_left, self.window_right)
    }

    /// Whether part of the window lies left of the target vertex, i.e. reaches the left child edge.
    pub fn has_left_side<K: ShortestPathKernel>(&self, kind: NodeKind, kernel: &K) -> bool {
        kind.is_source()
            || kernel.orientation(self.source_image, self.window_left, self.target_location())
                != Orientation::LeftTurn
    }

    /// Whether part of the window lies strictly right of the target vertex. Source cones
    /// never have a right side: their siblings cover it.
    ///
    /// A target on the right boundary ray belongs to the neighbouring window, whose left
    /// boundary passes through it.
    pub fn has_right_side<K: ShortestPathKernel>(&self, kind: NodeKind, kernel: &K) -> bool {
        !kind.is_source()
            && kernel.orientation(self.source_image, self.window_right, self.target_location())
                == Orientation::LeftTurn
    }
}

#[derive(Debug, Clone)]
pub struct ConeNode {
    pub kind: NodeKind,
    /// Index of the source this node descends from.
    pub tree_id: usize,
    pub level: usize,
    /// `None` exactly for roots.
    pub cone: Option<Cone>,
    /// For the root of a vertex source, that vertex.
    pub anchor: Option<VertexIndex>,
    pub parent: Option<NodeId>,
    pub left_child: Option<NodeId>,
    pub right_child: Option<NodeId>,
    pub middle_children: Vec<NodeId>,
    pub pending_left: Option<EventId>,
    pub pending_right: Option<EventId>,
    pub pending_middle: Option<EventId>,
}

impl ConeNode {
    pub fn root(tree_id: usize, anchor: Option<VertexIndex>) -> Self {
        Self {
            kind: NodeKind::Root,
            tree_id,
            level: 0,
            cone: None,
            anchor,
            parent: None,
            left_child: None,
            right_child: None,
            middle_children: Vec::new(),
            pending_left: None,
            pending_right: None,
            pending_middle: None,
        }
    }

    pub fn child(parent: NodeId, parent_node: &ConeNode, kind: NodeKind, cone: Cone) -> Self {
        Self {
            kind,
            tree_id: parent_node.tree_id,
            level: parent_node.level + 1,
            cone: Some(cone),
            parent: Some(parent),
            ..Self::root(parent_node.tree_id, None)
        }
    }

    pub fn is_root(&self) -> bool {
        self.kind == NodeKind::Root
    }

    pub fn cone(&self) -> &Cone {
        self.cone.as_ref().expect("Root nodes carry no cone.")
    }
}

/// Arena of cone nodes.
#[derive(Debug, Default)]
pub struct ConeTree {
    nodes: Vec<Option<ConeNode>>,
    live: usize,
}

impl ConeTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.live = 0;
    }

    pub fn insert(&mut self, node: ConeNode) -> NodeId {
        self.nodes.push(Some(node));
        self.live += 1;
        NodeId(self.nodes.len() - 1)
    }

    /// Attaches a new child node below `parent`. The caller links it into the
    /// parent's left/right/middle slot.
    pub fn insert_child(&mut self, parent: NodeId, kind: NodeKind, cone: Cone) -> NodeId {
        let child = ConeNode::child(parent, self.node(parent), kind, cone);
        self.insert(child)
    }

    pub fn get(&self, id: NodeId) -> Option<&ConeNode> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    pub fn is_alive(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    pub fn node(&self, id: NodeId) -> &ConeNode {
        self.get(id).expect("Stale cone node handle.")
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut ConeNode {
        self.nodes
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .expect("Stale cone node handle.")
    }

    pub fn cone(&self, id: NodeId) -> &Cone {
        self.node(id).cone()
    }

    /// Turns the node into a tombstone and hands it back. Links to and from it are
    /// left to the caller.
    pub fn remove(&mut self, id: NodeId) -> Option<ConeNode> {
        let node = self.nodes.get_mut(id.0).and_then(Option::take);
        if node.is_some() {
            self.live -= 1;
        }
        node
    }

    pub fn live_count(&self) -> usize {
        self.live
    }

    /// Number of nodes ever allocated, tombstones included.
    pub fn allocated_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn iter_live(&self) -> impl Iterator<Item = (NodeId, &ConeNode)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, node)| node.as_ref().map(|node| (NodeId(i), node)))
    }

    pub fn is_left_child(&self, id: NodeId) -> bool {
        self.node(id)
            .parent
            .is_some_and(|parent| self.node(parent).left_child == Some(id))
    }

    pub fn is_right_child(&self, id: NodeId) -> bool {
        self.node(id)
            .parent
            .is_some_and(|parent| self.node(parent).right_child == Some(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::DefaultKernel;
    use crate::proptest::single_triangle;

    fn sample_cone(
        topology: &HalfEdgeTopology,
        window_left: Point2<f64>,
        window_right: Point2<f64>,
    ) -> Cone {
        let layout = Triangle2::new(
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(1.0, 1.0),
        );
        Cone::new(
            HalfEdgeIndex(0),
            topology,
            layout,
            Point2::new(1.0, -1.0),
            0.5,
            window_left,
            window_right,
        )
    }

    #[test]
    fn tombstones_are_detected() {
        let mut tree = ConeTree::new();
        let root = tree.insert(ConeNode::root(0, None));
        let triangle = single_triangle();
        let topology = HalfEdgeTopology::index_of_mesh(&triangle).unwrap();
        let child = tree.insert_child(
            root,
            NodeKind::Interval,
            sample_cone(&topology, Point2::new(0.0, 0.0), Point2::new(2.0, 0.0)),
        );
        tree.node_mut(root).left_child = Some(child);

        assert_eq!(tree.node(child).level, 1);
        assert!(tree.is_left_child(child));
        assert!(!tree.is_right_child(child));
        assert_eq!(tree.live_count(), 2);

        assert!(tree.remove(child).is_some());
        assert!(!tree.is_alive(child));
        assert!(tree.remove(child).is_none());
        assert_eq!(tree.live_count(), 1);

        // Ids are not recycled.
        let again = tree.insert(ConeNode::root(1, None));
        assert_ne!(again, child);
        assert_eq!(tree.allocated_count(), 3);
    }

    #[test]
    fn window_sides_relative_to_target() {
        let triangle = single_triangle();
        let topology = HalfEdgeTopology::index_of_mesh(&triangle).unwrap();

        // Spans the whole entry edge: the target (1, 1) is strictly inside.
        let full = sample_cone(&topology, Point2::new(0.0, 0.0), Point2::new(2.0, 0.0));
        assert!(full.has_left_side(NodeKind::Interval, &DefaultKernel));
        assert!(full.has_right_side(NodeKind::Interval, &DefaultKernel));
        assert!((full.distance_to_target() - (2.0 + 0.5)).abs() < 1.0e-12);

        // Left boundary passes right of the target.
        let narrow = sample_cone(&topology, Point2::new(1.5, 0.0), Point2::new(2.0, 0.0));
        assert!(!narrow.has_left_side(NodeKind::Interval, &DefaultKernel));
        assert!(narrow.has_right_side(NodeKind::Interval, &DefaultKernel));

        // Two windows meeting on the ray through the target: only the right-hand one,
        // whose left boundary is that ray, counts the target as inside.
        let left_half = sample_cone(&topology, Point2::new(0.0, 0.0), Point2::new(1.0, 0.0));
        let right_half = sample_cone(&topology, Point2::new(1.0, 0.0), Point2::new(2.0, 0.0));
        assert!(left_half.has_left_side(NodeKind::Interval, &DefaultKernel));
        assert!(!left_half.has_right_side(NodeKind::Interval, &DefaultKernel));
        assert!(right_half.has_left_side(NodeKind::Interval, &DefaultKernel));
        assert!(right_half.has_right_side(NodeKind::Interval, &DefaultKernel));

        // Source cones only ever propagate left.
        assert!(narrow.has_left_side(NodeKind::VertexSource, &DefaultKernel));
        assert!(!full.has_right_side(NodeKind::FaceSource, &DefaultKernel));
    }
}
