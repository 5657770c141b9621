//! Growth of the cone tree: root expansion, node processing, child scheduling and eviction.

use crate::kernel::ShortestPathKernel;
use crate::mesh::halfedge::HalfEdgeIndex;
use crate::mesh::trimesh::{FaceLocation, VertexIndex};
use crate::mesh_shortest_paths::cone_tree::{Cone, ConeNode, NodeId, NodeKind};
use crate::mesh_shortest_paths::expansion::{ExpansionEvent, ExpansionKind};
use crate::mesh_shortest_paths::{SourceRoot, SurfaceShortestPath};
use crate::primitive::barycentric::BarycentricKind;
use crate::primitive::ray::Ray2;
use crate::primitive::segment::Segment2;
use crate::primitive::triangle::{Triangle2, TriangleEdge};
use nalgebra::{distance, Point2};
use std::cmp::Ordering;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ChildSide {
    Left,
    Right,
}

impl<K: ShortestPathKernel> SurfaceShortestPath<'_, K> {
    /// Pops events until the queue is empty.
    pub(super) fn propagate(&mut self) {
        while let Some(event) = self.queue.pop() {
            self.stats.events_processed += 1;

            if self.options.debug_output {
                trace!(
                    parent = ?event.parent,
                    kind = ?event.kind,
                    estimate = event.distance_estimate,
                    "Popped expansion event."
                );
            }

            match event.kind {
                ExpansionKind::LeftChild => self.expand_child(event, ChildSide::Left),
                ExpansionKind::RightChild => self.expand_child(event, ChildSide::Right),
                ExpansionKind::PseudoSource => self.expand_pseudo_source(event.parent),
            }
        }
    }

    ///////////////////
    // Source roots: //
    ///////////////////

    pub(super) fn expand_root(&mut self, location: FaceLocation) {
        match location.barycentric.classify() {
            BarycentricKind::Interior => {
                let root = self.insert_root(location, None);
                self.expand_face_root(root, location);
            }
            BarycentricKind::Edge(edge) => {
                let root = self.insert_root(location, None);
                self.expand_edge_root(root, location, edge);
            }
            BarycentricKind::Vertex(corner) => {
                let vertex = self.mesh.triangle(location.face).vertices()[corner];
                let root = self.insert_root(location, Some(vertex));
                self.vertex_occupants.set(vertex, root, 0.0);
                self.expand_pseudo_source(root);
            }
        }
    }

    fn insert_root(&mut self, location: FaceLocation, anchor: Option<VertexIndex>) -> NodeId {
        let root = self.tree.insert(ConeNode::root(self.sources.len(), anchor));
        self.sources.push(SourceRoot { location, root });
        self.stats.nodes_created += 1;
        root
    }

    /// One cone per edge of the face, each covering the part of the face between the
    /// source and that edge's origin corner.
    fn expand_face_root(&mut self, root: NodeId, location: FaceLocation) {
        for corner in 0..3 {
            let entry = self
                .topology
                .face_halfedge(location.face, TriangleEdge::from_index(corner));
            let layout = self.unfold(entry);
            let source_image = layout.location(location.barycentric.shifted(corner));
            let cone = Cone::new(
                entry,
                self.topology,
                layout,
                source_image,
                0.0,
                layout.a,
                layout.c,
            );
            let child = self.attach_middle_child(root, NodeKind::FaceSource, cone);
            self.process_node(child);
        }
    }

    /// Two cones into each face beside the source edge, split by the line from the
    /// source to the face's far corner.
    fn expand_edge_root(&mut self, root: NodeId, location: FaceLocation, edge: TriangleEdge) {
        let halfedge = self.topology.face_halfedge(location.face, edge);
        let w_origin = location.barycentric.weight(edge.index());
        let w_target = location.barycentric.weight(edge.index() + 1);

        let sides = [
            (halfedge, w_origin, w_target),
            (self.topology.twin(halfedge), w_target, w_origin),
        ];

        for (side, w_a, w_b) in sides {
            if self.topology.is_border(side) {
                continue;
            }

            let layout = self.unfold(side);
            let source_image = Point2::from(layout.a.coords * w_a + layout.b.coords * w_b);
            let across = layout.rotated(2);

            let cones = [
                Cone::new(side, self.topology, layout, source_image, 0.0, layout.a, layout.c),
                Cone::new(
                    self.topology.prev(side),
                    self.topology,
                    across,
                    source_image,
                    0.0,
                    across.a,
                    across.c,
                ),
            ];

            for cone in cones {
                let child = self.attach_middle_child(root, NodeKind::EdgeSource, cone);
                self.process_node(child);
            }
        }

        // On a border edge nothing lies across from the source, so the edge's origin
        // is claimed by a cone running back along the edge itself.
        if self.topology.is_border(self.topology.twin(halfedge)) {
            let layout = self.unfold(halfedge);
            let source_image = Point2::from(layout.a.coords * w_origin + layout.b.coords * w_target);
            let along = layout.rotated(1);
            let cone = Cone::new(
                self.topology.next(halfedge),
                self.topology,
                along,
                source_image,
                0.0,
                along.a,
                along.c,
            );
            let child = self.attach_middle_child(root, NodeKind::EdgeSource, cone);
            self.process_node(child);
        }
    }

    /// Fans out from the target vertex of `parent` (or from the vertex of a vertex source root)
    /// into every face around it.
    ///
    /// On the boundary, the fan also contains one cone whose entry half-edge is a border
    /// half-edge; it only exists to claim the next vertex along the boundary.
    pub(super) fn expand_pseudo_source(&mut self, parent: NodeId) {
        let node = self.tree.node_mut(parent);
        node.pending_middle = None;

        let (vertex, source_distance) = match (node.cone, node.anchor) {
            (Some(cone), _) => (cone.target_vertex, cone.distance_to_target()),
            (None, Some(vertex)) => (vertex, 0.0),
            (None, None) => return,
        };

        if self.options.debug_output {
            trace!(?parent, ?vertex, source_distance, "Expanding pseudo-source.");
        }

        let fan: Vec<HalfEdgeIndex> = self.topology.incoming_halfedges(vertex).collect();

        for entry in fan {
            // A fan child may evict a subtree that contains the fan itself.
            if !self.tree.is_alive(parent) {
                break;
            }

            let layout = self.unfold(entry);
            let cone = Cone::new(
                entry,
                self.topology,
                layout,
                layout.b,
                source_distance,
                layout.a,
                layout.c,
            );
            let child = self.attach_middle_child(parent, NodeKind::VertexSource, cone);
            self.process_node(child);
        }
    }

    fn attach_middle_child(&mut self, parent: NodeId, kind: NodeKind, cone: Cone) -> NodeId {
        let child = self.tree.insert_child(parent, kind, cone);
        self.tree.node_mut(parent).middle_children.push(child);
        self.note_created(child);
        child
    }

    fn note_created(&mut self, id: NodeId) {
        self.stats.nodes_created += 1;
        self.stats.max_level = self.stats.max_level.max(self.tree.node(id).level);
    }

    fn unfold(&self, entry: HalfEdgeIndex) -> Triangle2 {
        self.kernel
            .project_triangle(&self.topology.triangle_from_halfedge(entry, self.mesh))
    }

    /////////////////////
    // Node processing //
    /////////////////////

    /// Arbitrates a freshly created node against the occupants of its entry edge and
    /// target vertex, then schedules whichever children it may still contribute.
    pub(super) fn process_node(&mut self, id: NodeId) {
        let node = self.tree.node(id);
        let kind = node.kind;
        let level = node.level;
        let cone = *node.cone();

        let left_side = cone.has_left_side(kind, &self.kernel);
        let right_side = cone.has_right_side(kind, &self.kernel);

        let mut propagate_left = false;
        let mut propagate_right = false;
        let mut propagate_middle = false;

        if kind.is_source() || (left_side && right_side) {
            let distance = cone.distance_to_target();
            let occupant = self.edge_occupants.get(cone.entry_edge);
            let crossing = occupant
                .node
                .map(|other| self.crossing_order(kind, &cone, other));

            if occupant.is_beaten_by(distance) {
                if self.options.debug_output {
                    trace!(
                        node = ?id,
                        edge = ?cone.entry_edge,
                        distance,
                        previous = ?occupant.node,
                        "Node takes over entry edge."
                    );
                }

                self.edge_occupants.set(cone.entry_edge, id, distance);

                propagate_left = !cone.is_null_face();
                propagate_right = !kind.is_source();

                // Rays meeting the edge at the same point shadow neither side of each other.
                let shadowed = match crossing {
                    Some(Ordering::Less) => Some(ChildSide::Left),
                    Some(Ordering::Greater) => Some(ChildSide::Right),
                    _ => None,
                };
                if let (Some(other), Some(side)) = (occupant.node, shadowed) {
                    self.evict_child(other, side);

                    if !self.tree.is_alive(id) {
                        return;
                    }
                }

                let closest = self.vertex_occupants.get(cone.target_vertex);

                if closest.is_beaten_by(distance) {
                    if self.pseudo_source_vertices[cone.target_vertex.0] {
                        if let Some(previous) = closest.node {
                            self.evict_pseudo_source_fan(previous);

                            if !self.tree.is_alive(id) {
                                return;
                            }
                        }
                        propagate_middle = true;
                    }
                    self.vertex_occupants.set(cone.target_vertex, id, distance);
                }
            } else {
                match crossing {
                    Some(Ordering::Less) => propagate_left = true,
                    Some(Ordering::Equal) => {
                        propagate_left = !cone.is_null_face();
                        propagate_right = !kind.is_source();
                    }
                    _ => propagate_right = !kind.is_source(),
                }
            }
        } else {
            propagate_left = left_side;
            propagate_right = right_side;
        }

        if level >= self.topology.face_count() {
            return;
        }

        if propagate_left {
            self.schedule_child(id, &cone, ChildSide::Left);
        }
        if propagate_right {
            self.schedule_child(id, &cone, ChildSide::Right);
        }
        if propagate_middle {
            let event = self
                .queue
                .push(ExpansionEvent::pseudo_source(id, cone.distance_to_target()));
            self.tree.node_mut(id).pending_middle = Some(event);
            self.stats.events_pushed += 1;
        }
    }

    /// Where the node's ray to its target crosses the entry edge, relative to the
    /// occupant's: `Less` is further left.
    ///
    /// Cones leaving a vertex count as right of everything else.
    fn crossing_order(&self, kind: NodeKind, cone: &Cone, occupant: NodeId) -> Ordering {
        let occupant = self.tree.node(occupant);

        if kind == NodeKind::VertexSource {
            Ordering::Greater
        } else if occupant.kind == NodeKind::VertexSource {
            Ordering::Less
        } else {
            let other = occupant.cone();
            self.kernel.compare_relative_intersection_along_segment(
                &cone.entry_segment(),
                &cone.ray_to_target(),
                &other.entry_segment(),
                &other.ray_to_target(),
            )
        }
    }

    fn child_edge(&self, entry: HalfEdgeIndex, side: ChildSide) -> HalfEdgeIndex {
        match side {
            ChildSide::Left => self.topology.twin(self.topology.prev(entry)),
            ChildSide::Right => self.topology.twin(self.topology.next(entry)),
        }
    }

    /// Narrows `segment` to the part between the cone's boundary rays. Ends that a ray
    /// does not hit are kept.
    fn clip_to_bounds(&self, segment: &Segment2, cone: &Cone) -> Segment2 {
        let left = Ray2::new(cone.source_image, cone.window_left);
        let right = Ray2::new(cone.source_image, cone.window_right);

        Segment2::new(
            self.kernel
                .intersect_segment_ray(segment, &left)
                .unwrap_or(segment.a),
            self.kernel
                .intersect_segment_ray(segment, &right)
                .unwrap_or(segment.b),
        )
    }

    fn schedule_child(&mut self, id: NodeId, cone: &Cone, side: ChildSide) {
        if self.topology.is_border(self.child_edge(cone.entry_edge, side)) {
            return;
        }

        let base = match side {
            ChildSide::Left => cone.left_child_base_segment(),
            ChildSide::Right => cone.right_child_base_segment(),
        };
        let window = self.clip_to_bounds(&base, cone);

        if window.length() <= self.options.min_window_width * base.length() {
            return;
        }

        // Distance to the nearest point of the clipped window, which may lie between its
        // ends. It is at most the nearer end's distance and a lower bound on every path
        // through the window.
        let estimate = cone.source_distance + window.distance_to_point(cone.source_image);
        let kind = match side {
            ChildSide::Left => ExpansionKind::LeftChild,
            ChildSide::Right => ExpansionKind::RightChild,
        };
        let event = self
            .queue
            .push(ExpansionEvent::child(id, kind, estimate, window));
        self.stats.events_pushed += 1;

        let node = self.tree.node_mut(id);
        match side {
            ChildSide::Left => node.pending_left = Some(event),
            ChildSide::Right => node.pending_right = Some(event),
        }
    }

    /// Materializes a scheduled left or right child, unless the distance filter proves
    /// it cannot improve on any corner of the face it would enter.
    fn expand_child(&mut self, event: ExpansionEvent, side: ChildSide) {
        let parent = event.parent;
        debug_assert!(self.tree.is_alive(parent), "Events of deleted nodes are cancelled.");

        let node = self.tree.node_mut(parent);
        match side {
            ChildSide::Left => node.pending_left = None,
            ChildSide::Right => node.pending_right = None,
        }
        let cone = *node.cone();

        let Some(window) = event.window else {
            return;
        };

        if !self.passes_distance_filter(&cone, &window, side) {
            self.stats.windows_filtered += 1;
            if self.options.debug_output {
                trace!(?parent, ?side, "Window rejected by the distance filter.");
            }
            return;
        }

        let child_edge = self.child_edge(cone.entry_edge, side);
        let base = match side {
            ChildSide::Left => cone.left_child_base_segment(),
            ChildSide::Right => cone.right_child_base_segment(),
        };
        let layout = self.kernel.flatten_triangle_along_segment(
            &self.topology.triangle_from_halfedge(child_edge, self.mesh),
            &base,
        );
        let child_cone = Cone::new(
            child_edge,
            self.topology,
            layout,
            cone.source_image,
            cone.source_distance,
            window.a,
            window.b,
        );

        let child = self.tree.insert_child(parent, NodeKind::Interval, child_cone);
        self.note_created(child);

        let node = self.tree.node_mut(parent);
        match side {
            ChildSide::Left => node.left_child = Some(child),
            ChildSide::Right => node.right_child = Some(child),
        }

        self.process_node(child);
    }

    /// The Xin-Wang filter, evaluated against the best arrivals recorded so far at the
    /// corners of the parent's face.
    ///
    /// Corners 1, 2 and 3 are the entry edge's origin, the target vertex and the entry
    /// edge's target. For a right child the roles of corners 1 and 3 and of the two window
    /// ends swap.
    fn passes_distance_filter(&self, cone: &Cone, window: &Segment2, side: ChildSide) -> bool {
        let entry_origin = (self.topology.origin(cone.entry_edge), cone.layout.a);
        let entry_target = (self.topology.target(cone.entry_edge), cone.layout.b);
        let target = (cone.target_vertex, cone.layout.c);

        let (v1, v3, a, b) = match side {
            ChildSide::Left => (entry_origin, entry_target, window.a, window.b),
            ChildSide::Right => (entry_target, entry_origin, window.b, window.a),
        };

        let tolerance = self.options.filter_tolerance;
        let beaten_at = |(vertex, corner): (VertexIndex, Point2<f64>), end: Point2<f64>| {
            let record = self.vertex_occupants.get(vertex);
            let via_cone = cone.source_distance + distance(&cone.source_image, &end);
            let via_corner = record.distance + distance(&corner, &end);
            record.node.is_some() && via_cone > via_corner + tolerance * via_corner.abs().max(1.0)
        };

        !(beaten_at(v1, b) || beaten_at(target, a) || beaten_at(v3, a))
    }

    //////////////
    // Eviction //
    //////////////

    /// Drops the occupant's child on one side, or its pending expansion there.
    fn evict_child(&mut self, occupant: NodeId, side: ChildSide) {
        let node = self.tree.node_mut(occupant);
        let (child, pending) = match side {
            ChildSide::Left => (node.left_child.take(), node.pending_left.take()),
            ChildSide::Right => (node.right_child.take(), node.pending_right.take()),
        };

        if let Some(event) = pending {
            self.queue.cancel(event);
        }
        if let Some(child) = child {
            if self.options.debug_output {
                trace!(?occupant, ?side, ?child, "Evicting subtree.");
            }
            self.delete_subtree(child);
        }
    }

    fn evict_pseudo_source_fan(&mut self, previous: NodeId) {
        let node = self.tree.node_mut(previous);
        let pending = node.pending_middle.take();
        let children = std::mem::take(&mut node.middle_children);

        if let Some(event) = pending {
            self.queue.cancel(event);
        }

        if self.options.debug_output && !children.is_empty() {
            trace!(?previous, fan = children.len(), "Evicting pseudo-source fan.");
        }

        for child in children {
            self.delete_subtree(child);
        }
    }

    /// Deletes a node and all of its descendants, cancelling their pending events and
    /// clearing any occupancy records that still point at them.
    ///
    /// The caller detaches `start` from its parent.
    pub(super) fn delete_subtree(&mut self, start: NodeId) {
        let mut stack = vec![start];

        while let Some(id) = stack.pop() {
            let Some(node) = self.tree.remove(id) else {
                continue;
            };
            self.stats.nodes_deleted += 1;

            for event in [node.pending_left, node.pending_right, node.pending_middle]
                .into_iter()
                .flatten()
            {
                self.queue.cancel(event);
            }

            if let Some(cone) = node.cone {
                self.edge_occupants.release(cone.entry_edge, id);
                self.vertex_occupants.release(cone.target_vertex, id);
            }

            stack.extend(node.left_child);
            stack.extend(node.right_child);
            stack.extend(node.middle_children);
        }
    }
}
