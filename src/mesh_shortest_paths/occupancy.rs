//! Per-edge and per-vertex records of the best node seen so far.

use crate::mesh::halfedge::HalfEdgeIndex;
use crate::mesh::trimesh::VertexIndex;
use crate::mesh_shortest_paths::cone_tree::NodeId;
use std::marker::PhantomData;

/// Index types that address a dense table.
pub trait DenseIndex: Copy {
    fn dense(self) -> usize;
}

impl DenseIndex for HalfEdgeIndex {
    fn dense(self) -> usize {
        self.0
    }
}

impl DenseIndex for VertexIndex {
    fn dense(self) -> usize {
        self.0
    }
}

/// The node holding a slot and the distance it achieved.
///
/// The distance survives when the node is deleted, but the slot counts as empty again.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Occupant {
    pub node: Option<NodeId>,
    pub distance: f64,
}

impl Default for Occupant {
    fn default() -> Self {
        Self {
            node: None,
            distance: f64::INFINITY,
        }
    }
}

impl Occupant {
    /// Whether a candidate reaching the slot at `distance` takes it over.
    pub fn is_beaten_by(&self, distance: f64) -> bool {
        self.node.is_none() || self.distance > distance
    }
}

#[derive(Debug, Clone)]
pub struct OccupancyTable<I> {
    records: Vec<Occupant>,
    index: PhantomData<I>,
}

impl<I: DenseIndex> OccupancyTable<I> {
    pub fn new(len: usize) -> Self {
        Self {
            records: vec![Occupant::default(); len],
            index: PhantomData,
        }
    }

    pub fn reset(&mut self, len: usize) {
        self.records.clear();
        self.records.resize(len, Occupant::default());
    }

    pub fn get(&self, index: I) -> Occupant {
        self.records[index.dense()]
    }

    pub fn set(&mut self, index: I, node: NodeId, distance: f64) {
        self.records[index.dense()] = Occupant {
            node: Some(node),
            distance,
        };
    }

    /// Empties the slot if `node` holds it.
    pub fn release(&mut self, index: I, node: NodeId) {
        let record = &mut self.records[index.dense()];
        if record.node == Some(node) {
            record.node = None;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Occupant> + '_ {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_only_clears_the_holder() {
        let mut table = OccupancyTable::<VertexIndex>::new(3);
        assert_eq!(table.len(), 3);
        assert!(table.get(VertexIndex(1)).is_beaten_by(1.0e9));

        table.set(VertexIndex(1), NodeId(4), 2.0);
        assert!(!table.get(VertexIndex(1)).is_beaten_by(2.0));
        assert!(table.get(VertexIndex(1)).is_beaten_by(1.5));

        table.release(VertexIndex(1), NodeId(5));
        assert_eq!(table.get(VertexIndex(1)).node, Some(NodeId(4)));

        table.release(VertexIndex(1), NodeId(4));
        let record = table.get(VertexIndex(1));
        assert_eq!(record.node, None);
        assert_eq!(record.distance, 2.0);
        // An empty slot is taken by anything.
        assert!(record.is_beaten_by(100.0));
    }
}
