//! Error types for mesh indexing and shortest path queries.

use crate::mesh::halfedge::HalfEdgeIndex;
use crate::mesh::trimesh::{FaceIndex, VertexIndex};
use thiserror::Error;

/// Failures while building the half-edge connectivity of a mesh.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TopologyError {
    #[error("triangle {face:?} references vertex {vertex:?}, but the mesh has {vertex_count} vertices")]
    VertexOutOfRange {
        face: FaceIndex,
        vertex: VertexIndex,
        vertex_count: usize,
    },

    #[error("triangle {0:?} repeats a vertex")]
    DegenerateTriangle(FaceIndex),

    #[error("directed edge {from:?} -> {to:?} is used by more than one triangle (non-manifold or inconsistently oriented)")]
    DuplicateHalfEdge { from: VertexIndex, to: VertexIndex },

    #[error("vertex {0:?} has more than one boundary fan")]
    NonManifoldVertex(VertexIndex),
}

/// Failures of distance and path queries.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ShortestPathError {
    /// No wavefront reached the query target; it lies in a component without a source,
    /// or no computation has been run yet.
    #[error("the query target is not reachable from any source")]
    Unreachable,

    #[error("vertex {0:?} is not part of the mesh")]
    InvalidVertex(VertexIndex),

    #[error("face {0:?} is not part of the mesh")]
    InvalidFace(FaceIndex),

    #[error("barycentric coordinate {0:?} is outside the unit simplex")]
    InvalidBarycentric([f64; 3]),

    /// The geometric kernel could not intersect a path ray with the entry edge it must cross.
    #[error("path ray does not cross entry edge {0:?}")]
    DegeneratePath(HalfEdgeIndex),
}

pub type Result<T> = std::result::Result<T, ShortestPathError>;
