//! Exact geodesic distances and shortest paths on the surface of triangle meshes.
//!
//! Build a [`TriangleMesh`], index it with [`HalfEdgeTopology`], then hand both to a
//! [`SurfaceShortestPath`] and propagate from one or more source locations.
//!
//! Meshes (and single triangles) can be built from their Parry3d counterparts, but all
//! geometry in the propagation itself is done with plain nalgebra types.

pub mod error;
pub mod intersection;
pub mod kernel;
pub mod mesh;
pub mod mesh_shortest_paths;
pub mod primitive;

#[cfg(test)]
pub mod proptest;

// Re-export commonly used types
pub use error::{ShortestPathError, TopologyError};
pub use kernel::{DefaultKernel, ShortestPathKernel};
pub use mesh::halfedge::{HalfEdgeIndex, HalfEdgeTopology};
pub use mesh::trimesh::{FaceIndex, FaceLocation, IndexTriangle, TriangleMesh, VertexIndex};
pub use mesh_shortest_paths::path::{PathEvent, PathVisitor, PointPathVisitor};
pub use mesh_shortest_paths::{PropagationStats, ShortestPathOptions, SurfaceShortestPath};
pub use primitive::barycentric::Barycentric;
pub use primitive::triangle::{Triangle, TriangleEdge};
