//! Triangle meshes and their half-edge connectivity.

pub mod halfedge;
pub mod trimesh;
