//! This module contains the primitive geometry types.
//!
//! We define primitive geometry as any geometry of O(1) complexity, such as points, segments,
//! rays, wedges and triangles, both in 3D and in the 2D unfolding plane.
//!
//! Notably, we exclude notions like meshes and paths from this module,
//! as they are of variable complexity.

pub mod barycentric;
pub mod infinite_triangle;
pub mod ray;
pub mod segment;
pub mod triangle;
