use crate::mesh::trimesh::{FaceIndex, FaceLocation, TriangleMesh, VertexIndex};
use crate::primitive::triangle::Triangle;
use nalgebra::{Point2, Point3, Vector2, Vector3};
use proptest::prelude::*;

/// A Strategy to generate f64 values within the range [-50.0, 50.0].
/// though it is set up to be likely to produce zeros, round numbers, and edge cases.
pub fn scalar_strategy() -> impl Strategy<Value = f64> {
    prop_oneof![
        prop_oneof![
            Just(0.0),
            Just(1.0),
            Just(-1.0),
            Just(10.0),
            Just(-10.0),
            Just(0.5),
            Just(-0.5),
            Just(std::f64::consts::PI),
            Just(-std::f64::consts::PI),
        ],
        -50.0..=50.0,
    ]
}

pub fn arbitrary_vector() -> impl Strategy<Value = Vector3<f64>> {
    (scalar_strategy(), scalar_strategy(), scalar_strategy())
        .prop_map(|(x, y, z)| Vector3::new(x, y, z))
}

pub fn arbitrary_point() -> impl Strategy<Value = Point3<f64>> {
    arbitrary_vector().prop_map(Point3::from)
}

pub fn arbitrary_triangle() -> impl Strategy<Value = Triangle> {
    (arbitrary_point(), arbitrary_point(), arbitrary_point())
        .prop_map(|(a, b, c)| Triangle::new(a, b, c))
}

pub fn arbitrary_point2() -> impl Strategy<Value = Point2<f64>> {
    (scalar_strategy(), scalar_strategy()).prop_map(|(x, y)| Point2::new(x, y))
}

pub fn arbitrary_unit_vector2() -> impl Strategy<Value = Vector2<f64>> {
    (0.0..std::f64::consts::TAU).prop_map(|angle: f64| Vector2::new(angle.cos(), angle.sin()))
}

pub fn arbitrary_barycentric() -> impl Strategy<Value = (f64, f64, f64)> {
    prop_oneof![
        // One of the vertices
        Just((1.0, 0.0, 0.0)),
        Just((0.0, 1.0, 0.0)),
        Just((0.0, 0.0, 1.0)),
        // Center of one of the edges
        Just((0.5, 0.5, 0.0)),
        Just((0.0, 0.5, 0.5)),
        Just((0.5, 0.0, 0.5)),
        // Middle:
        Just((1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0)),
        // Random on one of the edges
        (0.0..=1.0).prop_map(|x| (x, 1.0 - x, 0.0)),
        (0.0..=1.0).prop_map(|x| (0.0, x, 1.0 - x)),
        (0.0..=1.0).prop_map(|x| (1.0 - x, 0.0, x)),
        // Random
        (0.0..=1.0, 0.0..=1.0).prop_map(|(x, y)| {
            let u = x;
            let y = y * (1.0 - u);
            let z = 1.0 - u - y;
            (u, y, z)
        })
    ]
}

pub fn arbitrary_face_location(face_count: usize) -> impl Strategy<Value = FaceLocation> {
    (0..face_count, arbitrary_barycentric())
        .prop_map(|(face, bary)| FaceLocation::new(FaceIndex(face), bary))
}

/// The axis-aligned unit cube, outward-facing.
pub fn unit_cube() -> TriangleMesh {
    TriangleMesh::from_triangles(
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(0.0, 1.0, 1.0),
        ],
        &[
            [0, 2, 1],
            [0, 3, 2],
            [4, 5, 6],
            [4, 6, 7],
            [0, 1, 5],
            [0, 5, 4],
            [3, 7, 6],
            [3, 6, 2],
            [0, 4, 7],
            [0, 7, 3],
            [1, 2, 6],
            [1, 6, 5],
        ],
    )
}

pub fn single_triangle() -> TriangleMesh {
    TriangleMesh::from_triangles(
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ],
        &[[0, 1, 2]],
    )
}

/// A `cols` by `rows` grid of square cells over the xy plane, each cell split along
/// its diagonal. Vertex `(i, j)` has index `j * (cols + 1) + i`.
pub fn heightfield(cols: usize, rows: usize, spacing: f64, heights: &[f64]) -> TriangleMesh {
    let stride = cols + 1;
    let vertices = (0..=rows)
        .flat_map(|j| (0..=cols).map(move |i| (i, j)))
        .map(|(i, j)| {
            Point3::new(
                i as f64 * spacing,
                j as f64 * spacing,
                heights.get(j * stride + i).copied().unwrap_or(0.0),
            )
        })
        .collect();

    let triangles: Vec<[usize; 3]> = (0..rows)
        .flat_map(|j| (0..cols).map(move |i| (i, j)))
        .flat_map(|(i, j)| {
            let v00 = j * stride + i;
            let v10 = v00 + 1;
            let v01 = v00 + stride;
            let v11 = v01 + 1;
            [[v00, v10, v11], [v00, v11, v01]]
        })
        .collect();

    TriangleMesh::from_triangles(vertices, &triangles)
}

pub fn flat_grid(cols: usize, rows: usize, spacing: f64) -> TriangleMesh {
    heightfield(cols, rows, spacing, &[])
}

/// A disk of six triangles around vertex 0 whose rim goes up and down, so the
/// angles around the center add up to more than a full turn.
pub fn saddle_patch() -> (TriangleMesh, VertexIndex) {
    let rim = (0..6).map(|k| {
        let angle = k as f64 * std::f64::consts::FRAC_PI_3;
        let z = if k % 2 == 0 { 0.8 } else { -0.8 };
        Point3::new(angle.cos(), angle.sin(), z)
    });
    let vertices = std::iter::once(Point3::origin()).chain(rim).collect();
    let triangles: Vec<[usize; 3]> = (1..=6).map(|k| [0, k, k % 6 + 1]).collect();
    (TriangleMesh::from_triangles(vertices, &triangles), VertexIndex(0))
}

/// A 3x3 heightfield with bumpy heights.
pub fn arbitrary_heightfield() -> impl Strategy<Value = TriangleMesh> {
    prop::collection::vec(-0.6..0.6, 16).prop_map(|heights| heightfield(3, 3, 1.0, &heights))
}

pub fn arbitrary_heightfield_with_location() -> impl Strategy<Value = (TriangleMesh, FaceLocation)> {
    arbitrary_heightfield().prop_flat_map(|mesh| {
        let location = arbitrary_face_location(mesh.face_count());
        (Just(mesh), location)
    })
}
