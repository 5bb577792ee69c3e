//! Triangle mesh data
//!
//! Meshes are pure geometry - positions, normals and triangle indices.
//! Colors and materials live on the scene node that draws the mesh.

use crate::Vec3;

/// An indexed triangle mesh in local space
///
/// Triangles are wound counter-clockwise when viewed from the side their
/// normals point to.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    /// Vertex positions
    pub positions: Vec<Vec3>,
    /// Per-vertex normals (same length as `positions`)
    pub normals: Vec<Vec3>,
    /// Triangle list indices into `positions`
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Create an empty mesh
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of vertices
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of triangles
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// True if the mesh has no triangles
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Append a vertex and return its index
    pub fn push_vertex(&mut self, position: Vec3, normal: Vec3) -> u32 {
        let index = self.positions.len() as u32;
        self.positions.push(position);
        self.normals.push(normal);
        index
    }

    /// Append a triangle
    #[inline]
    pub fn push_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.indices.extend_from_slice(&[a, b, c]);
    }

    /// Iterate over triangles as position triples
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.indices.chunks_exact(3).map(move |tri| {
            [
                self.positions[tri[0] as usize],
                self.positions[tri[1] as usize],
                self.positions[tri[2] as usize],
            ]
        })
    }

    /// Unindexed copy where every triangle carries its own face normal
    pub fn flat_shaded(&self) -> MeshData {
        let mut flat = MeshData::new();
        for tri in self.triangles() {
            let normal = face_normal(tri).normalized();
            let a = flat.push_vertex(tri[0], normal);
            let b = flat.push_vertex(tri[1], normal);
            let c = flat.push_vertex(tri[2], normal);
            flat.push_triangle(a, b, c);
        }
        flat
    }

    /// Axis-aligned bounds as `(min, max)`, or `None` for an empty mesh
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let first = *self.positions.first()?;
        Some(self.positions.iter().fold((first, first), |(min, max), p| {
            (min.min_components(*p), max.max_components(*p))
        }))
    }
}

/// Geometric (face) normal of a triangle, not normalized
#[inline]
pub fn face_normal(tri: [Vec3; 3]) -> Vec3 {
    (tri[1] - tri[0]).cross(tri[2] - tri[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_vertex_returns_indices() {
        let mut mesh = MeshData::new();
        assert_eq!(mesh.push_vertex(Vec3::ZERO, Vec3::Z), 0);
        assert_eq!(mesh.push_vertex(Vec3::X, Vec3::Z), 1);
        assert_eq!(mesh.push_vertex(Vec3::Y, Vec3::Z), 2);
        mesh.push_triangle(0, 1, 2);

        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.triangle_count(), 1);
        assert!(!mesh.is_empty());
    }

    #[test]
    fn test_face_normal_ccw() {
        let n = face_normal([Vec3::ZERO, Vec3::X, Vec3::Y]);
        assert_eq!(n, Vec3::Z);
    }

    #[test]
    fn test_flat_shaded_splits_shared_vertices() {
        let mut mesh = MeshData::new();
        mesh.push_vertex(Vec3::ZERO, Vec3::Y);
        mesh.push_vertex(Vec3::X, Vec3::Y);
        mesh.push_vertex(Vec3::Y, Vec3::Y);
        mesh.push_vertex(Vec3::Z, Vec3::Y);
        mesh.push_triangle(0, 1, 2);
        mesh.push_triangle(0, 3, 1);

        let flat = mesh.flat_shaded();
        assert_eq!(flat.vertex_count(), 6);
        assert_eq!(flat.triangle_count(), 2);
        assert_eq!(flat.normals[0], Vec3::Z);
        assert_eq!(flat.normals[3], Vec3::Y);
    }

    #[test]
    fn test_bounds() {
        let mut mesh = MeshData::new();
        assert!(mesh.bounds().is_none());

        mesh.push_vertex(Vec3::new(-1.0, 2.0, 0.5), Vec3::Y);
        mesh.push_vertex(Vec3::new(3.0, -4.0, 0.0), Vec3::Y);
        let (min, max) = mesh.bounds().unwrap();
        assert_eq!(min, Vec3::new(-1.0, -4.0, 0.0));
        assert_eq!(max, Vec3::new(3.0, 2.0, 0.5));
    }
}
