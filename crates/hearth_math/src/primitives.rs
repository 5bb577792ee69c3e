//! Procedural mesh primitives
//!
//! Every generator returns a [`MeshData`] centered on its local origin, using
//! the same axis conventions as common scene-graph libraries so that placement
//! constants carry over directly:
//!
//! - planes and circles lie in the XY plane facing +Z
//! - cylinders, cones and spheres have their axis along Y
//! - tori lie in the XY plane, with an optional partial arc starting at +X

use std::f32::consts::{PI, TAU};

use crate::mesh::MeshData;
use crate::Vec3;

/// Golden ratio, used by the dodecahedron
const PHI: f32 = 1.618_034;

/// Axis-aligned box with the given full extents
pub fn cuboid(width: f32, height: f32, depth: f32) -> MeshData {
    let h = Vec3::new(width * 0.5, height * 0.5, depth * 0.5);
    let mut mesh = MeshData::new();

    // (normal, u axis); v = normal x u so that u x v = normal
    let faces = [
        (Vec3::X, -Vec3::Z),
        (-Vec3::X, Vec3::Z),
        (Vec3::Y, Vec3::X),
        (-Vec3::Y, Vec3::X),
        (Vec3::Z, Vec3::X),
        (-Vec3::Z, -Vec3::X),
    ];

    for (normal, u) in faces {
        let v = normal.cross(u);
        let center = normal.component_mul(h);
        let du = u.component_mul(h);
        let dv = v.component_mul(h);

        let a = mesh.push_vertex(center - du - dv, normal);
        let b = mesh.push_vertex(center + du - dv, normal);
        let c = mesh.push_vertex(center + du + dv, normal);
        let d = mesh.push_vertex(center - du + dv, normal);
        mesh.push_triangle(a, b, c);
        mesh.push_triangle(a, c, d);
    }

    mesh
}

/// Rectangle in the XY plane facing +Z
pub fn plane(width: f32, height: f32) -> MeshData {
    let (hw, hh) = (width * 0.5, height * 0.5);
    let mut mesh = MeshData::new();

    let a = mesh.push_vertex(Vec3::new(-hw, -hh, 0.0), Vec3::Z);
    let b = mesh.push_vertex(Vec3::new(hw, -hh, 0.0), Vec3::Z);
    let c = mesh.push_vertex(Vec3::new(hw, hh, 0.0), Vec3::Z);
    let d = mesh.push_vertex(Vec3::new(-hw, hh, 0.0), Vec3::Z);
    mesh.push_triangle(a, b, c);
    mesh.push_triangle(a, c, d);

    mesh
}

/// Disc in the XY plane facing +Z
pub fn circle(radius: f32, segments: u32) -> MeshData {
    let segments = segments.max(3);
    let mut mesh = MeshData::new();

    let center = mesh.push_vertex(Vec3::ZERO, Vec3::Z);
    for j in 0..=segments {
        let theta = j as f32 / segments as f32 * TAU;
        let (s, c) = theta.sin_cos();
        mesh.push_vertex(Vec3::new(radius * c, radius * s, 0.0), Vec3::Z);
    }
    for j in 0..segments {
        mesh.push_triangle(center, center + 1 + j, center + 2 + j);
    }

    mesh
}

/// Cylinder (or truncated cone) along Y, centered on the origin
///
/// `open_ended` omits both caps.
pub fn cylinder(
    radius_top: f32,
    radius_bottom: f32,
    height: f32,
    radial_segments: u32,
    open_ended: bool,
) -> MeshData {
    let radial_segments = radial_segments.max(3);
    let half = height * 0.5;
    let slope = if height != 0.0 { (radius_bottom - radius_top) / height } else { 0.0 };
    let mut mesh = MeshData::new();

    // Side: row 0 at the top, row 1 at the bottom
    for (y, radius) in [(half, radius_top), (-half, radius_bottom)] {
        for j in 0..=radial_segments {
            let theta = j as f32 / radial_segments as f32 * TAU;
            let (s, c) = theta.sin_cos();
            mesh.push_vertex(
                Vec3::new(radius * s, y, radius * c),
                Vec3::new(s, slope, c).normalized(),
            );
        }
    }
    push_grid(&mut mesh, 0, 1, radial_segments, false);

    if !open_ended {
        push_cap(&mut mesh, half, radius_top, radial_segments, true);
        push_cap(&mut mesh, -half, radius_bottom, radial_segments, false);
    }

    mesh
}

/// Cone along Y with its apex at `+height / 2`
pub fn cone(radius: f32, height: f32, radial_segments: u32, open_ended: bool) -> MeshData {
    cylinder(0.0, radius, height, radial_segments, open_ended)
}

/// UV sphere centered on the origin
pub fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> MeshData {
    let width_segments = width_segments.max(3);
    let height_segments = height_segments.max(2);
    let mut mesh = MeshData::new();

    // Rows run from the north pole (+Y) to the south pole
    for i in 0..=height_segments {
        let theta = i as f32 / height_segments as f32 * PI;
        let (sin_t, cos_t) = theta.sin_cos();
        for j in 0..=width_segments {
            let phi = j as f32 / width_segments as f32 * TAU;
            let (sin_p, cos_p) = phi.sin_cos();
            let n = Vec3::new(-cos_p * sin_t, cos_t, sin_p * sin_t);
            mesh.push_vertex(n * radius, n);
        }
    }

    let cols = width_segments + 1;
    for i in 0..height_segments {
        for j in 0..width_segments {
            let a = i * cols + j;
            let b = (i + 1) * cols + j;
            let c = (i + 1) * cols + j + 1;
            let d = i * cols + j + 1;
            // Skip the zero-area triangles that touch the poles
            if i != height_segments - 1 {
                mesh.push_triangle(a, b, c);
            }
            if i != 0 {
                mesh.push_triangle(a, c, d);
            }
        }
    }

    mesh
}

/// Torus in the XY plane
///
/// `arc` is the swept angle around the main ring in radians; pass `TAU` for
/// a closed ring.
pub fn torus(radius: f32, tube: f32, radial_segments: u32, tubular_segments: u32, arc: f32) -> MeshData {
    let radial_segments = radial_segments.max(3);
    let tubular_segments = tubular_segments.max(3);
    let mut mesh = MeshData::new();

    // Rows follow the main ring, columns go around the tube
    for i in 0..=tubular_segments {
        let u = i as f32 / tubular_segments as f32 * arc;
        let (sin_u, cos_u) = u.sin_cos();
        let ring_center = Vec3::new(radius * cos_u, radius * sin_u, 0.0);
        for j in 0..=radial_segments {
            let v = j as f32 / radial_segments as f32 * TAU;
            let (sin_v, cos_v) = v.sin_cos();
            let position = Vec3::new(
                (radius + tube * cos_v) * cos_u,
                (radius + tube * cos_v) * sin_u,
                tube * sin_v,
            );
            mesh.push_vertex(position, (position - ring_center).normalized());
        }
    }
    push_grid(&mut mesh, 0, tubular_segments, radial_segments, false);

    mesh
}

/// Regular dodecahedron with the given circumradius, flat shaded
pub fn dodecahedron(radius: f32) -> MeshData {
    let r = 1.0 / PHI;
    let mut corners = Vec::with_capacity(20);
    for x in [-1.0, 1.0] {
        for y in [-1.0, 1.0] {
            for z in [-1.0, 1.0] {
                corners.push(Vec3::new(x, y, z));
            }
        }
    }
    for a in [-1.0, 1.0] {
        for b in [-1.0, 1.0] {
            corners.push(Vec3::new(0.0, a * r, b * PHI));
            corners.push(Vec3::new(a * r, b * PHI, 0.0));
            corners.push(Vec3::new(a * PHI, 0.0, b * r));
        }
    }
    let scale = radius / 3f32.sqrt();

    // Face normals point at the vertices of the dual icosahedron
    let mut face_normals = Vec::with_capacity(12);
    for a in [-1.0, 1.0] {
        for b in [-1.0, 1.0] {
            face_normals.push(Vec3::new(0.0, a * PHI, b).normalized());
            face_normals.push(Vec3::new(a * PHI, b, 0.0).normalized());
            face_normals.push(Vec3::new(a, 0.0, b * PHI).normalized());
        }
    }

    let mut mesh = MeshData::new();
    for normal in face_normals {
        let max_dot = corners.iter().map(|c| c.dot(normal)).fold(f32::MIN, f32::max);
        let mut face: Vec<Vec3> = corners
            .iter()
            .copied()
            .filter(|c| (c.dot(normal) - max_dot).abs() < 1e-3)
            .collect();

        // Order the five corners counter-clockwise around the normal
        let tangent = (face[0] - normal * face[0].dot(normal)).normalized();
        let bitangent = normal.cross(tangent);
        face.sort_by(|p, q| {
            let ap = p.dot(bitangent).atan2(p.dot(tangent));
            let aq = q.dot(bitangent).atan2(q.dot(tangent));
            ap.total_cmp(&aq)
        });

        let base = mesh.vertex_count() as u32;
        for corner in &face {
            mesh.push_vertex(*corner * scale, normal);
        }
        for k in 1..(face.len() as u32 - 1) {
            mesh.push_triangle(base, base + k, base + k + 1);
        }
    }

    mesh
}

/// Open tube swept along a Catmull-Rom curve through `points`
///
/// Frames are carried along the curve by projecting the previous normal onto
/// each new tangent's normal plane, which keeps the tube from twisting.
pub fn tube(points: &[Vec3], tubular_segments: u32, radius: f32, radial_segments: u32) -> MeshData {
    let mut mesh = MeshData::new();
    if points.len() < 2 {
        return mesh;
    }
    let tubular_segments = tubular_segments.max(1);
    let radial_segments = radial_segments.max(3);

    let curve = CatmullRom::new(points);
    let samples: Vec<(Vec3, Vec3)> = (0..=tubular_segments)
        .map(|i| {
            let t = i as f32 / tubular_segments as f32;
            (curve.point(t), curve.tangent(t))
        })
        .collect();

    let mut normal = initial_normal(samples[0].1);
    for (i, (center, tangent)) in samples.iter().enumerate() {
        if i > 0 {
            let projected = normal - *tangent * normal.dot(*tangent);
            if projected.length_squared() > 1e-12 {
                normal = projected.normalized();
            }
        }
        let binormal = tangent.cross(normal);

        for j in 0..=radial_segments {
            let v = j as f32 / radial_segments as f32 * TAU;
            let (s, c) = v.sin_cos();
            let radial = (normal * c + binormal * s).normalized();
            mesh.push_vertex(*center + radial * radius, radial);
        }
    }
    push_grid(&mut mesh, 0, tubular_segments, radial_segments, true);

    mesh
}

/// Uniform Catmull-Rom spline through a point list
///
/// The end segments use mirrored phantom points so the curve passes through
/// both endpoints.
#[derive(Clone, Debug)]
pub struct CatmullRom<'a> {
    points: &'a [Vec3],
}

impl<'a> CatmullRom<'a> {
    /// Wrap a point list (at least two points)
    pub fn new(points: &'a [Vec3]) -> Self {
        Self { points }
    }

    /// Position at `t` in `[0, 1]`
    pub fn point(&self, t: f32) -> Vec3 {
        let (p0, p1, p2, p3, w) = self.segment(t);
        let w2 = w * w;
        let w3 = w2 * w;
        (p1 * 2.0
            + (p2 - p0) * w
            + (p0 * 2.0 - p1 * 5.0 + p2 * 4.0 - p3) * w2
            + (p1 * 3.0 - p0 - p2 * 3.0 + p3) * w3)
            * 0.5
    }

    /// Unit tangent at `t` in `[0, 1]`
    pub fn tangent(&self, t: f32) -> Vec3 {
        let (p0, p1, p2, p3, w) = self.segment(t);
        let d = ((p2 - p0)
            + (p0 * 2.0 - p1 * 5.0 + p2 * 4.0 - p3) * (2.0 * w)
            + (p1 * 3.0 - p0 - p2 * 3.0 + p3) * (3.0 * w * w))
            * 0.5;
        if d.length_squared() > 1e-12 {
            d.normalized()
        } else {
            (p2 - p1).normalized()
        }
    }

    fn segment(&self, t: f32) -> (Vec3, Vec3, Vec3, Vec3, f32) {
        let n = self.points.len();
        let p = t.clamp(0.0, 1.0) * (n - 1) as f32;
        let mut idx = p.floor() as usize;
        let mut w = p - idx as f32;
        if idx >= n - 1 {
            idx = n - 2;
            w = 1.0;
        }

        let p1 = self.points[idx];
        let p2 = self.points[idx + 1];
        let p0 = if idx > 0 { self.points[idx - 1] } else { p1 * 2.0 - p2 };
        let p3 = if idx + 2 < n { self.points[idx + 2] } else { p2 * 2.0 - p1 };
        (p0, p1, p2, p3, w)
    }
}

/// A normal perpendicular to `tangent`, built against its smallest axis
fn initial_normal(tangent: Vec3) -> Vec3 {
    let (ax, ay, az) = (tangent.x.abs(), tangent.y.abs(), tangent.z.abs());
    let axis = if ax <= ay && ax <= az {
        Vec3::X
    } else if ay <= az {
        Vec3::Y
    } else {
        Vec3::Z
    };
    let side = tangent.cross(axis).normalized();
    tangent.cross(side).normalized()
}

/// Triangulate a `(rows + 1) x (cols + 1)` vertex grid starting at `base`
///
/// Unflipped winding faces along `d(row) x d(col)`.
fn push_grid(mesh: &mut MeshData, base: u32, rows: u32, cols: u32, flip: bool) {
    let stride = cols + 1;
    for i in 0..rows {
        for j in 0..cols {
            let a = base + i * stride + j;
            let b = base + (i + 1) * stride + j;
            let c = base + (i + 1) * stride + j + 1;
            let d = base + i * stride + j + 1;
            if flip {
                mesh.push_triangle(a, c, b);
                mesh.push_triangle(a, d, c);
            } else {
                mesh.push_triangle(a, b, c);
                mesh.push_triangle(a, c, d);
            }
        }
    }
}

/// Flat disc cap for a cylinder at height `y`
fn push_cap(mesh: &mut MeshData, y: f32, radius: f32, segments: u32, top: bool) {
    if radius <= 0.0 {
        return;
    }
    let normal = if top { Vec3::Y } else { -Vec3::Y };
    let center = mesh.push_vertex(Vec3::new(0.0, y, 0.0), normal);
    for j in 0..=segments {
        let theta = j as f32 / segments as f32 * TAU;
        let (s, c) = theta.sin_cos();
        mesh.push_vertex(Vec3::new(radius * s, y, radius * c), normal);
    }
    for j in 0..segments {
        let (p, q) = (center + 1 + j, center + 2 + j);
        if top {
            mesh.push_triangle(center, p, q);
        } else {
            mesh.push_triangle(center, q, p);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::face_normal;

    const EPSILON: f32 = 0.001;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    /// Every non-degenerate triangle of a convex mesh around the origin faces outward
    fn assert_outward(mesh: &MeshData) {
        for tri in mesh.triangles() {
            let n = face_normal(tri);
            if n.length() < 1e-6 {
                continue;
            }
            let centroid = (tri[0] + tri[1] + tri[2]) * (1.0 / 3.0);
            assert!(n.dot(centroid) > 0.0, "inward triangle {:?}", tri);
        }
    }

    fn assert_consistent(mesh: &MeshData) {
        assert_eq!(mesh.positions.len(), mesh.normals.len());
        assert_eq!(mesh.indices.len() % 3, 0);
        for &i in &mesh.indices {
            assert!((i as usize) < mesh.vertex_count());
        }
        for n in &mesh.normals {
            assert!(approx_eq(n.length(), 1.0), "normal {:?} not unit", n);
        }
    }

    #[test]
    fn test_cuboid() {
        let mesh = cuboid(2.0, 4.0, 6.0);
        assert_consistent(&mesh);
        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(mesh.triangle_count(), 12);
        assert_outward(&mesh);

        let (min, max) = mesh.bounds().unwrap();
        assert_eq!(min, Vec3::new(-1.0, -2.0, -3.0));
        assert_eq!(max, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_plane_faces_z() {
        let mesh = plane(7.0, 0.45);
        assert_consistent(&mesh);
        for tri in mesh.triangles() {
            assert!(face_normal(tri).z > 0.0);
        }
    }

    #[test]
    fn test_circle() {
        let mesh = circle(1.3, 32);
        assert_consistent(&mesh);
        assert_eq!(mesh.triangle_count(), 32);
        for tri in mesh.triangles() {
            assert!(face_normal(tri).z > 0.0);
        }
        for p in &mesh.positions[1..] {
            assert!(approx_eq(p.length(), 1.3));
        }
    }

    #[test]
    fn test_cylinder_closed_is_outward() {
        let mesh = cylinder(0.15, 0.12, 0.2, 12, false);
        assert_consistent(&mesh);
        assert_outward(&mesh);

        let (min, max) = mesh.bounds().unwrap();
        assert!(approx_eq(min.y, -0.1));
        assert!(approx_eq(max.y, 0.1));
    }

    #[test]
    fn test_open_cylinder_has_no_caps() {
        let closed = cylinder(0.2, 0.2, 1.0, 8, false);
        let open = cylinder(0.2, 0.2, 1.0, 8, true);
        assert_eq!(open.triangle_count(), 16);
        assert_eq!(closed.triangle_count(), 32);
    }

    #[test]
    fn test_cone_apex() {
        let mesh = cone(0.14, 0.3, 4, false);
        assert_consistent(&mesh);
        assert_outward(&mesh);
        let apex = mesh.positions.iter().fold(f32::MIN, |m, p| m.max(p.y));
        assert!(approx_eq(apex, 0.15));
    }

    #[test]
    fn test_sphere() {
        let mesh = sphere(0.35, 16, 16);
        assert_consistent(&mesh);
        assert_outward(&mesh);
        for p in &mesh.positions {
            assert!(approx_eq(p.length(), 0.35));
        }
        // Pole rows contribute one triangle per column, inner rows two
        assert_eq!(mesh.triangle_count(), 16 * 2 + 16 * 14 * 2);
    }

    #[test]
    fn test_torus_full_and_half() {
        let full = torus(0.08, 0.02, 8, 12, TAU);
        assert_consistent(&full);
        for tri in full.triangles() {
            let centroid = (tri[0] + tri[1] + tri[2]) * (1.0 / 3.0);
            let ring = Vec3::new(centroid.x, centroid.y, 0.0).normalized() * 0.08;
            assert!(face_normal(tri).dot(centroid - ring) > 0.0);
        }

        let half = torus(0.06, 0.015, 8, 12, PI);
        let (min, _) = half.bounds().unwrap();
        // Half ring from +X through +Y stays above y = -tube
        assert!(min.y >= -0.015 - EPSILON);
    }

    #[test]
    fn test_dodecahedron() {
        let mesh = dodecahedron(0.3);
        assert_consistent(&mesh);
        assert_eq!(mesh.triangle_count(), 36);
        assert_eq!(mesh.vertex_count(), 60);
        assert_outward(&mesh);
        for p in &mesh.positions {
            assert!(approx_eq(p.length(), 0.3));
        }
    }

    #[test]
    fn test_catmull_rom_hits_endpoints() {
        let pts = [Vec3::ZERO, Vec3::new(1.0, 1.0, 0.0), Vec3::new(2.0, 0.0, 0.0)];
        let curve = CatmullRom::new(&pts);
        let start = curve.point(0.0);
        let mid = curve.point(0.5);
        let end = curve.point(1.0);
        assert!(approx_eq((start - pts[0]).length(), 0.0));
        assert!(approx_eq((mid - pts[1]).length(), 0.0));
        assert!(approx_eq((end - pts[2]).length(), 0.0));
    }

    #[test]
    fn test_tube_along_straight_line() {
        let pts = [Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0), Vec3::new(2.0, 0.0, 0.0)];
        let mesh = tube(&pts, 12, 0.08, 8);
        assert_consistent(&mesh);
        assert_eq!(mesh.vertex_count(), 13 * 9);

        for p in &mesh.positions {
            let radial = (p.y * p.y + p.z * p.z).sqrt();
            assert!(approx_eq(radial, 0.08));
        }
        for tri in mesh.triangles() {
            let centroid = (tri[0] + tri[1] + tri[2]) * (1.0 / 3.0);
            let outward = Vec3::new(0.0, centroid.y, centroid.z);
            assert!(face_normal(tri).dot(outward) > 0.0);
        }
    }

    #[test]
    fn test_tube_needs_two_points() {
        assert!(tube(&[Vec3::ZERO], 8, 0.1, 8).is_empty());
    }
}
