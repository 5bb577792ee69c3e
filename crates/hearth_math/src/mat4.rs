//! 4x4 Matrix utilities for 3D transformations
//!
//! Matrices are column-major (`m[column][row]`), matching WGSL's `mat4x4<f32>`
//! layout so they can be uploaded to uniform buffers as-is.
//!
//! Rotations follow the XYZ Euler convention: a rotation `(rx, ry, rz)` is
//! `Rx * Ry * Rz`, so Z is applied to the object first.

use crate::Vec3;

/// 4x4 matrix type (column-major)
pub type Mat4 = [[f32; 4]; 4];

/// Identity matrix
pub const IDENTITY: Mat4 = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

/// Multiply two 4x4 matrices: result = a * b
///
/// In column-major convention, this applies b first, then a.
#[allow(clippy::needless_range_loop)]
pub fn mul(a: Mat4, b: Mat4) -> Mat4 {
    let mut result = [[0.0f32; 4]; 4];

    for i in 0..4 {
        for j in 0..4 {
            for k in 0..4 {
                result[i][j] += a[k][j] * b[i][k];
            }
        }
    }

    result
}

/// Transform a point (w = 1) by a matrix
pub fn transform_point(m: Mat4, p: Vec3) -> Vec3 {
    Vec3::new(
        m[0][0] * p.x + m[1][0] * p.y + m[2][0] * p.z + m[3][0],
        m[0][1] * p.x + m[1][1] * p.y + m[2][1] * p.z + m[3][1],
        m[0][2] * p.x + m[1][2] * p.y + m[2][2] * p.z + m[3][2],
    )
}

/// Transform a direction (w = 0) by a matrix, ignoring translation
pub fn transform_vector(m: Mat4, v: Vec3) -> Vec3 {
    Vec3::new(
        m[0][0] * v.x + m[1][0] * v.y + m[2][0] * v.z,
        m[0][1] * v.x + m[1][1] * v.y + m[2][1] * v.z,
        m[0][2] * v.x + m[1][2] * v.y + m[2][2] * v.z,
    )
}

/// Transform a surface normal by the inverse-transpose of the upper 3x3.
///
/// The inverse-transpose is built from column cross products (the cofactor
/// matrix), so non-uniform scale keeps normals perpendicular to the surface.
/// The result is normalized.
pub fn transform_normal(m: Mat4, n: Vec3) -> Vec3 {
    let c0 = column3(m, 0);
    let c1 = column3(m, 1);
    let c2 = column3(m, 2);

    let det = c0.dot(c1.cross(c2));
    let cofactor = c1.cross(c2) * n.x + c2.cross(c0) * n.y + c0.cross(c1) * n.z;

    if det < 0.0 {
        (-cofactor).normalized()
    } else {
        cofactor.normalized()
    }
}

/// First three components of a column
pub fn column3(m: Mat4, col: usize) -> Vec3 {
    Vec3::new(m[col][0], m[col][1], m[col][2])
}

/// Translation part of an affine matrix
pub fn get_translation(m: Mat4) -> Vec3 {
    column3(m, 3)
}

/// Translation matrix
pub fn translation(t: Vec3) -> Mat4 {
    let mut m = IDENTITY;
    m[3] = [t.x, t.y, t.z, 1.0];
    m
}

/// Non-uniform scale matrix
pub fn scale(s: Vec3) -> Mat4 {
    [
        [s.x, 0.0, 0.0, 0.0],
        [0.0, s.y, 0.0, 0.0],
        [0.0, 0.0, s.z, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]
}

/// Rotation about the X axis (Y turns toward Z)
pub fn rotation_x(angle: f32) -> Mat4 {
    let (s, c) = angle.sin_cos();
    [
        [1.0, 0.0, 0.0, 0.0],
        [0.0, c, s, 0.0],
        [0.0, -s, c, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]
}

/// Rotation about the Y axis (Z turns toward X)
pub fn rotation_y(angle: f32) -> Mat4 {
    let (s, c) = angle.sin_cos();
    [
        [c, 0.0, -s, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [s, 0.0, c, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]
}

/// Rotation about the Z axis (X turns toward Y)
pub fn rotation_z(angle: f32) -> Mat4 {
    let (s, c) = angle.sin_cos();
    [
        [c, s, 0.0, 0.0],
        [-s, c, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]
}

/// Rotation from XYZ Euler angles: `Rx * Ry * Rz`
pub fn rotation_euler(euler: Vec3) -> Mat4 {
    mul(rotation_x(euler.x), mul(rotation_y(euler.y), rotation_z(euler.z)))
}

/// Compose translation, Euler rotation and scale: `T * R * S`
pub fn from_trs(translation_v: Vec3, euler: Vec3, scale_v: Vec3) -> Mat4 {
    mul(translation(translation_v), mul(rotation_euler(euler), scale(scale_v)))
}

/// Right-handed perspective projection with a `[0, 1]` depth range (wgpu clip space)
///
/// `fov_y` is in radians.
pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    let f = 1.0 / (fov_y / 2.0).tan();
    let nf = 1.0 / (near - far);

    [
        [f / aspect, 0.0, 0.0, 0.0],
        [0.0, f, 0.0, 0.0],
        [0.0, 0.0, far * nf, -1.0],
        [0.0, 0.0, near * far * nf, 0.0],
    ]
}

/// Right-handed look-at view matrix.
///
/// When `up` is parallel to the viewing direction, +Z is used as the
/// fallback up vector.
pub fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
    let f = (target - eye).normalized();
    let mut s = f.cross(up);
    if s.length_squared() < 1e-12 {
        s = f.cross(Vec3::Z);
    }
    let s = s.normalized();
    let u = s.cross(f);

    [
        [s.x, u.x, -f.x, 0.0],
        [s.y, u.y, -f.y, 0.0],
        [s.z, u.z, -f.z, 0.0],
        [-s.dot(eye), -u.dot(eye), f.dot(eye), 1.0],
    ]
}

/// Transpose a matrix
pub fn transpose(m: Mat4) -> Mat4 {
    [
        [m[0][0], m[1][0], m[2][0], m[3][0]],
        [m[0][1], m[1][1], m[2][1], m[3][1]],
        [m[0][2], m[1][2], m[2][2], m[3][2]],
        [m[0][3], m[1][3], m[2][3], m[3][3]],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    const EPSILON: f32 = 0.0001;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    fn vec_approx_eq(a: Vec3, b: Vec3) -> bool {
        approx_eq(a.x, b.x) && approx_eq(a.y, b.y) && approx_eq(a.z, b.z)
    }

    fn mat_approx_eq(a: Mat4, b: Mat4) -> bool {
        for i in 0..4 {
            for j in 0..4 {
                if !approx_eq(a[i][j], b[i][j]) {
                    return false;
                }
            }
        }
        true
    }

    #[test]
    fn test_identity() {
        let p = Vec3::new(1.0, 2.0, 3.0);
        assert!(vec_approx_eq(transform_point(IDENTITY, p), p));
        assert!(mat_approx_eq(mul(IDENTITY, IDENTITY), IDENTITY));
    }

    #[test]
    fn test_translation_moves_points_not_vectors() {
        let m = translation(Vec3::new(1.0, -2.0, 3.0));
        assert!(vec_approx_eq(transform_point(m, Vec3::ZERO), Vec3::new(1.0, -2.0, 3.0)));
        assert!(vec_approx_eq(transform_vector(m, Vec3::X), Vec3::X));
    }

    #[test]
    fn test_rotation_axes() {
        // Right-handed: +90° about Y takes +Z to +X
        let ry = rotation_y(FRAC_PI_2);
        assert!(vec_approx_eq(transform_vector(ry, Vec3::Z), Vec3::X));

        let rx = rotation_x(FRAC_PI_2);
        assert!(vec_approx_eq(transform_vector(rx, Vec3::Y), Vec3::Z));

        let rz = rotation_z(FRAC_PI_2);
        assert!(vec_approx_eq(transform_vector(rz, Vec3::X), Vec3::Y));
    }

    #[test]
    fn test_euler_order_applies_z_first() {
        let euler = Vec3::new(FRAC_PI_2, 0.0, FRAC_PI_2);
        let m = rotation_euler(euler);
        // Z: X -> Y, then X: Y -> Z
        assert!(vec_approx_eq(transform_vector(m, Vec3::X), Vec3::Z));
    }

    #[test]
    fn test_trs_order() {
        let m = from_trs(Vec3::new(10.0, 0.0, 0.0), Vec3::new(0.0, FRAC_PI_2, 0.0), Vec3::splat(2.0));
        // Scale (0,0,2), rotate -> (2,0,0), translate -> (12,0,0)
        let p = transform_point(m, Vec3::Z);
        assert!(vec_approx_eq(p, Vec3::new(12.0, 0.0, 0.0)), "got {:?}", p);
    }

    #[test]
    fn test_mul_applies_right_first() {
        let t = translation(Vec3::new(0.0, 5.0, 0.0));
        let s = scale(Vec3::splat(3.0));
        let p = transform_point(mul(t, s), Vec3::Y);
        assert!(vec_approx_eq(p, Vec3::new(0.0, 8.0, 0.0)));
    }

    #[test]
    fn test_normal_under_non_uniform_scale() {
        // A slanted surface with normal (1,1,0)/√2, squashed along X
        let m = scale(Vec3::new(2.0, 1.0, 1.0));
        let n = Vec3::new(1.0, 1.0, 0.0).normalized();
        let tn = transform_normal(m, n);

        // Tangent (1,-1,0) maps to (2,-1,0); the normal must stay perpendicular
        let tangent = transform_vector(m, Vec3::new(1.0, -1.0, 0.0));
        assert!(approx_eq(tn.dot(tangent), 0.0));
        assert!(approx_eq(tn.length(), 1.0));
    }

    #[test]
    fn test_normal_under_mirror_keeps_orientation() {
        let m = scale(Vec3::new(-1.0, 1.0, 1.0));
        let tn = transform_normal(m, Vec3::X);
        assert!(vec_approx_eq(tn, -Vec3::X));
    }

    #[test]
    fn test_look_at_maps_target_to_negative_z() {
        let eye = Vec3::new(14.0, 11.0, 14.0);
        let target = Vec3::new(0.0, 2.0, 0.0);
        let view = look_at(eye, target, Vec3::Y);

        let eye_view = transform_point(view, eye);
        assert!(vec_approx_eq(eye_view, Vec3::ZERO));

        let target_view = transform_point(view, target);
        let dist = (target - eye).length();
        assert!(vec_approx_eq(target_view, Vec3::new(0.0, 0.0, -dist)), "got {:?}", target_view);
    }

    #[test]
    fn test_look_at_straight_down_is_finite() {
        let view = look_at(Vec3::new(0.0, 10.0, 0.0), Vec3::ZERO, Vec3::Y);
        for col in view.iter() {
            for v in col.iter() {
                assert!(v.is_finite());
            }
        }
    }

    #[test]
    fn test_perspective_depth_range() {
        let proj = perspective(42f32.to_radians(), 1.5, 0.1, 1000.0);

        let clip_depth = |z: f32| {
            let zc = proj[2][2] * z + proj[3][2];
            let wc = proj[2][3] * z;
            zc / wc
        };

        assert!(approx_eq(clip_depth(-0.1), 0.0));
        assert!(approx_eq(clip_depth(-1000.0), 1.0));
    }

    #[test]
    fn test_transpose_involution() {
        let m = from_trs(Vec3::new(1.0, 2.0, 3.0), Vec3::new(0.3, 0.2, 0.1), Vec3::ONE);
        assert!(mat_approx_eq(transpose(transpose(m)), m));
    }
}
