//! 3D Mathematics Library
//!
//! This crate provides the vector, matrix and mesh types used by Hearth.
//!
//! ## Core Types
//!
//! - [`Vec3`] - 3D vector with x, y, z components (Y up)
//! - [`Mat4`] - column-major 4x4 matrix with free-function helpers
//!
//! ## Geometry
//!
//! - [`MeshData`] - indexed triangle mesh (positions, normals, indices)
//! - [`primitives`] - procedural boxes, planes, discs, cylinders, cones,
//!   spheres, tori, dodecahedra and Catmull-Rom tubes

mod vec3;
pub mod mat4;
pub mod mesh;
pub mod primitives;

pub use vec3::Vec3;
pub use mat4::Mat4;
pub use mesh::MeshData;
