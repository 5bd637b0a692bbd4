//! G3D geometry: a BFast container of typed attribute buffers.
//!
//! - [`G3d`] - header plus attributes, read and written byte-exact
//! - [`TriangleMesh`] - faces rebuilt from positions, indices, face sizes and groups
//! - [`Mesh`] - per-group double-sided sub-meshes, written as OBJ

mod attribute;
mod container;
mod mesh;
mod obj;

pub use attribute::*;
pub use container::*;
pub use mesh::*;
pub use obj::*;
