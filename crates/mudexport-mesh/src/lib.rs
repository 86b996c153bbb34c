//! mudexport-mesh
//!
//! Skinned triangle mesh data consumed by the MUD exporter.
//!
//! # Supported Inputs
//!
//! | Format | Extension       | Description |
//! |--------|-----------------|-------------|
//! | JSON   | `.json`         | Mesh document |
//! | YAML   | `.yaml`, `.yml` | Mesh document |
//!
//! # Example
//!
//! ```rust,ignore
//! use mudexport_mesh::{MeshDocument, MeshSource};
//!
//! let mesh = MeshDocument::load("cube.json")?.into_mesh()?;
//! println!("{} has {} triangles", mesh.name(), mesh.triangles()?.len());
//! ```

pub mod bones;
pub mod document;
pub mod mesh;
pub mod source;

pub use bones::{Bone, Skeleton};
pub use document::MeshDocument;
pub use mesh::{Mesh, Polygon, Triangle, Vertex, VertexGroup};
pub use source::MeshSource;
