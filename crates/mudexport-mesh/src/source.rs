//! Mesh provider trait consumed by exporters

use mudexport_core::Result;

use crate::bones::Skeleton;
use crate::mesh::{Mesh, Triangle, Vertex};

/// Anything that can hand a skinned, triangulable mesh to an exporter
///
/// Exporters receive the source explicitly; there is no global "current
/// object".
pub trait MeshSource {
    /// Mesh name
    fn name(&self) -> &str;

    /// Vertices in index order
    fn vertices(&self) -> &[Vertex];

    /// Faces split into triangles, in face order
    fn triangles(&self) -> Result<Vec<Triangle>>;

    /// Optional skeleton
    fn skeleton(&self) -> Option<&Skeleton> {
        None
    }
}

impl MeshSource for Mesh {
    fn name(&self) -> &str {
        &self.name
    }

    fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    fn triangles(&self) -> Result<Vec<Triangle>> {
        self.triangulate()
    }

    fn skeleton(&self) -> Option<&Skeleton> {
        self.skeleton.as_ref()
    }
}

impl<T: MeshSource + ?Sized> MeshSource for &T {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn vertices(&self) -> &[Vertex] {
        (**self).vertices()
    }

    fn triangles(&self) -> Result<Vec<Triangle>> {
        (**self).triangles()
    }

    fn skeleton(&self) -> Option<&Skeleton> {
        (**self).skeleton()
    }
}
