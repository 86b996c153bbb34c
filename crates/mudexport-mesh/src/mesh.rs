//! Skinned mesh data structures

use mudexport_core::{Error, Result};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::bones::Skeleton;

/// Inline capacity for per-vertex bone influences
pub const INLINE_GROUPS: usize = 4;

/// A mesh with arbitrary polygon faces and per-vertex skin weights
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mesh {
    /// Mesh name
    pub name: String,
    /// All vertices, in index order
    pub vertices: Vec<Vertex>,
    /// Polygon faces (triangles or larger n-gons)
    pub polygons: Vec<Polygon>,
    /// Optional armature driving the skin weights
    pub skeleton: Option<Skeleton>,
}

impl Mesh {
    /// Create a new empty mesh
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vertices: Vec::new(),
            polygons: Vec::new(),
            skeleton: None,
        }
    }

    /// Append a vertex, assigning it the next index
    ///
    /// Fails once the mesh already holds `u32::MAX + 1` vertices.
    pub fn push_vertex(&mut self, position: [f32; 3], normal: [f32; 3]) -> Result<&mut Vertex> {
        let index = vertex_index(self.vertices.len())?;
        self.vertices.push(Vertex::new(index, position, normal));
        let last = self.vertices.len() - 1;
        Ok(&mut self.vertices[last])
    }

    /// Get vertex count
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get polygon count
    pub fn polygon_count(&self) -> usize {
        self.polygons.len()
    }

    /// Check whether every vertex has at least one bone influence
    pub fn is_skinned(&self) -> bool {
        !self.vertices.is_empty() && self.vertices.iter().all(Vertex::is_skinned)
    }

    /// Split all polygons into triangles
    ///
    /// Each polygon is fanned around its first vertex, so triangles keep
    /// polygon order and a quad `a b c d` becomes `a b c` and `a c d`.
    pub fn triangulate(&self) -> Result<Vec<Triangle>> {
        let vertex_count = self.vertices.len();
        let mut triangles = Vec::with_capacity(self.polygons.len());

        for (face, polygon) in self.polygons.iter().enumerate() {
            let indices = &polygon.vertices;
            if indices.len() < 3 {
                return Err(Error::invalid_data(format!(
                    "polygon {} has {} vertices, need at least 3",
                    face,
                    indices.len()
                )));
            }

            if let Some(&bad) = indices.iter().find(|&&i| i as usize >= vertex_count) {
                return Err(Error::invalid_data(format!(
                    "polygon {face} references vertex {bad} but mesh has {vertex_count} vertices"
                )));
            }

            for i in 1..indices.len() - 1 {
                triangles.push(Triangle::new(indices[0], indices[i], indices[i + 1]));
            }
        }

        Ok(triangles)
    }
}

/// Convert a position in the vertex list to a vertex index
pub(crate) fn vertex_index(position: usize) -> Result<u32> {
    u32::try_from(position)
        .map_err(|_| Error::invalid_data(format!("vertex {position} exceeds the u32 index range")))
}

/// One bone influence on a vertex
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VertexGroup {
    /// Bone (vertex group) index
    pub group: u32,
    /// Blend weight
    pub weight: f32,
}

impl VertexGroup {
    /// Create a bone influence
    pub fn new(group: u32, weight: f32) -> Self {
        Self { group, weight }
    }
}

impl From<(u32, f32)> for VertexGroup {
    fn from((group, weight): (u32, f32)) -> Self {
        Self { group, weight }
    }
}

/// A single vertex with its skinning data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vertex {
    /// Index of the vertex within its mesh
    pub index: u32,
    /// Position in 3D space
    pub position: [f32; 3],
    /// Normal vector
    pub normal: [f32; 3],
    /// Bone influences, in native iteration order
    pub groups: SmallVec<[VertexGroup; INLINE_GROUPS]>,
}

impl Vertex {
    /// Create a vertex without bone influences
    pub fn new(index: u32, position: [f32; 3], normal: [f32; 3]) -> Self {
        Self {
            index,
            position,
            normal,
            groups: SmallVec::new(),
        }
    }

    /// Builder-style helper that appends a bone influence
    #[must_use]
    pub fn with_group(mut self, group: u32, weight: f32) -> Self {
        self.groups.push(VertexGroup::new(group, weight));
        self
    }

    /// Check if vertex has any bone influence
    pub fn is_skinned(&self) -> bool {
        !self.groups.is_empty()
    }

    /// Sum of all bone weights
    pub fn total_weight(&self) -> f32 {
        self.groups.iter().map(|g| g.weight).sum()
    }
}

/// An arbitrary polygon face
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Polygon {
    /// Vertex indices, in winding order
    pub vertices: Vec<u32>,
}

impl Polygon {
    /// Create a polygon from vertex indices
    pub fn new(vertices: &[u32]) -> Self {
        Self {
            vertices: vertices.to_vec(),
        }
    }
}

/// A triangle face
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Triangle {
    /// Vertex indices
    pub vertices: [u32; 3],
}

impl Triangle {
    /// Create a triangle from three vertex indices
    pub fn new(i0: u32, i1: u32, i2: u32) -> Self {
        Self {
            vertices: [i0, i1, i2],
        }
    }
}
