//! Mesh documents (JSON / YAML)
//!
//! A mesh document is the on-disk description of a skinned mesh handed to
//! the exporter:
//!
//! ```json
//! {
//!   "name": "Cube",
//!   "vertices": [
//!     { "position": [0, 0, 0], "normal": [0, 0, 1], "groups": [{ "group": 0, "weight": 1.0 }] }
//!   ],
//!   "faces": [[0, 1, 2, 3]],
//!   "skeleton": { "bones": [{ "name": "root" }] }
//! }
//! ```

use std::path::Path;

use mudexport_core::{Error, Result, ResultExt};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::bones::{Bone, Skeleton, IDENTITY_ROTATION};
use crate::mesh::{vertex_index, Mesh, Polygon, Vertex, VertexGroup};

/// Serialized form of a mesh
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshDocument {
    /// Mesh name
    pub name: String,
    /// Vertices; a vertex's index is its position in this list
    #[serde(default)]
    pub vertices: Vec<VertexEntry>,
    /// Polygon faces as vertex index lists
    #[serde(default)]
    pub faces: Vec<Vec<u32>>,
    /// Optional skeleton
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skeleton: Option<SkeletonEntry>,
}

/// Serialized vertex
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VertexEntry {
    /// Position
    pub position: [f32; 3],
    /// Normal
    pub normal: [f32; 3],
    /// Bone influences
    #[serde(default)]
    pub groups: Vec<VertexGroup>,
}

/// Serialized skeleton
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkeletonEntry {
    /// Bones, parents referenced by index
    #[serde(default)]
    pub bones: Vec<BoneEntry>,
}

/// Serialized bone
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoneEntry {
    /// Bone name
    pub name: String,
    /// Parent index
    #[serde(default)]
    pub parent: Option<usize>,
    /// Rest translation
    #[serde(default)]
    pub translation: [f32; 3],
    /// Rest rotation quaternion (x, y, z, w)
    #[serde(default = "identity_rotation")]
    pub rotation: [f32; 4],
}

fn identity_rotation() -> [f32; 4] {
    IDENTITY_ROTATION
}

/// Document encodings, picked by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// `.json`
    Json,
    /// `.yaml` / `.yml`
    Yaml,
}

impl DocumentFormat {
    /// Detect the format from a path's extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            "" => Err(Error::UnsupportedFormat {
                format: "(no extension)".to_string(),
            }),
            other => Err(Error::UnsupportedFormat {
                format: other.to_string(),
            }),
        }
    }
}

impl MeshDocument {
    /// Parse a JSON mesh document
    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::invalid_data(format!("JSON: {e}")))
    }

    /// Parse a YAML mesh document
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).map_err(|e| Error::invalid_data(format!("YAML: {e}")))
    }

    /// Load a mesh document from disk, choosing the parser by extension
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let format = DocumentFormat::from_path(path)?;

        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }

        tracing::debug!(path = %path.display(), ?format, "Loading mesh document");

        let text = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::InvalidData => {
                Error::invalid_data(format!("{} is not valid UTF-8", path.display()))
            }
            _ => Error::from(e),
        })?;
        let document = match format {
            DocumentFormat::Json => Self::from_json_str(&text),
            DocumentFormat::Yaml => Self::from_yaml_str(&text),
        }
        .with_context(|| format!("parsing {}", path.display()))?;

        tracing::debug!(
            name = %document.name,
            vertices = document.vertices.len(),
            faces = document.faces.len(),
            "Mesh document loaded"
        );

        Ok(document)
    }

    /// Convert into a mesh, validating the skeleton
    pub fn into_mesh(self) -> Result<Mesh> {
        let vertices = self
            .vertices
            .into_iter()
            .enumerate()
            .map(|(position, entry)| {
                Ok(Vertex {
                    index: vertex_index(position)?,
                    position: entry.position,
                    normal: entry.normal,
                    groups: SmallVec::from_vec(entry.groups),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let polygons = self
            .faces
            .into_iter()
            .map(|vertices| Polygon { vertices })
            .collect();

        let skeleton = match self.skeleton {
            Some(entry) => {
                let skeleton = Skeleton {
                    bones: entry
                        .bones
                        .into_iter()
                        .map(|b| Bone {
                            name: b.name,
                            parent: b.parent,
                            translation: b.translation,
                            rotation: b.rotation,
                        })
                        .collect(),
                };
                skeleton.validate()?;
                Some(skeleton)
            }
            None => None,
        };

        Ok(Mesh {
            name: self.name,
            vertices,
            polygons,
            skeleton,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MeshSource;
    use std::io::Write;

    const CUBE_FACE_JSON: &str = r#"{
        "name": "Plane",
        "vertices": [
            { "position": [0, 0, 0], "normal": [0, 0, 1], "groups": [{ "group": 0, "weight": 1.0 }] },
            { "position": [1, 0, 0], "normal": [0, 0, 1], "groups": [{ "group": 0, "weight": 0.5 }, { "group": 1, "weight": 0.5 }] },
            { "position": [1, 1, 0], "normal": [0, 0, 1], "groups": [{ "group": 1, "weight": 1.0 }] },
            { "position": [0, 1, 0], "normal": [0, 0, 1], "groups": [{ "group": 1, "weight": 1.0 }] }
        ],
        "faces": [[0, 1, 2, 3]],
        "skeleton": { "bones": [{ "name": "root" }, { "name": "tip", "parent": 0, "translation": [0, 1, 0] }] }
    }"#;

    const PLANE_YAML: &str = "
name: Tri
vertices:
  - position: [0, 0, 0]
    normal: [0, 0, 1]
    groups: [{ group: 2, weight: 1.0 }]
  - position: [1, 0, 0]
    normal: [0, 0, 1]
  - position: [0, 1, 0]
    normal: [0, 0, 1]
faces:
  - [0, 1, 2]
";

    #[test]
    fn test_json_document_into_mesh() {
        let mesh = MeshDocument::from_json_str(CUBE_FACE_JSON).unwrap().into_mesh().unwrap();

        assert_eq!(mesh.name(), "Plane");
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.vertices[1].index, 1);
        assert_eq!(mesh.vertices[1].groups.len(), 2);
        assert_eq!(mesh.triangles().unwrap().len(), 2);

        let skeleton = mesh.skeleton().unwrap();
        assert_eq!(skeleton.bone_count(), 2);
        assert_eq!(skeleton.bones[0].rotation, IDENTITY_ROTATION);
        assert_eq!(skeleton.bones[1].translation, [0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_yaml_document_groups_default_empty() {
        let mesh = MeshDocument::from_yaml_str(PLANE_YAML).unwrap().into_mesh().unwrap();

        assert_eq!(mesh.name, "Tri");
        assert_eq!(mesh.vertices[0].groups[0].group, 2);
        assert!(mesh.vertices[1].groups.is_empty());
        assert!(!mesh.is_skinned());
        assert!(mesh.skeleton.is_none());
    }

    #[test]
    fn test_malformed_json() {
        let err = MeshDocument::from_json_str("{ \"name\": ").unwrap_err();
        assert!(matches!(err, Error::InvalidData { .. }));
    }

    #[test]
    fn test_invalid_skeleton_rejected() {
        let doc = r#"{ "name": "x", "skeleton": { "bones": [{ "name": "a", "parent": 3 }] } }"#;
        let err = MeshDocument::from_json_str(doc).unwrap().into_mesh().unwrap_err();
        assert!(err.is_input_error());
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(DocumentFormat::from_path(Path::new("a.JSON")).unwrap(), DocumentFormat::Json);
        assert_eq!(DocumentFormat::from_path(Path::new("a.yml")).unwrap(), DocumentFormat::Yaml);
        assert!(matches!(
            DocumentFormat::from_path(Path::new("a.obj")),
            Err(Error::UnsupportedFormat { .. })
        ));
        assert!(DocumentFormat::from_path(Path::new("mesh")).is_err());
    }

    #[test]
    fn test_load_from_disk() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(CUBE_FACE_JSON.as_bytes()).unwrap();

        let doc = MeshDocument::load(file.path()).unwrap();
        assert_eq!(doc.faces, vec![vec![0, 1, 2, 3]]);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = MeshDocument::load(dir.path().join("absent.yaml")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_load_non_utf8_is_input_error() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(&[b'{', 0xff, 0xfe, b'}']).unwrap();

        let err = MeshDocument::load(file.path()).unwrap_err();
        assert!(matches!(err, Error::InvalidData { .. }));
        assert!(err.is_input_error());
    }

    #[test]
    fn test_load_adds_path_context() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(b"name: [unterminated").unwrap();

        let err = MeshDocument::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("parsing"));
        assert!(err.is_input_error());
    }
}
