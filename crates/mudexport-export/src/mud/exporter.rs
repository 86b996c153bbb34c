//! MUD exporter implementation

use std::cmp::Reverse;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use mudexport_core::logging::instrument;
use mudexport_core::{Error, Result, ResultExt};
use mudexport_mesh::{Bone, MeshSource, Skeleton, Vertex};

use super::{UpAxis, MAX_BONE_DEPTH, MUD_EXTENSION};
use crate::tag::{bone_tag, join_floats, join_indices, named_tag, property_tag, simple_tag, TagNode};
use crate::writer::TreeWriter;

/// MUD export options
///
/// The defaults reproduce the legacy output byte for byte.
#[derive(Debug, Clone, Default)]
pub struct MudExportOptions {
    /// Axis the exported coordinates treat as up
    pub up_axis: UpAxis,
    /// XML-escape attribute values
    pub escape_attributes: bool,
    /// Append a `skeleton` node when the source has bones
    pub export_skeleton: bool,
}

/// Result of a finished export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MudExportSummary {
    /// Where the model was written (None for writer exports)
    pub path: Option<PathBuf>,
    /// Number of `vertex` nodes
    pub vertex_count: usize,
    /// Number of triangles in the trailing index list
    pub triangle_count: usize,
    /// Number of `Bone` nodes
    pub bone_count: usize,
    /// Rendered size in bytes
    pub bytes: usize,
}

/// Counts gathered while building a tree
#[derive(Debug, Clone, Copy, Default)]
struct TreeStats {
    vertices: usize,
    triangles: usize,
    bones: usize,
}

/// MUD exporter
#[derive(Debug, Clone, Default)]
pub struct MudExporter {
    options: MudExportOptions,
}

impl MudExporter {
    /// Create a new MUD exporter
    pub fn new(options: MudExportOptions) -> Self {
        Self { options }
    }

    /// Active options
    pub fn options(&self) -> &MudExportOptions {
        &self.options
    }

    /// Writer configured from the options
    pub fn writer(&self) -> TreeWriter {
        TreeWriter::new().with_escaping(self.options.escape_attributes)
    }

    /// Build the model tree for a mesh
    ///
    /// Fails with `MissingSkinData` on the first vertex without bone groups.
    pub fn build_tree<S: MeshSource + ?Sized>(&self, source: &S) -> Result<TagNode> {
        self.build(source).map(|(tree, _)| tree)
    }

    /// Build and render the model text without touching the filesystem
    pub fn render<S: MeshSource + ?Sized>(&self, source: &S) -> Result<String> {
        let tree = self.build_tree(source)?;
        Ok(self.writer().render(&tree, 0))
    }

    /// Export a mesh into any writer
    ///
    /// Nothing is written unless the whole tree was built.
    pub fn export_to_writer<S, W>(&self, source: &S, sink: &mut W) -> Result<MudExportSummary>
    where
        S: MeshSource + ?Sized,
        W: Write,
    {
        let (tree, stats) = self.build(source)?;
        let text = self.writer().render(&tree, 0);

        sink.write_all(text.as_bytes())?;
        sink.flush()?;

        Ok(summary(None, stats, text.len()))
    }

    /// Export a mesh to a `.mudm` file
    ///
    /// The extension is added when `output_path` has none. The file is only
    /// created after the tree is complete, and it is removed again if writing
    /// fails partway.
    pub fn export_mesh<S: MeshSource + ?Sized>(
        &self,
        source: &S,
        output_path: impl AsRef<Path>,
    ) -> Result<MudExportSummary> {
        let path = output_path_for(output_path.as_ref());
        let start = Instant::now();

        tracing::info!(mesh = %source.name(), path = %path.display(), "Starting export");

        let built = self.build(source).and_then(|(tree, stats)| {
            let text = instrument("render", || self.writer().render(&tree, 0));
            write_file(&path, &text).map(|()| (stats, text.len()))
        });

        match built {
            Ok((stats, bytes)) => {
                tracing::info!(
                    mesh = %source.name(),
                    vertices = stats.vertices,
                    triangles = stats.triangles,
                    duration_ms = %start.elapsed().as_millis(),
                    "Export complete"
                );
                Ok(summary(Some(path), stats, bytes))
            }
            Err(e) => {
                tracing::error!(mesh = %source.name(), error = %e, "Export failed");
                Err(e)
            }
        }
    }

    fn build<S: MeshSource + ?Sized>(&self, source: &S) -> Result<(TagNode, TreeStats)> {
        instrument("build_tree", || -> Result<(TagNode, TreeStats)> {
            let mut stats = TreeStats::default();
            let mut root = named_tag("model", source.name())?;

            let vertices = source.vertices();
            let mut mesh = named_tag("mesh", source.name())?;
            mesh.push_attribute("vertexcount", vertices.len().to_string());

            for vertex in vertices {
                mesh.append_child(self.vertex_node(vertex)?);
            }
            stats.vertices = vertices.len();
            tracing::debug!(vertices = stats.vertices, "Vertices built");

            let triangles = source.triangles()?;
            let mut indices = TagNode::new("indices")?;
            indices.push_attribute("count", (triangles.len() * 3).to_string());
            indices.push_attribute(
                "values",
                join_indices(triangles.iter().flat_map(|t| t.vertices)),
            );
            mesh.append_child(indices);
            stats.triangles = triangles.len();
            tracing::debug!(triangles = stats.triangles, "Indices built");

            root.append_child(mesh);

            if self.options.export_skeleton {
                if let Some(skeleton) = source.skeleton() {
                    root.append_child(self.skeleton_node(skeleton)?);
                    stats.bones = skeleton.bone_count();
                    tracing::debug!(bones = stats.bones, "Skeleton built");
                }
            }

            Ok((root, stats))
        })
    }

    fn vertex_node(&self, vertex: &Vertex) -> Result<TagNode> {
        if vertex.groups.is_empty() {
            return Err(Error::MissingSkinData {
                vertex: vertex.index,
            });
        }

        let up = self.options.up_axis;
        let mut node = TagNode::new("vertex")?;
        node.push_attribute("id", vertex.index.to_string());

        node.append_child(property_tag("position", join_floats(&up.convert(vertex.position)))?);
        node.append_child(property_tag("normal", join_floats(&up.convert(vertex.normal)))?);

        let weights: Vec<f32> = vertex.groups.iter().map(|g| g.weight).collect();
        node.append_child(property_tag(
            "indices",
            join_indices(vertex.groups.iter().map(|g| g.group)),
        )?);
        node.append_child(property_tag("weights", join_floats(&weights))?);

        Ok(node)
    }

    fn skeleton_node(&self, skeleton: &Skeleton) -> Result<TagNode> {
        let depths = skeleton.depths().context("exporting skeleton")?;
        let deepest = depths.iter().copied().max().unwrap_or(0);
        if deepest > MAX_BONE_DEPTH {
            return Err(Error::invalid_data(format!(
                "skeleton is {deepest} bones deep, limit is {MAX_BONE_DEPTH}"
            )));
        }

        // Deepest bones first, so every child is built before its parent.
        let mut order: Vec<usize> = (0..skeleton.bone_count()).collect();
        order.sort_by_key(|&idx| Reverse(depths[idx]));

        let children = skeleton.child_lists();
        let mut built: Vec<Option<TagNode>> = vec![None; skeleton.bone_count()];
        for idx in order {
            let mut node = self.bone_node(&skeleton.bones[idx])?;
            for &child in &children[idx] {
                if let Some(child_node) = built[child].take() {
                    node.append_child(child_node);
                }
            }
            built[idx] = Some(node);
        }

        let mut node = simple_tag("skeleton")?;
        for root in skeleton.root_bones() {
            if let Some(root_node) = built[root].take() {
                node.append_child(root_node);
            }
        }
        Ok(node)
    }

    fn bone_node(&self, bone: &Bone) -> Result<TagNode> {
        let up = self.options.up_axis;

        // Rotating the quaternion's vector part re-expresses it in the new basis.
        let [rx, ry, rz, rw] = bone.rotation;
        let [rx, ry, rz] = up.convert([rx, ry, rz]);

        bone_tag(&bone.name, up.convert(bone.translation), [rx, ry, rz, rw])
    }
}

fn summary(path: Option<PathBuf>, stats: TreeStats, bytes: usize) -> MudExportSummary {
    MudExportSummary {
        path,
        vertex_count: stats.vertices,
        triangle_count: stats.triangles,
        bone_count: stats.bones,
        bytes,
    }
}

/// Add the `.mudm` extension when the path has none
fn output_path_for(path: &Path) -> PathBuf {
    if path.extension().is_some() {
        path.to_path_buf()
    } else {
        path.with_extension(MUD_EXTENSION)
    }
}

fn write_file(path: &Path, text: &str) -> Result<()> {
    let file = File::create(path)
        .map_err(Error::from)
        .with_context(|| format!("creating {}", path.display()))?;

    let written = (|| -> Result<()> {
        let mut writer = BufWriter::new(file);
        writer.write_all(text.as_bytes())?;
        writer.flush()?;
        Ok(())
    })();

    if let Err(e) = written {
        if let Err(cleanup) = std::fs::remove_file(path) {
            tracing::warn!(
                path = %path.display(),
                error = %cleanup,
                "Failed to remove partially written file"
            );
        }
        return Err(e.with_context(format!("writing {}", path.display())));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mudexport_mesh::{Mesh, Polygon, VertexGroup};

    fn make_skinned_triangle() -> Mesh {
        let mut mesh = Mesh::new("Tri");
        mesh.push_vertex([0.0, 0.0, 0.0], [0.0, 0.0, 1.0]).unwrap().groups.push(VertexGroup::new(0, 1.0));
        mesh.push_vertex([1.0, 0.0, 0.0], [0.0, 0.0, 1.0]).unwrap().groups.push(VertexGroup::new(0, 1.0));
        mesh.push_vertex([0.0, 1.0, 0.0], [0.0, 0.0, 1.0]).unwrap().groups.push(VertexGroup::new(1, 1.0));
        mesh.polygons.push(Polygon::new(&[0, 1, 2]));
        mesh
    }

    #[test]
    fn test_output_path_for() {
        assert_eq!(output_path_for(Path::new("out/cube")), PathBuf::from("out/cube.mudm"));
        assert_eq!(output_path_for(Path::new("cube.txt")), PathBuf::from("cube.txt"));
    }

    #[test]
    fn test_vertex_children_order() {
        let tree = MudExporter::default().build_tree(&make_skinned_triangle()).unwrap();
        let vertex = &tree.children()[0].children()[0];

        let names: Vec<_> = vertex.children().iter().map(TagNode::name).collect();
        assert_eq!(names, ["position", "normal", "indices", "weights"]);
        assert_eq!(vertex.attribute("id"), Some("0"));
    }

    #[test]
    fn test_skeleton_only_when_enabled() {
        let mut mesh = make_skinned_triangle();
        let mut skeleton = Skeleton::new();
        skeleton.add_bone(Bone::new("root", None));
        mesh.skeleton = Some(skeleton);

        let plain = MudExporter::default().build_tree(&mesh).unwrap();
        assert_eq!(plain.children().len(), 1);

        let exporter = MudExporter::new(MudExportOptions {
            export_skeleton: true,
            ..Default::default()
        });
        let with_bones = exporter.build_tree(&mesh).unwrap();
        assert_eq!(with_bones.children().len(), 2);
        assert_eq!(with_bones.children()[1].name(), "skeleton");
    }

    #[test]
    fn test_export_to_writer_summary() {
        let mut buffer = Vec::new();
        let summary = MudExporter::default()
            .export_to_writer(&make_skinned_triangle(), &mut buffer)
            .unwrap();

        assert_eq!(summary.vertex_count, 3);
        assert_eq!(summary.triangle_count, 1);
        assert_eq!(summary.bytes, buffer.len());
        assert!(summary.path.is_none());
    }

    #[test]
    fn test_writer_untouched_on_missing_skin() {
        let mut mesh = make_skinned_triangle();
        mesh.vertices[1].groups.clear();

        let mut buffer = Vec::new();
        let err = MudExporter::default().export_to_writer(&mesh, &mut buffer).unwrap_err();

        assert!(matches!(err, Error::MissingSkinData { vertex: 1 }));
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_bones_nest_under_parents() {
        let mut mesh = make_skinned_triangle();
        let mut skeleton = Skeleton::new();
        skeleton.add_bone(Bone::new("hand", Some(2)));
        skeleton.add_bone(Bone::new("root", None));
        skeleton.add_bone(Bone::new("arm", Some(1)));
        skeleton.add_bone(Bone::new("leg", Some(1)));
        mesh.skeleton = Some(skeleton);

        let exporter = MudExporter::new(MudExportOptions {
            export_skeleton: true,
            ..Default::default()
        });
        let tree = exporter.build_tree(&mesh).unwrap();
        let root = &tree.children()[1].children()[0];

        assert_eq!(root.attribute("name"), Some("root"));
        let names: Vec<_> = root.children().iter().map(|b| b.attribute("name")).collect();
        assert_eq!(names, [Some("arm"), Some("leg")]);
        assert_eq!(root.children()[0].children()[0].attribute("name"), Some("hand"));
    }

    #[test]
    fn test_write_file_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.mudm");

        write_file(&path, "<model>\n</model>\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<model>\n</model>\n");
    }
}
