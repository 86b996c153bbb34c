//! mudexport CLI
//!
//! Command-line interface for converting mesh documents to MUD models.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use mudexport_core::logging::{self, TracingConfig};
use mudexport_export::{MudExportOptions, MudExporter, UpAxis, MUD_EXTENSION};
use mudexport_mesh::{Mesh, MeshDocument, MeshSource};

/// mudexport - skinned mesh to MUD model converter
#[derive(Parser)]
#[command(name = "mudexport")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output (-v -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Export a mesh document to a .mudm model
    Export(ExportArgs),

    /// Show information about a mesh document
    Info(InfoArgs),

    /// Print the .mudm text to stdout without writing a file
    Tree(TreeArgs),
}

/// Options shared by every command that renders a model
#[derive(Args)]
struct ModelArgs {
    /// Axis the exported model treats as up (z, y, x)
    #[arg(long, default_value = "z")]
    up_axis: UpAxis,

    /// XML-escape attribute values
    #[arg(long)]
    escape: bool,

    /// Include the skeleton when the mesh has one
    #[arg(long)]
    skeleton: bool,
}

impl ModelArgs {
    fn options(&self) -> MudExportOptions {
        MudExportOptions {
            up_axis: self.up_axis,
            escape_attributes: self.escape,
            export_skeleton: self.skeleton,
        }
    }
}

#[derive(Args)]
struct ExportArgs {
    /// Input mesh document (.json, .yaml, .yml)
    #[arg(short, long)]
    input: PathBuf,

    /// Output file path (defaults to the input with a .mudm extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[command(flatten)]
    model: ModelArgs,
}

#[derive(Args)]
struct InfoArgs {
    /// Input mesh document
    path: PathBuf,

    /// Output format (text, json)
    #[arg(long, default_value = "text")]
    format: OutputFormat,
}

#[derive(Args)]
struct TreeArgs {
    /// Input mesh document
    #[arg(short, long)]
    input: PathBuf,

    #[command(flatten)]
    model: ModelArgs,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_with_config(&TracingConfig::from_verbosity(cli.verbose));

    match cli.command {
        Commands::Export(args) => cmd_export(args),
        Commands::Info(args) => cmd_info(args),
        Commands::Tree(args) => cmd_tree(args),
    }
}

fn load_mesh(path: &Path) -> Result<Mesh> {
    info!("Loading mesh document: {:?}", path);

    let mesh = MeshDocument::load(path)
        .and_then(MeshDocument::into_mesh)
        .with_context(|| format!("Failed to load mesh from {:?}", path))?;

    Ok(mesh)
}

fn cmd_export(args: ExportArgs) -> Result<()> {
    let mesh = load_mesh(&args.input)?;
    let output = args
        .output
        .unwrap_or_else(|| args.input.with_extension(MUD_EXTENSION));

    let exporter = MudExporter::new(args.model.options());
    let summary = exporter
        .export_mesh(&mesh, &output)
        .context("Failed to export MUD model")?;

    let path = summary.path.as_deref().unwrap_or(output.as_path());
    println!(
        "Exported {:?}: {} vertices, {} triangles, {} bones -> {:?} ({} bytes)",
        mesh.name(),
        summary.vertex_count,
        summary.triangle_count,
        summary.bone_count,
        path,
        summary.bytes
    );

    Ok(())
}

fn cmd_info(args: InfoArgs) -> Result<()> {
    let mesh = load_mesh(&args.path)?;
    let triangles = mesh.triangles().context("Failed to triangulate mesh")?;
    let bones = mesh.skeleton.as_ref().map_or(0, |s| s.bone_count());

    match args.format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "name": mesh.name,
                "vertices": mesh.vertex_count(),
                "polygons": mesh.polygon_count(),
                "triangles": triangles.len(),
                "skinned": mesh.is_skinned(),
                "bones": bones,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Text => {
            println!("Mesh: {}", mesh.name);
            println!("  Vertices:   {}", mesh.vertex_count());
            println!("  Polygons:   {}", mesh.polygon_count());
            println!("  Triangles:  {}", triangles.len());
            println!("  Skinned:    {}", if mesh.is_skinned() { "yes" } else { "no" });
            println!("  Bones:      {}", bones);
        }
    }

    Ok(())
}

fn cmd_tree(args: TreeArgs) -> Result<()> {
    let mesh = load_mesh(&args.input)?;
    let exporter = MudExporter::new(args.model.options());

    let mut stdout = io::stdout().lock();
    exporter
        .export_to_writer(&mesh, &mut stdout)
        .context("Failed to render MUD model")?;
    stdout.flush()?;

    Ok(())
}
