//! MUD model exporter
//!
//! Exports skinned meshes to the `.mudm` tagged-text format:
//!
//! ```text
//! model
//! ├── mesh (name, vertexcount)
//! │   ├── vertex (id) *
//! │   │   ├── position / normal / indices / weights
//! │   └── indices (count, values)
//! └── skeleton (optional)
//!     └── Bone *
//! ```

mod exporter;

pub use exporter::{MudExportOptions, MudExportSummary, MudExporter};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// File extension of MUD model files
pub const MUD_EXTENSION: &str = "mudm";

/// Deepest bone hierarchy the exporter will nest
pub const MAX_BONE_DEPTH: usize = 512;

/// Up axis of the exported coordinates
///
/// Source meshes are Z-up; positions and normals are rotated so the source
/// up vector lands on the chosen axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpAxis {
    /// Keep coordinates as-is
    #[default]
    Z,
    /// Rotate -90° about X: `(x, y, z) -> (x, z, -y)`
    Y,
    /// Rotate 90° about Y: `(x, y, z) -> (z, y, -x)`
    X,
}

impl UpAxis {
    /// Apply the axis conversion to a position or direction
    pub fn convert(self, [x, y, z]: [f32; 3]) -> [f32; 3] {
        match self {
            Self::Z => [x, y, z],
            Self::Y => [x, z, -y],
            Self::X => [z, y, -x],
        }
    }
}

impl fmt::Display for UpAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Z => "z",
            Self::Y => "y",
            Self::X => "x",
        };
        f.write_str(name)
    }
}

impl FromStr for UpAxis {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "z" => Ok(Self::Z),
            "y" => Ok(Self::Y),
            "x" => Ok(Self::X),
            _ => Err(format!("Unknown up axis: {s} (expected x, y or z)")),
        }
    }
}
