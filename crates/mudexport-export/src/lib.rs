//! mudexport Export Pipeline
//!
//! Builds tag trees and renders them as MUD tagged text:
//! - `tag`: the generic tag tree and its factory functions
//! - `writer`: depth-first text rendering
//! - `mud`: mesh to `.mudm` model export

pub mod mud;
pub mod tag;
pub mod writer;

pub use mud::{MudExportOptions, MudExportSummary, MudExporter, UpAxis, MAX_BONE_DEPTH, MUD_EXTENSION};
pub use tag::{bone_tag, named_tag, property_tag, simple_tag, TagNode};
pub use writer::TreeWriter;
