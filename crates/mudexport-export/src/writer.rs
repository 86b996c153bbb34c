//! Tag tree text writer
//!
//! Renders a [`TagNode`] depth-first: the opening tag before the children,
//! the closing tag after them, each line indented with one tab per level.
//!
//! ```text
//! <model name="Cube">
//! 	<mesh name="Cube" vertexcount="8">
//! 	</mesh>
//! </model>
//! ```

use std::fmt;
use std::io;

use mudexport_core::Result;

use crate::tag::TagNode;

/// Depth-first tag tree renderer
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeWriter {
    escape_attributes: bool,
}

impl TreeWriter {
    /// Writer that embeds attribute values verbatim
    pub fn new() -> Self {
        Self::default()
    }

    /// Writer that XML-escapes `&`, `"`, `<` and `>` in attribute values
    #[must_use]
    pub fn with_escaping(mut self, escape: bool) -> Self {
        self.escape_attributes = escape;
        self
    }

    /// Whether attribute values are escaped
    pub fn escapes_attributes(&self) -> bool {
        self.escape_attributes
    }

    /// Render `node` starting at `indent_level` tabs
    pub fn render(&self, node: &TagNode, indent_level: usize) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.render_into(&mut out, node, indent_level);
        out
    }

    /// Render `node` into any `fmt::Write` sink
    ///
    /// Uses an explicit stack; tree depth is not bounded by the call stack.
    pub fn render_into<W: fmt::Write>(&self, out: &mut W, node: &TagNode, indent_level: usize) -> fmt::Result {
        let mut stack = vec![Step::Open(node, indent_level)];

        while let Some(step) = stack.pop() {
            match step {
                Step::Open(node, level) => {
                    self.write_open(out, node, level)?;
                    stack.push(Step::Close(node, level));
                    for child in node.children().iter().rev() {
                        stack.push(Step::Open(child, level + 1));
                    }
                }
                Step::Close(node, level) => {
                    write_indent(out, level)?;
                    writeln!(out, "</{}>", node.name())?;
                }
            }
        }

        Ok(())
    }

    fn write_open<W: fmt::Write>(&self, out: &mut W, node: &TagNode, level: usize) -> fmt::Result {
        write_indent(out, level)?;
        write!(out, "<{}", node.name())?;

        for (key, value) in node.attributes() {
            write!(out, " {key}=\"")?;
            if self.escape_attributes {
                write_escaped(out, value)?;
            } else {
                out.write_str(value)?;
            }
            out.write_char('"')?;
        }

        out.write_str(">\n")
    }

    /// Render the whole tree, then write it to `sink` in one piece
    pub fn write<W: io::Write>(&self, sink: &mut W, root: &TagNode) -> Result<()> {
        let text = self.render(root, 0);
        sink.write_all(text.as_bytes())?;
        sink.flush()?;
        Ok(())
    }
}

enum Step<'a> {
    Open(&'a TagNode, usize),
    Close(&'a TagNode, usize),
}

fn write_indent<W: fmt::Write>(out: &mut W, level: usize) -> fmt::Result {
    for _ in 0..level {
        out.write_char('\t')?;
    }
    Ok(())
}

fn write_escaped<W: fmt::Write>(out: &mut W, value: &str) -> fmt::Result {
    for ch in value.chars() {
        match ch {
            '&' => out.write_str("&amp;")?,
            '"' => out.write_str("&quot;")?,
            '<' => out.write_str("&lt;")?,
            '>' => out.write_str("&gt;")?,
            other => out.write_char(other)?,
        }
    }
    Ok(())
}
