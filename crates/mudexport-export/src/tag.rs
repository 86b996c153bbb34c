//! Generic tag tree
//!
//! A [`TagNode`] is a name, ordered `(key, value)` attribute pairs and owned
//! children. Trees are built once, bottom-up and left to right, then handed
//! to a [`TreeWriter`](crate::writer::TreeWriter).

use std::fmt::Write as _;

use mudexport_core::{Error, Result};

/// One element of a tag tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagNode {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<TagNode>,
}

impl TagNode {
    /// Create a node without attributes
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::invalid_argument("tag name must not be empty"));
        }

        Ok(Self {
            name,
            attributes: Vec::new(),
            children: Vec::new(),
        })
    }

    /// Create a node from parallel key and value lists
    ///
    /// Fails with `InvalidArgument` when the lists differ in length.
    pub fn with_attributes<K, V>(name: impl Into<String>, keys: &[K], values: &[V]) -> Result<Self>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut node = Self::new(name)?;
        if keys.len() != values.len() {
            return Err(Error::invalid_argument(format!(
                "tag <{}> has {} attribute keys but {} values",
                node.name,
                keys.len(),
                values.len()
            )));
        }

        node.attributes = keys
            .iter()
            .zip(values)
            .map(|(k, v)| (k.as_ref().to_string(), v.as_ref().to_string()))
            .collect();

        Ok(node)
    }

    /// Append an attribute after the existing ones
    pub fn push_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attributes.push((key.into(), value.into()));
    }

    /// Move `child` to the end of this node's children
    pub fn append_child(&mut self, child: TagNode) {
        self.children.push(child);
    }

    /// Tag name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attributes in emission order
    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    /// Value of the first attribute named `key`
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Children in order
    pub fn children(&self) -> &[TagNode] {
        &self.children
    }

    /// First child named `name`
    pub fn child(&self, name: &str) -> Option<&TagNode> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Height of the subtree rooted here (a leaf is 1)
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self, 1)];
        while let Some((node, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            stack.extend(node.children.iter().map(|child| (child, depth + 1)));
        }
        deepest
    }
}

/// `<tag name="...">`
pub fn named_tag(tag: &str, name_value: impl Into<String>) -> Result<TagNode> {
    let mut node = TagNode::new(tag)?;
    node.push_attribute("name", name_value);
    Ok(node)
}

/// `<tag value="...">`
pub fn property_tag(tag: &str, value: impl Into<String>) -> Result<TagNode> {
    let mut node = TagNode::new(tag)?;
    node.push_attribute("value", value);
    Ok(node)
}

/// `<tag>` with no attributes
pub fn simple_tag(tag: &str) -> Result<TagNode> {
    TagNode::new(tag)
}

/// `<Bone name="..." translation="x y z" rotation="x y z w">`
pub fn bone_tag(name: &str, translation: [f32; 3], rotation: [f32; 4]) -> Result<TagNode> {
    TagNode::with_attributes(
        "Bone",
        &["name", "translation", "rotation"],
        &[name.to_string(), join_floats(&translation), join_floats(&rotation)],
    )
}

/// Format a float as attribute text
///
/// Uses the shortest decimal that round-trips the `f32`, never exponent
/// notation, and keeps a trailing `.0` on integral values.
pub fn format_float(value: f32) -> String {
    let text = value.to_string();
    if value.is_finite() && !text.contains('.') {
        text + ".0"
    } else {
        text
    }
}

/// Space-join floats using [`format_float`]
pub fn join_floats(values: &[f32]) -> String {
    let mut out = String::new();
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(&format_float(*value));
    }
    out
}

/// Space-join integers
pub fn join_indices<I>(values: I) -> String
where
    I: IntoIterator<Item = u32>,
{
    let mut out = String::new();
    for (i, value) in values.into_iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        // Writing into a String cannot fail.
        let _ = write!(out, "{value}");
    }
    out
}
