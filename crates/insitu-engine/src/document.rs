//! Nested key/value documents exchanged with the runtime.
//!
//! A [`Node`] is a tree of scalars, strings, lists, and ordered objects.
//! Children are addressed with slash-separated paths:
//!
//! ```
//! use insitu_engine::Node;
//!
//! let mut n = Node::new();
//! n.set("coordsets/coords/type", "uniform");
//! n.set("state/cycle", 3i64);
//! assert_eq!(n.get("coordsets/coords/type").and_then(Node::as_text), Some("uniform"));
//! assert_eq!(n.get("state/cycle").and_then(Node::as_int), Some(3));
//! ```
//!
//! Field values are carried as [`Node::External`]: a live view over the
//! grid's own buffer rather than a copy. That ties the document's
//! lifetime `'a` to the grid borrow.

use std::fmt;

use indexmap::IndexMap;
use insitu_grid::ExposedBuffer;

/// One node of a document tree.
#[derive(Debug, Default)]
pub enum Node<'a> {
    /// No value yet.
    #[default]
    Empty,
    /// Integer leaf.
    Int(i64),
    /// Floating-point leaf.
    Float(f64),
    /// String leaf.
    Text(String),
    /// Externally owned array, referenced in place.
    External(ExposedBuffer<'a>),
    /// Named children in insertion order.
    Object(IndexMap<String, Node<'a>>),
    /// Unnamed children, as used for action lists.
    List(Vec<Node<'a>>),
}

impl<'a> Node<'a> {
    /// An empty node.
    pub fn new() -> Self {
        Self::Empty
    }

    /// Store `value` at `path`, creating intermediate objects as needed.
    ///
    /// Any non-object node on the way is replaced by an object.
    pub fn set(&mut self, path: &str, value: impl Into<Node<'a>>) {
        *self.entry(path) = value.into();
    }

    /// The node at `path`, created empty if missing.
    pub fn entry(&mut self, path: &str) -> &mut Node<'a> {
        segments(path).fold(self, |node, key| node.child(key))
    }

    /// The node at `path`, if present.
    pub fn get(&self, path: &str) -> Option<&Node<'a>> {
        segments(path).try_fold(self, |node, key| match node {
            Self::Object(map) => map.get(key),
            _ => None,
        })
    }

    /// Mutable access to the node at `path`, if present.
    pub fn get_mut(&mut self, path: &str) -> Option<&mut Node<'a>> {
        segments(path).try_fold(self, |node, key| match node {
            Self::Object(map) => map.get_mut(key),
            _ => None,
        })
    }

    /// Whether a node exists at `path`.
    pub fn has_path(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Push an empty node onto this list and return it.
    ///
    /// A non-list node is replaced by an empty list first.
    pub fn append(&mut self) -> &mut Node<'a> {
        if !matches!(self, Self::List(_)) {
            *self = Self::List(Vec::new());
        }
        match self {
            Self::List(items) => {
                items.push(Self::Empty);
                let last = items.len() - 1;
                &mut items[last]
            }
            _ => unreachable!("non-list nodes are replaced above"),
        }
    }

    fn child(&mut self, key: &str) -> &mut Node<'a> {
        if !matches!(self, Self::Object(_)) {
            *self = Self::Object(IndexMap::new());
        }
        match self {
            Self::Object(map) => map.entry(key.to_owned()).or_default(),
            _ => unreachable!("non-object nodes are replaced above"),
        }
    }

    /// Integer value, if this is an `Int`.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric value of an `Int` or `Float`.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// String value, if this is `Text`.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The referenced buffer, if this is `External`.
    pub fn as_external(&self) -> Option<&ExposedBuffer<'a>> {
        match self {
            Self::External(buf) => Some(buf),
            _ => None,
        }
    }

    /// Mutable access to the referenced buffer.
    pub fn as_external_mut(&mut self) -> Option<&mut ExposedBuffer<'a>> {
        match self {
            Self::External(buf) => Some(buf),
            _ => None,
        }
    }

    /// Children of a list node.
    pub fn items(&self) -> &[Node<'a>] {
        match self {
            Self::List(items) => items,
            _ => &[],
        }
    }

    /// Child names of an object node, in insertion order.
    pub fn keys(&self) -> Vec<&str> {
        match self {
            Self::Object(map) => map.keys().map(String::as_str).collect(),
            _ => Vec::new(),
        }
    }

    /// Number of direct children (0 for leaves).
    pub fn child_count(&self) -> usize {
        match self {
            Self::Object(map) => map.len(),
            Self::List(items) => items.len(),
            _ => 0,
        }
    }

    fn write_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let pad = "  ".repeat(depth);
        match self {
            Self::Object(map) => {
                for (key, child) in map {
                    if child.child_count() > 0 {
                        writeln!(f, "{pad}{key}:")?;
                        child.write_indented(f, depth + 1)?;
                    } else {
                        write!(f, "{pad}{key}: ")?;
                        child.write_leaf(f)?;
                        writeln!(f)?;
                    }
                }
                Ok(())
            }
            Self::List(items) => {
                for child in items {
                    writeln!(f, "{pad}-")?;
                    child.write_indented(f, depth + 1)?;
                }
                Ok(())
            }
            leaf => {
                write!(f, "{pad}")?;
                leaf.write_leaf(f)?;
                writeln!(f)
            }
        }
    }

    fn write_leaf(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty | Self::Object(_) | Self::List(_) => f.write_str("~"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(s) => write!(f, "{s:?}"),
            Self::External(buf) => {
                write!(f, "<external {} x{}>", buf.association(), buf.len())
            }
        }
    }
}

impl fmt::Display for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

impl From<i64> for Node<'_> {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Node<'_> {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<u32> for Node<'_> {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<usize> for Node<'_> {
    fn from(v: usize) -> Self {
        Self::Int(i64::try_from(v).unwrap_or(i64::MAX))
    }
}

impl From<f64> for Node<'_> {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Node<'_> {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}

impl From<String> for Node<'_> {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl<'a> From<ExposedBuffer<'a>> for Node<'a> {
    fn from(v: ExposedBuffer<'a>) -> Self {
        Self::External(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insitu_grid::{FieldGrid, GridSpec, SubDomain};

    #[test]
    fn set_creates_intermediate_objects() {
        let mut n = Node::new();
        n.set("a/b/c", 1i64);
        n.set("a/b/d", 2.5);
        n.set("a/e", "text");
        assert_eq!(n.get("a/b/c").and_then(Node::as_int), Some(1));
        assert_eq!(n.get("a/b/d").and_then(Node::as_float), Some(2.5));
        assert_eq!(n.get("a/e").and_then(Node::as_text), Some("text"));
        assert_eq!(n.get("a/b").map(Node::child_count), Some(2));
        assert!(n.get("a/x").is_none());
    }

    #[test]
    fn keys_keep_insertion_order() {
        let mut n = Node::new();
        n.set("z", 1i64);
        n.set("a", 2i64);
        n.set("m", 3i64);
        assert_eq!(n.keys(), vec!["z", "a", "m"]);
    }

    #[test]
    fn set_overwrites_leaf_with_object() {
        let mut n = Node::new();
        n.set("a", 1i64);
        n.set("a/b", 2i64);
        assert_eq!(n.get("a/b").and_then(Node::as_int), Some(2));
        assert!(n.get("a").and_then(Node::as_int).is_none());
    }

    #[test]
    fn paths_ignore_empty_segments() {
        let mut n = Node::new();
        n.set("/state//time/", 0.5);
        assert!(n.has_path("state/time"));
    }

    #[test]
    fn append_builds_list() {
        let mut actions = Node::new();
        actions.append().set("action", "add_scenes");
        actions.append().set("action", "execute");
        let names: Vec<_> = actions
            .items()
            .iter()
            .filter_map(|a| a.get("action").and_then(Node::as_text))
            .collect();
        assert_eq!(names, vec!["add_scenes", "execute"]);
    }

    #[test]
    fn external_refers_to_grid_memory() {
        let spec = GridSpec::new([1, 1, 1], 1, 0.5).unwrap();
        let mut grid = FieldGrid::new(&spec, &SubDomain::whole(&spec)).unwrap();
        {
            let mut n = Node::new();
            n.set("values", grid.expose_points());
            let buf = n.get_mut("values").and_then(Node::as_external_mut).unwrap();
            buf.as_mut_slice()[3] = 9.0;
        }
        assert_eq!(grid.point_values()[3], 9.0);
    }

    #[test]
    fn display_renders_tree() {
        let mut n = Node::new();
        n.set("state/cycle", 2i64);
        n.set("state/info", "hi");
        let text = n.to_string();
        assert_eq!(text, "state:\n  cycle: 2\n  info: \"hi\"\n");
    }
}
