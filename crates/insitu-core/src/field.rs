//! Field centering.

use std::fmt;

/// Where a scalar field's samples live on the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Association {
    /// One sample per grid vertex (node-centred).
    Vertex,
    /// One sample per grid cell (element-centred).
    Element,
}

impl Association {
    /// The name used in mesh descriptions (`"vertex"` / `"element"`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Vertex => "vertex",
            Self::Element => "element",
        }
    }
}

impl fmt::Display for Association {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
