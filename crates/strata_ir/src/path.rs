//! Index paths into nested input.

use std::fmt;

use smallvec::SmallVec;

/// Location of a node inside a nested input, as the chain of sequence
/// indices walked from the root.
///
/// Rendered as `input[1][0]`; the root renders as `input`.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct NodePath {
    indices: SmallVec<[u32; 8]>,
}

impl NodePath {
    pub fn root() -> Self {
        NodePath::default()
    }

    pub fn depth(&self) -> usize {
        self.indices.len()
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Descend into child `index`.
    pub fn push(&mut self, index: usize) {
        self.indices.push(index as u32);
    }

    /// Return to the parent node.
    pub fn pop(&mut self) {
        self.indices.pop();
    }

    /// The enclosing node; `None` at the root.
    #[must_use]
    pub fn parent(&self) -> Option<NodePath> {
        let (_, rest) = self.indices.split_last()?;
        Some(NodePath {
            indices: rest.iter().copied().collect(),
        })
    }

    /// A copy of this path extended by `index`.
    #[must_use]
    pub fn child(&self, index: usize) -> NodePath {
        let mut path = self.clone();
        path.push(index);
        path
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "input")?;
        for index in &self.indices {
            write!(f, "[{index}]")?;
        }
        Ok(())
    }
}
