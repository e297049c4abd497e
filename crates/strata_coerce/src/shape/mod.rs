//! Running shape of a depth-first walk.
//!
//! The walk fixes each dimension the first time it reaches that depth.
//! Later nodes at the same depth must agree; when one does not, the usable
//! rank shrinks to the dimensions that still agree and the input is flagged
//! ragged. The walk continues so the outcome is the largest consistent
//! prefix of the shape.

use smallvec::SmallVec;
use strata_ir::{Shape, MAX_DIMS};

#[derive(Clone, Debug)]
pub(crate) struct ShapeTracker {
    /// Dimension fixed at each depth, `None` until reached.
    dims: SmallVec<[Option<usize>; 8]>,
    /// Current rank bound. Shrinks as leaves and disagreements are found.
    max_ndim: usize,
}

impl ShapeTracker {
    pub(crate) fn new(max_dims: usize) -> Self {
        let max_dims = max_dims.min(MAX_DIMS);
        ShapeTracker {
            dims: SmallVec::from_elem(None, max_dims),
            max_ndim: max_dims,
        }
    }

    #[inline]
    pub(crate) fn max_ndim(&self) -> usize {
        self.max_ndim
    }

    /// An empty sequence at `depth` ends every branch at `depth + 1`.
    pub(crate) fn close_at(&mut self, ndim: usize) {
        self.max_ndim = ndim;
    }

    /// Record a node at `depth` contributing `new_shape`.
    ///
    /// Leaves and array-likes (`sequence == false`) pin the rank to
    /// `depth + new_shape.len()`. A sequence contributes only its length and
    /// leaves the rank to its children. Returns `false` when the node
    /// disagrees with what was recorded before.
    pub(crate) fn update(&mut self, depth: usize, new_shape: &[usize], sequence: bool) -> bool {
        let mut consistent = true;
        let mut new_ndim = new_shape.len();

        if depth + new_ndim > self.max_ndim {
            consistent = false;
            new_ndim = self.max_ndim.saturating_sub(depth);
        } else if !sequence && self.max_ndim != depth + new_ndim {
            self.max_ndim = depth + new_ndim;
            // A deeper dimension was already fixed by an earlier sibling.
            if self.dims.get(self.max_ndim).copied().flatten().is_some() {
                consistent = false;
            }
        }

        for (i, &new_dim) in new_shape.iter().take(new_ndim).enumerate() {
            let slot = &mut self.dims[depth + i];
            match *slot {
                None => *slot = Some(new_dim),
                Some(dim) if dim != new_dim => {
                    consistent = false;
                    self.max_ndim = depth + i;
                    break;
                }
                Some(_) => {}
            }
        }
        consistent
    }

    /// Shape of the first `ndim` dimensions.
    pub(crate) fn shape(&self, ndim: usize) -> Shape {
        self.dims
            .iter()
            .take(ndim)
            .map(|dim| dim.unwrap_or(0))
            .collect::<Vec<_>>()
            .into()
    }
}

#[cfg(test)]
mod tests;
