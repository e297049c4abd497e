//! Array shapes and NumPy-style broadcasting.

use std::fmt;

use smallvec::SmallVec;
use thiserror::Error;

/// Maximum rank of any array built by strata.
///
/// Discovery never recurses deeper than this, which also bounds the
/// recursion depth of every pass that walks nested input.
pub const MAX_DIMS: usize = 32;

/// Ordered, non-negative dimension sizes of a C-contiguous array.
///
/// The empty shape is the 0-d (scalar) shape and holds exactly one element.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Shape {
    dims: SmallVec<[usize; 4]>,
}

/// Error returned when a shape cannot be broadcast to another.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum BroadcastError {
    #[error("cannot broadcast shape {from} to shape {to}: target rank is smaller")]
    RankTooLarge { from: Shape, to: Shape },

    #[error("cannot broadcast shape {from} to shape {to}: dimension {axis} mismatches")]
    Incompatible { from: Shape, to: Shape, axis: usize },
}

impl Shape {
    /// The 0-d shape.
    pub fn scalar() -> Self {
        Shape {
            dims: SmallVec::new(),
        }
    }

    pub fn new(dims: &[usize]) -> Self {
        Shape {
            dims: SmallVec::from_slice(dims),
        }
    }

    #[inline]
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    #[inline]
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Total number of elements (1 for the 0-d shape).
    pub fn element_count(&self) -> usize {
        self.dims.iter().product()
    }

    /// Shape with the leading axis removed. The 0-d shape stays 0-d.
    pub fn inner(&self) -> Shape {
        Shape {
            dims: self.dims.iter().skip(1).copied().collect(),
        }
    }

    /// Row-major strides counted in elements.
    pub fn element_strides(&self) -> SmallVec<[usize; 4]> {
        let mut strides: SmallVec<[usize; 4]> = SmallVec::from_elem(1, self.dims.len());
        let mut acc = 1usize;
        for (stride, dim) in strides.iter_mut().zip(self.dims.iter()).rev() {
            *stride = acc;
            acc *= *dim;
        }
        strides
    }

    /// Broadcasts this shape to `target`.
    ///
    /// Not symmetric: `x.broadcast_to(y)` succeeds only when every axis of
    /// `x`, right-aligned against `y`, is either 1 or equal to `y`'s axis.
    pub fn broadcast_to(&self, target: &Shape) -> Result<Shape, BroadcastError> {
        if self.rank() > target.rank() {
            return Err(BroadcastError::RankTooLarge {
                from: self.clone(),
                to: target.clone(),
            });
        }
        let offset = target.rank() - self.rank();
        for (i, &dim) in self.dims.iter().enumerate() {
            let wanted = target.dims[offset + i];
            if dim != 1 && dim != wanted {
                return Err(BroadcastError::Incompatible {
                    from: self.clone(),
                    to: target.clone(),
                    axis: offset + i,
                });
            }
        }
        Ok(target.clone())
    }
}

impl From<Vec<usize>> for Shape {
    fn from(dims: Vec<usize>) -> Self {
        Shape {
            dims: SmallVec::from_vec(dims),
        }
    }
}

impl From<&[usize]> for Shape {
    fn from(dims: &[usize]) -> Self {
        Shape::new(dims)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, dim) in self.dims.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{dim}")?;
        }
        if self.dims.len() == 1 {
            write!(f, ",")?;
        }
        write!(f, ")")
    }
}

/// Maps flat destination indices to flat source indices under broadcasting.
///
/// Built once per broadcast copy; broadcast axes get a zero source stride.
#[derive(Clone, Debug)]
pub struct BroadcastIndexer {
    target_dims: SmallVec<[usize; 4]>,
    source_strides: SmallVec<[usize; 4]>,
}

impl BroadcastIndexer {
    pub fn new(source: &Shape, target: &Shape) -> Result<Self, BroadcastError> {
        source.broadcast_to(target)?;
        let offset = target.rank() - source.rank();
        let strides = source.element_strides();
        let mut source_strides: SmallVec<[usize; 4]> = SmallVec::from_elem(0, target.rank());
        for (i, &dim) in source.dims().iter().enumerate() {
            if dim != 1 {
                source_strides[offset + i] = strides[i];
            }
        }
        Ok(BroadcastIndexer {
            target_dims: SmallVec::from_slice(target.dims()),
            source_strides,
        })
    }

    /// Source element index feeding destination element `flat`.
    pub fn source_index(&self, mut flat: usize) -> usize {
        let mut index = 0;
        for (dim, stride) in self
            .target_dims
            .iter()
            .zip(self.source_strides.iter())
            .rev()
        {
            if *dim == 0 {
                return 0;
            }
            index += (flat % dim) * stride;
            flat /= dim;
        }
        index
    }
}
