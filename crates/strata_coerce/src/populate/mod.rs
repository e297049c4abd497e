//! Population: replay a discovery's cache into the destination buffer.
//!
//! The input and the cache are walked in lock-step. Sequences are checked
//! against the destination's dimensions, array-likes are copied (cast and
//! broadcast when needed), and leaves are packed through the destination
//! class's setter. Any error leaves the buffer partially written; callers
//! discard it.

use strata_ir::{BroadcastIndexer, NodePath, Shape};
use strata_types::cast::{self, Target};
use strata_types::{ArrayViewMut, CastError, Cell, CellMut, NdArray, Registry, Value};

use crate::cache::{CacheEntry, Converted, Cursor};
use crate::{CoerceError, Discovery};

pub(crate) fn populate(registry: &Registry, array: &mut NdArray, discovery: Discovery<'_>) -> Result<(), CoerceError> {
    let Discovery { root, cache, .. } = discovery;
    if cache.descr() != Some(array.descr()) || cache.shape() != array.shape() {
        let expected = match cache.descr() {
            Some(descr) => format!("`{descr}` with shape {}", cache.shape()),
            None => format!("an unsealed discovery of shape {}", cache.shape()),
        };
        return Err(CoerceError::CacheMismatch {
            generation: cache.generation(),
            expected,
            found: format!("`{}` with shape {}", array.descr(), array.shape()),
        });
    }

    let mut filler = Filler {
        registry,
        cursor: Cursor::new(&cache),
        path: NodePath::root(),
        holds_objects: array.holds_objects(),
    };
    filler.assign(root, array.view_mut(), 0)?;
    if !filler.cursor.is_finished() {
        return Err(CoerceError::inconsistent(
            &NodePath::root(),
            "content of sequences changed (cache not consumed)",
        ));
    }
    tracing::debug!(
        generation = cache.generation(),
        descr = %array.descr(),
        shape = %array.shape(),
        "populated"
    );
    Ok(())
}

struct Filler<'r, 'c, 'a> {
    registry: &'r Registry,
    cursor: Cursor<'c, 'a>,
    path: NodePath,
    /// Destination stores values rather than raw elements.
    holds_objects: bool,
}

impl Filler<'_, '_, '_> {
    fn assign(&mut self, value: &Value, mut view: ArrayViewMut<'_>, depth: usize) -> Result<(), CoerceError> {
        let Some(entry) = self.cursor.take(value, depth) else {
            if view.ndim() > 0 {
                return Err(CoerceError::inconsistent(
                    &self.path,
                    "found an element where a dimension was discovered",
                ));
            }
            return self.pack(value, &mut view);
        };

        if view.ndim() == 0 {
            return self.assign_element(value, entry, &mut view, depth);
        }

        let items = match &entry.converted {
            Converted::Array(array) => return self.copy_array(array, &mut view),
            converted => converted.items().unwrap_or_default(),
        };
        let len = view.dims().first().copied().unwrap_or(0);
        if items.len() != len {
            return Err(CoerceError::inconsistent(
                &self.path,
                format!("sequence length changed from {len} to {}", items.len()),
            ));
        }
        for (i, item) in items.iter().enumerate() {
            self.path.push(i);
            let result = match view.subview(i) {
                Some(sub) => self.assign(item, sub, depth + 1),
                None => Err(CoerceError::inconsistent(&self.path, "destination block is missing")),
            };
            self.path.pop();
            result?;
        }
        Ok(())
    }

    /// A cached node reaching the element depth.
    ///
    /// Object destinations keep the node itself and skip what discovery
    /// recorded below it, except a 0-d array at the root, which stands in
    /// for its element. Other classes only accept array-likes that hold a
    /// single element.
    fn assign_element(
        &mut self,
        value: &Value,
        entry: &CacheEntry<'_>,
        view: &mut ArrayViewMut<'_>,
        depth: usize,
    ) -> Result<(), CoerceError> {
        if self.holds_objects {
            self.cursor.skip_descendants(depth);
            return match entry.converted {
                Converted::Array(array) if depth == 0 && array.ndim() == 0 => {
                    let item = self.unwrap_scalar(array)?;
                    self.pack(&item, view)
                }
                _ => self.pack(value, view),
            };
        }
        match entry.converted {
            Converted::Array(_) => self.pack(value, view),
            Converted::Sequence(_) | Converted::Chars(_) => Err(CoerceError::SequenceAsElement {
                path: self.path.clone(),
            }),
        }
    }

    fn unwrap_scalar(&self, array: &NdArray) -> Result<Value, CoerceError> {
        let cell = array
            .cell(0)
            .ok_or_else(|| CoerceError::inconsistent(&self.path, "0-d array has no element"))?;
        Ok(self.registry.class(array.descr().class())?.getitem(array.descr(), cell))
    }

    fn pack(&self, value: &Value, view: &mut ArrayViewMut<'_>) -> Result<(), CoerceError> {
        let descr = *view.descr();
        let cell = view
            .cell_mut(0)
            .ok_or_else(|| CoerceError::inconsistent(&self.path, "destination element is missing"))?;
        strata_types::pack(self.registry, &descr, value, cell).map_err(|err| match err {
            _ if !self.holds_objects && value.as_sequence().is_some() => {
                CoerceError::SequenceAsElement { path: self.path.clone() }
            }
            CastError::InvalidValue { reason } => CoerceError::UnrepresentableValue {
                value: value.short_repr(),
                class: self.registry.class_name(descr.class()),
                path: self.path.clone(),
                reason,
            },
            err => CoerceError::cast(&self.path, err),
        })
    }

    /// Copy an array-like into the block, casting with `unsafe` casting
    /// allowed and broadcasting its shape to the block's.
    fn copy_array(&self, array: &NdArray, view: &mut ArrayViewMut<'_>) -> Result<(), CoerceError> {
        let target = Shape::new(view.dims());
        let indexer = BroadcastIndexer::new(array.shape(), &target).map_err(|error| CoerceError::Broadcast {
            path: self.path.clone(),
            error,
        })?;
        let plan = if array.descr() == view.descr() {
            None
        } else {
            let plan = cast::resolve(self.registry, array.descr(), Target::Instance(*view.descr()))
                .map_err(|err| CoerceError::cast(&self.path, err))?;
            Some(plan)
        };
        tracing::trace!(from = %array.descr(), to = %view.descr(), path = %self.path, "copying array-like");

        for index in 0..view.len() {
            let src = array
                .cell(indexer.source_index(index))
                .ok_or_else(|| CoerceError::inconsistent(&self.path, "array-like element is missing"))?;
            let dst = view
                .cell_mut(index)
                .ok_or_else(|| CoerceError::inconsistent(&self.path, "destination element is missing"))?;
            let copied = match &plan {
                Some(plan) => plan.transfer(self.registry, src, dst),
                None => copy_cell(src, dst),
            };
            copied.map_err(|err| CoerceError::cast(&self.path, err))?;
        }
        Ok(())
    }
}

/// Copy between two slots of the same instance.
fn copy_cell(src: Cell<'_>, dst: CellMut<'_>) -> Result<(), CastError> {
    match (src, dst) {
        (Cell::Raw(from), CellMut::Raw(to)) if from.len() == to.len() => {
            to.copy_from_slice(from);
            Ok(())
        }
        (Cell::Object(from), CellMut::Object(to)) => {
            *to = from.clone();
            Ok(())
        }
        _ => Err(CastError::InvalidValue {
            reason: "source and destination storage differ".to_owned(),
        }),
    }
}

#[cfg(test)]
mod tests;
