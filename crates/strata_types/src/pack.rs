//! Storing one value into an element slot.

use crate::cast::{self, Target};
use crate::class::{Discovered, SetItemError};
use crate::error::CastError;
use crate::{CellMut, Descriptor, ElementBuffer, Registry, Value};

fn cannot_store(value: &Value, descr: &Descriptor) -> CastError {
    CastError::InvalidValue {
        reason: format!("cannot store {} as `{descr}`", value.short_repr()),
    }
}

/// Store `value` into `cell`, an element of instance `descr`.
///
/// The class setter runs first. If it does not understand the value, the
/// value's own instance is discovered, the value is stored into a one-element
/// buffer of that instance, and the buffer is cast into `cell`. A 1-element
/// array stands in for its only element.
pub fn pack(registry: &Registry, descr: &Descriptor, value: &Value, mut cell: CellMut<'_>) -> Result<(), CastError> {
    let class = registry.class(descr.class())?;
    match class.setitem(descr, value, cell.reborrow()) {
        Ok(()) => return Ok(()),
        Err(SetItemError::Invalid(reason)) => return Err(CastError::InvalidValue { reason }),
        Err(SetItemError::Unsupported) => {}
    }

    if let Value::Array(array) = value {
        let single = array.cell(0).filter(|_| array.len() == 1);
        let Some(single) = single else {
            return Err(cannot_store(value, descr));
        };
        let plan = cast::resolve(registry, array.descr(), Target::Instance(*descr))?;
        return plan.transfer(registry, single, cell);
    }

    let own_class = registry
        .scalar_class(value)
        .filter(|own| *own != descr.class())
        .ok_or_else(|| cannot_store(value, descr))?;
    let own = registry.class(own_class)?;
    let Discovered::Instance(own_descr) = own.discover_instance(own_class, value) else {
        return Err(cannot_store(value, descr));
    };
    let mut staged = ElementBuffer::new(registry.layout(&own_descr)?);
    own.setitem(&own_descr, value, staged.cell_mut())
        .map_err(|_| cannot_store(value, descr))?;
    let plan = cast::resolve(registry, &own_descr, Target::Instance(*descr))?;
    tracing::trace!(value = %value.short_repr(), from = %own_descr, to = %descr, "packed through a cast");
    plan.transfer(registry, staged.cell(), cell)
}
