use crate::class::{CommonClass, DTypeClass, SetItemError};
use crate::{Cell, CellMut, ClassFlags, ClassId, Descriptor, Registry, Value};

/// Arbitrary values, stored as-is.
#[derive(Debug)]
pub struct ObjectClass;

impl DTypeClass for ObjectClass {
    fn name(&self) -> &str {
        "object"
    }

    fn flags(&self) -> ClassFlags {
        ClassFlags::HOLDS_OBJECTS
    }

    fn common_class(&self, this: ClassId, _other: ClassId, _registry: &Registry) -> CommonClass {
        CommonClass::Resolved(this)
    }

    fn item_size(&self, _descr: &Descriptor) -> usize {
        std::mem::size_of::<usize>()
    }

    fn setitem(&self, descr: &Descriptor, value: &Value, cell: CellMut<'_>) -> Result<(), SetItemError> {
        let slot = cell
            .object()
            .ok_or_else(|| SetItemError::Invalid(format!("`{descr}` stores objects")))?;
        *slot = value.clone();
        Ok(())
    }

    fn getitem(&self, _descr: &Descriptor, cell: Cell<'_>) -> Value {
        cell.object().cloned().unwrap_or(Value::None)
    }
}
