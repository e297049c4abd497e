use crate::cast::{builtin::text_cast, CastSpec};
use crate::class::{hierarchy_common_class, CommonClass, DTypeClass, Discovered, SetItemError};
use crate::element::{self, Element, NumericLayout};
use crate::{Cell, CellMut, ClassFlags, ClassId, Descriptor, Param, Registry, Value};

/// Fixed-length `bytes` (`S<n>`) and `str` (`U<n>`).
#[derive(Debug)]
pub struct CharacterClass {
    id: ClassId,
}

impl CharacterClass {
    pub const fn bytes() -> Self {
        CharacterClass { id: ClassId::BYTES }
    }

    pub const fn unicode() -> Self {
        CharacterClass { id: ClassId::STR }
    }

    fn is_unicode(&self) -> bool {
        self.id == ClassId::STR
    }

    fn element_for(&self, value: &Value) -> Result<Element, SetItemError> {
        match (value, self.is_unicode()) {
            (Value::Str(text), true) => Ok(Element::Text(text.clone())),
            (Value::Bytes(bytes), false) => Ok(Element::Bytes(bytes.clone())),
            (Value::Str(text), false) if text.is_ascii() => Ok(Element::Bytes(text.as_bytes().to_vec())),
            (Value::Str(text), false) => Err(SetItemError::Invalid(format!(
                "'{text}' is not ASCII and cannot be stored as bytes"
            ))),
            _ => Err(SetItemError::Unsupported),
        }
    }
}

impl DTypeClass for CharacterClass {
    fn name(&self) -> &str {
        if self.is_unicode() {
            "str"
        } else {
            "bytes"
        }
    }

    fn flags(&self) -> ClassFlags {
        ClassFlags::PARAMETRIC | ClassFlags::CHARACTER
    }

    fn common_class(&self, this: ClassId, other: ClassId, registry: &Registry) -> CommonClass {
        if NumericLayout::of(other).is_some() || (self.is_unicode() && other == ClassId::BYTES) {
            CommonClass::Resolved(this)
        } else {
            hierarchy_common_class(this, other, registry)
        }
    }

    fn common_instance(&self, left: &Descriptor, right: &Descriptor) -> Option<Descriptor> {
        let len = left.len()?.max(right.len()?);
        Some(Descriptor::with_param(self.id, Param::Len(len as u32)))
    }

    fn discover_instance(&self, this: ClassId, value: &Value) -> Discovered {
        let len = match value {
            Value::Str(text) => text.chars().count(),
            Value::Bytes(bytes) if !self.is_unicode() => bytes.len(),
            Value::Typed(scalar) if scalar.descr().class() == this => {
                return Discovered::Instance(*scalar.descr());
            }
            _ => return Discovered::NotImplemented,
        };
        Discovered::Instance(Descriptor::with_param(this, Param::Len(len as u32)))
    }

    fn item_size(&self, descr: &Descriptor) -> usize {
        let len = descr.len().unwrap_or(0);
        if self.is_unicode() {
            len * 4
        } else {
            len
        }
    }

    fn setitem(&self, descr: &Descriptor, value: &Value, cell: CellMut<'_>) -> Result<(), SetItemError> {
        let element = self.element_for(value)?;
        let raw = cell
            .raw()
            .ok_or_else(|| SetItemError::Invalid(format!("`{descr}` stores raw elements")))?;
        element::encode(descr, &element, raw).map_err(|err| SetItemError::Invalid(err.to_string()))
    }

    fn getitem(&self, descr: &Descriptor, cell: Cell<'_>) -> Value {
        match cell.raw().and_then(|raw| element::decode(descr, raw)) {
            Some(Element::Text(text)) => Value::Str(text),
            Some(Element::Bytes(bytes)) => Value::Bytes(bytes),
            _ => Value::None,
        }
    }

    fn same_class_cast(&self, this: ClassId) -> Option<CastSpec> {
        Some(text_cast(this))
    }
}
