use crate::class::{hierarchy_common_class, CommonClass, DTypeClass, SetItemError};
use crate::element::{self, Element, NumericKind, NumericLayout};
use crate::{Cell, CellMut, ClassFlags, ClassId, Descriptor, Registry, TypedScalar, Value};

/// `bool` and the fixed-width integer and float classes.
#[derive(Debug)]
pub struct NumericClass {
    id: ClassId,
    layout: NumericLayout,
}

impl NumericClass {
    /// `None` unless `id` is a built-in numeric class.
    pub fn new(id: ClassId) -> Option<Self> {
        NumericLayout::of(id).map(|layout| NumericClass { id, layout })
    }

    fn fits(&self, value: i64) -> bool {
        let bits = self.layout.size * 8;
        match self.layout.kind {
            NumericKind::Signed if bits < 64 => {
                let bound = 1i64 << (bits - 1);
                (-bound..bound).contains(&value)
            }
            NumericKind::Unsigned if bits < 64 => (0..1i64 << bits).contains(&value),
            NumericKind::Unsigned => value >= 0,
            _ => true,
        }
    }

    /// Whether `value`, truncated toward zero, is in range for an integer
    /// layout. Non-integer layouts accept every float.
    fn fits_float(&self, value: f64) -> bool {
        let bits = (self.layout.size * 8) as i32;
        match self.layout.kind {
            NumericKind::Signed => {
                let bound = 2f64.powi(bits - 1);
                value.is_finite() && (-bound..bound).contains(&value.trunc())
            }
            NumericKind::Unsigned => value.is_finite() && (0.0..2f64.powi(bits)).contains(&value.trunc()),
            _ => true,
        }
    }

    fn element_for(&self, descr: &Descriptor, value: &Value) -> Result<Element, SetItemError> {
        let element = match value {
            Value::Bool(b) => Element::Bool(*b),
            Value::Int(v) => Element::Int(*v),
            Value::Float(v) => Element::Float(*v),
            Value::None if self.layout.kind == NumericKind::Float => Element::Float(f64::NAN),
            Value::Typed(scalar) if NumericLayout::of(scalar.descr().class()).is_some() => {
                scalar.element().ok_or(SetItemError::Unsupported)?
            }
            _ => return Err(SetItemError::Unsupported),
        };
        match element {
            Element::Int(v) if !self.fits(v) => Err(SetItemError::Invalid(format!(
                "integer {v} out of bounds for {descr}"
            ))),
            Element::Float(v) if v.is_nan() && !self.fits_float(v) => Err(SetItemError::Invalid(format!(
                "cannot convert float NaN to {descr}"
            ))),
            Element::Float(v) if !self.fits_float(v) => Err(SetItemError::Invalid(format!(
                "float {v} out of bounds for {descr}"
            ))),
            element => Ok(element),
        }
    }
}

impl DTypeClass for NumericClass {
    fn name(&self) -> &str {
        self.id.name().unwrap_or("number")
    }

    fn flags(&self) -> ClassFlags {
        ClassFlags::NUMERIC
    }

    fn common_class(&self, this: ClassId, other: ClassId, registry: &Registry) -> CommonClass {
        match NumericLayout::of(other).and_then(|other| self.layout.promote(other).class()) {
            Some(class) => CommonClass::Resolved(class),
            None => hierarchy_common_class(this, other, registry),
        }
    }

    fn item_size(&self, _descr: &Descriptor) -> usize {
        self.layout.size
    }

    fn setitem(&self, descr: &Descriptor, value: &Value, cell: CellMut<'_>) -> Result<(), SetItemError> {
        let element = self.element_for(descr, value)?;
        let raw = cell
            .raw()
            .ok_or_else(|| SetItemError::Invalid(format!("`{descr}` stores raw elements")))?;
        element::encode(descr, &element, raw).map_err(|err| SetItemError::Invalid(err.to_string()))
    }

    fn getitem(&self, descr: &Descriptor, cell: Cell<'_>) -> Value {
        let Some(raw) = cell.raw() else {
            return Value::None;
        };
        match element::decode(descr, raw) {
            Some(Element::Bool(b)) => Value::Bool(b),
            Some(Element::Int(v)) => Value::Int(v),
            Some(Element::UInt(v)) => match i64::try_from(v) {
                Ok(v) => Value::Int(v),
                Err(_) => Value::Typed(TypedScalar::new(descr.native(), &v.to_ne_bytes())),
            },
            Some(Element::Float(v)) => Value::Float(v),
            _ => Value::None,
        }
    }
}
