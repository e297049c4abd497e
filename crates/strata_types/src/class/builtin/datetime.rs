use crate::cast::{builtin::datetime_cast, CastSpec};
use crate::class::{DTypeClass, Discovered, SetItemError};
use crate::datetime::{self, TimeUnit, NAT};
use crate::element::{self, Element};
use crate::{Cell, CellMut, ClassFlags, ClassId, Descriptor, TypedScalar, Value};

/// `datetime64[unit]`: a signed count of `unit` since the epoch.
#[derive(Debug)]
pub struct DatetimeClass;

fn unit_of(descr: &Descriptor) -> TimeUnit {
    descr.unit().unwrap_or(TimeUnit::Generic)
}

impl DatetimeClass {
    fn count_for(descr: &Descriptor, value: &Value) -> Result<i64, SetItemError> {
        let unit = unit_of(descr);
        let converted = |count, from| {
            datetime::convert(count, from, unit)
                .ok_or_else(|| SetItemError::Invalid(format!("{value} overflows `{descr}`")))
        };
        match value {
            Value::None => Ok(NAT),
            Value::Int(count) => Ok(*count),
            Value::Str(text) => {
                let (count, parsed) = datetime::parse_iso(text.trim()).ok_or_else(|| {
                    SetItemError::Invalid(format!("error parsing datetime string \"{text}\""))
                })?;
                converted(count, parsed)
            }
            Value::Typed(scalar) if scalar.descr().class() == ClassId::DATETIME => {
                match scalar.element() {
                    Some(Element::Datetime(count)) => converted(count, unit_of(scalar.descr())),
                    _ => Err(SetItemError::Unsupported),
                }
            }
            _ => Err(SetItemError::Unsupported),
        }
    }
}

impl DTypeClass for DatetimeClass {
    fn name(&self) -> &str {
        "datetime64"
    }

    fn flags(&self) -> ClassFlags {
        ClassFlags::PARAMETRIC | ClassFlags::TEMPORAL
    }

    fn common_instance(&self, left: &Descriptor, right: &Descriptor) -> Option<Descriptor> {
        Some(Descriptor::datetime(unit_of(left).finer(unit_of(right))))
    }

    fn discover_instance(&self, _this: ClassId, value: &Value) -> Discovered {
        match value {
            Value::Str(text) => match datetime::parse_iso(text.trim()) {
                Some((_, unit)) => Discovered::Instance(Descriptor::datetime(unit)),
                None => Discovered::NotImplemented,
            },
            Value::Typed(scalar) if scalar.descr().class() == ClassId::DATETIME => {
                Discovered::Instance(scalar.descr().native())
            }
            Value::None | Value::Int(_) => Discovered::Instance(Descriptor::datetime(TimeUnit::Generic)),
            _ => Discovered::NotImplemented,
        }
    }

    fn is_known_scalar(&self, value: &Value) -> bool {
        matches!(value, Value::Str(text) if datetime::looks_like_iso(text))
    }

    fn item_size(&self, _descr: &Descriptor) -> usize {
        8
    }

    fn setitem(&self, descr: &Descriptor, value: &Value, cell: CellMut<'_>) -> Result<(), SetItemError> {
        let count = Self::count_for(descr, value)?;
        let raw = cell
            .raw()
            .ok_or_else(|| SetItemError::Invalid(format!("`{descr}` stores raw elements")))?;
        element::encode(descr, &Element::Datetime(count), raw)
            .map_err(|err| SetItemError::Invalid(err.to_string()))
    }

    fn getitem(&self, descr: &Descriptor, cell: Cell<'_>) -> Value {
        match cell.raw().and_then(|raw| element::decode(descr, raw)) {
            Some(element) => TypedScalar::from_element(descr.native(), &element)
                .map_or(Value::None, Value::Typed),
            None => Value::None,
        }
    }

    fn same_class_cast(&self, _this: ClassId) -> Option<CastSpec> {
        Some(datetime_cast())
    }
}
