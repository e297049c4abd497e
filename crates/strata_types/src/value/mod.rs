//! Input values handed to array construction.
//!
//! [`Value`] is the dynamic object model the coercion engine walks: language
//! scalars and containers, array-likes, typed scalars that carry their own
//! descriptor, and plugin scalars. Each value reports a [`ScalarType`], the
//! key the [`Registry`](crate::Registry) maps to element-type classes.

use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::element::{self, format_float, Element};
use crate::error::CastError;
use crate::{ClassId, Descriptor, NdArray};

/// Identity of a value's scalar type.
///
/// Language types have fixed small ids. Typed scalars of a class and plugin
/// scalars belong to the generic scalar family, the only family plugins may
/// map to their classes.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScalarType(u32);

impl ScalarType {
    // === Language Types ===

    pub const NONE: Self = Self(0);
    pub const BOOL: Self = Self(1);
    pub const INT: Self = Self(2);
    pub const FLOAT: Self = Self(3);
    pub const STR: Self = Self(4);
    pub const BYTES: Self = Self(5);
    pub const LIST: Self = Self(6);
    pub const TUPLE: Self = Self(7);
    pub const MAP: Self = Self(8);
    pub const ARRAY: Self = Self(9);

    // === Generic Family ===

    const GENERIC_BASE: u32 = 1 << 16;
    const USER_BASE: u32 = 1 << 24;

    /// Scalar type of typed scalars whose descriptor belongs to `class`.
    pub const fn of_class(class: ClassId) -> Self {
        Self(Self::GENERIC_BASE + class.raw())
    }

    /// A plugin-allocated scalar type.
    pub const fn user(index: u32) -> Self {
        Self(Self::USER_BASE + index)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Whether this type derives from the generic scalar family.
    #[inline]
    pub const fn is_generic_family(self) -> bool {
        self.0 >= Self::GENERIC_BASE
    }

    pub const fn name(self) -> Option<&'static str> {
        match self.0 {
            0 => Some("NoneType"),
            1 => Some("bool"),
            2 => Some("int"),
            3 => Some("float"),
            4 => Some("str"),
            5 => Some("bytes"),
            6 => Some("list"),
            7 => Some("tuple"),
            8 => Some("dict"),
            9 => Some("ndarray"),
            _ => None,
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = self.name() {
            return write!(f, "{name}");
        }
        if self.0 >= Self::USER_BASE {
            write!(f, "user#{}", self.0 - Self::USER_BASE)
        } else if self.0 >= Self::GENERIC_BASE {
            write!(f, "{}-scalar", ClassId::from_raw(self.0 - Self::GENERIC_BASE))
        } else {
            write!(f, "scalar#{}", self.0)
        }
    }
}

/// A scalar carrying its own descriptor, like `float32(1.5)`.
///
/// `raw` holds exactly one element in the descriptor's encoding.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypedScalar {
    descr: Descriptor,
    raw: SmallVec<[u8; 16]>,
}

impl TypedScalar {
    pub fn new(descr: Descriptor, raw: &[u8]) -> Self {
        TypedScalar {
            descr,
            raw: SmallVec::from_slice(raw),
        }
    }

    /// Typed scalar of a built-in instance holding `element`.
    pub fn from_element(descr: Descriptor, element: &Element) -> Result<Self, CastError> {
        let size = element::builtin_item_size(&descr).ok_or_else(|| CastError::InvalidValue {
            reason: format!("`{descr}` has no built-in encoding"),
        })?;
        let mut raw: SmallVec<[u8; 16]> = SmallVec::from_elem(0, size);
        element::encode(&descr, element, &mut raw)?;
        Ok(TypedScalar { descr, raw })
    }

    #[inline]
    pub fn descr(&self) -> &Descriptor {
        &self.descr
    }

    #[inline]
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// Decoded element, for built-in classes.
    pub fn element(&self) -> Option<Element> {
        element::decode(&self.descr, &self.raw)
    }
}

/// A plugin scalar: an opaque payload tagged with its scalar type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct UserScalar {
    pub scalar_type: ScalarType,
    pub words: SmallVec<[i64; 2]>,
}

impl UserScalar {
    pub fn new(scalar_type: ScalarType, words: &[i64]) -> Self {
        UserScalar {
            scalar_type,
            words: SmallVec::from_slice(words),
        }
    }
}

/// A node of nested input.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    List(Vec<Value>),
    Tuple(Vec<Value>),
    /// Mappings are never sequences; they coerce as single objects.
    Map(Vec<(Value, Value)>),
    Array(Arc<NdArray>),
    Typed(TypedScalar),
    User(UserScalar),
}

impl Value {
    pub fn str(text: impl Into<String>) -> Self {
        Value::Str(text.into())
    }

    pub fn list(items: impl IntoIterator<Item = Value>) -> Self {
        Value::List(items.into_iter().collect())
    }

    pub fn tuple(items: impl IntoIterator<Item = Value>) -> Self {
        Value::Tuple(items.into_iter().collect())
    }

    pub fn array(array: NdArray) -> Self {
        Value::Array(Arc::new(array))
    }

    pub fn scalar_type(&self) -> ScalarType {
        match self {
            Value::None => ScalarType::NONE,
            Value::Bool(_) => ScalarType::BOOL,
            Value::Int(_) => ScalarType::INT,
            Value::Float(_) => ScalarType::FLOAT,
            Value::Str(_) => ScalarType::STR,
            Value::Bytes(_) => ScalarType::BYTES,
            Value::List(_) => ScalarType::LIST,
            Value::Tuple(_) => ScalarType::TUPLE,
            Value::Map(_) => ScalarType::MAP,
            Value::Array(_) => ScalarType::ARRAY,
            Value::Typed(scalar) => ScalarType::of_class(scalar.descr().class()),
            Value::User(scalar) => scalar.scalar_type,
        }
    }

    /// Elements of a list or tuple.
    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) | Value::Tuple(items) => Some(items),
            _ => None,
        }
    }

    /// Number of characters (or bytes) of a string-like value.
    pub fn text_len(&self) -> Option<usize> {
        match self {
            Value::Str(s) => Some(s.chars().count()),
            Value::Bytes(b) => Some(b.len()),
            _ => None,
        }
    }

    /// `repr` truncated to 50 characters, for error messages.
    pub fn short_repr(&self) -> String {
        const LIMIT: usize = 50;
        let full = self.to_string();
        if full.chars().count() <= LIMIT {
            return full;
        }
        let mut cut: String = full.chars().take(LIMIT).collect();
        cut.push_str("...");
        cut
    }
}

fn write_items(f: &mut fmt::Formatter<'_>, items: &[Value]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => write!(f, "None"),
            Value::Bool(true) => write!(f, "True"),
            Value::Bool(false) => write!(f, "False"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{}", format_float(*v)),
            Value::Str(s) => write!(f, "'{s}'"),
            Value::Bytes(b) => write!(f, "b'{}'", b.escape_ascii()),
            Value::List(items) => {
                write!(f, "[")?;
                write_items(f, items)?;
                write!(f, "]")
            }
            Value::Tuple(items) => {
                write!(f, "(")?;
                write_items(f, items)?;
                if items.len() == 1 {
                    write!(f, ",")?;
                }
                write!(f, ")")
            }
            Value::Map(entries) => {
                write!(f, "{{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                write!(f, "}}")
            }
            Value::Array(array) => write!(f, "array(shape={}, dtype={})", array.shape(), array.descr()),
            Value::Typed(scalar) => match scalar.element() {
                Some(element) => write!(
                    f,
                    "{}({})",
                    scalar.descr(),
                    element.render(scalar.descr().unit())
                ),
                None => write!(f, "{}(...)", scalar.descr()),
            },
            Value::User(scalar) => write!(f, "<{} {:?}>", scalar.scalar_type, scalar.words.as_slice()),
        }
    }
}
