//! Element codec for built-in classes.
//!
//! Decodes one stored element of a built-in instance into an [`Element`]
//! and encodes it back, honoring byte order. Casting between built-in
//! classes is "decode, convert the [`Element`], encode".

use half::f16;

use crate::datetime::{self, TimeUnit};
use crate::error::CastError;
use crate::{ByteOrder, ClassId, Descriptor};

/// Kind of a built-in numeric class, ordered by the same-kind lattice
/// (`bool < unsigned < signed < float`).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub enum NumericKind {
    Bool,
    Unsigned,
    Signed,
    Float,
}

/// Kind and byte width of a built-in numeric class.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct NumericLayout {
    pub kind: NumericKind,
    pub size: usize,
}

impl NumericLayout {
    /// Layout of a built-in numeric class, `None` for every other class.
    pub const fn of(class: ClassId) -> Option<NumericLayout> {
        let (kind, size) = match class.raw() {
            0 => (NumericKind::Bool, 1),
            1 => (NumericKind::Signed, 1),
            2 => (NumericKind::Signed, 2),
            3 => (NumericKind::Signed, 4),
            4 => (NumericKind::Signed, 8),
            5 => (NumericKind::Unsigned, 1),
            6 => (NumericKind::Unsigned, 2),
            7 => (NumericKind::Unsigned, 4),
            8 => (NumericKind::Unsigned, 8),
            9 => (NumericKind::Float, 2),
            10 => (NumericKind::Float, 4),
            11 => (NumericKind::Float, 8),
            _ => return None,
        };
        Some(NumericLayout { kind, size })
    }

    /// The built-in class with this layout.
    pub const fn class(self) -> Option<ClassId> {
        let class = match (self.kind, self.size) {
            (NumericKind::Bool, 1) => ClassId::BOOL,
            (NumericKind::Signed, 1) => ClassId::INT8,
            (NumericKind::Signed, 2) => ClassId::INT16,
            (NumericKind::Signed, 4) => ClassId::INT32,
            (NumericKind::Signed, 8) => ClassId::INT64,
            (NumericKind::Unsigned, 1) => ClassId::UINT8,
            (NumericKind::Unsigned, 2) => ClassId::UINT16,
            (NumericKind::Unsigned, 4) => ClassId::UINT32,
            (NumericKind::Unsigned, 8) => ClassId::UINT64,
            (NumericKind::Float, 2) => ClassId::FLOAT16,
            (NumericKind::Float, 4) => ClassId::FLOAT32,
            (NumericKind::Float, 8) => ClassId::FLOAT64,
            _ => return None,
        };
        Some(class)
    }

    /// Smallest layout that holds every value of both operands.
    ///
    /// `bool` loses to everything. Mixed signedness widens to a signed type
    /// twice the unsigned width, falling back to `float64` past 8 bytes.
    /// Integers meeting floats need a float wide enough for their magnitude:
    /// `float16` for 1-byte integers, `float32` for 2-byte, `float64` beyond.
    pub fn promote(self, other: NumericLayout) -> NumericLayout {
        use NumericKind::{Bool, Float, Signed, Unsigned};
        const FLOAT64: NumericLayout = NumericLayout { kind: Float, size: 8 };
        match (self.kind, other.kind) {
            (Bool, _) => other,
            (_, Bool) => self,
            (a, b) if a == b => NumericLayout {
                kind: a,
                size: self.size.max(other.size),
            },
            (Unsigned, Signed) | (Signed, Unsigned) => {
                let (unsigned, signed) = if self.kind == Unsigned {
                    (self, other)
                } else {
                    (other, self)
                };
                if signed.size > unsigned.size {
                    signed
                } else if unsigned.size < 8 {
                    NumericLayout {
                        kind: Signed,
                        size: unsigned.size * 2,
                    }
                } else {
                    FLOAT64
                }
            }
            _ => {
                let (int, float) = if self.kind == Float {
                    (other, self)
                } else {
                    (self, other)
                };
                let needed = match int.size {
                    1 => 2,
                    2 => 4,
                    _ => 8,
                };
                NumericLayout {
                    kind: Float,
                    size: float.size.max(needed),
                }
            }
        }
    }

    /// Characters needed to print any value of this layout.
    pub const fn text_len(self) -> u32 {
        match (self.kind, self.size) {
            (NumericKind::Bool, _) => 5,
            (NumericKind::Unsigned, 1) => 3,
            (NumericKind::Signed, 1) => 4,
            (NumericKind::Unsigned, 2) => 5,
            (NumericKind::Signed, 2) => 6,
            (NumericKind::Unsigned, 4) => 10,
            (NumericKind::Signed, 4) => 11,
            (NumericKind::Unsigned, _) => 20,
            (NumericKind::Signed, _) => 21,
            (NumericKind::Float, _) => 32,
        }
    }
}

/// One decoded element of a built-in instance.
#[derive(Clone, Debug, PartialEq)]
pub enum Element {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    /// Count of the instance's datetime unit.
    Datetime(i64),
}

impl Element {
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Element::Bool(b) => Some(f64::from(u8::from(b))),
            Element::Int(v) => Some(v as f64),
            Element::UInt(v) => Some(v as f64),
            Element::Float(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Element::Bool(b) => *b,
            Element::Int(v) => *v != 0,
            Element::UInt(v) => *v != 0,
            Element::Float(v) => *v != 0.0,
            Element::Text(s) => !s.is_empty(),
            Element::Bytes(b) => !b.is_empty(),
            Element::Datetime(v) => *v != 0,
        }
    }

    /// Text rendering used by casts into `str` and `bytes`.
    pub fn render(&self, unit: Option<TimeUnit>) -> String {
        match self {
            Element::Bool(true) => "True".to_owned(),
            Element::Bool(false) => "False".to_owned(),
            Element::Int(v) => v.to_string(),
            Element::UInt(v) => v.to_string(),
            Element::Float(v) => format_float(*v),
            Element::Text(s) => s.clone(),
            Element::Bytes(b) => String::from_utf8_lossy(b).into_owned(),
            Element::Datetime(v) => datetime::format_iso(*v, unit.unwrap_or(TimeUnit::Generic)),
        }
    }
}

/// Python-style float text: integral values keep a trailing `.0`.
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        "nan".to_owned()
    } else if value.is_infinite() {
        (if value > 0.0 { "inf" } else { "-inf" }).to_owned()
    } else if value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

/// Bytes per element of a built-in instance, `None` for other classes.
pub fn builtin_item_size(descr: &Descriptor) -> Option<usize> {
    if let Some(layout) = NumericLayout::of(descr.class()) {
        return Some(layout.size);
    }
    match descr.class() {
        ClassId::BYTES => descr.len(),
        ClassId::STR => descr.len().map(|len| len * 4),
        ClassId::DATETIME => Some(8),
        _ => None,
    }
}

fn read_word<const N: usize>(raw: &[u8], order: ByteOrder) -> [u8; N] {
    let mut word = [0u8; N];
    word.copy_from_slice(&raw[..N]);
    if order == ByteOrder::Swapped {
        word.reverse();
    }
    word
}

fn write_word<const N: usize>(mut word: [u8; N], raw: &mut [u8], order: ByteOrder) {
    if order == ByteOrder::Swapped {
        word.reverse();
    }
    raw[..N].copy_from_slice(&word);
}

/// Decode one element. `None` if the class is not built in or `raw` is
/// shorter than the instance's item size.
pub fn decode(descr: &Descriptor, raw: &[u8]) -> Option<Element> {
    let size = builtin_item_size(descr)?;
    if raw.len() < size {
        return None;
    }
    let order = descr.byte_order();
    if let Some(layout) = NumericLayout::of(descr.class()) {
        let element = match (layout.kind, layout.size) {
            (NumericKind::Bool, _) => Element::Bool(raw[0] != 0),
            (NumericKind::Signed, 1) => Element::Int(i64::from(raw[0] as i8)),
            (NumericKind::Signed, 2) => Element::Int(i64::from(i16::from_ne_bytes(read_word(raw, order)))),
            (NumericKind::Signed, 4) => Element::Int(i64::from(i32::from_ne_bytes(read_word(raw, order)))),
            (NumericKind::Signed, _) => Element::Int(i64::from_ne_bytes(read_word(raw, order))),
            (NumericKind::Unsigned, 1) => Element::UInt(u64::from(raw[0])),
            (NumericKind::Unsigned, 2) => Element::UInt(u64::from(u16::from_ne_bytes(read_word(raw, order)))),
            (NumericKind::Unsigned, 4) => Element::UInt(u64::from(u32::from_ne_bytes(read_word(raw, order)))),
            (NumericKind::Unsigned, _) => Element::UInt(u64::from_ne_bytes(read_word(raw, order))),
            (NumericKind::Float, 2) => {
                Element::Float(f16::from_bits(u16::from_ne_bytes(read_word(raw, order))).to_f64())
            }
            (NumericKind::Float, 4) => Element::Float(f64::from(f32::from_ne_bytes(read_word(raw, order)))),
            (NumericKind::Float, _) => Element::Float(f64::from_ne_bytes(read_word(raw, order))),
        };
        return Some(element);
    }
    match descr.class() {
        ClassId::BYTES => {
            let end = raw[..size].iter().rposition(|b| *b != 0).map_or(0, |i| i + 1);
            Some(Element::Bytes(raw[..end].to_vec()))
        }
        ClassId::STR => {
            let text: String = raw[..size]
                .chunks_exact(4)
                .map(|chunk| u32::from_ne_bytes(read_word(chunk, order)))
                .take_while(|code| *code != 0)
                .map(|code| char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER))
                .collect();
            Some(Element::Text(text))
        }
        ClassId::DATETIME => Some(Element::Datetime(i64::from_ne_bytes(read_word(raw, order)))),
        _ => None,
    }
}

fn numeric_as_i64(element: &Element) -> Option<i64> {
    match *element {
        Element::Bool(b) => Some(i64::from(b)),
        Element::Int(v) => Some(v),
        Element::UInt(v) => Some(v as i64),
        Element::Float(v) => Some(v as i64),
        _ => None,
    }
}

fn numeric_as_u64(element: &Element) -> Option<u64> {
    match *element {
        Element::Bool(b) => Some(u64::from(b)),
        Element::Int(v) => Some(v as u64),
        Element::UInt(v) => Some(v),
        Element::Float(v) => Some(v as u64),
        _ => None,
    }
}

fn mismatch(descr: &Descriptor, element: &Element) -> CastError {
    CastError::InvalidValue {
        reason: format!("cannot store {element:?} as `{descr}`"),
    }
}

/// Encode one element with C-style wrapping for numeric kinds.
///
/// Numeric instances accept any numeric element; text and byte strings are
/// truncated or zero-padded to the instance length.
pub fn encode(descr: &Descriptor, element: &Element, raw: &mut [u8]) -> Result<(), CastError> {
    let Some(size) = builtin_item_size(descr) else {
        return Err(mismatch(descr, element));
    };
    if raw.len() < size {
        return Err(mismatch(descr, element));
    }
    let order = descr.byte_order();
    if let Some(layout) = NumericLayout::of(descr.class()) {
        match (layout.kind, layout.size) {
            (NumericKind::Bool, _) => {
                if element.as_f64().is_none() {
                    return Err(mismatch(descr, element));
                }
                raw[0] = u8::from(element.is_truthy());
            }
            (NumericKind::Float, size) => {
                let value = element.as_f64().ok_or_else(|| mismatch(descr, element))?;
                match size {
                    2 => write_word(f16::from_f64(value).to_bits().to_ne_bytes(), raw, order),
                    4 => write_word((value as f32).to_ne_bytes(), raw, order),
                    _ => write_word(value.to_ne_bytes(), raw, order),
                }
            }
            (NumericKind::Signed, size) => {
                let value = numeric_as_i64(element).ok_or_else(|| mismatch(descr, element))?;
                match size {
                    1 => raw[0] = value as i8 as u8,
                    2 => write_word((value as i16).to_ne_bytes(), raw, order),
                    4 => write_word((value as i32).to_ne_bytes(), raw, order),
                    _ => write_word(value.to_ne_bytes(), raw, order),
                }
            }
            (NumericKind::Unsigned, size) => {
                let value = numeric_as_u64(element).ok_or_else(|| mismatch(descr, element))?;
                match size {
                    1 => raw[0] = value as u8,
                    2 => write_word((value as u16).to_ne_bytes(), raw, order),
                    4 => write_word((value as u32).to_ne_bytes(), raw, order),
                    _ => write_word(value.to_ne_bytes(), raw, order),
                }
            }
        }
        return Ok(());
    }
    match (descr.class(), element) {
        (ClassId::BYTES, Element::Bytes(bytes)) => {
            let n = bytes.len().min(size);
            raw[..n].copy_from_slice(&bytes[..n]);
            raw[n..size].fill(0);
        }
        (ClassId::STR, Element::Text(text)) => {
            raw[..size].fill(0);
            for (slot, ch) in raw[..size].chunks_exact_mut(4).zip(text.chars()) {
                write_word(u32::from(ch).to_ne_bytes(), slot, order);
            }
        }
        (ClassId::DATETIME, Element::Datetime(value)) => write_word(value.to_ne_bytes(), raw, order),
        _ => return Err(mismatch(descr, element)),
    }
    Ok(())
}
