//! Casts between built-in classes, plus the generic same-class copy and
//! object casts every registered concrete class receives.

use crate::cast::{CastSafety, CastSpec, Casting, Resolution, ResolveContext, TransferContext};
use crate::datetime::{self, TimeUnit};
use crate::element::{self, Element, NumericKind, NumericLayout};
use crate::error::CastError;
use crate::{pack, Cell, CellMut, ClassId, Descriptor, Param, Registry};

type ResolveResult = Result<Resolution, CastError>;

fn invalid(reason: impl Into<String>) -> CastError {
    CastError::InvalidValue {
        reason: reason.into(),
    }
}

fn decode_cell(descr: &Descriptor, cell: Cell<'_>) -> Result<Element, CastError> {
    cell.raw()
        .and_then(|raw| element::decode(descr, raw))
        .ok_or_else(|| invalid(format!("cannot read an element of `{descr}`")))
}

fn encode_cell(descr: &Descriptor, element: &Element, cell: CellMut<'_>) -> Result<(), CastError> {
    let raw = cell
        .raw()
        .ok_or_else(|| invalid(format!("`{descr}` does not store raw elements")))?;
    element::encode(descr, element, raw)
}

fn decode_text(descr: &Descriptor, cell: Cell<'_>) -> Result<String, CastError> {
    match decode_cell(descr, cell)? {
        Element::Text(text) => Ok(text),
        Element::Bytes(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
        other => Err(invalid(format!("expected text, found {other:?}"))),
    }
}

fn len_param(descr: &Descriptor) -> u32 {
    match descr.param() {
        Param::Len(len) => len,
        _ => 0,
    }
}

fn unit_of(descr: &Descriptor) -> TimeUnit {
    descr.unit().unwrap_or(TimeUnit::Generic)
}

// === Same-class copy ===

fn copy_resolve(_cx: &ResolveContext<'_>, from: &Descriptor, to: Option<&Descriptor>) -> ResolveResult {
    let to = to.copied().unwrap_or(from.native());
    Ok(Resolution {
        safety: CastSafety {
            level: Casting::Equivalent,
            view: from.byte_order() == to.byte_order(),
        },
        from: *from,
        to,
    })
}

fn copy_transfer(cx: &TransferContext<'_>, src: Cell<'_>, dst: CellMut<'_>) -> Result<(), CastError> {
    match (src, dst) {
        (Cell::Raw(from), CellMut::Raw(to)) => {
            let n = from.len().min(to.len());
            to[..n].copy_from_slice(&from[..n]);
            if cx.from.byte_order() != cx.to.byte_order() {
                to[..n].reverse();
            }
            Ok(())
        }
        (Cell::Object(from), CellMut::Object(to)) => {
            *to = from.clone();
            Ok(())
        }
        _ => Err(invalid("element storage of the two instances differs")),
    }
}

/// Byte copy (swapping when byte orders differ) between instances of a
/// non-parametric class.
pub(crate) fn copy_cast(class: ClassId) -> CastSpec {
    CastSpec {
        from: class,
        to: class,
        ceiling: Casting::Equivalent,
        resolve: copy_resolve,
        transfer: copy_transfer,
    }
}

// === Numeric ===

/// Safety of converting between two built-in numeric classes.
pub(crate) fn numeric_level(from: ClassId, to: ClassId) -> Casting {
    let (Some(a), Some(b)) = (NumericLayout::of(from), NumericLayout::of(to)) else {
        return Casting::Unsafe;
    };
    if a == b {
        Casting::Equivalent
    } else if a.promote(b) == b {
        Casting::Safe
    } else if a.kind <= b.kind {
        Casting::SameKind
    } else {
        Casting::Unsafe
    }
}

fn numeric_resolve(cx: &ResolveContext<'_>, from: &Descriptor, to: Option<&Descriptor>) -> ResolveResult {
    let to = to.copied().unwrap_or(Descriptor::of(cx.to));
    Ok(Resolution {
        safety: CastSafety::copy(numeric_level(cx.from, cx.to)),
        from: from.native(),
        to: to.native(),
    })
}

fn convert_transfer(cx: &TransferContext<'_>, src: Cell<'_>, dst: CellMut<'_>) -> Result<(), CastError> {
    let element = decode_cell(&cx.from, src)?;
    encode_cell(&cx.to, &element, dst)
}

// === Into text ===

fn sized_text(cx: &ResolveContext<'_>, from: Descriptor, to: Option<&Descriptor>, natural: u32) -> Resolution {
    let to = to
        .copied()
        .unwrap_or(Descriptor::with_param(cx.to, Param::Len(natural)));
    let level = if len_param(&to) >= natural {
        Casting::Safe
    } else {
        Casting::Unsafe
    };
    Resolution {
        safety: CastSafety::copy(level),
        from,
        to,
    }
}

fn numeric_to_text_resolve(
    cx: &ResolveContext<'_>,
    from: &Descriptor,
    to: Option<&Descriptor>,
) -> ResolveResult {
    let natural = NumericLayout::of(cx.from).map_or(32, NumericLayout::text_len);
    Ok(sized_text(cx, from.native(), to, natural))
}

fn datetime_to_text_resolve(
    cx: &ResolveContext<'_>,
    from: &Descriptor,
    to: Option<&Descriptor>,
) -> ResolveResult {
    let natural = unit_of(from).iso_len() as u32;
    Ok(sized_text(cx, *from, to, natural))
}

fn render_transfer(cx: &TransferContext<'_>, src: Cell<'_>, dst: CellMut<'_>) -> Result<(), CastError> {
    let text = decode_cell(&cx.from, src)?.render(cx.from.unit());
    let out = if cx.to.class() == ClassId::BYTES {
        Element::Bytes(text.into_bytes())
    } else {
        Element::Text(text)
    };
    encode_cell(&cx.to, &out, dst)
}

// === Between text classes ===

fn text_resolve(cx: &ResolveContext<'_>, from: &Descriptor, to: Option<&Descriptor>) -> ResolveResult {
    let from_len = len_param(from);
    let to = to
        .copied()
        .unwrap_or(Descriptor::with_param(cx.to, Param::Len(from_len)));
    let to_len = len_param(&to);
    let same_class = cx.from == cx.to;
    let level = match (cx.from, cx.to) {
        _ if same_class && to_len == from_len => Casting::Equivalent,
        (ClassId::STR, ClassId::BYTES) => Casting::Unsafe,
        _ if to_len >= from_len => Casting::Safe,
        _ => Casting::SameKind,
    };
    Ok(Resolution {
        safety: CastSafety {
            level,
            view: same_class && to_len == from_len && from.byte_order() == to.byte_order(),
        },
        from: *from,
        to,
    })
}

fn text_transfer(cx: &TransferContext<'_>, src: Cell<'_>, dst: CellMut<'_>) -> Result<(), CastError> {
    let out = match (decode_cell(&cx.from, src)?, cx.to.class()) {
        (Element::Text(text), ClassId::STR) => Element::Text(text),
        (Element::Bytes(bytes), ClassId::BYTES) => Element::Bytes(bytes),
        (Element::Bytes(bytes), _) if bytes.is_ascii() => {
            Element::Text(bytes.into_iter().map(char::from).collect())
        }
        (Element::Text(text), _) if text.is_ascii() => Element::Bytes(text.into_bytes()),
        (other, _) => {
            return Err(invalid(format!(
                "{other:?} is not ASCII and cannot be stored as `{}`",
                cx.to
            )))
        }
    };
    encode_cell(&cx.to, &out, dst)
}

/// Resizing cast between instances of `str` or `bytes`.
pub(crate) fn text_cast(class: ClassId) -> CastSpec {
    CastSpec {
        from: class,
        to: class,
        ceiling: Casting::Equivalent,
        resolve: text_resolve,
        transfer: text_transfer,
    }
}

// === Parsing text ===

fn parse_resolve(cx: &ResolveContext<'_>, from: &Descriptor, to: Option<&Descriptor>) -> ResolveResult {
    let to = to.copied().unwrap_or(Descriptor::of(cx.to));
    Ok(Resolution {
        safety: CastSafety::copy(Casting::Unsafe),
        from: *from,
        to,
    })
}

fn parse_numeric(text: &str, to: &Descriptor) -> Result<Element, CastError> {
    let bad = || invalid(format!("could not convert string to {to}: '{text}'"));
    let layout = NumericLayout::of(to.class()).ok_or_else(bad)?;
    match layout.kind {
        NumericKind::Bool => Ok(Element::Bool(!text.is_empty())),
        NumericKind::Float => text.parse::<f64>().map(Element::Float).map_err(|_| bad()),
        NumericKind::Signed => text.parse::<i64>().map(Element::Int).map_err(|_| bad()),
        NumericKind::Unsigned => text.parse::<u64>().map(Element::UInt).map_err(|_| bad()),
    }
}

fn parse_transfer(cx: &TransferContext<'_>, src: Cell<'_>, dst: CellMut<'_>) -> Result<(), CastError> {
    let text = decode_text(&cx.from, src)?;
    let element = parse_numeric(text.trim(), &cx.to)?;
    encode_cell(&cx.to, &element, dst)
}

fn parse_datetime_resolve(
    cx: &ResolveContext<'_>,
    from: &Descriptor,
    to: Option<&Descriptor>,
) -> ResolveResult {
    let to = to.ok_or(CastError::AmbiguousParametricCast {
        from: *from,
        to: cx.to,
    })?;
    Ok(Resolution {
        safety: CastSafety::copy(Casting::Unsafe),
        from: *from,
        to: *to,
    })
}

fn parse_datetime_transfer(
    cx: &TransferContext<'_>,
    src: Cell<'_>,
    dst: CellMut<'_>,
) -> Result<(), CastError> {
    let text = decode_text(&cx.from, src)?;
    let (value, unit) = datetime::parse_iso(text.trim())
        .ok_or_else(|| invalid(format!("error parsing datetime string \"{text}\"")))?;
    let value = datetime::convert(value, unit, unit_of(&cx.to))
        .ok_or_else(|| invalid(format!("\"{text}\" overflows `{}`", cx.to)))?;
    encode_cell(&cx.to, &Element::Datetime(value), dst)
}

// === Datetime ===

fn datetime_resolve(_cx: &ResolveContext<'_>, from: &Descriptor, to: Option<&Descriptor>) -> ResolveResult {
    let to = to.copied().unwrap_or(from.native());
    let (a, b) = (unit_of(from), unit_of(&to));
    let level = if a == b {
        Casting::Equivalent
    } else if a == TimeUnit::Generic || b > a {
        Casting::Safe
    } else {
        Casting::SameKind
    };
    Ok(Resolution {
        safety: CastSafety {
            level,
            view: a == b && from.byte_order() == to.byte_order(),
        },
        from: *from,
        to,
    })
}

fn datetime_transfer(cx: &TransferContext<'_>, src: Cell<'_>, dst: CellMut<'_>) -> Result<(), CastError> {
    let Element::Datetime(value) = decode_cell(&cx.from, src)? else {
        return Err(invalid(format!("expected a datetime element of `{}`", cx.from)));
    };
    let value = datetime::convert(value, unit_of(&cx.from), unit_of(&cx.to))
        .ok_or_else(|| invalid(format!("{value} overflows `{}`", cx.to)))?;
    encode_cell(&cx.to, &Element::Datetime(value), dst)
}

/// Unit conversion between datetime instances.
pub(crate) fn datetime_cast() -> CastSpec {
    CastSpec {
        from: ClassId::DATETIME,
        to: ClassId::DATETIME,
        ceiling: Casting::Equivalent,
        resolve: datetime_resolve,
        transfer: datetime_transfer,
    }
}

fn datetime_to_int_resolve(
    cx: &ResolveContext<'_>,
    from: &Descriptor,
    to: Option<&Descriptor>,
) -> ResolveResult {
    let to = to.copied().unwrap_or(Descriptor::of(cx.to));
    Ok(Resolution {
        safety: CastSafety::copy(Casting::Unsafe),
        from: *from,
        to,
    })
}

fn datetime_to_int_transfer(
    cx: &TransferContext<'_>,
    src: Cell<'_>,
    dst: CellMut<'_>,
) -> Result<(), CastError> {
    let Element::Datetime(value) = decode_cell(&cx.from, src)? else {
        return Err(invalid(format!("expected a datetime element of `{}`", cx.from)));
    };
    encode_cell(&cx.to, &Element::Int(value), dst)
}

fn int_to_datetime_resolve(
    _cx: &ResolveContext<'_>,
    from: &Descriptor,
    to: Option<&Descriptor>,
) -> ResolveResult {
    let to = to
        .copied()
        .unwrap_or(Descriptor::datetime(TimeUnit::Generic));
    Ok(Resolution {
        safety: CastSafety::copy(Casting::Unsafe),
        from: from.native(),
        to,
    })
}

fn int_to_datetime_transfer(
    cx: &TransferContext<'_>,
    src: Cell<'_>,
    dst: CellMut<'_>,
) -> Result<(), CastError> {
    let count = match decode_cell(&cx.from, src)? {
        Element::Int(v) => v,
        Element::UInt(v) => v as i64,
        other => return Err(invalid(format!("{other:?} is not an integer count"))),
    };
    encode_cell(&cx.to, &Element::Datetime(count), dst)
}

// === Object ===

fn to_object_resolve(cx: &ResolveContext<'_>, from: &Descriptor, to: Option<&Descriptor>) -> ResolveResult {
    let to = to.copied().unwrap_or(Descriptor::of(cx.to));
    Ok(Resolution {
        safety: CastSafety::copy(Casting::Safe),
        from: *from,
        to,
    })
}

fn to_object_transfer(cx: &TransferContext<'_>, src: Cell<'_>, dst: CellMut<'_>) -> Result<(), CastError> {
    let value = cx.registry.class(cx.from.class())?.getitem(&cx.from, src);
    let slot = dst
        .object()
        .ok_or_else(|| invalid(format!("`{}` does not store objects", cx.to)))?;
    *slot = value;
    Ok(())
}

fn from_object_resolve(
    cx: &ResolveContext<'_>,
    from: &Descriptor,
    to: Option<&Descriptor>,
) -> ResolveResult {
    let to = match to {
        Some(to) => *to,
        None => cx
            .registry
            .default_instance(cx.to)
            .ok_or(CastError::AmbiguousParametricCast {
                from: *from,
                to: cx.to,
            })?,
    };
    Ok(Resolution {
        safety: CastSafety::copy(Casting::Unsafe),
        from: *from,
        to,
    })
}

fn from_object_transfer(cx: &TransferContext<'_>, src: Cell<'_>, dst: CellMut<'_>) -> Result<(), CastError> {
    let value = src
        .object()
        .ok_or_else(|| invalid(format!("`{}` does not store objects", cx.from)))?;
    pack(cx.registry, &cx.to, value, dst)
}

/// Casts between a concrete class and `object`, both directions.
pub(crate) fn object_casts(class: ClassId) -> [CastSpec; 2] {
    [
        CastSpec {
            from: class,
            to: ClassId::OBJECT,
            ceiling: Casting::Safe,
            resolve: to_object_resolve,
            transfer: to_object_transfer,
        },
        CastSpec {
            from: ClassId::OBJECT,
            to: class,
            ceiling: Casting::Unsafe,
            resolve: from_object_resolve,
            transfer: from_object_transfer,
        },
    ]
}

// === Installation ===

const TEXT: [ClassId; 2] = [ClassId::BYTES, ClassId::STR];

fn spec(
    from: ClassId,
    to: ClassId,
    ceiling: Casting,
    resolve: crate::cast::ResolveFn,
    transfer: crate::cast::TransferFn,
) -> CastSpec {
    CastSpec {
        from,
        to,
        ceiling,
        resolve,
        transfer,
    }
}

/// Define every cross-class cast among built-in classes.
pub(crate) fn install(registry: &mut Registry) {
    let numeric = &ClassId::BUILTINS[..12];
    for &from in numeric {
        for &to in numeric {
            if from != to {
                let level = numeric_level(from, to);
                registry.insert_cast(spec(from, to, level, numeric_resolve, convert_transfer));
            }
        }
        for to in TEXT {
            registry.insert_cast(spec(from, to, Casting::Safe, numeric_to_text_resolve, render_transfer));
            registry.insert_cast(spec(to, from, Casting::Unsafe, parse_resolve, parse_transfer));
        }
    }

    registry.insert_cast(spec(ClassId::BYTES, ClassId::STR, Casting::Safe, text_resolve, text_transfer));
    registry.insert_cast(spec(ClassId::STR, ClassId::BYTES, Casting::Unsafe, text_resolve, text_transfer));

    for text in TEXT {
        registry.insert_cast(spec(
            ClassId::DATETIME,
            text,
            Casting::Safe,
            datetime_to_text_resolve,
            render_transfer,
        ));
        registry.insert_cast(spec(
            text,
            ClassId::DATETIME,
            Casting::Unsafe,
            parse_datetime_resolve,
            parse_datetime_transfer,
        ));
    }

    registry.insert_cast(spec(
        ClassId::DATETIME,
        ClassId::INT64,
        Casting::Unsafe,
        datetime_to_int_resolve,
        datetime_to_int_transfer,
    ));
    for &int in &numeric[1..9] {
        registry.insert_cast(spec(
            int,
            ClassId::DATETIME,
            Casting::Unsafe,
            int_to_datetime_resolve,
            int_to_datetime_transfer,
        ));
    }
}
