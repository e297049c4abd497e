//! Built-in classes and their place in the hierarchy.
//!
//! ```text
//! generic
//! ├── number
//! │   ├── integer
//! │   │   ├── signedinteger ── int8 int16 int32 int64
//! │   │   └── unsignedinteger ── uint8 uint16 uint32 uint64
//! │   └── floating ── float16 float32 float64
//! ├── character ── bytes str
//! └── bool datetime64 object
//! ```

mod abstract_class;
mod character;
mod datetime;
mod numeric;
mod object;

use std::sync::Arc;

pub use abstract_class::AbstractClass;
pub use character::CharacterClass;
pub use datetime::DatetimeClass;
pub use numeric::NumericClass;
pub use object::ObjectClass;

use crate::class::DTypeClass;
use crate::ClassId;

/// A built-in class ready for installation.
pub(crate) struct BuiltinClass {
    pub id: ClassId,
    pub parent: Option<ClassId>,
    pub class: Arc<dyn DTypeClass>,
}

fn entry(id: ClassId, parent: Option<ClassId>, class: impl DTypeClass + 'static) -> BuiltinClass {
    BuiltinClass {
        id,
        parent,
        class: Arc::new(class),
    }
}

/// Every built-in class, parents before children.
pub(crate) fn builtin_classes() -> Vec<BuiltinClass> {
    let abstract_ = |id: ClassId, parent: Option<ClassId>, name: &'static str, default: Option<ClassId>| entry(id, parent, AbstractClass::new(name, default));
    let mut classes = vec![
        abstract_(ClassId::GENERIC, None, "generic", None),
        abstract_(ClassId::NUMBER, Some(ClassId::GENERIC), "number", Some(ClassId::FLOAT64)),
        abstract_(ClassId::INTEGER, Some(ClassId::NUMBER), "integer", Some(ClassId::INT64)),
        abstract_(
            ClassId::SIGNED_INTEGER,
            Some(ClassId::INTEGER),
            "signedinteger",
            Some(ClassId::INT64),
        ),
        abstract_(
            ClassId::UNSIGNED_INTEGER,
            Some(ClassId::INTEGER),
            "unsignedinteger",
            Some(ClassId::UINT64),
        ),
        abstract_(ClassId::FLOATING, Some(ClassId::NUMBER), "floating", Some(ClassId::FLOAT64)),
        abstract_(ClassId::CHARACTER, Some(ClassId::GENERIC), "character", None),
    ];
    for &id in &ClassId::BUILTINS[..12] {
        let parent = match id.raw() {
            0 => ClassId::GENERIC,
            1..=4 => ClassId::SIGNED_INTEGER,
            5..=8 => ClassId::UNSIGNED_INTEGER,
            _ => ClassId::FLOATING,
        };
        if let Some(class) = NumericClass::new(id) {
            classes.push(entry(id, Some(parent), class));
        }
    }
    classes.push(entry(ClassId::BYTES, Some(ClassId::CHARACTER), CharacterClass::bytes()));
    classes.push(entry(ClassId::STR, Some(ClassId::CHARACTER), CharacterClass::unicode()));
    classes.push(entry(ClassId::DATETIME, Some(ClassId::GENERIC), DatetimeClass));
    classes.push(entry(ClassId::OBJECT, Some(ClassId::GENERIC), ObjectClass));
    classes
}
