use crate::class::{DTypeClass, Discovered};
use crate::{ClassFlags, ClassId, Descriptor, Value};

/// An inner node of the hierarchy. Never instantiated directly; some pick a
/// concrete default so `integer` requests still produce an array.
#[derive(Debug)]
pub struct AbstractClass {
    name: &'static str,
    default: Option<ClassId>,
}

impl AbstractClass {
    pub const fn new(name: &'static str, default: Option<ClassId>) -> Self {
        AbstractClass { name, default }
    }
}

impl DTypeClass for AbstractClass {
    fn name(&self) -> &str {
        self.name
    }

    fn flags(&self) -> ClassFlags {
        ClassFlags::ABSTRACT
    }

    fn default_instance(&self, _this: ClassId) -> Option<Descriptor> {
        self.default.map(Descriptor::of)
    }

    /// Values are sized by their own concrete class, never by an ancestor.
    fn discover_instance(&self, _this: ClassId, _value: &Value) -> Discovered {
        Discovered::NotImplemented
    }

    fn item_size(&self, _descr: &Descriptor) -> usize {
        0
    }
}
