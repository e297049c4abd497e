//! Table of element-type classes, scalar-type mappings, and casts.
//!
//! Registration is explicit: classes enter through [`Registry::register_class`]
//! and leave through [`Registry::unregister_class`]. Scalar mappings are not
//! removed with their class; the next [`Registry::lookup`] that meets a stale
//! mapping prunes it and reports [`Lookup::Unknown`].

pub mod global;

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use strata_ir::Shape;

use crate::cast::builtin::{self as builtin_casts, copy_cast, object_casts};
use crate::cast::CastSpec;
use crate::class::builtin::builtin_classes;
use crate::class::DTypeClass;
use crate::error::RegistryError;
use crate::{ClassFlags, ClassId, Descriptor, ElementLayout, NdArray, ScalarType, Value};

/// One registered class.
pub struct ClassEntry {
    pub id: ClassId,
    pub parent: Option<ClassId>,
    pub flags: ClassFlags,
    class: Arc<dyn DTypeClass>,
}

impl ClassEntry {
    pub fn class(&self) -> &dyn DTypeClass {
        self.class.as_ref()
    }
}

impl fmt::Debug for ClassEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassEntry")
            .field("id", &self.id)
            .field("name", &self.class.name())
            .field("parent", &self.parent)
            .field("flags", &self.flags)
            .finish()
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum ScalarMapping {
    Class(ClassId),
    NonScalar,
}

/// Result of mapping a scalar type to a class.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Lookup {
    Class(ClassId),
    /// A container or array type; never an element.
    NonScalar,
    Unknown,
}

pub struct Registry {
    classes: FxHashMap<ClassId, ClassEntry>,
    next_dynamic: u32,
    /// Behind a lock so lookups through `&self` can prune stale entries.
    scalar_map: RwLock<FxHashMap<ScalarType, ScalarMapping>>,
    class_scalar: FxHashMap<ClassId, ScalarType>,
    casts: FxHashMap<(ClassId, ClassId), CastSpec>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("classes", &self.classes.len())
            .field("scalar_mappings", &self.scalar_map.read().len())
            .field("casts", &self.casts.len())
            .finish_non_exhaustive()
    }
}

impl Registry {
    /// Registry holding the built-in classes, their scalar mappings, and
    /// their casts.
    pub fn new() -> Self {
        let mut registry = Registry {
            classes: FxHashMap::default(),
            next_dynamic: ClassId::FIRST_DYNAMIC,
            scalar_map: RwLock::new(FxHashMap::default()),
            class_scalar: FxHashMap::default(),
            casts: FxHashMap::default(),
        };
        for builtin in builtin_classes() {
            registry.insert_class(builtin.id, builtin.parent, builtin.class);
        }
        builtin_casts::install(&mut registry);

        let map = registry.scalar_map.get_mut();
        for (scalar_type, class) in [
            (ScalarType::BOOL, ClassId::BOOL),
            (ScalarType::INT, ClassId::INT64),
            (ScalarType::FLOAT, ClassId::FLOAT64),
            (ScalarType::STR, ClassId::STR),
            (ScalarType::BYTES, ClassId::BYTES),
        ] {
            map.insert(scalar_type, ScalarMapping::Class(class));
        }
        for &class in &ClassId::BUILTINS[..16] {
            map.insert(ScalarType::of_class(class), ScalarMapping::Class(class));
            registry.class_scalar.insert(class, ScalarType::of_class(class));
        }
        for scalar_type in [ScalarType::LIST, ScalarType::TUPLE, ScalarType::ARRAY] {
            map.insert(scalar_type, ScalarMapping::NonScalar);
        }
        registry
    }

    fn insert_class(&mut self, id: ClassId, parent: Option<ClassId>, class: Arc<dyn DTypeClass>) {
        let flags = class.flags();
        if !flags.is_abstract() {
            let same = class.same_class_cast(id).unwrap_or_else(|| copy_cast(id));
            self.insert_cast(same);
            if id != ClassId::OBJECT {
                for spec in object_casts(id) {
                    self.insert_cast(spec);
                }
            }
        }
        self.classes.insert(
            id,
            ClassEntry {
                id,
                parent,
                flags,
                class,
            },
        );
    }

    pub(crate) fn insert_cast(&mut self, spec: CastSpec) {
        self.casts.insert((spec.from, spec.to), spec);
    }

    // === Classes ===

    /// Register a plugin class under the abstract `parent`.
    ///
    /// Concrete classes are sealed, so `parent` must be abstract. Parametric
    /// classes must supply a same-class cast; non-parametric concrete ones
    /// get a byte copy. Every concrete class gets casts to and from `object`.
    pub fn register_class(
        &mut self,
        class: Arc<dyn DTypeClass>,
        parent: ClassId,
    ) -> Result<ClassId, RegistryError> {
        let name = class.name().to_owned();
        let flags = class.flags();
        let parent_entry = self
            .classes
            .get(&parent)
            .ok_or(RegistryError::UnknownClass(parent))?;
        if !parent_entry.flags.is_abstract() {
            return Err(RegistryError::invalid(
                name,
                format!("`{}` is concrete and cannot be subclassed", parent_entry.class.name()),
            ));
        }

        let id = ClassId::from_raw(self.next_dynamic);
        if !flags.is_abstract() {
            match class.same_class_cast(id) {
                Some(spec) if spec.from != id || spec.to != id => {
                    return Err(RegistryError::invalid(
                        name,
                        "the same-class cast must convert the class to itself",
                    ));
                }
                None if flags.is_parametric() => {
                    return Err(RegistryError::invalid(
                        name,
                        "parametric classes must supply a same-class cast",
                    ));
                }
                _ => {}
            }
        }

        self.next_dynamic += 1;
        self.insert_class(id, Some(parent), class);
        tracing::debug!(class = %name, id = id.raw(), parent = %parent, "registered class");
        Ok(id)
    }

    /// Remove a plugin class together with every cast touching it.
    ///
    /// Scalar mappings to the class stay behind and are pruned lazily.
    pub fn unregister_class(&mut self, id: ClassId) -> Result<Arc<dyn DTypeClass>, RegistryError> {
        let entry = self.classes.get(&id).ok_or(RegistryError::UnknownClass(id))?;
        if id.is_builtin() {
            return Err(RegistryError::invalid(
                entry.class.name(),
                "built-in classes cannot be unregistered",
            ));
        }
        if self.classes.values().any(|other| other.parent == Some(id)) {
            return Err(RegistryError::invalid(
                entry.class.name(),
                "the class still has registered subclasses",
            ));
        }
        let entry = self.classes.remove(&id).ok_or(RegistryError::UnknownClass(id))?;
        self.casts.retain(|(from, to), _| *from != id && *to != id);
        self.class_scalar.remove(&id);
        tracing::debug!(class = %entry.class.name(), id = id.raw(), "unregistered class");
        Ok(entry.class)
    }

    pub fn contains(&self, id: ClassId) -> bool {
        self.classes.contains_key(&id)
    }

    pub fn entry(&self, id: ClassId) -> Option<&ClassEntry> {
        self.classes.get(&id)
    }

    pub fn class(&self, id: ClassId) -> Result<&dyn DTypeClass, RegistryError> {
        self.entry(id)
            .map(ClassEntry::class)
            .ok_or(RegistryError::UnknownClass(id))
    }

    pub fn flags(&self, id: ClassId) -> Option<ClassFlags> {
        self.entry(id).map(|entry| entry.flags)
    }

    /// Human-readable class name, falling back to the id.
    pub fn class_name(&self, id: ClassId) -> String {
        self.entry(id)
            .map_or_else(|| id.to_string(), |entry| entry.class.name().to_owned())
    }

    /// Whether `child` is `ancestor` or derives from it.
    pub fn is_subclass(&self, child: ClassId, ancestor: ClassId) -> bool {
        let mut current = Some(child);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.entry(id).and_then(|entry| entry.parent);
        }
        false
    }

    pub fn default_instance(&self, id: ClassId) -> Option<Descriptor> {
        self.entry(id)?.class.default_instance(id)
    }

    /// Storage requirements of `descr`.
    pub fn layout(&self, descr: &Descriptor) -> Result<ElementLayout, RegistryError> {
        let entry = self
            .entry(descr.class())
            .ok_or(RegistryError::UnknownClass(descr.class()))?;
        Ok(ElementLayout {
            item_size: entry.class.item_size(descr),
            holds_objects: entry.flags.holds_objects(),
        })
    }

    /// Zero-filled array of `descr` with `shape`.
    pub fn allocate(&self, descr: Descriptor, shape: Shape) -> Result<NdArray, RegistryError> {
        let layout = self.layout(&descr)?;
        Ok(NdArray::zeroed(descr, shape, layout))
    }

    // === Scalar Types ===

    /// Map `scalar_type` to `class`.
    ///
    /// Plugins (`is_user_defined`) may only map scalar types of the generic
    /// family. A scalar type maps to one class and a class owns one scalar
    /// type; repeating an existing mapping is a no-op.
    pub fn register_scalar_mapping(
        &mut self,
        class: ClassId,
        scalar_type: ScalarType,
        is_user_defined: bool,
    ) -> Result<(), RegistryError> {
        let entry = self
            .classes
            .get(&class)
            .ok_or(RegistryError::UnknownClass(class))?;
        if is_user_defined && !scalar_type.is_generic_family() {
            return Err(RegistryError::invalid(
                entry.class.name(),
                format!("scalar type `{scalar_type}` is not in the generic scalar family"),
            ));
        }

        let map = self.scalar_map.get_mut();
        match map.get(&scalar_type) {
            Some(ScalarMapping::Class(existing)) if *existing == class => return Ok(()),
            Some(ScalarMapping::Class(existing)) if self.classes.contains_key(existing) => {
                return Err(RegistryError::DuplicateScalarMapping {
                    scalar_type,
                    existing: *existing,
                });
            }
            Some(ScalarMapping::NonScalar) => {
                return Err(RegistryError::invalid(
                    entry.class.name(),
                    format!("`{scalar_type}` is a container type"),
                ));
            }
            _ => {}
        }
        if let Some(&owned) = self.class_scalar.get(&class) {
            if owned != scalar_type {
                return Err(RegistryError::DuplicateScalarMapping {
                    scalar_type: owned,
                    existing: class,
                });
            }
        }

        map.insert(scalar_type, ScalarMapping::Class(class));
        self.class_scalar.insert(class, scalar_type);
        tracing::debug!(scalar_type = %scalar_type, class = %class, "mapped scalar type");
        Ok(())
    }

    /// Class mapped to `scalar_type`, pruning the entry if its class is gone.
    pub fn lookup(&self, scalar_type: ScalarType) -> Lookup {
        let found = self.scalar_map.read().get(&scalar_type).copied();
        match found {
            None => Lookup::Unknown,
            Some(ScalarMapping::NonScalar) => Lookup::NonScalar,
            Some(ScalarMapping::Class(id)) if self.classes.contains_key(&id) => Lookup::Class(id),
            Some(stale @ ScalarMapping::Class(id)) => {
                let mut map = self.scalar_map.write();
                if map.get(&scalar_type) == Some(&stale) {
                    map.remove(&scalar_type);
                }
                tracing::debug!(scalar_type = %scalar_type, class = %id, "pruned stale scalar mapping");
                Lookup::Unknown
            }
        }
    }

    /// Scalar type owned by `class`.
    pub fn scalar_type_of(&self, class: ClassId) -> Option<ScalarType> {
        self.class_scalar.get(&class).copied()
    }

    /// Fallback for unmapped scalar types: a typed scalar whose class is
    /// still registered belongs to that class.
    pub fn legacy_class(&self, value: &Value) -> Option<ClassId> {
        match value {
            Value::Typed(scalar) if self.contains(scalar.descr().class()) => Some(scalar.descr().class()),
            _ => None,
        }
    }

    /// Class of a scalar value through the mapping, then the legacy
    /// fallback. `None` for containers and unknown values.
    pub fn scalar_class(&self, value: &Value) -> Option<ClassId> {
        match self.lookup(value.scalar_type()) {
            Lookup::Class(id) => Some(id),
            Lookup::NonScalar => None,
            Lookup::Unknown => self.legacy_class(value),
        }
    }

    // === Casts ===

    /// Define the cast for `spec.from` to `spec.to`. Each pair has one cast.
    pub fn define_cast(&mut self, spec: CastSpec) -> Result<(), RegistryError> {
        for id in [spec.from, spec.to] {
            if !self.contains(id) {
                return Err(RegistryError::UnknownClass(id));
            }
        }
        if self.casts.contains_key(&(spec.from, spec.to)) {
            return Err(RegistryError::DuplicateCast {
                from: spec.from,
                to: spec.to,
            });
        }
        tracing::debug!(from = %spec.from, to = %spec.to, ceiling = %spec.ceiling, "defined cast");
        self.insert_cast(spec);
        Ok(())
    }

    pub fn cast(&self, from: ClassId, to: ClassId) -> Option<&CastSpec> {
        self.casts.get(&(from, to))
    }
}

#[cfg(test)]
mod tests;
