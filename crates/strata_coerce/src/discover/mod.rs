//! Shape and descriptor discovery.
//!
//! One depth-first walk over the input. Each node is classified as:
//!
//! 1. A scalar: the fixed class claims it, or the registry maps its scalar
//!    type to a class (directly or through the legacy fallback).
//! 2. An array-like: contributes its whole shape and its descriptor.
//! 3. A sequence: contributes its length, then each item is walked one
//!    level deeper.
//! 4. Anything else, or a sequence at the depth limit: a scalar of no known
//!    class, which only `object` can hold.
//!
//! Array-likes and sequences are recorded in the [`CoercionCache`] in visit
//! order. Leaf descriptors are promoted into one running descriptor unless
//! the caller requested an instance.

use strata_diagnostic::{Diagnostic, DiagnosticQueue, ErrorCode};
use strata_ir::{NodePath, Shape};
use strata_types::cast::{self, Target};
use strata_types::datetime::TimeUnit;
use strata_types::{
    promote, CastError, ClassFlags, ClassId, DTypeClass, Descriptor, Discovered, Lookup, NdArray,
    Param, Registry, RegistryError, Value,
};

use crate::cache::{CoercionCache, Converted};
use crate::config::{CoercionConfig, RaggedPolicy};
use crate::shape::ShapeTracker;
use crate::{CoerceError, DiscoveryFlags};

/// Element type requested by the caller.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum DTypeRequest {
    /// Discover the descriptor from the input.
    #[default]
    None,
    /// Fix the class; its parameters still come from the input.
    Class(ClassId),
    /// Fix the instance. Implies its class and suppresses promotion.
    Instance(Descriptor),
}

impl From<ClassId> for DTypeRequest {
    fn from(class: ClassId) -> Self {
        DTypeRequest::Class(class)
    }
}

impl From<Descriptor> for DTypeRequest {
    fn from(descr: Descriptor) -> Self {
        DTypeRequest::Instance(descr)
    }
}

impl DTypeRequest {
    /// Split into the fixed class and the requested instance.
    ///
    /// An instance that does not fix its parameters (`U0`, a datetime of
    /// generic unit, an abstract class) only fixes the class.
    fn split(self, registry: &Registry) -> Result<(Option<ClassId>, Option<Descriptor>), RegistryError> {
        match self {
            DTypeRequest::None => Ok((None, None)),
            DTypeRequest::Class(class) => {
                registry.class(class)?;
                Ok((Some(class), None))
            }
            DTypeRequest::Instance(descr) => {
                let flags = registry
                    .flags(descr.class())
                    .ok_or(RegistryError::UnknownClass(descr.class()))?;
                let unsized_instance = flags.is_abstract()
                    || (flags.is_parametric()
                        && matches!(
                            descr.param(),
                            Param::None | Param::Len(0) | Param::Unit(TimeUnit::Generic)
                        ));
                if unsized_instance {
                    Ok((Some(descr.class()), None))
                } else {
                    Ok((Some(descr.class()), Some(descr)))
                }
            }
        }
    }
}

/// Result of discovery, consumed by [`Coercer::populate`](crate::Coercer::populate).
#[derive(Debug)]
pub struct Discovery<'a> {
    pub root: &'a Value,
    pub ndim: usize,
    pub shape: Shape,
    pub descr: Descriptor,
    pub flags: DiscoveryFlags,
    /// Warnings issued during the walk.
    pub diagnostics: Vec<Diagnostic>,
    pub cache: CoercionCache<'a>,
}

/// Walk `root` and determine its shape and descriptor.
pub(crate) fn discover<'a>(
    registry: &Registry,
    config: &CoercionConfig,
    root: &'a Value,
    request: DTypeRequest,
) -> Result<Discovery<'a>, CoerceError> {
    config.validate()?;
    let (fixed, requested) = request.split(registry)?;
    let fixed = match fixed {
        Some(id) => Some((id, registry.class(id)?)),
        None => None,
    };

    let mut flags = DiscoveryFlags::empty();
    if let Some(requested) = requested {
        let class_flags = registry.flags(requested.class()).unwrap_or_default();
        if class_flags.contains(ClassFlags::SPLITS_STRINGS) {
            flags |= DiscoveryFlags::STRINGS_AS_SEQUENCES;
        }
        if class_flags.contains(ClassFlags::TUPLE_ELEMENTS) {
            flags |= DiscoveryFlags::TUPLES_AS_ELEMENTS;
        }
    }

    let mut walker = Walker {
        registry,
        fixed,
        requested,
        flags,
        shape: ShapeTracker::new(config.max_dims),
        descr: None,
        cache: CoercionCache::new(),
        diagnostics: DiagnosticQueue::with_config(config.diagnostics.clone()),
        path: NodePath::root(),
        ragged_at: None,
    };
    walker.visit(root, 0)?;

    let ndim = walker.shape.max_ndim();
    let shape = walker.shape.shape(ndim);
    if walker.flags.is_ragged(ndim, config.max_dims) {
        let path = walker.ragged_at.clone().unwrap_or_default();
        match fixed {
            Some((id, _)) if id != ClassId::OBJECT => {
                return Err(CoerceError::RaggedInput { shape, path });
            }
            Some(_) => {}
            None if config.ragged == RaggedPolicy::Reject => {
                return Err(CoerceError::RaggedInput { shape, path });
            }
            None => {
                walker.deprecate_ragged(path);
                walker.descr = Some(Descriptor::of(ClassId::OBJECT));
            }
        }
    }

    let descr = match (requested, walker.descr, fixed) {
        (Some(requested), _, _) => requested,
        (None, Some(promoted), _) => promoted,
        (None, None, Some((id, class))) => empty_instance(registry, id, class)?,
        (None, None, None) => Descriptor::of(ClassId::FLOAT64),
    };
    walker.cache.seal(descr, shape.clone());
    tracing::debug!(
        ndim,
        shape = %shape,
        descr = %descr,
        cached = walker.cache.len(),
        generation = walker.cache.generation(),
        "discovered"
    );

    Ok(Discovery {
        root,
        ndim,
        shape,
        descr,
        flags: walker.flags,
        diagnostics: walker.diagnostics.flush(),
        cache: walker.cache,
    })
}

/// Descriptor of an input without elements under a fixed class.
fn empty_instance(registry: &Registry, id: ClassId, class: &dyn DTypeClass) -> Result<Descriptor, CoerceError> {
    if let Some(descr) = class.default_instance(id) {
        return Ok(descr);
    }
    let fallbacks = [
        Descriptor::of(ClassId::FLOAT64),
        Descriptor::unicode(1),
        Descriptor::bytes(1),
        Descriptor::datetime(TimeUnit::Generic),
    ];
    fallbacks
        .into_iter()
        .find(|descr| registry.is_subclass(descr.class(), id))
        .ok_or_else(|| CoerceError::ClassMisbehaved {
            class: class.name().to_owned(),
            reason: "has no default instance for empty input".to_owned(),
        })
}

/// Characters of a string, or bytes of a bytes value, unless it has
/// exactly one.
fn split_chars(value: &Value) -> Option<Vec<Value>> {
    match value {
        Value::Str(text) if text.chars().count() != 1 => {
            Some(text.chars().map(|c| Value::Str(c.to_string())).collect())
        }
        Value::Bytes(bytes) if bytes.len() != 1 => {
            Some(bytes.iter().map(|b| Value::Bytes(vec![*b])).collect())
        }
        _ => None,
    }
}

struct Walker<'r, 'a> {
    registry: &'r Registry,
    fixed: Option<(ClassId, &'r dyn DTypeClass)>,
    requested: Option<Descriptor>,
    flags: DiscoveryFlags,
    shape: ShapeTracker,
    /// Promoted descriptor so far.
    descr: Option<Descriptor>,
    cache: CoercionCache<'a>,
    diagnostics: DiagnosticQueue,
    path: NodePath,
    /// First node that made the input ragged.
    ragged_at: Option<NodePath>,
}

impl<'a> Walker<'_, 'a> {
    fn visit(&mut self, value: &'a Value, depth: usize) -> Result<(), CoerceError> {
        if self.flags.contains(DiscoveryFlags::STRINGS_AS_SEQUENCES) {
            if let Some(chars) = split_chars(value) {
                return self.visit_chars(value, chars, depth);
            }
        }

        if let Some(class) = self.scalar_class(value) {
            return self.visit_scalar(value, depth, Some(class));
        }

        if let Value::Array(array) = value {
            return self.visit_array(value, array, depth);
        }

        let items = match value {
            Value::Tuple(_) if self.flags.contains(DiscoveryFlags::TUPLES_AS_ELEMENTS) => None,
            _ => value.as_sequence(),
        };
        match items {
            Some(items) if depth != self.shape.max_ndim() => self.visit_sequence(value, items, depth),
            Some(_) => {
                // Too deep to be a dimension; ragged unless the limit is the rank.
                self.visit_scalar(value, depth, None)?;
                self.mark(DiscoveryFlags::REACHED_MAX_DIMS);
                Ok(())
            }
            None => self.visit_scalar(value, depth, None),
        }
    }

    fn visit_sequence(&mut self, value: &'a Value, items: &'a [Value], depth: usize) -> Result<(), CoerceError> {
        self.cache.push(value, Converted::Sequence(items), depth);
        if !self.shape.update(depth, &[items.len()], true) {
            self.mark(DiscoveryFlags::RAGGED);
            return Ok(());
        }
        if items.is_empty() {
            self.shape.close_at(depth + 1);
            return Ok(());
        }
        for (i, item) in items.iter().enumerate() {
            self.path.push(i);
            let result = self.visit(item, depth + 1);
            self.path.pop();
            result?;
        }
        Ok(())
    }

    /// A string split into characters. The characters are scalars and never
    /// cached, so recording the entry after them keeps pre-order.
    fn visit_chars(&mut self, value: &'a Value, chars: Vec<Value>, depth: usize) -> Result<(), CoerceError> {
        if !self.shape.update(depth, &[chars.len()], true) {
            self.mark(DiscoveryFlags::RAGGED);
        } else if chars.is_empty() {
            self.shape.close_at(depth + 1);
        } else {
            for (i, ch) in chars.iter().enumerate() {
                self.path.push(i);
                let class = self.scalar_class(ch);
                let result = self.visit_scalar(ch, depth + 1, class);
                self.path.pop();
                result?;
            }
        }
        self.cache.push(value, Converted::Chars(chars), depth);
        Ok(())
    }

    fn visit_array(&mut self, value: &'a Value, array: &'a NdArray, depth: usize) -> Result<(), CoerceError> {
        self.cache.push(value, Converted::Array(array), depth);
        if !self.shape.update(depth, array.shape().dims(), false) {
            self.mark(DiscoveryFlags::RAGGED);
            return Ok(());
        }
        if self.requested.is_some() {
            return Ok(());
        }

        let parametric_fixed = self
            .fixed
            .is_some_and(|(_, class)| class.flags().is_parametric());
        if array.descr().class() == ClassId::OBJECT && parametric_fixed {
            // Size the parametric class from the stored objects, one level deep.
            for (i, element) in array.objects().unwrap_or_default().iter().enumerate() {
                self.path.push(i);
                let result = self.flat_element(element);
                self.path.pop();
                result?;
            }
            return Ok(());
        }

        let descr = self.to_fixed(*array.descr())?;
        self.promote_with(descr);
        Ok(())
    }

    fn flat_element(&mut self, element: &Value) -> Result<(), CoerceError> {
        let class = self.scalar_class(element);
        let descr = self.scalar_descr(element, class)?;
        self.promote_with(descr);
        Ok(())
    }

    fn visit_scalar(&mut self, value: &Value, depth: usize, class: Option<ClassId>) -> Result<(), CoerceError> {
        let descr = self.scalar_descr(value, class)?;
        if !self.shape.update(depth, &[], false) {
            self.mark(DiscoveryFlags::RAGGED);
            self.descr = Some(Descriptor::of(ClassId::OBJECT));
            return Ok(());
        }
        self.promote_with(descr);
        Ok(())
    }

    /// Class of `value` if it is a scalar.
    ///
    /// The fixed class gets the first say; then the registry mapping; then
    /// the legacy fallback for typed scalars of unmapped types.
    fn scalar_class(&mut self, value: &Value) -> Option<ClassId> {
        let scalar_type = value.scalar_type();
        if let Some((id, class)) = self.fixed {
            if self.registry.scalar_type_of(id) == Some(scalar_type) || class.is_known_scalar(value) {
                return Some(id);
            }
        }
        match self.registry.lookup(scalar_type) {
            Lookup::Class(id) => Some(id),
            Lookup::NonScalar => None,
            Lookup::Unknown => {
                let id = self.registry.legacy_class(value)?;
                self.warn_legacy(value, id);
                Some(id)
            }
        }
    }

    /// Descriptor of a scalar, in order of preference: the requested
    /// instance, the fixed class's own discovery, the discovered class's
    /// discovery converted into the fixed class.
    fn scalar_descr(&self, value: &Value, discovered: Option<ClassId>) -> Result<Descriptor, CoerceError> {
        if let Some(requested) = self.requested {
            return Ok(requested);
        }

        if let Some((id, class)) = self.fixed {
            match class.discover_instance(id, value) {
                Discovered::Instance(descr) => return Ok(descr),
                Discovered::NotImplemented if discovered == Some(id) => {
                    return Err(misbehaved(class, "was unable to handle its own scalar type"));
                }
                Discovered::NotImplemented => {}
            }
        }

        let Some(discovered) = discovered else {
            return match self.fixed {
                Some((_, class)) => Err(CoerceError::UnrepresentableValue {
                    value: value.short_repr(),
                    class: class.name().to_owned(),
                    path: self.path.clone(),
                    reason: "the class has no instance for this value".to_owned(),
                }),
                None => Ok(Descriptor::of(ClassId::OBJECT)),
            };
        };
        let class = self.registry.class(discovered)?;
        let Discovered::Instance(descr) = class.discover_instance(discovered, value) else {
            return Err(misbehaved(class, "was unable to handle its own scalar type"));
        };
        self.to_fixed(descr)
    }

    /// Convert a discovered descriptor into the fixed class.
    fn to_fixed(&self, descr: Descriptor) -> Result<Descriptor, CoerceError> {
        let Some((id, class)) = self.fixed else {
            return Ok(descr);
        };
        let flags = class.flags();
        if !flags.is_abstract() && !flags.is_parametric() {
            return class
                .default_instance(id)
                .ok_or_else(|| misbehaved(class, "has no default instance"));
        }
        if self.registry.is_subclass(descr.class(), id) {
            return Ok(descr);
        }
        if flags.is_abstract() {
            return class.default_instance(id).ok_or_else(|| {
                CoerceError::cast(
                    &self.path,
                    CastError::NoCastAvailable {
                        from: descr.class(),
                        to: id,
                    },
                )
            });
        }
        cast::resolve(self.registry, &descr, Target::Class(id))
            .map(|plan| plan.to)
            .map_err(|err| CoerceError::cast(&self.path, err))
    }

    fn promote_with(&mut self, descr: Descriptor) {
        if self.requested.is_some() {
            return;
        }
        let Some(current) = self.descr else {
            self.descr = Some(descr);
            return;
        };
        match promote::promote(self.registry, &current, &descr) {
            Ok(promoted) => self.descr = Some(promoted),
            Err(err) => {
                tracing::debug!(%current, new = %descr, error = %err, path = %self.path, "promotion failed, using object");
                self.flags |= DiscoveryFlags::PROMOTION_FAILED;
                self.descr = Some(Descriptor::of(ClassId::OBJECT));
            }
        }
    }

    fn mark(&mut self, flag: DiscoveryFlags) {
        self.flags |= flag;
        if self.ragged_at.is_none() {
            self.ragged_at = Some(self.path.clone());
        }
    }

    fn warn_legacy(&mut self, value: &Value, id: ClassId) {
        if self.diagnostics.has_emitted(ErrorCode::W3002) {
            return;
        }
        let class = self.registry.class_name(id);
        tracing::warn!(scalar_type = %value.scalar_type(), %class, path = %self.path, "legacy scalar discovery");
        self.diagnostics.add(
            Diagnostic::warning(ErrorCode::W3002)
                .with_message(format!(
                    "scalar type `{}` has no registered class; using `{class}` from the value itself",
                    value.scalar_type()
                ))
                .with_label(self.path.clone(), "discovered here")
                .with_suggestion("register a scalar mapping for the type"),
        );
    }

    fn deprecate_ragged(&mut self, path: NodePath) {
        if self.flags.contains(DiscoveryFlags::DEPRECATION_WARNED) {
            return;
        }
        self.flags |= DiscoveryFlags::DEPRECATION_WARNED;
        tracing::warn!(%path, "ragged nested input coerced to object");
        let mut diag = Diagnostic::warning(ErrorCode::W3001)
            .with_message(
                "creating an array from ragged nested sequences (sequences of different \
                 lengths or shapes) is deprecated",
            )
            .with_suggestion("request the `object` class to build an array of the sub-sequences");
        if let Some(parent) = path.parent() {
            diag = diag.with_secondary_label(parent, "in this sequence");
        }
        self.diagnostics.add(diag.with_label(path, "shape differs from its siblings here"));
    }
}

fn misbehaved(class: &dyn DTypeClass, reason: &str) -> CoerceError {
    CoerceError::ClassMisbehaved {
        class: class.name().to_owned(),
        reason: reason.to_owned(),
    }
}

#[cfg(test)]
mod tests;
