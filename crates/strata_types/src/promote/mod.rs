//! Promotion: the instance both operands can be represented in.
//!
//! Two instances of one class unify through the class's `common_instance`.
//! Across classes, the common class is found first, each operand is cast to
//! it to get its natural instance there, and those are unified.

use crate::cast::{self, Target};
use crate::class::CommonClass;
use crate::error::{CastError, PromotionError};
use crate::{ClassId, Descriptor, Registry};

/// Common class of `a` and `b`, asking `a` first and then `b`.
pub fn common_class(registry: &Registry, a: ClassId, b: ClassId) -> Result<ClassId, PromotionError> {
    if a == b {
        return Ok(a);
    }
    for (this, other) in [(a, b), (b, a)] {
        let class = registry.class(this).map_err(CastError::from)?;
        if let CommonClass::Resolved(common) = class.common_class(this, other, registry) {
            return Ok(common);
        }
    }
    Err(PromotionError::NoCommonClass(a, b))
}

fn natural_instance(registry: &Registry, descr: &Descriptor, class: ClassId) -> Result<Descriptor, CastError> {
    if descr.class() == class {
        return Ok(*descr);
    }
    cast::resolve(registry, descr, Target::Class(class)).map(|plan| plan.to)
}

/// Smallest instance holding every value of `a` and of `b`.
pub fn promote(registry: &Registry, a: &Descriptor, b: &Descriptor) -> Result<Descriptor, PromotionError> {
    let class = common_class(registry, a.class(), b.class())?;
    let left = natural_instance(registry, a, class)?;
    let right = natural_instance(registry, b, class)?;
    let promoted = registry
        .class(class)
        .map_err(CastError::from)?
        .common_instance(&left, &right)
        .ok_or(PromotionError::NoCommonInstance { class, left, right })?;
    tracing::trace!(left = %a, right = %b, promoted = %promoted, "promoted");
    Ok(promoted)
}
