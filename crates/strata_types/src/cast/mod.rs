//! Casting engine.
//!
//! Every ordered pair of classes has at most one [`CastSpec`]. Its resolver
//! turns a source instance and an optional destination instance into the
//! instances the transfer loop actually works on plus a safety level; the
//! engine then closes any gap between requested and resolved instances with
//! same-class steps, for at most [`MAX_CAST_CHAIN`] steps in total.
//!
//! ```text
//! int32 (swapped) ──same-class──▶ int32 ──spec──▶ float64 ──same-class──▶ float64 (swapped)
//! ```

pub(crate) mod builtin;

use std::fmt;

use smallvec::SmallVec;

use crate::error::CastError;
use crate::{Cell, CellMut, ClassId, Descriptor, ElementBuffer, Registry};

/// Upper bound on transfer steps in one plan: pre-adjust, cast, post-adjust.
pub const MAX_CAST_CHAIN: usize = 3;

/// How much a cast may change the meaning of values, from safest to least safe.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Casting {
    /// Only byte order or layout changes.
    Equivalent,
    /// Every value is preserved.
    Safe,
    /// Values may lose precision within the same kind (`float64` to `float32`).
    SameKind,
    /// Anything goes.
    Unsafe,
}

impl fmt::Display for Casting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Casting::Equivalent => write!(f, "equivalent"),
            Casting::Safe => write!(f, "safe"),
            Casting::SameKind => write!(f, "same_kind"),
            Casting::Unsafe => write!(f, "unsafe"),
        }
    }
}

/// Safety of one step or a whole chain.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct CastSafety {
    pub level: Casting,
    /// The destination bytes are the source bytes reinterpreted.
    pub view: bool,
}

impl CastSafety {
    /// A pure reinterpretation.
    pub const VIEW: CastSafety = CastSafety {
        level: Casting::Equivalent,
        view: true,
    };

    /// A copying cast at `level`.
    pub const fn copy(level: Casting) -> Self {
        CastSafety { level, view: false }
    }

    /// Safety of running `self` and then `next`: the least safe level, and
    /// a view only if both are views.
    #[must_use]
    pub fn then(self, next: CastSafety) -> CastSafety {
        CastSafety {
            level: self.level.max(next.level),
            view: self.view && next.view,
        }
    }
}

/// Instances a resolver settled on.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Resolution {
    pub safety: CastSafety,
    pub from: Descriptor,
    pub to: Descriptor,
}

/// What a resolver knows about the cast it is resolving.
pub struct ResolveContext<'r> {
    pub registry: &'r Registry,
    pub from: ClassId,
    pub to: ClassId,
}

/// What a transfer function knows about the step it is running.
pub struct TransferContext<'r> {
    pub registry: &'r Registry,
    pub from: Descriptor,
    pub to: Descriptor,
}

pub type ResolveFn =
    fn(&ResolveContext<'_>, &Descriptor, Option<&Descriptor>) -> Result<Resolution, CastError>;

pub type TransferFn = fn(&TransferContext<'_>, Cell<'_>, CellMut<'_>) -> Result<(), CastError>;

/// The casting implementation for one ordered class pair.
#[derive(Copy, Clone)]
pub struct CastSpec {
    pub from: ClassId,
    pub to: ClassId,
    /// Safest level any resolution reports; resolvers may only downgrade it.
    pub ceiling: Casting,
    pub resolve: ResolveFn,
    pub transfer: TransferFn,
}

impl fmt::Debug for CastSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CastSpec")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("ceiling", &self.ceiling)
            .finish_non_exhaustive()
    }
}

/// Destination of a cast: a full instance, or just a class whose natural
/// instance the resolver picks.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Target {
    Instance(Descriptor),
    Class(ClassId),
}

impl Target {
    pub fn class(&self) -> ClassId {
        match self {
            Target::Instance(descr) => descr.class(),
            Target::Class(class) => *class,
        }
    }
}

/// One transfer between two concrete instances.
#[derive(Copy, Clone)]
pub struct CastStep {
    pub from: Descriptor,
    pub to: Descriptor,
    transfer: TransferFn,
}

impl CastStep {
    fn run(&self, registry: &Registry, src: Cell<'_>, dst: CellMut<'_>) -> Result<(), CastError> {
        let cx = TransferContext {
            registry,
            from: self.from,
            to: self.to,
        };
        (self.transfer)(&cx, src, dst)
    }
}

impl fmt::Debug for CastStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CastStep({} -> {})", self.from, self.to)
    }
}

/// A resolved cast: the final instances, the chain safety, and the steps.
#[derive(Clone, Debug)]
pub struct CastPlan {
    pub from: Descriptor,
    pub to: Descriptor,
    pub safety: CastSafety,
    steps: SmallVec<[CastStep; MAX_CAST_CHAIN]>,
}

impl CastPlan {
    pub fn steps(&self) -> &[CastStep] {
        &self.steps
    }

    /// Fail unless the plan is at least as safe as `casting`.
    pub fn require(&self, casting: Casting) -> Result<(), CastError> {
        if self.safety.level <= casting {
            Ok(())
        } else {
            Err(CastError::CastNotSafeEnough {
                from: self.from,
                to: self.to,
                required: casting,
                actual: self.safety.level,
            })
        }
    }

    /// Convert one element, staging intermediates in scratch buffers.
    pub fn transfer(&self, registry: &Registry, src: Cell<'_>, dst: CellMut<'_>) -> Result<(), CastError> {
        let Some((last, init)) = self.steps.split_last() else {
            return Ok(());
        };
        let Some((first, middle)) = init.split_first() else {
            return last.run(registry, src, dst);
        };
        let mut staged = ElementBuffer::new(registry.layout(&first.to)?);
        first.run(registry, src, staged.cell_mut())?;
        for step in middle {
            let mut next = ElementBuffer::new(registry.layout(&step.to)?);
            step.run(registry, staged.cell(), next.cell_mut())?;
            staged = next;
        }
        last.run(registry, staged.cell(), dst)
    }
}

fn same_class_step(
    registry: &Registry,
    from: &Descriptor,
    to: &Descriptor,
) -> Result<(CastStep, CastSafety), CastError> {
    let no_cast = || CastError::NoCastAvailable {
        from: from.class(),
        to: to.class(),
    };
    if from.class() != to.class() {
        return Err(no_cast());
    }
    let spec = registry.cast(from.class(), from.class()).ok_or_else(no_cast)?;
    let cx = ResolveContext {
        registry,
        from: spec.from,
        to: spec.to,
    };
    let resolution = (spec.resolve)(&cx, from, Some(to))?;
    if resolution.from != *from || resolution.to != *to {
        return Err(no_cast());
    }
    let step = CastStep {
        from: *from,
        to: *to,
        transfer: spec.transfer,
    };
    Ok((step, resolution.safety))
}

/// Resolve a cast from `from` to `target`.
pub fn resolve(registry: &Registry, from: &Descriptor, target: Target) -> Result<CastPlan, CastError> {
    let to_class = target.class();
    let requested = match target {
        Target::Instance(descr) => Some(descr),
        Target::Class(_) => None,
    };
    let spec = registry
        .cast(from.class(), to_class)
        .ok_or(CastError::NoCastAvailable {
            from: from.class(),
            to: to_class,
        })?;
    let cx = ResolveContext {
        registry,
        from: spec.from,
        to: spec.to,
    };
    let resolution = (spec.resolve)(&cx, from, requested.as_ref())?;

    let mut steps: SmallVec<[CastStep; MAX_CAST_CHAIN]> = SmallVec::new();
    let mut safety = CastSafety {
        level: resolution.safety.level.max(spec.ceiling),
        view: resolution.safety.view,
    };

    if resolution.from != *from {
        let (step, step_safety) = same_class_step(registry, from, &resolution.from)?;
        safety = step_safety.then(safety);
        steps.push(step);
    }
    steps.push(CastStep {
        from: resolution.from,
        to: resolution.to,
        transfer: spec.transfer,
    });
    let to = match requested {
        Some(descr) if descr != resolution.to => {
            let (step, step_safety) = same_class_step(registry, &resolution.to, &descr)?;
            safety = safety.then(step_safety);
            steps.push(step);
            descr
        }
        _ => resolution.to,
    };
    if steps.iter().any(|s| !s.from.is_native() || !s.to.is_native()) {
        safety.view = false;
    }

    tracing::trace!(
        from = %from,
        to = %to,
        level = %safety.level,
        view = safety.view,
        steps = steps.len(),
        "resolved cast"
    );
    Ok(CastPlan {
        from: *from,
        to,
        safety,
        steps,
    })
}

/// Whether `from` casts to `to` at `casting` or safer.
pub fn can_cast(registry: &Registry, from: &Descriptor, to: &Descriptor, casting: Casting) -> bool {
    match registry.cast(from.class(), to.class()) {
        Some(spec) if spec.ceiling > casting => false,
        Some(_) => resolve(registry, from, Target::Instance(*to))
            .is_ok_and(|plan| plan.safety.level <= casting),
        None => false,
    }
}
