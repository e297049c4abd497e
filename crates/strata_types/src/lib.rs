//! Strata Types - element-type classes, instances, casting, and promotion.
//!
//! # Architecture
//!
//! - [`ClassId`] / [`Descriptor`]: a class is a family of encodings, a
//!   descriptor one fully parameterized member of it (`str` vs `U5`)
//! - [`DTypeClass`]: behavior of a class, implemented by the built-ins and
//!   by plugins
//! - [`Registry`]: classes, scalar-type mappings, and the cast table, plus a
//!   process-wide instance in [`registry::global`]
//! - [`cast`]: resolves a cast between two instances into a plan of at most
//!   [`cast::MAX_CAST_CHAIN`] transfer steps
//! - [`promote`]: the instance two instances unify to
//! - [`Value`] / [`NdArray`]: the input object model and array buffers

mod array;
pub mod cast;
pub mod class;
mod class_id;
pub mod datetime;
mod descriptor;
pub mod element;
mod error;
mod flags;
mod pack;
pub mod promote;
pub mod registry;
mod value;

pub use array::{
    ArrayError, ArrayViewMut, Cell, CellMut, ElementBuffer, ElementLayout, NativeElement, NdArray,
};
pub use cast::{CastPlan, CastSafety, CastSpec, Casting, Target};
pub use class::{CommonClass, DTypeClass, Discovered, SetItemError};
pub use class_id::ClassId;
pub use descriptor::{ByteOrder, Descriptor, Param};
pub use error::{CastError, PromotionError, RegistryError};
pub use flags::ClassFlags;
pub use pack::pack;
pub use registry::{ClassEntry, Lookup, Registry};
pub use value::{ScalarType, TypedScalar, UserScalar, Value};
