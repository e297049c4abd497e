//! Minimal C-contiguous array buffers.
//!
//! [`NdArray`] is the destination of population and the representation of
//! array-like inputs. Fixed-width classes store raw bytes; classes flagged
//! [`HOLDS_OBJECTS`](crate::ClassFlags::HOLDS_OBJECTS) store one [`Value`]
//! per element. Elements are accessed through [`Cell`] and [`CellMut`].

use half::f16;
use strata_ir::Shape;
use thiserror::Error;

use crate::{ClassId, Descriptor, Value};

/// Storage requirements of one element.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ElementLayout {
    pub item_size: usize,
    pub holds_objects: bool,
}

#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum ArrayError {
    #[error("shape {shape} holds {expected} elements, got {found}")]
    LengthMismatch {
        shape: Shape,
        expected: usize,
        found: usize,
    },
}

/// One element slot, read-only.
#[derive(Copy, Clone, Debug)]
pub enum Cell<'a> {
    Raw(&'a [u8]),
    Object(&'a Value),
}

/// One element slot, writable.
#[derive(Debug)]
pub enum CellMut<'a> {
    Raw(&'a mut [u8]),
    Object(&'a mut Value),
}

impl<'a> Cell<'a> {
    pub fn raw(self) -> Option<&'a [u8]> {
        match self {
            Cell::Raw(raw) => Some(raw),
            Cell::Object(_) => None,
        }
    }

    pub fn object(self) -> Option<&'a Value> {
        match self {
            Cell::Object(value) => Some(value),
            Cell::Raw(_) => None,
        }
    }
}

impl<'a> CellMut<'a> {
    /// Shorter-lived handle to the same slot, so a failed write can be
    /// retried through another path.
    pub fn reborrow(&mut self) -> CellMut<'_> {
        match self {
            CellMut::Raw(raw) => CellMut::Raw(raw),
            CellMut::Object(value) => CellMut::Object(value),
        }
    }

    pub fn raw(self) -> Option<&'a mut [u8]> {
        match self {
            CellMut::Raw(raw) => Some(raw),
            CellMut::Object(_) => None,
        }
    }

    pub fn object(self) -> Option<&'a mut Value> {
        match self {
            CellMut::Object(value) => Some(value),
            CellMut::Raw(_) => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Storage {
    Raw { bytes: Vec<u8>, item_size: usize },
    Objects(Vec<Value>),
}

/// An owned, C-contiguous n-dimensional array.
#[derive(Clone, Debug, PartialEq)]
pub struct NdArray {
    descr: Descriptor,
    shape: Shape,
    storage: Storage,
}

/// Native Rust types that map onto a built-in numeric class.
pub trait NativeElement: Copy {
    const CLASS: ClassId;
    fn write_ne(self, out: &mut Vec<u8>);
}

macro_rules! native_element {
    ($($ty:ty => $class:ident),* $(,)?) => {
        $(
            impl NativeElement for $ty {
                const CLASS: ClassId = ClassId::$class;
                fn write_ne(self, out: &mut Vec<u8>) {
                    out.extend_from_slice(&self.to_ne_bytes());
                }
            }
        )*
    };
}

native_element! {
    i8 => INT8,
    i16 => INT16,
    i32 => INT32,
    i64 => INT64,
    u8 => UINT8,
    u16 => UINT16,
    u32 => UINT32,
    u64 => UINT64,
    f16 => FLOAT16,
    f32 => FLOAT32,
    f64 => FLOAT64,
}

impl NativeElement for bool {
    const CLASS: ClassId = ClassId::BOOL;
    fn write_ne(self, out: &mut Vec<u8>) {
        out.push(u8::from(self));
    }
}

fn check_len(shape: &Shape, found: usize) -> Result<(), ArrayError> {
    let expected = shape.element_count();
    if expected == found {
        Ok(())
    } else {
        Err(ArrayError::LengthMismatch {
            shape: shape.clone(),
            expected,
            found,
        })
    }
}

impl NdArray {
    /// Zero-filled (or `None`-filled) array.
    pub fn zeroed(descr: Descriptor, shape: Shape, layout: ElementLayout) -> Self {
        let count = shape.element_count();
        let storage = if layout.holds_objects {
            Storage::Objects(vec![Value::None; count])
        } else {
            Storage::Raw {
                bytes: vec![0; count * layout.item_size],
                item_size: layout.item_size,
            }
        };
        NdArray {
            descr,
            shape,
            storage,
        }
    }

    /// Array of a built-in numeric class from native values.
    pub fn from_native<T: NativeElement>(shape: Shape, data: &[T]) -> Result<Self, ArrayError> {
        check_len(&shape, data.len())?;
        let item_size = std::mem::size_of::<T>();
        let mut bytes = Vec::with_capacity(data.len() * item_size);
        for value in data {
            value.write_ne(&mut bytes);
        }
        Ok(NdArray {
            descr: Descriptor::of(T::CLASS),
            shape,
            storage: Storage::Raw { bytes, item_size },
        })
    }

    /// Array of an object-holding class.
    pub fn from_objects(descr: Descriptor, shape: Shape, values: Vec<Value>) -> Result<Self, ArrayError> {
        check_len(&shape, values.len())?;
        Ok(NdArray {
            descr,
            shape,
            storage: Storage::Objects(values),
        })
    }

    /// Array over raw element bytes in `descr`'s encoding.
    pub fn from_raw(
        descr: Descriptor,
        shape: Shape,
        item_size: usize,
        bytes: Vec<u8>,
    ) -> Result<Self, ArrayError> {
        let found = if item_size == 0 { 0 } else { bytes.len() / item_size };
        check_len(&shape, found)?;
        Ok(NdArray {
            descr,
            shape,
            storage: Storage::Raw { bytes, item_size },
        })
    }

    #[inline]
    pub fn descr(&self) -> &Descriptor {
        &self.descr
    }

    #[inline]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    #[inline]
    pub fn ndim(&self) -> usize {
        self.shape.rank()
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.shape.element_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn holds_objects(&self) -> bool {
        matches!(self.storage, Storage::Objects(_))
    }

    /// Element `index` in row-major order.
    pub fn cell(&self, index: usize) -> Option<Cell<'_>> {
        match &self.storage {
            Storage::Raw { bytes, item_size } => bytes
                .get(index * item_size..(index + 1) * item_size)
                .map(Cell::Raw),
            Storage::Objects(values) => values.get(index).map(Cell::Object),
        }
    }

    /// Raw element bytes, `None` for object storage.
    pub fn bytes(&self) -> Option<&[u8]> {
        match &self.storage {
            Storage::Raw { bytes, .. } => Some(bytes),
            Storage::Objects(_) => None,
        }
    }

    /// Stored values, `None` for raw storage.
    pub fn objects(&self) -> Option<&[Value]> {
        match &self.storage {
            Storage::Objects(values) => Some(values),
            Storage::Raw { .. } => None,
        }
    }

    /// Mutable view over the whole array.
    pub fn view_mut(&mut self) -> ArrayViewMut<'_> {
        let storage = match &mut self.storage {
            Storage::Raw { bytes, item_size } => StorageMut::Raw {
                bytes,
                item_size: *item_size,
            },
            Storage::Objects(values) => StorageMut::Objects(values),
        };
        ArrayViewMut {
            descr: self.descr,
            dims: self.shape.dims(),
            storage,
        }
    }
}

#[derive(Debug)]
enum StorageMut<'a> {
    Raw { bytes: &'a mut [u8], item_size: usize },
    Objects(&'a mut [Value]),
}

/// Mutable view of a C-contiguous block: a whole array or a sub-array
/// selected along leading axes.
#[derive(Debug)]
pub struct ArrayViewMut<'a> {
    descr: Descriptor,
    dims: &'a [usize],
    storage: StorageMut<'a>,
}

impl ArrayViewMut<'_> {
    #[inline]
    pub fn descr(&self) -> &Descriptor {
        &self.descr
    }

    #[inline]
    pub fn dims(&self) -> &[usize] {
        self.dims
    }

    #[inline]
    pub fn ndim(&self) -> usize {
        self.dims.len()
    }

    /// Number of elements in the view.
    pub fn len(&self) -> usize {
        self.dims.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sub-view at `index` along the leading axis.
    pub fn subview(&mut self, index: usize) -> Option<ArrayViewMut<'_>> {
        let (&outer, inner) = self.dims.split_first()?;
        if index >= outer {
            return None;
        }
        let block: usize = inner.iter().product();
        let storage = match &mut self.storage {
            StorageMut::Raw { bytes, item_size } => {
                let step = block * *item_size;
                StorageMut::Raw {
                    bytes: &mut bytes[index * step..(index + 1) * step],
                    item_size: *item_size,
                }
            }
            StorageMut::Objects(values) => {
                StorageMut::Objects(&mut values[index * block..(index + 1) * block])
            }
        };
        Some(ArrayViewMut {
            descr: self.descr,
            dims: inner,
            storage,
        })
    }

    /// Element `index` of the view in row-major order.
    pub fn cell_mut(&mut self, index: usize) -> Option<CellMut<'_>> {
        match &mut self.storage {
            StorageMut::Raw { bytes, item_size } => {
                let size = *item_size;
                bytes
                    .get_mut(index * size..(index + 1) * size)
                    .map(CellMut::Raw)
            }
            StorageMut::Objects(values) => values.get_mut(index).map(CellMut::Object),
        }
    }
}

/// Scratch space for a single element, used between chained cast steps.
#[derive(Clone, Debug)]
pub enum ElementBuffer {
    Raw(Vec<u8>),
    Object(Value),
}

impl ElementBuffer {
    pub fn new(layout: ElementLayout) -> Self {
        if layout.holds_objects {
            ElementBuffer::Object(Value::None)
        } else {
            ElementBuffer::Raw(vec![0; layout.item_size])
        }
    }

    pub fn cell(&self) -> Cell<'_> {
        match self {
            ElementBuffer::Raw(bytes) => Cell::Raw(bytes),
            ElementBuffer::Object(value) => Cell::Object(value),
        }
    }

    pub fn cell_mut(&mut self) -> CellMut<'_> {
        match self {
            ElementBuffer::Raw(bytes) => CellMut::Raw(bytes),
            ElementBuffer::Object(value) => CellMut::Object(value),
        }
    }
}
