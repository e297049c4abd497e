//! Pre-order record of the array-likes and sequences discovery visited.
//!
//! Population replays the record instead of re-inspecting the input. Entries
//! borrow the input, so the input outlives the cache; identity is checked by
//! address during the replay.

use std::ptr;
use std::sync::atomic::{AtomicU64, Ordering};

use strata_ir::Shape;
use strata_types::{Descriptor, NdArray, Value};

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

/// What a cached node was converted to.
#[derive(Clone, Debug)]
pub enum Converted<'a> {
    /// Elements of a list or tuple.
    Sequence(&'a [Value]),
    /// One-character strings (or one-byte bytes) of a string split into
    /// characters.
    Chars(Vec<Value>),
    /// An array-like input.
    Array(&'a NdArray),
}

impl Converted<'_> {
    #[inline]
    pub fn is_sequence(&self) -> bool {
        !matches!(self, Converted::Array(_))
    }

    /// Items of a sequence, `None` for array-likes.
    pub fn items(&self) -> Option<&[Value]> {
        match self {
            Converted::Sequence(items) => Some(items),
            Converted::Chars(chars) => Some(chars),
            Converted::Array(_) => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct CacheEntry<'a> {
    pub original: &'a Value,
    pub converted: Converted<'a>,
    /// Nesting depth of `original`, 0 for the root.
    pub depth: usize,
}

impl CacheEntry<'_> {
    #[inline]
    pub fn is(&self, value: &Value, depth: usize) -> bool {
        self.depth == depth && ptr::eq(self.original, value)
    }
}

/// The cache of one discovery.
///
/// Carries a process-unique generation and, once discovery finishes, the
/// descriptor and shape it was built for.
#[derive(Debug)]
pub struct CoercionCache<'a> {
    generation: u64,
    entries: Vec<CacheEntry<'a>>,
    descr: Option<Descriptor>,
    shape: Shape,
}

impl<'a> CoercionCache<'a> {
    pub(crate) fn new() -> Self {
        CoercionCache {
            generation: NEXT_GENERATION.fetch_add(1, Ordering::Relaxed),
            entries: Vec::new(),
            descr: None,
            shape: Shape::scalar(),
        }
    }

    pub(crate) fn push(&mut self, original: &'a Value, converted: Converted<'a>, depth: usize) {
        self.entries.push(CacheEntry {
            original,
            converted,
            depth,
        });
    }

    pub(crate) fn seal(&mut self, descr: Descriptor, shape: Shape) {
        self.descr = Some(descr);
        self.shape = shape;
    }

    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[inline]
    pub fn entries(&self) -> &[CacheEntry<'a>] {
        &self.entries
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Descriptor the cache was sealed with.
    #[inline]
    pub fn descr(&self) -> Option<&Descriptor> {
        self.descr.as_ref()
    }

    #[inline]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }
}

/// Read position over a cache's entries.
#[derive(Debug)]
pub(crate) struct Cursor<'c, 'a> {
    entries: &'c [CacheEntry<'a>],
    pos: usize,
}

impl<'c, 'a> Cursor<'c, 'a> {
    pub(crate) fn new(cache: &'c CoercionCache<'a>) -> Self {
        Cursor {
            entries: &cache.entries,
            pos: 0,
        }
    }

    /// Consume the next entry if it records `value` at `depth`.
    pub(crate) fn take(&mut self, value: &Value, depth: usize) -> Option<&'c CacheEntry<'a>> {
        let entries = self.entries;
        let entry = entries.get(self.pos).filter(|entry| entry.is(value, depth))?;
        self.pos += 1;
        Some(entry)
    }

    /// Skip the entries of nodes nested below `depth`.
    pub(crate) fn skip_descendants(&mut self, depth: usize) {
        while self.entries.get(self.pos).is_some_and(|entry| entry.depth > depth) {
            self.pos += 1;
        }
    }

    #[inline]
    pub(crate) fn is_finished(&self) -> bool {
        self.pos >= self.entries.len()
    }
}
