//! Source and destination windows.
//!
//! A node records its windows as plain [`Window`]s so the converter tree can
//! be rebound cheaply. At conversion time they are resolved against the bound
//! array and the destination container; a [`DestSlice`] holds the only mutable
//! borrow of its window, so sibling writes can never alias.

use std::ops::Range;

use arrow_array::{Array, ArrayRef};
use arrow_schema::DataType;

use crate::{
    MaterializeError,
    ptype::TimeUnits,
    vector::{Record, Vector, VectorKind},
};

/// Offset and length of a window, local to the node's array or container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct Window {
    pub(crate) offset: usize,
    pub(crate) length: usize,
}

impl Window {
    pub(crate) fn new(offset: usize, length: usize) -> Self {
        Self { offset, length }
    }

    fn end(self, bound: usize, what: &str) -> Result<usize, MaterializeError> {
        self.offset
            .checked_add(self.length)
            .filter(|end| *end <= bound)
            .ok_or_else(|| {
                MaterializeError::invalid(format!(
                    "{what} window {}+{} out of bounds for length {bound}",
                    self.offset, self.length
                ))
            })
    }
}

/// Read-only window over a bound array.
pub(crate) struct SourceSlice<'a> {
    array: &'a ArrayRef,
    offset: usize,
    length: usize,
    all_null: bool,
}

impl<'a> SourceSlice<'a> {
    pub(crate) fn new(array: &'a ArrayRef, window: Window) -> Result<Self, MaterializeError> {
        window.end(array.len(), "source")?;
        Ok(Self {
            array,
            offset: window.offset,
            length: window.length,
            all_null: matches!(array.data_type(), DataType::Null),
        })
    }

    pub(crate) fn array(&self) -> &'a ArrayRef {
        self.array
    }

    pub(crate) fn data_type(&self) -> &'a DataType {
        self.array.data_type()
    }

    pub(crate) fn offset(&self) -> usize {
        self.offset
    }

    pub(crate) fn len(&self) -> usize {
        self.length
    }

    /// Array indices covered by the window.
    pub(crate) fn rows(&self) -> Range<usize> {
        self.offset..self.offset + self.length
    }

    /// Whether the array element at absolute index `idx` is null.
    pub(crate) fn is_null(&self, idx: usize) -> bool {
        self.all_null || self.array.is_null(idx)
    }

    pub(crate) fn unsupported(&self, target: VectorKind) -> MaterializeError {
        MaterializeError::not_supported(self.data_type(), target)
    }
}

/// Exclusive writable window over a destination container.
pub(crate) struct DestSlice<'a> {
    vector: &'a mut Vector,
    offset: usize,
    length: usize,
}

macro_rules! dest_windows {
    ($(($variant:ident, $getter:ident, $ty:ty)),* $(,)?) => {
        $(
            pub(crate) fn $getter(self) -> Result<&'a mut [Option<$ty>], MaterializeError> {
                let (vector, range) = self.split();
                match vector {
                    Vector::$variant(values) => Ok(&mut values[range]),
                    other => Err(kind_mismatch(VectorKind::$variant, other.kind())),
                }
            }
        )*
    };
}

impl<'a> DestSlice<'a> {
    pub(crate) fn new(vector: &'a mut Vector, window: Window) -> Result<Self, MaterializeError> {
        window.end(vector.len(), "destination")?;
        Ok(Self {
            vector,
            offset: window.offset,
            length: window.length,
        })
    }

    pub(crate) fn len(&self) -> usize {
        self.length
    }

    fn split(self) -> (&'a mut Vector, Range<usize>) {
        let Self {
            vector,
            offset,
            length,
        } = self;
        (vector, offset..offset + length)
    }

    dest_windows! {
        (Logical, logical, bool),
        (Integer, integer, i32),
        (Double, double, f64),
        (Integer64, integer64, i64),
        (Character, character, std::sync::Arc<str>),
        (Blob, blob, std::sync::Arc<[u8]>),
        (Date, date, f64),
    }

    pub(crate) fn timestamp(self) -> Result<&'a mut [Option<f64>], MaterializeError> {
        let (vector, range) = self.split();
        match vector {
            Vector::Timestamp { seconds, .. } => Ok(&mut seconds[range]),
            other => Err(kind_mismatch(VectorKind::Timestamp, other.kind())),
        }
    }

    pub(crate) fn difftime(self) -> Result<(&'a mut [Option<f64>], TimeUnits), MaterializeError> {
        let (vector, range) = self.split();
        match vector {
            Vector::Difftime { values, units } => Ok((&mut values[range], *units)),
            other => Err(kind_mismatch(VectorKind::Difftime, other.kind())),
        }
    }

    pub(crate) fn list_of(self) -> Result<&'a mut [Option<Vector>], MaterializeError> {
        let (vector, range) = self.split();
        match vector {
            Vector::ListOf { items, .. } => Ok(&mut items[range]),
            other => Err(kind_mismatch(VectorKind::ListOf, other.kind())),
        }
    }

    /// The destination record together with this slice's window over its rows.
    pub(crate) fn record(self) -> Result<(&'a mut Record, Window), MaterializeError> {
        let (vector, window) = self.into_parts();
        match vector {
            Vector::Record(record) => Ok((record, window)),
            other => Err(kind_mismatch(VectorKind::Record, other.kind())),
        }
    }

    /// The whole destination container, for callers that manage the window themselves.
    pub(crate) fn into_parts(self) -> (&'a mut Vector, Window) {
        let (vector, range) = self.split();
        (vector, Window::new(range.start, range.len()))
    }
}

fn kind_mismatch(expected: VectorKind, actual: VectorKind) -> MaterializeError {
    MaterializeError::invalid(format!(
        "destination kind mismatch: expected {expected:?}, got {actual:?}"
    ))
}
