//! Delegation of conversions the crate cannot perform natively.
//!
//! The host supplies a [`FallbackConverter`]. It receives a borrowed, shallow
//! view of the source array (it must not outlive the call) and returns an
//! owned [`Vector`], which is validated against the destination shape and
//! moved into place.

use arrow_array::{Array, ArrayRef};
use arrow_schema::Field;

use crate::{
    BoxError, MaterializeError, Ptype, Vector,
    converter::{Converter, NodeId},
    slice::{DestSlice, SourceSlice},
};

/// Host-supplied converter for extension types and unsupported conversions.
///
/// Implementations must return a vector of exactly `request.length()` rows
/// shaped like `request.ptype()`; anything else fails the conversion.
pub trait FallbackConverter {
    /// Convert the requested window of the source array.
    fn convert(&self, request: &FallbackRequest<'_>) -> Result<Vector, BoxError>;
}

impl<F> FallbackConverter for F
where
    F: Fn(&FallbackRequest<'_>) -> Result<Vector, BoxError>,
{
    fn convert(&self, request: &FallbackRequest<'_>) -> Result<Vector, BoxError> {
        self(request)
    }
}

/// Non-owning view of the window a fallback converter must produce.
#[derive(Debug, Clone, Copy)]
pub struct FallbackRequest<'a> {
    array: &'a dyn Array,
    field: &'a Field,
    offset: usize,
    length: usize,
    ptype: &'a Ptype,
}

impl<'a> FallbackRequest<'a> {
    /// The borrowed source array.
    #[must_use]
    pub fn array(&self) -> &'a dyn Array {
        self.array
    }

    /// Schema of the source array, including any extension metadata.
    #[must_use]
    pub fn field(&self) -> &'a Field {
        self.field
    }

    /// First row to convert, relative to the start of [`array`](Self::array).
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// First row to convert, relative to the array's underlying buffers.
    #[must_use]
    pub fn absolute_offset(&self) -> usize {
        self.array.offset() + self.offset
    }

    /// Number of rows to convert.
    #[must_use]
    pub fn length(&self) -> usize {
        self.length
    }

    /// Shape the result must take.
    #[must_use]
    pub fn ptype(&self) -> &'a Ptype {
        self.ptype
    }

    /// A zero-copy slice of exactly the requested rows.
    #[must_use]
    pub fn sliced(&self) -> ArrayRef {
        self.array.slice(self.offset, self.length)
    }
}

impl Converter {
    /// Convert node `id` through the fallback and copy the result into place.
    pub(crate) fn materialize_fallback(
        &self,
        id: NodeId,
        dst: &mut Vector,
    ) -> Result<(), MaterializeError> {
        let node = &self.nodes[id];
        let array = node
            .array
            .as_ref()
            .ok_or_else(|| MaterializeError::invalid("no array bound to converter node"))?;
        let Some(fallback) = self.fallback.as_deref() else {
            return Err(MaterializeError::not_supported(
                array.data_type(),
                node.ptype.kind(),
            ));
        };
        let src = SourceSlice::new(array, node.src)?;
        let dst = DestSlice::new(dst, node.dst)?;
        if src.len() != dst.len() {
            return Err(MaterializeError::invalid(format!(
                "source length {} does not match destination length {}",
                src.len(),
                dst.len()
            )));
        }

        let request = FallbackRequest {
            array: array.as_ref(),
            field: &node.field,
            offset: src.offset(),
            length: src.len(),
            ptype: &node.ptype,
        };
        let value = fallback
            .convert(&request)
            .map_err(|source| MaterializeError::Fallback { source })?;
        copy_into(value, dst)
    }
}

/// Validate `value` against the destination window, then move it into place.
///
/// Records are matched positionally by column; names are not compared.
fn copy_into(value: Vector, dst: DestSlice<'_>) -> Result<(), MaterializeError> {
    let (vector, window) = dst.into_parts();
    check_shape(&value, vector, window.length)?;
    copy_values(value, vector, window.offset)
}

fn check_shape(value: &Vector, dst: &Vector, len: usize) -> Result<(), MaterializeError> {
    match (dst, value) {
        (Vector::Record(dst), Vector::Record(value)) => {
            if value.nrow() != len {
                return Err(MaterializeError::invalid(format!(
                    "unexpected record row count: expected {len}, got {}",
                    value.nrow()
                )));
            }
            if value.ncol() != dst.ncol() {
                return Err(MaterializeError::invalid(format!(
                    "unexpected record column count: expected {}, got {}",
                    dst.ncol(),
                    value.ncol()
                )));
            }
            dst.columns
                .iter()
                .zip(&value.columns)
                .try_for_each(|(d, v)| check_shape(v, d, len))
        }
        (Vector::Record(_), other) => Err(MaterializeError::invalid(format!(
            "expected record result but got {:?}",
            other.kind()
        ))),
        (_, Vector::Record(_)) => Err(MaterializeError::invalid(
            "expected non-record result but got record",
        )),
        (dst, value) => {
            if dst.kind() != value.kind() {
                return Err(MaterializeError::invalid(format!(
                    "unexpected result kind: expected {:?}, got {:?}",
                    dst.kind(),
                    value.kind()
                )));
            }
            if value.len() != len {
                return Err(MaterializeError::invalid(format!(
                    "unexpected length of result: expected {len}, got {}",
                    value.len()
                )));
            }
            Ok(())
        }
    }
}

/// Move `values` into `dst[offset..]`.
fn move_into<T>(dst: &mut [T], offset: usize, values: Vec<T>) {
    for (slot, value) in dst[offset..].iter_mut().zip(values) {
        *slot = value;
    }
}

fn copy_values(value: Vector, dst: &mut Vector, offset: usize) -> Result<(), MaterializeError> {
    match (dst, value) {
        // Fixed-width kinds: bulk copy.
        (Vector::Logical(d), Vector::Logical(v)) => {
            d[offset..offset + v.len()].copy_from_slice(&v)
        }
        (Vector::Integer(d), Vector::Integer(v)) => {
            d[offset..offset + v.len()].copy_from_slice(&v)
        }
        (Vector::Double(d), Vector::Double(v)) | (Vector::Date(d), Vector::Date(v)) => {
            d[offset..offset + v.len()].copy_from_slice(&v)
        }
        (Vector::Integer64(d), Vector::Integer64(v)) => {
            d[offset..offset + v.len()].copy_from_slice(&v)
        }
        (Vector::Factor { codes: d, .. }, Vector::Factor { codes: v, .. }) => {
            d[offset..offset + v.len()].copy_from_slice(&v)
        }
        (Vector::Timestamp { seconds: d, .. }, Vector::Timestamp { seconds: v, .. }) => {
            d[offset..offset + v.len()].copy_from_slice(&v)
        }
        (Vector::Difftime { values: d, .. }, Vector::Difftime { values: v, .. }) => {
            d[offset..offset + v.len()].copy_from_slice(&v)
        }
        // Reference kinds: move handles element-wise.
        (Vector::Character(d), Vector::Character(v)) => move_into(d, offset, v),
        (Vector::Blob(d), Vector::Blob(v)) => move_into(d, offset, v),
        (Vector::List(d), Vector::List(v))
        | (Vector::ListOf { items: d, .. }, Vector::ListOf { items: v, .. }) => {
            move_into(d, offset, v)
        }
        (Vector::Record(d), Vector::Record(v)) => {
            for (column, value) in d.columns.iter_mut().zip(v.columns) {
                copy_values(value, column, offset)?;
            }
        }
        (dst, value) => {
            return Err(MaterializeError::invalid(format!(
                "cannot copy {:?} result into {:?} destination",
                value.kind(),
                dst.kind()
            )));
        }
    }
    Ok(())
}
