//! 64-bit integer materializer.

use arrow_array::{Array, cast::AsArray, types as t};
use arrow_schema::DataType;
use log::warn;

use crate::{
    MaterializeError, VectorKind,
    slice::{DestSlice, SourceSlice},
};

const MIN: f64 = i64::MIN as f64;
const MAX: f64 = i64::MAX as f64;

fn from_f64(v: f64) -> Option<i64> {
    // i64::MAX is not representable as f64; MAX rounds up to 2^63.
    (v.is_finite() && v >= MIN && v < MAX).then(|| v as i64)
}

pub(super) fn materialize(
    src: &SourceSlice<'_>,
    dst: DestSlice<'_>,
) -> Result<(), MaterializeError> {
    let out = dst.integer64()?;
    let mut lost = 0usize;
    match src.data_type() {
        DataType::Null => out.fill(None),
        DataType::Boolean => {
            let array = src.array().as_boolean();
            for (slot, idx) in out.iter_mut().zip(src.rows()) {
                *slot = (!array.is_null(idx)).then(|| i64::from(array.value(idx)));
            }
        }
        DataType::Int8 => convert_primitive!(src, out, t::Int8Type, |v| Some(i64::from(v))),
        DataType::Int16 => convert_primitive!(src, out, t::Int16Type, |v| Some(i64::from(v))),
        DataType::Int32 => convert_primitive!(src, out, t::Int32Type, |v| Some(i64::from(v))),
        DataType::Int64 => convert_primitive!(src, out, t::Int64Type, |v| Some(v)),
        DataType::UInt8 => convert_primitive!(src, out, t::UInt8Type, |v| Some(i64::from(v))),
        DataType::UInt16 => convert_primitive!(src, out, t::UInt16Type, |v| Some(i64::from(v))),
        DataType::UInt32 => convert_primitive!(src, out, t::UInt32Type, |v| Some(i64::from(v))),
        DataType::UInt64 => convert_primitive!(src, out, t::UInt64Type, |v| {
            let value = i64::try_from(v).ok();
            lost += usize::from(value.is_none());
            value
        }),
        DataType::Float32 => convert_primitive!(src, out, t::Float32Type, |v| {
            let value = from_f64(f64::from(v));
            lost += usize::from(value.is_none());
            value
        }),
        DataType::Float64 => convert_primitive!(src, out, t::Float64Type, |v| {
            let value = from_f64(v);
            lost += usize::from(value.is_none());
            value
        }),
        _ => return Err(src.unsupported(VectorKind::Integer64)),
    }
    if lost > 0 {
        warn!("{lost} value(s) outside 64-bit integer range set to null");
    }
    Ok(())
}
