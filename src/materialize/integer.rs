//! 32-bit integer materializer.
//!
//! Storage wider than `i32` is range-checked: values that do not fit (and
//! non-finite floats) become null, with one warning per window.

use arrow_array::{Array, cast::AsArray, types as t};
use arrow_schema::DataType;
use log::warn;

use crate::{
    MaterializeError, VectorKind,
    slice::{DestSlice, SourceSlice},
};

const MIN: f64 = i32::MIN as f64;
const MAX: f64 = i32::MAX as f64;

fn from_f64(v: f64) -> Option<i32> {
    // Truncates toward zero; the bounds admit every value that truncates into range.
    (v.is_finite() && v > MIN - 1.0 && v < MAX + 1.0).then(|| v as i32)
}

pub(super) fn materialize(
    src: &SourceSlice<'_>,
    dst: DestSlice<'_>,
) -> Result<(), MaterializeError> {
    let out = dst.integer()?;
    let mut lost = 0usize;
    match src.data_type() {
        DataType::Null => out.fill(None),
        DataType::Boolean => {
            let array = src.array().as_boolean();
            for (slot, idx) in out.iter_mut().zip(src.rows()) {
                *slot = (!array.is_null(idx)).then(|| i32::from(array.value(idx)));
            }
        }
        DataType::Int8 => convert_primitive!(src, out, t::Int8Type, |v| Some(i32::from(v))),
        DataType::Int16 => convert_primitive!(src, out, t::Int16Type, |v| Some(i32::from(v))),
        DataType::Int32 => convert_primitive!(src, out, t::Int32Type, |v| Some(v)),
        DataType::UInt8 => convert_primitive!(src, out, t::UInt8Type, |v| Some(i32::from(v))),
        DataType::UInt16 => convert_primitive!(src, out, t::UInt16Type, |v| Some(i32::from(v))),
        DataType::Int64 => convert_primitive!(src, out, t::Int64Type, |v| {
            let value = i32::try_from(v).ok();
            lost += usize::from(value.is_none());
            value
        }),
        DataType::UInt32 => convert_primitive!(src, out, t::UInt32Type, |v| {
            let value = i32::try_from(v).ok();
            lost += usize::from(value.is_none());
            value
        }),
        DataType::UInt64 => convert_primitive!(src, out, t::UInt64Type, |v| {
            let value = i32::try_from(v).ok();
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
        _ => return Err(src.unsupported(VectorKind::Integer)),
    }
    if lost > 0 {
        warn!("{lost} value(s) outside integer range set to null");
    }
    Ok(())
}
