//! String materializer.

use std::sync::Arc;

use arrow_array::{Array, cast::AsArray, types as t};
use arrow_schema::DataType;

use crate::{
    MaterializeError, VectorKind,
    slice::{DestSlice, SourceSlice},
};

pub(super) fn materialize(
    src: &SourceSlice<'_>,
    dst: DestSlice<'_>,
) -> Result<(), MaterializeError> {
    let out = dst.character()?;
    match src.data_type() {
        DataType::Null => out.fill(None),
        DataType::Utf8 => {
            let array = src.array().as_string::<i32>();
            for (slot, idx) in out.iter_mut().zip(src.rows()) {
                *slot = (!array.is_null(idx)).then(|| Arc::from(array.value(idx)));
            }
        }
        DataType::LargeUtf8 => {
            let array = src.array().as_string::<i64>();
            for (slot, idx) in out.iter_mut().zip(src.rows()) {
                *slot = (!array.is_null(idx)).then(|| Arc::from(array.value(idx)));
            }
        }
        DataType::Utf8View => {
            let array = src.array().as_string_view();
            for (slot, idx) in out.iter_mut().zip(src.rows()) {
                *slot = (!array.is_null(idx)).then(|| Arc::from(array.value(idx)));
            }
        }
        // Integer storage is rendered as decimal text.
        DataType::Int8 => convert_primitive!(src, out, t::Int8Type, |v| Some(v.to_string().into())),
        DataType::Int16 => {
            convert_primitive!(src, out, t::Int16Type, |v| Some(v.to_string().into()))
        }
        DataType::Int32 => {
            convert_primitive!(src, out, t::Int32Type, |v| Some(v.to_string().into()))
        }
        DataType::Int64 => {
            convert_primitive!(src, out, t::Int64Type, |v| Some(v.to_string().into()))
        }
        DataType::UInt8 => {
            convert_primitive!(src, out, t::UInt8Type, |v| Some(v.to_string().into()))
        }
        DataType::UInt16 => {
            convert_primitive!(src, out, t::UInt16Type, |v| Some(v.to_string().into()))
        }
        DataType::UInt32 => {
            convert_primitive!(src, out, t::UInt32Type, |v| Some(v.to_string().into()))
        }
        DataType::UInt64 => {
            convert_primitive!(src, out, t::UInt64Type, |v| Some(v.to_string().into()))
        }
        _ => return Err(src.unsupported(VectorKind::Character)),
    }
    Ok(())
}
