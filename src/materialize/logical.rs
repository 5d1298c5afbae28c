//! Boolean materializer.

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
    let out = dst.logical()?;
    match src.data_type() {
        DataType::Null => out.fill(None),
        DataType::Boolean => {
            let array = src.array().as_boolean();
            for (slot, idx) in out.iter_mut().zip(src.rows()) {
                *slot = (!array.is_null(idx)).then(|| array.value(idx));
            }
        }
        DataType::Int8 => convert_primitive!(src, out, t::Int8Type, |v| Some(v != 0)),
        DataType::Int16 => convert_primitive!(src, out, t::Int16Type, |v| Some(v != 0)),
        DataType::Int32 => convert_primitive!(src, out, t::Int32Type, |v| Some(v != 0)),
        DataType::Int64 => convert_primitive!(src, out, t::Int64Type, |v| Some(v != 0)),
        DataType::UInt8 => convert_primitive!(src, out, t::UInt8Type, |v| Some(v != 0)),
        DataType::UInt16 => convert_primitive!(src, out, t::UInt16Type, |v| Some(v != 0)),
        DataType::UInt32 => convert_primitive!(src, out, t::UInt32Type, |v| Some(v != 0)),
        DataType::UInt64 => convert_primitive!(src, out, t::UInt64Type, |v| Some(v != 0)),
        DataType::Float32 => convert_primitive!(src, out, t::Float32Type, |v| Some(v != 0.0)),
        DataType::Float64 => convert_primitive!(src, out, t::Float64Type, |v| Some(v != 0.0)),
        _ => return Err(src.unsupported(VectorKind::Logical)),
    }
    Ok(())
}
