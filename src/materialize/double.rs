//! Double materializer.

use arrow_array::{Array, cast::AsArray, types as t};
use arrow_schema::DataType;
use half::f16;
use log::warn;

use crate::{
    MaterializeError, VectorKind,
    slice::{DestSlice, SourceSlice},
};

/// Largest magnitude at which every integer is exactly representable.
const EXACT: u64 = 1 << 53;

pub(super) fn materialize(
    src: &SourceSlice<'_>,
    dst: DestSlice<'_>,
) -> Result<(), MaterializeError> {
    let out = dst.double()?;
    let mut inexact = 0usize;
    match src.data_type() {
        DataType::Null => out.fill(None),
        DataType::Boolean => {
            let array = src.array().as_boolean();
            for (slot, idx) in out.iter_mut().zip(src.rows()) {
                *slot = (!array.is_null(idx)).then(|| f64::from(u8::from(array.value(idx))));
            }
        }
        DataType::Int8 => convert_primitive!(src, out, t::Int8Type, |v| Some(f64::from(v))),
        DataType::Int16 => convert_primitive!(src, out, t::Int16Type, |v| Some(f64::from(v))),
        DataType::Int32 => convert_primitive!(src, out, t::Int32Type, |v| Some(f64::from(v))),
        DataType::UInt8 => convert_primitive!(src, out, t::UInt8Type, |v| Some(f64::from(v))),
        DataType::UInt16 => convert_primitive!(src, out, t::UInt16Type, |v| Some(f64::from(v))),
        DataType::UInt32 => convert_primitive!(src, out, t::UInt32Type, |v| Some(f64::from(v))),
        DataType::Int64 => convert_primitive!(src, out, t::Int64Type, |v| {
            inexact += usize::from(v.unsigned_abs() > EXACT);
            Some(v as f64)
        }),
        DataType::UInt64 => convert_primitive!(src, out, t::UInt64Type, |v| {
            inexact += usize::from(v > EXACT);
            Some(v as f64)
        }),
        DataType::Float16 => convert_primitive!(src, out, t::Float16Type, |v| Some(f16::to_f64(v))),
        DataType::Float32 => convert_primitive!(src, out, t::Float32Type, |v| Some(f64::from(v))),
        DataType::Float64 => convert_primitive!(src, out, t::Float64Type, |v| Some(v)),
        DataType::Decimal128(_, scale) => {
            let divisor = 10f64.powi(i32::from(*scale));
            convert_primitive!(src, out, t::Decimal128Type, |v| Some(v as f64 / divisor))
        }
        _ => return Err(src.unsupported(VectorKind::Double)),
    }
    if inexact > 0 {
        warn!("{inexact} value(s) may have incurred loss of precision in conversion to double");
    }
    Ok(())
}
