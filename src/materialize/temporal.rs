//! Date, timestamp and elapsed-time materializers.
//!
//! Everything is converted through seconds (or days for dates) as `f64`.

use arrow_array::{Array, cast::AsArray, types as t};
use arrow_schema::{DataType, TimeUnit};

use crate::{
    MaterializeError, VectorKind,
    slice::{DestSlice, SourceSlice},
};

const MS_PER_DAY: f64 = 86_400_000.0;
const SECS_PER_DAY: f64 = 86_400.0;

fn per_second(unit: TimeUnit) -> f64 {
    match unit {
        TimeUnit::Second => 1.0,
        TimeUnit::Millisecond => 1e3,
        TimeUnit::Microsecond => 1e6,
        TimeUnit::Nanosecond => 1e9,
    }
}

pub(super) fn materialize_date(
    src: &SourceSlice<'_>,
    dst: DestSlice<'_>,
) -> Result<(), MaterializeError> {
    let out = dst.date()?;
    match src.data_type() {
        DataType::Null => out.fill(None),
        DataType::Date32 => convert_primitive!(src, out, t::Date32Type, |v| Some(f64::from(v))),
        DataType::Date64 => {
            convert_primitive!(src, out, t::Date64Type, |v| Some(v as f64 / MS_PER_DAY))
        }
        _ => return Err(src.unsupported(VectorKind::Date)),
    }
    Ok(())
}

pub(super) fn materialize_timestamp(
    src: &SourceSlice<'_>,
    dst: DestSlice<'_>,
) -> Result<(), MaterializeError> {
    let out = dst.timestamp()?;
    match src.data_type() {
        DataType::Null => out.fill(None),
        DataType::Timestamp(unit, _) => {
            let scale = per_second(*unit);
            match unit {
                TimeUnit::Second => {
                    convert_primitive!(src, out, t::TimestampSecondType, |v| Some(v as f64))
                }
                TimeUnit::Millisecond => convert_primitive!(
                    src,
                    out,
                    t::TimestampMillisecondType,
                    |v| Some(v as f64 / scale)
                ),
                TimeUnit::Microsecond => convert_primitive!(
                    src,
                    out,
                    t::TimestampMicrosecondType,
                    |v| Some(v as f64 / scale)
                ),
                TimeUnit::Nanosecond => convert_primitive!(
                    src,
                    out,
                    t::TimestampNanosecondType,
                    |v| Some(v as f64 / scale)
                ),
            }
        }
        DataType::Date32 => {
            convert_primitive!(src, out, t::Date32Type, |v| Some(f64::from(v) * SECS_PER_DAY))
        }
        DataType::Date64 => convert_primitive!(src, out, t::Date64Type, |v| Some(v as f64 / 1e3)),
        _ => return Err(src.unsupported(VectorKind::Timestamp)),
    }
    Ok(())
}

pub(super) fn materialize_difftime(
    src: &SourceSlice<'_>,
    dst: DestSlice<'_>,
) -> Result<(), MaterializeError> {
    let (out, units) = dst.difftime()?;
    let unit_secs = units.seconds();
    match src.data_type() {
        DataType::Null => out.fill(None),
        DataType::Time32(TimeUnit::Second) => convert_primitive!(
            src,
            out,
            t::Time32SecondType,
            |v| Some(f64::from(v) / unit_secs)
        ),
        DataType::Time32(TimeUnit::Millisecond) => convert_primitive!(
            src,
            out,
            t::Time32MillisecondType,
            |v| Some(f64::from(v) / 1e3 / unit_secs)
        ),
        DataType::Time64(TimeUnit::Microsecond) => convert_primitive!(
            src,
            out,
            t::Time64MicrosecondType,
            |v| Some(v as f64 / 1e6 / unit_secs)
        ),
        DataType::Time64(TimeUnit::Nanosecond) => convert_primitive!(
            src,
            out,
            t::Time64NanosecondType,
            |v| Some(v as f64 / 1e9 / unit_secs)
        ),
        DataType::Duration(unit) => {
            let scale = per_second(*unit) * unit_secs;
            match unit {
                TimeUnit::Second => {
                    convert_primitive!(src, out, t::DurationSecondType, |v| Some(v as f64 / scale))
                }
                TimeUnit::Millisecond => convert_primitive!(
                    src,
                    out,
                    t::DurationMillisecondType,
                    |v| Some(v as f64 / scale)
                ),
                TimeUnit::Microsecond => convert_primitive!(
                    src,
                    out,
                    t::DurationMicrosecondType,
                    |v| Some(v as f64 / scale)
                ),
                TimeUnit::Nanosecond => convert_primitive!(
                    src,
                    out,
                    t::DurationNanosecondType,
                    |v| Some(v as f64 / scale)
                ),
            }
        }
        _ => return Err(src.unsupported(VectorKind::Difftime)),
    }
    Ok(())
}
