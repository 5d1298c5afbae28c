//! Binary materializer.

use std::sync::Arc;

use arrow_array::{Array, cast::AsArray};
use arrow_schema::DataType;

use crate::{
    MaterializeError, VectorKind,
    slice::{DestSlice, SourceSlice},
};

macro_rules! copy_bytes {
    ($src:expr, $out:expr, $array:expr) => {{
        let array = $array;
        for (slot, idx) in $out.iter_mut().zip($src.rows()) {
            *slot = (!array.is_null(idx))
                .then(|| Arc::<[u8]>::from(AsRef::<[u8]>::as_ref(array.value(idx))));
        }
    }};
}

pub(super) fn materialize(
    src: &SourceSlice<'_>,
    dst: DestSlice<'_>,
) -> Result<(), MaterializeError> {
    let out = dst.blob()?;
    match src.data_type() {
        DataType::Null => out.fill(None),
        DataType::Binary => copy_bytes!(src, out, src.array().as_binary::<i32>()),
        DataType::LargeBinary => copy_bytes!(src, out, src.array().as_binary::<i64>()),
        DataType::BinaryView => copy_bytes!(src, out, src.array().as_binary_view()),
        DataType::FixedSizeBinary(_) => copy_bytes!(src, out, src.array().as_fixed_size_binary()),
        DataType::Utf8 => copy_bytes!(src, out, src.array().as_string::<i32>()),
        DataType::LargeUtf8 => copy_bytes!(src, out, src.array().as_string::<i64>()),
        _ => return Err(src.unsupported(VectorKind::Blob)),
    }
    Ok(())
}
