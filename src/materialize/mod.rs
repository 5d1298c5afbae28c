//! Materializers and the conversion dispatcher.
//!
//! Each scalar materializer converts one window of a primitive array into a
//! window of a destination vector and reports `NotSupported` for storage types
//! it has no path for. Nested materializers live on [`Converter`] because they
//! drive child nodes of the converter tree.

use log::debug;

use crate::{
    MaterializeError, UnsupportedPolicy, Vector, VectorKind,
    converter::{Converter, NodeId},
    slice::{DestSlice, SourceSlice},
};

/// Convert every row of a primitive array window into `$out`.
///
/// `$conv` maps a non-null native value to the destination slot; nulls map to
/// `None`.
macro_rules! convert_primitive {
    ($src:expr, $out:expr, $arrow_ty:ty, |$v:ident| $conv:expr) => {{
        let array = $src.array().as_primitive::<$arrow_ty>();
        for (slot, idx) in $out.iter_mut().zip($src.rows()) {
            *slot = if array.is_null(idx) {
                None
            } else {
                let $v = array.value(idx);
                $conv
            };
        }
    }};
}

mod blob;
mod character;
mod double;
mod int64;
mod integer;
mod list_of;
mod logical;
mod record;
mod temporal;

impl Converter {
    /// Materialize node `id` into its destination window of `dst`.
    ///
    /// Extension types go straight to the fallback. Otherwise the native path
    /// runs first and a retryable failure is retried once through the
    /// fallback. Whatever the fallback path reports is final.
    pub(crate) fn materialize(
        &mut self,
        id: NodeId,
        dst: &mut Vector,
    ) -> Result<(), MaterializeError> {
        if let Some(name) = self.nodes[id].field.extension_type_name() {
            debug!(
                "field '{}' has extension type '{name}', using fallback",
                self.nodes[id].field.name()
            );
            return self
                .materialize_fallback(id, dst)
                .map_err(MaterializeError::into_fatal);
        }

        match self.materialize_native(id, dst) {
            Err(err) if err.is_retryable() && self.can_fall_back() => {
                debug!(
                    "native conversion of field '{}' failed ({err}), retrying with fallback",
                    self.nodes[id].field.name()
                );
                self.materialize_fallback(id, dst)
                    .map_err(MaterializeError::into_fatal)
            }
            other => other,
        }
    }

    fn can_fall_back(&self) -> bool {
        self.fallback.is_some() && self.options.unsupported == UnsupportedPolicy::Fallback
    }

    fn materialize_native(&mut self, id: NodeId, dst: &mut Vector) -> Result<(), MaterializeError> {
        let node = &self.nodes[id];
        let array = node
            .array
            .clone()
            .ok_or_else(|| MaterializeError::invalid("no array bound to converter node"))?;
        if node.src.length != node.dst.length {
            return Err(MaterializeError::invalid(format!(
                "source length {} does not match destination length {}",
                node.src.length, node.dst.length
            )));
        }
        let kind = node.ptype.kind();
        let src = SourceSlice::new(&array, node.src)?;
        let dst = DestSlice::new(dst, node.dst)?;

        match kind {
            VectorKind::Logical => logical::materialize(&src, dst),
            VectorKind::Integer => integer::materialize(&src, dst),
            VectorKind::Double => double::materialize(&src, dst),
            VectorKind::Integer64 => int64::materialize(&src, dst),
            VectorKind::Character => character::materialize(&src, dst),
            VectorKind::Blob => blob::materialize(&src, dst),
            VectorKind::Date => temporal::materialize_date(&src, dst),
            VectorKind::Timestamp => temporal::materialize_timestamp(&src, dst),
            VectorKind::Difftime => temporal::materialize_difftime(&src, dst),
            VectorKind::ListOf => self.materialize_list_of(id, &src, dst),
            VectorKind::Record => self.materialize_record(id, &src, dst),
            VectorKind::Factor | VectorKind::List => Err(src.unsupported(kind)),
        }
    }
}
