//! Record materializer for struct and union storage.

use arrow_array::cast::AsArray;
use arrow_schema::{DataType, UnionFields};

use crate::{
    MaterializeError, VectorKind,
    converter::{Converter, NodeId},
    slice::{DestSlice, SourceSlice, Window},
};

/// Map union type ids (0..=127) to child positions.
fn type_id_table(fields: &UnionFields) -> [Option<usize>; 128] {
    let mut table = [None; 128];
    for (idx, (type_id, _)) in fields.iter().enumerate() {
        if let Ok(slot) = usize::try_from(type_id) {
            table[slot] = Some(idx);
        }
    }
    table
}

impl Converter {
    pub(super) fn materialize_record(
        &mut self,
        id: NodeId,
        src: &SourceSlice<'_>,
        dst: DestSlice<'_>,
    ) -> Result<(), MaterializeError> {
        match src.data_type() {
            DataType::Struct(_) => self.materialize_struct(id, src, dst),
            DataType::Union(fields, _) => self.materialize_union(id, fields, src, dst),
            DataType::Dictionary(_, _) => Err(MaterializeError::invalid(
                "dictionary-encoded struct or union arrays are not supported",
            )),
            _ => Err(src.unsupported(VectorKind::Record)),
        }
    }

    /// Convert every child column over the parent's window; children are independent.
    fn materialize_struct(
        &mut self,
        id: NodeId,
        src: &SourceSlice<'_>,
        dst: DestSlice<'_>,
    ) -> Result<(), MaterializeError> {
        let (record, window) = dst.record()?;
        let n_children = self.nodes[id].children.len();
        if n_children != record.columns.len() {
            return Err(MaterializeError::invalid(format!(
                "expected record with {n_children} columns, got {}",
                record.columns.len()
            )));
        }

        let src_window = Window::new(src.offset(), src.len());
        for (i, column) in record.columns.iter_mut().enumerate() {
            let child = self.nodes[id].children[i];
            self.nodes[child].src = src_window;
            self.nodes[child].dst = window;
            self.materialize(child, column)?;
        }
        Ok(())
    }

    /// Null-fill the window, then convert each row from the child its type id selects.
    fn materialize_union(
        &mut self,
        id: NodeId,
        fields: &UnionFields,
        src: &SourceSlice<'_>,
        dst: DestSlice<'_>,
    ) -> Result<(), MaterializeError> {
        let (record, window) = dst.record()?;
        let n_children = self.nodes[id].children.len();
        if n_children != record.columns.len() || n_children != fields.len() {
            return Err(MaterializeError::invalid(format!(
                "expected record with {} columns for union, got {}",
                fields.len(),
                record.columns.len()
            )));
        }
        for column in &mut record.columns {
            column.fill_null(window.offset, window.length)?;
        }

        let union = src.array().as_union();
        let table = type_id_table(fields);
        let offsets = union.offsets();
        for (i, row) in src.rows().enumerate() {
            let type_id = union.type_id(row);
            let child_index = usize::try_from(type_id)
                .ok()
                .and_then(|slot| table.get(slot).copied().flatten())
                .ok_or_else(|| {
                    MaterializeError::invalid(format!("unknown union type id {type_id}"))
                })?;
            let child_offset = match offsets {
                Some(offsets) => usize::try_from(offsets[row]).map_err(|_| {
                    MaterializeError::invalid(format!("negative union offset at row {row}"))
                })?,
                None => row,
            };

            let child = self.nodes[id].children[child_index];
            self.nodes[child].src = Window::new(child_offset, 1);
            self.nodes[child].dst = Window::new(window.offset + i, 1);
            self.materialize(child, &mut record.columns[child_index])?;
        }
        Ok(())
    }
}
