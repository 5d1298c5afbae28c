//! List-of materializer.
//!
//! Every non-null row is an independent conversion pass of the element
//! converter over that row's sub-range, producing a ragged result.

use arrow_array::{OffsetSizeTrait, cast::AsArray};
use arrow_buffer::ArrowNativeType;
use arrow_schema::DataType;

use crate::{
    MaterializeError, Vector,
    converter::{Converter, NodeId, PartialResult},
    slice::{DestSlice, SourceSlice},
};

fn offset_range<O: OffsetSizeTrait>(offsets: &[O], row: usize) -> (usize, usize) {
    let start = offsets[row].as_usize();
    let end = offsets[row + 1].as_usize();
    (start, end - start)
}

impl Converter {
    pub(super) fn materialize_list_of(
        &mut self,
        id: NodeId,
        src: &SourceSlice<'_>,
        dst: DestSlice<'_>,
    ) -> Result<(), MaterializeError> {
        let items = dst.list_of()?;
        match src.data_type() {
            // Every row stays at its default.
            DataType::Null => return Ok(()),
            DataType::Dictionary(_, _) => {
                return Err(MaterializeError::invalid(
                    "dictionary-encoded list arrays are not supported",
                ));
            }
            _ => {}
        }

        let child = self.element_node(id)?;
        match src.data_type() {
            DataType::List(_) => {
                let offsets = src.array().as_list::<i32>().value_offsets();
                self.materialize_rows(child, src, items, |row| offset_range(offsets, row))
            }
            DataType::LargeList(_) => {
                let offsets = src.array().as_list::<i64>().value_offsets();
                self.materialize_rows(child, src, items, |row| offset_range(offsets, row))
            }
            DataType::Map(_, _) => {
                let offsets = src.array().as_map().value_offsets();
                self.materialize_rows(child, src, items, |row| offset_range(offsets, row))
            }
            DataType::FixedSizeList(_, _) => {
                let list = src.array().as_fixed_size_list();
                let stride = list.value_length().as_usize();
                self.materialize_rows(child, src, items, |row| {
                    (list.value_offset(row).as_usize(), stride)
                })
            }
            other => Err(MaterializeError::invalid(format!(
                "cannot materialize {other:?} as a list-of"
            ))),
        }
    }

    fn element_node(&self, id: NodeId) -> Result<NodeId, MaterializeError> {
        self.nodes[id]
            .children
            .first()
            .copied()
            .ok_or_else(|| MaterializeError::invalid("list-of node has no element converter"))
    }

    fn materialize_rows<F>(
        &mut self,
        child: NodeId,
        src: &SourceSlice<'_>,
        items: &mut [Option<Vector>],
        resolve: F,
    ) -> Result<(), MaterializeError>
    where
        F: Fn(usize) -> (usize, usize),
    {
        for (slot, row) in items.iter_mut().zip(src.rows()) {
            if src.is_null(row) {
                continue;
            }
            let (offset, length) = resolve(row);
            *slot = Some(self.materialize_element(child, offset, length)?);
        }
        Ok(())
    }

    /// Run the element subtree over `offset..offset + length` into a fresh container.
    fn materialize_element(
        &mut self,
        child: NodeId,
        offset: usize,
        length: usize,
    ) -> Result<Vector, MaterializeError> {
        let mut part = PartialResult::default();
        // Allocation failures abort the whole conversion.
        part.reserve(&self.nodes[child].ptype, length)?;
        self.nodes[child].src.offset = offset;

        let converted = self.materialize_node_n(child, &mut part, length)?;
        if converted != length {
            return Err(MaterializeError::invalid(format!(
                "expected {length} list elements, materialized {converted}"
            )));
        }
        part.finalize();
        part.release()
            .ok_or_else(|| MaterializeError::invalid("list element produced no result"))
    }
}
