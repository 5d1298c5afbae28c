//! Converter tree: one node per schema position, stored in a single arena.
//!
//! The tree is built once from a field and a target shape, rebound to each
//! chunk with [`Converter::set_array`], and driven with the incremental
//! protocol (`reserve`, `materialize_n`, `finalize`, `release_result`).

use std::sync::Arc;

use arrow_array::{Array, ArrayRef, RecordBatch, StructArray, cast::AsArray};
use arrow_schema::{DataType, Field, FieldRef};
use log::trace;

use crate::{
    MaterializeError, MaterializeOptions, Ptype, Vector,
    alloc::allocate,
    fallback::FallbackConverter,
    slice::Window,
};

/// Index of a node in the converter arena.
pub(crate) type NodeId = usize;

const ROOT: NodeId = 0;

/// One converter node.
pub(crate) struct Node {
    pub(crate) field: FieldRef,
    pub(crate) ptype: Ptype,
    /// Array bound by the most recent rebind.
    pub(crate) array: Option<ArrayRef>,
    pub(crate) src: Window,
    pub(crate) dst: Window,
    pub(crate) children: Vec<NodeId>,
}

/// A result being filled by the incremental protocol.
#[derive(Default)]
pub(crate) struct PartialResult {
    result: Option<Vector>,
    size: usize,
    capacity: usize,
}

impl PartialResult {
    pub(crate) fn reserve(
        &mut self,
        ptype: &Ptype,
        additional: usize,
    ) -> Result<(), MaterializeError> {
        if self.result.is_some() {
            return Err(MaterializeError::invalid(
                "reallocation of a pending result is not implemented",
            ));
        }
        self.result = Some(allocate(ptype, additional)?);
        self.size = 0;
        self.capacity = additional;
        Ok(())
    }

    pub(crate) fn finalize(&mut self) {
        if self.size != self.capacity {
            if let Some(result) = self.result.as_mut() {
                result.truncate(self.size);
            }
            self.capacity = self.size;
        }
    }

    pub(crate) fn release(&mut self) -> Option<Vector> {
        self.size = 0;
        self.capacity = 0;
        self.result.take()
    }
}

/// Converts Arrow arrays of one field into [`Vector`]s of one shape.
///
/// A converter is not reentrant: reuse across chunks is sequential (rebind,
/// convert, rebind the next chunk).
pub struct Converter {
    pub(crate) nodes: Vec<Node>,
    pub(crate) options: MaterializeOptions,
    pub(crate) fallback: Option<Box<dyn FallbackConverter>>,
    result: PartialResult,
}

impl Converter {
    /// Build the converter tree for `field` and `ptype`.
    ///
    /// `Ptype::Unspecified` (at any depth) is replaced by the shape inferred
    /// from the storage type. Struct and union fields paired with a record
    /// shape must have as many children as the record has columns.
    pub fn try_new(
        field: impl Into<FieldRef>,
        ptype: Ptype,
        options: MaterializeOptions,
    ) -> Result<Self, MaterializeError> {
        let mut nodes = Vec::new();
        push_node(&mut nodes, field.into(), ptype, &options)?;
        Ok(Self {
            nodes,
            options,
            fallback: None,
            result: PartialResult::default(),
        })
    }

    /// Install the converter used for extension types and unsupported conversions.
    #[must_use]
    pub fn with_fallback<F>(mut self, fallback: F) -> Self
    where
        F: FallbackConverter + 'static,
    {
        self.fallback = Some(Box::new(fallback));
        self
    }

    /// The field this converter was built for.
    #[must_use]
    pub fn field(&self) -> &FieldRef {
        &self.nodes[ROOT].field
    }

    /// The resolved target shape.
    #[must_use]
    pub fn ptype(&self) -> &Ptype {
        &self.nodes[ROOT].ptype
    }

    /// Options shared by every node.
    #[must_use]
    pub fn options(&self) -> &MaterializeOptions {
        &self.options
    }

    /// Bind a new chunk, rebinding every child node and resetting the read position.
    pub fn set_array(&mut self, array: ArrayRef) -> Result<(), MaterializeError> {
        let expected = self.nodes[ROOT].field.data_type();
        if array.data_type() != expected {
            return Err(MaterializeError::invalid(format!(
                "array type {:?} does not match field type {expected:?}",
                array.data_type()
            )));
        }
        trace!("binding array of length {} to converter", array.len());
        self.bind(ROOT, array);
        Ok(())
    }

    /// Allocate a result of `additional` rows.
    pub fn reserve(&mut self, additional: usize) -> Result<(), MaterializeError> {
        self.result.reserve(&self.nodes[ROOT].ptype, additional)
    }

    /// Convert up to `n` rows from the current position of the bound array.
    ///
    /// The count is clamped to the remaining capacity and the remaining rows;
    /// the number of rows converted is returned.
    pub fn materialize_n(&mut self, n: usize) -> Result<usize, MaterializeError> {
        let mut part = std::mem::take(&mut self.result);
        let converted = self.materialize_node_n(ROOT, &mut part, n);
        self.result = part;
        converted
    }

    /// Shrink the result to the rows materialized so far.
    pub fn finalize(&mut self) -> Result<(), MaterializeError> {
        if self.result.result.is_none() {
            return Err(MaterializeError::invalid("no result to finalize"));
        }
        self.result.finalize();
        Ok(())
    }

    /// Hand over the result and reset the converter for the next one.
    pub fn release_result(&mut self) -> Option<Vector> {
        self.result.release()
    }

    /// Convert a whole array into a new vector.
    pub fn convert_array(&mut self, array: ArrayRef) -> Result<Vector, MaterializeError> {
        self.convert_chunks(std::iter::once(array))
    }

    /// Convert a sequence of chunks into one vector of their combined length.
    ///
    /// Fails without touching it if a result is already pending. Once the
    /// result is reserved, any error discards it.
    pub fn convert_chunks<I>(&mut self, chunks: I) -> Result<Vector, MaterializeError>
    where
        I: IntoIterator<Item = ArrayRef>,
    {
        let chunks: Vec<ArrayRef> = chunks.into_iter().collect();
        let total = chunks.iter().map(|c| c.len()).sum();
        self.reserve(total)?;
        let converted = self.fill_chunks(chunks);
        let result = self.release_result();
        converted?;
        result.ok_or_else(|| MaterializeError::invalid("conversion produced no result"))
    }

    fn fill_chunks(&mut self, chunks: Vec<ArrayRef>) -> Result<(), MaterializeError> {
        for chunk in chunks {
            let len = chunk.len();
            self.set_array(chunk)?;
            let converted = self.materialize_n(len)?;
            if converted != len {
                return Err(MaterializeError::invalid(format!(
                    "expected to materialize {len} rows, got {converted}"
                )));
            }
        }
        self.finalize()
    }

    /// Node-level `materialize_n`: convert from the node's source position
    /// into `part` at its current size.
    pub(crate) fn materialize_node_n(
        &mut self,
        id: NodeId,
        part: &mut PartialResult,
        n: usize,
    ) -> Result<usize, MaterializeError> {
        let node = &self.nodes[id];
        let remaining = node
            .array
            .as_ref()
            .map_or(0, |a| a.len().saturating_sub(node.src.offset));
        let n = n.min(part.capacity - part.size).min(remaining);
        if n == 0 {
            return Ok(0);
        }

        let mut result = part
            .result
            .take()
            .ok_or_else(|| MaterializeError::invalid("no result reserved"))?;
        let node = &mut self.nodes[id];
        node.src.length = n;
        node.dst = Window::new(part.size, n);
        let status = self.materialize(id, &mut result);
        part.result = Some(result);
        status?;

        self.nodes[id].src.offset += n;
        part.size += n;
        Ok(n)
    }

    fn bind(&mut self, id: NodeId, array: ArrayRef) {
        let n_children = self.nodes[id].children.len();
        if n_children > 0 {
            match array.data_type() {
                DataType::Struct(_) => {
                    let columns = array.as_struct().columns();
                    for (i, column) in columns.iter().enumerate().take(n_children) {
                        let child = self.nodes[id].children[i];
                        self.bind(child, Arc::clone(column));
                    }
                }
                DataType::Union(fields, _) => {
                    let union = array.as_union();
                    for (i, (type_id, _)) in fields.iter().enumerate().take(n_children) {
                        let child = self.nodes[id].children[i];
                        self.bind(child, Arc::clone(union.child(type_id)));
                    }
                }
                DataType::List(_) => {
                    let child = self.nodes[id].children[0];
                    self.bind(child, Arc::clone(array.as_list::<i32>().values()));
                }
                DataType::LargeList(_) => {
                    let child = self.nodes[id].children[0];
                    self.bind(child, Arc::clone(array.as_list::<i64>().values()));
                }
                DataType::FixedSizeList(_, _) => {
                    let child = self.nodes[id].children[0];
                    self.bind(child, Arc::clone(array.as_fixed_size_list().values()));
                }
                DataType::Map(_, _) => {
                    let child = self.nodes[id].children[0];
                    let entries: ArrayRef = Arc::new(array.as_map().entries().clone());
                    self.bind(child, entries);
                }
                _ => {}
            }
        }
        let node = &mut self.nodes[id];
        node.array = Some(array);
        node.src = Window::default();
        node.dst = Window::default();
    }
}

impl std::fmt::Debug for Converter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Converter")
            .field("field", self.field())
            .field("ptype", self.ptype())
            .field("nodes", &self.nodes.len())
            .field("options", &self.options)
            .field("has_fallback", &self.fallback.is_some())
            .finish()
    }
}

fn push_node(
    nodes: &mut Vec<Node>,
    field: FieldRef,
    ptype: Ptype,
    options: &MaterializeOptions,
) -> Result<NodeId, MaterializeError> {
    let ptype = match ptype {
        Ptype::Unspecified => Ptype::infer(&field, options),
        given => given,
    };
    let specs = child_specs(&field, &ptype)?;

    let id = nodes.len();
    nodes.push(Node {
        field,
        ptype,
        array: None,
        src: Window::default(),
        dst: Window::default(),
        children: Vec::with_capacity(specs.len()),
    });
    for (child_field, child_ptype) in specs {
        let child = push_node(nodes, child_field, child_ptype, options)?;
        nodes[id].children.push(child);
    }
    Ok(id)
}

/// Pair schema children with shape children for nested conversions.
fn child_specs(field: &Field, ptype: &Ptype) -> Result<Vec<(FieldRef, Ptype)>, MaterializeError> {
    match (ptype, field.data_type()) {
        (Ptype::Record(record), DataType::Struct(fields)) => {
            check_width(field, fields.len(), record.len())?;
            Ok(fields
                .iter()
                .zip(&record.fields)
                .map(|(f, p)| (Arc::clone(f), p.ptype.clone()))
                .collect())
        }
        (Ptype::Record(record), DataType::Union(fields, _)) => {
            check_width(field, fields.len(), record.len())?;
            Ok(fields
                .iter()
                .zip(&record.fields)
                .map(|((_, f), p)| (Arc::clone(f), p.ptype.clone()))
                .collect())
        }
        (
            Ptype::ListOf(item),
            DataType::List(f)
            | DataType::LargeList(f)
            | DataType::FixedSizeList(f, _)
            | DataType::Map(f, _),
        ) => Ok(vec![(Arc::clone(f), item.as_ref().clone())]),
        _ => Ok(Vec::new()),
    }
}

fn check_width(field: &Field, children: usize, columns: usize) -> Result<(), MaterializeError> {
    if children != columns {
        return Err(MaterializeError::invalid(format!(
            "field '{}' has {children} children but the record shape has {columns} columns",
            field.name()
        )));
    }
    Ok(())
}

/// Convert one array with a fresh converter and no fallback.
pub fn convert_array(array: ArrayRef, ptype: Ptype) -> Result<Vector, MaterializeError> {
    let field = Field::new("", array.data_type().clone(), true);
    Converter::try_new(field, ptype, MaterializeOptions::default())?.convert_array(array)
}

/// Convert a record batch into a record, carrying the schema metadata when
/// the shape is inferred.
pub fn convert_record_batch(batch: &RecordBatch, ptype: Ptype) -> Result<Vector, MaterializeError> {
    let schema = batch.schema();
    let field = Field::new("", DataType::Struct(schema.fields().clone()), false);
    let options = MaterializeOptions::default();
    let ptype = match ptype {
        Ptype::Unspecified => match Ptype::infer(&field, &options) {
            Ptype::Record(mut record) => {
                record.metadata = schema.metadata().clone();
                Ptype::Record(record)
            }
            other => other,
        },
        given => given,
    };
    let array: ArrayRef = Arc::new(StructArray::from(batch.clone()));
    Converter::try_new(field, ptype, options)?.convert_array(array)
}
