#![deny(missing_docs)]
//! arrow-materialize: convert Arrow arrays into native vectors.
//!
//! A [`Converter`] is built once from a schema `Field` and a target shape
//! ([`Ptype`]). It mirrors the nested type as a tree of conversion nodes and
//! can be rebound to successive chunks of a stream. Types the crate cannot map
//! natively are handed to an injected [`FallbackConverter`].

mod alloc;
mod converter;
mod error;
mod fallback;
mod materialize;
mod options;
mod ptype;
mod slice;
mod vector;

// Re-export Arrow crates so downstream users don't need to depend on Arrow directly.
pub use arrow_array;
pub use arrow_buffer;
pub use arrow_schema;

pub use alloc::allocate;
pub use converter::{Converter, convert_array, convert_record_batch};
pub use error::{BoxError, MaterializeError};
pub use fallback::{FallbackConverter, FallbackRequest};
pub use options::{Int64Policy, MaterializeOptions, UnsupportedPolicy};
pub use ptype::{Ptype, PtypeField, RecordType, TimeUnits};
pub use vector::{Record, Vector, VectorKind};
