//! Native containers produced by materialization.
//!
//! Every scalar kind stores `Option<T>` slots; `None` is the null sentinel.
//! Reference kinds (`Character`, `Blob`) hold shared handles so copying a
//! value never duplicates its payload.

use std::{collections::HashMap, sync::Arc};

use crate::{MaterializeError, ptype::Ptype, ptype::TimeUnits};

/// Discriminant of a [`Vector`], used for shape checks and error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VectorKind {
    /// [`Vector::Logical`].
    Logical,
    /// [`Vector::Integer`].
    Integer,
    /// [`Vector::Double`].
    Double,
    /// [`Vector::Integer64`].
    Integer64,
    /// [`Vector::Character`].
    Character,
    /// [`Vector::Blob`].
    Blob,
    /// [`Vector::Factor`].
    Factor,
    /// [`Vector::Date`].
    Date,
    /// [`Vector::Timestamp`].
    Timestamp,
    /// [`Vector::Difftime`].
    Difftime,
    /// [`Vector::List`].
    List,
    /// [`Vector::ListOf`].
    ListOf,
    /// [`Vector::Record`].
    Record,
}

/// A materialized column.
#[derive(Debug, Clone, PartialEq)]
pub enum Vector {
    /// Nullable booleans.
    Logical(Vec<Option<bool>>),
    /// Nullable 32-bit integers.
    Integer(Vec<Option<i32>>),
    /// Nullable doubles.
    Double(Vec<Option<f64>>),
    /// Nullable 64-bit integers.
    Integer64(Vec<Option<i64>>),
    /// Nullable shared strings.
    Character(Vec<Option<Arc<str>>>),
    /// Nullable shared byte blobs.
    Blob(Vec<Option<Arc<[u8]>>>),
    /// Categorical codes (1-based) into `levels`.
    Factor {
        /// Codes; `Some(k)` refers to `levels[k - 1]`.
        codes: Vec<Option<i32>>,
        /// Category domain.
        levels: Arc<[Arc<str>]>,
    },
    /// Days since the Unix epoch.
    Date(Vec<Option<f64>>),
    /// Seconds since the Unix epoch.
    Timestamp {
        /// Values in seconds.
        seconds: Vec<Option<f64>>,
        /// Optional time zone label.
        tz: Option<Arc<str>>,
    },
    /// Elapsed time.
    Difftime {
        /// Values expressed in `units`.
        values: Vec<Option<f64>>,
        /// Units of `values`.
        units: TimeUnits,
    },
    /// Unshaped per-row values.
    List(Vec<Option<Vector>>),
    /// Ragged list whose present elements all take `ptype`.
    ListOf {
        /// Shape of every element.
        ptype: Box<Ptype>,
        /// Elements; `None` marks a null row.
        items: Vec<Option<Vector>>,
    },
    /// Ordered named columns of equal length.
    Record(Record),
}

macro_rules! vector_accessors {
    ($(($variant:ident, $getter:ident, $ty:ty, $desc:literal)),* $(,)?) => {
        $(
            #[doc = concat!("Returns the slots if this vector stores ", $desc, ".")]
            #[must_use]
            pub fn $getter(&self) -> Option<&[Option<$ty>]> {
                match self {
                    Vector::$variant(values) => Some(values),
                    _ => None,
                }
            }
        )*
    };
}

impl Vector {
    vector_accessors! {
        (Logical, as_logical, bool, "booleans"),
        (Integer, as_integer, i32, "32-bit integers"),
        (Double, as_double, f64, "doubles"),
        (Integer64, as_integer64, i64, "64-bit integers"),
        (Character, as_character, Arc<str>, "strings"),
        (Blob, as_blob, Arc<[u8]>, "blobs"),
        (Date, as_date, f64, "dates"),
        (List, as_list, Vector, "unshaped values"),
    }

    /// Returns the elements if this vector is a list-of.
    #[must_use]
    pub fn as_list_of(&self) -> Option<&[Option<Vector>]> {
        match self {
            Vector::ListOf { items, .. } => Some(items),
            _ => None,
        }
    }

    /// Returns the seconds if this vector stores timestamps.
    #[must_use]
    pub fn as_timestamp(&self) -> Option<&[Option<f64>]> {
        match self {
            Vector::Timestamp { seconds, .. } => Some(seconds),
            _ => None,
        }
    }

    /// Returns the values if this vector stores elapsed times.
    #[must_use]
    pub fn as_difftime(&self) -> Option<&[Option<f64>]> {
        match self {
            Vector::Difftime { values, .. } => Some(values),
            _ => None,
        }
    }

    /// Returns the codes if this vector is categorical.
    #[must_use]
    pub fn as_factor_codes(&self) -> Option<&[Option<i32>]> {
        match self {
            Vector::Factor { codes, .. } => Some(codes),
            _ => None,
        }
    }

    /// Returns the record if this vector is one.
    #[must_use]
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Vector::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Consume the vector, returning the record if it is one.
    #[must_use]
    pub fn into_record(self) -> Option<Record> {
        match self {
            Vector::Record(record) => Some(record),
            _ => None,
        }
    }

    /// The discriminant of this vector.
    #[must_use]
    pub fn kind(&self) -> VectorKind {
        match self {
            Vector::Logical(_) => VectorKind::Logical,
            Vector::Integer(_) => VectorKind::Integer,
            Vector::Double(_) => VectorKind::Double,
            Vector::Integer64(_) => VectorKind::Integer64,
            Vector::Character(_) => VectorKind::Character,
            Vector::Blob(_) => VectorKind::Blob,
            Vector::Factor { .. } => VectorKind::Factor,
            Vector::Date(_) => VectorKind::Date,
            Vector::Timestamp { .. } => VectorKind::Timestamp,
            Vector::Difftime { .. } => VectorKind::Difftime,
            Vector::List(_) => VectorKind::List,
            Vector::ListOf { .. } => VectorKind::ListOf,
            Vector::Record(_) => VectorKind::Record,
        }
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Vector::Logical(v) => v.len(),
            Vector::Integer(v) => v.len(),
            Vector::Double(v) | Vector::Date(v) => v.len(),
            Vector::Integer64(v) => v.len(),
            Vector::Character(v) => v.len(),
            Vector::Blob(v) => v.len(),
            Vector::Factor { codes, .. } => codes.len(),
            Vector::Timestamp { seconds, .. } => seconds.len(),
            Vector::Difftime { values, .. } => values.len(),
            Vector::List(v) | Vector::ListOf { items: v, .. } => v.len(),
            Vector::Record(record) => record.nrow(),
        }
    }

    /// Whether the vector has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether this vector is a record.
    #[must_use]
    pub fn is_record(&self) -> bool {
        matches!(self, Vector::Record(_))
    }

    /// Set `len` rows starting at `offset` to null, recursing into record columns.
    pub(crate) fn fill_null(&mut self, offset: usize, len: usize) -> Result<(), MaterializeError> {
        let end = offset
            .checked_add(len)
            .filter(|end| *end <= self.len())
            .ok_or_else(|| {
                MaterializeError::invalid(format!(
                    "null fill {offset}..{} out of bounds for length {}",
                    offset.saturating_add(len),
                    self.len()
                ))
            })?;
        match self {
            Vector::Logical(v) => v[offset..end].fill(None),
            Vector::Integer(v) => v[offset..end].fill(None),
            Vector::Double(v) | Vector::Date(v) => v[offset..end].fill(None),
            Vector::Integer64(v) => v[offset..end].fill(None),
            Vector::Character(v) => v[offset..end].fill(None),
            Vector::Blob(v) => v[offset..end].fill(None),
            Vector::Factor { codes, .. } => codes[offset..end].fill(None),
            Vector::Timestamp { seconds, .. } => seconds[offset..end].fill(None),
            Vector::Difftime { values, .. } => values[offset..end].fill(None),
            Vector::List(v) | Vector::ListOf { items: v, .. } => v[offset..end].fill(None),
            Vector::Record(record) => {
                for column in &mut record.columns {
                    column.fill_null(offset, len)?;
                }
            }
        }
        Ok(())
    }

    /// Shorten the vector to `len` rows, regenerating record row counts.
    pub(crate) fn truncate(&mut self, len: usize) {
        match self {
            Vector::Logical(v) => v.truncate(len),
            Vector::Integer(v) => v.truncate(len),
            Vector::Double(v) | Vector::Date(v) => v.truncate(len),
            Vector::Integer64(v) => v.truncate(len),
            Vector::Character(v) => v.truncate(len),
            Vector::Blob(v) => v.truncate(len),
            Vector::Factor { codes, .. } => codes.truncate(len),
            Vector::Timestamp { seconds, .. } => seconds.truncate(len),
            Vector::Difftime { values, .. } => values.truncate(len),
            Vector::List(v) | Vector::ListOf { items: v, .. } => v.truncate(len),
            Vector::Record(record) => {
                for column in &mut record.columns {
                    column.truncate(len);
                }
                record.nrow = record.nrow.min(len);
            }
        }
    }
}

/// Ordered named columns sharing one row count.
///
/// The row count is the record's positional identity: it is regenerated on
/// every allocation rather than copied from a shape.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    pub(crate) names: Vec<String>,
    pub(crate) columns: Vec<Vector>,
    pub(crate) metadata: HashMap<String, String>,
    pub(crate) nrow: usize,
}

impl Record {
    /// Build a record from names and equally long columns.
    pub fn try_new(names: Vec<String>, columns: Vec<Vector>) -> Result<Self, MaterializeError> {
        if names.len() != columns.len() {
            return Err(MaterializeError::invalid(format!(
                "record has {} names but {} columns",
                names.len(),
                columns.len()
            )));
        }
        let nrow = columns.first().map_or(0, Vector::len);
        if let Some(bad) = columns.iter().position(|c| c.len() != nrow) {
            return Err(MaterializeError::invalid(format!(
                "record column {bad} has {} rows, expected {nrow}",
                columns[bad].len()
            )));
        }
        Ok(Self {
            names,
            columns,
            metadata: HashMap::new(),
            nrow,
        })
    }

    /// Build a record with no columns and `nrow` rows.
    #[must_use]
    pub fn empty(nrow: usize) -> Self {
        Self {
            nrow,
            ..Self::default()
        }
    }

    /// Number of rows.
    #[must_use]
    pub fn nrow(&self) -> usize {
        self.nrow
    }

    /// Number of columns.
    #[must_use]
    pub fn ncol(&self) -> usize {
        self.columns.len()
    }

    /// Column names in order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Columns in order.
    #[must_use]
    pub fn columns(&self) -> &[Vector] {
        &self.columns
    }

    /// Column at position `i`.
    #[must_use]
    pub fn column(&self, i: usize) -> Option<&Vector> {
        self.columns.get(i)
    }

    /// First column named `name`.
    #[must_use]
    pub fn column_by_name(&self, name: &str) -> Option<&Vector> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| &self.columns[i])
    }

    /// Metadata carried over from the record's shape.
    #[must_use]
    pub fn metadata(&self) -> &HashMap<String, String> {
        &self.metadata
    }
}
