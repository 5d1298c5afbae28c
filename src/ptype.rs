//! Target shape descriptors and default inference from Arrow storage types.

use std::{collections::HashMap, sync::Arc};

use arrow_schema::{DataType, Field};

use crate::{
    options::{Int64Policy, MaterializeOptions},
    vector::VectorKind,
};

/// Units carried by a [`Ptype::Difftime`] shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeUnits {
    /// Seconds.
    #[default]
    Secs,
    /// Minutes.
    Mins,
    /// Hours.
    Hours,
    /// Days.
    Days,
    /// Weeks.
    Weeks,
}

impl TimeUnits {
    /// Number of seconds in one unit.
    #[must_use]
    pub fn seconds(self) -> f64 {
        match self {
            TimeUnits::Secs => 1.0,
            TimeUnits::Mins => 60.0,
            TimeUnits::Hours => 3_600.0,
            TimeUnits::Days => 86_400.0,
            TimeUnits::Weeks => 604_800.0,
        }
    }
}

/// A named child of a [`RecordType`].
#[derive(Debug, Clone, PartialEq)]
pub struct PtypeField {
    /// Column name.
    pub name: String,
    /// Column shape.
    pub ptype: Ptype,
}

/// Shape of a record (data-frame like) destination.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecordType {
    /// Ordered child columns.
    pub fields: Vec<PtypeField>,
    /// Metadata copied onto every allocated record.
    pub metadata: HashMap<String, String>,
}

impl RecordType {
    /// Number of child columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Attach a metadata entry.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Target shape ("ptype") a materialized value must take.
#[derive(Debug, Clone, PartialEq)]
pub enum Ptype {
    /// No shape requested; resolved from the storage type when the converter
    /// is built. Shapes that cannot be inferred stay unspecified and are
    /// allocated as an unshaped [`Vector::List`](crate::Vector::List).
    Unspecified,
    /// Nullable booleans.
    Logical,
    /// Nullable 32-bit integers.
    Integer,
    /// Nullable doubles.
    Double,
    /// Nullable 64-bit integers.
    Integer64,
    /// Nullable strings.
    Character,
    /// Nullable byte blobs.
    Blob,
    /// Categorical values over a fixed domain of levels.
    Factor {
        /// Category domain.
        levels: Arc<[Arc<str>]>,
    },
    /// Calendar dates, days since the epoch.
    Date,
    /// Instants, seconds since the epoch.
    Timestamp {
        /// Optional time zone label.
        tz: Option<Arc<str>>,
    },
    /// Elapsed time in the given units.
    Difftime {
        /// Output units.
        units: TimeUnits,
    },
    /// A ragged list whose elements all take the inner shape.
    ListOf(Box<Ptype>),
    /// A record of independently shaped columns.
    Record(RecordType),
}

impl Ptype {
    /// Build a record shape from `(name, shape)` pairs.
    pub fn record<N, I>(fields: I) -> Self
    where
        N: Into<String>,
        I: IntoIterator<Item = (N, Ptype)>,
    {
        Ptype::Record(RecordType {
            fields: fields
                .into_iter()
                .map(|(name, ptype)| PtypeField {
                    name: name.into(),
                    ptype,
                })
                .collect(),
            metadata: HashMap::new(),
        })
    }

    /// Build a list-of shape.
    #[must_use]
    pub fn list_of(item: Ptype) -> Self {
        Ptype::ListOf(Box::new(item))
    }

    /// Build a categorical shape from its levels.
    pub fn factor<S, I>(levels: I) -> Self
    where
        S: AsRef<str>,
        I: IntoIterator<Item = S>,
    {
        Ptype::Factor {
            levels: levels.into_iter().map(|s| Arc::from(s.as_ref())).collect(),
        }
    }

    /// Build a timestamp shape.
    #[must_use]
    pub fn timestamp(tz: Option<&str>) -> Self {
        Ptype::Timestamp { tz: tz.map(Arc::from) }
    }

    /// Kind of container this shape allocates.
    #[must_use]
    pub fn kind(&self) -> VectorKind {
        match self {
            Ptype::Unspecified => VectorKind::List,
            Ptype::Logical => VectorKind::Logical,
            Ptype::Integer => VectorKind::Integer,
            Ptype::Double => VectorKind::Double,
            Ptype::Integer64 => VectorKind::Integer64,
            Ptype::Character => VectorKind::Character,
            Ptype::Blob => VectorKind::Blob,
            Ptype::Factor { .. } => VectorKind::Factor,
            Ptype::Date => VectorKind::Date,
            Ptype::Timestamp { .. } => VectorKind::Timestamp,
            Ptype::Difftime { .. } => VectorKind::Difftime,
            Ptype::ListOf(_) => VectorKind::ListOf,
            Ptype::Record(_) => VectorKind::Record,
        }
    }

    /// Whether this shape allocates a record.
    #[must_use]
    pub fn is_record(&self) -> bool {
        matches!(self, Ptype::Record(_))
    }

    /// Infer the default shape for a field's storage type.
    #[must_use]
    pub fn infer(field: &Field, options: &MaterializeOptions) -> Self {
        infer_data_type(field.data_type(), options)
    }
}

fn infer_data_type(data_type: &DataType, options: &MaterializeOptions) -> Ptype {
    match data_type {
        DataType::Null | DataType::Boolean => Ptype::Logical,
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::UInt8
        | DataType::UInt16 => Ptype::Integer,
        DataType::Int64 => match options.int64 {
            Int64Policy::Integer64 => Ptype::Integer64,
            Int64Policy::Double => Ptype::Double,
        },
        DataType::UInt32
        | DataType::UInt64
        | DataType::Float16
        | DataType::Float32
        | DataType::Float64
        | DataType::Decimal128(_, _) => Ptype::Double,
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => Ptype::Character,
        DataType::Binary
        | DataType::LargeBinary
        | DataType::FixedSizeBinary(_)
        | DataType::BinaryView => Ptype::Blob,
        DataType::Date32 | DataType::Date64 => Ptype::Date,
        DataType::Timestamp(_, tz) => Ptype::Timestamp {
            tz: tz.as_deref().map(Arc::from),
        },
        DataType::Time32(_) | DataType::Time64(_) | DataType::Duration(_) => Ptype::Difftime {
            units: TimeUnits::Secs,
        },
        DataType::List(item) | DataType::LargeList(item) | DataType::FixedSizeList(item, _) => {
            Ptype::list_of(infer_data_type(item.data_type(), options))
        }
        DataType::Map(entries, _) => Ptype::list_of(infer_data_type(entries.data_type(), options)),
        DataType::Struct(fields) => Ptype::record(
            fields
                .iter()
                .map(|f| (f.name().clone(), infer_data_type(f.data_type(), options))),
        ),
        DataType::Union(fields, _) => Ptype::record(
            fields
                .iter()
                .map(|(_, f)| (f.name().clone(), infer_data_type(f.data_type(), options))),
        ),
        DataType::Dictionary(_, value) => infer_data_type(value, options),
        _ => Ptype::Unspecified,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arrow_schema::{DataType, Field, Fields, TimeUnit, UnionFields};

    use super::*;

    fn infer(dt: DataType) -> Ptype {
        Ptype::infer(&Field::new("x", dt, true), &MaterializeOptions::default())
    }

    #[test]
    fn infers_scalars() {
        assert_eq!(infer(DataType::Int16), Ptype::Integer);
        assert_eq!(infer(DataType::UInt32), Ptype::Double);
        assert_eq!(infer(DataType::Int64), Ptype::Integer64);
        assert_eq!(infer(DataType::LargeUtf8), Ptype::Character);
        assert_eq!(
            infer(DataType::Timestamp(TimeUnit::Millisecond, Some("UTC".into()))),
            Ptype::timestamp(Some("UTC"))
        );
        assert_eq!(
            infer(DataType::Interval(arrow_schema::IntervalUnit::DayTime)),
            Ptype::Unspecified
        );
    }

    #[test]
    fn int64_policy_double() {
        let options = MaterializeOptions::default().with_int64(Int64Policy::Double);
        let field = Field::new("x", DataType::Int64, true);
        assert_eq!(Ptype::infer(&field, &options), Ptype::Double);
    }

    #[test]
    fn infers_nested() {
        let item = Arc::new(Field::new("item", DataType::Utf8, true));
        assert_eq!(infer(DataType::List(item)), Ptype::list_of(Ptype::Character));

        let fields = Fields::from(vec![
            Field::new("a", DataType::Int32, true),
            Field::new("b", DataType::Float64, true),
        ]);
        assert_eq!(
            infer(DataType::Struct(fields)),
            Ptype::record([("a", Ptype::Integer), ("b", Ptype::Double)])
        );

        let union: UnionFields = [
            (0_i8, Arc::new(Field::new("i", DataType::Int32, true))),
            (5_i8, Arc::new(Field::new("s", DataType::Utf8, true))),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            infer(DataType::Union(union, arrow_schema::UnionMode::Dense)),
            Ptype::record([("i", Ptype::Integer), ("s", Ptype::Character)])
        );
    }
}
