//! Container allocation from a target shape.

use crate::{MaterializeError, Ptype, Record, Vector};

/// Allocate a null-filled container of `len` rows shaped like `ptype`.
///
/// Record shapes allocate every column recursively and copy names and
/// metadata; the row count is regenerated for `len`. Scalar shapes copy their
/// metadata (levels, time zone, units) verbatim. A categorical shape with an
/// empty domain is rejected regardless of `len`.
pub fn allocate(ptype: &Ptype, len: usize) -> Result<Vector, MaterializeError> {
    let vector = match ptype {
        Ptype::Unspecified => Vector::List(nulls(len)?),
        Ptype::Logical => Vector::Logical(nulls(len)?),
        Ptype::Integer => Vector::Integer(nulls(len)?),
        Ptype::Double => Vector::Double(nulls(len)?),
        Ptype::Integer64 => Vector::Integer64(nulls(len)?),
        Ptype::Character => Vector::Character(nulls(len)?),
        Ptype::Blob => Vector::Blob(nulls(len)?),
        Ptype::Factor { levels } => {
            if levels.is_empty() {
                return Err(MaterializeError::allocation(
                    "can't allocate a categorical shape with empty levels",
                ));
            }
            Vector::Factor {
                codes: nulls(len)?,
                levels: levels.clone(),
            }
        }
        Ptype::Date => Vector::Date(nulls(len)?),
        Ptype::Timestamp { tz } => Vector::Timestamp {
            seconds: nulls(len)?,
            tz: tz.clone(),
        },
        Ptype::Difftime { units } => Vector::Difftime {
            values: nulls(len)?,
            units: *units,
        },
        Ptype::ListOf(item) => Vector::ListOf {
            ptype: item.clone(),
            items: nulls(len)?,
        },
        Ptype::Record(record) => {
            let columns = record
                .fields
                .iter()
                .map(|f| allocate(&f.ptype, len))
                .collect::<Result<Vec<_>, _>>()?;
            Vector::Record(Record {
                names: record.fields.iter().map(|f| f.name.clone()).collect(),
                columns,
                metadata: record.metadata.clone(),
                nrow: len,
            })
        }
    };
    Ok(vector)
}

fn nulls<T: Clone>(len: usize) -> Result<Vec<Option<T>>, MaterializeError> {
    let mut slots = Vec::new();
    slots
        .try_reserve_exact(len)
        .map_err(|e| MaterializeError::allocation(format!("cannot reserve {len} slots: {e}")))?;
    slots.resize(len, None);
    Ok(slots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::VectorKind;

    #[test]
    fn record_columns_follow_shape() {
        let ptype = Ptype::record([("a", Ptype::Integer), ("b", Ptype::list_of(Ptype::Double))]);
        let Vector::Record(record) = allocate(&ptype, 4).unwrap() else {
            panic!("expected record");
        };
        assert_eq!(record.nrow(), 4);
        assert_eq!(record.names(), ["a", "b"]);
        assert_eq!(record.columns()[0].kind(), VectorKind::Integer);
        assert_eq!(record.columns()[1].kind(), VectorKind::ListOf);
        assert!(record.columns().iter().all(|c| c.len() == 4));
    }

    #[test]
    fn zero_column_record_keeps_row_count() {
        let v = allocate(&Ptype::record(Vec::<(String, Ptype)>::new()), 7).unwrap();
        assert_eq!(v.len(), 7);
    }

    #[test]
    fn absurd_length_is_an_allocation_error() {
        let err = allocate(&Ptype::Double, usize::MAX).unwrap_err();
        assert!(matches!(err, MaterializeError::Allocation { .. }));
    }
}
