use std::sync::Arc;

use arrow_array::{ArrayRef, Float64Array, Int32Array, StringArray, StructArray, UnionArray};
use arrow_materialize::{Ptype, Vector, convert_array};
use arrow_schema::{DataType, Field, Fields, UnionFields};

fn union_fields(ids: [i8; 2]) -> UnionFields {
    [
        (ids[0], Arc::new(Field::new("i", DataType::Int32, true))),
        (ids[1], Arc::new(Field::new("s", DataType::Utf8, true))),
    ]
    .into_iter()
    .collect()
}

fn strings(v: &Vector) -> Vec<Option<&str>> {
    v.as_character().unwrap().iter().map(|s| s.as_deref()).collect()
}

fn dense() -> UnionArray {
    UnionArray::try_new(
        union_fields([0, 1]),
        vec![0_i8, 1, 0].into(),
        Some(vec![0_i32, 0, 1].into()),
        vec![
            Arc::new(Int32Array::from(vec![1, 3])) as ArrayRef,
            Arc::new(StringArray::from(vec!["x"])),
        ],
    )
    .unwrap()
}

#[test]
fn dense_union_scatters_rows_into_columns() {
    let array: ArrayRef = Arc::new(dense());
    let v = convert_array(array, Ptype::Unspecified).unwrap();
    let record = v.as_record().unwrap();
    assert_eq!(record.nrow(), 3);
    assert_eq!(record.names(), ["i", "s"]);
    assert_eq!(record.column(0).unwrap().as_integer().unwrap(), &[Some(1), None, Some(3)]);
    assert_eq!(strings(record.column(1).unwrap()), [None, Some("x"), None]);
}

#[test]
fn sliced_dense_union() {
    let array: ArrayRef = Arc::new(dense().slice(1, 2));
    let v = convert_array(array, Ptype::Unspecified).unwrap();
    let record = v.as_record().unwrap();
    assert_eq!(record.column(0).unwrap().as_integer().unwrap(), &[None, Some(3)]);
    assert_eq!(strings(record.column(1).unwrap()), [Some("x"), None]);
}

#[test]
fn sparse_union_reads_children_by_row() {
    let array: ArrayRef = Arc::new(
        UnionArray::try_new(
            union_fields([0, 1]),
            vec![1_i8, 0, 1].into(),
            None,
            vec![
                Arc::new(Int32Array::from(vec![10, 20, 30])) as ArrayRef,
                Arc::new(StringArray::from(vec!["a", "b", "c"])),
            ],
        )
        .unwrap(),
    );
    let v = convert_array(array, Ptype::Unspecified).unwrap();
    let record = v.as_record().unwrap();
    assert_eq!(record.column(0).unwrap().as_integer().unwrap(), &[None, Some(20), None]);
    assert_eq!(strings(record.column(1).unwrap()), [Some("a"), None, Some("c")]);
}

#[test]
fn non_contiguous_type_ids() {
    let array: ArrayRef = Arc::new(
        UnionArray::try_new(
            union_fields([3, 7]),
            vec![7_i8, 3].into(),
            Some(vec![0_i32, 0].into()),
            vec![
                Arc::new(Int32Array::from(vec![42])) as ArrayRef,
                Arc::new(StringArray::from(vec!["z"])),
            ],
        )
        .unwrap(),
    );
    let v = convert_array(array, Ptype::Unspecified).unwrap();
    let record = v.as_record().unwrap();
    assert_eq!(record.column(0).unwrap().as_integer().unwrap(), &[None, Some(42)]);
    assert_eq!(strings(record.column(1).unwrap()), [Some("z"), None]);
}

#[test]
fn union_columns_convert_to_requested_shapes() {
    let fields: UnionFields = [
        (0_i8, Arc::new(Field::new("n", DataType::Float64, true))),
        (1_i8, Arc::new(Field::new("k", DataType::Int32, true))),
    ]
    .into_iter()
    .collect();
    let array: ArrayRef = Arc::new(
        UnionArray::try_new(
            fields,
            vec![1_i8, 0].into(),
            Some(vec![0_i32, 0].into()),
            vec![
                Arc::new(Float64Array::from(vec![2.5])) as ArrayRef,
                Arc::new(Int32Array::from(vec![9])),
            ],
        )
        .unwrap(),
    );
    let ptype = Ptype::record([("n", Ptype::Double), ("k", Ptype::Double)]);
    let v = convert_array(array, ptype).unwrap();
    let record = v.as_record().unwrap();
    assert_eq!(record.column(0).unwrap().as_double().unwrap(), &[None, Some(2.5)]);
    assert_eq!(record.column(1).unwrap().as_double().unwrap(), &[Some(9.0), None]);
}

#[test]
fn struct_variant_and_null_values_leave_other_rows_null() {
    let point = Fields::from(vec![
        Field::new("x", DataType::Int32, true),
        Field::new("y", DataType::Utf8, true),
    ]);
    let fields: UnionFields = [
        (0_i8, Arc::new(Field::new("i", DataType::Int32, true))),
        (1_i8, Arc::new(Field::new("p", DataType::Struct(point.clone()), true))),
    ]
    .into_iter()
    .collect();
    let points = StructArray::new(
        point,
        vec![
            Arc::new(Int32Array::from(vec![1, 2])) as ArrayRef,
            Arc::new(StringArray::from(vec![Some("a"), None])),
        ],
        None,
    );
    let array: ArrayRef = Arc::new(
        UnionArray::try_new(
            fields,
            vec![1_i8, 0, 1, 0].into(),
            Some(vec![0_i32, 0, 1, 1].into()),
            vec![
                Arc::new(Int32Array::from(vec![Some(5), None])) as ArrayRef,
                Arc::new(points),
            ],
        )
        .unwrap(),
    );

    let v = convert_array(array, Ptype::Unspecified).unwrap();
    let record = v.as_record().unwrap();
    assert_eq!(record.nrow(), 4);
    assert_eq!(record.column(0).unwrap().as_integer().unwrap(), &[None, Some(5), None, None]);
    let p = record.column(1).unwrap().as_record().unwrap();
    assert_eq!(p.nrow(), 4);
    assert_eq!(p.column(0).unwrap().as_integer().unwrap(), &[Some(1), None, Some(2), None]);
    assert_eq!(strings(p.column(1).unwrap()), [Some("a"), None, None, None]);
}
