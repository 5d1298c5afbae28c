use std::{collections::HashMap, sync::Arc};

use arrow_array::{
    Array, ArrayRef, DictionaryArray, Float64Array, Int32Array, RecordBatch, StringArray,
    StructArray, types::Int32Type,
};
use arrow_materialize::{
    Converter, MaterializeError, MaterializeOptions, Ptype, Vector, convert_array,
    convert_record_batch,
};
use arrow_schema::{DataType, Field, Fields, Schema};

fn people() -> StructArray {
    let fields = Fields::from(vec![
        Field::new("name", DataType::Utf8, true),
        Field::new("age", DataType::Int32, true),
    ]);
    StructArray::new(
        fields,
        vec![
            Arc::new(StringArray::from(vec![Some("ann"), Some("bob"), None])) as ArrayRef,
            Arc::new(Int32Array::from(vec![Some(31), None, Some(7)])),
        ],
        None,
    )
}

#[test]
fn struct_becomes_record() {
    let array: ArrayRef = Arc::new(people());
    let v = convert_array(array, Ptype::Unspecified).unwrap();
    let record = v.as_record().unwrap();
    assert_eq!(record.nrow(), 3);
    assert_eq!(record.names(), ["name", "age"]);
    let names = record.column_by_name("name").unwrap().as_character().unwrap();
    assert_eq!(names[1].as_deref(), Some("bob"));
    assert!(names[2].is_none());
    assert_eq!(
        record.column_by_name("age").unwrap().as_integer().unwrap(),
        &[Some(31), None, Some(7)]
    );
}

#[test]
fn explicit_record_shape_converts_columns() {
    let array: ArrayRef = Arc::new(people().slice(1, 2));
    let ptype = Ptype::record([("who", Ptype::Character), ("years", Ptype::Double)]);
    let v = convert_array(array, ptype).unwrap();
    let record = v.as_record().unwrap();
    assert_eq!(record.names(), ["who", "years"]);
    assert_eq!(record.column(1).unwrap().as_double().unwrap(), &[None, Some(7.0)]);
}

#[test]
fn unspecified_columns_are_inferred_individually() {
    let array: ArrayRef = Arc::new(people());
    let ptype = Ptype::record([("name", Ptype::Unspecified), ("age", Ptype::Double)]);
    let field = Field::new("p", array.data_type().clone(), true);
    let converter = Converter::try_new(field, ptype, MaterializeOptions::default()).unwrap();
    assert_eq!(
        converter.ptype(),
        &Ptype::record([("name", Ptype::Character), ("age", Ptype::Double)])
    );
}

#[test]
fn record_width_must_match_struct() {
    let array: ArrayRef = Arc::new(people());
    let field = Field::new("p", array.data_type().clone(), true);
    let ptype = Ptype::record([("name", Ptype::Character)]);
    let err = Converter::try_new(field, ptype, MaterializeOptions::default()).unwrap_err();
    assert!(matches!(err, MaterializeError::Invalid { .. }), "{err}");
}

#[test]
fn zero_column_struct_keeps_rows() {
    let array: ArrayRef = Arc::new(StructArray::new_empty_fields(4, None));
    let v = convert_array(array, Ptype::Unspecified).unwrap();
    let record = v.as_record().unwrap();
    assert_eq!(record.nrow(), 4);
    assert_eq!(record.ncol(), 0);
}

#[test]
fn dictionary_encoded_struct_is_invalid() {
    let values: ArrayRef = Arc::new(people());
    let keys = Int32Array::from(vec![0, 2, 1]);
    let array: ArrayRef = Arc::new(DictionaryArray::<Int32Type>::new(keys, values));
    let err = convert_array(array, Ptype::Unspecified).unwrap_err();
    assert!(matches!(err, MaterializeError::Invalid { .. }), "{err}");
}

#[test]
fn record_metadata_is_copied_on_allocation() {
    let array: ArrayRef = Arc::new(people());
    let Ptype::Record(shape) = Ptype::record([("name", Ptype::Character), ("age", Ptype::Integer)])
    else {
        unreachable!();
    };
    let v = convert_array(array, Ptype::Record(shape.with_metadata("origin", "test"))).unwrap();
    assert_eq!(v.as_record().unwrap().metadata()["origin"], "test");
}

#[test]
fn record_batch_carries_schema_metadata() {
    let schema = Arc::new(
        Schema::new(vec![
            Field::new("id", DataType::Int32, false),
            Field::new("score", DataType::Float64, true),
        ])
        .with_metadata(HashMap::from([("source".to_string(), "unit".to_string())])),
    );
    let batch = RecordBatch::try_new(
        schema,
        vec![
            Arc::new(Int32Array::from(vec![1, 2])) as ArrayRef,
            Arc::new(Float64Array::from(vec![Some(0.5), None])),
        ],
    )
    .unwrap();

    let v = convert_record_batch(&batch, Ptype::Unspecified).unwrap();
    let Vector::Record(record) = v else {
        panic!("expected record");
    };
    assert_eq!(record.metadata()["source"], "unit");
    assert_eq!(record.column(0).unwrap().as_integer().unwrap(), &[Some(1), Some(2)]);
    assert_eq!(record.column(1).unwrap().as_double().unwrap(), &[Some(0.5), None]);
}
