use std::sync::Arc;

use arrow_array::{
    ArrayRef, DictionaryArray, FixedSizeListArray, Int32Array, LargeListArray, ListArray, MapArray,
    StringArray, StructArray, types::Int32Type,
};
use arrow_buffer::{NullBuffer, OffsetBuffer};
use arrow_materialize::{MaterializeError, Ptype, Vector, arrow_schema::Field, convert_array};
use arrow_schema::{DataType, Fields};

fn ints(v: &Vector) -> Vec<Option<i32>> {
    v.as_integer().expect("integer element").to_vec()
}

fn int_list() -> ListArray {
    let item = Arc::new(Field::new("item", DataType::Int32, true));
    ListArray::new(
        item,
        OffsetBuffer::new(vec![0, 2, 2, 5, 5].into()),
        Arc::new(Int32Array::from(vec![1, 2, 3, 4, 5])),
        Some(NullBuffer::from(vec![true, true, true, false])),
    )
}

#[test]
fn list_rows_follow_offsets() {
    let array: ArrayRef = Arc::new(int_list());
    let v = convert_array(array, Ptype::Unspecified).unwrap();
    let Vector::ListOf { ptype, items } = &v else {
        panic!("expected list-of, got {:?}", v.kind());
    };
    assert_eq!(**ptype, Ptype::Integer);
    assert_eq!(items.len(), 4);
    assert_eq!(ints(items[0].as_ref().unwrap()), [Some(1), Some(2)]);
    assert!(items[1].as_ref().unwrap().is_empty());
    assert_eq!(ints(items[2].as_ref().unwrap()), [Some(3), Some(4), Some(5)]);
    assert!(items[3].is_none());
}

#[test]
fn sliced_list_uses_its_own_offsets() {
    let array: ArrayRef = Arc::new(int_list().slice(2, 2));
    let v = convert_array(array, Ptype::list_of(Ptype::Double)).unwrap();
    let items = v.as_list_of().unwrap();
    assert_eq!(
        items[0].as_ref().unwrap().as_double().unwrap(),
        &[Some(3.0), Some(4.0), Some(5.0)]
    );
    assert!(items[1].is_none());
}

#[test]
fn large_list() {
    let item = Arc::new(Field::new("item", DataType::Utf8, true));
    let array: ArrayRef = Arc::new(LargeListArray::new(
        item,
        OffsetBuffer::new(vec![0_i64, 1, 3].into()),
        Arc::new(StringArray::from(vec![Some("a"), None, Some("c")])),
        None,
    ));
    let v = convert_array(array, Ptype::Unspecified).unwrap();
    let items = v.as_list_of().unwrap();
    let second = items[1].as_ref().unwrap().as_character().unwrap();
    assert!(second[0].is_none());
    assert_eq!(second[1].as_deref(), Some("c"));
}

#[test]
fn fixed_size_list_rows_have_constant_width() {
    let item = Arc::new(Field::new("item", DataType::Int32, true));
    let array: ArrayRef = Arc::new(FixedSizeListArray::new(
        item,
        2,
        Arc::new(Int32Array::from(vec![1, 2, 3, 4, 5, 6])),
        Some(NullBuffer::from(vec![true, false, true])),
    ));
    let v = convert_array(array, Ptype::Unspecified).unwrap();
    let items = v.as_list_of().unwrap();
    assert_eq!(ints(items[0].as_ref().unwrap()), [Some(1), Some(2)]);
    assert!(items[1].is_none());
    assert_eq!(ints(items[2].as_ref().unwrap()), [Some(5), Some(6)]);
}

#[test]
fn map_rows_are_lists_of_entry_records() {
    let entry_fields = Fields::from(vec![
        Field::new("keys", DataType::Utf8, false),
        Field::new("values", DataType::Int32, true),
    ]);
    let entries = StructArray::new(
        entry_fields.clone(),
        vec![
            Arc::new(StringArray::from(vec!["a", "b", "c"])) as ArrayRef,
            Arc::new(Int32Array::from(vec![1, 2, 3])),
        ],
        None,
    );
    let entries_field = Arc::new(Field::new("entries", DataType::Struct(entry_fields), false));
    let array: ArrayRef = Arc::new(MapArray::new(
        entries_field,
        OffsetBuffer::new(vec![0, 1, 3].into()),
        entries,
        None,
        false,
    ));

    let v = convert_array(array, Ptype::Unspecified).unwrap();
    let items = v.as_list_of().unwrap();
    let second = items[1].as_ref().unwrap().as_record().unwrap();
    assert_eq!(second.nrow(), 2);
    assert_eq!(second.names(), ["keys", "values"]);
    assert_eq!(ints(second.column(1).unwrap()), [Some(2), Some(3)]);
}

#[test]
fn nested_lists() {
    let inner_item = Arc::new(Field::new("item", DataType::Int32, true));
    let inner = ListArray::new(
        Arc::clone(&inner_item),
        OffsetBuffer::new(vec![0, 1, 3].into()),
        Arc::new(Int32Array::from(vec![7, 8, 9])),
        None,
    );
    let outer_item = Arc::new(Field::new("item", DataType::List(inner_item), true));
    let array: ArrayRef = Arc::new(ListArray::new(
        outer_item,
        OffsetBuffer::new(vec![0, 2].into()),
        Arc::new(inner),
        None,
    ));

    let v = convert_array(array, Ptype::Unspecified).unwrap();
    let outer = v.as_list_of().unwrap()[0].as_ref().unwrap();
    let inner = outer.as_list_of().unwrap();
    assert_eq!(ints(inner[0].as_ref().unwrap()), [Some(7)]);
    assert_eq!(ints(inner[1].as_ref().unwrap()), [Some(8), Some(9)]);
}

#[test]
fn list_of_shape_on_scalar_storage_is_invalid() {
    let array: ArrayRef = Arc::new(Int32Array::from(vec![1]));
    let err = convert_array(array, Ptype::list_of(Ptype::Integer)).unwrap_err();
    assert!(matches!(err, MaterializeError::Invalid { .. }), "{err}");
}

#[test]
fn dictionary_encoded_list_is_invalid() {
    let values: ArrayRef = Arc::new(int_list());
    let keys = Int32Array::from(vec![2, 0, 0]);
    let array: ArrayRef = Arc::new(DictionaryArray::<Int32Type>::new(keys, values));
    let err = convert_array(array, Ptype::Unspecified).unwrap_err();
    assert!(matches!(err, MaterializeError::Invalid { .. }), "{err}");
}
