use pyslot_core::{BuiltinType, Slot};

use super::{comparison::Comparison, mapping, number, object, sequence};
use crate::{
    object::{is, PyInt, PyObjectRef, SlotFn, TypeSpec},
    rt::Runtime,
    test::setup,
    warnings::CollectingSink,
    PyResult,
};

fn int_of(obj: &PyObjectRef) -> i64 {
    obj.downcast_ref::<PyInt>().and_then(PyInt::to_i64).unwrap()
}

fn list_of(rt: &Runtime, items: &[i64]) -> PyObjectRef {
    rt.new_list(items.iter().map(|n| rt.new_int(*n)).collect())
}

#[test]
fn repr_and_str() {
    let rt = setup();

    assert_eq!(object::repr_text(&rt, &rt.new_int(42)).unwrap(), "42");
    assert_eq!(object::repr_text(&rt, &rt.new_str("hi")).unwrap(), "'hi'");
    assert_eq!(object::str_text(&rt, &rt.new_str("hi")).unwrap(), "hi");
    assert_eq!(object::repr_text(&rt, &rt.none()).unwrap(), "None");
    assert_eq!(object::repr_text(&rt, &rt.new_bool(false)).unwrap(), "False");
    assert_eq!(object::str_text(&rt, &rt.new_int(-3)).unwrap(), "-3");

    let tuple = rt.new_tuple(vec![rt.new_int(1)]);
    assert_eq!(object::repr_text(&rt, &tuple).unwrap(), "(1,)");

    let nested = rt.new_list(vec![rt.new_str("a"), rt.new_tuple(vec![])]);
    assert_eq!(object::repr_text(&rt, &nested).unwrap(), "['a', ()]");
}

#[test]
fn repr_must_return_str() {
    fn bad_repr(rt: &Runtime, _: &PyObjectRef) -> PyResult<PyObjectRef> {
        Ok(rt.new_int(1))
    }

    let mut rt = setup();
    let ty = rt
        .build_type(&TypeSpec::new("Liar").slot(Slot::Repr, SlotFn::Unary(bad_repr)))
        .unwrap();

    let err = object::repr(&rt, &rt.new_object(ty)).unwrap_err();
    assert!(err.is_builtin(BuiltinType::TypeError));
    assert_eq!(err.message(), "__repr__ returned non-string (type int)");

    // `object.__str__` defers to the broken `__repr__`.
    assert!(object::str(&rt, &rt.new_object(ty)).is_err());
}

#[test]
fn size_of_sequences_and_mappings() {
    let rt = setup();

    assert_eq!(object::size(&rt, &rt.new_str("héllo")).unwrap(), 5);
    assert_eq!(object::size(&rt, &list_of(&rt, &[1, 2, 3])).unwrap(), 3);

    let d = rt.new_dict();
    object::set_item(&rt, &d, &rt.new_str("k"), rt.none()).unwrap();
    assert_eq!(object::size(&rt, &d).unwrap(), 1);
    assert_eq!(mapping::size(&rt, &d).unwrap(), 1);

    let err = sequence::size(&rt, &d).unwrap_err();
    assert_eq!(err.message(), "object of type 'dict' has no len()");

    let err = mapping::size(&rt, &rt.new_str("x")).unwrap_err();
    assert_eq!(err.message(), "'str' is not a mapping");
}

#[test]
fn size_without_any_length_slot() {
    let rt = setup();
    let err = object::size(&rt, &rt.new_int(5)).unwrap_err();

    assert!(err.is_builtin(BuiltinType::TypeError));
    assert_eq!(err.message(), "object of type 'int' has no len()");
}

#[test]
fn missing_item_slots_name_the_operation() {
    let rt = setup();
    let n = rt.new_int(1);

    let err = sequence::get_item(&rt, &n, 0).unwrap_err();
    assert_eq!(err.message(), "'int' object does not support indexing");

    let err = sequence::set_item(&rt, &n, 0, rt.none()).unwrap_err();
    assert_eq!(err.message(), "'int' object does not support item assignment");

    let err = sequence::del_item(&rt, &n, 0).unwrap_err();
    assert_eq!(err.message(), "'int' object does not support item deletion");

    let err = object::get_item(&rt, &n, &n).unwrap_err();
    assert_eq!(err.message(), "'int' object is not subscriptable");

    let s = rt.new_str("abc");
    let err = object::set_item(&rt, &s, &n, rt.none()).unwrap_err();
    assert_eq!(err.message(), "'str' object does not support item assignment");

    let err = object::del_item(&rt, &s, &n).unwrap_err();
    assert_eq!(err.message(), "'str' object does not support item deletion");
}

#[test]
fn sequence_items_by_host_index() {
    let rt = setup();
    let lst = list_of(&rt, &[10, 20, 30]);

    assert_eq!(int_of(&sequence::get_item(&rt, &lst, 0).unwrap()), 10);
    assert_eq!(int_of(&sequence::get_item(&rt, &lst, -1).unwrap()), 30);

    sequence::set_item(&rt, &lst, 1, rt.new_int(99)).unwrap();
    assert_eq!(int_of(&sequence::get_item(&rt, &lst, 1).unwrap()), 99);

    sequence::del_item(&rt, &lst, 0).unwrap();
    assert_eq!(sequence::size(&rt, &lst).unwrap(), 2);

    let err = sequence::get_item(&rt, &lst, 5).unwrap_err();
    assert!(err.is_builtin(BuiltinType::IndexError));
    assert_eq!(err.message(), "list index out of range");

    let err = object::get_item(&rt, &lst, &rt.new_str("x")).unwrap_err();
    assert_eq!(err.message(), "list indices must be integers or slices, not str");

    let s = rt.new_str("abc");
    let ch = sequence::get_item(&rt, &s, -1).unwrap();
    assert_eq!(ch.downcast_str(), Some("c"));
}

#[test]
fn huge_indices_raise_index_error() {
    let rt = setup();
    let lst = list_of(&rt, &[1]);
    let huge = rt.new_bigint(num_bigint::BigInt::from(i64::MAX) * 4);

    let err = object::get_item(&rt, &lst, &huge).unwrap_err();
    assert!(err.is_builtin(BuiltinType::IndexError));
    assert_eq!(err.message(), "cannot fit 'int' into an index-sized integer");
}

#[test]
fn repeat() {
    let rt = setup();
    let lst = list_of(&rt, &[1, 2]);

    let out = sequence::repeat(&rt, &lst, &rt.new_int(3)).unwrap();
    assert_eq!(object::size(&rt, &out).unwrap(), 6);

    let out = sequence::repeat(&rt, &rt.new_str("ab"), &rt.new_int(2)).unwrap();
    assert_eq!(out.downcast_str(), Some("abab"));

    let out = sequence::repeat(&rt, &lst, &rt.new_int(-1)).unwrap();
    assert_eq!(object::size(&rt, &out).unwrap(), 0);

    let out = sequence::repeat(&rt, &lst, &rt.new_bool(true)).unwrap();
    assert_eq!(object::size(&rt, &out).unwrap(), 2);

    let err = sequence::repeat(&rt, &lst, &rt.new_str("3")).unwrap_err();
    assert!(err.is_builtin(BuiltinType::TypeError));
    assert_eq!(err.message(), "can't multiply sequence by non-int of type 'str'");

    let huge = rt.new_bigint(num_bigint::BigInt::from(u64::MAX));
    let err = sequence::repeat(&rt, &lst, &huge).unwrap_err();
    assert!(err.is_builtin(BuiltinType::OverflowError));

    let err = sequence::repeat(&rt, &rt.new_str("ab"), &rt.new_int(i64::MAX)).unwrap_err();
    assert!(err.is_builtin(BuiltinType::OverflowError));
    assert_eq!(err.message(), "repeated string is too long");

    let err = sequence::repeat(&rt, &rt.new_dict(), &rt.new_int(2)).unwrap_err();
    assert_eq!(err.message(), "'dict' object can't be repeated");
}

#[test]
fn classification() {
    let mut rt = setup();

    assert!(sequence::check(&rt, &list_of(&rt, &[])));
    assert!(sequence::check(&rt, &rt.new_str("")));
    assert!(!sequence::check(&rt, &rt.new_dict()));
    assert!(!sequence::check(&rt, &rt.new_int(1)));
    assert!(mapping::check(&rt, &rt.new_dict()));

    let sub = rt
        .build_type(&TypeSpec::new("MyDict").base(BuiltinType::Dict.type_id()))
        .unwrap();
    assert!(!sequence::check(&rt, &rt.new_object(sub)));
}

#[test]
fn truthiness() {
    let rt = setup();

    assert!(!object::is_true(&rt, &rt.none()).unwrap());
    assert!(!object::is_true(&rt, &rt.new_int(0)).unwrap());
    assert!(object::is_true(&rt, &rt.new_int(-2)).unwrap());
    assert!(!object::is_true(&rt, &rt.new_str("")).unwrap());
    assert!(object::is_true(&rt, &list_of(&rt, &[0])).unwrap());
    assert!(!object::is_true(&rt, &rt.new_dict()).unwrap());
    assert!(object::is_true(&rt, &rt.new_object(BuiltinType::Object.type_id())).unwrap());
}

#[test]
fn rich_comparisons() {
    let rt = setup();
    let one = rt.new_int(1);
    let two = rt.new_int(2);

    assert!(object::rich_compare_bool(&rt, &one, &two, Comparison::Lt).unwrap());
    assert!(object::rich_compare_bool(&rt, &two, &one, Comparison::Ge).unwrap());
    assert!(object::rich_compare_bool(&rt, &one, &rt.new_bool(true), Comparison::Eq).unwrap());

    let a = list_of(&rt, &[1, 2]);
    let b = list_of(&rt, &[1, 2]);
    assert!(object::rich_compare_bool(&rt, &a, &b, Comparison::Eq).unwrap());
    assert!(!is(&a, &b));

    // unrelated types fall back to identity for equality
    assert!(!object::rich_compare_bool(&rt, &one, &rt.new_str("1"), Comparison::Eq).unwrap());
    assert!(object::rich_compare_bool(&rt, &one, &rt.new_str("1"), Comparison::Ne).unwrap());

    let err = object::rich_compare(&rt, &one, &rt.new_str("1"), Comparison::Lt).unwrap_err();
    assert_eq!(err.message(), "'<' not supported between instances of 'int' and 'str'");

    assert!(object::rich_compare_bool(&rt, &rt.new_str("abc"), &rt.new_str("abd"), Comparison::Lt).unwrap());
    assert!(!object::rich_compare_bool(&rt, &two, &a, Comparison::NotIn).unwrap());
    assert!(object::rich_compare_bool(&rt, &two, &a, Comparison::In).unwrap());
}

#[test]
fn reflected_slot_of_subtype_goes_first() {
    fn always_true(rt: &Runtime, _: &PyObjectRef, _: &PyObjectRef) -> PyResult<PyObjectRef> {
        Ok(rt.new_str("reflected"))
    }

    let mut rt = setup();
    let sub = rt
        .build_type(
            &TypeSpec::new("LoudInt")
                .base(BuiltinType::Int.type_id())
                .slot(Slot::Gt, SlotFn::Binary(always_true)),
        )
        .unwrap();

    let loud = rt.new_object(sub);
    let result = object::rich_compare(&rt, &rt.new_int(5), &loud, Comparison::Lt).unwrap();
    assert_eq!(result.downcast_str(), Some("reflected"));

    // Same call the other way round uses the forward slot of `LoudInt`.
    let result = object::rich_compare(&rt, &loud, &rt.new_int(5), Comparison::Gt).unwrap();
    assert_eq!(result.downcast_str(), Some("reflected"));
}

#[test]
fn containment() {
    let rt = setup();

    assert!(object::contains(&rt, &rt.new_str("hello"), &rt.new_str("ell")).unwrap());
    assert!(object::contains(&rt, &list_of(&rt, &[1, 2]), &rt.new_int(2)).unwrap());

    let err = object::contains(&rt, &rt.new_int(1), &rt.new_int(1)).unwrap_err();
    assert_eq!(err.message(), "'int' object is not a container");

    let err = object::contains(&rt, &rt.new_str("a"), &rt.new_int(1)).unwrap_err();
    assert_eq!(err.message(), "'in <string>' requires string as left operand, not int");
}

#[test]
fn hashing() {
    let rt = setup();

    assert_eq!(object::hash(&rt, &rt.new_int(-1)).unwrap(), -2);
    assert_eq!(object::hash(&rt, &rt.new_bool(true)).unwrap(), 1);
    assert_eq!(
        object::hash(&rt, &rt.new_str("x")).unwrap(),
        object::hash(&rt, &rt.new_str("x")).unwrap()
    );

    let t1 = rt.new_tuple(vec![rt.new_int(1), rt.new_str("a")]);
    let t2 = rt.new_tuple(vec![rt.new_int(1), rt.new_str("a")]);
    assert_eq!(object::hash(&rt, &t1).unwrap(), object::hash(&rt, &t2).unwrap());

    let err = object::hash(&rt, &rt.new_dict()).unwrap_err();
    assert_eq!(err.message(), "unhashable type: 'dict'");

    let unhashable_member = rt.new_tuple(vec![list_of(&rt, &[])]);
    assert!(object::hash(&rt, &unhashable_member).is_err());
}

#[test]
fn index_conversion() {
    fn index_to_bool(rt: &Runtime, _: &PyObjectRef) -> PyResult<PyObjectRef> {
        Ok(rt.new_bool(true))
    }

    fn index_to_str(rt: &Runtime, _: &PyObjectRef) -> PyResult<PyObjectRef> {
        Ok(rt.new_str("7"))
    }

    let mut rt = setup();
    let sink = CollectingSink::new();
    rt.set_warning_sink(sink.clone());

    let boolish = rt
        .build_type(&TypeSpec::new("Boolish").slot(Slot::Index, SlotFn::Unary(index_to_bool)))
        .unwrap();
    let stringy = rt
        .build_type(&TypeSpec::new("Stringy").slot(Slot::Index, SlotFn::Unary(index_to_str)))
        .unwrap();

    assert!(number::index_check(&rt, &rt.new_int(1)));
    assert!(!number::index_check(&rt, &rt.new_str("1")));

    let n = number::as_size(&rt, &rt.new_object(boolish), None).unwrap();
    assert_eq!(n, 1);

    let records = sink.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].category, "DeprecationWarning");
    assert!(records[0].message.starts_with("__index__ returned non-int (type bool)"));

    let err = number::index(&rt, &rt.new_object(stringy)).unwrap_err();
    assert_eq!(err.message(), "__index__ returned non-int (type str)");

    let err = number::index(&rt, &rt.new_str("1")).unwrap_err();
    assert_eq!(err.message(), "'str' object cannot be interpreted as an integer");

    let big = rt.new_bigint(num_bigint::BigInt::from(i64::MAX) * 8);
    assert_eq!(number::as_size(&rt, &big, None).unwrap(), isize::MAX);
    assert_eq!(number::as_size(&rt, &rt.new_bigint(-num_bigint::BigInt::from(i64::MAX) * 8), None).unwrap(), isize::MIN);

    let err = number::as_size(&rt, &big, Some(BuiltinType::OverflowError)).unwrap_err();
    assert!(err.is_builtin(BuiltinType::OverflowError));
    assert_eq!(err.message(), "cannot fit 'int' into an index-sized integer");
}

#[test]
fn long_type_names_are_truncated() {
    let mut rt = setup();
    let name = "N".repeat(300);
    let ty = rt.build_type(&TypeSpec::new(name.as_str())).unwrap();

    let err = object::size(&rt, &rt.new_object(ty)).unwrap_err();
    assert_eq!(err.message(), format!("object of type '{}' has no len()", "N".repeat(200)));
}
