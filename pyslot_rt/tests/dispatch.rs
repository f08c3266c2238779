use std::sync::Arc;

use pyslot_rt::{
    object::{is, PyObjectRef, SlotSource},
    protocol::{object, sequence},
    BuiltinType, PyResult, Runtime, RuntimeOptions, Slot, SlotFn, TypeSpec,
};

fn setup() -> Runtime {
    let _ = env_logger::try_init();

    Runtime::new(RuntimeOptions::default()).unwrap()
}

fn len_seven(_: &Runtime, _: &PyObjectRef) -> PyResult<usize> {
    Ok(7)
}

#[test]
fn subtypes_resolve_the_same_length_operation() {
    let mut rt = setup();

    let base = rt
        .build_type(&TypeSpec::new("Seven").slot(Slot::Len, SlotFn::Len(len_seven)))
        .unwrap();
    let sub = rt.build_type(&TypeSpec::new("AlsoSeven").base(base)).unwrap();

    let types = rt.types();
    assert!(Arc::ptr_eq(
        types.lookup(base).slot(Slot::Len).unwrap(),
        types.lookup(sub).slot(Slot::Len).unwrap()
    ));

    let b = rt.new_object(base);
    let s = rt.new_object(sub);
    assert_eq!(object::size(&rt, &b).unwrap(), object::size(&rt, &s).unwrap());
}

#[test]
fn builtin_subtypes_inherit_builtin_slots() {
    let mut rt = setup();
    let my_list = rt
        .build_type(&TypeSpec::new("MyList").base(BuiltinType::List.type_id()))
        .unwrap();

    let types = rt.types();
    let list = types.builtin(BuiltinType::List);

    for slot in Slot::ALL.iter().copied() {
        match (list.slot(slot), types.lookup(my_list).slot(slot)) {
            (Some(a), Some(b)) => assert!(Arc::ptr_eq(a, b), "{}", slot),
            (None, None) => (),
            _ => panic!("{} differs between list and its subtype", slot),
        }
    }
}

#[test]
fn identical_declarations_give_distinct_types() {
    let mut rt = setup();
    let spec = TypeSpec::new("Same").slot(Slot::Len, SlotFn::Len(len_seven));

    let a = rt.build_type(&spec).unwrap();
    let b = rt.build_type(&spec).unwrap();

    assert_ne!(a, b);
    assert_eq!(rt.lookup_type(a).name(), rt.lookup_type(b).name());
    assert_ne!(rt.new_object(a).py_type(), rt.new_object(b).py_type());
}

#[test]
fn size_without_length_reports_the_type_once() {
    let mut rt = setup();
    let ty = rt.build_type(&TypeSpec::new("Shapeless")).unwrap();
    let err = object::size(&rt, &rt.new_object(ty)).unwrap_err();

    assert!(err.is_builtin(BuiltinType::TypeError));
    assert_eq!(err.message(), "object of type 'Shapeless' has no len()");
    assert_eq!(err.message().matches("Shapeless").count(), 1);
}

#[test]
fn item_errors_distinguish_the_operation() {
    let mut rt = setup();
    let ty = rt.build_type(&TypeSpec::new("Opaque")).unwrap();
    let v = rt.new_object(ty);

    let get = sequence::get_item(&rt, &v, 0).unwrap_err();
    let set = sequence::set_item(&rt, &v, 0, rt.none()).unwrap_err();
    let del = sequence::del_item(&rt, &v, 0).unwrap_err();

    assert!(get.message().contains("indexing"));
    assert!(set.message().contains("assignment"));
    assert!(del.message().contains("deletion"));

    for err in [get, set, del] {
        assert!(err.is_builtin(BuiltinType::TypeError));
        assert!(err.message().starts_with("'Opaque' object does not support"));
    }
}

#[test]
fn repeat_properties() {
    let rt = setup();
    let seq = rt.new_tuple(vec![rt.new_int(1), rt.new_int(2), rt.new_int(3)]);

    for n in 0..5i64 {
        let out = sequence::repeat(&rt, &seq, &rt.new_int(n)).unwrap();
        assert_eq!(object::size(&rt, &out).unwrap(), 3 * n as usize);
    }

    let text = sequence::repeat(&rt, &seq, &rt.new_str("2")).unwrap_err();
    assert!(text.is_builtin(BuiltinType::TypeError));
    assert!(text.message().contains("'str'"));

    let big = rt.new_bigint(num_bigint::BigInt::from(1u8) << 100u32);
    let err = sequence::repeat(&rt, &seq, &big).unwrap_err();
    assert!(err.is_builtin(BuiltinType::OverflowError));
}

#[test]
fn user_mapping_types_look_like_sequences() {
    fn lookup(rt: &Runtime, _: &PyObjectRef, _: &PyObjectRef) -> PyResult<PyObjectRef> {
        Ok(rt.none())
    }

    let mut rt = setup();
    let spec = TypeSpec::new("Lookup").slot(Slot::GetItem, SlotFn::Binary(lookup));
    assert_eq!(SlotSource::name(&spec), "Lookup");

    let ty = rt.build_type(&spec).unwrap();
    let v = rt.new_object(ty);

    assert!(sequence::check(&rt, &v));
    assert!(!sequence::check(&rt, &rt.new_dict()));

    let got = object::get_item(&rt, &v, &rt.new_str("any")).unwrap();
    assert!(is(&got, &rt.none()));
}
