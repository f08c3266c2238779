use pyslot_rt::{
    protocol::object, BuiltinType, PyException, Runtime, RuntimeOptions, TypeSpec,
};

fn setup() -> Runtime {
    let _ = env_logger::try_init();

    Runtime::new(RuntimeOptions::default()).unwrap()
}

#[test]
fn every_exception_reaches_base_exception() {
    let rt = setup();
    let types = rt.types();
    let root = BuiltinType::BaseException.type_id();

    for bltn in BuiltinType::ALL.iter().filter(|b| b.is_exception()) {
        let mro = types.builtin(*bltn).mro();
        let hits = mro.iter().filter(|t| **t == root).count();

        assert_eq!(hits, 1, "{}", bltn);

        let mut seen = std::collections::HashSet::new();
        assert!(mro.iter().all(|t| seen.insert(*t)), "{} revisits a type", bltn);
    }

    let tree = types.tree().unwrap();
    tree.verify().unwrap();
}

#[test]
fn hierarchy_shape() {
    let rt = setup();
    let types = rt.types();

    let pairs = [
        (BuiltinType::IndexError, BuiltinType::LookupError),
        (BuiltinType::KeyError, BuiltinType::LookupError),
        (BuiltinType::OverflowError, BuiltinType::ArithmeticError),
        (BuiltinType::NotImplementedError, BuiltinType::RuntimeError),
        (BuiltinType::UnboundLocalError, BuiltinType::NameError),
        (BuiltinType::DeprecationWarning, BuiltinType::RuntimeWarning),
        (BuiltinType::RuntimeWarning, BuiltinType::Warning),
        (BuiltinType::TypeError, BuiltinType::Exception),
        (BuiltinType::Exception, BuiltinType::BaseException),
    ];

    for (sub, base) in pairs {
        assert_eq!(types.builtin(sub).base(), Some(base.type_id()), "{}", sub);
    }
}

#[test]
fn key_error_text_and_repr() {
    let rt = setup();
    let exc = PyException::key_error(rt.new_str("spam"), "missing spam");

    assert_eq!(exc.to_string(), "KeyError: missing spam");
    assert_eq!(
        object::repr_text(&rt, &exc.to_object()).unwrap(),
        "KeyError('missing spam')"
    );
    assert_eq!(object::str_text(&rt, &exc.to_object()).unwrap(), "missing spam");
    assert_eq!(exc.key().and_then(|k| k.downcast_str()), Some("spam"));
}

#[test]
fn exceptions_are_ordinary_values() {
    let rt = setup();
    let exc = PyException::type_error("bad operand");
    let value = exc.to_object();

    assert_eq!(rt.type_of(&value).name(), "TypeError");
    assert_eq!(value.py_type(), BuiltinType::TypeError.type_id());
    assert_eq!(exc.value().args().len(), 1);
}

#[test]
fn user_exception_types() {
    let mut rt = setup();
    let custom = rt
        .build_type(&TypeSpec::new("CustomError").base(BuiltinType::ValueError.type_id()))
        .unwrap();

    let exc = PyException::with_type(rt.lookup_type(custom), "custom failure");
    let types = rt.types();

    assert!(exc.is_instance(types, BuiltinType::ValueError.type_id()));
    assert!(exc.is_instance(types, BuiltinType::Exception.type_id()));
    assert!(!exc.is_instance(types, BuiltinType::LookupError.type_id()));
    assert_eq!(exc.to_string(), "CustomError: custom failure");
    assert_eq!(
        object::repr_text(&rt, &exc.to_object()).unwrap(),
        "CustomError('custom failure')"
    );
}
