use std::{fmt, panic::Location, rc::Rc};

use pyslot_core::{BuiltinType, TypeId};

use crate::{
    object::{PyBaseException, PyObjectRef, PyType},
    rt::TypeRegistry,
};

pub type PyResult<T> = ::std::result::Result<T, self::PyException>;

pub trait PyResultExt {
    fn trace(self) -> Self;
}

impl<T> PyResultExt for PyResult<T> {
    #[track_caller]
    fn trace(self) -> Self {
        match self {
            ok @ Ok(_) => ok,
            Err(mut exc) => {
                exc.trace.push(TracePoint {
                    location: Some(*Location::caller()),
                });

                Err(exc)
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct TracePoint {
    pub location: Option<Location<'static>>,
}

/// A language-level exception in flight.
///
/// The exception value itself is an ordinary runtime object (see
/// [`PyBaseException`]), this wrapper adds the host call sites it has
/// propagated through.
#[derive(Debug, Clone)]
pub struct PyException {
    pub(crate) value: Rc<PyBaseException>,
    pub(crate) trace: Vec<TracePoint>,
}

impl PyException {
    #[track_caller]
    fn from_value(value: PyBaseException) -> Self {
        let this = Self {
            value: Rc::new(value),
            trace: Vec::with_capacity(2),
        };

        this.traced()
    }

    #[track_caller]
    fn traced(mut self) -> Self {
        self.trace.push(TracePoint {
            location: Some(*Location::caller()),
        });

        self
    }

    /// An exception of a builtin kind with an already formatted message.
    #[track_caller]
    pub fn new<S>(kind: BuiltinType, message: S) -> Self
    where
        S: Into<String>,
    {
        debug_assert!(kind.is_exception(), "{} is not an exception type", kind);

        Self::from_value(PyBaseException::new(
            kind.type_id(),
            kind.name(),
            message.into(),
        ))
    }

    /// An exception whose type was built at runtime.
    #[track_caller]
    pub fn with_type<S>(ty: &PyType, message: S) -> Self
    where
        S: Into<String>,
    {
        debug_assert!(
            ty.mro().contains(&BuiltinType::BaseException.type_id()),
            "{} is not an exception type",
            ty.name()
        );

        Self::from_value(PyBaseException::new(ty.id(), ty.name(), message.into()))
    }

    #[track_caller]
    pub fn type_error<S: Into<String>>(message: S) -> Self {
        Self::new(BuiltinType::TypeError, message)
    }

    #[track_caller]
    pub fn value_error<S: Into<String>>(message: S) -> Self {
        Self::new(BuiltinType::ValueError, message)
    }

    #[track_caller]
    pub fn index_error<S: Into<String>>(message: S) -> Self {
        Self::new(BuiltinType::IndexError, message)
    }

    #[track_caller]
    pub fn overflow_error<S: Into<String>>(message: S) -> Self {
        Self::new(BuiltinType::OverflowError, message)
    }

    #[track_caller]
    pub fn attribute_error<S: Into<String>>(message: S) -> Self {
        Self::new(BuiltinType::AttributeError, message)
    }

    #[track_caller]
    pub fn runtime_error<S: Into<String>>(message: S) -> Self {
        Self::new(BuiltinType::RuntimeError, message)
    }

    #[track_caller]
    pub fn not_implemented_error<S: Into<String>>(message: S) -> Self {
        Self::new(BuiltinType::NotImplementedError, message)
    }

    #[track_caller]
    pub fn name_error<S: Into<String>>(message: S) -> Self {
        Self::new(BuiltinType::NameError, message)
    }

    /// A `KeyError` carrying the offending key apart from its message.
    #[track_caller]
    pub fn key_error<S: Into<String>>(key: PyObjectRef, message: S) -> Self {
        let kind = BuiltinType::KeyError;
        let value = PyBaseException::new(kind.type_id(), kind.name(), message.into())
            .with_key(key);

        Self::from_value(value)
    }

    /// The `KeyError` raised when a merge finds a key that is already present.
    #[track_caller]
    pub fn duplicate_key(key: PyObjectRef, key_repr: &str) -> Self {
        Self::key_error(key, format!("duplicate key {}", key_repr))
    }

    pub fn type_id(&self) -> TypeId {
        self.value.ty
    }

    pub fn type_name(&self) -> &str {
        &self.value.type_name
    }

    pub fn message(&self) -> &str {
        self.value.message()
    }

    pub fn key(&self) -> Option<&PyObjectRef> {
        self.value.key.as_ref()
    }

    pub fn value(&self) -> &Rc<PyBaseException> {
        &self.value
    }

    /// The exception as a runtime value.
    pub fn to_object(&self) -> PyObjectRef {
        self.value.clone()
    }

    pub fn trace_points(&self) -> &[TracePoint] {
        &self.trace
    }

    /// Whether this exception is an instance of `ty` or one of its subtypes.
    pub fn is_instance(&self, registry: &TypeRegistry, ty: TypeId) -> bool {
        registry.is_subtype(self.value.ty, ty)
    }

    pub fn is_builtin(&self, kind: BuiltinType) -> bool {
        self.value.ty == kind.type_id()
    }
}

impl fmt::Display for PyException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.value, f)
    }
}

impl std::error::Error for PyException {}

impl<T> From<PyException> for Result<T, PyException> {
    fn from(exc: PyException) -> Self {
        Err(exc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{protocol::object, test::setup};

    #[test]
    fn key_error_rendering() {
        let rt = setup();
        let exc = PyException::key_error(rt.new_str("k"), "'k'");

        assert_eq!(exc.to_string(), "KeyError: 'k'");

        let repr = object::repr_text(&rt, &exc.to_object()).unwrap();
        assert_eq!(repr, "KeyError(''k'')");

        let key = exc.key().unwrap();
        assert_eq!(key.downcast_str(), Some("k"));
    }

    #[test]
    fn empty_message_has_no_args() {
        let exc = PyException::value_error("");
        assert!(exc.value().args.is_empty());
        assert_eq!(exc.to_string(), "ValueError: ");

        let exc = PyException::value_error(format!("bad {}", 1));
        assert_eq!(exc.value().args.len(), 1);
        assert_eq!(exc.message(), "bad 1");
    }

    #[test]
    fn is_instance_follows_bases() {
        let rt = setup();
        let exc = PyException::index_error("list index out of range");
        let types = rt.types();

        assert!(exc.is_instance(types, BuiltinType::IndexError.type_id()));
        assert!(exc.is_instance(types, BuiltinType::LookupError.type_id()));
        assert!(exc.is_instance(types, BuiltinType::BaseException.type_id()));
        assert!(!exc.is_instance(types, BuiltinType::KeyError.type_id()));
        assert!(!exc.is_instance(types, BuiltinType::Warning.type_id()));
    }

    #[test]
    fn trace_collects_call_sites() {
        fn fails() -> PyResult<()> {
            PyException::type_error("nope").into()
        }

        let exc = fails().trace().unwrap_err();
        assert_eq!(exc.trace_points().len(), 2);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "int is not an exception type")]
    fn with_type_rejects_non_exception_types() {
        let rt = setup();
        let _ = PyException::with_type(rt.types().builtin(BuiltinType::Int), "nope");
    }
}
