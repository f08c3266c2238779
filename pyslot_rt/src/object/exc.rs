use std::{any::Any, fmt};

use pyslot_core::{BuiltinType, Slot, TypeId};

use crate::{
    exception::PyResult,
    object::{receiver, PyObject, PyObjectRef, PyStr, SlotFn, TypeSpec},
    rt::Runtime,
};

/// An exception instance, of `BaseException` or any type derived from it.
#[derive(Debug)]
pub struct PyBaseException {
    pub(crate) ty: TypeId,
    pub(crate) type_name: String,
    /// The formatted message as a single `str`, or nothing when it was empty.
    pub(crate) args: Vec<PyObjectRef>,
    /// The offending key of a `KeyError`.
    pub(crate) key: Option<PyObjectRef>,
}

impl PyBaseException {
    pub(crate) fn new(ty: TypeId, type_name: &str, message: String) -> Self {
        let args: Vec<PyObjectRef> = if message.is_empty() {
            vec![]
        } else {
            vec![std::rc::Rc::new(PyStr::new(message))]
        };

        Self {
            ty,
            type_name: type_name.to_owned(),
            args,
            key: None,
        }
    }

    pub(crate) fn with_key(mut self, key: PyObjectRef) -> Self {
        self.key = Some(key);
        self
    }

    pub fn args(&self) -> &[PyObjectRef] {
        &self.args
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn message(&self) -> &str {
        self.args
            .first()
            .and_then(|arg| arg.downcast_str())
            .unwrap_or("")
    }
}

impl fmt::Display for PyBaseException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.type_name, self.message())
    }
}

impl PyObject for PyBaseException {
    fn py_type(&self) -> TypeId {
        self.ty
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn exc_repr(rt: &Runtime, obj: &PyObjectRef) -> PyResult<PyObjectRef> {
    let exc = receiver::<PyBaseException>(rt, obj, BuiltinType::BaseException)?;

    Ok(rt.new_str(format!("{}('{}')", exc.type_name, exc.message())))
}

fn exc_str(rt: &Runtime, obj: &PyObjectRef) -> PyResult<PyObjectRef> {
    let exc = receiver::<PyBaseException>(rt, obj, BuiltinType::BaseException)?;

    Ok(rt.new_str(exc.message()))
}

pub(super) fn type_spec() -> TypeSpec {
    TypeSpec::new("BaseException")
        .slot(Slot::Repr, SlotFn::Unary(exc_repr))
        .slot(Slot::Str, SlotFn::Unary(exc_str))
}
