use std::any::Any;

use pyslot_core::{BuiltinType, Slot, TypeId};

use crate::{
    exception::PyResult,
    object::{PyObject, PyObjectRef, SlotFn, TypeSpec},
    rt::Runtime,
};

/// The `None` value. The runtime only ever holds one.
#[derive(Debug)]
pub struct PyNone;

impl PyObject for PyNone {
    fn py_type(&self) -> TypeId {
        BuiltinType::NoneType.type_id()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Returned by a binary slot that cannot handle its operands.
#[derive(Debug)]
pub struct PyNotImplemented;

impl PyObject for PyNotImplemented {
    fn py_type(&self) -> TypeId {
        BuiltinType::NotImplementedType.type_id()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn none_repr(rt: &Runtime, _: &PyObjectRef) -> PyResult<PyObjectRef> {
    Ok(rt.new_str("None"))
}

fn none_bool(_: &Runtime, _: &PyObjectRef) -> PyResult<bool> {
    Ok(false)
}

fn not_implemented_repr(rt: &Runtime, _: &PyObjectRef) -> PyResult<PyObjectRef> {
    Ok(rt.new_str("NotImplemented"))
}

pub(super) fn none_type_spec() -> TypeSpec {
    TypeSpec::new("NoneType")
        .slot(Slot::Repr, SlotFn::Unary(none_repr))
        .slot(Slot::Bool, SlotFn::Predicate(none_bool))
}

pub(super) fn not_implemented_type_spec() -> TypeSpec {
    TypeSpec::new("NotImplementedType").slot(Slot::Repr, SlotFn::Unary(not_implemented_repr))
}
