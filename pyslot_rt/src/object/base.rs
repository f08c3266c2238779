use std::{any::Any, rc::Rc};

use pyslot_core::{BuiltinType, Slot, TypeId};

use crate::{
    exception::PyResult,
    object::{is, InstanceDict, PyObject, PyObjectRef, SlotFn, TypeSpec},
    protocol::object::{repr, truncated},
    rt::Runtime,
};

/// An instance of `object`, or of a runtime-built type with no more specific layout.
#[derive(Debug)]
pub struct PyBaseObject {
    ty: TypeId,
    dict: InstanceDict,
}

impl PyBaseObject {
    pub fn new(ty: TypeId) -> Self {
        Self {
            ty,
            dict: InstanceDict::default(),
        }
    }
}

impl Default for PyBaseObject {
    fn default() -> Self {
        Self::new(BuiltinType::Object.type_id())
    }
}

impl PyObject for PyBaseObject {
    fn py_type(&self) -> TypeId {
        self.ty
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn instance_dict(&self) -> Option<&InstanceDict> {
        Some(&self.dict)
    }
}

fn object_repr(rt: &Runtime, this: &PyObjectRef) -> PyResult<PyObjectRef> {
    let name = truncated(rt.type_of(this).name());
    let addr = Rc::as_ptr(this) as *const () as usize;

    Ok(rt.new_str(format!("<{} object at {:#x}>", name, addr)))
}

fn object_str(rt: &Runtime, this: &PyObjectRef) -> PyResult<PyObjectRef> {
    repr(rt, this)
}

fn object_hash(_: &Runtime, this: &PyObjectRef) -> PyResult<i64> {
    let addr = Rc::as_ptr(this) as *const () as usize;

    Ok((addr >> 4) as i64)
}

fn object_eq(rt: &Runtime, this: &PyObjectRef, other: &PyObjectRef) -> PyResult<PyObjectRef> {
    if is(this, other) {
        Ok(rt.new_bool(true))
    } else {
        Ok(rt.not_implemented())
    }
}

fn object_ne(rt: &Runtime, this: &PyObjectRef, other: &PyObjectRef) -> PyResult<PyObjectRef> {
    if is(this, other) {
        Ok(rt.new_bool(false))
    } else {
        Ok(rt.not_implemented())
    }
}

pub(super) fn type_spec() -> TypeSpec {
    TypeSpec::new("object")
        .slot(Slot::Repr, SlotFn::Unary(object_repr))
        .slot(Slot::Str, SlotFn::Unary(object_str))
        .slot(Slot::Hash, SlotFn::Hash(object_hash))
        .slot(Slot::Eq, SlotFn::Binary(object_eq))
        .slot(Slot::Ne, SlotFn::Binary(object_ne))
}
