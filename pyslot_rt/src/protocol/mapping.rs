use pyslot_core::Slot;

use crate::{
    exception::{PyResult, PyResultExt},
    object::PyObjectRef,
    protocol::object::type_error_for,
    rt::Runtime,
};

/// Whether `o` supports subscription at all.
pub fn check(rt: &Runtime, obj: &PyObjectRef) -> bool {
    rt.type_of(obj).is_defined(Slot::GetItem)
}

/// `len(m)` through the mapping slot.
pub fn size(rt: &Runtime, obj: &PyObjectRef) -> PyResult<usize> {
    let ty = rt.type_of(obj);

    if let Some(f) = ty.len_fn(Slot::MappingLen) {
        return f(rt, obj).trace();
    }

    if ty.is_defined(Slot::Len) {
        return type_error_for(rt, "'{}' is not a mapping", obj);
    }

    type_error_for(rt, "object of type '{}' has no len()", obj)
}
