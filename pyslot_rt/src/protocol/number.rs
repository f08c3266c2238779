use num_traits::{Signed, ToPrimitive};
use pyslot_core::{BuiltinType, Slot};

use crate::{
    exception::{PyException, PyResult, PyResultExt},
    object::{PyInt, PyObjectRef},
    protocol::object::{type_error_for, type_name},
    rt::Runtime,
};

/// Whether `o` can be used where an integer index is expected.
pub fn index_check(rt: &Runtime, obj: &PyObjectRef) -> bool {
    rt.type_of(obj).is_defined(Slot::Index)
}

fn is_int(rt: &Runtime, obj: &PyObjectRef) -> bool {
    rt.types()
        .is_subtype(rt.type_of(obj).id(), BuiltinType::Int.type_id())
        && obj.downcast_ref::<PyInt>().is_some()
}

/// `operator.index(o)`: `o` as an `int` (or an instance of an `int` subtype).
pub fn index(rt: &Runtime, obj: &PyObjectRef) -> PyResult<PyObjectRef> {
    if is_int(rt, obj) {
        return Ok(obj.clone());
    }

    let f = match rt.type_of(obj).unary(Slot::Index) {
        Some(f) => f,
        None => return type_error_for(rt, "'{}' object cannot be interpreted as an integer", obj),
    };

    let result = f(rt, obj).trace()?;

    if !is_int(rt, &result) {
        return PyException::type_error(format!(
            "__index__ returned non-int (type {})",
            type_name(rt, &result)
        ))
        .into();
    }

    if rt.type_of(&result).id() != BuiltinType::Int.type_id() {
        rt.warn(
            Some(BuiltinType::DeprecationWarning.type_id()),
            1,
            format!(
                "__index__ returned non-int (type {}).  The ability to return an instance of a \
                 strict subclass of int is deprecated, and may be removed in a future version of \
                 Python.",
                type_name(rt, &result)
            ),
        )?;
    }

    Ok(result)
}

/// `o` as a host index.
///
/// On overflow, raises `overflow` with a message naming `o`'s type when it is
/// given, otherwise clips to `isize::MIN` or `isize::MAX`.
pub fn as_size(rt: &Runtime, obj: &PyObjectRef, overflow: Option<BuiltinType>) -> PyResult<isize> {
    let value = index(rt, obj)?;

    let int = match value.downcast_ref::<PyInt>() {
        Some(int) => int.value(),
        None => return type_error_for(rt, "'{}' object cannot be interpreted as an integer", obj),
    };

    match (int.to_isize(), overflow) {
        (Some(n), _) => Ok(n),
        (None, Some(kind)) => PyException::new(
            kind,
            format!(
                "cannot fit '{}' into an index-sized integer",
                type_name(rt, obj)
            ),
        )
        .into(),
        (None, None) if int.is_negative() => Ok(isize::MIN),
        (None, None) => Ok(isize::MAX),
    }
}
