use pyslot_core::{BuiltinType, Slot};

use crate::{
    exception::{PyException, PyResult, PyResultExt},
    object::{is, PyObjectRef},
    protocol::{comparison::Comparison, mapping},
    rt::Runtime,
};

const NAME_LIMIT: usize = 200;

/// At most the first 200 characters of a type name, for use in messages.
pub fn truncated(name: &str) -> &str {
    match name.char_indices().nth(NAME_LIMIT) {
        Some((end, _)) => &name[..end],
        None => name,
    }
}

pub(crate) fn type_name<'a>(rt: &'a Runtime, obj: &PyObjectRef) -> &'a str {
    truncated(rt.type_of(obj).name())
}

#[track_caller]
pub(crate) fn type_error_for<T>(rt: &Runtime, template: &str, obj: &PyObjectRef) -> PyResult<T> {
    PyException::type_error(template.replace("{}", type_name(rt, obj))).into()
}

fn check_str_result(
    rt: &Runtime,
    method: &str,
    result: PyObjectRef,
) -> PyResult<PyObjectRef> {
    if result.downcast_str().is_some() {
        Ok(result)
    } else {
        PyException::type_error(format!(
            "{} returned non-string (type {})",
            method,
            type_name(rt, &result)
        ))
        .into()
    }
}

/// `repr(o)`
pub fn repr(rt: &Runtime, obj: &PyObjectRef) -> PyResult<PyObjectRef> {
    match rt.type_of(obj).unary(Slot::Repr) {
        Some(f) => check_str_result(rt, "__repr__", f(rt, obj).trace()?),
        None => Ok(rt.new_str(format!("<{} object>", type_name(rt, obj)))),
    }
}

/// `repr(o)` as host text.
pub fn repr_text(rt: &Runtime, obj: &PyObjectRef) -> PyResult<String> {
    let text = repr(rt, obj)?;
    Ok(text.downcast_str().unwrap_or_default().to_owned())
}

/// `str(o)`, falling back to `repr(o)`.
pub fn str(rt: &Runtime, obj: &PyObjectRef) -> PyResult<PyObjectRef> {
    if rt.type_of(obj).id() == BuiltinType::Str.type_id() {
        return Ok(obj.clone());
    }

    match rt.type_of(obj).unary(Slot::Str) {
        Some(f) => check_str_result(rt, "__str__", f(rt, obj).trace()?),
        None => repr(rt, obj),
    }
}

pub fn str_text(rt: &Runtime, obj: &PyObjectRef) -> PyResult<String> {
    let text = str(rt, obj)?;
    Ok(text.downcast_str().unwrap_or_default().to_owned())
}

/// `hash(o)`
pub fn hash(rt: &Runtime, obj: &PyObjectRef) -> PyResult<i64> {
    match rt.type_of(obj).hash_fn(Slot::Hash) {
        Some(f) => f(rt, obj).trace(),
        None => type_error_for(rt, "unhashable type: '{}'", obj),
    }
}

/// The truth value of `o`.
pub fn is_true(rt: &Runtime, obj: &PyObjectRef) -> PyResult<bool> {
    if is(obj, &rt.new_bool(true)) {
        return Ok(true);
    } else if is(obj, &rt.new_bool(false)) || is(obj, &rt.none()) {
        return Ok(false);
    }

    let ty = rt.type_of(obj);

    if let Some(f) = ty.predicate(Slot::Bool) {
        f(rt, obj).trace()
    } else if let Some(f) = ty.len_fn(Slot::Len).or_else(|| ty.len_fn(Slot::MappingLen)) {
        Ok(f(rt, obj).trace()? != 0)
    } else {
        Ok(true)
    }
}

/// `len(o)`, trying the sequence spelling of the slot before the mapping one.
pub fn size(rt: &Runtime, obj: &PyObjectRef) -> PyResult<usize> {
    if let Some(f) = rt.type_of(obj).len_fn(Slot::Len) {
        return f(rt, obj).trace();
    }

    tracing::trace!("[object::size] no sequence length on {}", type_name(rt, obj));

    mapping::size(rt, obj)
}

/// `o[key]`
pub fn get_item(rt: &Runtime, obj: &PyObjectRef, key: &PyObjectRef) -> PyResult<PyObjectRef> {
    match rt.type_of(obj).binary(Slot::GetItem) {
        Some(f) => f(rt, obj, key).trace(),
        None => type_error_for(rt, "'{}' object is not subscriptable", obj),
    }
}

/// `o[key] = value`
pub fn set_item(
    rt: &Runtime,
    obj: &PyObjectRef,
    key: &PyObjectRef,
    value: PyObjectRef,
) -> PyResult<()> {
    match rt.type_of(obj).set_item_fn(Slot::SetItem) {
        Some(f) => f(rt, obj, key, value).trace(),
        None => type_error_for(rt, "'{}' object does not support item assignment", obj),
    }
}

/// `del o[key]`
pub fn del_item(rt: &Runtime, obj: &PyObjectRef, key: &PyObjectRef) -> PyResult<()> {
    match rt.type_of(obj).del_item_fn(Slot::DelItem) {
        Some(f) => f(rt, obj, key).trace(),
        None => type_error_for(rt, "'{}' object does not support item deletion", obj),
    }
}

/// `v <op> w`
pub fn rich_compare(
    rt: &Runtime,
    v: &PyObjectRef,
    w: &PyObjectRef,
    op: Comparison,
) -> PyResult<PyObjectRef> {
    op.apply(rt, v, w)
}

/// `v <op> w` reduced to a host bool. Identity implies equality.
pub fn rich_compare_bool(
    rt: &Runtime,
    v: &PyObjectRef,
    w: &PyObjectRef,
    op: Comparison,
) -> PyResult<bool> {
    if is(v, w) {
        match op {
            Comparison::Eq => return Ok(true),
            Comparison::Ne => return Ok(false),
            _ => (),
        }
    }

    let result = rich_compare(rt, v, w, op)?;
    is_true(rt, &result)
}

/// `item in container`
pub fn contains(rt: &Runtime, container: &PyObjectRef, item: &PyObjectRef) -> PyResult<bool> {
    match rt.type_of(container).binary_predicate(Slot::Contains) {
        Some(f) => f(rt, container, item).trace(),
        None => type_error_for(rt, "'{}' object is not a container", container),
    }
}
