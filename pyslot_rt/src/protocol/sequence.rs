use pyslot_core::{BuiltinType, Slot};

use crate::{
    exception::{PyException, PyResult, PyResultExt},
    object::{is, PyDict, PyObjectRef},
    protocol::{
        comparison::Comparison,
        number,
        object::{repr_text, rich_compare_bool, type_error_for, type_name},
    },
    rt::Runtime,
};

/// Whether `s` is sequence-like.
///
/// `dict` (and instances of its subtypes) never are, anything else that can
/// be subscripted is. A runtime-built mapping type that declares `GetItem`
/// will therefore be classified as a sequence.
pub fn check(rt: &Runtime, obj: &PyObjectRef) -> bool {
    obj.downcast_ref::<PyDict>().is_none() && rt.type_of(obj).is_defined(Slot::GetItem)
}

/// `len(s)` through the sequence slot only.
pub fn size(rt: &Runtime, obj: &PyObjectRef) -> PyResult<usize> {
    match rt.type_of(obj).len_fn(Slot::Len) {
        Some(f) => f(rt, obj).trace(),
        None => type_error_for(rt, "object of type '{}' has no len()", obj),
    }
}

/// `s[i]`
pub fn get_item(rt: &Runtime, obj: &PyObjectRef, i: isize) -> PyResult<PyObjectRef> {
    match rt.type_of(obj).binary(Slot::GetItem) {
        Some(f) => {
            let key = rt.new_int(i as i64);
            f(rt, obj, &key).trace()
        }
        None => type_error_for(rt, "'{}' object does not support indexing", obj),
    }
}

/// `s[i] = value`
pub fn set_item(rt: &Runtime, obj: &PyObjectRef, i: isize, value: PyObjectRef) -> PyResult<()> {
    match rt.type_of(obj).set_item_fn(Slot::SetItem) {
        Some(f) => {
            let key = rt.new_int(i as i64);
            f(rt, obj, &key, value).trace()
        }
        None => type_error_for(rt, "'{}' object does not support item assignment", obj),
    }
}

/// `del s[i]`
pub fn del_item(rt: &Runtime, obj: &PyObjectRef, i: isize) -> PyResult<()> {
    match rt.type_of(obj).del_item_fn(Slot::DelItem) {
        Some(f) => {
            let key = rt.new_int(i as i64);
            f(rt, obj, &key).trace()
        }
        None => type_error_for(rt, "'{}' object does not support item deletion", obj),
    }
}

/// `s * n`
pub fn repeat(rt: &Runtime, obj: &PyObjectRef, n: &PyObjectRef) -> PyResult<PyObjectRef> {
    if !number::index_check(rt, n) {
        return type_error_for(rt, "can't multiply sequence by non-int of type '{}'", n);
    }

    let count = number::as_size(rt, n, Some(BuiltinType::OverflowError))?;

    match rt.type_of(obj).repeat_fn(Slot::Repeat) {
        Some(f) => f(rt, obj, count).trace(),
        None => type_error_for(rt, "'{}' object can't be repeated", obj),
    }
}

/// Resolve `key` to a position in a sequence of `len` items.
///
/// Negative positions count from the end. `Ok(None)` means out of range.
pub(crate) fn resolve_index(
    rt: &Runtime,
    key: &PyObjectRef,
    len: usize,
    kind: &str,
) -> PyResult<Option<usize>> {
    if !number::index_check(rt, key) {
        return PyException::type_error(format!(
            "{} indices must be integers or slices, not {}",
            kind,
            type_name(rt, key)
        ))
        .into();
    }

    let n = number::as_size(rt, key, Some(BuiltinType::IndexError))?;
    let len = len as isize;
    let n = if n < 0 { n + len } else { n };

    if (0..len).contains(&n) {
        Ok(Some(n as usize))
    } else {
        Ok(None)
    }
}

pub(crate) fn join_reprs(
    rt: &Runtime,
    items: &[PyObjectRef],
    open: &str,
    close: &str,
) -> PyResult<String> {
    let mut parts = Vec::with_capacity(items.len());

    for item in items {
        parts.push(repr_text(rt, item)?);
    }

    Ok(format!("{}{}{}", open, parts.join(", "), close))
}

pub(crate) fn repeat_items(items: &[PyObjectRef], count: isize) -> PyResult<Vec<PyObjectRef>> {
    if count <= 0 || items.is_empty() {
        return Ok(vec![]);
    }

    let count = count as usize;

    match items.len().checked_mul(count) {
        Some(size) if size <= isize::MAX as usize / std::mem::size_of::<PyObjectRef>() => {
            let mut out = Vec::with_capacity(size);

            for _ in 0..count {
                out.extend(items.iter().cloned());
            }

            Ok(out)
        }
        _ => PyException::overflow_error("cannot fit repeated sequence in memory").into(),
    }
}

pub(crate) fn slice_contains(rt: &Runtime, items: &[PyObjectRef], item: &PyObjectRef) -> PyResult<bool> {
    for candidate in items {
        if is(candidate, item) || rich_compare_bool(rt, candidate, item, Comparison::Eq)? {
            return Ok(true);
        }
    }

    Ok(false)
}

pub(crate) fn slices_equal(rt: &Runtime, lhs: &[PyObjectRef], rhs: &[PyObjectRef]) -> PyResult<bool> {
    if lhs.len() != rhs.len() {
        return Ok(false);
    }

    for (a, b) in lhs.iter().zip(rhs) {
        if !rich_compare_bool(rt, a, b, Comparison::Eq)? {
            return Ok(false);
        }
    }

    Ok(true)
}
