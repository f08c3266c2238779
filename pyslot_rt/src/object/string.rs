use std::{any::Any, cmp::Ordering, fmt::Write};

use pyslot_core::{BuiltinType, Slot, TypeId};

use crate::{
    exception::{PyException, PyResult},
    object::{receiver, PyObject, PyObjectRef, SlotFn, TypeSpec},
    protocol::{object::truncated, sequence::resolve_index},
    rt::Runtime,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PyStr {
    ty: TypeId,
    value: String,
}

impl PyStr {
    pub fn new<S: Into<String>>(value: S) -> Self {
        Self::with_type(BuiltinType::Str.type_id(), value)
    }

    pub fn with_type<S: Into<String>>(ty: TypeId, value: S) -> Self {
        Self {
            ty,
            value: value.into(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl PyObject for PyStr {
    fn py_type(&self) -> TypeId {
        self.ty
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Quote and escape `s` the way `repr` shows text.
pub(crate) fn quoted(s: &str) -> String {
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };

    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);

    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_control() => {
                let _ = write!(out, "\\x{:02x}", c as u32);
            }
            c => out.push(c),
        }
    }

    out.push(quote);
    out
}

fn this<'a>(rt: &Runtime, obj: &'a PyObjectRef) -> PyResult<&'a str> {
    receiver::<PyStr>(rt, obj, BuiltinType::Str).map(PyStr::as_str)
}

fn str_repr(rt: &Runtime, obj: &PyObjectRef) -> PyResult<PyObjectRef> {
    Ok(rt.new_str(quoted(this(rt, obj)?)))
}

fn str_str(rt: &Runtime, obj: &PyObjectRef) -> PyResult<PyObjectRef> {
    if rt.type_of(obj).id() == BuiltinType::Str.type_id() {
        Ok(obj.clone())
    } else {
        Ok(rt.new_str(this(rt, obj)?))
    }
}

fn str_hash(rt: &Runtime, obj: &PyObjectRef) -> PyResult<i64> {
    Ok(rt.hash_str(this(rt, obj)?))
}

fn str_len(rt: &Runtime, obj: &PyObjectRef) -> PyResult<usize> {
    Ok(this(rt, obj)?.chars().count())
}

fn str_contains(rt: &Runtime, obj: &PyObjectRef, item: &PyObjectRef) -> PyResult<bool> {
    let haystack = this(rt, obj)?;

    match item.downcast_str() {
        Some(needle) => Ok(haystack.contains(needle)),
        None => PyException::type_error(format!(
            "'in <string>' requires string as left operand, not {}",
            truncated(rt.type_of(item).name())
        ))
        .into(),
    }
}

fn str_getitem(rt: &Runtime, obj: &PyObjectRef, key: &PyObjectRef) -> PyResult<PyObjectRef> {
    let text = this(rt, obj)?;
    let len = text.chars().count();

    match resolve_index(rt, key, len, "string")? {
        Some(n) => {
            let ch = text.chars().nth(n).map(String::from).unwrap_or_default();
            Ok(rt.new_str(ch))
        }
        None => PyException::index_error("string index out of range").into(),
    }
}

fn str_repeat(rt: &Runtime, obj: &PyObjectRef, count: isize) -> PyResult<PyObjectRef> {
    let text = this(rt, obj)?;

    if count <= 0 || text.is_empty() {
        return Ok(rt.new_str(""));
    }

    let count = count as usize;

    match text.len().checked_mul(count) {
        Some(size) if size <= isize::MAX as usize => Ok(rt.new_str(text.repeat(count))),
        _ => PyException::overflow_error("repeated string is too long").into(),
    }
}

fn compare(
    rt: &Runtime,
    obj: &PyObjectRef,
    other: &PyObjectRef,
    accept: fn(Ordering) -> bool,
) -> PyResult<PyObjectRef> {
    let lhs = this(rt, obj)?;

    match other.downcast_str() {
        Some(rhs) => Ok(rt.new_bool(accept(lhs.cmp(rhs)))),
        None => Ok(rt.not_implemented()),
    }
}

macro_rules! str_comparisons {
    ($($name:ident => $accept:expr,)+) => {
        $(
            fn $name(rt: &Runtime, obj: &PyObjectRef, other: &PyObjectRef) -> PyResult<PyObjectRef> {
                compare(rt, obj, other, $accept)
            }
        )+
    };
}

str_comparisons!(
    str_lt => Ordering::is_lt,
    str_le => Ordering::is_le,
    str_eq => Ordering::is_eq,
    str_ne => Ordering::is_ne,
    str_gt => Ordering::is_gt,
    str_ge => Ordering::is_ge,
);

pub(super) fn type_spec() -> TypeSpec {
    TypeSpec::new("str")
        .slot(Slot::Repr, SlotFn::Unary(str_repr))
        .slot(Slot::Str, SlotFn::Unary(str_str))
        .slot(Slot::Hash, SlotFn::Hash(str_hash))
        .slot(Slot::Lt, SlotFn::Binary(str_lt))
        .slot(Slot::Le, SlotFn::Binary(str_le))
        .slot(Slot::Eq, SlotFn::Binary(str_eq))
        .slot(Slot::Ne, SlotFn::Binary(str_ne))
        .slot(Slot::Gt, SlotFn::Binary(str_gt))
        .slot(Slot::Ge, SlotFn::Binary(str_ge))
        .slot(Slot::Len, SlotFn::Len(str_len))
        .slot(Slot::Contains, SlotFn::BinaryPredicate(str_contains))
        .slot(Slot::GetItem, SlotFn::Binary(str_getitem))
        .slot(Slot::Repeat, SlotFn::Repeat(str_repeat))
}
