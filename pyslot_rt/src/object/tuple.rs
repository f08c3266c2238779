use std::any::Any;

use pyslot_core::{BuiltinType, Slot, TypeId};

use crate::{
    exception::{PyException, PyResult},
    object::{receiver, PyObject, PyObjectRef, SlotFn, TypeSpec},
    protocol::{
        object::hash,
        sequence::{join_reprs, repeat_items, resolve_index, slice_contains, slices_equal},
    },
    rt::Runtime,
};

const XXPRIME_1: u64 = 11400714785074694791;
const XXPRIME_2: u64 = 14029467366897019727;
const XXPRIME_5: u64 = 2870177450012600261;

/// An immutable sequence.
#[derive(Debug)]
pub struct PyTuple {
    ty: TypeId,
    items: Vec<PyObjectRef>,
}

impl PyTuple {
    pub fn new(items: Vec<PyObjectRef>) -> Self {
        Self::with_type(BuiltinType::Tuple.type_id(), items)
    }

    pub fn with_type(ty: TypeId, items: Vec<PyObjectRef>) -> Self {
        Self { ty, items }
    }

    pub fn items(&self) -> &[PyObjectRef] {
        &self.items
    }
}

impl PyObject for PyTuple {
    fn py_type(&self) -> TypeId {
        self.ty
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn this<'a>(rt: &Runtime, obj: &'a PyObjectRef) -> PyResult<&'a [PyObjectRef]> {
    receiver::<PyTuple>(rt, obj, BuiltinType::Tuple).map(PyTuple::items)
}

fn tuple_repr(rt: &Runtime, obj: &PyObjectRef) -> PyResult<PyObjectRef> {
    let items = this(rt, obj)?;

    let text = match items {
        [single] => format!("({},)", crate::protocol::object::repr_text(rt, single)?),
        _ => join_reprs(rt, items, "(", ")")?,
    };

    Ok(rt.new_str(text))
}

fn tuple_hash(rt: &Runtime, obj: &PyObjectRef) -> PyResult<i64> {
    let items = this(rt, obj)?;
    let mut acc = XXPRIME_5;

    for item in items {
        let lane = hash(rt, item)? as u64;
        acc = acc.wrapping_add(lane.wrapping_mul(XXPRIME_2));
        acc = acc.rotate_left(31);
        acc = acc.wrapping_mul(XXPRIME_1);
    }

    acc = acc.wrapping_add(items.len() as u64 ^ (XXPRIME_5 ^ 3527539));

    if acc == u64::MAX {
        Ok(1546275796)
    } else {
        Ok(acc as i64)
    }
}

fn tuple_eq(rt: &Runtime, obj: &PyObjectRef, other: &PyObjectRef) -> PyResult<PyObjectRef> {
    let lhs = this(rt, obj)?;

    match other.downcast_ref::<PyTuple>() {
        Some(rhs) => Ok(rt.new_bool(slices_equal(rt, lhs, rhs.items())?)),
        None => Ok(rt.not_implemented()),
    }
}

fn tuple_ne(rt: &Runtime, obj: &PyObjectRef, other: &PyObjectRef) -> PyResult<PyObjectRef> {
    let lhs = this(rt, obj)?;

    match other.downcast_ref::<PyTuple>() {
        Some(rhs) => Ok(rt.new_bool(!slices_equal(rt, lhs, rhs.items())?)),
        None => Ok(rt.not_implemented()),
    }
}

fn tuple_len(rt: &Runtime, obj: &PyObjectRef) -> PyResult<usize> {
    Ok(this(rt, obj)?.len())
}

fn tuple_contains(rt: &Runtime, obj: &PyObjectRef, item: &PyObjectRef) -> PyResult<bool> {
    slice_contains(rt, this(rt, obj)?, item)
}

fn tuple_getitem(rt: &Runtime, obj: &PyObjectRef, key: &PyObjectRef) -> PyResult<PyObjectRef> {
    let items = this(rt, obj)?;

    match resolve_index(rt, key, items.len(), "tuple")? {
        Some(n) => Ok(items[n].clone()),
        None => PyException::index_error("tuple index out of range").into(),
    }
}

fn tuple_repeat(rt: &Runtime, obj: &PyObjectRef, count: isize) -> PyResult<PyObjectRef> {
    let items = this(rt, obj)?;

    if count == 1 {
        return Ok(obj.clone());
    }

    Ok(rt.new_tuple(repeat_items(items, count)?))
}

pub(super) fn type_spec() -> TypeSpec {
    TypeSpec::new("tuple")
        .slot(Slot::Repr, SlotFn::Unary(tuple_repr))
        .slot(Slot::Hash, SlotFn::Hash(tuple_hash))
        .slot(Slot::Eq, SlotFn::Binary(tuple_eq))
        .slot(Slot::Ne, SlotFn::Binary(tuple_ne))
        .slot(Slot::Len, SlotFn::Len(tuple_len))
        .slot(Slot::Contains, SlotFn::BinaryPredicate(tuple_contains))
        .slot(Slot::GetItem, SlotFn::Binary(tuple_getitem))
        .slot(Slot::Repeat, SlotFn::Repeat(tuple_repeat))
}
