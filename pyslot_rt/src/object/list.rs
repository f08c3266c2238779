use std::{any::Any, cell::RefCell};

use pyslot_core::{BuiltinType, Slot, TypeId};

use crate::{
    exception::{PyException, PyResult},
    object::{receiver, PyObject, PyObjectRef, SlotFn, TypeSpec},
    protocol::sequence::{join_reprs, repeat_items, resolve_index, slice_contains, slices_equal},
    rt::Runtime,
};

/// A mutable sequence.
#[derive(Debug)]
pub struct PyList {
    ty: TypeId,
    items: RefCell<Vec<PyObjectRef>>,
}

impl PyList {
    pub fn new(items: Vec<PyObjectRef>) -> Self {
        Self::with_type(BuiltinType::List.type_id(), items)
    }

    pub fn with_type(ty: TypeId, items: Vec<PyObjectRef>) -> Self {
        Self {
            ty,
            items: RefCell::new(items),
        }
    }

    /// A copy of the current contents, safe to hold across calls back into the runtime.
    pub fn snapshot(&self) -> Vec<PyObjectRef> {
        self.items.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn push(&self, item: PyObjectRef) {
        self.items.borrow_mut().push(item);
    }
}

impl PyObject for PyList {
    fn py_type(&self) -> TypeId {
        self.ty
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn this<'a>(rt: &Runtime, obj: &'a PyObjectRef) -> PyResult<&'a PyList> {
    receiver::<PyList>(rt, obj, BuiltinType::List)
}

fn list_repr(rt: &Runtime, obj: &PyObjectRef) -> PyResult<PyObjectRef> {
    let items = this(rt, obj)?.snapshot();
    Ok(rt.new_str(join_reprs(rt, &items, "[", "]")?))
}

fn list_eq(rt: &Runtime, obj: &PyObjectRef, other: &PyObjectRef) -> PyResult<PyObjectRef> {
    let lhs = this(rt, obj)?.snapshot();

    match other.downcast_ref::<PyList>() {
        Some(rhs) => Ok(rt.new_bool(slices_equal(rt, &lhs, &rhs.snapshot())?)),
        None => Ok(rt.not_implemented()),
    }
}

fn list_ne(rt: &Runtime, obj: &PyObjectRef, other: &PyObjectRef) -> PyResult<PyObjectRef> {
    let lhs = this(rt, obj)?.snapshot();

    match other.downcast_ref::<PyList>() {
        Some(rhs) => Ok(rt.new_bool(!slices_equal(rt, &lhs, &rhs.snapshot())?)),
        None => Ok(rt.not_implemented()),
    }
}

fn list_len(rt: &Runtime, obj: &PyObjectRef) -> PyResult<usize> {
    Ok(this(rt, obj)?.len())
}

fn list_contains(rt: &Runtime, obj: &PyObjectRef, item: &PyObjectRef) -> PyResult<bool> {
    let items = this(rt, obj)?.snapshot();
    slice_contains(rt, &items, item)
}

fn list_getitem(rt: &Runtime, obj: &PyObjectRef, key: &PyObjectRef) -> PyResult<PyObjectRef> {
    let list = this(rt, obj)?;

    match resolve_index(rt, key, list.len(), "list")? {
        Some(n) => Ok(list.items.borrow()[n].clone()),
        None => PyException::index_error("list index out of range").into(),
    }
}

fn list_setitem(
    rt: &Runtime,
    obj: &PyObjectRef,
    key: &PyObjectRef,
    value: PyObjectRef,
) -> PyResult<()> {
    let list = this(rt, obj)?;

    match resolve_index(rt, key, list.len(), "list")? {
        Some(n) => {
            // the old item is dropped after the borrow ends.
            let _old = std::mem::replace(&mut list.items.borrow_mut()[n], value);
            Ok(())
        }
        None => PyException::index_error("list assignment index out of range").into(),
    }
}

fn list_delitem(rt: &Runtime, obj: &PyObjectRef, key: &PyObjectRef) -> PyResult<()> {
    let list = this(rt, obj)?;

    match resolve_index(rt, key, list.len(), "list")? {
        Some(n) => {
            let _old = list.items.borrow_mut().remove(n);
            Ok(())
        }
        None => PyException::index_error("list assignment index out of range").into(),
    }
}

fn list_repeat(rt: &Runtime, obj: &PyObjectRef, count: isize) -> PyResult<PyObjectRef> {
    let items = this(rt, obj)?.snapshot();
    Ok(rt.new_list(repeat_items(&items, count)?))
}

pub(super) fn type_spec() -> TypeSpec {
    TypeSpec::new("list")
        .slot(Slot::Repr, SlotFn::Unary(list_repr))
        .block(Slot::Hash)
        .slot(Slot::Eq, SlotFn::Binary(list_eq))
        .slot(Slot::Ne, SlotFn::Binary(list_ne))
        .slot(Slot::Len, SlotFn::Len(list_len))
        .slot(Slot::Contains, SlotFn::BinaryPredicate(list_contains))
        .slot(Slot::GetItem, SlotFn::Binary(list_getitem))
        .slot(Slot::SetItem, SlotFn::SetItem(list_setitem))
        .slot(Slot::DelItem, SlotFn::DelItem(list_delitem))
        .slot(Slot::Repeat, SlotFn::Repeat(list_repeat))
}
