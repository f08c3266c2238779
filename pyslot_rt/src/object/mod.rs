//! Runtime values and the type descriptors that describe them.

use std::{any::Any, cell::RefCell, fmt, rc::Rc};

use ahash::AHashMap;
use pyslot_core::{BuiltinType, TypeId};

use crate::{
    exception::{PyException, PyResult},
    rt::Runtime,
};

mod base;
mod dict;
mod exc;
mod int;
mod list;
mod pytype;
mod singletons;
mod string;
mod tuple;

pub use {
    base::PyBaseObject,
    dict::{MergeMode, PyDict},
    exc::PyBaseException,
    int::PyInt,
    list::PyList,
    pytype::*,
    singletons::{PyNone, PyNotImplemented},
    string::PyStr,
    tuple::PyTuple,
};

pub(crate) use pytype::builtin_spec;

/// A shared handle to a runtime value, identity is pointer identity.
pub type PyObjectRef = Rc<dyn PyObject>;

/// The capability every runtime value exposes.
pub trait PyObject: fmt::Debug + 'static {
    /// The type descriptor of this value.
    fn py_type(&self) -> TypeId;

    /// Used to recover the concrete value behind a `dyn PyObject`.
    ///
    /// The body should always be `self`.
    fn as_any(&self) -> &dyn Any;

    /// The per-instance attribute mapping, for types that support one.
    fn instance_dict(&self) -> Option<&InstanceDict> {
        None
    }
}

impl dyn PyObject {
    pub fn downcast_ref<T: PyObject>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn downcast_str(&self) -> Option<&str> {
        self.downcast_ref::<PyStr>().map(PyStr::as_str)
    }
}

/// Whether `a` and `b` are the same object.
#[inline]
pub fn is(a: &PyObjectRef, b: &PyObjectRef) -> bool {
    Rc::ptr_eq(a, b)
}

/// Recover the concrete receiver of a slot function.
///
/// Fails with a `TypeError` when a type inherited a slot from `owner` but its
/// instances do not have the layout that slot expects.
pub(crate) fn receiver<'a, T: PyObject>(
    rt: &Runtime,
    this: &'a PyObjectRef,
    owner: BuiltinType,
) -> PyResult<&'a T> {
    match this.downcast_ref::<T>() {
        Some(value) => Ok(value),
        None => PyException::type_error(format!(
            "descriptor requires a '{}' object but received a '{}'",
            owner.name(),
            crate::protocol::object::truncated(rt.type_of(this).name())
        ))
        .into(),
    }
}

/// A string-keyed attribute mapping that is only allocated on first write.
#[derive(Default)]
pub struct InstanceDict {
    inner: RefCell<Option<AHashMap<String, PyObjectRef>>>,
}

impl InstanceDict {
    pub fn is_created(&self) -> bool {
        self.inner.borrow().is_some()
    }

    pub fn get(&self, name: &str) -> Option<PyObjectRef> {
        self.inner.borrow().as_ref()?.get(name).cloned()
    }

    pub fn set(&self, name: &str, value: PyObjectRef) -> Option<PyObjectRef> {
        self.inner
            .borrow_mut()
            .get_or_insert_with(AHashMap::new)
            .insert(name.to_owned(), value)
    }

    pub fn remove(&self, name: &str) -> Option<PyObjectRef> {
        self.inner.borrow_mut().as_mut()?.remove(name)
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().as_ref().map_or(0, |map| map.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for InstanceDict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.inner.borrow() {
            None => f.write_str("InstanceDict(<absent>)"),
            Some(map) => f
                .debug_map()
                .entries(map.iter())
                .finish(),
        }
    }
}
