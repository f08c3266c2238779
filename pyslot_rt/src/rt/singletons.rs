use core::fmt;
use std::rc::Rc;

use crate::{
    object::{PyInt, PyNone, PyNotImplemented, PyObjectRef},
    rt::RuntimeOptions,
};

use pyslot_core::BuiltinType;

/// Values the runtime only ever holds one of.
#[derive(Clone)]
pub struct Singletons {
    pub none_v: PyObjectRef,
    pub not_implemented_v: PyObjectRef,
    pub true_v: PyObjectRef,
    pub false_v: PyObjectRef,

    /// Boxed integers for `small_int_base..small_int_base + small_ints.len()`.
    pub(crate) small_ints: Vec<PyObjectRef>,
    pub(crate) small_int_base: i64,
}

impl Singletons {
    pub(crate) fn new(options: &RuntimeOptions) -> Self {
        let bool_type = BuiltinType::Bool.type_id();

        Self {
            none_v: Rc::new(PyNone),
            not_implemented_v: Rc::new(PyNotImplemented),
            true_v: Rc::new(PyInt::with_type(bool_type, 1)),
            false_v: Rc::new(PyInt::with_type(bool_type, 0)),
            small_ints: options
                .small_ints
                .clone()
                .map(|n| Rc::new(PyInt::new(n)) as PyObjectRef)
                .collect(),
            small_int_base: *options.small_ints.start(),
        }
    }

    pub(crate) fn small_int(&self, n: i64) -> Option<&PyObjectRef> {
        let offset = n.checked_sub(self.small_int_base)?;
        self.small_ints.get(usize::try_from(offset).ok()?)
    }
}

impl fmt::Debug for Singletons {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Singletons")
            .field("none_v", &self.none_v)
            .field("not_implemented_v", &self.not_implemented_v)
            .field("true_v", &self.true_v)
            .field("false_v", &self.false_v)
            .field("small_int_base", &self.small_int_base)
            .field("small_ints", &self.small_ints.len())
            .finish()
    }
}
