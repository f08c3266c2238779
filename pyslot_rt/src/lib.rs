//! `pyslot_rt` is the object model and dispatch core of the pyslot runtime.
//!
//! Every runtime value is a [`PyObject`] which knows its [`TypeId`], every
//! type is a [`PyType`] holding a resolved table of slot functions, and the
//! [`protocol`] modules turn abstract requests ("the length of this value")
//! into slot calls or typed [`PyException`]s.


pub(crate) mod exception;

pub mod object;
pub mod protocol;
pub mod rt;
pub mod warnings;

pub use {
    exception::{PyException, PyResult, PyResultExt, TracePoint},
    object::{PyObject, PyObjectRef, PyType, SlotDecl, SlotFn, SlotSource, TypeSpec},
    pyslot_core::{BuiltinType, InterpreterError, Slot, TypeId},
    rt::{Runtime, RuntimeOptions, TypeRegistry},
};
