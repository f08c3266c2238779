use std::{
    cell::Cell,
    hash::{BuildHasher, Hash, Hasher},
    panic::Location,
    rc::Rc,
    sync::Arc,
};

use num_bigint::BigInt;
use num_traits::ToPrimitive;
use pyslot_core::{BuiltinType, InterpreterError, InterpreterResult, TypeId};

use crate::{
    exception::{PyException, PyResult},
    object::{
        PyBaseException, PyBaseObject, PyDict, PyInt, PyList, PyObjectRef, PyStr, PyTuple, PyType,
        SlotSource,
    },
    warnings::{StderrSink, WarningRecord, WarningSink},
};

mod options;
mod registry;
mod singletons;


pub use {
    options::{RuntimeOptions, WarningAction, MAX_SMALL_INTS},
    registry::TypeRegistry,
    singletons::Singletons,
};

/// Owns the type registry and the runtime's singleton values.
///
/// Types may be built until [`Runtime::publish_types`] is called, after which
/// the registry is shared read-only.
#[derive(Debug)]
pub struct Runtime {
    types: Arc<TypeRegistry>,
    published: Cell<bool>,

    /// The hash state used within the runtime.
    pub(crate) hash_state: ahash::RandomState,

    /// Global singleton objects.
    pub singletons: Singletons,

    options: RuntimeOptions,
    sink: Box<dyn WarningSink>,
}

impl Runtime {
    pub fn new(options: RuntimeOptions) -> InterpreterResult<Self> {
        options.verify()?;

        let types = TypeRegistry::with_builtins()?;
        let singletons = Singletons::new(&options);

        Ok(Self {
            types: Arc::new(types),
            published: Cell::new(false),
            hash_state: ahash::RandomState::new(),
            singletons,
            options,
            sink: Box::new(StderrSink),
        })
    }

    pub fn options(&self) -> &RuntimeOptions {
        &self.options
    }

    pub fn set_warning_sink<S>(&mut self, sink: S)
    where
        S: WarningSink + 'static,
    {
        self.sink = Box::new(sink);
    }

    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    /// Register a new type. Fails once the registry has been published.
    pub fn build_type<S>(&mut self, source: &S) -> InterpreterResult<TypeId>
    where
        S: SlotSource + ?Sized,
    {
        if self.published.get() {
            return Err(InterpreterError::Published);
        }

        Arc::get_mut(&mut self.types)
            .ok_or(InterpreterError::Published)?
            .build(source)
    }

    /// Freeze the registry and hand out a shareable handle to it.
    pub fn publish_types(&self) -> Arc<TypeRegistry> {
        if !self.published.replace(true) {
            tracing::debug!(
                "[Runtime::publish_types] publishing {} types",
                self.types.len()
            );
        }

        Arc::clone(&self.types)
    }

    pub fn is_published(&self) -> bool {
        self.published.get()
    }

    /// The type descriptor of `obj`.
    #[track_caller]
    pub fn type_of(&self, obj: &PyObjectRef) -> &PyType {
        self.types.lookup(obj.py_type())
    }

    #[track_caller]
    pub fn lookup_type(&self, id: TypeId) -> &PyType {
        self.types.lookup(id)
    }

    pub fn hash<H: Hash + ?Sized>(&self, h: &H) -> u64 {
        let mut hasher = self.hash_state.build_hasher();

        h.hash(&mut hasher);

        hasher.finish()
    }

    /// The hash of a `str`, never `-1`.
    pub fn hash_str(&self, s: &str) -> i64 {
        match self.hash(s) as i64 {
            -1 => -2,
            n => n,
        }
    }
}

impl Runtime {
    pub fn none(&self) -> PyObjectRef {
        self.singletons.none_v.clone()
    }

    pub fn not_implemented(&self) -> PyObjectRef {
        self.singletons.not_implemented_v.clone()
    }

    pub fn new_bool(&self, b: bool) -> PyObjectRef {
        if b {
            self.singletons.true_v.clone()
        } else {
            self.singletons.false_v.clone()
        }
    }

    /// Box `n`, sharing one value for everything in the small int range.
    pub fn new_int(&self, n: i64) -> PyObjectRef {
        match self.singletons.small_int(n) {
            Some(obj) => obj.clone(),
            None => Rc::new(PyInt::new(n)),
        }
    }

    pub fn new_bigint(&self, n: BigInt) -> PyObjectRef {
        match n.to_i64() {
            Some(small) => self.new_int(small),
            None => Rc::new(PyInt::new(n)),
        }
    }

    pub fn new_str<S: Into<String>>(&self, s: S) -> PyObjectRef {
        Rc::new(PyStr::new(s))
    }

    pub fn new_tuple(&self, items: Vec<PyObjectRef>) -> PyObjectRef {
        Rc::new(PyTuple::new(items))
    }

    pub fn new_list(&self, items: Vec<PyObjectRef>) -> PyObjectRef {
        Rc::new(PyList::new(items))
    }

    pub fn new_dict(&self) -> PyObjectRef {
        Rc::new(PyDict::new())
    }

    /// An instance of `ty` laid out according to its nearest builtin ancestor.
    pub fn new_object(&self, ty: TypeId) -> PyObjectRef {
        let layout = self
            .lookup_type(ty)
            .mro()
            .iter()
            .find_map(|id| id.builtin())
            .unwrap_or(BuiltinType::Object);

        match layout {
            BuiltinType::List => Rc::new(PyList::with_type(ty, vec![])),
            BuiltinType::Dict => Rc::new(PyDict::with_type(ty)),
            BuiltinType::Int => Rc::new(PyInt::with_type(ty, 0)),
            BuiltinType::Str => Rc::new(PyStr::with_type(ty, "")),
            BuiltinType::Tuple => Rc::new(PyTuple::with_type(ty, vec![])),
            exc if exc.is_exception() => Rc::new(PyBaseException::new(
                ty,
                self.lookup_type(ty).name(),
                String::new(),
            )),
            _ => Rc::new(PyBaseObject::new(ty)),
        }
    }
}

impl Runtime {
    /// Issue a warning of `category` (`RuntimeWarning` when `None`).
    ///
    /// Only a category that is not a `Warning` type raises. Sink failures are
    /// logged and otherwise ignored.
    #[track_caller]
    pub fn warn<S>(&self, category: Option<TypeId>, stack_level: usize, message: S) -> PyResult<()>
    where
        S: Into<String>,
    {
        let category = category.unwrap_or_else(|| BuiltinType::RuntimeWarning.type_id());

        if !self
            .types
            .is_subtype(category, BuiltinType::Warning.type_id())
        {
            let name = self
                .types
                .get(category)
                .map(|t| t.name().to_owned())
                .unwrap_or_else(|| category.to_string());

            return PyException::type_error(format!(
                "category must be a Warning subclass, not '{}'",
                name
            ))
            .into();
        }

        if self.options.warnings == WarningAction::Ignore {
            return Ok(());
        }

        let record = WarningRecord {
            category: self.types.lookup(category).name().to_owned(),
            message: message.into(),
            stack_level,
            location: *Location::caller(),
        };

        if let Err(err) = self.sink.emit(&record) {
            tracing::debug!("[Runtime::warn] dropped warning {:?}: {}", record.message, err);
        }

        Ok(())
    }
}
