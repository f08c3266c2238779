use std::{any::Any, cell::RefCell};

use ahash::AHashMap;
use pyslot_core::{BuiltinType, Slot, TypeId};

use crate::{
    exception::{PyException, PyResult},
    object::{is, receiver, PyObject, PyObjectRef, SlotFn, TypeSpec},
    protocol::{
        comparison::Comparison,
        object::{hash, repr_text, rich_compare_bool, truncated},
    },
    rt::Runtime,
};

/// How [`PyDict::merge`] treats keys already present in the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum MergeMode {
    /// Source values replace existing ones.
    #[display(fmt = "overwrite")]
    Put,
    /// Existing values are kept.
    #[display(fmt = "insert-if-absent")]
    IfAbsent,
    /// Any shared key is a `KeyError`.
    #[display(fmt = "require-unique")]
    Unique,
}

#[derive(Debug, Clone)]
struct Entry {
    hash: i64,
    key: PyObjectRef,
    value: PyObjectRef,
}

/// Insertion ordered entries plus a hash index into them.
#[derive(Debug, Default)]
struct Table {
    entries: Vec<Option<Entry>>,
    buckets: AHashMap<i64, Vec<usize>>,
    live: usize,
}

impl Table {
    fn push(&mut self, entry: Entry) {
        let slot = self.entries.len();
        self.buckets.entry(entry.hash).or_default().push(slot);
        self.entries.push(Some(entry));
        self.live += 1;
    }

    fn take(&mut self, slot: usize) -> Option<Entry> {
        let entry = self.entries.get_mut(slot)?.take()?;

        if let Some(bucket) = self.buckets.get_mut(&entry.hash) {
            bucket.retain(|n| *n != slot);

            if bucket.is_empty() {
                self.buckets.remove(&entry.hash);
            }
        }

        self.live -= 1;
        self.compact();

        Some(entry)
    }

    fn compact(&mut self) {
        if self.entries.len() < 8 || self.live * 2 > self.entries.len() {
            return;
        }

        let entries = std::mem::take(&mut self.entries);
        self.buckets.clear();
        self.live = 0;

        for entry in entries.into_iter().flatten() {
            self.push(entry);
        }
    }

    fn key_at(&self, slot: usize) -> Option<&PyObjectRef> {
        self.entries.get(slot)?.as_ref().map(|e| &e.key)
    }
}

/// The builtin mapping type.
#[derive(Debug)]
pub struct PyDict {
    ty: TypeId,
    table: RefCell<Table>,
}

impl Default for PyDict {
    fn default() -> Self {
        Self::new()
    }
}

impl PyDict {
    pub fn new() -> Self {
        Self::with_type(BuiltinType::Dict.type_id())
    }

    pub fn with_type(ty: TypeId) -> Self {
        Self {
            ty,
            table: RefCell::new(Table::default()),
        }
    }

    pub fn len(&self) -> usize {
        self.table.borrow().live
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The entries in insertion order.
    pub fn items(&self) -> Vec<(PyObjectRef, PyObjectRef)> {
        self.table
            .borrow()
            .entries
            .iter()
            .flatten()
            .map(|e| (e.key.clone(), e.value.clone()))
            .collect()
    }

    pub fn keys(&self) -> Vec<PyObjectRef> {
        self.items().into_iter().map(|(k, _)| k).collect()
    }

    /// Locate `key`, comparing candidates without holding a borrow of the table.
    fn find(&self, rt: &Runtime, key: &PyObjectRef, hash: i64) -> PyResult<Option<usize>> {
        let candidates: Vec<(usize, PyObjectRef)> = {
            let table = self.table.borrow();

            match table.buckets.get(&hash) {
                None => return Ok(None),
                Some(bucket) => bucket
                    .iter()
                    .filter_map(|n| table.key_at(*n).map(|k| (*n, k.clone())))
                    .collect(),
            }
        };

        for (slot, candidate) in candidates {
            if is(&candidate, key) || rich_compare_bool(rt, &candidate, key, Comparison::Eq)? {
                let table = self.table.borrow();

                // the comparison may have mutated the table underneath us.
                if table.key_at(slot).map_or(false, |k| is(k, &candidate)) {
                    return Ok(Some(slot));
                }
            }
        }

        Ok(None)
    }

    pub fn get(&self, rt: &Runtime, key: &PyObjectRef) -> PyResult<Option<PyObjectRef>> {
        let hash = hash(rt, key)?;

        Ok(self.find(rt, key, hash)?.and_then(|slot| {
            self.table.borrow().entries[slot]
                .as_ref()
                .map(|e| e.value.clone())
        }))
    }

    pub fn contains_key(&self, rt: &Runtime, key: &PyObjectRef) -> PyResult<bool> {
        let hash = hash(rt, key)?;
        Ok(self.find(rt, key, hash)?.is_some())
    }

    /// Insert or replace, returning the previous value.
    pub fn put(
        &self,
        rt: &Runtime,
        key: PyObjectRef,
        value: PyObjectRef,
    ) -> PyResult<Option<PyObjectRef>> {
        let hash = hash(rt, &key)?;

        match self.find(rt, &key, hash)? {
            Some(slot) => {
                let mut table = self.table.borrow_mut();
                let old = table.entries[slot]
                    .as_mut()
                    .map(|e| std::mem::replace(&mut e.value, value));
                Ok(old)
            }

            None => {
                self.table.borrow_mut().push(Entry { hash, key, value });
                Ok(None)
            }
        }
    }

    /// Insert only if `key` is absent, returning the value already present otherwise.
    pub fn put_if_absent(
        &self,
        rt: &Runtime,
        key: PyObjectRef,
        value: PyObjectRef,
    ) -> PyResult<Option<PyObjectRef>> {
        let hash = hash(rt, &key)?;

        match self.find(rt, &key, hash)? {
            Some(slot) => Ok(self.table.borrow().entries[slot]
                .as_ref()
                .map(|e| e.value.clone())),

            None => {
                self.table.borrow_mut().push(Entry { hash, key, value });
                Ok(None)
            }
        }
    }

    pub fn remove(&self, rt: &Runtime, key: &PyObjectRef) -> PyResult<Option<PyObjectRef>> {
        let hash = hash(rt, key)?;

        match self.find(rt, key, hash)? {
            Some(slot) => {
                let entry = self.table.borrow_mut().take(slot);
                Ok(entry.map(|e| e.value))
            }
            None => Ok(None),
        }
    }

    /// Copy every entry of `source` into this dict according to `mode`.
    ///
    /// `source` must be a dict (or an instance of a dict subtype). Its entries
    /// are read up front, so merging a dict into itself is well defined.
    pub fn merge(&self, rt: &Runtime, source: &PyObjectRef, mode: MergeMode) -> PyResult<()> {
        tracing::trace!("[PyDict::merge] {} from {}", mode, rt.type_of(source).name());

        let source = match source.downcast_ref::<PyDict>() {
            Some(dict) => dict.items(),
            None => {
                return PyException::type_error(format!(
                    "'{}' object is not a mapping",
                    truncated(rt.type_of(source).name())
                ))
                .into()
            }
        };

        for (key, value) in source {
            match mode {
                MergeMode::Put => {
                    self.put(rt, key, value)?;
                }

                MergeMode::IfAbsent => {
                    self.put_if_absent(rt, key, value)?;
                }

                MergeMode::Unique => {
                    if self.put_if_absent(rt, key.clone(), value)?.is_some() {
                        let text = repr_text(rt, &key)?;
                        return PyException::duplicate_key(key, &text).into();
                    }
                }
            }
        }

        Ok(())
    }

    pub fn update(&self, rt: &Runtime, source: &PyObjectRef) -> PyResult<()> {
        self.merge(rt, source, MergeMode::Put)
    }
}

impl PyObject for PyDict {
    fn py_type(&self) -> TypeId {
        self.ty
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn this<'a>(rt: &Runtime, obj: &'a PyObjectRef) -> PyResult<&'a PyDict> {
    receiver::<PyDict>(rt, obj, BuiltinType::Dict)
}

#[track_caller]
fn missing_key(rt: &Runtime, key: &PyObjectRef) -> PyException {
    match repr_text(rt, key) {
        Ok(text) => PyException::key_error(key.clone(), text),
        Err(exc) => exc,
    }
}

fn dict_repr(rt: &Runtime, obj: &PyObjectRef) -> PyResult<PyObjectRef> {
    let mut parts = vec![];

    for (k, v) in this(rt, obj)?.items() {
        parts.push(format!("{}: {}", repr_text(rt, &k)?, repr_text(rt, &v)?));
    }

    Ok(rt.new_str(format!("{{{}}}", parts.join(", "))))
}

fn dicts_equal(rt: &Runtime, lhs: &PyDict, rhs: &PyDict) -> PyResult<bool> {
    if lhs.len() != rhs.len() {
        return Ok(false);
    }

    for (key, value) in lhs.items() {
        match rhs.get(rt, &key)? {
            Some(other) if is(&value, &other) => continue,
            Some(other) if rich_compare_bool(rt, &value, &other, Comparison::Eq)? => continue,
            _ => return Ok(false),
        }
    }

    Ok(true)
}

fn dict_eq(rt: &Runtime, obj: &PyObjectRef, other: &PyObjectRef) -> PyResult<PyObjectRef> {
    let lhs = this(rt, obj)?;

    match other.downcast_ref::<PyDict>() {
        Some(rhs) => Ok(rt.new_bool(dicts_equal(rt, lhs, rhs)?)),
        None => Ok(rt.not_implemented()),
    }
}

fn dict_ne(rt: &Runtime, obj: &PyObjectRef, other: &PyObjectRef) -> PyResult<PyObjectRef> {
    let lhs = this(rt, obj)?;

    match other.downcast_ref::<PyDict>() {
        Some(rhs) => Ok(rt.new_bool(!dicts_equal(rt, lhs, rhs)?)),
        None => Ok(rt.not_implemented()),
    }
}

fn dict_len(rt: &Runtime, obj: &PyObjectRef) -> PyResult<usize> {
    Ok(this(rt, obj)?.len())
}

fn dict_contains(rt: &Runtime, obj: &PyObjectRef, key: &PyObjectRef) -> PyResult<bool> {
    this(rt, obj)?.contains_key(rt, key)
}

fn dict_getitem(rt: &Runtime, obj: &PyObjectRef, key: &PyObjectRef) -> PyResult<PyObjectRef> {
    match this(rt, obj)?.get(rt, key)? {
        Some(value) => Ok(value),
        None => Err(missing_key(rt, key)),
    }
}

fn dict_setitem(
    rt: &Runtime,
    obj: &PyObjectRef,
    key: &PyObjectRef,
    value: PyObjectRef,
) -> PyResult<()> {
    this(rt, obj)?.put(rt, key.clone(), value).map(drop)
}

fn dict_delitem(rt: &Runtime, obj: &PyObjectRef, key: &PyObjectRef) -> PyResult<()> {
    match this(rt, obj)?.remove(rt, key)? {
        Some(_) => Ok(()),
        None => Err(missing_key(rt, key)),
    }
}

pub(super) fn type_spec() -> TypeSpec {
    TypeSpec::new("dict")
        .slot(Slot::Repr, SlotFn::Unary(dict_repr))
        .block(Slot::Hash)
        .slot(Slot::Eq, SlotFn::Binary(dict_eq))
        .slot(Slot::Ne, SlotFn::Binary(dict_ne))
        .slot(Slot::MappingLen, SlotFn::Len(dict_len))
        .slot(Slot::Contains, SlotFn::BinaryPredicate(dict_contains))
        .slot(Slot::GetItem, SlotFn::Binary(dict_getitem))
        .slot(Slot::SetItem, SlotFn::SetItem(dict_setitem))
        .slot(Slot::DelItem, SlotFn::DelItem(dict_delitem))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::setup;

    #[test]
    fn put_get_remove() {
        let rt = setup();
        let d = PyDict::new();

        assert!(d.put(&rt, rt.new_str("a"), rt.new_int(1)).unwrap().is_none());
        assert!(d.put(&rt, rt.new_str("b"), rt.new_int(2)).unwrap().is_none());
        assert_eq!(d.len(), 2);

        let old = d.put(&rt, rt.new_str("a"), rt.new_int(3)).unwrap().unwrap();
        assert_eq!(old.downcast_ref::<crate::object::PyInt>().unwrap().to_i64(), Some(1));

        let got = d.get(&rt, &rt.new_str("a")).unwrap().unwrap();
        assert_eq!(got.downcast_ref::<crate::object::PyInt>().unwrap().to_i64(), Some(3));

        assert!(d.remove(&rt, &rt.new_str("a")).unwrap().is_some());
        assert!(d.remove(&rt, &rt.new_str("a")).unwrap().is_none());
        assert_eq!(d.len(), 1);
    }

    #[test]
    fn equal_keys_of_different_types_collide() {
        let rt = setup();
        let d = PyDict::new();

        d.put(&rt, rt.new_int(1), rt.new_str("int")).unwrap();
        d.put(&rt, rt.new_bool(true), rt.new_str("bool")).unwrap();

        assert_eq!(d.len(), 1);
        let v = d.get(&rt, &rt.new_int(1)).unwrap().unwrap();
        assert_eq!(v.downcast_str(), Some("bool"));
    }

    #[test]
    fn insertion_order_survives_compaction() {
        let rt = setup();
        let d = PyDict::new();

        for n in 0..20 {
            d.put(&rt, rt.new_int(n), rt.new_int(n)).unwrap();
        }

        for n in 0..15 {
            d.remove(&rt, &rt.new_int(n)).unwrap();
        }

        let keys: Vec<i64> = d
            .keys()
            .iter()
            .filter_map(|k| k.downcast_ref::<crate::object::PyInt>()?.to_i64())
            .collect();

        assert_eq!(keys, vec![15, 16, 17, 18, 19]);
        assert!(d.get(&rt, &rt.new_int(17)).unwrap().is_some());
    }

    #[test]
    fn unhashable_keys_are_rejected() {
        let rt = setup();
        let d = PyDict::new();
        let err = d.put(&rt, rt.new_list(vec![]), rt.none()).unwrap_err();

        assert!(err.is_builtin(BuiltinType::TypeError));
        assert_eq!(err.message(), "unhashable type: 'list'");
    }

    #[test]
    fn merge_mode_names() {
        assert_eq!(MergeMode::Put.to_string(), "overwrite");
        assert_eq!(MergeMode::IfAbsent.to_string(), "insert-if-absent");
        assert_eq!(MergeMode::Unique.to_string(), "require-unique");
    }
}
