use std::{any::Any, cmp::Ordering};

use num_bigint::{BigInt, Sign};
use num_traits::{ToPrimitive, Zero};
use pyslot_core::{BuiltinType, Slot, TypeId};

use crate::{
    exception::PyResult,
    object::{receiver, PyObject, PyObjectRef, SlotFn, TypeSpec},
    rt::Runtime,
};

/// Modulus of the int hash, a Mersenne prime so equal values hash equally across widths.
const HASH_MODULUS: i64 = (1 << 61) - 1;

/// An `int` (or `bool`, or an instance of a runtime-built `int` subtype).
#[derive(Debug)]
pub struct PyInt {
    ty: TypeId,
    value: BigInt,
}

impl PyInt {
    pub fn new<N: Into<BigInt>>(value: N) -> Self {
        Self::with_type(BuiltinType::Int.type_id(), value)
    }

    pub fn with_type<N: Into<BigInt>>(ty: TypeId, value: N) -> Self {
        Self {
            ty,
            value: value.into(),
        }
    }

    pub fn value(&self) -> &BigInt {
        &self.value
    }

    pub fn to_i64(&self) -> Option<i64> {
        self.value.to_i64()
    }
}

impl PyObject for PyInt {
    fn py_type(&self) -> TypeId {
        self.ty
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn this<'a>(rt: &Runtime, obj: &'a PyObjectRef) -> PyResult<&'a BigInt> {
    receiver::<PyInt>(rt, obj, BuiltinType::Int).map(PyInt::value)
}

fn int_repr(rt: &Runtime, obj: &PyObjectRef) -> PyResult<PyObjectRef> {
    Ok(rt.new_str(this(rt, obj)?.to_string()))
}

fn bool_repr(rt: &Runtime, obj: &PyObjectRef) -> PyResult<PyObjectRef> {
    let text = if this(rt, obj)?.is_zero() {
        "False"
    } else {
        "True"
    };

    Ok(rt.new_str(text))
}

/// The hash of an integer value, `-1` is reserved and maps to `-2`.
pub(crate) fn hash_bigint(value: &BigInt) -> i64 {
    let modulus = BigInt::from(HASH_MODULUS);
    let reduced = (value.magnitude() % modulus.magnitude())
        .to_i64()
        .unwrap_or_default();

    let hash = match value.sign() {
        Sign::Minus => -reduced,
        _ => reduced,
    };

    if hash == -1 {
        -2
    } else {
        hash
    }
}

fn int_hash(rt: &Runtime, obj: &PyObjectRef) -> PyResult<i64> {
    this(rt, obj).map(hash_bigint)
}

fn int_bool(rt: &Runtime, obj: &PyObjectRef) -> PyResult<bool> {
    this(rt, obj).map(|v| !v.is_zero())
}

fn int_index(rt: &Runtime, obj: &PyObjectRef) -> PyResult<PyObjectRef> {
    if rt.type_of(obj).id() == BuiltinType::Int.type_id() {
        return Ok(obj.clone());
    }

    let value = this(rt, obj)?.clone();
    Ok(rt.new_bigint(value))
}

fn compare(
    rt: &Runtime,
    obj: &PyObjectRef,
    other: &PyObjectRef,
    accept: fn(Ordering) -> bool,
) -> PyResult<PyObjectRef> {
    let lhs = this(rt, obj)?;

    match other.downcast_ref::<PyInt>() {
        Some(rhs) => Ok(rt.new_bool(accept(lhs.cmp(rhs.value())))),
        None => Ok(rt.not_implemented()),
    }
}

macro_rules! int_comparisons {
    ($($name:ident => $accept:expr,)+) => {
        $(
            fn $name(rt: &Runtime, obj: &PyObjectRef, other: &PyObjectRef) -> PyResult<PyObjectRef> {
                compare(rt, obj, other, $accept)
            }
        )+
    };
}

int_comparisons!(
    int_lt => Ordering::is_lt,
    int_le => Ordering::is_le,
    int_eq => Ordering::is_eq,
    int_ne => Ordering::is_ne,
    int_gt => Ordering::is_gt,
    int_ge => Ordering::is_ge,
);

pub(super) fn int_type_spec() -> TypeSpec {
    TypeSpec::new("int")
        .slot(Slot::Repr, SlotFn::Unary(int_repr))
        .slot(Slot::Hash, SlotFn::Hash(int_hash))
        .slot(Slot::Bool, SlotFn::Predicate(int_bool))
        .slot(Slot::Index, SlotFn::Unary(int_index))
        .slot(Slot::Lt, SlotFn::Binary(int_lt))
        .slot(Slot::Le, SlotFn::Binary(int_le))
        .slot(Slot::Eq, SlotFn::Binary(int_eq))
        .slot(Slot::Ne, SlotFn::Binary(int_ne))
        .slot(Slot::Gt, SlotFn::Binary(int_gt))
        .slot(Slot::Ge, SlotFn::Binary(int_ge))
}

pub(super) fn bool_type_spec() -> TypeSpec {
    TypeSpec::new("bool").slot(Slot::Repr, SlotFn::Unary(bool_repr))
}
