use std::{cmp::Ordering, fmt};

use pyslot_core::Slot;

use crate::{
    exception::{PyException, PyResult, PyResultExt},
    object::{is, PyNotImplemented, PyObjectRef},
    protocol::object::{contains, type_name},
    rt::Runtime,
};

/// A comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparison {
    Lt,
    Le,
    Eq,
    Ne,
    Gt,
    Ge,
    In,
    NotIn,
    Is,
    IsNot,
}

impl Comparison {
    pub const RICH: [Comparison; 6] = [
        Comparison::Lt,
        Comparison::Le,
        Comparison::Eq,
        Comparison::Ne,
        Comparison::Gt,
        Comparison::Ge,
    ];

    pub fn text(self) -> &'static str {
        match self {
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::In => "in",
            Self::NotIn => "not in",
            Self::Is => "is",
            Self::IsNot => "is not",
        }
    }

    /// The slot implementing a rich comparison.
    pub fn slot(self) -> Option<Slot> {
        match self {
            Self::Lt => Some(Slot::Lt),
            Self::Le => Some(Slot::Le),
            Self::Eq => Some(Slot::Eq),
            Self::Ne => Some(Slot::Ne),
            Self::Gt => Some(Slot::Gt),
            Self::Ge => Some(Slot::Ge),
            Self::In | Self::NotIn => Some(Slot::Contains),
            Self::Is | Self::IsNot => None,
        }
    }

    /// The operator to try on the right operand: `v < w` is `w > v`.
    pub fn swapped(self) -> Self {
        match self {
            Self::Lt => Self::Gt,
            Self::Le => Self::Ge,
            Self::Gt => Self::Lt,
            Self::Ge => Self::Le,
            other => other,
        }
    }

    /// Interpret a three-way comparison result.
    pub fn accepts(self, ordering: Ordering) -> bool {
        match self {
            Self::Lt => ordering.is_lt(),
            Self::Le => ordering.is_le(),
            Self::Eq | Self::Is | Self::In => ordering.is_eq(),
            Self::Ne | Self::IsNot | Self::NotIn => ordering.is_ne(),
            Self::Gt => ordering.is_gt(),
            Self::Ge => ordering.is_ge(),
        }
    }

    /// Evaluate `v <op> w`.
    ///
    /// For the rich comparisons the reflected slot of `w` goes first when
    /// `w`'s type is a proper subtype of `v`'s, then `v`'s own slot, then the
    /// reflected slot if it has not been tried. A `NotImplemented` result
    /// moves on to the next candidate. If all decline, `==` and `!=` compare
    /// identity and the others raise `TypeError`.
    pub fn apply(self, rt: &Runtime, v: &PyObjectRef, w: &PyObjectRef) -> PyResult<PyObjectRef> {
        match self {
            Self::Is => return Ok(rt.new_bool(is(v, w))),
            Self::IsNot => return Ok(rt.new_bool(!is(v, w))),
            Self::In => return Ok(rt.new_bool(contains(rt, w, v)?)),
            Self::NotIn => return Ok(rt.new_bool(!contains(rt, w, v)?)),
            _ => (),
        }

        let v_type = rt.type_of(v);
        let w_type = rt.type_of(w);
        let swapped = self.swapped();

        let forward = self.slot().and_then(|s| v_type.binary(s));
        let reflected = swapped.slot().and_then(|s| w_type.binary(s));

        let mut checked_reflected = false;

        if v_type.id() != w_type.id() && rt.types().is_subtype(w_type.id(), v_type.id()) {
            if let Some(f) = reflected {
                checked_reflected = true;

                let result = f(rt, w, v).trace()?;

                if !is_not_implemented(&result) {
                    return Ok(result);
                }
            }
        }

        if let Some(f) = forward {
            let result = f(rt, v, w).trace()?;

            if !is_not_implemented(&result) {
                return Ok(result);
            }
        }

        if !checked_reflected {
            if let Some(f) = reflected {
                let result = f(rt, w, v).trace()?;

                if !is_not_implemented(&result) {
                    return Ok(result);
                }
            }
        }

        tracing::trace!(
            "[Comparison::apply] no slot handled {} {} {}",
            v_type.name(),
            self,
            w_type.name()
        );

        match self {
            Self::Eq => Ok(rt.new_bool(is(v, w))),
            Self::Ne => Ok(rt.new_bool(!is(v, w))),
            _ => PyException::type_error(format!(
                "'{}' not supported between instances of '{:.100}' and '{:.100}'",
                self.text(),
                type_name(rt, v),
                type_name(rt, w)
            ))
            .into(),
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

fn is_not_implemented(obj: &PyObjectRef) -> bool {
    obj.downcast_ref::<PyNotImplemented>().is_some()
}
