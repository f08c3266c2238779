//! The closed catalogue of special operations a type may implement.

use std::fmt;

/// The call shape a slot function must have.
///
/// `S` is the receiver, `O` any other object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signature {
    /// `(S) -> O`
    Unary,
    /// `(S) -> i64`
    Hash,
    /// `(S) -> usize`
    Len,
    /// `(S) -> bool`
    Predicate,
    /// `(S, O) -> O`
    Binary,
    /// `(S, O) -> bool`
    BinaryPredicate,
    /// `(S, O, O) -> ()`
    SetItem,
    /// `(S, O) -> ()`
    DelItem,
    /// `(S, isize) -> O`
    Repeat,
}

impl Signature {
    pub fn shape(&self) -> &'static str {
        match self {
            Self::Unary => "(S) -> O",
            Self::Hash => "(S) -> i64",
            Self::Len => "(S) -> usize",
            Self::Predicate => "(S) -> bool",
            Self::Binary => "(S, O) -> O",
            Self::BinaryPredicate => "(S, O) -> bool",
            Self::SetItem => "(S, O, O) -> ()",
            Self::DelItem => "(S, O) -> ()",
            Self::Repeat => "(S, isize) -> O",
        }
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.shape())
    }
}

macro_rules! slots {
    ($($name:ident => { $slot_name:literal, $method:literal, $sig:ident $(, op: $op:literal)? },)+) => {
        /// A special operation, the unit of dynamic dispatch.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum Slot {
            $(
                #[allow(missing_docs)]
                $name
            ),*
        }

        impl Slot {
            /// Every slot, in declaration order. `Slot::ALL[s.index()] == s`.
            pub const ALL: &'static [Slot] = &[$(Self::$name),*];

            pub const COUNT: usize = Self::ALL.len();

            /// Dense index into a per-type slot table.
            #[inline]
            pub const fn index(self) -> usize {
                self as usize
            }

            /// The canonical slot name, e.g. `op_len`.
            pub fn slot_name(self) -> &'static str {
                match self {
                    $(Self::$name => $slot_name),*
                }
            }

            /// The special method this slot answers, e.g. `__len__`.
            pub fn method_name(self) -> &'static str {
                match self {
                    $(Self::$name => $method),*
                }
            }

            pub fn signature(self) -> Signature {
                match self {
                    $(Self::$name => Signature::$sig),*
                }
            }

            /// Operator text for slots that back a binary operator.
            pub fn operator(self) -> Option<&'static str> {
                match self {
                    $(Self::$name => slots!(@op $($op)?)),*
                }
            }

            pub fn from_slot_name(name: &str) -> Option<Self> {
                match name {
                    $($slot_name => Some(Self::$name),)*
                    _ => None,
                }
            }
        }
    };

    (@op) => { None };
    (@op $op:literal) => { Some($op) };
}

slots!(
    Repr => { "op_repr", "__repr__", Unary },
    Str => { "op_str", "__str__", Unary },
    Hash => { "op_hash", "__hash__", Hash },
    Bool => { "op_bool", "__bool__", Predicate },
    Index => { "op_index", "__index__", Unary },
    // rich comparison
    Lt => { "op_lt", "__lt__", Binary, op: "<" },
    Le => { "op_le", "__le__", Binary, op: "<=" },
    Eq => { "op_eq", "__eq__", Binary, op: "==" },
    Ne => { "op_ne", "__ne__", Binary, op: "!=" },
    Gt => { "op_gt", "__gt__", Binary, op: ">" },
    Ge => { "op_ge", "__ge__", Binary, op: ">=" },
    // containers, `Len` is the sequence spelling and `MappingLen` the mapping one.
    Len => { "op_len", "__len__", Len },
    MappingLen => { "op_mapping_len", "__len__", Len },
    Contains => { "op_contains", "__contains__", BinaryPredicate },
    GetItem => { "op_getitem", "__getitem__", Binary },
    SetItem => { "op_setitem", "__setitem__", SetItem },
    DelItem => { "op_delitem", "__delitem__", DelItem },
    Repeat => { "op_repeat", "__mul__", Repeat },
);

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slot_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_is_dense() {
        for (n, slot) in Slot::ALL.iter().enumerate() {
            assert_eq!(slot.index(), n);
        }

        assert_eq!(Slot::COUNT, 18);
    }

    #[test]
    fn both_length_spellings_answer_len() {
        assert_eq!(Slot::Len.method_name(), "__len__");
        assert_eq!(Slot::MappingLen.method_name(), "__len__");
        assert_ne!(Slot::Len, Slot::MappingLen);
        assert_eq!(Slot::MappingLen.signature(), Signature::Len);
    }

    #[test]
    fn operators() {
        assert_eq!(Slot::Le.operator(), Some("<="));
        assert_eq!(Slot::Len.operator(), None);
        assert_eq!(Slot::from_slot_name("op_getitem"), Some(Slot::GetItem));
        assert_eq!(Slot::from_slot_name("op_nope"), None);
    }
}
