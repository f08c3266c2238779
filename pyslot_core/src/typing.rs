use std::convert::TryFrom;
use std::fmt;
use std::num::NonZeroU32;
use std::ops::BitOr;

/// The cheap reference to a type descriptor.
///
/// A `TypeId` is an index into the runtime's type arena, comparing two ids is
/// the same as comparing two descriptors by identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, derive_more::From)]
#[repr(transparent)]
pub struct TypeId(pub NonZeroU32);

impl TypeId {
    /// The first tag handed out to types that are not part of the builtin table.
    pub const FIRST_USER_TAG: usize = 256;

    pub fn is_builtin(&self) -> bool {
        (self.0.get() as usize) < Self::FIRST_USER_TAG
    }

    /// The builtin this id names, if any.
    pub fn builtin(&self) -> Option<BuiltinType> {
        BuiltinType::from_tag(self.0.get())
    }
}

impl From<TypeId> for usize {
    fn from(tid: TypeId) -> Self {
        tid.0.get() as usize
    }
}

impl TryFrom<usize> for TypeId {
    type Error = usize;

    fn try_from(n: usize) -> Result<Self, Self::Error> {
        u32::try_from(n)
            .ok()
            .and_then(NonZeroU32::new)
            .map(Self)
            .ok_or(n)
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeId({})", self.0)
    }
}

/// Per-type behavioural flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeFlags(u8);

impl TypeFlags {
    pub const EMPTY: Self = Self(0);
    /// The type may be used as the base of another type.
    pub const BASETYPE: Self = Self(1);
    /// Instances of the type never change after construction.
    pub const IMMUTABLE: Self = Self(1 << 1);

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl Default for TypeFlags {
    fn default() -> Self {
        Self::BASETYPE
    }
}

impl BitOr for TypeFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

macro_rules! builtins {
    ($(.$tag:literal = $name:ident { $display:literal, base: [$($base:ident)?], flags: $flags:expr },)+) => {
        /// A ZST used to associate builtin constants with.
        pub struct TypingConstants;

        #[allow(missing_docs, non_upper_case_globals, dead_code)]
        impl TypingConstants {
            $(
                pub const $name: self::TypeId = self::TypeId(match ::std::num::NonZeroU32::new($tag) {
                    Some(n) => n,
                    None => panic!("builtin tags start at 1"),
                });
            )*
        }

        /// An enum of all builtin types.
        #[derive(Debug, PartialEq, PartialOrd, Clone, Copy, Eq, Ord, Hash)]
        #[repr(u32)]
        pub enum BuiltinType {
            $(
                #[allow(missing_docs)]
                $name = $tag
            ),*
        }

        impl self::BuiltinType {
            /// Every builtin, in tag order.
            pub const ALL: &'static [Self] = &[$(Self::$name),*];

            pub const fn tag(&self) -> u32 {
                *self as u32
            }

            pub fn type_id(&self) -> self::TypeId {
                match self {
                    $(
                        Self::$name => TypingConstants::$name
                    ),*
                }
            }

            pub fn name(&self) -> &'static str {
                match self {
                    $(
                        Self::$name => $display
                    ),*
                }
            }

            /// The builtin this one is declared to inherit from, `None` for roots.
            pub fn base(&self) -> Option<Self> {
                match self {
                    $(
                        Self::$name => builtins!(@base $($base)?)
                    ),*
                }
            }

            pub fn flags(&self) -> self::TypeFlags {
                match self {
                    $(
                        Self::$name => $flags
                    ),*
                }
            }

            pub fn from_tag(tag: u32) -> Option<Self> {
                match tag {
                    $(
                        $tag => Some(Self::$name),
                    )*
                    _ => None,
                }
            }

            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $(
                        $display => Some(Self::$name),
                    )*
                    _ => None,
                }
            }
        }

        impl ::std::fmt::Display for self::BuiltinType {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.name())
            }
        }
    };

    (@base) => { None };
    (@base $base:ident) => { Some(Self::$base) };
}

const B: TypeFlags = TypeFlags::BASETYPE;
const I: TypeFlags = TypeFlags::IMMUTABLE;
const BI: TypeFlags = TypeFlags::BASETYPE.union(TypeFlags::IMMUTABLE);

builtins!(
    // Core value types.
    .1 = Object { "object", base: [], flags: B },
    .2 = NoneType { "NoneType", base: [Object], flags: I },
    .3 = NotImplementedType { "NotImplementedType", base: [Object], flags: I },
    .4 = Int { "int", base: [Object], flags: BI },
    .5 = Bool { "bool", base: [Int], flags: I },
    .6 = Str { "str", base: [Object], flags: BI },
    .7 = Tuple { "tuple", base: [Object], flags: BI },
    .8 = List { "list", base: [Object], flags: B },
    .9 = Dict { "dict", base: [Object], flags: B },
    // The exception tree.
    .32 = BaseException { "BaseException", base: [Object], flags: B },
    .33 = Exception { "Exception", base: [BaseException], flags: B },
    .34 = ArithmeticError { "ArithmeticError", base: [Exception], flags: B },
    .35 = OverflowError { "OverflowError", base: [ArithmeticError], flags: B },
    .36 = AttributeError { "AttributeError", base: [Exception], flags: B },
    .37 = LookupError { "LookupError", base: [Exception], flags: B },
    .38 = IndexError { "IndexError", base: [LookupError], flags: B },
    .39 = KeyError { "KeyError", base: [LookupError], flags: B },
    .40 = NameError { "NameError", base: [Exception], flags: B },
    .41 = UnboundLocalError { "UnboundLocalError", base: [NameError], flags: B },
    .42 = RuntimeError { "RuntimeError", base: [Exception], flags: B },
    .43 = NotImplementedError { "NotImplementedError", base: [RuntimeError], flags: B },
    .44 = TypeError { "TypeError", base: [Exception], flags: B },
    .45 = ValueError { "ValueError", base: [Exception], flags: B },
    // warnings
    .46 = Warning { "Warning", base: [Exception], flags: B },
    .47 = RuntimeWarning { "RuntimeWarning", base: [Warning], flags: B },
    .48 = DeprecationWarning { "DeprecationWarning", base: [RuntimeWarning], flags: B },
);

impl BuiltinType {
    /// Whether this builtin sits in the exception tree.
    pub fn is_exception(&self) -> bool {
        let mut cursor = Some(*self);

        while let Some(bltn) = cursor {
            if bltn == Self::BaseException {
                return true;
            }

            cursor = bltn.base();
        }

        false
    }
}
