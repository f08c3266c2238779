use std::{fmt, sync::Arc};

use pyslot_core::{BuiltinType, Signature, Slot, TypeFlags, TypeId};

use crate::{exception::PyResult, object::PyObjectRef, rt::Runtime};

pub type UnaryFn = fn(&Runtime, &PyObjectRef) -> PyResult<PyObjectRef>;
pub type HashFn = fn(&Runtime, &PyObjectRef) -> PyResult<i64>;
pub type LenFn = fn(&Runtime, &PyObjectRef) -> PyResult<usize>;
pub type PredicateFn = fn(&Runtime, &PyObjectRef) -> PyResult<bool>;
pub type BinaryFn = fn(&Runtime, &PyObjectRef, &PyObjectRef) -> PyResult<PyObjectRef>;
pub type BinaryPredicateFn = fn(&Runtime, &PyObjectRef, &PyObjectRef) -> PyResult<bool>;
pub type SetItemFn = fn(&Runtime, &PyObjectRef, &PyObjectRef, PyObjectRef) -> PyResult<()>;
pub type DelItemFn = fn(&Runtime, &PyObjectRef, &PyObjectRef) -> PyResult<()>;
pub type RepeatFn = fn(&Runtime, &PyObjectRef, isize) -> PyResult<PyObjectRef>;

/// A bound slot implementation, one variant per [`Signature`].
#[derive(Clone, Copy)]
pub enum SlotFn {
    Unary(UnaryFn),
    Hash(HashFn),
    Len(LenFn),
    Predicate(PredicateFn),
    Binary(BinaryFn),
    BinaryPredicate(BinaryPredicateFn),
    SetItem(SetItemFn),
    DelItem(DelItemFn),
    Repeat(RepeatFn),
}

impl SlotFn {
    pub fn signature(&self) -> Signature {
        match self {
            Self::Unary(_) => Signature::Unary,
            Self::Hash(_) => Signature::Hash,
            Self::Len(_) => Signature::Len,
            Self::Predicate(_) => Signature::Predicate,
            Self::Binary(_) => Signature::Binary,
            Self::BinaryPredicate(_) => Signature::BinaryPredicate,
            Self::SetItem(_) => Signature::SetItem,
            Self::DelItem(_) => Signature::DelItem,
            Self::Repeat(_) => Signature::Repeat,
        }
    }
}

impl fmt::Debug for SlotFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SlotFn{}", self.signature())
    }
}

/// What an implementation source says about one slot.
#[derive(Debug, Clone, Copy)]
pub enum SlotDecl {
    /// The source provides this operation.
    Declared(SlotFn),
    /// The source explicitly leaves this operation unfilled, hiding any inherited one.
    Blocked,
    /// Nothing declared, inherit from the base.
    Absent,
}

/// The type-building collaborator: anything that can describe a new type.
pub trait SlotSource {
    fn name(&self) -> &str;

    fn base(&self) -> Option<TypeId>;

    fn flags(&self) -> TypeFlags {
        TypeFlags::default()
    }

    fn declaration(&self, slot: Slot) -> SlotDecl;
}

/// The explicit registration step for a type.
///
/// ```ignore
/// let spec = TypeSpec::new("Sized")
///     .slot(Slot::Len, SlotFn::Len(sized_len))
///     .block(Slot::Hash);
///
/// let sized = rt.build_type(&spec)?;
/// ```
#[derive(Debug, Clone)]
pub struct TypeSpec {
    name: String,
    base: Option<TypeId>,
    flags: TypeFlags,
    decls: [SlotDecl; Slot::COUNT],
}

impl TypeSpec {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            base: None,
            flags: TypeFlags::default(),
            decls: [SlotDecl::Absent; Slot::COUNT],
        }
    }

    pub fn base(mut self, base: TypeId) -> Self {
        self.base = Some(base);
        self
    }

    pub fn flags(mut self, flags: TypeFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn slot(mut self, slot: Slot, func: SlotFn) -> Self {
        self.decls[slot.index()] = SlotDecl::Declared(func);
        self
    }

    pub fn block(mut self, slot: Slot) -> Self {
        self.decls[slot.index()] = SlotDecl::Blocked;
        self
    }
}

impl SlotSource for TypeSpec {
    fn name(&self) -> &str {
        &self.name
    }

    fn base(&self) -> Option<TypeId> {
        self.base
    }

    fn flags(&self) -> TypeFlags {
        self.flags
    }

    fn declaration(&self, slot: Slot) -> SlotDecl {
        self.decls[slot.index()]
    }
}

/// How a type came to have (or not have) an entry in one slot.
#[derive(Debug, Clone)]
pub enum SlotState {
    Declared(Arc<SlotFn>),
    Inherited { from: TypeId, func: Arc<SlotFn> },
    Blocked,
    Unfilled,
}

impl SlotState {
    pub fn func(&self) -> Option<&Arc<SlotFn>> {
        match self {
            Self::Declared(func) | Self::Inherited { func, .. } => Some(func),
            Self::Blocked | Self::Unfilled => None,
        }
    }
}

/// A type descriptor: name, base and the resolved slot table.
///
/// Built once by the [`TypeRegistry`](crate::rt::TypeRegistry) and never
/// mutated afterwards. Two types are the same type iff their ids are equal.
#[derive(Debug)]
pub struct PyType {
    pub(crate) id: TypeId,
    pub(crate) name: String,
    pub(crate) base: Option<TypeId>,
    pub(crate) flags: TypeFlags,
    pub(crate) slots: Vec<SlotState>,
    pub(crate) mro: Vec<TypeId>,
}

macro_rules! typed_getter {
    ($($(#[$m:meta])* $getter:ident => $variant:ident($t:ty),)+) => {
        $(
            $(#[$m])*
            #[inline]
            pub fn $getter(&self, slot: Slot) -> Option<$t> {
                match self.slot(slot).map(|f| **f) {
                    Some(SlotFn::$variant(f)) => Some(f),
                    _ => None,
                }
            }
        )+
    };
}

impl PyType {
    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base(&self) -> Option<TypeId> {
        self.base
    }

    pub fn flags(&self) -> TypeFlags {
        self.flags
    }

    pub fn builtin(&self) -> Option<BuiltinType> {
        self.id.builtin()
    }

    /// This type followed by its ancestors, nearest first.
    pub fn mro(&self) -> &[TypeId] {
        &self.mro
    }

    /// The bound operation for `slot`, if this type or an ancestor defines it.
    #[inline]
    pub fn slot(&self, slot: Slot) -> Option<&Arc<SlotFn>> {
        self.slots[slot.index()].func()
    }

    pub fn slot_state(&self, slot: Slot) -> &SlotState {
        &self.slots[slot.index()]
    }

    #[inline]
    pub fn is_defined(&self, slot: Slot) -> bool {
        self.slot(slot).is_some()
    }

    typed_getter!(
        unary => Unary(UnaryFn),
        hash_fn => Hash(HashFn),
        len_fn => Len(LenFn),
        predicate => Predicate(PredicateFn),
        binary => Binary(BinaryFn),
        binary_predicate => BinaryPredicate(BinaryPredicateFn),
        set_item_fn => SetItem(SetItemFn),
        del_item_fn => DelItem(DelItemFn),
        repeat_fn => Repeat(RepeatFn),
    );
}

/// The presence query over a type's slot table.
pub trait SlotPresence {
    fn is_defined_for(self, ty: &PyType) -> bool;
}

impl SlotPresence for Slot {
    #[inline]
    fn is_defined_for(self, ty: &PyType) -> bool {
        ty.is_defined(self)
    }
}

/// The registration step for each builtin type.
pub(crate) fn builtin_spec(bltn: BuiltinType) -> TypeSpec {
    use super::{base, dict, exc, int, list, singletons, string, tuple};

    let spec = match bltn {
        BuiltinType::Object => base::type_spec(),
        BuiltinType::NoneType => singletons::none_type_spec(),
        BuiltinType::NotImplementedType => singletons::not_implemented_type_spec(),
        BuiltinType::Int => int::int_type_spec(),
        BuiltinType::Bool => int::bool_type_spec(),
        BuiltinType::Str => string::type_spec(),
        BuiltinType::Tuple => tuple::type_spec(),
        BuiltinType::List => list::type_spec(),
        BuiltinType::Dict => dict::type_spec(),
        BuiltinType::BaseException => exc::type_spec(),
        other => TypeSpec::new(other.name()),
    };

    match bltn.base() {
        Some(base) => spec.base(base.type_id()).flags(bltn.flags()),
        None => spec.flags(bltn.flags()),
    }
}
