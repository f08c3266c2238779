use std::{convert::TryFrom, sync::Arc};

use pyslot_core::{
    BuiltinType, InterpreterError, InterpreterResult, SSAMap, Slot, TypeFlags, TypeId, TypeTree,
};

use crate::object::{builtin_spec, PyType, SlotDecl, SlotSource, SlotState};

/// The arena that owns every type descriptor.
///
/// Builtins sit at their fixed tags, runtime-built types follow from
/// [`TypeId::FIRST_USER_TAG`]. Entries are written once and never change.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: SSAMap<TypeId, PyType>,
}

impl TypeRegistry {
    /// A registry holding every [`BuiltinType`] at its tag.
    pub fn with_builtins() -> InterpreterResult<Self> {
        let mut this = Self::default();

        for bltn in BuiltinType::ALL {
            let expected = bltn.tag() as usize;

            this.types
                .skip_to_nth(expected)
                .map_err(|actual| InterpreterError::BuiltinTagMismatch {
                    name: bltn.name(),
                    expected,
                    actual,
                })?;

            let id = this.build(&builtin_spec(*bltn))?;

            if id != bltn.type_id() {
                return Err(InterpreterError::BuiltinTagMismatch {
                    name: bltn.name(),
                    expected,
                    actual: id.into(),
                });
            }
        }

        this.types
            .skip_to_nth(TypeId::FIRST_USER_TAG)
            .map_err(|actual| InterpreterError::BuiltinTagMismatch {
                name: "<user types>",
                expected: TypeId::FIRST_USER_TAG,
                actual,
            })?;

        tracing::debug!(
            "[TypeRegistry::with_builtins] installed {} builtin types",
            this.types.len()
        );

        Ok(this)
    }

    /// Build and register a new type from `source`.
    ///
    /// Each slot is taken from `source` when declared there, otherwise the
    /// base's entry is shared by reference. A source with no base derives
    /// from `object`.
    pub fn build<S>(&mut self, source: &S) -> InterpreterResult<TypeId>
    where
        S: SlotSource + ?Sized,
    {
        let name = source.name();

        if name.is_empty() {
            return Err(InterpreterError::EmptyName);
        }

        let object = BuiltinType::Object.type_id();
        let base_id = match source.base() {
            Some(base) => Some(base),
            None if self.types.get(object).is_some() => Some(object),
            None => None,
        };

        let base = match base_id {
            Some(id) => Some(self.types.get(id).ok_or_else(|| {
                InterpreterError::UnknownBase {
                    name: name.to_owned(),
                    base: id,
                }
            })?),
            None => None,
        };

        if let Some(base) = base {
            if !base.flags.contains(TypeFlags::BASETYPE) {
                return Err(InterpreterError::NotABaseType {
                    name: name.to_owned(),
                    base: base.name.clone(),
                });
            }

            self.check_chain(name, base.id)?;
        }

        let id = TypeId::try_from(self.types.next_free()).map_err(|_| {
            InterpreterError::MalformedHierarchy("type arena exhausted".to_owned())
        })?;

        let mut slots = Vec::with_capacity(Slot::COUNT);

        for slot in Slot::ALL.iter().copied() {
            let state = match source.declaration(slot) {
                SlotDecl::Declared(func) => {
                    if func.signature() != slot.signature() {
                        return Err(InterpreterError::SignatureMismatch {
                            name: name.to_owned(),
                            slot,
                            expected: slot.signature(),
                            found: func.signature(),
                        });
                    }

                    SlotState::Declared(Arc::new(func))
                }

                SlotDecl::Blocked => SlotState::Blocked,

                SlotDecl::Absent => match base.map(|b| b.slot_state(slot)) {
                    Some(SlotState::Declared(func)) => SlotState::Inherited {
                        from: base_id.unwrap_or(id),
                        func: Arc::clone(func),
                    },
                    Some(SlotState::Inherited { from, func }) => SlotState::Inherited {
                        from: *from,
                        func: Arc::clone(func),
                    },
                    _ => SlotState::Unfilled,
                },
            };

            slots.push(state);
        }

        let mut mro = vec![id];
        mro.extend(base.map(|b| b.mro.as_slice()).unwrap_or_default());

        let ty = PyType {
            id,
            name: name.to_owned(),
            base: base_id,
            flags: source.flags(),
            slots,
            mro,
        };

        let inserted = self.types.insert(ty).map_err(|_| {
            InterpreterError::MalformedHierarchy("type arena exhausted".to_owned())
        })?;

        debug_assert_eq!(inserted, id);
        tracing::trace!("[TypeRegistry::build] {} = {}", name, id);

        Ok(id)
    }

    /// Walk the base chain from `base` and fail if it revisits a type.
    fn check_chain(&self, name: &str, base: TypeId) -> InterpreterResult<()> {
        let limit = self.types.len();
        let mut cursor = Some(base);
        let mut steps = 0;

        while let Some(id) = cursor {
            let ty = self.types.get(id).ok_or(InterpreterError::UnknownType(id))?;

            steps += 1;

            if steps > limit {
                return Err(InterpreterError::CyclicBase {
                    name: name.to_owned(),
                    at: id,
                });
            }

            cursor = ty.base;
        }

        Ok(())
    }

    pub fn get(&self, id: TypeId) -> Option<&PyType> {
        self.types.get(id)
    }

    /// The descriptor for `id`.
    ///
    /// # Panics
    ///
    /// An id that was not handed out by this registry is a broken host
    /// invariant, not a language-level error.
    #[track_caller]
    pub fn lookup(&self, id: TypeId) -> &PyType {
        match self.types.get(id) {
            Some(ty) => ty,
            None => panic!("{}", InterpreterError::UnknownType(id)),
        }
    }

    pub fn builtin(&self, bltn: BuiltinType) -> &PyType {
        self.lookup(bltn.type_id())
    }

    pub fn by_name(&self, name: &str) -> Option<&PyType> {
        self.iter().find(|ty| ty.name == name)
    }

    /// Whether `ty` is `base` or derives from it.
    pub fn is_subtype(&self, ty: TypeId, base: TypeId) -> bool {
        self.get(ty).map_or(false, |t| t.mro.contains(&base))
    }

    pub fn iter(&self) -> impl Iterator<Item = &PyType> {
        self.types.iter().map(|(_, ty)| ty)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// A graph view of every registered type.
    pub fn tree(&self) -> InterpreterResult<TypeTree> {
        TypeTree::from_types(self.iter().map(|ty| (ty.id, ty.name.as_str(), ty.base)))
    }
}
