use thiserror::Error;

use crate::{Signature, Slot, TypeId};

pub type InterpreterResult<T> = Result<T, InterpreterError>;

/// The host's own invariants were broken.
///
/// These are never language-level exceptions: nothing converts them into one
/// and nothing in the runtime catches them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InterpreterError {
    #[error("a type must have a non-empty name.")]
    EmptyName,

    #[error("type {name:?} names base {base} which has not been built.")]
    UnknownBase { name: String, base: TypeId },

    #[error("the base chain of {name:?} does not terminate (revisits {at}).")]
    CyclicBase { name: String, at: TypeId },

    #[error("type {base:?} is not an acceptable base type (building {name:?}).")]
    NotABaseType { name: String, base: String },

    #[error("{name}.{slot} was declared with shape {found} but the slot expects {expected}.")]
    SignatureMismatch {
        name: String,
        slot: Slot,
        expected: Signature,
        found: Signature,
    },

    #[error("builtin tag mismatch: {name} was specified with tag {expected} but was allocated {actual}.")]
    BuiltinTagMismatch {
        name: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("the type registry has been published, no further types may be built.")]
    Published,

    #[error("no type descriptor for {0}.")]
    UnknownType(TypeId),

    #[error("the type graph is not a tree: {0}")]
    MalformedHierarchy(String),

    #[error("invalid runtime options: {0}")]
    InvalidOptions(String),
}
