//! Fundamental types that are shared by the object model and its tooling.
//!
//! Nothing in here knows what a runtime value looks like. This crate only
//! describes *which* special operations exist ([`Slot`]), which types the
//! runtime always ships with ([`BuiltinType`]), how types are identified
//! ([`TypeId`]) and what it means for the host's own invariants to be
//! broken ([`InterpreterError`]).
//!
//! As with the rest of the workspace, cheap references are the ones that get
//! thrown around everywhere: a [`TypeId`] is a copyable index into an arena,
//! the "fat" descriptor it names lives in the runtime's registry.
//!

pub mod error;
pub mod hierarchy;
pub mod slot;
pub mod typing;
pub mod utils;

pub use {
    error::*,
    hierarchy::TypeTree,
    slot::{Signature, Slot},
    typing::{BuiltinType, TypeFlags, TypeId},
    utils::SSAMap,
};

/// The hash map used all over the place.
pub type MapT<K, V> = ahash::AHashMap<K, V>;
