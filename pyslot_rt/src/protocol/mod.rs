//! The abstract protocol layer.
//!
//! Each function resolves the slot for an abstract request on a value's type,
//! invokes it, and turns an unfilled slot into a `TypeError` that names the
//! value's type. Nothing here hands an "empty slot" condition back to its caller.

pub mod comparison;
pub mod mapping;
pub mod number;
pub mod object;
pub mod sequence;

pub use comparison::Comparison;

#[cfg(test)]
mod tests;
