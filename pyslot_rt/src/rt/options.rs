use std::ops::RangeInclusive;

use pyslot_core::{InterpreterError, InterpreterResult};

/// The most small ints a runtime will preallocate.
pub const MAX_SMALL_INTS: usize = 1 << 16;

/// What [`Runtime::warn`](super::Runtime::warn) does with a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningAction {
    /// Hand the warning to the runtime's sink.
    Emit,
    /// Drop it.
    Ignore,
}

impl Default for WarningAction {
    fn default() -> Self {
        Self::Emit
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeOptions {
    pub warnings: WarningAction,
    /// Integers in this range are boxed once and shared.
    pub small_ints: RangeInclusive<i64>,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            warnings: WarningAction::default(),
            small_ints: -5..=256,
        }
    }
}

impl RuntimeOptions {
    pub fn verify(&self) -> InterpreterResult<()> {
        let (lo, hi) = (*self.small_ints.start(), *self.small_ints.end());

        if lo > hi {
            return Err(InterpreterError::InvalidOptions(format!(
                "small int range {}..={} is empty",
                lo, hi
            )));
        }

        let count = (hi as i128 - lo as i128 + 1) as u128;

        if count > MAX_SMALL_INTS as u128 {
            return Err(InterpreterError::InvalidOptions(format!(
                "small int range {}..={} holds {} values, at most {} are allowed",
                lo, hi, count, MAX_SMALL_INTS
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        RuntimeOptions::default().verify().unwrap();
    }

    #[test]
    fn rejects_bad_ranges() {
        let empty = RuntimeOptions {
            small_ints: 10..=0,
            ..Default::default()
        };

        assert!(matches!(empty.verify(), Err(InterpreterError::InvalidOptions(_))));

        let huge = RuntimeOptions {
            small_ints: i64::MIN..=i64::MAX,
            ..Default::default()
        };

        assert!(huge.verify().is_err());
    }
}
