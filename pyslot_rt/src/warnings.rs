//! Best-effort warning emission.

use std::{
    cell::RefCell,
    fmt,
    io::{self, Write},
    panic::Location,
    rc::Rc,
};

/// One warning, already formatted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarningRecord {
    pub category: String,
    pub message: String,
    pub stack_level: usize,
    /// The host call site that raised the warning.
    pub location: Location<'static>,
}

impl fmt::Display for WarningRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: {}: {}",
            self.location.file(),
            self.location.line(),
            self.category,
            self.message
        )
    }
}

/// Where warnings go. Failures are reported to the caller but never raised
/// into the language.
pub trait WarningSink: fmt::Debug {
    fn emit(&self, record: &WarningRecord) -> io::Result<()>;
}

/// Writes each warning as a line on standard error.
#[derive(Debug, Default)]
pub struct StderrSink;

impl WarningSink for StderrSink {
    fn emit(&self, record: &WarningRecord) -> io::Result<()> {
        writeln!(io::stderr().lock(), "{}", record)
    }
}

/// Keeps every warning in memory.
#[derive(Debug, Default, Clone)]
pub struct CollectingSink {
    records: Rc<RefCell<Vec<WarningRecord>>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<WarningRecord> {
        self.records.borrow().clone()
    }
}

impl WarningSink for CollectingSink {
    fn emit(&self, record: &WarningRecord) -> io::Result<()> {
        self.records.borrow_mut().push(record.clone());
        Ok(())
    }
}
