//! gqtmatch-test: Test harness for gqtmatch conformance testing
//!
//! Wraps a [`Bridge`] together with a fault log so tests can drive the host
//! entry points and then check that nothing panicked along the way.
//!
//! # Example
//!
//! ```
//! use gqtmatch_test::prelude::*;
//!
//! let mut harness = Harness::new();
//! harness
//!     .init("", &[("t1", "query { a { b } }")])
//!     .unwrap();
//!
//! assert_eq!(harness.matched("{ a { b } }"), vec!["t1"]);
//! assert!(harness.faults().is_empty());
//! ```

use gqtmatch::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;

#[cfg(feature = "fixtures")]
pub mod fixture;

/// Collects every fault reported to it.
///
/// Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct FaultLog {
    faults: Rc<RefCell<Vec<Fault>>>,
}

impl FaultLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the faults reported so far.
    #[must_use]
    pub fn faults(&self) -> Vec<Fault> {
        self.faults.borrow().clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.faults.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.faults.borrow().is_empty()
    }
}

impl FaultSink for FaultLog {
    fn report(&self, fault: Fault) {
        self.faults.borrow_mut().push(fault);
    }
}

/// A bridge wired to a [`FaultLog`].
#[derive(Debug)]
pub struct Harness {
    bridge: Bridge,
    log: FaultLog,
}

impl Harness {
    #[must_use]
    pub fn new() -> Self {
        let log = FaultLog::new();
        Self {
            bridge: Bridge::new(log.clone()),
            log,
        }
    }

    #[must_use]
    pub fn bridge(&self) -> &Bridge {
        &self.bridge
    }

    pub fn bridge_mut(&mut self) -> &mut Bridge {
        &mut self.bridge
    }

    /// Initialize from `(id, source)` pairs.
    ///
    /// # Errors
    ///
    /// Returns the bridge's [`ErrorReport`] when the init is rejected.
    pub fn init(&mut self, schema: &str, templates: &[(&str, &str)]) -> Result<(), ErrorReport> {
        let sources: Vec<TemplateSource> = templates
            .iter()
            .map(|(id, source)| TemplateSource::new(*id, *source))
            .collect();
        match self.bridge.init(schema, &sources) {
            Some(report) => Err(report),
            None => Ok(()),
        }
    }

    /// Ids of the templates matching `operation`, without variables.
    ///
    /// Empty when the bridge is not initialized.
    #[must_use]
    pub fn matched(&self, operation: &str) -> Vec<String> {
        self.bridge
            .match_all(operation, "", "")
            .map(|outcome| outcome.matched)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn faults(&self) -> Vec<Fault> {
        self.log.faults()
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::{FaultLog, Harness};
    pub use gqtmatch::prelude::*;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn harness_round_trip() {
        let mut harness = Harness::new();
        harness
            .init("type Query { a: Int b: Int }", &[("a", "query { a }"), ("b", "query { b }")])
            .unwrap();

        assert_eq!(harness.matched("{ a }"), vec!["a"]);
        assert_eq!(harness.matched("{ b }"), vec!["b"]);
        assert!(harness.matched("{ a b }").is_empty());
        assert!(harness.faults().is_empty());
    }

    #[test]
    fn rejected_init_is_an_error() {
        let mut harness = Harness::new();
        let report = harness.init("", &[("t", "query {")]).unwrap_err();
        assert_eq!(report.kind(), ErrorKind::Template);
        assert!(harness.matched("{ a }").is_empty());
    }

    #[test]
    fn fault_log_is_shared_between_clones() {
        let log = FaultLog::new();
        let boundary = FaultBoundary::new(log.clone());
        let _ = boundary.guard("test", || -> u8 { panic!("boom") });

        assert_eq!(log.len(), 1);
        assert_eq!(log.faults()[0].error, "boom");
    }
}
