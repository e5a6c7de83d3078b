//! Assertion collection for the initialization suite.
//!
//! An `AssertionCollector` is passed explicitly to whatever drives the
//! scenarios; there is no process-wide tally.

use serde::Serialize;
use tracing::{error, info};

/// One named outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assertion {
    pub label: String,
    pub passed: bool,
}

/// Pass/fail totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub passed: usize,
    pub failed: usize,
    pub total: usize,
}

impl std::fmt::Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} passed, {} failed, {} total",
            self.passed, self.failed, self.total
        )
    }
}

/// Accumulates labelled pass/fail results in recording order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AssertionCollector {
    assertions: Vec<Assertion>,
}

impl AssertionCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one outcome and return it, so callers can chain on the result.
    pub fn record(&mut self, label: impl Into<String>, passed: bool) -> bool {
        let label = label.into();
        if passed {
            info!(assertion = %label, "PASS");
        } else {
            error!(assertion = %label, "FAIL");
        }
        self.assertions.push(Assertion { label, passed });
        passed
    }

    pub fn summary(&self) -> Summary {
        let passed = self.assertions.iter().filter(|a| a.passed).count();
        Summary {
            passed,
            failed: self.assertions.len() - passed,
            total: self.assertions.len(),
        }
    }

    /// True when nothing has failed (also true when nothing was recorded).
    pub fn all_passed(&self) -> bool {
        self.assertions.iter().all(|a| a.passed)
    }

    pub fn assertions(&self) -> &[Assertion] {
        &self.assertions
    }

    /// Labels of the failed assertions, in recording order.
    pub fn failures(&self) -> impl Iterator<Item = &str> {
        self.assertions
            .iter()
            .filter(|a| !a.passed)
            .map(|a| a.label.as_str())
    }
}
