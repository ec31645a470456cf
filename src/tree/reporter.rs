//! Failure reporters: where a failed tree check goes.
//!
//! A check that fails hands its [`Failure`] to the reporter and stops. The
//! default [`PanicReporter`] turns it into a test panic, which is what a
//! `#[test]` function wants. [`RecordingReporter`] collects failures instead,
//! for tests that assert on the failure itself.

use std::sync::{Arc, Mutex, PoisonError};

use super::failure::Failure;

/// Receives failed checks.
pub trait FailureReporter {
    /// Record or raise `failure`. The check that produced it stops after
    /// this returns.
    fn fail(&self, failure: Failure);
}

/// Panics with the failure description.
#[derive(Clone, Copy, Debug, Default)]
pub struct PanicReporter;

impl FailureReporter for PanicReporter {
    fn fail(&self, failure: Failure) {
        match failure.expected() {
            Some(expected) => panic!(
                "{failure}\n  expected: {expected}\n    actual: {}",
                failure.actual()
            ),
            None => panic!("{failure}"),
        }
    }
}

/// Collects failures for later inspection.
///
/// Clones share the same buffer, so keep one clone and hand the other to
/// the assertion.
#[derive(Clone, Debug, Default)]
pub struct RecordingReporter {
    failures: Arc<Mutex<Vec<Failure>>>,
}

impl RecordingReporter {
    /// Create an empty reporter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of failures recorded so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Return `true` if nothing has failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Remove and return every recorded failure, oldest first.
    #[must_use]
    pub fn take(&self) -> Vec<Failure> {
        std::mem::take(&mut *self.lock())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Failure>> {
        self.failures.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl FailureReporter for RecordingReporter {
    fn fail(&self, failure: Failure) {
        self.lock().push(failure);
    }
}
