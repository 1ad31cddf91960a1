//! Time source abstraction.

use chrono::{DateTime, Utc};

/// A source of the current instant.
///
/// The item service takes a clock as a collaborator so that tests can
/// control `createdAt` and `updatedAt`.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// The system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
