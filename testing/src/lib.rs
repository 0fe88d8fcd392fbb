//! # Tanda Testing
//!
//! Testing utilities for the competition-day scheduling engine.
//!
//! This crate provides:
//! - [`InMemoryDocumentStore`]: `BTreeMap`-backed document store with fault injection
//! - [`InMemoryRegistrantDirectory`]: registrant directory seeded by the test
//! - [`FixedClock`]: deterministic time
//! - [`fixtures`]: participant and configuration builders
//! - [`ReducerTest`]: Given-When-Then harness for reducers
//!
//! ## Example
//!
//! ```ignore
//! use tanda_testing::{InMemoryDocumentStore, InMemoryRegistrantDirectory, test_clock};
//!
//! #[tokio::test]
//! async fn confirm_is_all_or_nothing() {
//!     let store = InMemoryDocumentStore::new();
//!     store.fail_next_commit();
//!     // ... run confirm, then assert nothing under the tandas collection
//! }
//! ```

use chrono::{DateTime, Utc};
use tanda_core::environment::Clock;

pub mod directory;
pub mod fixtures;
pub mod reducer_test;
pub mod store;

/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making stored timestamps reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use tanda_testing::mocks::FixedClock;
    /// use tanda_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (competition day, 2025-06-14 09:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-06-14T09:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }
}

/// Install a test-friendly `tracing` subscriber.
///
/// Output goes through the test writer so it is only shown for failing
/// tests. Safe to call from every test; only the first call installs.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "competition_day=debug".into()),
        )
        .with_test_writer()
        .try_init();
}

// Re-export commonly used items
pub use directory::InMemoryRegistrantDirectory;
pub use mocks::{test_clock, FixedClock};
pub use reducer_test::ReducerTest;
pub use store::InMemoryDocumentStore;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_is_fixed() {
        let clock = test_clock();
        assert_eq!(clock.now(), clock.now());
    }

    #[test]
    fn tracing_can_be_initialised_twice() {
        init_test_tracing();
        init_test_tracing();
    }
}
