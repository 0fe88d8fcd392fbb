//! Lifecycle of a live competition.
//!
//! ```text
//! pending --configure--> ready --generate+confirm--> in-progress --(all tandas done | finish)--> completed
//! ```
//!
//! Status is never stored. It is recomputed from persisted facts by
//! [`derive_status`], so the engine, the operator views and the tests all see
//! the same answer.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Derived lifecycle state of a cell
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompetitionStatus {
    /// No stage layout yet
    Pending,
    /// Configured, no heats confirmed
    Ready,
    /// Heats confirmed, judging under way
    InProgress,
    /// Finished explicitly or every heat judged
    Completed,
}

impl CompetitionStatus {
    /// Name as shown to operators
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Ready => "ready",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for CompetitionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted facts the status is derived from
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct StatusFacts {
    /// A stage layout has been saved
    pub is_configured: bool,
    /// Heats have been confirmed
    pub has_heats: bool,
    /// Heats judged so far
    pub completed_tandas: u32,
    /// Heats confirmed
    pub total_tandas: u32,
    /// The operator finished the cell explicitly
    pub is_finished: bool,
}

/// Derive a cell's status. First matching rule wins:
///
/// 1. finished, or heats exist and all of them are judged → `Completed`
/// 2. heats exist and at least one is judged → `InProgress`
/// 3. configured and heats exist → `InProgress`
/// 4. configured → `Ready`
/// 5. otherwise → `Pending`
#[must_use]
pub const fn derive_status(facts: &StatusFacts) -> CompetitionStatus {
    let all_judged = facts.has_heats
        && facts.total_tandas > 0
        && facts.completed_tandas == facts.total_tandas;

    if facts.is_finished || all_judged {
        CompetitionStatus::Completed
    } else if facts.has_heats && (facts.completed_tandas > 0 || facts.is_configured) {
        // rules 2 and 3
        CompetitionStatus::InProgress
    } else if facts.is_configured {
        CompetitionStatus::Ready
    } else {
        CompetitionStatus::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn facts(
        is_configured: bool,
        has_heats: bool,
        completed_tandas: u32,
        total_tandas: u32,
        is_finished: bool,
    ) -> StatusFacts {
        StatusFacts {
            is_configured,
            has_heats,
            completed_tandas,
            total_tandas,
            is_finished,
        }
    }

    #[test]
    fn nothing_persisted_is_pending() {
        assert_eq!(derive_status(&StatusFacts::default()), CompetitionStatus::Pending);
    }

    #[test]
    fn configured_without_heats_is_ready() {
        assert_eq!(derive_status(&facts(true, false, 0, 0, false)), CompetitionStatus::Ready);
    }

    #[test]
    fn configured_with_heats_is_in_progress() {
        assert_eq!(
            derive_status(&facts(true, true, 0, 3, false)),
            CompetitionStatus::InProgress
        );
    }

    #[test]
    fn judged_heats_without_config_is_still_in_progress() {
        assert_eq!(
            derive_status(&facts(false, true, 1, 3, false)),
            CompetitionStatus::InProgress
        );
    }

    #[test]
    fn all_heats_judged_is_completed() {
        assert_eq!(
            derive_status(&facts(true, true, 3, 3, false)),
            CompetitionStatus::Completed
        );
    }

    #[test]
    fn explicit_finish_wins_over_everything() {
        assert_eq!(
            derive_status(&facts(false, false, 0, 0, true)),
            CompetitionStatus::Completed
        );
        assert_eq!(
            derive_status(&facts(true, true, 1, 3, true)),
            CompetitionStatus::Completed
        );
    }

    #[test]
    fn zero_of_zero_heats_is_not_completed() {
        assert_eq!(derive_status(&facts(true, true, 0, 0, false)), CompetitionStatus::InProgress);
        assert_eq!(derive_status(&facts(true, false, 0, 0, false)), CompetitionStatus::Ready);
    }

    #[test]
    fn status_names_match_operator_vocabulary() {
        assert_eq!(CompetitionStatus::InProgress.to_string(), "in-progress");
        assert_eq!(
            serde_json::to_string(&CompetitionStatus::InProgress).ok().as_deref(),
            Some("\"in-progress\"")
        );
    }

    proptest! {
        #[test]
        fn derivation_is_deterministic_and_total(
            is_configured in any::<bool>(),
            has_heats in any::<bool>(),
            completed in 0u32..20,
            total in 0u32..20,
            is_finished in any::<bool>(),
        ) {
            let input = facts(is_configured, has_heats, completed, total, is_finished);
            let first = derive_status(&input);
            prop_assert_eq!(first, derive_status(&input));

            if is_finished {
                prop_assert_eq!(first, CompetitionStatus::Completed);
            }
            if !is_configured && !has_heats && !is_finished {
                prop_assert_eq!(first, CompetitionStatus::Pending);
            }
            if first == CompetitionStatus::InProgress {
                prop_assert!(has_heats);
            }
        }
    }
}
