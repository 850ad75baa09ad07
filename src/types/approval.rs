//! Approval-state classification.
//!
//! The approval oracle reduces a PR's reviews and checks to a single
//! [`ApprovalState`]. The scheduler maps each state to a [`TriggerAction`]:
//!
//! | State               | Action                          |
//! |---------------------|---------------------------------|
//! | approved            | trigger the build now           |
//! | awaiting_reviewers  | defer, retry on the next sweep  |
//! | changes_requested   | defer, retry on the next sweep  |
//! | unstable            | defer, retry on the next sweep  |
//! | failed              | abandon, no retry               |
//! | anything else       | ignore, warn                    |

use serde::{Deserialize, Serialize};
use std::fmt;

/// The reduced review/check status of a pull request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalState {
    /// Reviews approved and checks green.
    Approved,
    /// No approving review yet.
    AwaitingReviewers,
    /// A reviewer requested changes.
    ChangesRequested,
    /// Checks still pending.
    Unstable,
    /// Checks failed.
    Failed,
    /// Anything the oracle produced that we don't recognise.
    #[serde(untagged)]
    Other(String),
}

impl ApprovalState {
    /// Parses the oracle's string form. Unknown values map to [`Other`].
    ///
    /// [`Other`]: ApprovalState::Other
    pub fn from_api_str(s: &str) -> Self {
        match s {
            "approved" => ApprovalState::Approved,
            "awaiting_reviewers" => ApprovalState::AwaitingReviewers,
            "changes_requested" => ApprovalState::ChangesRequested,
            "unstable" => ApprovalState::Unstable,
            "failed" => ApprovalState::Failed,
            other => ApprovalState::Other(other.to_string()),
        }
    }

    /// Maps this state to the scheduler's action per the table above.
    pub fn action(&self) -> TriggerAction {
        match self {
            ApprovalState::Approved => TriggerAction::Trigger,
            ApprovalState::AwaitingReviewers
            | ApprovalState::ChangesRequested
            | ApprovalState::Unstable => TriggerAction::Defer,
            ApprovalState::Failed => TriggerAction::Abandon,
            ApprovalState::Other(_) => TriggerAction::Ignore,
        }
    }
}

impl fmt::Display for ApprovalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApprovalState::Approved => write!(f, "approved"),
            ApprovalState::AwaitingReviewers => write!(f, "awaiting_reviewers"),
            ApprovalState::ChangesRequested => write!(f, "changes_requested"),
            ApprovalState::Unstable => write!(f, "unstable"),
            ApprovalState::Failed => write!(f, "failed"),
            ApprovalState::Other(s) => write!(f, "{}", s),
        }
    }
}

/// What the scheduler does with a PR after classifying its approval state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerAction {
    /// Submit the build now.
    Trigger,
    /// Put the PR back on the backlog and retry on the next sweep.
    Defer,
    /// Drop the PR silently, no retry.
    Abandon,
    /// Drop the PR, warn about the unrecognised state.
    Ignore,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn known_states_parse() {
        assert_eq!(
            ApprovalState::from_api_str("approved"),
            ApprovalState::Approved
        );
        assert_eq!(
            ApprovalState::from_api_str("awaiting_reviewers"),
            ApprovalState::AwaitingReviewers
        );
        assert_eq!(
            ApprovalState::from_api_str("changes_requested"),
            ApprovalState::ChangesRequested
        );
        assert_eq!(
            ApprovalState::from_api_str("unstable"),
            ApprovalState::Unstable
        );
        assert_eq!(ApprovalState::from_api_str("failed"), ApprovalState::Failed);
    }

    #[test]
    fn unknown_states_map_to_other() {
        assert_eq!(
            ApprovalState::from_api_str("blocked"),
            ApprovalState::Other("blocked".to_string())
        );
        assert_eq!(
            ApprovalState::from_api_str(""),
            ApprovalState::Other(String::new())
        );
    }

    #[test]
    fn action_table() {
        assert_eq!(ApprovalState::Approved.action(), TriggerAction::Trigger);
        assert_eq!(
            ApprovalState::AwaitingReviewers.action(),
            TriggerAction::Defer
        );
        assert_eq!(
            ApprovalState::ChangesRequested.action(),
            TriggerAction::Defer
        );
        assert_eq!(ApprovalState::Unstable.action(), TriggerAction::Defer);
        assert_eq!(ApprovalState::Failed.action(), TriggerAction::Abandon);
        assert_eq!(
            ApprovalState::Other("draft".to_string()).action(),
            TriggerAction::Ignore
        );
    }

    proptest! {
        /// Parsing then displaying yields the original string.
        #[test]
        fn parse_display_roundtrip(s in "[a-z_]{0,30}") {
            let state = ApprovalState::from_api_str(&s);
            prop_assert_eq!(format!("{}", state), s);
        }
    }
}
