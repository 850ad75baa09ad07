//! The approval-state oracle.
//!
//! Reduces a PR's reviews and checks to a single [`ApprovalState`]:
//!
//! 1. the latest review per reviewer is considered (a dismissed review clears
//!    the reviewer's earlier verdict);
//! 2. any outstanding changes-requested verdict wins: `changes_requested`;
//! 3. no approving review at all: `awaiting_reviewers`;
//! 4. otherwise the combined commit status of the PR head decides:
//!    success is `approved`, pending is `unstable`, failure is `failed`.

use std::collections::HashMap;
use std::future::Future;

use octocrab::Octocrab;
use serde::Deserialize;

use crate::types::{ApprovalState, PrNumber, RepoId};

use super::error::GitHubApiError;

/// The external logic that inspects a PR's reviews/checks and reduces them to
/// one state value.
pub trait ApprovalOracle {
    /// The error type returned by this oracle.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Returns the current approval state of a PR in the given repository.
    fn approval_state(
        &self,
        repo: &RepoId,
        pr: PrNumber,
    ) -> impl Future<Output = Result<ApprovalState, Self::Error>> + Send;
}

/// Octocrab-backed [`ApprovalOracle`].
#[derive(Clone)]
pub struct GithubApprovalOracle {
    client: Octocrab,
}

impl GithubApprovalOracle {
    pub fn new(client: Octocrab) -> Self {
        Self { client }
    }
}

impl ApprovalOracle for GithubApprovalOracle {
    type Error = GitHubApiError;

    async fn approval_state(
        &self,
        repo: &RepoId,
        pr: PrNumber,
    ) -> Result<ApprovalState, GitHubApiError> {
        let reviews: Vec<RawReview> = self
            .client
            .get(
                format!("/repos/{}/{}/pulls/{}/reviews", repo.owner, repo.repo, pr.0),
                None::<&()>,
            )
            .await
            .map_err(GitHubApiError::from_octocrab)?;

        let verdict = reduce_reviews(&reviews);
        if let ReviewVerdict::ChangesRequested = verdict {
            return Ok(ApprovalState::ChangesRequested);
        }
        if let ReviewVerdict::NoApproval = verdict {
            return Ok(ApprovalState::AwaitingReviewers);
        }

        let pull: RawPull = self
            .client
            .get(
                format!("/repos/{}/{}/pulls/{}", repo.owner, repo.repo, pr.0),
                None::<&()>,
            )
            .await
            .map_err(GitHubApiError::from_octocrab)?;

        let status: RawCombinedStatus = self
            .client
            .get(
                format!(
                    "/repos/{}/{}/commits/{}/status",
                    repo.owner, repo.repo, pull.head.sha
                ),
                None::<&()>,
            )
            .await
            .map_err(GitHubApiError::from_octocrab)?;

        Ok(classify_combined_status(&status.state))
    }
}

impl std::fmt::Debug for GithubApprovalOracle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubApprovalOracle").finish_non_exhaustive()
    }
}

// Raw API structures.

#[derive(Debug, Deserialize)]
struct RawReview {
    state: String,
    user: Option<RawUser>,
}

#[derive(Debug, Deserialize)]
struct RawUser {
    id: u64,
}

#[derive(Debug, Deserialize)]
struct RawPull {
    head: RawHead,
}

#[derive(Debug, Deserialize)]
struct RawHead {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct RawCombinedStatus {
    state: String,
}

/// The outcome of reducing a PR's review history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReviewVerdict {
    /// At least one approval, no outstanding changes-requested.
    Approved,
    /// An outstanding changes-requested verdict.
    ChangesRequested,
    /// No approving review.
    NoApproval,
}

/// Reduces the review list (chronological order, as the API returns it) to a
/// single verdict. Only the latest verdict per reviewer counts; a dismissal
/// clears that reviewer's earlier verdict.
fn reduce_reviews(reviews: &[RawReview]) -> ReviewVerdict {
    let mut latest: HashMap<u64, &str> = HashMap::new();
    for review in reviews {
        let Some(user) = &review.user else { continue };
        match review.state.as_str() {
            "APPROVED" | "CHANGES_REQUESTED" => {
                latest.insert(user.id, review.state.as_str());
            }
            "DISMISSED" => {
                latest.remove(&user.id);
            }
            // COMMENTED and PENDING carry no verdict
            _ => {}
        }
    }

    if latest.values().any(|s| *s == "CHANGES_REQUESTED") {
        ReviewVerdict::ChangesRequested
    } else if latest.values().any(|s| *s == "APPROVED") {
        ReviewVerdict::Approved
    } else {
        ReviewVerdict::NoApproval
    }
}

/// Maps the combined commit status of the PR head to an approval state.
fn classify_combined_status(state: &str) -> ApprovalState {
    match state {
        "success" => ApprovalState::Approved,
        "pending" => ApprovalState::Unstable,
        "failure" | "error" => ApprovalState::Failed,
        other => ApprovalState::Other(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review(user_id: u64, state: &str) -> RawReview {
        RawReview {
            state: state.to_string(),
            user: Some(RawUser { id: user_id }),
        }
    }

    #[test]
    fn no_reviews_means_no_approval() {
        assert_eq!(reduce_reviews(&[]), ReviewVerdict::NoApproval);
    }

    #[test]
    fn single_approval() {
        assert_eq!(
            reduce_reviews(&[review(1, "APPROVED")]),
            ReviewVerdict::Approved
        );
    }

    #[test]
    fn changes_requested_wins_over_approval() {
        let reviews = [review(1, "APPROVED"), review(2, "CHANGES_REQUESTED")];
        assert_eq!(reduce_reviews(&reviews), ReviewVerdict::ChangesRequested);
    }

    #[test]
    fn later_verdict_replaces_earlier_for_same_reviewer() {
        let reviews = [review(1, "CHANGES_REQUESTED"), review(1, "APPROVED")];
        assert_eq!(reduce_reviews(&reviews), ReviewVerdict::Approved);
    }

    #[test]
    fn dismissal_clears_verdict() {
        let reviews = [review(1, "APPROVED"), review(1, "DISMISSED")];
        assert_eq!(reduce_reviews(&reviews), ReviewVerdict::NoApproval);
    }

    #[test]
    fn comments_carry_no_verdict() {
        let reviews = [review(1, "COMMENTED"), review(2, "COMMENTED")];
        assert_eq!(reduce_reviews(&reviews), ReviewVerdict::NoApproval);
    }

    #[test]
    fn combined_status_classification() {
        assert_eq!(classify_combined_status("success"), ApprovalState::Approved);
        assert_eq!(classify_combined_status("pending"), ApprovalState::Unstable);
        assert_eq!(classify_combined_status("failure"), ApprovalState::Failed);
        assert_eq!(classify_combined_status("error"), ApprovalState::Failed);
        assert_eq!(
            classify_combined_status("bizarre"),
            ApprovalState::Other("bizarre".to_string())
        );
    }
}
