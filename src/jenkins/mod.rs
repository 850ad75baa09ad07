//! Build job submission.
//!
//! [`JobRunner`] is the seam between the scheduler and the external job
//! runner; [`client::JenkinsClient`] is the production implementation.

pub mod client;

pub use client::{JenkinsClient, JenkinsError};

use std::future::Future;

use crate::types::{BuildQueueId, PrNumber};

/// Parameters submitted with a build request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildParams {
    /// The PR number, passed as `pr_id`.
    pub pr_id: PrNumber,

    /// The artifact parameter, passed as `apk`.
    pub apk: String,
}

impl BuildParams {
    /// Derives the parameter set for a PR: `{ pr_id: <n>, apk: "--apk=<n>.apk" }`.
    pub fn for_pr(pr: PrNumber) -> Self {
        BuildParams {
            pr_id: pr,
            apk: format!("--apk={}.apk", pr.0),
        }
    }
}

/// Submits build jobs to the external runner.
pub trait JobRunner {
    /// The error type returned by this runner.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Submits a build of `job_name` with the given parameters.
    ///
    /// Returns the runner's queue item ID on acceptance.
    fn trigger_build(
        &self,
        job_name: &str,
        params: &BuildParams,
    ) -> impl Future<Output = Result<BuildQueueId, Self::Error>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_params_derivation() {
        let params = BuildParams::for_pr(PrNumber(42));
        assert_eq!(params.pr_id, PrNumber(42));
        assert_eq!(params.apk, "--apk=42.apk");
    }
}
