//! Jenkins HTTP client.
//!
//! Submits builds through the `buildWithParameters` endpoint. A full job name
//! like `mobile/pr-builder` maps to the URL path
//! `/job/mobile/job/pr-builder/buildWithParameters`; Jenkins answers 201 with
//! a `Location` header pointing at the queue item
//! (`<base>/queue/item/<id>/`), which is where the returned
//! [`BuildQueueId`](crate::types::BuildQueueId) comes from.

use thiserror::Error;
use tracing::debug;

use crate::config::JenkinsSettings;
use crate::types::BuildQueueId;

use super::{BuildParams, JobRunner};

/// Errors from build submission.
#[derive(Debug, Error)]
pub enum JenkinsError {
    /// The HTTP request itself failed (network, TLS, timeout).
    #[error("Jenkins request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Jenkins answered with a non-success status.
    #[error("Jenkins rejected build of {job}: HTTP {status}")]
    Rejected { job: String, status: u16 },

    /// The response carried no parsable queue item location.
    #[error("Jenkins response for {job} had no queue item location")]
    MissingQueueId { job: String },
}

/// Reqwest-backed [`JobRunner`].
#[derive(Debug, Clone)]
pub struct JenkinsClient {
    http: reqwest::Client,
    settings: JenkinsSettings,
}

impl JenkinsClient {
    pub fn new(settings: JenkinsSettings) -> Self {
        Self {
            http: reqwest::Client::new(),
            settings,
        }
    }
}

impl JobRunner for JenkinsClient {
    type Error = JenkinsError;

    async fn trigger_build(
        &self,
        job_name: &str,
        params: &BuildParams,
    ) -> Result<BuildQueueId, JenkinsError> {
        let url = format!(
            "{}/{}/buildWithParameters",
            self.settings.base_url,
            job_path(job_name)
        );

        debug!(job = job_name, pr = %params.pr_id, "submitting build");

        let response = self
            .http
            .post(&url)
            .basic_auth(&self.settings.user, Some(&self.settings.api_token))
            .query(&[
                ("pr_id", params.pr_id.0.to_string()),
                ("apk", params.apk.clone()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(JenkinsError::Rejected {
                job: job_name.to_string(),
                status: response.status().as_u16(),
            });
        }

        response
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_queue_location)
            .ok_or_else(|| JenkinsError::MissingQueueId {
                job: job_name.to_string(),
            })
    }
}

/// Maps a full job name to its URL path: `a/b` becomes `job/a/job/b`.
fn job_path(job_name: &str) -> String {
    job_name
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| format!("job/{}", segment))
        .collect::<Vec<_>>()
        .join("/")
}

/// Extracts the queue item ID from a `Location` header value like
/// `https://jenkins.example.com/queue/item/123/`.
fn parse_queue_location(location: &str) -> Option<BuildQueueId> {
    let rest = location.split("/queue/item/").nth(1)?;
    let id: u64 = rest.trim_end_matches('/').parse().ok()?;
    Some(BuildQueueId(id))
}
