//! Shared in-memory fakes for the trait seams, used across unit tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::config::RepoConfig;
use crate::github::{ApprovalOracle, BoardApi, ColumnInfo, ProjectInfo};
use crate::jenkins::{BuildParams, JobRunner};
use crate::types::{ApprovalState, BuildQueueId, ColumnId, PrNumber, ProjectId, RepoId};

/// A scripted failure from any of the fakes.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct MockFailure(pub String);

/// An [`ApprovalOracle`] that serves scripted per-PR states.
///
/// Clones share state, so tests keep one handle for scripting and
/// assertions while the scheduler owns another.
#[derive(Clone, Default)]
pub struct MockOracle {
    inner: Arc<MockOracleInner>,
}

#[derive(Default)]
struct MockOracleInner {
    states: Mutex<HashMap<PrNumber, Result<ApprovalState, String>>>,
    queries: Mutex<Vec<PrNumber>>,
}

impl MockOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_state(&self, pr: PrNumber, state: ApprovalState) {
        self.inner.states.lock().unwrap().insert(pr, Ok(state));
    }

    pub fn set_failure(&self, pr: PrNumber, reason: &str) {
        self.inner
            .states
            .lock()
            .unwrap()
            .insert(pr, Err(reason.to_string()));
    }

    /// Every PR queried, in order.
    pub fn queries(&self) -> Vec<PrNumber> {
        self.inner.queries.lock().unwrap().clone()
    }

    pub fn query_count(&self) -> usize {
        self.inner.queries.lock().unwrap().len()
    }
}

impl ApprovalOracle for MockOracle {
    type Error = MockFailure;

    async fn approval_state(
        &self,
        _repo: &RepoId,
        pr: PrNumber,
    ) -> Result<ApprovalState, MockFailure> {
        self.inner.queries.lock().unwrap().push(pr);
        match self.inner.states.lock().unwrap().get(&pr) {
            Some(Ok(state)) => Ok(state.clone()),
            Some(Err(reason)) => Err(MockFailure(reason.clone())),
            None => Err(MockFailure(format!("no scripted state for {pr}"))),
        }
    }
}

/// A [`JobRunner`] that records submissions and can be told to reject them.
#[derive(Clone, Default)]
pub struct MockRunner {
    inner: Arc<MockRunnerInner>,
}

#[derive(Default)]
struct MockRunnerInner {
    builds: Mutex<Vec<(String, BuildParams)>>,
    fail: Mutex<bool>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent submission fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        *self.inner.fail.lock().unwrap() = failing;
    }

    /// Every accepted submission, in order.
    pub fn builds(&self) -> Vec<(String, BuildParams)> {
        self.inner.builds.lock().unwrap().clone()
    }

    pub fn build_count(&self) -> usize {
        self.inner.builds.lock().unwrap().len()
    }
}

impl JobRunner for MockRunner {
    type Error = MockFailure;

    async fn trigger_build(
        &self,
        job_name: &str,
        params: &BuildParams,
    ) -> Result<BuildQueueId, MockFailure> {
        if *self.inner.fail.lock().unwrap() {
            return Err(MockFailure("runner unavailable".to_string()));
        }
        let mut builds = self.inner.builds.lock().unwrap();
        builds.push((job_name.to_string(), params.clone()));
        Ok(BuildQueueId(1000 + builds.len() as u64))
    }
}

/// A [`BoardApi`] serving scripted columns, projects and repo configs.
#[derive(Clone, Default)]
pub struct MockBoardApi {
    inner: Arc<MockBoardInner>,
}

#[derive(Default)]
struct MockBoardInner {
    columns: Mutex<HashMap<ColumnId, ColumnInfo>>,
    projects: Mutex<HashMap<ProjectId, ProjectInfo>>,
    configs: Mutex<HashMap<String, RepoConfig>>,
    config_failure: Mutex<bool>,
}

impl MockBoardApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_column(&self, id: ColumnId, name: &str, project_url: &str) {
        self.inner.columns.lock().unwrap().insert(
            id,
            ColumnInfo {
                name: name.to_string(),
                project_url: project_url.to_string(),
            },
        );
    }

    pub fn add_project(&self, id: ProjectId, name: &str) {
        self.inner.projects.lock().unwrap().insert(
            id,
            ProjectInfo {
                name: name.to_string(),
            },
        );
    }

    pub fn set_config(&self, repo: &RepoId, config: RepoConfig) {
        self.inner
            .configs
            .lock()
            .unwrap()
            .insert(repo.full_name(), config);
    }

    /// Makes subsequent config fetches fail outright.
    pub fn set_config_failing(&self, failing: bool) {
        *self.inner.config_failure.lock().unwrap() = failing;
    }
}

impl BoardApi for MockBoardApi {
    type Error = MockFailure;

    async fn get_column(&self, column: ColumnId) -> Result<ColumnInfo, MockFailure> {
        self.inner
            .columns
            .lock()
            .unwrap()
            .get(&column)
            .cloned()
            .ok_or_else(|| MockFailure(format!("no such column {column}")))
    }

    async fn get_project(&self, project: ProjectId) -> Result<ProjectInfo, MockFailure> {
        self.inner
            .projects
            .lock()
            .unwrap()
            .get(&project)
            .cloned()
            .ok_or_else(|| MockFailure(format!("no such project {project}")))
    }

    async fn get_repo_config(&self, repo: &RepoId) -> Result<Option<RepoConfig>, MockFailure> {
        if *self.inner.config_failure.lock().unwrap() {
            return Err(MockFailure("config fetch failed".to_string()));
        }
        Ok(self
            .inner
            .configs
            .lock()
            .unwrap()
            .get(&repo.full_name())
            .cloned())
    }
}
