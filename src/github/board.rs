//! Project-board metadata and repository configuration fetches.
//!
//! [`BoardApi`] is the seam between the router and the hosting API: column
//! and project lookups plus the per-repository configuration document. The
//! trait keeps the router testable with an in-memory implementation; the
//! production implementation, [`OctoBoardApi`], goes through octocrab.

use std::future::Future;

use octocrab::Octocrab;
use serde::Deserialize;

use crate::config::RepoConfig;
use crate::types::{ColumnId, ProjectId, RepoId};

use super::error::GitHubApiError;

/// Path of the per-repository configuration document.
const REPO_CONFIG_PATH: &str = ".github/board-trigger.yml";

/// Column metadata: its display name and the URL of its owning project.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ColumnInfo {
    /// The column's display name (compared against `test-column-name`).
    pub name: String,

    /// URL of the project that owns this column,
    /// e.g. `https://api.github.com/projects/120`.
    pub project_url: String,
}

/// Project metadata.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProjectInfo {
    /// The project board's display name (compared against `project-board.name`).
    pub name: String,
}

/// Read-only hosting-API operations the router needs for scope checks.
pub trait BoardApi {
    /// The error type returned by this implementation.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetches a project-board column by ID.
    fn get_column(
        &self,
        column: ColumnId,
    ) -> impl Future<Output = Result<ColumnInfo, Self::Error>> + Send;

    /// Fetches a project board by ID.
    fn get_project(
        &self,
        project: ProjectId,
    ) -> impl Future<Output = Result<ProjectInfo, Self::Error>> + Send;

    /// Fetches the repository's configuration document.
    ///
    /// Returns `Ok(None)` when the repository carries no document (not opted
    /// in); `Err` only for actual fetch or parse failures.
    fn get_repo_config(
        &self,
        repo: &RepoId,
    ) -> impl Future<Output = Result<Option<RepoConfig>, Self::Error>> + Send;
}

/// Octocrab-backed [`BoardApi`] implementation.
#[derive(Clone)]
pub struct OctoBoardApi {
    client: Octocrab,
}

impl OctoBoardApi {
    pub fn new(client: Octocrab) -> Self {
        Self { client }
    }
}

impl BoardApi for OctoBoardApi {
    type Error = GitHubApiError;

    async fn get_column(&self, column: ColumnId) -> Result<ColumnInfo, GitHubApiError> {
        self.client
            .get(format!("/projects/columns/{}", column), None::<&()>)
            .await
            .map_err(GitHubApiError::from_octocrab)
    }

    async fn get_project(&self, project: ProjectId) -> Result<ProjectInfo, GitHubApiError> {
        self.client
            .get(format!("/projects/{}", project), None::<&()>)
            .await
            .map_err(GitHubApiError::from_octocrab)
    }

    async fn get_repo_config(&self, repo: &RepoId) -> Result<Option<RepoConfig>, GitHubApiError> {
        let contents = match self
            .client
            .repos(&repo.owner, &repo.repo)
            .get_content()
            .path(REPO_CONFIG_PATH)
            .send()
            .await
        {
            Ok(contents) => contents,
            Err(err) => {
                let err = GitHubApiError::from_octocrab(err);
                // No document means the repository has not opted in.
                if err.is_not_found() {
                    return Ok(None);
                }
                return Err(err);
            }
        };

        let document = contents
            .items
            .first()
            .and_then(|item| item.decoded_content())
            .ok_or_else(|| {
                GitHubApiError::permanent(format!(
                    "configuration document {} has no decodable content",
                    REPO_CONFIG_PATH
                ))
            })?;

        let config = RepoConfig::parse(&document)
            .map_err(|e| GitHubApiError::permanent(format!("{}: {}", REPO_CONFIG_PATH, e)))?;
        Ok(Some(config))
    }
}

impl std::fmt::Debug for OctoBoardApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OctoBoardApi").finish_non_exhaustive()
    }
}

/// Extracts a numeric project ID from a project URL's trailing path segment.
///
/// Returns `None` for URLs that don't end in a number.
pub fn parse_project_url(url: &str) -> Option<ProjectId> {
    let trailing = url.trim_end_matches('/').rsplit('/').next()?;
    trailing.parse().ok().map(ProjectId)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_project_url_valid() {
        assert_eq!(
            parse_project_url("https://api.github.com/projects/120"),
            Some(ProjectId(120))
        );
        assert_eq!(
            parse_project_url("https://api.github.com/projects/120/"),
            Some(ProjectId(120))
        );
    }

    #[test]
    fn parse_project_url_invalid() {
        assert_eq!(parse_project_url("https://api.github.com/projects/"), None);
        assert_eq!(
            parse_project_url("https://api.github.com/projects/abc"),
            None
        );
        assert_eq!(parse_project_url(""), None);
    }
}
