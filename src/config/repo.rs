//! Per-repository configuration document.
//!
//! A repository opts in to the trigger bot by carrying a YAML document
//! (`.github/board-trigger.yml`) with two sections:
//!
//! ```yaml
//! project-board:
//!   name: Release board
//!   test-column-name: In test
//!
//! automated-tests:
//!   repo-full-name: octocat/hello-world
//!   job-full-name: mobile/pr-builder
//! ```
//!
//! Both sections must be present for an event to be in scope; a repository
//! with neither, or only one, has not opted in and its events are ignored.

use serde::Deserialize;
use thiserror::Error;

/// Error parsing a repository configuration document.
#[derive(Debug, Error)]
#[error("invalid repository configuration: {0}")]
pub struct RepoConfigError(#[from] serde_yaml::Error);

/// The merged configuration document for one repository.
///
/// Fields use `Option` so a document carrying only unrelated sections still
/// parses; scope checks decide what a missing section means.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RepoConfig {
    /// The `project-board` section.
    #[serde(rename = "project-board")]
    pub project_board: Option<ProjectBoardConfig>,

    /// The `automated-tests` section.
    #[serde(rename = "automated-tests")]
    pub automated_tests: Option<AutomatedTestsConfig>,
}

impl RepoConfig {
    /// Parses a YAML configuration document.
    pub fn parse(document: &str) -> Result<Self, RepoConfigError> {
        Ok(serde_yaml::from_str(document)?)
    }
}

/// Which board and column the bot watches.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProjectBoardConfig {
    /// The project board's name. Cards moving through a same-named column on
    /// a different board must not trigger.
    pub name: String,

    /// The name of the column that means "run the tests".
    #[serde(rename = "test-column-name")]
    pub test_column_name: String,
}

/// Which repository and Jenkins job the bot triggers for.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AutomatedTestsConfig {
    /// The single watched repository, in "owner/repo" form.
    #[serde(rename = "repo-full-name")]
    pub repo_full_name: String,

    /// The full Jenkins job name (folder path segments joined with `/`).
    #[serde(rename = "job-full-name")]
    pub job_full_name: String,
}
