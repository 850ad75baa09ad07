//! The event router.
//!
//! Takes a card-created/card-moved event and decides whether it is in scope:
//! a card referencing a pull request of the watched repository, sitting in
//! the configured test column of the configured project board. In-scope
//! events resolve to a PR number and are handed to the scheduler; everything
//! else is dropped with a [`ScopeMiss`] that callers log at debug level.
//!
//! The guards run cheapest-first: the card's own payload is checked before
//! any hosting-API round trip, and the column/project lookups only happen
//! for cards in an opted-in repository.

use crate::config::{AutomatedTestsConfig, ProjectBoardConfig, RepoConfig};
use crate::github::board::parse_project_url;
use crate::github::{ApprovalOracle, BoardApi};
use crate::jenkins::JobRunner;
use crate::scheduler::{ProcessOutcome, TriggerScheduler};
use crate::types::{PrNumber, RepoId};
use crate::webhooks::ProjectCardEvent;

use std::fmt;

/// Why a card event was dropped without reaching the scheduler.
///
/// These are expected, high-volume conditions (most board traffic is other
/// repos, other columns, note cards), so none of them is an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeMiss {
    /// The card is a free-text note with no underlying issue/PR.
    NoteCard,
    /// The card references something, but not in the
    /// `/repos/{owner}/{repo}/issues/{n}` shape.
    MalformedContentUrl,
    /// The repository config document could not be fetched or parsed.
    ConfigUnavailable,
    /// The repository carries no config document, or the document lacks the
    /// `project-board` / `automated-tests` sections.
    NotOptedIn,
    /// The card's repository is not the configured one.
    RepoMismatch,
    /// A column or project lookup against the hosting API failed.
    BoardLookupFailed,
    /// The card sits in a column other than the configured test column.
    ColumnMismatch,
    /// The column's owning project URL has no usable trailing ID.
    MalformedProjectUrl,
    /// The column belongs to a same-named column on a different board.
    ProjectMismatch,
    /// The content URL's trailing segment is not a number.
    BadPrNumber,
}

impl fmt::Display for ScopeMiss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ScopeMiss::NoteCard => "note_card",
            ScopeMiss::MalformedContentUrl => "malformed_content_url",
            ScopeMiss::ConfigUnavailable => "config_unavailable",
            ScopeMiss::NotOptedIn => "not_opted_in",
            ScopeMiss::RepoMismatch => "repo_mismatch",
            ScopeMiss::BoardLookupFailed => "board_lookup_failed",
            ScopeMiss::ColumnMismatch => "column_mismatch",
            ScopeMiss::MalformedProjectUrl => "malformed_project_url",
            ScopeMiss::ProjectMismatch => "project_mismatch",
            ScopeMiss::BadPrNumber => "bad_pr_number",
        };
        f.write_str(s)
    }
}

/// The result of routing one card event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    /// The event was dropped by a scope guard before reaching the scheduler.
    OutOfScope(ScopeMiss),
    /// The event resolved to a PR and the scheduler processed it.
    Handled {
        pr: PrNumber,
        outcome: ProcessOutcome,
    },
}

/// Resolves card events to in-scope PRs.
#[derive(Debug, Clone)]
pub struct EventRouter<A> {
    board: A,
}

impl<A: BoardApi> EventRouter<A> {
    pub fn new(board: A) -> Self {
        EventRouter { board }
    }

    /// Runs the scope guards in order and, on a full pass, hands the PR to
    /// the scheduler.
    pub async fn route<O, R>(
        &self,
        event: &ProjectCardEvent,
        scheduler: &TriggerScheduler<O, R>,
    ) -> RouteOutcome
    where
        O: ApprovalOracle,
        R: JobRunner,
    {
        // Note cards carry no content reference at all; a present but
        // unrecognisable reference is a separate condition.
        let Some(content_url) = event.content_url.as_deref() else {
            return RouteOutcome::OutOfScope(ScopeMiss::NoteCard);
        };
        let Some((repo, pr_segment)) = parse_content_url(content_url) else {
            return RouteOutcome::OutOfScope(ScopeMiss::MalformedContentUrl);
        };

        let config = match self.board.get_repo_config(&repo).await {
            Ok(Some(config)) => config,
            Ok(None) => return RouteOutcome::OutOfScope(ScopeMiss::NotOptedIn),
            Err(_) => return RouteOutcome::OutOfScope(ScopeMiss::ConfigUnavailable),
        };
        let Some((board_config, tests_config)) = opted_in_sections(&config) else {
            return RouteOutcome::OutOfScope(ScopeMiss::NotOptedIn);
        };

        if repo.full_name() != tests_config.repo_full_name {
            return RouteOutcome::OutOfScope(ScopeMiss::RepoMismatch);
        }

        let column = match self.board.get_column(event.column_id).await {
            Ok(column) => column,
            Err(_) => return RouteOutcome::OutOfScope(ScopeMiss::BoardLookupFailed),
        };
        if column.name != board_config.test_column_name {
            return RouteOutcome::OutOfScope(ScopeMiss::ColumnMismatch);
        }

        // Same column name on a different board must not trigger, so the
        // owning project's name is checked too.
        let Some(project_id) = parse_project_url(&column.project_url) else {
            return RouteOutcome::OutOfScope(ScopeMiss::MalformedProjectUrl);
        };
        let project = match self.board.get_project(project_id).await {
            Ok(project) => project,
            Err(_) => return RouteOutcome::OutOfScope(ScopeMiss::BoardLookupFailed),
        };
        if project.name != board_config.name {
            return RouteOutcome::OutOfScope(ScopeMiss::ProjectMismatch);
        }

        // Validated only now: everything up to here is cheap string work,
        // but a non-numeric segment means the reference is not a PR we can
        // act on.
        let Ok(number) = pr_segment.parse::<u64>() else {
            return RouteOutcome::OutOfScope(ScopeMiss::BadPrNumber);
        };
        let pr = PrNumber(number);

        let outcome = scheduler
            .process(&repo, pr, &tests_config.job_full_name)
            .await;
        RouteOutcome::Handled { pr, outcome }
    }
}

fn opted_in_sections(
    config: &RepoConfig,
) -> Option<(&ProjectBoardConfig, &AutomatedTestsConfig)> {
    Some((
        config.project_board.as_ref()?,
        config.automated_tests.as_ref()?,
    ))
}

/// Splits an issue content URL into the repository and the trailing segment.
///
/// Accepts exactly the `/repos/{owner}/{repo}/issues/{segment}` shape; the
/// segment is returned unparsed so the caller can reject non-numeric values
/// separately.
fn parse_content_url(url: &str) -> Option<(RepoId, &str)> {
    let rest = url.trim_end_matches('/').split_once("/repos/")?.1;
    let mut parts = rest.split('/');
    let owner = parts.next()?;
    let repo = parts.next()?;
    let kind = parts.next()?;
    let segment = parts.next()?;
    if owner.is_empty() || repo.is_empty() || segment.is_empty() {
        return None;
    }
    if kind != "issues" || parts.next().is_some() {
        return None;
    }
    Some((
        RepoId {
            owner: owner.to_string(),
            repo: repo.to_string(),
        },
        segment,
    ))
}
