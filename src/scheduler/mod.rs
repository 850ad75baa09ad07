//! The trigger scheduler.
//!
//! Sole owner of the retry backlog: an in-memory map of PRs whose build
//! trigger is deferred pending a future approval-state re-check. The map is
//! keyed by PR number, so it never holds more than one entry per PR.
//!
//! [`TriggerScheduler::process`] is the single entry point for both fresh
//! events (handed over by the router) and backlog replays (driven by the
//! periodic [`sweep`]). It always evicts the PR's backlog entry *before*
//! re-evaluating, so a failure mid-evaluation drops the PR from tracking
//! instead of leaving a stale duplicate; the PR is only reinserted when the
//! fresh check still says "retry later" (or when the build submission itself
//! fails, which is the one retryable submission path).
//!
//! The backlog is memory-resident by design: a restart loses it, and the next
//! qualifying card event reintroduces the PR.
//!
//! [`sweep`]: TriggerScheduler::sweep


use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use crate::jenkins::{BuildParams, JobRunner};
use crate::github::ApprovalOracle;
use crate::types::{BuildQueueId, PrNumber, RepoId, TriggerAction};

/// A PR whose build trigger is deferred pending a future re-check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BacklogEntry {
    /// The repository the PR belongs to (needed to re-query the oracle).
    pub repo: RepoId,

    /// The PR number; also the backlog key.
    pub pr: PrNumber,

    /// The full job name to trigger once the PR is approved.
    pub job_name: String,
}

/// The per-PR outcome of one `process` call.
///
/// Guards and failures are classifications, not exceptions: callers log
/// based on the tag, which keeps the decision logic unit-testable without
/// asserting on log output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// The build was submitted (`queued` is `None` in dry-run mode).
    Triggered { queued: Option<BuildQueueId> },

    /// The PR went (back) on the backlog for the next sweep.
    Deferred,

    /// Terminal failure state; dropped silently, no retry.
    Abandoned,

    /// Unrecognised approval state; dropped, worth a warning.
    Ignored { state: String },

    /// The oracle query itself failed; dropped without re-queueing so a
    /// broken oracle call cannot spin forever.
    Failed { reason: String },
}

/// Owns the backlog and the approval-state decision table.
pub struct TriggerScheduler<O, R> {
    oracle: O,
    runner: R,
    dry_run: bool,
    backlog: Mutex<HashMap<PrNumber, BacklogEntry>>,
}

impl<O, R> TriggerScheduler<O, R>
where
    O: ApprovalOracle,
    R: JobRunner,
{
    /// Creates a scheduler with an empty backlog.
    pub fn new(oracle: O, runner: R, dry_run: bool) -> Self {
        TriggerScheduler {
            oracle,
            runner,
            dry_run,
            backlog: Mutex::new(HashMap::new()),
        }
    }

    /// Decides what to do with one PR: trigger, defer, abandon, or ignore.
    ///
    /// Used both for fresh events and for backlog replays; see the module
    /// docs for the eviction-before-re-evaluation invariant.
    pub async fn process(&self, repo: &RepoId, pr: PrNumber, job_name: &str) -> ProcessOutcome {
        // Evict unconditionally; only a fresh "retry later" verdict (or a
        // failed submission) reinserts.
        self.lock().remove(&pr);

        let state = match self.oracle.approval_state(repo, pr).await {
            Ok(state) => state,
            Err(e) => {
                return ProcessOutcome::Failed {
                    reason: e.to_string(),
                };
            }
        };

        debug!(pr = %pr, state = %state, "approval state");

        match state.action() {
            TriggerAction::Defer => {
                self.insert(repo, pr, job_name);
                ProcessOutcome::Deferred
            }
            TriggerAction::Abandon => ProcessOutcome::Abandoned,
            TriggerAction::Ignore => ProcessOutcome::Ignored {
                state: state.to_string(),
            },
            TriggerAction::Trigger => self.trigger(repo, pr, job_name).await,
        }
    }

    /// Re-processes every currently backlogged PR. Returns the number of
    /// entries in the snapshot this sweep worked through.
    ///
    /// The snapshot is taken up front: `process` evicts and may reinsert
    /// while we iterate, and iterating the live map at the same time would
    /// skip or duplicate entries.
    pub async fn sweep(&self) -> usize {
        let snapshot: Vec<BacklogEntry> = self.lock().values().cloned().collect();

        for entry in &snapshot {
            let outcome = self.process(&entry.repo, entry.pr, &entry.job_name).await;
            log_outcome(entry.pr, &outcome);
        }

        snapshot.len()
    }

    /// Number of PRs currently awaiting retry.
    pub fn backlog_len(&self) -> usize {
        self.lock().len()
    }

    /// Whether a PR is currently backlogged.
    pub fn is_backlogged(&self, pr: PrNumber) -> bool {
        self.lock().contains_key(&pr)
    }

    async fn trigger(&self, repo: &RepoId, pr: PrNumber, job_name: &str) -> ProcessOutcome {
        let params = BuildParams::for_pr(pr);

        if self.dry_run {
            info!(pr = %pr, job = job_name, apk = %params.apk, "dry run: would submit build");
            return ProcessOutcome::Triggered { queued: None };
        }

        match self.runner.trigger_build(job_name, &params).await {
            Ok(queued) => ProcessOutcome::Triggered {
                queued: Some(queued),
            },
            Err(e) => {
                // Submission is retryable: the PR goes back on the backlog
                // and the next sweep tries again.
                warn!(pr = %pr, job = job_name, error = %e, "build submission failed, re-queueing");
                self.insert(repo, pr, job_name);
                ProcessOutcome::Deferred
            }
        }
    }

    fn insert(&self, repo: &RepoId, pr: PrNumber, job_name: &str) {
        self.lock().insert(
            pr,
            BacklogEntry {
                repo: repo.clone(),
                pr,
                job_name: job_name.to_string(),
            },
        );
    }

    /// The lock is never held across an await point; a poisoned mutex can
    /// only mean a panic inside one of the short map operations, and the map
    /// itself stays consistent, so we keep going with the inner value.
    fn lock(&self) -> MutexGuard<'_, HashMap<PrNumber, BacklogEntry>> {
        self.backlog.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<O, R> std::fmt::Debug for TriggerScheduler<O, R>
where
    O: ApprovalOracle,
    R: JobRunner,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TriggerScheduler")
            .field("dry_run", &self.dry_run)
            .field("backlog_len", &self.lock().len())
            .finish_non_exhaustive()
    }
}

/// Tag-based logging for sweep outcomes.
pub fn log_outcome(pr: PrNumber, outcome: &ProcessOutcome) {
    match outcome {
        ProcessOutcome::Triggered { queued: Some(id) } => {
            info!(pr = %pr, queue_item = %id, "build triggered");
        }
        ProcessOutcome::Triggered { queued: None } => {
            // Dry-run submission was already logged at the point of decision.
        }
        ProcessOutcome::Deferred => {
            debug!(pr = %pr, "deferred, will retry on next sweep");
        }
        ProcessOutcome::Abandoned => {
            debug!(pr = %pr, "abandoned: checks failed");
        }
        ProcessOutcome::Ignored { state } => {
            warn!(pr = %pr, state = %state, "unrecognised approval state, ignoring");
        }
        ProcessOutcome::Failed { reason } => {
            warn!(pr = %pr, error = %reason, "approval query failed, dropping from tracking");
        }
    }
}
