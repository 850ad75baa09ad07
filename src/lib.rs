//! Board Trigger Bot - watches GitHub project-board card events and triggers
//! Jenkins PR builds once the referenced pull request is approved.
//!
//! Unapproved PRs land on an in-memory backlog that a periodic sweep
//! re-evaluates, so a PR parked in the test column eventually builds without
//! anyone touching its card again.

pub mod config;
pub mod github;
pub mod jenkins;
pub mod router;
pub mod scheduler;
pub mod server;
pub mod types;
pub mod webhooks;

#[cfg(test)]
mod test_utils;
