//! Core domain types for the trigger bot.

pub mod approval;
pub mod ids;

pub use approval::{ApprovalState, TriggerAction};
pub use ids::{BuildQueueId, CardId, ColumnId, PrNumber, ProjectId, RepoId};
