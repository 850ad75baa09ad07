//! Hosting-API collaborators: board metadata, repo configuration, and the
//! approval-state oracle, all backed by octocrab.

pub mod board;
pub mod error;
pub mod oracle;

pub use board::{BoardApi, ColumnInfo, OctoBoardApi, ProjectInfo};
pub use error::{GitHubApiError, GitHubErrorKind};
pub use oracle::{ApprovalOracle, GithubApprovalOracle};
