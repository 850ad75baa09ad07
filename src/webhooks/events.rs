//! Typed project-board card events.
//!
//! The bot subscribes to `project_card` webhooks and cares about two actions:
//! a card being created in a column and a card being moved between columns.
//! Everything else the board emits (converted, deleted, edited) is irrelevant
//! to build triggering and never reaches the router.

use serde::{Deserialize, Serialize};

use crate::types::{CardId, ColumnId};

/// Action performed on a project-board card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardAction {
    /// Card was created (directly in some column).
    Created,
    /// Card was moved to a different column.
    Moved,
}

/// A card-created or card-moved event.
///
/// A card either references an issue/PR (`content_url` set) or is a free-text
/// note (`note` set, `content_url` absent). Only referencing cards can
/// trigger builds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectCardEvent {
    /// The action that produced this event.
    pub action: CardAction,

    /// The card's ID, used only for logging.
    pub card_id: CardId,

    /// The column the card now sits in.
    pub column_id: ColumnId,

    /// URL of the owning project board.
    pub project_url: String,

    /// URL of the referenced issue/PR resource, if the card references one.
    ///
    /// Shape: `https://api.github.com/repos/{owner}/{repo}/issues/{number}`.
    /// `None` for note-only cards.
    pub content_url: Option<String>,

    /// Free-text note, for note-only cards.
    pub note: Option<String>,
}

impl ProjectCardEvent {
    /// Returns true if this card is a free-text note with no underlying
    /// issue/PR.
    pub fn is_note(&self) -> bool {
        self.content_url.is_none()
    }
}
