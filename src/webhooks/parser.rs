//! Webhook payload parser.
//!
//! Parses raw webhook JSON into a typed [`ProjectCardEvent`].
//!
//! # Parsing strategy
//!
//! 1. The event type comes from the `X-GitHub-Event` header
//! 2. Only `project_card` payloads are parsed; other event types return
//!    `Ok(None)` (ignored, not an error)
//! 3. Card actions other than `created`/`moved` also return `Ok(None)`
//! 4. Malformed payloads return `Err` with details

use serde::Deserialize;
use thiserror::Error;

use crate::types::{CardId, ColumnId};

use super::events::{CardAction, ProjectCardEvent};

/// Error type for webhook parsing failures.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON deserialization failed (includes missing required fields).
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Parses a webhook payload into a typed card event.
///
/// # Returns
///
/// * `Ok(Some(event))` - a card-created or card-moved event
/// * `Ok(None)` - unrelated event type or card action (ignored)
/// * `Err(e)` - malformed payload
pub fn parse_webhook(
    event_type: &str,
    payload: &[u8],
) -> Result<Option<ProjectCardEvent>, ParseError> {
    match event_type {
        "project_card" => parse_project_card(payload),
        // The bot only subscribes to project-board card events; anything else
        // that arrives is ignored rather than rejected.
        _ => Ok(None),
    }
}

// Raw payload structures, matching GitHub's webhook JSON. Options are used
// liberally so note cards (no content_url) and sparse payloads deserialize;
// required fields are validated explicitly afterwards.

#[derive(Debug, Deserialize)]
struct RawProjectCardPayload {
    action: String,
    project_card: RawProjectCard,
}

#[derive(Debug, Deserialize)]
struct RawProjectCard {
    id: u64,
    column_id: u64,
    project_url: String,
    content_url: Option<String>,
    note: Option<String>,
}

fn parse_project_card(payload: &[u8]) -> Result<Option<ProjectCardEvent>, ParseError> {
    let raw: RawProjectCardPayload = serde_json::from_slice(payload)?;

    let action = match raw.action.as_str() {
        "created" => CardAction::Created,
        "moved" => CardAction::Moved,
        // converted / edited / deleted and anything GitHub adds later
        _ => return Ok(None),
    };

    Ok(Some(ProjectCardEvent {
        action,
        card_id: CardId(raw.project_card.id),
        column_id: ColumnId(raw.project_card.column_id),
        project_url: raw.project_card.project_url,
        content_url: raw.project_card.content_url,
        note: raw.project_card.note,
    }))
}
