//! Webhook endpoint handler.
//!
//! Accepts GitHub webhook deliveries, validates signatures, parses the
//! payload, and runs the event through the router inline. The response is
//! 202 Accepted for every authenticated, well-formed delivery, whatever the
//! routing outcome: out-of-scope cards and downstream failures are logged
//! here, never surfaced to GitHub as errors.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{debug, warn};

use super::AppState;
use crate::github::{ApprovalOracle, BoardApi};
use crate::jenkins::JobRunner;
use crate::router::RouteOutcome;
use crate::scheduler::log_outcome;
use crate::webhooks::{ParseError, parse_webhook, verify_signature};

/// Header name for GitHub event type.
const HEADER_EVENT: &str = "x-github-event";
/// Header name for GitHub delivery ID.
const HEADER_DELIVERY: &str = "x-github-delivery";
/// Header name for GitHub signature.
const HEADER_SIGNATURE: &str = "x-hub-signature-256";

/// Errors that can occur when accepting a webhook.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Missing required header.
    #[error("missing required header: {0}")]
    MissingHeader(&'static str),

    /// Invalid signature.
    #[error("invalid signature")]
    InvalidSignature,

    /// Malformed payload.
    #[error("malformed payload: {0}")]
    Malformed(#[from] ParseError),
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let status = match &self {
            WebhookError::MissingHeader(_) => StatusCode::BAD_REQUEST,
            WebhookError::InvalidSignature => StatusCode::UNAUTHORIZED,
            WebhookError::Malformed(_) => StatusCode::BAD_REQUEST,
        };

        (status, self.to_string()).into_response()
    }
}

/// Webhook handler.
///
/// # Request
///
/// - Method: POST
/// - Required headers:
///   - `X-GitHub-Event`: Event type (only "project_card" is acted on)
///   - `X-GitHub-Delivery`: Unique delivery ID
///   - `X-Hub-Signature-256`: HMAC-SHA256 signature of the payload
/// - Body: JSON webhook payload
///
/// # Response
///
/// - 202 Accepted: delivery authenticated and handled (or ignored)
/// - 400 Bad Request: missing header or malformed payload
/// - 401 Unauthorized: invalid signature
pub async fn webhook_handler<A, O, R>(
    State(app_state): State<AppState<A, O, R>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, &'static str), WebhookError>
where
    A: BoardApi + Send + Sync + 'static,
    O: ApprovalOracle + Send + Sync + 'static,
    R: JobRunner + Send + Sync + 'static,
{
    let event_type = get_header(&headers, HEADER_EVENT)?;
    let delivery_id = get_header(&headers, HEADER_DELIVERY)?;
    let signature_header = get_header(&headers, HEADER_SIGNATURE)?;

    debug!(
        delivery_id = %delivery_id,
        event_type = %event_type,
        "received webhook"
    );

    // Signature check comes before any parsing: unauthenticated bodies are
    // never deserialized.
    if !verify_signature(&body, &signature_header, app_state.webhook_secret()) {
        warn!(delivery_id = %delivery_id, "invalid webhook signature");
        return Err(WebhookError::InvalidSignature);
    }

    let Some(event) = parse_webhook(&event_type, &body)? else {
        // Unrelated event type or card action.
        debug!(delivery_id = %delivery_id, event_type = %event_type, "ignored event");
        return Ok((StatusCode::ACCEPTED, "Accepted"));
    };

    match app_state
        .router()
        .route(&event, app_state.scheduler())
        .await
    {
        RouteOutcome::OutOfScope(miss) => {
            debug!(
                delivery_id = %delivery_id,
                card = %event.card_id,
                miss = %miss,
                "card out of scope"
            );
        }
        RouteOutcome::Handled { pr, outcome } => {
            log_outcome(pr, &outcome);
        }
    }

    Ok((StatusCode::ACCEPTED, "Accepted"))
}

/// Extracts a required header value as a string.
fn get_header(headers: &HeaderMap, name: &'static str) -> Result<String, WebhookError> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .ok_or(WebhookError::MissingHeader(name))
}
