//! HTTP server for the board trigger bot.
//!
//! # Endpoints
//!
//! - `POST /webhook` - Accepts GitHub webhook deliveries (returns 202 Accepted)
//! - `GET /health` - Returns 200 if server is running
//!
//! When the bot is not activated (no Jenkins endpoint configured), the
//! webhook route is not mounted at all; only `/health` is served.

use std::sync::Arc;

pub mod health;
pub mod webhook;

pub use health::health_handler;
pub use webhook::webhook_handler;

use crate::github::{ApprovalOracle, BoardApi};
use crate::jenkins::JobRunner;
use crate::router::EventRouter;
use crate::scheduler::TriggerScheduler;

/// Shared application state, passed to handlers via axum's `State`
/// extractor.
///
/// Generic over the trait seams so the handler tests run against in-memory
/// fakes; production instantiates it with the octocrab and Jenkins clients.
pub struct AppState<A, O, R> {
    inner: Arc<AppStateInner<A, O, R>>,
}

// Derived Clone would demand A/O/R: Clone; the Arc makes that unnecessary.
impl<A, O, R> Clone for AppState<A, O, R> {
    fn clone(&self) -> Self {
        AppState {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct AppStateInner<A, O, R> {
    /// Webhook secret for HMAC-SHA256 signature verification.
    webhook_secret: Vec<u8>,

    /// The scope-guard router.
    router: EventRouter<A>,

    /// The scheduler, shared with the sweep task.
    scheduler: Arc<TriggerScheduler<O, R>>,
}

impl<A, O, R> AppState<A, O, R> {
    pub fn new(
        webhook_secret: impl Into<Vec<u8>>,
        router: EventRouter<A>,
        scheduler: Arc<TriggerScheduler<O, R>>,
    ) -> Self {
        AppState {
            inner: Arc::new(AppStateInner {
                webhook_secret: webhook_secret.into(),
                router,
                scheduler,
            }),
        }
    }

    pub fn webhook_secret(&self) -> &[u8] {
        &self.inner.webhook_secret
    }

    pub fn router(&self) -> &EventRouter<A> {
        &self.inner.router
    }

    pub fn scheduler(&self) -> &TriggerScheduler<O, R> {
        &self.inner.scheduler
    }
}

/// Builds the axum Router with all endpoints.
pub fn build_router<A, O, R>(app_state: AppState<A, O, R>) -> axum::Router
where
    A: BoardApi + Send + Sync + 'static,
    O: ApprovalOracle + Send + Sync + 'static,
    R: JobRunner + Send + Sync + 'static,
{
    use axum::routing::{get, post};

    axum::Router::new()
        .route("/webhook", post(webhook_handler::<A, O, R>))
        .route("/health", get(health_handler))
        .with_state(app_state)
}

/// The router served when the bot is inert: health checks only, no webhook
/// endpoint.
pub fn health_only_router() -> axum::Router {
    use axum::routing::get;

    axum::Router::new().route("/health", get(health_handler))
}
