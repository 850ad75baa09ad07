use std::net::SocketAddr;
use std::sync::Arc;

use tokio::time::MissedTickBehavior;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use board_trigger::config::Settings;
use board_trigger::github::{GithubApprovalOracle, OctoBoardApi};
use board_trigger::jenkins::JenkinsClient;
use board_trigger::router::EventRouter;
use board_trigger::scheduler::TriggerScheduler;
use board_trigger::server::{AppState, build_router, health_only_router};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "board_trigger=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::from_env();

    let app = match settings.jenkins.clone() {
        None => {
            // No Jenkins endpoint means nothing to trigger: no webhook
            // route, no sweep timer, just the health probe.
            tracing::info!("no Jenkins endpoint configured, starting inert");
            health_only_router()
        }
        Some(jenkins) => {
            let mut builder = octocrab::Octocrab::builder();
            if let Some(token) = settings.github_token.clone() {
                builder = builder.personal_token(token);
            }
            let octocrab = builder.build().expect("failed to build GitHub client");

            let board = OctoBoardApi::new(octocrab.clone());
            let oracle = GithubApprovalOracle::new(octocrab);
            let runner = JenkinsClient::new(jenkins);
            let scheduler = Arc::new(TriggerScheduler::new(oracle, runner, settings.dry_run));

            if settings.dry_run {
                tracing::info!("dry run mode: build submissions will be logged, not sent");
            }

            let sweeper = Arc::clone(&scheduler);
            let sweep_interval = settings.sweep.interval;
            tokio::spawn(async move {
                let mut ticker = tokio::time::interval(sweep_interval);
                // A sweep can outlast the interval when GitHub is slow;
                // delay rather than firing overlapping sweeps.
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                // The first tick fires immediately; the backlog is empty at
                // startup, so it is a no-op.
                loop {
                    ticker.tick().await;
                    let swept = sweeper.sweep().await;
                    if swept > 0 {
                        tracing::debug!(entries = swept, "backlog sweep complete");
                    }
                }
            });

            let state = AppState::new(
                settings.webhook_secret.clone(),
                EventRouter::new(board),
                scheduler,
            );
            build_router(state)
        }
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], settings.port));
    tracing::info!("listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
