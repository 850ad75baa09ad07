//! Process configuration.
//!
//! Everything the bot needs at startup comes from the environment:
//!
//! - `GITHUB_TOKEN` - token for the hosting API (optional; unauthenticated
//!   clients work against public repositories but hit rate limits quickly)
//! - `WEBHOOK_SECRET` - shared secret for webhook signature verification
//! - `JENKINS_URL`, `JENKINS_USER`, `JENKINS_API_TOKEN` - the job runner
//!   endpoint; if `JENKINS_URL` is absent the whole trigger system is inert
//! - `BOARD_TRIGGER_DRY_RUN` - log would-be submissions instead of triggering
//! - `BOARD_TRIGGER_SWEEP_INTERVAL_MINS` - backlog sweep cadence (default 5)
//! - `PORT` - HTTP listen port (default 3000)
//!
//! Per-repository configuration (which board, which column, which job) is not
//! an environment concern; it lives in the repository itself and is fetched
//! through the hosting API. See [`repo`].

pub mod repo;

pub use repo::{AutomatedTestsConfig, ProjectBoardConfig, RepoConfig};

use std::time::Duration;

/// Default backlog sweep interval (5 minutes).
const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 300;

/// Default HTTP listen port.
const DEFAULT_PORT: u16 = 3000;

/// Configuration for the periodic backlog sweep.
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// Interval between sweeps of the retry backlog.
    ///
    /// Default: 5 minutes. Configure via `BOARD_TRIGGER_SWEEP_INTERVAL_MINS`.
    pub interval: Duration,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl SweepConfig {
    /// Creates a `SweepConfig` with the default interval.
    pub fn new() -> Self {
        SweepConfig {
            interval: Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS),
        }
    }

    /// Creates a `SweepConfig` from environment variables.
    ///
    /// Reads `BOARD_TRIGGER_SWEEP_INTERVAL_MINS`; non-numeric or absent
    /// values fall back to the default.
    pub fn from_env() -> Self {
        let mins = std::env::var("BOARD_TRIGGER_SWEEP_INTERVAL_MINS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_SWEEP_INTERVAL_SECS / 60);

        SweepConfig {
            interval: Duration::from_secs(mins * 60),
        }
    }
}

/// Jenkins endpoint settings.
///
/// The presence of these settings is the activation gate: without a Jenkins
/// URL there is nothing to trigger, so the bot starts inert (health endpoint
/// only, no webhook route, no sweep timer).
#[derive(Debug, Clone)]
pub struct JenkinsSettings {
    /// Base URL of the Jenkins instance, without a trailing slash.
    pub base_url: String,

    /// Username for API authentication.
    pub user: String,

    /// API token for the user.
    pub api_token: String,
}

/// Process-wide settings assembled from the environment.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Token for the hosting API.
    pub github_token: Option<String>,

    /// Webhook signature secret.
    pub webhook_secret: Vec<u8>,

    /// Jenkins endpoint, if configured. `None` means the bot runs inert.
    pub jenkins: Option<JenkinsSettings>,

    /// When set, build submissions are logged instead of sent.
    pub dry_run: bool,

    /// Backlog sweep cadence.
    pub sweep: SweepConfig,

    /// HTTP listen port.
    pub port: u16,
}

impl Settings {
    /// Assembles settings from the environment.
    ///
    /// The Jenkins block is only present when `JENKINS_URL` is set; user and
    /// token default to empty strings for instances without authentication.
    pub fn from_env() -> Self {
        let jenkins = std::env::var("JENKINS_URL").ok().map(|url| JenkinsSettings {
            base_url: url.trim_end_matches('/').to_string(),
            user: std::env::var("JENKINS_USER").unwrap_or_default(),
            api_token: std::env::var("JENKINS_API_TOKEN").unwrap_or_default(),
        });

        Settings {
            github_token: std::env::var("GITHUB_TOKEN").ok(),
            webhook_secret: std::env::var("WEBHOOK_SECRET")
                .map(String::into_bytes)
                .unwrap_or_default(),
            jenkins,
            dry_run: env_flag("BOARD_TRIGGER_DRY_RUN"),
            sweep: SweepConfig::from_env(),
            port: std::env::var("PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_PORT),
        }
    }
}

/// Interprets an environment variable as a boolean toggle.
///
/// Set-and-nonempty counts as true, except the explicit "0" and "false".
fn env_flag(name: &str) -> bool {
    match std::env::var(name) {
        Ok(v) => !v.is_empty() && v != "0" && v.to_lowercase() != "false",
        Err(_) => false,
    }
}
