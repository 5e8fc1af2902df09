pub mod board;
pub mod config;
pub mod export;
pub mod init;
pub mod ping;
pub mod watch;

use anyhow::Context;
use chrono::NaiveDate;
use clap::Args;
use orderboard_core::config::{BoardConfig, WarnLevel};
use orderboard_core::date;
use orderboard_core::fetch::HttpTransport;
use orderboard_core::filter::OrderFilter;
use orderboard_core::pipeline::RunRequest;
use std::path::Path;

// ---------------------------------------------------------------------------
// Shared arguments
// ---------------------------------------------------------------------------

/// Which orders a command looks at.
#[derive(Args, Debug, Clone, Default)]
pub struct SelectionArgs {
    /// Show only this stage (repeatable). Defaults to the configured active stages
    #[arg(long = "stage", value_name = "STAGE")]
    pub stages: Vec<String>,

    /// Case-insensitive match on reference, project or company
    #[arg(long)]
    pub search: Option<String>,

    /// Only orders due within the upcoming window, plus undated ones
    #[arg(long)]
    pub upcoming: bool,
}

impl SelectionArgs {
    pub fn request(&self, config: &BoardConfig, today: NaiveDate) -> RunRequest {
        let mut request = RunRequest::for_config(config, today).with_filter(OrderFilter {
            search: self.search.clone(),
            upcoming_days: self.upcoming.then_some(config.board.upcoming_days),
        });
        if !self.stages.is_empty() {
            request = request.with_selected_stages(config, &self.stages);
        }
        request
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Loaded config plus an authenticated transport.
pub struct Session {
    pub config: BoardConfig,
    pub transport: HttpTransport,
}

impl Session {
    /// Load config, refuse to continue on validation errors, and resolve
    /// credentials. Nothing is sent over the network.
    pub fn open(config_path: &Path) -> anyhow::Result<Self> {
        let config = load_config(config_path)?;

        let errors: Vec<String> = config
            .validate()
            .into_iter()
            .filter(|w| w.level == WarnLevel::Error)
            .map(|w| w.message)
            .collect();
        if !errors.is_empty() {
            anyhow::bail!(
                "invalid configuration in {}:\n  {}",
                config_path.display(),
                errors.join("\n  ")
            );
        }

        let creds = config.credentials(|k| std::env::var(k).ok())?;
        tracing::debug!(base_url = %creds.base_url, user = %creds.masked_username(), "credentials resolved");
        let transport = HttpTransport::new(&creds, config.api.timeout())?;
        Ok(Self { config, transport })
    }

    /// Today in the board's time zone.
    pub fn today(&self) -> anyhow::Result<NaiveDate> {
        let tz = self.config.board.tz()?;
        Ok(date::today_in(tz))
    }
}

pub fn load_config(path: &Path) -> anyhow::Result<BoardConfig> {
    BoardConfig::load_or_default(path)
        .with_context(|| format!("failed to load config from {}", path.display()))
}
