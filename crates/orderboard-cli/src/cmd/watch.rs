use crate::cmd::board::{board_json, render, warn_if_partial};
use crate::cmd::{SelectionArgs, Session};
use crate::output::print_json;
use orderboard_core::cache::FetchCache;
use orderboard_core::pipeline;
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub struct WatchOptions {
    pub interval_minutes: Option<u64>,
    pub force: bool,
    pub once: bool,
    pub limit: Option<usize>,
}

/// Refresh the board on a fixed interval until interrupted.
///
/// Fetch results are memoized for the configured TTL; `force` drops the
/// cache before every refresh.
pub fn run(
    config_path: &Path,
    selection: &SelectionArgs,
    opts: WatchOptions,
    json: bool,
) -> anyhow::Result<()> {
    let session = Session::open(config_path)?;
    let cache = FetchCache::new(session.config.cache.ttl());
    let minutes = opts
        .interval_minutes
        .unwrap_or(session.config.refresh.interval_minutes)
        .max(1);
    let interval = Duration::from_secs(minutes * 60);

    loop {
        if opts.force {
            cache.clear();
        }
        let today = session.today()?;
        let request = selection.request(&session.config, today);
        let mut result = pipeline::run(&session.config, &session.transport, &request, Some(&cache))?;
        if let Some(limit) = opts.limit {
            result.board.truncate_groups(limit);
        }

        if json {
            print_json(&board_json(&result))?;
        } else {
            print!("{}", render(&session.config, &result));
        }
        warn_if_partial(&result);

        if opts.once {
            return Ok(());
        }
        info!(minutes, "next refresh scheduled");
        std::thread::sleep(interval);
    }
}
