use crate::cmd::Session;
use crate::output::print_json;
use orderboard_core::fetch::Fetcher;
use std::path::Path;

pub fn run(config_path: &Path, json: bool) -> anyhow::Result<()> {
    let session = Session::open(config_path)?;
    let report = Fetcher::new(&session.transport, &session.config.api).ping()?;

    if json {
        print_json(&report)?;
    } else if report.ok {
        println!(
            "Connected to {} ({})",
            session.transport.base_url(),
            session.config.inclusion.describe()
        );
    } else {
        println!("Connection to {} failed: {}", session.transport.base_url(), report.message);
    }

    if !report.ok {
        anyhow::bail!("connection check failed");
    }
    Ok(())
}
