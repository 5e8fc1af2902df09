use anyhow::Context;
use orderboard_core::config::{BoardConfig, ENV_API_KEY, ENV_API_USERNAME};
use orderboard_core::io;
use std::path::Path;

const HEADER: &str = "\
# orderboard configuration.
# Credentials are read from the environment when not set under `api`:
";

/// Write a default config to `target` unless one already exists.
pub fn run(target: &Path) -> anyhow::Result<()> {
    let body = serde_yaml::to_string(&BoardConfig::default())
        .context("failed to serialize default config")?;
    let content = format!("{HEADER}#   {ENV_API_USERNAME}, {ENV_API_KEY}\n{body}");

    let created = io::write_if_missing(target, content.as_bytes())
        .with_context(|| format!("failed to write {}", target.display()))?;
    if created {
        println!("Created {}", target.display());
        println!("Set {ENV_API_USERNAME} and {ENV_API_KEY}, then run 'orderboard ping'.");
    } else {
        println!("{} already exists; left unchanged", target.display());
    }
    Ok(())
}
