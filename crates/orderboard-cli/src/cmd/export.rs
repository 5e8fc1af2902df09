use crate::cmd::board::warn_if_partial;
use crate::cmd::{SelectionArgs, Session};
use crate::output::print_json;
use anyhow::Context;
use orderboard_core::export;
use orderboard_core::pipeline;
use std::path::{Path, PathBuf};

/// Write the filtered orders as CSV to `output`, or to stdout when absent.
pub fn run(
    config_path: &Path,
    selection: &SelectionArgs,
    output: Option<PathBuf>,
    json: bool,
) -> anyhow::Result<()> {
    let session = Session::open(config_path)?;
    let today = session.today()?;
    let request = selection.request(&session.config, today);
    let result = pipeline::run(&session.config, &session.transport, &request, None)?;

    match output {
        Some(path) => {
            export::export_to_file(&result.orders, &path)
                .with_context(|| format!("failed to write {}", path.display()))?;
            if json {
                print_json(&serde_json::json!({
                    "path": path,
                    "orders": result.orders.len(),
                    "partial": result.fetch.is_partial(),
                }))?;
            } else {
                println!("Exported {} orders to {}", result.orders.len(), path.display());
            }
        }
        None => {
            let stdout = std::io::stdout();
            export::write_csv(&result.orders, stdout.lock()).context("failed to write CSV")?;
        }
    }

    warn_if_partial(&result);
    Ok(())
}
