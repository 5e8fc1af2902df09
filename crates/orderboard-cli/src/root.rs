use orderboard_core::config::CONFIG_FILE;
use std::path::{Path, PathBuf};

/// Resolve the config file to read.
///
/// Priority:
/// 1. `--config` flag / `ORDERBOARD_CONFIG` env var (passed in as `explicit`)
/// 2. Walk upward from `cwd` looking for `orderboard.yaml`
/// 3. `orderboard.yaml` in `cwd` (may not exist; defaults apply)
pub fn resolve_config(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    find_upward(&cwd, CONFIG_FILE).unwrap_or_else(|| cwd.join(CONFIG_FILE))
}

/// Where `init` writes: the explicit path, or `orderboard.yaml` in `cwd`.
pub fn init_target(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    cwd.join(CONFIG_FILE)
}

fn find_upward(start: &Path, name: &str) -> Option<PathBuf> {
    let mut dir = start.to_path_buf();
    loop {
        let candidate = dir.join(name);
        if candidate.is_file() {
            return Some(candidate);
        }
        match dir.parent() {
            Some(p) => dir = p.to_path_buf(),
            None => return None,
        }
    }
}
