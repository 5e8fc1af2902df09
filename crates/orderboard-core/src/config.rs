use crate::error::{BoardError, Result};
use crate::types::NoDateOrder;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default config file name, looked up from the working directory upward.
pub const CONFIG_FILE: &str = "orderboard.yaml";

pub const ENV_API_BASE: &str = "INVENTORY_API_BASE";
pub const ENV_API_USERNAME: &str = "INVENTORY_API_USERNAME";
pub const ENV_API_KEY: &str = "INVENTORY_API_KEY";

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// ApiConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
    /// Base URL of the web app's order screen, used for outbound links.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_url_base: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_apps_link: Option<String>,
}

fn default_base_url() -> String {
    "https://api.cin7.com/api/v1".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    1000
}

fn default_page_size() -> usize {
    250
}

fn default_max_pages() -> u32 {
    100
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            username: None,
            api_key: None,
            timeout_seconds: default_timeout_seconds(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            page_size: default_page_size(),
            max_pages: default_max_pages(),
            web_url_base: None,
            customer_apps_link: None,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

// ---------------------------------------------------------------------------
// BoardSettings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardSettings {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_due_soon_days")]
    pub due_soon_days: i64,
    #[serde(default = "default_upcoming_days")]
    pub upcoming_days: i64,
    /// Stage label for orders actively being worked on.
    #[serde(default = "default_in_progress_stage")]
    pub in_progress_stage: String,
    /// Stage label for orders waiting for customer pickup. No pickup group
    /// is produced when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ready_stage: Option<String>,
    #[serde(default = "default_dispatched_stage")]
    pub dispatched_stage: String,
    #[serde(default)]
    pub no_date_order: NoDateOrder,
    /// Prefix stripped from stage labels when displayed (e.g. `"Workshop - "`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_stage_prefix: Option<String>,
}

fn default_title() -> String {
    "Workshop".to_string()
}

fn default_timezone() -> String {
    "Pacific/Auckland".to_string()
}

fn default_due_soon_days() -> i64 {
    7
}

/// Longest upcoming window accepted by validation (ten years).
pub const MAX_UPCOMING_DAYS: i64 = 3650;

fn default_upcoming_days() -> i64 {
    30
}

fn default_in_progress_stage() -> String {
    "Processing".to_string()
}

fn default_dispatched_stage() -> String {
    "Dispatched".to_string()
}

impl Default for BoardSettings {
    fn default() -> Self {
        Self {
            title: default_title(),
            timezone: default_timezone(),
            due_soon_days: default_due_soon_days(),
            upcoming_days: default_upcoming_days(),
            in_progress_stage: default_in_progress_stage(),
            ready_stage: None,
            dispatched_stage: default_dispatched_stage(),
            no_date_order: NoDateOrder::default(),
            display_stage_prefix: None,
        }
    }
}

impl BoardSettings {
    pub fn tz(&self) -> Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| BoardError::InvalidTimezone(self.timezone.clone()))
    }

    /// Stage label with the display prefix removed.
    pub fn display_stage<'a>(&self, stage: &'a str) -> &'a str {
        match &self.display_stage_prefix {
            Some(prefix) if !prefix.is_empty() => stage.strip_prefix(prefix.as_str()).unwrap_or(stage),
            _ => stage,
        }
    }
}

// ---------------------------------------------------------------------------
// InclusionRule
// ---------------------------------------------------------------------------

/// Which orders belong on this board. Exactly one rule is active.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InclusionRule {
    /// Distribution branch identifier must match.
    BranchId {
        branch_id: i64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
    /// Stage label must start with the prefix.
    StagePrefix { prefix: String },
}

impl Default for InclusionRule {
    fn default() -> Self {
        InclusionRule::BranchId {
            branch_id: 6877,
            name: Some("Locksmiths".to_string()),
        }
    }
}

impl InclusionRule {
    pub fn describe(&self) -> String {
        match self {
            InclusionRule::BranchId { branch_id, name } => match name {
                Some(n) => format!("distribution branch {n} ({branch_id})"),
                None => format!("distribution branch {branch_id}"),
            },
            InclusionRule::StagePrefix { prefix } => format!("stages starting with '{prefix}'"),
        }
    }
}

// ---------------------------------------------------------------------------
// StageSelection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageSelection {
    /// Every stage label the source system is known to use.
    #[serde(default = "default_known_stages")]
    pub known: Vec<String>,
    /// Stages shown on the board. Everything else in `known` is excluded
    /// server-side.
    #[serde(default = "default_active_stages")]
    pub active: Vec<String>,
}

fn default_known_stages() -> Vec<String> {
    [
        "New",
        "Processing",
        "Job Complete",
        "To Call",
        "To Collect",
        "Awaiting PO",
        "Awaiting Payment",
        "Release To Pick",
        "Partially Picked",
        "Fully Picked",
        "Fully Picked - Hold",
        "On Hold",
        "Ready to Invoice",
        "Fully Dispatched",
        "Dispatched",
        "Cancelled",
        "Declined",
        "Release To Pick - WMS",
        "Ready To Pack - WMS",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_active_stages() -> Vec<String> {
    ["New", "Processing", "Job Complete"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for StageSelection {
    fn default() -> Self {
        Self {
            known: default_known_stages(),
            active: default_active_stages(),
        }
    }
}

impl StageSelection {
    /// Known stages not in the active selection, in `known` order.
    pub fn excluded(&self) -> Vec<String> {
        self.excluded_for(&self.active)
    }

    /// Known stages not in `selected`, in `known` order.
    pub fn excluded_for(&self, selected: &[String]) -> Vec<String> {
        self.known
            .iter()
            .filter(|s| !selected.contains(s))
            .cloned()
            .collect()
    }
}

// ---------------------------------------------------------------------------
// CacheConfig / RefreshConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_ttl_seconds")]
    pub ttl_seconds: u64,
}

fn default_ttl_seconds() -> u64 {
    300
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: default_ttl_seconds(),
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshConfig {
    #[serde(default = "default_interval_minutes")]
    pub interval_minutes: u64,
}

fn default_interval_minutes() -> u64 {
    12 * 60
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_minutes: default_interval_minutes(),
        }
    }
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

#[derive(Clone, PartialEq)]
pub struct Credentials {
    pub base_url: String,
    pub username: String,
    pub api_key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("api_key", &"***")
            .finish()
    }
}

impl Credentials {
    /// Username with everything after the fourth character masked.
    pub fn masked_username(&self) -> String {
        let visible: String = self.username.chars().take(4).collect();
        format!("{visible}***")
    }
}

// ---------------------------------------------------------------------------
// BoardConfig (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoardConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub board: BoardSettings,
    #[serde(default)]
    pub inclusion: InclusionRule,
    #[serde(default)]
    pub stages: StageSelection,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub refresh: RefreshConfig,
}

impl BoardConfig {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(BoardError::InvalidConfig(format!(
                "{} not found: run 'orderboard init'",
                path.display()
            )));
        }
        let data = std::fs::read_to_string(path)?;
        let cfg: BoardConfig = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    /// Load `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(path, data.as_bytes())
    }

    /// Resolve API credentials. Environment values win over the file.
    ///
    /// `env` is the variable lookup, normally `|k| std::env::var(k).ok()`.
    pub fn credentials<F>(&self, env: F) -> Result<Credentials>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());

        let base_url = non_empty(env(ENV_API_BASE)).unwrap_or_else(|| self.api.base_url.clone());
        let username = non_empty(env(ENV_API_USERNAME))
            .or_else(|| non_empty(self.api.username.clone()))
            .ok_or(BoardError::MissingCredential(ENV_API_USERNAME))?;
        let api_key = non_empty(env(ENV_API_KEY))
            .or_else(|| non_empty(self.api.api_key.clone()))
            .ok_or(BoardError::MissingCredential(ENV_API_KEY))?;

        Ok(Credentials {
            base_url: base_url.trim_end_matches('/').to_string(),
            username,
            api_key,
        })
    }

    /// Outbound link to an order in the web app, when configured.
    pub fn order_link(&self, order_id: &str) -> Option<String> {
        let base = self.api.web_url_base.as_deref()?;
        if order_id.is_empty() {
            return None;
        }
        let link = self.api.customer_apps_link.as_deref().unwrap_or("");
        Some(format!(
            "{base}?idCustomerAppsLink={link}&OrderId={order_id}"
        ))
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();
        let mut push = |level: WarnLevel, message: String| {
            warnings.push(ConfigWarning { level, message });
        };

        // 1. API shape
        if !self.api.base_url.starts_with("http://") && !self.api.base_url.starts_with("https://") {
            push(
                WarnLevel::Error,
                format!("api.base_url '{}' must be an http(s) URL", self.api.base_url),
            );
        }
        if self.api.page_size == 0 {
            push(WarnLevel::Error, "api.page_size must be at least 1".to_string());
        }
        if self.api.max_pages == 0 {
            push(WarnLevel::Error, "api.max_pages must be at least 1".to_string());
        }
        if self.api.max_retries == 0 {
            push(WarnLevel::Error, "api.max_retries must be at least 1".to_string());
        }
        if self.api.timeout_seconds == 0 {
            push(
                WarnLevel::Warning,
                "api.timeout_seconds is 0; every request will time out immediately".to_string(),
            );
        }
        if self.api.retry_delay_ms > 60_000 {
            push(
                WarnLevel::Warning,
                format!(
                    "api.retry_delay_ms={} (>60000 is unusual)",
                    self.api.retry_delay_ms
                ),
            );
        }

        // 2. Board settings
        if self.board.tz().is_err() {
            push(
                WarnLevel::Error,
                format!("board.timezone '{}' is not a known time zone", self.board.timezone),
            );
        }
        if self.board.due_soon_days < 0 {
            push(
                WarnLevel::Error,
                format!("board.due_soon_days={} must not be negative", self.board.due_soon_days),
            );
        }
        if !(0..=MAX_UPCOMING_DAYS).contains(&self.board.upcoming_days) {
            push(
                WarnLevel::Error,
                format!(
                    "board.upcoming_days={} must be between 0 and {MAX_UPCOMING_DAYS}",
                    self.board.upcoming_days
                ),
            );
        }
        if self.board.ready_stage.as_deref() == Some(self.board.in_progress_stage.as_str()) {
            push(
                WarnLevel::Warning,
                format!(
                    "board.ready_stage equals board.in_progress_stage ('{}'); the pickup group will always be empty",
                    self.board.in_progress_stage
                ),
            );
        }

        // 3. Stage selection
        for stage in &self.stages.active {
            if !self.stages.known.contains(stage) {
                push(
                    WarnLevel::Warning,
                    format!("active stage '{stage}' is not listed in stages.known"),
                );
            }
        }
        let excluded = self.stages.excluded();
        if excluded.contains(&self.board.in_progress_stage) {
            push(
                WarnLevel::Warning,
                format!(
                    "in-progress stage '{}' is excluded by stages.active; that group will be empty",
                    self.board.in_progress_stage
                ),
            );
        }

        // 4. Inclusion rule
        if let InclusionRule::StagePrefix { prefix } = &self.inclusion {
            if prefix.is_empty() {
                push(
                    WarnLevel::Warning,
                    "inclusion.prefix is empty; every order will be included".to_string(),
                );
            }
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn default_config_roundtrip() {
        let cfg = BoardConfig::default();
        let yaml = serde_yaml::to_string(&cfg).unwrap();
        let parsed: BoardConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.api.page_size, 250);
        assert_eq!(parsed.board.due_soon_days, 7);
        assert_eq!(parsed.inclusion, InclusionRule::default());
    }

    #[test]
    fn empty_yaml_uses_defaults() {
        let cfg: BoardConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(cfg.api.max_retries, 3);
        assert_eq!(cfg.api.retry_delay(), Duration::from_secs(1));
        assert_eq!(cfg.api.timeout(), Duration::from_secs(30));
        assert_eq!(cfg.api.max_pages, 100);
        assert_eq!(cfg.cache.ttl(), Duration::from_secs(300));
        assert_eq!(cfg.board.timezone, "Pacific/Auckland");
        assert_eq!(cfg.board.no_date_order, NoDateOrder::NewestFirst);
    }

    #[test]
    fn stage_prefix_inclusion_yaml_tagged() {
        let yaml = "inclusion:\n  type: stage_prefix\n  prefix: 'Workshop - '\n";
        let cfg: BoardConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            cfg.inclusion,
            InclusionRule::StagePrefix {
                prefix: "Workshop - ".to_string()
            }
        );
    }

    #[test]
    fn branch_inclusion_yaml_tagged() {
        let yaml = "inclusion:\n  type: branch_id\n  branch_id: 42\n";
        let cfg: BoardConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            cfg.inclusion,
            InclusionRule::BranchId {
                branch_id: 42,
                name: None
            }
        );
        assert_eq!(cfg.inclusion.describe(), "distribution branch 42");
    }

    #[test]
    fn save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        let mut cfg = BoardConfig::default();
        cfg.board.ready_stage = Some("To Collect".to_string());
        cfg.save(&path).unwrap();
        let loaded = BoardConfig::load(&path).unwrap();
        assert_eq!(loaded.board.ready_stage.as_deref(), Some("To Collect"));
    }

    #[test]
    fn load_missing_file_errors_but_load_or_default_does_not() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        assert!(BoardConfig::load(&path).is_err());
        let cfg = BoardConfig::load_or_default(&path).unwrap();
        assert_eq!(cfg.api.page_size, 250);
    }

    #[test]
    fn excluded_stages_are_known_minus_active() {
        let sel = StageSelection::default();
        let excluded = sel.excluded();
        assert!(!excluded.contains(&"Processing".to_string()));
        assert!(excluded.contains(&"Dispatched".to_string()));
        assert_eq!(excluded.len(), sel.known.len() - sel.active.len());

        let all = sel.known.clone();
        assert!(sel.excluded_for(&all).is_empty());
    }

    #[test]
    fn credentials_from_env() {
        let cfg = BoardConfig::default();
        let creds = cfg
            .credentials(env_from(&[
                (ENV_API_USERNAME, "acme"),
                (ENV_API_KEY, "secret"),
                (ENV_API_BASE, "http://localhost:9000/api/"),
            ]))
            .unwrap();
        assert_eq!(creds.username, "acme");
        assert_eq!(creds.api_key, "secret");
        assert_eq!(creds.base_url, "http://localhost:9000/api");
    }

    #[test]
    fn credentials_env_wins_over_file() {
        let mut cfg = BoardConfig::default();
        cfg.api.username = Some("from-file".to_string());
        cfg.api.api_key = Some("file-key".to_string());
        let creds = cfg
            .credentials(env_from(&[(ENV_API_USERNAME, "from-env")]))
            .unwrap();
        assert_eq!(creds.username, "from-env");
        assert_eq!(creds.api_key, "file-key");
        assert_eq!(creds.base_url, "https://api.cin7.com/api/v1");
    }

    #[test]
    fn missing_username_is_config_error() {
        let cfg = BoardConfig::default();
        let err = cfg.credentials(env_from(&[(ENV_API_KEY, "k")])).unwrap_err();
        assert!(matches!(err, BoardError::MissingCredential(ENV_API_USERNAME)));
    }

    #[test]
    fn blank_key_counts_as_missing() {
        let cfg = BoardConfig::default();
        let err = cfg
            .credentials(env_from(&[(ENV_API_USERNAME, "u"), (ENV_API_KEY, "  ")]))
            .unwrap_err();
        assert!(matches!(err, BoardError::MissingCredential(ENV_API_KEY)));
    }

    #[test]
    fn credentials_debug_hides_key() {
        let creds = Credentials {
            base_url: "https://x".to_string(),
            username: "operator".to_string(),
            api_key: "topsecret".to_string(),
        };
        let dbg = format!("{creds:?}");
        assert!(!dbg.contains("topsecret"));
        assert_eq!(creds.masked_username(), "oper***");
    }

    #[test]
    fn order_link_requires_base_and_id() {
        let mut cfg = BoardConfig::default();
        assert_eq!(cfg.order_link("123"), None);
        cfg.api.web_url_base = Some("https://go.example.com/Order.aspx".to_string());
        cfg.api.customer_apps_link = Some("99".to_string());
        assert_eq!(
            cfg.order_link("123").as_deref(),
            Some("https://go.example.com/Order.aspx?idCustomerAppsLink=99&OrderId=123")
        );
        assert_eq!(cfg.order_link(""), None);
    }

    #[test]
    fn display_stage_strips_prefix() {
        let mut settings = BoardSettings::default();
        assert_eq!(settings.display_stage("Workshop - New"), "Workshop - New");
        settings.display_stage_prefix = Some("Workshop - ".to_string());
        assert_eq!(settings.display_stage("Workshop - New"), "New");
        assert_eq!(settings.display_stage("Dispatched"), "Dispatched");
    }

    #[test]
    fn timezone_parses() {
        let settings = BoardSettings::default();
        assert_eq!(settings.tz().unwrap(), chrono_tz::Pacific::Auckland);
    }

    #[test]
    fn validate_default_config_no_warnings() {
        let cfg = BoardConfig::default();
        assert!(cfg.validate().is_empty(), "{:?}", cfg.validate());
    }

    #[test]
    fn validate_unknown_timezone_is_error() {
        let mut cfg = BoardConfig::default();
        cfg.board.timezone = "Mars/Olympus_Mons".to_string();
        let warnings = cfg.validate();
        assert!(warnings
            .iter()
            .any(|w| w.level == WarnLevel::Error && w.message.contains("Mars/Olympus_Mons")));
    }

    #[test]
    fn validate_zero_page_size_and_retries() {
        let mut cfg = BoardConfig::default();
        cfg.api.page_size = 0;
        cfg.api.max_retries = 0;
        let warnings = cfg.validate();
        assert!(warnings.iter().any(|w| w.message.contains("api.page_size")));
        assert!(warnings.iter().any(|w| w.message.contains("api.max_retries")));
        assert!(warnings.iter().all(|w| w.level == WarnLevel::Error));
    }

    #[test]
    fn validate_upcoming_days_range() {
        let mut cfg = BoardConfig::default();
        cfg.board.upcoming_days = 100_000_000;
        let warnings = cfg.validate();
        assert!(warnings
            .iter()
            .any(|w| w.level == WarnLevel::Error && w.message.contains("board.upcoming_days")));

        cfg.board.upcoming_days = -1;
        assert!(cfg.validate().iter().any(|w| w.message.contains("board.upcoming_days")));

        cfg.board.upcoming_days = MAX_UPCOMING_DAYS;
        assert!(cfg.validate().is_empty());
    }

    #[test]
    fn validate_excluded_in_progress_stage_warns() {
        let mut cfg = BoardConfig::default();
        cfg.stages.active = vec!["New".to_string()];
        let warnings = cfg.validate();
        assert!(warnings
            .iter()
            .any(|w| w.level == WarnLevel::Warning && w.message.contains("'Processing'")));
    }

    #[test]
    fn validate_unknown_active_stage_warns() {
        let mut cfg = BoardConfig::default();
        cfg.stages.active.push("Workshop - New".to_string());
        let warnings = cfg.validate();
        assert!(warnings
            .iter()
            .any(|w| w.message.contains("'Workshop - New' is not listed")));
    }

    #[test]
    fn validate_empty_prefix_warns() {
        let mut cfg = BoardConfig::default();
        cfg.inclusion = InclusionRule::StagePrefix {
            prefix: String::new(),
        };
        let warnings = cfg.validate();
        assert!(warnings.iter().any(|w| w.message.contains("inclusion.prefix")));
    }
}
