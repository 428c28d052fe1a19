use std::path::{Path, PathBuf};

use once_cell::sync::OnceCell;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;

static INIT: OnceCell<()> = OnceCell::new();

const DEFAULT_LOG_FILE: &str = "chatfold.logs.jsonl";

fn parse_bool_env(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" | "enabled" => Some(true),
        "0" | "false" | "no" | "off" | "disabled" => Some(false),
        _ => None,
    }
}

/// Logging settings resolved from `CHATFOLD_*` environment variables.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogConfig {
    /// `CHATFOLD_OBSERVABILITY_ENABLED` / `CHATFOLD_OBSERVABILITY`, default on.
    pub enabled: bool,
    /// `CHATFOLD_LOG_LEVEL` filter directive (`info`, `chatfold_core=trace`, ...).
    pub level: Option<String>,
    /// `CHATFOLD_JSON_LOG_PATH`: JSONL log file instead of console output.
    pub json_log_path: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: None,
            json_log_path: None,
        }
    }
}

impl LogConfig {
    /// Reads the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let enabled = ["CHATFOLD_OBSERVABILITY_ENABLED", "CHATFOLD_OBSERVABILITY"]
            .into_iter()
            .find_map(|key| lookup(key))
            .map_or(true, |value| parse_bool_env(&value).unwrap_or(true));
        Self {
            enabled,
            level: lookup("CHATFOLD_LOG_LEVEL").filter(|v| !v.trim().is_empty()),
            json_log_path: lookup("CHATFOLD_JSON_LOG_PATH")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
        }
    }

    /// `CHATFOLD_LOG_LEVEL` when valid, then `RUST_LOG`, then `info`.
    fn env_filter(&self) -> EnvFilter {
        if let Some(level) = &self.level
            && let Ok(filter) = EnvFilter::try_new(level)
        {
            return filter;
        }
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

fn split_log_path(path: &Path) -> (&Path, &str) {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(DEFAULT_LOG_FILE);
    (dir, file_name)
}

/// Initialize logging once per process from [`LogConfig::from_env`].
///
/// Console output goes to stderr so stdout stays free for folded output.
pub fn init_observability() {
    init_with(LogConfig::from_env());
}

/// Initialize logging once per process with explicit settings.
///
/// Later calls are no-ops, as is a call after another subscriber was installed.
pub fn init_with(config: LogConfig) {
    INIT.get_or_init(|| {
        if !config.enabled {
            return;
        }

        let env_filter = config.env_filter();
        if let Some(path) = &config.json_log_path {
            let (dir, file_name) = split_log_path(path);
            let _ = std::fs::create_dir_all(dir);
            let writer = tracing_appender::rolling::never(dir, file_name);
            let json_layer = tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .with_writer(writer);
            let _ = tracing_subscriber::registry()
                .with(env_filter)
                .with(json_layer)
                .try_init();
        } else {
            let console_layer = tracing_subscriber::fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(std::io::stderr);
            let _ = tracing_subscriber::registry()
                .with(env_filter)
                .with(console_layer)
                .try_init();
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> LogConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        LogConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn parse_bool_env_accepts_common_spellings() {
        assert_eq!(parse_bool_env(" Yes "), Some(true));
        assert_eq!(parse_bool_env("off"), Some(false));
        assert_eq!(parse_bool_env("maybe"), None);
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        assert_eq!(config_from(&[]), LogConfig::default());
    }

    #[test]
    fn first_enable_flag_wins_and_unparseable_means_enabled() {
        let config = config_from(&[
            ("CHATFOLD_OBSERVABILITY_ENABLED", "off"),
            ("CHATFOLD_OBSERVABILITY", "on"),
        ]);
        assert!(!config.enabled);
        assert!(config_from(&[("CHATFOLD_OBSERVABILITY", "sometimes")]).enabled);
    }

    #[test]
    fn blank_values_are_ignored() {
        let config = config_from(&[("CHATFOLD_LOG_LEVEL", " "), ("CHATFOLD_JSON_LOG_PATH", "")]);
        assert_eq!(config.level, None);
        assert_eq!(config.json_log_path, None);
    }

    #[test]
    fn log_path_splits_into_dir_and_file() {
        assert_eq!(
            split_log_path(Path::new("logs/run.jsonl")),
            (Path::new("logs"), "run.jsonl")
        );
        assert_eq!(split_log_path(Path::new("run.jsonl")), (Path::new("."), "run.jsonl"));
    }

    #[test]
    fn disabled_init_is_a_no_op() {
        init_with(LogConfig {
            enabled: false,
            ..LogConfig::default()
        });
        init_observability();
    }
}
