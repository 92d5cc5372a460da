use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use crate::error::{ConsoleError, Result};
use crate::reconnect::ReconnectPolicy;

/// Default telemetry stream address of the station backend.
pub const DEFAULT_ENDPOINT: &str = "ws://localhost:8765/ws/telemetry";

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Ground-station operator console for live spacecraft telemetry
#[derive(Parser, Debug, Clone)]
#[command(
    name = "groundstation-console",
    about = "Ground-station operator console for live spacecraft telemetry",
    version
)]
pub struct Settings {
    /// Telemetry stream endpoint (ws:// or wss://)
    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Display theme
    #[arg(long, default_value = "auto", value_parser = ["light", "dark", "classic", "auto"])]
    pub theme: String,

    /// Page shown at startup
    #[arg(long, default_value = "dashboard", value_parser = [
        "dashboard", "telemetry", "rf-link", "pass-planner", "antenna-control", "logs", "settings"
    ])]
    pub page: String,

    /// Reconnect policy after the stream drops
    #[arg(long, default_value = "never", value_parser = ["never", "backoff"])]
    pub reconnect: String,

    /// First reconnect delay in milliseconds
    #[arg(long, default_value = "1000", value_parser = clap::value_parser!(u64).range(10..=600_000))]
    pub reconnect_initial_ms: u64,

    /// Longest reconnect delay in milliseconds
    #[arg(long, default_value = "10000", value_parser = clap::value_parser!(u64).range(10..=600_000))]
    pub reconnect_max_ms: u64,

    /// Give up after this many reconnect attempts (unbounded if absent)
    #[arg(long)]
    pub reconnect_max_attempts: Option<u32>,

    /// Frames buffered between the stream reader and the display
    #[arg(long, default_value = "256", value_parser = clap::value_parser!(u32).range(1..=65_536))]
    pub channel_capacity: u32,

    /// Serve simulated telemetry locally and connect to it
    #[arg(long)]
    pub simulate: bool,

    /// Interval between simulated packets in milliseconds
    #[arg(long, default_value = "1000", value_parser = clap::value_parser!(u64).range(50..=60_000))]
    pub sim_interval_ms: u64,

    /// Simulated packet shape
    #[arg(long, default_value = "full", value_parser = ["full", "partial"])]
    pub sim_profile: String,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path (defaults to ~/.groundstation-console/logs/console.log)
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long)]
    pub clear: bool,
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used parameters saved to
/// `~/.groundstation-console/last_used.json`.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reconnect: Option<String>,
}

impl LastUsedParams {
    /// Return the default path to the persisted config file.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Return the config path rooted at `base_dir` (used for testing).
    pub fn config_path_in(base_dir: &std::path::Path) -> PathBuf {
        base_dir.join(".groundstation-console").join("last_used.json")
    }

    /// Load persisted params from an explicit path.
    /// Returns `Default` when the file is absent or cannot be parsed.
    pub fn load_from(path: &std::path::Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable last-used params");
            Self::default()
        })
    }

    /// Atomically write params to an explicit path, creating parent
    /// directories if needed.
    pub fn save_to(&self, path: &std::path::Path) -> std::result::Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Delete the config file at an explicit path if it exists.
    pub fn clear_at(path: &std::path::Path) -> std::result::Result<(), std::io::Error> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments only, without reading or writing last-used params.
    ///
    /// Log options are never persisted, so this is enough to set up logging
    /// before [`Settings::load_with_last_used`] runs.
    pub fn parse_cli() -> Self {
        Self::parse_cli_from(std::env::args_os().collect())
    }

    pub fn parse_cli_from(args: Vec<std::ffi::OsString>) -> Self {
        Self::apply_debug_flag(Settings::parse_from(args))
    }

    /// Parse CLI arguments, merge with last-used params where no explicit CLI
    /// value was provided, and persist the result.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// Full implementation – accepts args and an explicit config path so that
    /// tests can redirect to a temporary directory.
    pub fn load_with_last_used_impl(
        args: Vec<std::ffi::OsString>,
        config_path: &std::path::Path,
    ) -> Self {
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        if settings.clear {
            if let Err(e) = LastUsedParams::clear_at(config_path) {
                tracing::warn!(error = %e, "failed to clear last-used params");
            }
            return Self::apply_debug_flag(settings);
        }

        let last = LastUsedParams::load_from(config_path);
        let saved_endpoint = last.endpoint.filter(|raw| match parse_endpoint(raw) {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(error = %e, "ignoring persisted endpoint");
                false
            }
        });

        // CLI always wins. A simulated run never inherits or stores an
        // endpoint because it points at an ephemeral local port.
        if !is_arg_explicitly_set(&matches, "endpoint") && !settings.simulate {
            if let Some(v) = saved_endpoint.clone() {
                settings.endpoint = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "theme") {
            if let Some(v) = last.theme {
                settings.theme = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "reconnect") {
            if let Some(v) = last.reconnect {
                settings.reconnect = v;
            }
        }

        settings = Self::apply_debug_flag(settings);

        // Only a usable endpoint replaces the stored one.
        let mut params = LastUsedParams::from(&settings);
        if settings.simulate || settings.endpoint_url().is_err() {
            params.endpoint = saved_endpoint;
        }
        if let Err(e) = params.save_to(config_path) {
            tracing::warn!(error = %e, "failed to persist last-used params");
        }

        settings
    }

    /// `--debug` overrides the log level.
    fn apply_debug_flag(mut settings: Settings) -> Settings {
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }

    /// Parse and validate the configured endpoint.
    pub fn endpoint_url(&self) -> Result<Url> {
        parse_endpoint(&self.endpoint)
    }

    /// Reconnect policy selected on the command line.
    pub fn reconnect_policy(&self) -> ReconnectPolicy {
        match self.reconnect.as_str() {
            "backoff" => {
                let initial = Duration::from_millis(self.reconnect_initial_ms);
                let max = Duration::from_millis(self.reconnect_max_ms).max(initial);
                ReconnectPolicy::Backoff {
                    initial,
                    max,
                    max_attempts: self.reconnect_max_attempts,
                }
            }
            _ => ReconnectPolicy::Never,
        }
    }

    pub fn sim_interval(&self) -> Duration {
        Duration::from_millis(self.sim_interval_ms)
    }
}

/// Parse a telemetry endpoint, accepting only `ws` and `wss` URLs.
pub fn parse_endpoint(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| ConsoleError::InvalidEndpoint {
        endpoint: raw.to_string(),
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "ws" | "wss" => Ok(url),
        other => Err(ConsoleError::InvalidEndpoint {
            endpoint: raw.to_string(),
            reason: format!("scheme must be ws or wss, got {other}"),
        }),
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            endpoint: Some(s.endpoint.clone()),
            theme: Some(s.theme.clone()),
            reconnect: Some(s.reconnect.clone()),
        }
    }
}

/// Returns `true` when `name` was supplied explicitly on the command line
/// (not via default value or environment variable).
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn tmp_config_path(tmp: &TempDir) -> PathBuf {
        LastUsedParams::config_path_in(tmp.path())
    }

    // ── LastUsedParams ────────────────────────────────────────────────────────

    #[test]
    fn test_last_used_params_save_load() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        let params = LastUsedParams {
            endpoint: Some("ws://10.0.0.7:8765/ws/telemetry".to_string()),
            theme: Some("dark".to_string()),
            reconnect: Some("backoff".to_string()),
        };
        params.save_to(&path).expect("save");

        let loaded = LastUsedParams::load_from(&path);
        assert_eq!(loaded.endpoint.as_deref(), Some("ws://10.0.0.7:8765/ws/telemetry"));
        assert_eq!(loaded.theme.as_deref(), Some("dark"));
        assert_eq!(loaded.reconnect.as_deref(), Some("backoff"));
    }

    #[test]
    fn test_last_used_params_clear() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        LastUsedParams {
            theme: Some("light".to_string()),
            ..Default::default()
        }
        .save_to(&path)
        .expect("save");
        assert!(path.exists());

        LastUsedParams::clear_at(&path).expect("clear");
        assert!(!path.exists());
    }

    #[test]
    fn test_last_used_params_default_when_missing_or_corrupt() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        assert!(LastUsedParams::load_from(&path).endpoint.is_none());

        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{ not json").unwrap();
        let loaded = LastUsedParams::load_from(&path);
        assert!(loaded.endpoint.is_none());
        assert!(loaded.theme.is_none());
    }

    // ── defaults / parsing ────────────────────────────────────────────────────

    #[test]
    fn test_settings_default_values() {
        let settings = Settings::parse_from(["groundstation-console"]);

        assert_eq!(settings.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(settings.theme, "auto");
        assert_eq!(settings.page, "dashboard");
        assert_eq!(settings.reconnect, "never");
        assert_eq!(settings.reconnect_initial_ms, 1000);
        assert_eq!(settings.reconnect_max_ms, 10_000);
        assert!(settings.reconnect_max_attempts.is_none());
        assert_eq!(settings.channel_capacity, 256);
        assert!(!settings.simulate);
        assert_eq!(settings.sim_interval_ms, 1000);
        assert_eq!(settings.sim_profile, "full");
        assert_eq!(settings.log_level, "INFO");
        assert!(settings.log_file.is_none());
        assert!(!settings.debug);
        assert!(!settings.clear);
    }

    #[test]
    fn test_settings_rejects_unknown_page() {
        let result = Settings::try_parse_from(["groundstation-console", "--page", "orbit"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_settings_rejects_zero_channel_capacity() {
        let result =
            Settings::try_parse_from(["groundstation-console", "--channel-capacity", "0"]);
        assert!(result.is_err());
    }

    // ── endpoint validation ───────────────────────────────────────────────────

    #[test]
    fn test_endpoint_url_default_is_valid() {
        let settings = Settings::parse_from(["groundstation-console"]);
        let url = settings.endpoint_url().expect("default endpoint");
        assert_eq!(url.scheme(), "ws");
        assert_eq!(url.port(), Some(8765));
        assert_eq!(url.path(), "/ws/telemetry");
    }

    #[test]
    fn test_parse_endpoint_rejects_http() {
        let err = parse_endpoint("http://localhost:8765/ws/telemetry").unwrap_err();
        assert!(err.to_string().contains("scheme must be ws or wss"));
    }

    #[test]
    fn test_parse_endpoint_rejects_garbage() {
        assert!(parse_endpoint("not a url").is_err());
    }

    #[test]
    fn test_parse_endpoint_accepts_wss() {
        assert!(parse_endpoint("wss://station.example.org/ws/telemetry").is_ok());
    }

    // ── reconnect policy ──────────────────────────────────────────────────────

    #[test]
    fn test_reconnect_policy_default_never() {
        let settings = Settings::parse_from(["groundstation-console"]);
        assert_eq!(settings.reconnect_policy(), ReconnectPolicy::Never);
    }

    #[test]
    fn test_reconnect_policy_backoff_from_flags() {
        let settings = Settings::parse_from([
            "groundstation-console",
            "--reconnect",
            "backoff",
            "--reconnect-initial-ms",
            "250",
            "--reconnect-max-ms",
            "4000",
            "--reconnect-max-attempts",
            "5",
        ]);
        assert_eq!(
            settings.reconnect_policy(),
            ReconnectPolicy::Backoff {
                initial: Duration::from_millis(250),
                max: Duration::from_millis(4000),
                max_attempts: Some(5),
            }
        );
    }

    #[test]
    fn test_reconnect_policy_max_never_below_initial() {
        let settings = Settings::parse_from([
            "groundstation-console",
            "--reconnect",
            "backoff",
            "--reconnect-initial-ms",
            "5000",
            "--reconnect-max-ms",
            "1000",
        ]);
        let ReconnectPolicy::Backoff { initial, max, .. } = settings.reconnect_policy() else {
            panic!("expected backoff policy");
        };
        assert_eq!(max, initial);
    }

    // ── load_with_last_used ───────────────────────────────────────────────────

    #[test]
    fn test_load_with_last_used_merges_persisted_endpoint() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        LastUsedParams {
            endpoint: Some("ws://192.168.1.100:8765/ws/telemetry".to_string()),
            theme: Some("classic".to_string()),
            ..Default::default()
        }
        .save_to(&config_path)
        .expect("save");

        let settings =
            Settings::load_with_last_used_impl(vec!["groundstation-console".into()], &config_path);
        assert_eq!(settings.endpoint, "ws://192.168.1.100:8765/ws/telemetry");
        assert_eq!(settings.theme, "classic");
    }

    #[test]
    fn test_load_with_last_used_cli_overrides_persisted() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        LastUsedParams {
            theme: Some("dark".to_string()),
            reconnect: Some("backoff".to_string()),
            ..Default::default()
        }
        .save_to(&config_path)
        .expect("save");

        let settings = Settings::load_with_last_used_impl(
            vec![
                "groundstation-console".into(),
                "--theme".into(),
                "light".into(),
                "--reconnect".into(),
                "never".into(),
            ],
            &config_path,
        );
        assert_eq!(settings.theme, "light");
        assert_eq!(settings.reconnect, "never");
    }

    #[test]
    fn test_load_with_last_used_clear_removes_file() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        LastUsedParams {
            theme: Some("classic".to_string()),
            ..Default::default()
        }
        .save_to(&config_path)
        .expect("save");

        Settings::load_with_last_used_impl(
            vec!["groundstation-console".into(), "--clear".into()],
            &config_path,
        );
        assert!(!config_path.exists());
    }

    #[test]
    fn test_load_with_last_used_debug_overrides_log_level() {
        let tmp = TempDir::new().expect("tempdir");
        let settings = Settings::load_with_last_used_impl(
            vec!["groundstation-console".into(), "--debug".into()],
            &tmp_config_path(&tmp),
        );
        assert_eq!(settings.log_level, "DEBUG");
    }

    #[test]
    fn test_load_with_last_used_persists_after_run() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);

        Settings::load_with_last_used_impl(
            vec![
                "groundstation-console".into(),
                "--endpoint".into(),
                "ws://10.1.1.1:9000/ws/telemetry".into(),
            ],
            &config_path,
        );

        let loaded = LastUsedParams::load_from(&config_path);
        assert_eq!(loaded.endpoint.as_deref(), Some("ws://10.1.1.1:9000/ws/telemetry"));
    }

    #[test]
    fn test_invalid_endpoint_is_not_persisted() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        LastUsedParams {
            endpoint: Some("ws://10.0.0.3:8765/ws/telemetry".to_string()),
            ..Default::default()
        }
        .save_to(&config_path)
        .expect("save");

        let first = Settings::load_with_last_used_impl(
            vec![
                "groundstation-console".into(),
                "--endpoint".into(),
                "http://bad".into(),
            ],
            &config_path,
        );
        assert!(first.endpoint_url().is_err());

        let second =
            Settings::load_with_last_used_impl(vec!["groundstation-console".into()], &config_path);
        assert_eq!(second.endpoint, "ws://10.0.0.3:8765/ws/telemetry");
        assert!(second.endpoint_url().is_ok());
    }

    #[test]
    fn test_invalid_persisted_endpoint_is_ignored() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        LastUsedParams {
            endpoint: Some("http://bad".to_string()),
            theme: Some("dark".to_string()),
            ..Default::default()
        }
        .save_to(&config_path)
        .expect("save");

        let settings =
            Settings::load_with_last_used_impl(vec!["groundstation-console".into()], &config_path);
        assert_eq!(settings.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(settings.theme, "dark");

        let loaded = LastUsedParams::load_from(&config_path);
        assert_eq!(loaded.endpoint.as_deref(), Some(DEFAULT_ENDPOINT));
    }

    #[test]
    fn test_parse_cli_applies_debug_flag() {
        let settings = Settings::parse_cli_from(vec![
            "groundstation-console".into(),
            "--debug".into(),
            "--log-file".into(),
            "/tmp/console.log".into(),
        ]);
        assert_eq!(settings.log_level, "DEBUG");
        assert_eq!(settings.log_file, Some(PathBuf::from("/tmp/console.log")));
    }

    #[test]
    fn test_simulated_run_keeps_persisted_endpoint() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        LastUsedParams {
            endpoint: Some("ws://10.0.0.2:8765/ws/telemetry".to_string()),
            ..Default::default()
        }
        .save_to(&config_path)
        .expect("save");

        let settings = Settings::load_with_last_used_impl(
            vec!["groundstation-console".into(), "--simulate".into()],
            &config_path,
        );
        assert_eq!(settings.endpoint, DEFAULT_ENDPOINT);

        let loaded = LastUsedParams::load_from(&config_path);
        assert_eq!(loaded.endpoint.as_deref(), Some("ws://10.0.0.2:8765/ws/telemetry"));
    }
}
