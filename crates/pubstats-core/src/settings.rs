use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Result, StatsError};
use crate::months::MonthKey;

/// Search endpoint returning the publications of a group.
pub const DEFAULT_SEARCH_URL: &str =
    "https://api.library.ethz.ch/research-collection/v2/discover/search/objects";

/// Usage-report endpoint, queried once per publication.
pub const DEFAULT_STATS_URL: &str =
    "https://api.library.ethz.ch/research-collection/v2/statistics/usagereports/search/object";

/// Entity URI prefix identifying a publication to the usage-report endpoint.
pub const DEFAULT_ENTITY_URL: &str =
    "https://www.research-collection.ethz.ch/entities/publication";

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Usage statistics dashboard for a research group's publications
#[derive(Parser, Debug, Clone)]
#[command(
    name = "pubstats",
    about = "Usage statistics dashboard for a research group's publications",
    version
)]
pub struct Settings {
    /// API key for the repository API
    #[arg(long, env = "RC_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Five-digit group identifier
    #[arg(long, env = "RC_GROUP_ID", default_value = "09746")]
    pub group_id: String,

    /// Publication search endpoint
    #[arg(long, default_value = DEFAULT_SEARCH_URL)]
    pub search_url: String,

    /// Usage report endpoint
    #[arg(long, default_value = DEFAULT_STATS_URL)]
    pub stats_url: String,

    /// Entity URI prefix for publications
    #[arg(long, default_value = DEFAULT_ENTITY_URL)]
    pub entity_url: String,

    /// Maximum number of publications requested from the search endpoint
    #[arg(long, default_value = "150")]
    pub max_items: u32,

    /// Only fetch statistics for the first N publications
    #[arg(long)]
    pub sample: Option<usize>,

    /// Delay between statistics requests in milliseconds
    #[arg(long)]
    pub delay_ms: Option<u64>,

    /// Hours before cached statistics are considered stale
    #[arg(long, default_value = "24")]
    pub cache_hours: u64,

    /// Fetch fresh statistics even if the cache is fresh
    #[arg(long)]
    pub refresh: bool,

    /// Never contact the API; use cached statistics only
    #[arg(long, conflicts_with = "refresh")]
    pub offline: bool,

    /// Fetch and print a summary without starting the dashboard
    #[arg(long)]
    pub fetch_only: bool,

    /// Directory holding the cached tables
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,

    /// First month of the time axis (YYYY-MM or "Month YYYY")
    #[arg(long)]
    pub from_month: Option<String>,

    /// Last month of the time axis (YYYY-MM or "Month YYYY")
    #[arg(long)]
    pub to_month: Option<String>,

    /// Dashboard view
    #[arg(long, default_value = "overview", value_parser = ["overview", "item", "compare", "top", "geo"])]
    pub view: String,

    /// Number of items in ranked views (5-20)
    #[arg(long, default_value = "10", value_parser = clap::value_parser!(u16).range(5..=20))]
    pub top_n: u16,

    /// Display theme
    #[arg(long, default_value = "auto", value_parser = ["light", "dark", "classic", "auto"])]
    pub theme: String,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
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

/// Persisted last-used parameters saved to `~/.pubstats/last_used.json`.
///
/// The API key is deliberately absent.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_n: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

impl LastUsedParams {
    /// Default path of the persisted config file.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Config path rooted at `base_dir`.
    pub fn config_path_in(base_dir: &std::path::Path) -> PathBuf {
        base_dir.join(".pubstats").join("last_used.json")
    }

    /// Load persisted params from an explicit path.
    /// Returns `Default` when the file is absent or cannot be parsed.
    pub fn load_from(path: &std::path::Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    /// Atomically write params to `path`, creating parent directories if needed.
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

    /// Delete the config file at `path` if it exists.
    pub fn clear_at(path: &std::path::Path) -> std::result::Result<(), std::io::Error> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments, merge with last-used params where no explicit CLI
    /// value was provided, and persist the result.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// Same as [`Settings::load_with_last_used`] with explicit arguments and
    /// config path.
    pub fn load_with_last_used_impl(
        args: Vec<std::ffi::OsString>,
        config_path: &std::path::Path,
    ) -> Self {
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        if settings.clear {
            let _ = LastUsedParams::clear_at(config_path);
            return Self::apply_debug(settings);
        }

        let last = LastUsedParams::load_from(config_path);

        // CLI and environment always win over persisted values.
        if !is_arg_explicitly_set(&matches, "view") {
            if let Some(v) = last.view {
                settings.view = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "theme") {
            if let Some(v) = last.theme {
                settings.theme = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "top_n") {
            if let Some(v) = last.top_n {
                settings.top_n = v.clamp(5, 20);
            }
        }
        if !is_arg_explicitly_set(&matches, "group_id") {
            if let Some(v) = last.group_id {
                settings.group_id = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "data_dir") {
            if let Some(v) = last.data_dir {
                settings.data_dir = v;
            }
        }

        settings = Self::apply_debug(settings);

        let _ = LastUsedParams::from(&settings).save_to(config_path);

        settings
    }

    /// `--debug` overrides the log level.
    fn apply_debug(mut settings: Settings) -> Settings {
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }

    /// Check values clap cannot express: the group identifier format and the
    /// month bounds.
    pub fn validate(&self) -> Result<()> {
        if self.group_id.len() != 5 || !self.group_id.chars().all(|c| c.is_ascii_digit()) {
            return Err(StatsError::Config(format!(
                "group id must be exactly 5 digits, got {:?}",
                self.group_id
            )));
        }
        if let (Some(from), Some(to)) = self.month_bounds()? {
            if from > to {
                return Err(StatsError::Config(format!(
                    "--from-month {} is after --to-month {}",
                    from, to
                )));
            }
        }
        Ok(())
    }

    /// Parsed `--from-month` / `--to-month`.
    pub fn month_bounds(&self) -> Result<(Option<MonthKey>, Option<MonthKey>)> {
        let from = self.from_month.as_deref().map(MonthKey::parse).transpose()?;
        let to = self.to_month.as_deref().map(MonthKey::parse).transpose()?;
        Ok((from, to))
    }

    /// Courtesy delay between statistics requests.
    pub fn request_delay(&self) -> Duration {
        let default_ms = if self.sample.is_some() { 500 } else { 1000 };
        Duration::from_millis(self.delay_ms.unwrap_or(default_ms))
    }

    /// Age after which cached statistics are refetched.
    pub fn cache_max_age(&self) -> Duration {
        Duration::from_secs(self.cache_hours * 3600)
    }

    /// File-name suffix distinguishing sample runs from full runs.
    pub fn file_suffix(&self) -> &'static str {
        if self.sample.is_some() {
            "_sample"
        } else {
            ""
        }
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            theme: Some(s.theme.clone()),
            view: Some(s.view.clone()),
            top_n: Some(s.top_n),
            group_id: Some(s.group_id.clone()),
            data_dir: Some(s.data_dir.clone()),
        }
    }
}

/// Returns `true` when `name` was supplied explicitly on the command line or
/// through its environment variable.
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches!(
        matches.value_source(name),
        Some(clap::parser::ValueSource::CommandLine | clap::parser::ValueSource::EnvVariable)
    )
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn tmp_config_path(tmp: &TempDir) -> PathBuf {
        LastUsedParams::config_path_in(tmp.path())
    }

    fn parse(args: &[&str]) -> Settings {
        let mut full = vec!["pubstats"];
        full.extend_from_slice(args);
        Settings::parse_from(full)
    }

    #[test]
    fn test_last_used_params_save_load() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        let params = LastUsedParams {
            theme: Some("dark".to_string()),
            view: Some("geo".to_string()),
            top_n: Some(15),
            group_id: Some("12345".to_string()),
            data_dir: Some(PathBuf::from("/srv/stats")),
        };
        params.save_to(&path).expect("save");

        let loaded = LastUsedParams::load_from(&path);
        assert_eq!(loaded.theme, Some("dark".to_string()));
        assert_eq!(loaded.view, Some("geo".to_string()));
        assert_eq!(loaded.top_n, Some(15));
        assert_eq!(loaded.group_id, Some("12345".to_string()));
        assert_eq!(loaded.data_dir, Some(PathBuf::from("/srv/stats")));
    }

    #[test]
    fn test_last_used_params_default_when_missing() {
        let tmp = TempDir::new().expect("tempdir");
        let loaded = LastUsedParams::load_from(&tmp_config_path(&tmp));
        assert!(loaded.theme.is_none());
        assert!(loaded.view.is_none());
        assert!(loaded.top_n.is_none());
    }

    #[test]
    fn test_last_used_params_clear() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        LastUsedParams::default().save_to(&path).expect("save");
        assert!(path.exists());
        LastUsedParams::clear_at(&path).expect("clear");
        assert!(!path.exists());
    }

    #[test]
    fn test_settings_default_values() {
        let settings = parse(&[]);
        assert_eq!(settings.search_url, DEFAULT_SEARCH_URL);
        assert_eq!(settings.stats_url, DEFAULT_STATS_URL);
        assert_eq!(settings.max_items, 150);
        assert_eq!(settings.cache_hours, 24);
        assert_eq!(settings.view, "overview");
        assert_eq!(settings.top_n, 10);
        assert_eq!(settings.theme, "auto");
        assert_eq!(settings.data_dir, PathBuf::from("data"));
        assert!(settings.sample.is_none());
        assert!(!settings.refresh);
        assert!(!settings.offline);
    }

    #[test]
    fn test_top_n_range_enforced() {
        assert!(Settings::try_parse_from(["pubstats", "--top-n", "4"]).is_err());
        assert!(Settings::try_parse_from(["pubstats", "--top-n", "21"]).is_err());
        assert_eq!(parse(&["--top-n", "20"]).top_n, 20);
    }

    #[test]
    fn test_offline_conflicts_with_refresh() {
        assert!(Settings::try_parse_from(["pubstats", "--offline", "--refresh"]).is_err());
    }

    #[test]
    fn test_validate_group_id() {
        assert!(parse(&["--group-id", "12345"]).validate().is_ok());
        for bad in ["1234", "123456", "12a45", ""] {
            let err = parse(&["--group-id", bad]).validate().unwrap_err();
            assert!(matches!(err, StatsError::Config(_)), "{bad:?} -> {err:?}");
        }
    }

    #[test]
    fn test_validate_month_bounds() {
        let ok = parse(&["--group-id", "12345", "--from-month", "March 2025", "--to-month", "2025-09"]);
        assert!(ok.validate().is_ok());
        let (from, to) = ok.month_bounds().unwrap();
        assert_eq!(from.unwrap().to_string(), "2025-03");
        assert_eq!(to.unwrap().to_string(), "2025-09");

        let reversed = parse(&["--group-id", "12345", "--from-month", "2025-09", "--to-month", "2025-03"]);
        assert!(matches!(reversed.validate(), Err(StatsError::Config(_))));

        let garbage = parse(&["--group-id", "12345", "--from-month", "soon"]);
        assert!(matches!(
            garbage.validate(),
            Err(StatsError::InvalidMonthLabel(_))
        ));
    }

    #[test]
    fn test_request_delay_defaults() {
        assert_eq!(parse(&[]).request_delay(), Duration::from_millis(1000));
        assert_eq!(
            parse(&["--sample", "3"]).request_delay(),
            Duration::from_millis(500)
        );
        assert_eq!(
            parse(&["--delay-ms", "0"]).request_delay(),
            Duration::from_millis(0)
        );
    }

    #[test]
    fn test_file_suffix_and_cache_age() {
        assert_eq!(parse(&[]).file_suffix(), "");
        assert_eq!(parse(&["--sample", "3"]).file_suffix(), "_sample");
        assert_eq!(
            parse(&["--cache-hours", "2"]).cache_max_age(),
            Duration::from_secs(7200)
        );
    }

    #[test]
    fn test_load_with_last_used_merges_persisted_view() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        LastUsedParams {
            view: Some("geo".to_string()),
            theme: Some("light".to_string()),
            ..Default::default()
        }
        .save_to(&config_path)
        .expect("save");

        let settings = Settings::load_with_last_used_impl(vec!["pubstats".into()], &config_path);
        assert_eq!(settings.view, "geo");
        assert_eq!(settings.theme, "light");
    }

    #[test]
    fn test_load_with_last_used_cli_overrides_persisted() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        LastUsedParams {
            view: Some("geo".to_string()),
            ..Default::default()
        }
        .save_to(&config_path)
        .expect("save");

        let settings = Settings::load_with_last_used_impl(
            vec!["pubstats".into(), "--view".into(), "top".into()],
            &config_path,
        );
        assert_eq!(settings.view, "top");
    }

    #[test]
    fn test_load_with_last_used_never_persists_api_key() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);

        Settings::load_with_last_used_impl(
            vec!["pubstats".into(), "--api-key".into(), "s3cret".into()],
            &config_path,
        );

        let content = std::fs::read_to_string(&config_path).expect("persisted");
        assert!(!content.contains("s3cret"));
    }

    #[test]
    fn test_load_with_last_used_clear_removes_file() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        LastUsedParams::default().save_to(&config_path).expect("save");

        Settings::load_with_last_used_impl(
            vec!["pubstats".into(), "--clear".into()],
            &config_path,
        );
        assert!(!config_path.exists());
    }

    #[test]
    fn test_load_with_last_used_debug_overrides_log_level() {
        let tmp = TempDir::new().expect("tempdir");
        let settings = Settings::load_with_last_used_impl(
            vec!["pubstats".into(), "--debug".into()],
            &tmp_config_path(&tmp),
        );
        assert_eq!(settings.log_level, "DEBUG");
    }
}
