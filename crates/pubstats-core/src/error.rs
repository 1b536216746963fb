use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the publication statistics crates.
#[derive(Error, Debug)]
pub enum StatsError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A JSON document could not be parsed.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// A CSV table could not be read or written.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The upstream source could not be reached.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// The upstream source answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },

    /// A month label could not be mapped onto a sortable month key.
    #[error("Invalid month label: {0:?}")]
    InvalidMonthLabel(String),

    /// A search response did not have the expected envelope.
    #[error("Unexpected API response structure: {0}")]
    InvalidResponse(String),

    /// No cached statistics exist in the data directory.
    #[error("No cached statistics found in {0}")]
    CacheMissing(PathBuf),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An error originating from the terminal / TUI layer.
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StatsError {
    /// `true` for failures reaching the upstream source, which callers may
    /// recover from by serving cached data.
    pub fn is_transport(&self) -> bool {
        matches!(self, StatsError::Http(_) | StatsError::HttpStatus { .. })
    }
}

/// Convenience alias used throughout the pubstats crates.
pub type Result<T> = std::result::Result<T, StatsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_file_read() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = StatsError::FileRead {
            path: PathBuf::from("/data/monthly_visits.csv"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("Failed to read file"));
        assert!(msg.contains("/data/monthly_visits.csv"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn test_error_display_http_status() {
        let err = StatsError::HttpStatus {
            status: 403,
            url: "https://example.org/search".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 403 from https://example.org/search");
    }

    #[test]
    fn test_error_display_invalid_month_label() {
        let err = StatsError::InvalidMonthLabel("Smarch 2025".to_string());
        assert_eq!(err.to_string(), "Invalid month label: \"Smarch 2025\"");
    }

    #[test]
    fn test_error_display_cache_missing() {
        let err = StatsError::CacheMissing(PathBuf::from("/empty/dir"));
        assert_eq!(err.to_string(), "No cached statistics found in /empty/dir");
    }

    #[test]
    fn test_error_display_config() {
        let err = StatsError::Config("missing api key".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing api key");
    }

    #[test]
    fn test_is_transport() {
        assert!(StatsError::Http("timeout".to_string()).is_transport());
        assert!(StatsError::HttpStatus {
            status: 500,
            url: String::new()
        }
        .is_transport());
        assert!(!StatsError::Config("x".to_string()).is_transport());
        assert!(!StatsError::InvalidMonthLabel("x".to_string()).is_transport());
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: StatsError = io_err.into();
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn test_error_from_serde_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{invalid}").unwrap_err();
        let err: StatsError = json_err.into();
        assert!(err.to_string().contains("Failed to parse JSON"));
    }
}
