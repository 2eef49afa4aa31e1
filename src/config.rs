use serde::Deserialize;
use std::path::Path;

pub const DEFAULT_REPORTING_URL: &str =
    "https://analyticsreporting.googleapis.com/v4/reports:batchGet";

/// Application configuration loaded from environment variables or TOML file.
#[derive(Clone, Deserialize, veil::Redact)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Double-JSON-encoded service-account credential, stored exactly as given.
    /// Parsed per request so that a malformed value fails the request, not startup.
    #[serde(default)]
    #[redact]
    pub credential: Option<String>,
    /// Analytics view the ranking report is run against.
    #[serde(default)]
    pub view_id: String,
    #[serde(default = "default_reporting_url")]
    pub reporting_url: String,
    /// Overrides the credential's own `token_uri` when set.
    #[serde(default)]
    pub token_url: Option<String>,
    /// Timeout applied to every outbound call and to inbound requests (default: 30).
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    8000
}

fn default_reporting_url() -> String {
    DEFAULT_REPORTING_URL.to_string()
}

const fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            credential: None,
            view_id: String::new(),
            reporting_url: default_reporting_url(),
            token_url: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file, falling back to defaults.
    ///
    /// Environment variables override file values:
    /// - `RANKING_HOST` → host
    /// - `RANKING_PORT` → port
    /// - `ANALYTICS_API_CREDENTIAL` → credential
    /// - `ANALYTICS_API_VIEW_ID` → view_id
    /// - `RANKING_REPORTING_URL` → reporting_url
    /// - `RANKING_TOKEN_URL` → token_url
    /// - `RANKING_REQUEST_TIMEOUT` → request_timeout_secs
    pub fn load(config_path: Option<&Path>) -> Self {
        let mut config =
            config_path.map_or_else(Self::default, |path| match std::fs::read_to_string(path) {
                Ok(contents) => toml::from_str(&contents).unwrap_or_else(|e| {
                    tracing::warn!("Failed to parse config file: {e}, using defaults");
                    Self::default()
                }),
                Err(e) => {
                    tracing::warn!("Failed to read config file: {e}, using defaults");
                    Self::default()
                }
            });

        // Environment variable overrides
        if let Ok(host) = std::env::var("RANKING_HOST") {
            config.host = host;
        }
        if let Ok(port) = std::env::var("RANKING_PORT") {
            if let Ok(p) = port.parse() {
                config.port = p;
            }
        }
        if let Ok(credential) = std::env::var("ANALYTICS_API_CREDENTIAL") {
            config.credential = Some(credential);
        }
        if let Ok(view_id) = std::env::var("ANALYTICS_API_VIEW_ID") {
            config.view_id = view_id;
        }
        if let Ok(url) = std::env::var("RANKING_REPORTING_URL") {
            config.reporting_url = url;
        }
        if let Ok(url) = std::env::var("RANKING_TOKEN_URL") {
            config.token_url = Some(url);
        }
        if let Ok(val) = std::env::var("RANKING_REQUEST_TIMEOUT") {
            if let Ok(t) = val.parse() {
                config.request_timeout_secs = t;
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;

    /// Serializes tests that call `Config::load`, which reads process environment.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8000);
        assert!(config.credential.is_none());
        assert!(config.view_id.is_empty());
        assert_eq!(config.reporting_url, DEFAULT_REPORTING_URL);
        assert!(config.token_url.is_none());
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn test_load_from_toml() {
        let _guard = ENV_LOCK.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        let mut file = std::fs::File::create(&config_path).unwrap();
        write!(
            file,
            r#"
host = "127.0.0.1"
port = 9000
view_id = "123456789"
reporting_url = "http://localhost:9999/batchGet"
token_url = "http://localhost:9999/token"
request_timeout_secs = 5
"#
        )
        .unwrap();

        let config = Config::load(Some(&config_path));
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 9000);
        assert_eq!(config.view_id, "123456789");
        assert_eq!(config.reporting_url, "http://localhost:9999/batchGet");
        assert_eq!(
            config.token_url.as_deref(),
            Some("http://localhost:9999/token")
        );
        assert_eq!(config.request_timeout_secs, 5);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let _guard = ENV_LOCK.lock().unwrap();
        let config = Config::load(Some(Path::new("/nonexistent/config.toml")));
        assert_eq!(config.port, 8000);
    }

    #[test]
    fn test_invalid_toml_uses_defaults() {
        let _guard = ENV_LOCK.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        std::fs::write(&config_path, "this is not valid toml {{{").unwrap();

        let config = Config::load(Some(&config_path));
        assert_eq!(config.port, 8000);
    }

    #[test]
    fn test_env_var_overrides() {
        let _guard = ENV_LOCK.lock().unwrap();

        let orig_view = std::env::var("ANALYTICS_API_VIEW_ID").ok();
        let orig_port = std::env::var("RANKING_PORT").ok();

        std::env::set_var("ANALYTICS_API_VIEW_ID", "987654");
        std::env::set_var("RANKING_PORT", "3000");
        let config = Config::load(None);
        assert_eq!(config.view_id, "987654");
        assert_eq!(config.port, 3000);

        match orig_view {
            Some(v) => std::env::set_var("ANALYTICS_API_VIEW_ID", v),
            None => std::env::remove_var("ANALYTICS_API_VIEW_ID"),
        }
        match orig_port {
            Some(v) => std::env::set_var("RANKING_PORT", v),
            None => std::env::remove_var("RANKING_PORT"),
        }
    }

    #[test]
    fn test_debug_redacts_credential() {
        let config = Config {
            credential: Some("super-secret-key".to_string()),
            ..Config::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret-key"));
    }
}
