//! Transport configuration.

use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.intercom.io";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const BASE_URL_VAR: &str = "INTERCOM_BASE_URL";
const TIMEOUT_VAR: &str = "INTERCOM_TIMEOUT_SECS";

/// Settings for `UreqClient`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Service root, without a trailing slash.
    pub base_url: String,
    /// Upper bound on a whole request, connect to last body byte.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self::default().with_base_url(base_url)
    }

    /// Read `INTERCOM_BASE_URL` and `INTERCOM_TIMEOUT_SECS`, falling back to
    /// the defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(url) = lookup(BASE_URL_VAR).filter(|url| !url.trim().is_empty()) {
            config = config.with_base_url(&url);
        }
        if let Some(secs) = lookup(TIMEOUT_VAR).and_then(|s| s.trim().parse::<u64>().ok()) {
            config.timeout = Duration::from_secs(secs);
        }
        config
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Join a service path such as `/users/123` onto the base URL.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn trailing_slash_is_stripped() {
        let config = ClientConfig::new("http://localhost:3000/");
        assert_eq!(config.base_url, "http://localhost:3000");
        assert_eq!(config.url("/users"), "http://localhost:3000/users");
        assert_eq!(config.url("users/scroll"), "http://localhost:3000/users/scroll");
    }

    #[test]
    fn env_overrides_defaults() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("INTERCOM_BASE_URL", "http://127.0.0.1:9000/"),
            ("INTERCOM_TIMEOUT_SECS", "5"),
        ]);
        let config = ClientConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(config.base_url, "http://127.0.0.1:9000");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn bad_env_values_fall_back() {
        let vars: HashMap<&str, &str> =
            HashMap::from([("INTERCOM_BASE_URL", "  "), ("INTERCOM_TIMEOUT_SECS", "soon")]);
        let config = ClientConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(config, ClientConfig::default());
    }
}
