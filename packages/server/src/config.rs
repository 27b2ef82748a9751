//! Server configuration from environment variables.

use sinkhole_map_backend::DEFAULT_BACKEND_URL;

/// Default directory of the file-backed survey store.
pub const DEFAULT_SURVEY_STORE_DIR: &str = "data/survey";

/// Runtime settings for [`super::run_server`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Interface to bind (`BIND_ADDR`).
    pub bind_addr: String,
    /// Port to bind (`PORT`).
    pub port: u16,
    /// Prediction backend root (`BACKEND_URL`, then `FASTAPI_URL`).
    pub backend_url: String,
    /// Survey store directory (`SURVEY_STORE_DIR`).
    pub survey_store_dir: String,
}

impl ServerConfig {
    /// Reads the configuration from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    /// Unset or unparseable values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let port = lookup("PORT").and_then(|p| p.parse().ok()).unwrap_or(8080);

        Self {
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| "127.0.0.1".to_string()),
            port,
            backend_url: lookup("BACKEND_URL")
                .or_else(|| lookup("FASTAPI_URL"))
                .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string()),
            survey_store_dir: lookup("SURVEY_STORE_DIR")
                .unwrap_or_else(|| DEFAULT_SURVEY_STORE_DIR.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> ServerConfig {
        let vars: BTreeMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ServerConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let cfg = config(&[]);
        assert_eq!(cfg.bind_addr, "127.0.0.1");
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.backend_url, "http://localhost:8000");
        assert_eq!(cfg.survey_store_dir, "data/survey");
    }

    #[test]
    fn backend_url_prefers_backend_over_fastapi() {
        let cfg = config(&[("FASTAPI_URL", "http://fastapi:8000")]);
        assert_eq!(cfg.backend_url, "http://fastapi:8000");

        let cfg = config(&[
            ("FASTAPI_URL", "http://fastapi:8000"),
            ("BACKEND_URL", "http://ml:9000"),
        ]);
        assert_eq!(cfg.backend_url, "http://ml:9000");
    }

    #[test]
    fn bad_port_falls_back() {
        assert_eq!(config(&[("PORT", "http")]).port, 8080);
        assert_eq!(config(&[("PORT", "3000")]).port, 3000);
    }
}
