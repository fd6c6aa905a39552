use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub addr: SocketAddr,
    /// Base URL of the identity service. Lists render without profiles when unset.
    pub profile_url: Option<String>,
    pub profile_timeout: Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let db_path = get("TETHER_DB_PATH").unwrap_or_else(|| "tether.db".into());
        let host = get("TETHER_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = get("TETHER_PORT")
            .unwrap_or_else(|| "3000".into())
            .parse()
            .context("TETHER_PORT must be a port number")?;
        let addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", host, port))?;

        let profile_url = get("TETHER_PROFILE_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty());
        let timeout_ms: u64 = get("TETHER_PROFILE_TIMEOUT_MS")
            .unwrap_or_else(|| "500".into())
            .parse()
            .context("TETHER_PROFILE_TIMEOUT_MS must be milliseconds")?;

        Ok(Self {
            db_path: PathBuf::from(db_path),
            addr,
            profile_url,
            profile_timeout: Duration::from_millis(timeout_ms),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.db_path, PathBuf::from("tether.db"));
        assert_eq!(config.addr.to_string(), "0.0.0.0:3000");
        assert!(config.profile_url.is_none());
        assert_eq!(config.profile_timeout, Duration::from_millis(500));
    }

    #[test]
    fn overrides() {
        let config = Config::from_lookup(lookup(&[
            ("TETHER_HOST", "127.0.0.1"),
            ("TETHER_PORT", "8080"),
            ("TETHER_PROFILE_URL", "http://identity:9000/"),
            ("TETHER_PROFILE_TIMEOUT_MS", "250"),
        ]))
        .unwrap();
        assert_eq!(config.addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.profile_url.as_deref(), Some("http://identity:9000"));
        assert_eq!(config.profile_timeout, Duration::from_millis(250));
    }

    #[test]
    fn bad_port_is_rejected() {
        assert!(Config::from_lookup(lookup(&[("TETHER_PORT", "http")])).is_err());
    }
}
