use std::{env, path::PathBuf};

use anyhow::{Context, bail};

pub(crate) const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3002";
pub(crate) const DEFAULT_DATA_FILE: &str = "earnings.json";
pub(crate) const DEFAULT_MAX_DONATIONS: usize = 50;
pub(crate) const DEFAULT_WEBHOOK_PATH: &str = "/wolcen/api/webhook";

#[derive(Debug, Clone)]
pub(crate) struct WebhookConfig {
    pub(crate) bind_addr: String,
    pub(crate) verification_token: String,
    pub(crate) data_file: PathBuf,
    pub(crate) max_donations: usize,
    pub(crate) path: String,
}

impl WebhookConfig {
    pub(crate) fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from any name -> value source; `from_env` passes the process environment.
    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let verification_token = lookup("WEBHOOK_VERIFICATION_TOKEN")
            .context("WEBHOOK_VERIFICATION_TOKEN must be set")?;
        if verification_token.trim().is_empty() {
            bail!("WEBHOOK_VERIFICATION_TOKEN is empty");
        }

        let mut path = lookup("WEBHOOK_PATH").unwrap_or_else(|| DEFAULT_WEBHOOK_PATH.to_string());
        if !path.starts_with('/') {
            log::warn!("WEBHOOK_PATH ({}) has no leading slash, adding one", path);
            path.insert(0, '/');
        }

        Ok(Self {
            bind_addr: lookup("WEBHOOK_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            verification_token,
            data_file: lookup("WEBHOOK_DATA_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_FILE)),
            max_donations: read_usize(&lookup, "WEBHOOK_MAX_DONATIONS", DEFAULT_MAX_DONATIONS),
            path,
        })
    }
}

fn read_usize(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: usize) -> usize {
    lookup(name)
        .and_then(|value| value.parse::<usize>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_apply_when_only_token_is_set() {
        let config =
            WebhookConfig::from_lookup(lookup_from(&[("WEBHOOK_VERIFICATION_TOKEN", "secret")]))
                .unwrap();
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
        assert_eq!(config.data_file, PathBuf::from(DEFAULT_DATA_FILE));
        assert_eq!(config.max_donations, 50);
        assert_eq!(config.path, DEFAULT_WEBHOOK_PATH);
    }

    #[test]
    fn missing_or_blank_token_is_an_error() {
        assert!(WebhookConfig::from_lookup(lookup_from(&[])).is_err());
        assert!(
            WebhookConfig::from_lookup(lookup_from(&[("WEBHOOK_VERIFICATION_TOKEN", "  ")]))
                .is_err()
        );
    }

    #[test]
    fn overrides_and_invalid_numbers() {
        let config = WebhookConfig::from_lookup(lookup_from(&[
            ("WEBHOOK_VERIFICATION_TOKEN", "secret"),
            ("WEBHOOK_BIND_ADDR", "0.0.0.0:9000"),
            ("WEBHOOK_DATA_FILE", "/tmp/ledger.json"),
            ("WEBHOOK_MAX_DONATIONS", "0"),
            ("WEBHOOK_PATH", "hooks/kofi"),
        ]))
        .unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:9000");
        assert_eq!(config.data_file, PathBuf::from("/tmp/ledger.json"));
        assert_eq!(config.max_donations, DEFAULT_MAX_DONATIONS);
        assert_eq!(config.path, "/hooks/kofi");
    }
}
