use std::{env, time::Duration};

use anyhow::Context;
use tracing::debug;

// ipleak.net JSON endpoint, the address is appended as the last path segment
pub const IPLEAK_ENDPOINT: &str = "https://ipv4.ipleak.net/json";

/// Desktop browser fingerprint sent with every provider request.
pub const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/94.0.4606.61 Safari/537.36";

pub const DEFAULT_TIMEOUT_MS: u64 = 3000;

/// Additional attempts after the first one, only for transport failures.
pub const DEFAULT_RETRIES: usize = 1;

/// Upper bound accepted for `ProviderConfig::retries`.
pub const MAX_RETRIES: usize = 10;

const ENDPOINT_VAR: &str = "IPLEAK_ENDPOINT";
const TIMEOUT_VAR: &str = "IPLEAK_TIMEOUT_MS";
const RETRIES_VAR: &str = "IPLEAK_RETRIES";

/// Settings for a single geolocation provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    /// Base URL without a trailing slash
    pub endpoint: String,
    pub user_agent: String,
    /// Timeout applied to each attempt separately
    pub timeout: Duration,
    pub retries: usize,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            endpoint: IPLEAK_ENDPOINT.to_string(),
            user_agent: USER_AGENT.to_string(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            retries: DEFAULT_RETRIES,
        }
    }
}

impl ProviderConfig {
    /// Builds the default configuration and applies overrides from
    /// `IPLEAK_ENDPOINT`, `IPLEAK_TIMEOUT_MS` and `IPLEAK_RETRIES`.
    ///
    /// Unset variables keep their defaults, malformed numbers are an error.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut config = Self::default();

        if let Some(endpoint) = lookup(ENDPOINT_VAR) {
            let endpoint = endpoint.trim().trim_end_matches('/');
            if endpoint.is_empty() {
                anyhow::bail!("{} is set but empty", ENDPOINT_VAR);
            }
            config.endpoint = endpoint.to_string();
        }

        if let Some(timeout) = lookup(TIMEOUT_VAR) {
            let millis: u64 = timeout
                .trim()
                .parse()
                .with_context(|| format!("{} must be a number of milliseconds", TIMEOUT_VAR))?;
            config.timeout = Duration::from_millis(millis);
        }

        if let Some(retries) = lookup(RETRIES_VAR) {
            config.retries = retries
                .trim()
                .parse()
                .with_context(|| format!("{} must be a non-negative integer", RETRIES_VAR))?;
        }

        debug!("Provider configuration: {:?}", config);
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_match_provider_contract() {
        let config = ProviderConfig::default();
        assert_eq!(config.endpoint, "https://ipv4.ipleak.net/json");
        assert_eq!(config.timeout, Duration::from_millis(3000));
        assert_eq!(config.retries, 1);
        assert!(config.user_agent.starts_with("Mozilla/5.0 (Macintosh;"));
    }

    #[test]
    fn unset_variables_keep_defaults() {
        let env = vars(&[]);
        let config = ProviderConfig::from_lookup(|k| env.get(k).cloned()).unwrap();
        assert_eq!(config, ProviderConfig::default());
    }

    #[test]
    fn overrides_are_applied() {
        let env = vars(&[
            ("IPLEAK_ENDPOINT", "http://127.0.0.1:8080/json/"),
            ("IPLEAK_TIMEOUT_MS", "250"),
            ("IPLEAK_RETRIES", "0"),
        ]);
        let config = ProviderConfig::from_lookup(|k| env.get(k).cloned()).unwrap();
        assert_eq!(config.endpoint, "http://127.0.0.1:8080/json");
        assert_eq!(config.timeout, Duration::from_millis(250));
        assert_eq!(config.retries, 0);
    }

    #[test]
    fn malformed_numbers_are_rejected() {
        let env = vars(&[("IPLEAK_TIMEOUT_MS", "soon")]);
        let err = ProviderConfig::from_lookup(|k| env.get(k).cloned()).unwrap_err();
        assert!(err.to_string().contains("IPLEAK_TIMEOUT_MS"));

        let env = vars(&[("IPLEAK_RETRIES", "-1")]);
        assert!(ProviderConfig::from_lookup(|k| env.get(k).cloned()).is_err());
    }

    #[test]
    fn empty_endpoint_is_rejected() {
        let env = vars(&[("IPLEAK_ENDPOINT", " / ")]);
        assert!(ProviderConfig::from_lookup(|k| env.get(k).cloned()).is_err());
    }
}
