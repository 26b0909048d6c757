use std::env;
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_NOTICE_TTL_SECS: i64 = 5;
/// One day.
const MAX_TIMEOUT_SECS: u64 = 86_400;

/// Client configuration loaded from environment variables.
///
/// | Env Var                     | Default                     |
/// |-----------------------------|-----------------------------|
/// | `TRACKER_API_URL`           | `http://localhost:5000/api` |
/// | `TRACKER_HTTP_TIMEOUT_SECS` | `30`                        |
/// | `TRACKER_NOTICE_TTL_SECS`   | `5`                         |
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_url: String,
    pub request_timeout: Duration,
    pub notice_ttl: chrono::Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.into(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            notice_ttl: chrono::Duration::seconds(DEFAULT_NOTICE_TTL_SECS),
        }
    }
}

impl ClientConfig {
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if a variable is set but cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let api_url = match lookup("TRACKER_API_URL").filter(|raw| !raw.trim().is_empty()) {
            Some(raw) => checked_api_url(&raw)?,
            None => defaults.api_url,
        };

        let request_timeout = match lookup("TRACKER_HTTP_TIMEOUT_SECS") {
            Some(raw) => {
                let secs = parse_positive("TRACKER_HTTP_TIMEOUT_SECS", &raw)?;
                if secs > MAX_TIMEOUT_SECS {
                    return Err(ConfigError::InvalidValue {
                        var: "TRACKER_HTTP_TIMEOUT_SECS",
                        raw,
                    });
                }
                Duration::from_secs(secs)
            }
            None => defaults.request_timeout,
        };

        let notice_ttl = match lookup("TRACKER_NOTICE_TTL_SECS") {
            Some(raw) => {
                let secs = parse_positive("TRACKER_NOTICE_TTL_SECS", &raw)?;
                i64::try_from(secs)
                    .ok()
                    .and_then(chrono::Duration::try_seconds)
                    .ok_or(ConfigError::InvalidValue {
                        var: "TRACKER_NOTICE_TTL_SECS",
                        raw,
                    })?
            }
            None => defaults.notice_ttl,
        };

        Ok(Self {
            api_url,
            request_timeout,
            notice_ttl,
        })
    }

    /// Overrides the backend base URL, e.g. from a command-line flag.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if `api_url` is not an absolute URL.
    pub fn with_api_url(mut self, api_url: &str) -> Result<Self, ConfigError> {
        self.api_url = checked_api_url(api_url)?;
        Ok(self)
    }
}

fn checked_api_url(raw: &str) -> Result<String, ConfigError> {
    let api_url = raw.trim();
    match reqwest::Url::parse(api_url) {
        Ok(url) if !url.cannot_be_a_base() => Ok(api_url.to_owned()),
        _ => Err(ConfigError::InvalidValue {
            var: "TRACKER_API_URL",
            raw: raw.to_owned(),
        }),
    }
}

fn parse_positive(var: &'static str, raw: &str) -> Result<u64, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(ConfigError::InvalidValue {
            var,
            raw: raw.to_owned(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn reads_overrides() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("TRACKER_API_URL", " https://api.example.com/api "),
            ("TRACKER_HTTP_TIMEOUT_SECS", "7"),
            ("TRACKER_NOTICE_TTL_SECS", "2"),
        ]))
        .unwrap();
        assert_eq!(config.api_url, "https://api.example.com/api");
        assert_eq!(config.request_timeout, Duration::from_secs(7));
        assert_eq!(config.notice_ttl, chrono::Duration::seconds(2));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            ClientConfig::from_lookup(lookup(&[("TRACKER_HTTP_TIMEOUT_SECS", "0")])),
            Err(ConfigError::InvalidValue { var: "TRACKER_HTTP_TIMEOUT_SECS", .. })
        ));
        assert!(matches!(
            ClientConfig::from_lookup(lookup(&[("TRACKER_API_URL", "not a url")])),
            Err(ConfigError::InvalidValue { var: "TRACKER_API_URL", .. })
        ));
    }

    #[test]
    fn api_url_override_is_validated() {
        let config = ClientConfig::default()
            .with_api_url(" http://127.0.0.1:9000/api ")
            .unwrap();
        assert_eq!(config.api_url, "http://127.0.0.1:9000/api");
        assert!(matches!(
            ClientConfig::default().with_api_url("localhost/api"),
            Err(ConfigError::InvalidValue { var: "TRACKER_API_URL", .. })
        ));
        assert!(ClientConfig::default().with_api_url("mailto:ops@example.com").is_err());
    }

    #[test]
    fn rejects_out_of_range_durations() {
        assert!(matches!(
            ClientConfig::from_lookup(lookup(&[("TRACKER_NOTICE_TTL_SECS", "9223372036854775807")])),
            Err(ConfigError::InvalidValue { var: "TRACKER_NOTICE_TTL_SECS", .. })
        ));
        assert!(matches!(
            ClientConfig::from_lookup(lookup(&[("TRACKER_HTTP_TIMEOUT_SECS", "18446744073709551615")])),
            Err(ConfigError::InvalidValue { var: "TRACKER_HTTP_TIMEOUT_SECS", .. })
        ));
        let config =
            ClientConfig::from_lookup(lookup(&[("TRACKER_HTTP_TIMEOUT_SECS", "86400")])).unwrap();
        assert_eq!(config.request_timeout, Duration::from_secs(86_400));
    }
}
