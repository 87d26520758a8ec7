use crate::errors::ConfigError;
use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Which sections the combined dashboard view carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewConfig {
    pub show_metrics: bool,
    pub show_chart: bool,
    pub show_table: bool,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            show_metrics: true,
            show_chart: true,
            show_table: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub venue_url: String,
    pub summary_interval: Duration,
    /// `None` means a dropped connection is not retried.
    pub reconnect_delay: Option<Duration>,
    pub history_capacity: usize,
    pub event_log_capacity: usize,
    pub api_port: u16,
    pub log_format: LogFormat,
    pub view: ViewConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup, so tests don't have to touch
    /// the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let venue_url = lookup("VENUE_URL")
            .map(|s| s.trim().to_string())
            .unwrap_or_else(|| "ws://localhost:8080".to_string());

        if !(venue_url.starts_with("ws://") || venue_url.starts_with("wss://")) {
            return Err(ConfigError::Invalid {
                key: "VENUE_URL",
                value: venue_url,
                reason: "must be a ws:// or wss:// URL",
            });
        }

        let summary_interval_ms: u64 = parse(&lookup, "SUMMARY_INTERVAL_MS", 100)?;
        if summary_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                key: "SUMMARY_INTERVAL_MS",
                value: summary_interval_ms.to_string(),
                reason: "must be greater than zero",
            });
        }

        let reconnect_delay_ms: u64 = parse(&lookup, "RECONNECT_DELAY_MS", 3000)?;
        let reconnect_delay =
            (reconnect_delay_ms > 0).then(|| Duration::from_millis(reconnect_delay_ms));

        let history_capacity = positive(&lookup, "MID_HISTORY_CAPACITY", 3600)?;
        let event_log_capacity = positive(&lookup, "EVENT_LOG_CAPACITY", 500)?;
        let api_port: u16 = parse(&lookup, "API_PORT", 3000)?;

        let log_format = match lookup("LOG_FORMAT").map(|s| s.trim().to_lowercase()) {
            None => LogFormat::Text,
            Some(s) if s == "text" => LogFormat::Text,
            Some(s) if s == "json" => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "LOG_FORMAT",
                    value: other,
                    reason: "expected text or json",
                });
            }
        };

        let view = ViewConfig {
            show_metrics: flag(&lookup, "SHOW_METRICS", true)?,
            show_chart: flag(&lookup, "SHOW_CHART", true)?,
            show_table: flag(&lookup, "SHOW_TABLE", true)?,
        };

        Ok(Self {
            venue_url,
            summary_interval: Duration::from_millis(summary_interval_ms),
            reconnect_delay,
            history_capacity,
            event_log_capacity,
            api_port,
            log_format,
            view,
        })
    }
}

fn parse<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse::<T>().map_err(|_| ConfigError::Invalid {
            key,
            value: raw,
            reason: "not a valid number",
        }),
    }
}

fn positive<F>(lookup: &F, key: &'static str, default: usize) -> Result<usize, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let value: usize = parse(lookup, key, default)?;
    if value == 0 {
        return Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
            reason: "must be greater than zero",
        });
    }
    Ok(value)
}

fn flag<F>(lookup: &F, key: &'static str, default: bool) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).map(|s| s.trim().to_lowercase()) {
        None => Ok(default),
        Some(s) => match s.as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::Invalid {
                key,
                value: s.clone(),
                reason: "expected true or false",
            }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.venue_url, "ws://localhost:8080");
        assert_eq!(config.summary_interval, Duration::from_millis(100));
        assert_eq!(config.reconnect_delay, Some(Duration::from_secs(3)));
        assert_eq!(config.history_capacity, 3600);
        assert_eq!(config.event_log_capacity, 500);
        assert_eq!(config.api_port, 3000);
        assert_eq!(config.log_format, LogFormat::Text);
        assert_eq!(config.view, ViewConfig::default());
    }

    #[test]
    fn overrides_are_parsed() {
        let config = config_from(&[
            ("VENUE_URL", "wss://venue.example/feed"),
            ("SUMMARY_INTERVAL_MS", "250"),
            ("RECONNECT_DELAY_MS", "0"),
            ("MID_HISTORY_CAPACITY", "10"),
            ("LOG_FORMAT", "JSON"),
            ("SHOW_CHART", "false"),
        ])
        .unwrap();

        assert_eq!(config.venue_url, "wss://venue.example/feed");
        assert_eq!(config.summary_interval, Duration::from_millis(250));
        assert_eq!(config.reconnect_delay, None);
        assert_eq!(config.history_capacity, 10);
        assert_eq!(config.log_format, LogFormat::Json);
        assert!(config.view.show_metrics);
        assert!(!config.view.show_chart);
    }

    #[test]
    fn rejects_zero_interval_and_capacity() {
        assert!(config_from(&[("SUMMARY_INTERVAL_MS", "0")]).is_err());
        assert!(config_from(&[("EVENT_LOG_CAPACITY", "0")]).is_err());
    }

    #[test]
    fn rejects_garbage() {
        assert!(config_from(&[("API_PORT", "70000")]).is_err());
        assert!(config_from(&[("VENUE_URL", "http://localhost")]).is_err());
        assert!(config_from(&[("SHOW_TABLE", "maybe")]).is_err());
        assert!(config_from(&[("LOG_FORMAT", "xml")]).is_err());
    }
}
