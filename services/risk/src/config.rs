use anyhow::{anyhow, Context};
use shared::types::RiskWeight;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Where the trip service lives, if anywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TripEndpoint {
    Unconfigured,
    Configured(String),
}

impl TripEndpoint {
    /// Blank values count as unset.
    pub fn from_value(value: Option<String>) -> Self {
        match value.map(|v| v.trim().trim_end_matches('/').to_string()) {
            Some(url) if !url.is_empty() => TripEndpoint::Configured(url),
            _ => TripEndpoint::Unconfigured,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub trip_endpoint: TripEndpoint,
    pub trip_timeout: Option<Duration>,
    pub port: u16,
    pub low_weight: RiskWeight,
    pub high_weight: RiskWeight,
    pub hotspots_file: Option<PathBuf>,
    pub grid_resolution: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            trip_endpoint: TripEndpoint::Unconfigured,
            trip_timeout: Some(Duration::from_secs(30)),
            port: 8080,
            low_weight: RiskWeight::LOW,
            high_weight: RiskWeight::HIGH,
            hotspots_file: None,
            grid_resolution: 24,
        }
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid {} value: {:?}", key, raw)),
        _ => Ok(default),
    }
}

fn parse_weight(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: RiskWeight) -> anyhow::Result<RiskWeight> {
    let value: f64 = parse_var(lookup, key, default.value())?;
    if !value.is_finite() || value < 0.0 {
        return Err(anyhow!("{} must be a non-negative number, got {}", key, value));
    }
    Ok(RiskWeight(value))
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = Config::default();

        let timeout_secs: u64 = parse_var(&lookup, "TRIP_SERVICE_TIMEOUT_SECS", 30)?;
        let grid_resolution: usize = parse_var(&lookup, "GRID_RESOLUTION", defaults.grid_resolution)?;
        if grid_resolution < 2 {
            return Err(anyhow!("GRID_RESOLUTION must be at least 2, got {}", grid_resolution));
        }

        Ok(Config {
            trip_endpoint: TripEndpoint::from_value(lookup("TRIP_SERVICE_URL")),
            // 0 disables the timeout
            trip_timeout: (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs)),
            port: parse_var(&lookup, "PORT", defaults.port)?,
            low_weight: parse_weight(&lookup, "RISK_WEIGHT_LOW", defaults.low_weight)?,
            high_weight: parse_weight(&lookup, "RISK_WEIGHT_HIGH", defaults.high_weight)?,
            hotspots_file: lookup("RISK_HOTSPOTS_FILE")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            grid_resolution,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_set() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.trip_endpoint, TripEndpoint::Unconfigured);
        assert_eq!(config.port, 8080);
        assert_eq!(config.low_weight, RiskWeight::LOW);
        assert_eq!(config.high_weight, RiskWeight::HIGH);
        assert_eq!(config.trip_timeout, Some(Duration::from_secs(30)));
        assert!(config.hotspots_file.is_none());
    }

    #[test]
    fn test_trip_url_trimmed() {
        let config = Config::from_lookup(lookup_from(&[("TRIP_SERVICE_URL", " http://trips:4000/ ")])).unwrap();
        assert_eq!(
            config.trip_endpoint,
            TripEndpoint::Configured("http://trips:4000".to_string())
        );
    }

    #[test]
    fn test_blank_trip_url_is_unconfigured() {
        assert_eq!(TripEndpoint::from_value(Some("   ".to_string())), TripEndpoint::Unconfigured);
        assert_eq!(TripEndpoint::from_value(None), TripEndpoint::Unconfigured);
    }

    #[test]
    fn test_invalid_port_is_an_error_not_a_panic() {
        let result = Config::from_lookup(lookup_from(&[("PORT", "eighty")]));
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("PORT"));
    }

    #[test]
    fn test_negative_weight_rejected() {
        assert!(Config::from_lookup(lookup_from(&[("RISK_WEIGHT_HIGH", "-1")])).is_err());
    }

    #[test]
    fn test_zero_timeout_disables_it() {
        let config = Config::from_lookup(lookup_from(&[("TRIP_SERVICE_TIMEOUT_SECS", "0")])).unwrap();
        assert_eq!(config.trip_timeout, None);
    }

    #[test]
    fn test_grid_resolution_lower_bound() {
        assert!(Config::from_lookup(lookup_from(&[("GRID_RESOLUTION", "1")])).is_err());
        let config = Config::from_lookup(lookup_from(&[("GRID_RESOLUTION", "10")])).unwrap();
        assert_eq!(config.grid_resolution, 10);
    }
}
