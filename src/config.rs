// src/config.rs
use std::time::Duration;

use crate::extractors::section::DEFAULT_MAX_HEADING_LEN;
use crate::utils::AppError;

pub const ENV_MAX_CONCURRENCY: &str = "LCP_MAX_CONCURRENCY";
pub const ENV_EXTRACTION_TIMEOUT_SECS: &str = "LCP_EXTRACTION_TIMEOUT_SECS";

const DEFAULT_MAX_CONCURRENCY: usize = 4;
const DEFAULT_EXTRACTION_TIMEOUT_SECS: u64 = 60;

/// Runtime knobs of a comparison run.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Versions fetched and extracted at the same time.
    pub max_concurrency: usize,
    /// Upper bound for fetching plus extracting one version.
    pub extraction_timeout: Duration,
    pub max_heading_len: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            extraction_timeout: Duration::from_secs(DEFAULT_EXTRACTION_TIMEOUT_SECS),
            max_heading_len: DEFAULT_MAX_HEADING_LEN,
        }
    }
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Result<Option<T>, AppError> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| AppError::Config(format!("{} must be a positive number, got '{}'", name, raw))),
        Err(_) => Ok(None),
    }
}

impl EngineConfig {
    /// Defaults overridden by `LCP_MAX_CONCURRENCY` and `LCP_EXTRACTION_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, AppError> {
        let mut config = Self::default();
        if let Some(n) = parse_env::<usize>(ENV_MAX_CONCURRENCY)? {
            tracing::debug!("Using {} from environment: {}", ENV_MAX_CONCURRENCY, n);
            config.max_concurrency = n;
        }
        if let Some(secs) = parse_env::<u64>(ENV_EXTRACTION_TIMEOUT_SECS)? {
            tracing::debug!("Using {} from environment: {}", ENV_EXTRACTION_TIMEOUT_SECS, secs);
            config.extraction_timeout = Duration::from_secs(secs);
        }
        config.validate()
    }

    /// Applies command-line overrides on top of the current values.
    pub fn with_overrides(mut self, concurrency: Option<usize>, timeout_secs: Option<u64>) -> Result<Self, AppError> {
        if let Some(n) = concurrency {
            self.max_concurrency = n;
        }
        if let Some(secs) = timeout_secs {
            self.extraction_timeout = Duration::from_secs(secs);
        }
        self.validate()
    }

    fn validate(self) -> Result<Self, AppError> {
        if self.max_concurrency == 0 {
            return Err(AppError::Config("concurrency must be at least 1".to_string()));
        }
        if self.extraction_timeout.is_zero() {
            return Err(AppError::Config("extraction timeout must be at least 1 second".to_string()));
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_apply_and_validate() {
        let config = EngineConfig::default().with_overrides(Some(8), Some(5)).unwrap();
        assert_eq!(config.max_concurrency, 8);
        assert_eq!(config.extraction_timeout, Duration::from_secs(5));

        assert!(EngineConfig::default().with_overrides(Some(0), None).is_err());
        assert!(EngineConfig::default().with_overrides(None, Some(0)).is_err());
    }

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.max_concurrency, 4);
        assert_eq!(config.extraction_timeout, Duration::from_secs(60));
        assert_eq!(config.max_heading_len, DEFAULT_MAX_HEADING_LEN);
    }
}
