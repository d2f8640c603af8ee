use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::retry::RetryPolicy;

/// Retry policy parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per operation (including the first).
    pub max_attempts: u32,
    /// Base delay in seconds that backoff scales up from (e.g. 0.5 = 500ms).
    pub base_delay_secs: f64,
    /// Maximum delay in seconds between attempts.
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_secs: 0.5,
            max_delay_secs: 60,
        }
    }
}

impl RetryConfig {
    /// Convert to the policy the retry engine consumes. A zero attempt
    /// budget is bumped to one; a negative delay is clamped to zero.
    pub fn to_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts.max(1),
            base_delay: Duration::from_secs_f64(self.base_delay_secs.max(0.0)),
            max_delay: Duration::from_secs(self.max_delay_secs),
        }
    }
}

/// Success-rate thresholds for the stability scenario (optional section).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StabilityConfig {
    /// Success rate in percent at or above which an operation is stable.
    pub stable_threshold: f64,
    /// Success rate in percent below which the scenario fails.
    pub acceptable_threshold: f64,
}

impl Default for StabilityConfig {
    fn default() -> Self {
        Self {
            stable_threshold: 95.0,
            acceptable_threshold: 80.0,
        }
    }
}

/// Global configuration loaded from `~/.config/petprobe/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// Base URL of the Pet Store deployment under test.
    pub base_url: String,
    /// Value sent in the `api_key` header.
    pub api_key: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
    /// Optional stability thresholds; if missing, built-in defaults are used.
    #[serde(default)]
    pub stability: Option<StabilityConfig>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            base_url: "https://petstore.swagger.io/v2".to_string(),
            api_key: "special-key".to_string(),
            timeout_secs: 30,
            connect_timeout_secs: 10,
            retry: None,
            stability: None,
        }
    }
}

impl HarnessConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry.clone().unwrap_or_default().to_policy()
    }

    pub fn stability_thresholds(&self) -> StabilityConfig {
        self.stability.clone().unwrap_or_default()
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("petprobe")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<HarnessConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = HarnessConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: HarnessConfig = toml::from_str(&data)?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = HarnessConfig::default();
        assert_eq!(cfg.base_url, "https://petstore.swagger.io/v2");
        assert_eq!(cfg.api_key, "special-key");
        assert_eq!(cfg.timeout_secs, 30);
        assert_eq!(cfg.connect_timeout_secs, 10);
        assert!(cfg.retry.is_none());
        assert!(cfg.stability.is_none());
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = HarnessConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: HarnessConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.base_url, cfg.base_url);
        assert_eq!(parsed.api_key, cfg.api_key);
        assert_eq!(parsed.timeout_secs, cfg.timeout_secs);
    }

    #[test]
    fn config_toml_custom_values() {
        let toml = r#"
            base_url = "http://127.0.0.1:8080/v2"
            api_key = "test-key"
            timeout_secs = 5
            connect_timeout_secs = 2
        "#;
        let cfg: HarnessConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.base_url, "http://127.0.0.1:8080/v2");
        assert_eq!(cfg.api_key, "test-key");
        assert_eq!(cfg.timeout_secs, 5);
        assert!(cfg.retry.is_none());
        assert!(cfg.stability.is_none());
    }

    #[test]
    fn config_toml_retry_and_stability_sections() {
        let toml = r#"
            base_url = "http://127.0.0.1:8080/v2"
            api_key = "test-key"
            timeout_secs = 5
            connect_timeout_secs = 2

            [retry]
            max_attempts = 5
            base_delay_secs = 0.1
            max_delay_secs = 15

            [stability]
            stable_threshold = 99.0
            acceptable_threshold = 90.0
        "#;
        let cfg: HarnessConfig = toml::from_str(toml).unwrap();
        let retry = cfg.retry.as_ref().unwrap();
        assert_eq!(retry.max_attempts, 5);
        assert!((retry.base_delay_secs - 0.1).abs() < 1e-9);
        assert_eq!(retry.max_delay_secs, 15);
        let stability = cfg.stability.as_ref().unwrap();
        assert!((stability.stable_threshold - 99.0).abs() < 1e-9);
        assert!((stability.acceptable_threshold - 90.0).abs() < 1e-9);
    }

    #[test]
    fn to_policy_clamps_degenerate_values() {
        let cfg = RetryConfig {
            max_attempts: 0,
            base_delay_secs: -1.0,
            max_delay_secs: 10,
        };
        let policy = cfg.to_policy();
        assert_eq!(policy.max_attempts, 1);
        assert_eq!(policy.base_delay, Duration::ZERO);
    }

    #[test]
    fn retry_policy_defaults_when_section_missing() {
        let cfg = HarnessConfig::default();
        let policy = cfg.retry_policy();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.base_delay, Duration::from_millis(500));
        assert_eq!(policy.max_delay, Duration::from_secs(60));
    }
}
