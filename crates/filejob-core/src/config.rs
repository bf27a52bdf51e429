//! Configuration for the job client

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::processing::PollSchedule;
use crate::types::job::{JobKind, MediaFamily};

/// Main client configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilejobConfig {
    /// Remote processing service
    pub api: ApiConfig,
    /// Progress polling
    pub polling: PollingConfig,
    /// Upload limits enforced before submission
    pub limits: LimitsConfig,
    /// Where downloaded results are saved
    pub output: OutputConfig,
}

impl FilejobConfig {
    /// Load from a TOML file. Missing sections fall back to defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `FILEJOB_*` environment overrides
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(url) = lookup("FILEJOB_API_URL") {
            self.api.base_url = url;
        }
        if let Some(ms) = lookup("FILEJOB_POLL_INTERVAL_MS") {
            self.polling.interval_ms = ms.parse().map_err(|_| {
                Error::config(format!("FILEJOB_POLL_INTERVAL_MS must be an integer, got '{}'", ms))
            })?;
        }
        if let Some(dir) = lookup("FILEJOB_OUTPUT_DIR") {
            self.output.download_dir = PathBuf::from(dir);
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.api.base_url.starts_with("http://") || self.api.base_url.starts_with("https://")) {
            return Err(Error::config(format!(
                "api.base_url must be an http(s) URL, got '{}'",
                self.api.base_url
            )));
        }
        if self.polling.interval_ms == 0 {
            return Err(Error::config("polling.interval_ms must be greater than 0"));
        }
        Ok(())
    }
}

/// Remote service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL; endpoints such as `/image/compress` are appended to it
    pub base_url: String,
    /// Per-request timeout in seconds. Bounds a single HTTP exchange only;
    /// a job itself may run indefinitely.
    pub request_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            request_timeout_secs: 120,
        }
    }
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Polling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Period between progress checks
    pub interval_ms: u64,
    /// Whether ticks follow the wall clock or the previous response
    pub schedule: PollSchedule,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: 1000,
            schedule: PollSchedule::FixedInterval,
        }
    }
}

impl PollingConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// Upload limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Max bytes for image jobs (default: 10MB)
    pub image_max_bytes: u64,
    /// Max bytes per file for PDF jobs (default: 25MB)
    pub pdf_max_bytes: u64,
    /// Highest page number accepted for extraction
    pub max_page: u32,
    /// Upper bound for the compression target size
    pub max_target_size_kb: u32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            image_max_bytes: 10 * 1024 * 1024, // 10MB
            pdf_max_bytes: 25 * 1024 * 1024,   // 25MB
            max_page: 1000,
            max_target_size_kb: 10240,
        }
    }
}

impl LimitsConfig {
    pub fn max_bytes_for(&self, kind: JobKind) -> u64 {
        match kind.family() {
            MediaFamily::Image => self.image_max_bytes,
            MediaFamily::Pdf => self.pdf_max_bytes,
        }
    }
}

/// Download configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub download_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            download_dir: PathBuf::from("."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = FilejobConfig::default();
        assert_eq!(config.polling.interval(), Duration::from_millis(1000));
        assert_eq!(config.polling.schedule, PollSchedule::FixedInterval);
        assert_eq!(config.limits.max_bytes_for(JobKind::ResizeImage), 10 * 1024 * 1024);
        assert_eq!(config.limits.max_bytes_for(JobKind::MergePdf), 25 * 1024 * 1024);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = FilejobConfig::from_toml_str(
            r#"
            [api]
            base_url = "https://files.example.com/api"

            [polling]
            schedule = "after_settle"
            "#,
        )
        .unwrap();
        assert_eq!(config.api.base_url, "https://files.example.com/api");
        assert_eq!(config.api.request_timeout_secs, 120);
        assert_eq!(config.polling.schedule, PollSchedule::AfterSettle);
        assert_eq!(config.polling.interval_ms, 1000);
        assert_eq!(config.limits.max_page, 1000);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(FilejobConfig::from_toml_str("[api]\nbase_url = \"ftp://x\"").is_err());
        assert!(FilejobConfig::from_toml_str("[polling]\ninterval_ms = 0").is_err());
        assert!(FilejobConfig::from_toml_str("[polling\n").is_err());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("FILEJOB_API_URL", "http://10.0.0.5:9000"),
            ("FILEJOB_POLL_INTERVAL_MS", "250"),
            ("FILEJOB_OUTPUT_DIR", "/tmp/out"),
        ]
        .into_iter()
        .collect();

        let config = FilejobConfig::default()
            .with_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.api.base_url, "http://10.0.0.5:9000");
        assert_eq!(config.polling.interval_ms, 250);
        assert_eq!(config.output.download_dir, PathBuf::from("/tmp/out"));

        let bad = FilejobConfig::default()
            .with_overrides(|key| (key == "FILEJOB_POLL_INTERVAL_MS").then(|| "soon".to_string()));
        assert!(bad.is_err());
    }
}
