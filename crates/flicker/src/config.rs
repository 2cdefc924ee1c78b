//! Flicker Configuration
//!
//! Where fixture traces live, how failures are rendered and what gets
//! logged. Values come from defaults, an optional YAML file and
//! `FLICKER_*` environment variables, in that order.

use crate::result::{FlickerError, FlickerResult};
use crate::subject::FlickerSubjectError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default output directory, readable by host-side tooling
pub const DEFAULT_OUTPUT_DIR: &str = "/sdcard/flicker";

/// Default directory of recorded trace assets
pub const DEFAULT_ASSETS_DIR: &str = "testdata";

/// Default log filter
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Environment variable overriding [`FlickerConfig::output_dir`]
pub const ENV_OUTPUT_DIR: &str = "FLICKER_OUTPUT_DIR";

/// Environment variable overriding [`FlickerConfig::assets_dir`]
pub const ENV_ASSETS_DIR: &str = "FLICKER_ASSETS_DIR";

/// Environment variable overriding [`FlickerConfig::log_filter`]
pub const ENV_LOG_FILTER: &str = "FLICKER_LOG";

/// Configuration for the flicker assertion engine and its fixtures
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlickerConfig {
    /// Directory for traces and run artifacts
    pub output_dir: PathBuf,
    /// Directory of recorded trace assets
    pub assets_dir: PathBuf,
    /// Render the "State" section of failures
    ///
    /// Applies to [`FlickerConfig::render_failure`] only. The `Display` output
    /// of a failure always includes the state dump.
    pub include_state: bool,
    /// `tracing` filter directive
    pub log_filter: String,
}

impl Default for FlickerConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            assets_dir: PathBuf::from(DEFAULT_ASSETS_DIR),
            include_state: true,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl FlickerConfig {
    /// Create a new builder
    #[must_use]
    pub fn builder() -> FlickerConfigBuilder {
        FlickerConfigBuilder::default()
    }

    /// Parse a YAML document; missing keys keep their defaults
    pub fn from_yaml_str(yaml: &str) -> FlickerResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a YAML config file
    pub fn load(path: impl AsRef<Path>) -> FlickerResult<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    /// Apply `FLICKER_*` environment overrides
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from a variable lookup
    #[must_use]
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(dir) = lookup(ENV_OUTPUT_DIR) {
            self.output_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup(ENV_ASSETS_DIR) {
            self.assets_dir = PathBuf::from(dir);
        }
        if let Some(filter) = lookup(ENV_LOG_FILTER) {
            self.log_filter = filter;
        }
        self
    }

    /// Reject empty paths and filters
    pub fn validate(&self) -> FlickerResult<()> {
        if self.output_dir.as_os_str().is_empty() {
            return Err(FlickerError::InvalidConfig {
                message: "output_dir is empty".to_string(),
            });
        }
        if self.assets_dir.as_os_str().is_empty() {
            return Err(FlickerError::InvalidConfig {
                message: "assets_dir is empty".to_string(),
            });
        }
        if self.log_filter.trim().is_empty() {
            return Err(FlickerError::InvalidConfig {
                message: "log_filter is empty".to_string(),
            });
        }
        Ok(())
    }

    /// Render a failure according to this configuration
    #[must_use]
    pub fn render_failure(&self, failure: &FlickerSubjectError) -> String {
        failure.render(self.include_state)
    }

    /// Path of a recorded asset
    #[must_use]
    pub fn asset_path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.assets_dir.join(relative)
    }
}

/// Builder for `FlickerConfig`
#[derive(Debug, Clone, Default)]
pub struct FlickerConfigBuilder {
    config: FlickerConfig,
}

impl FlickerConfigBuilder {
    /// Set output directory
    #[must_use]
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    /// Set assets directory
    #[must_use]
    pub fn assets_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.assets_dir = dir.into();
        self
    }

    /// Enable/disable the "State" section
    #[must_use]
    pub fn include_state(mut self, enabled: bool) -> Self {
        self.config.include_state = enabled;
        self
    }

    /// Set log filter
    #[must_use]
    pub fn log_filter(mut self, filter: impl Into<String>) -> Self {
        self.config.log_filter = filter.into();
        self
    }

    /// Build the configuration
    #[must_use]
    pub fn build(self) -> FlickerConfig {
        self.config
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::timestamp::Timestamp;
    use std::collections::HashMap;

    #[test]
    fn test_default() {
        let config = FlickerConfig::default();
        assert_eq!(config.output_dir, PathBuf::from("/sdcard/flicker"));
        assert_eq!(config.assets_dir, PathBuf::from("testdata"));
        assert!(config.include_state);
        assert_eq!(config.log_filter, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_chain() {
        let config = FlickerConfig::builder()
            .output_dir("/tmp/out")
            .assets_dir("assets")
            .include_state(false)
            .log_filter("flicker=trace")
            .build();
        assert_eq!(config.output_dir, PathBuf::from("/tmp/out"));
        assert_eq!(
            config.asset_path("wm_trace.json"),
            PathBuf::from("assets/wm_trace.json")
        );
        assert!(!config.include_state);
        assert_eq!(config.log_filter, "flicker=trace");
    }

    mod yaml {
        use super::*;

        #[test]
        fn test_partial_yaml_keeps_defaults() {
            let config = FlickerConfig::from_yaml_str("output_dir: /data/flicker\n").unwrap();
            assert_eq!(config.output_dir, PathBuf::from("/data/flicker"));
            assert_eq!(config.log_filter, "info");
        }

        #[test]
        fn test_empty_filter_is_rejected() {
            let err = FlickerConfig::from_yaml_str("log_filter: ''\n").unwrap_err();
            assert!(matches!(err, FlickerError::InvalidConfig { .. }));
        }

        #[test]
        fn test_malformed_yaml() {
            let err = FlickerConfig::from_yaml_str("include_state: [").unwrap_err();
            assert!(matches!(err, FlickerError::Yaml(_)));
        }

        #[test]
        fn test_load_from_file() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("flicker.yaml");
            std::fs::write(&path, "include_state: false\nassets_dir: recorded\n").unwrap();
            let config = FlickerConfig::load(&path).unwrap();
            assert!(!config.include_state);
            assert_eq!(config.assets_dir, PathBuf::from("recorded"));
        }

        #[test]
        fn test_load_missing_file() {
            let err = FlickerConfig::load("/nonexistent/flicker.yaml").unwrap_err();
            assert!(matches!(err, FlickerError::Io(_)));
        }
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> =
            [(ENV_OUTPUT_DIR, "/tmp/flicker"), (ENV_LOG_FILTER, "debug")].into();
        let config = FlickerConfig::default()
            .with_overrides(|key| vars.get(key).map(|v| (*v).to_string()));
        assert_eq!(config.output_dir, PathBuf::from("/tmp/flicker"));
        assert_eq!(config.assets_dir, PathBuf::from("testdata"));
        assert_eq!(config.log_filter, "debug");
    }

    #[test]
    fn test_render_failure_respects_include_state() {
        let failure = FlickerSubjectError::new("x", Timestamp::empty())
            .with_state("dump");
        let hidden = FlickerConfig::builder().include_state(false).build();
        assert!(!hidden.render_failure(&failure).contains("State"));
        let shown = FlickerConfig::default();
        assert!(shown.render_failure(&failure).contains("State"));
    }

    #[test]
    fn test_display_ignores_include_state() {
        let failure = FlickerSubjectError::new("x", Timestamp::empty())
            .with_state("dump");
        let hidden = FlickerConfig::builder().include_state(false).build();
        assert!(!hidden.render_failure(&failure).contains("dump"));
        assert!(failure.to_string().contains("State"));
        assert!(failure.to_string().contains("dump"));
    }
}
