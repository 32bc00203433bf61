//! Configuration for the collaborative filter
//!
//! Settings are layered with the `config` crate:
//! 1. Built-in defaults (the policy constants of the algorithm)
//! 2. Optional TOML file passed on the command line
//! 3. `COFILTER_*` environment variables (e.g. `COFILTER_MAX_SAMPLE=12`)

use crate::error::{CofilterError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Two users must share at least this many rated items to be compared
pub const MIN_COMMON: usize = 2;

/// Default number of neighbors aggregated into a prediction
pub const MAX_SAMPLE: usize = 8;

/// Default minimum Pearson coefficient for a neighbor to count as similar
pub const MIN_PCC_THRESHOLD: f64 = 0.2;

/// Environment variable prefix for configuration overrides
const ENV_PREFIX: &str = "COFILTER";

/// Tunables of neighbor selection and batch execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilteringConfig {
    /// Upper bound on the neighbor limit
    pub max_sample: usize,
    /// Minimum co-rated items; values below `MIN_COMMON` are rejected
    pub min_common: usize,
    /// Coefficients below this are treated as noise
    pub min_pcc_threshold: f64,
    /// Drop neighbors with a negative coefficient
    pub reject_negative: bool,
    /// Keep user histories in a per-run cache instead of re-querying
    pub cache_histories: bool,
    /// Predictions in flight during a batch run
    pub concurrency: usize,
}

impl Default for FilteringConfig {
    fn default() -> Self {
        Self {
            max_sample: MAX_SAMPLE,
            min_common: MIN_COMMON,
            min_pcc_threshold: MIN_PCC_THRESHOLD,
            reject_negative: true,
            cache_histories: false,
            concurrency: 4,
        }
    }
}

impl FilteringConfig {
    /// Load configuration from defaults, an optional file and the environment
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let defaults = Self::default();

        let mut builder = config::Config::builder()
            .set_default("max_sample", defaults.max_sample as i64)?
            .set_default("min_common", defaults.min_common as i64)?
            .set_default("min_pcc_threshold", defaults.min_pcc_threshold)?
            .set_default("reject_negative", defaults.reject_negative)?
            .set_default("cache_histories", defaults.cache_histories)?
            .set_default("concurrency", defaults.concurrency as i64)?;

        if let Some(path) = file {
            debug!("Loading configuration file: {}", path.display());
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let settings: Self = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        debug!("Effective configuration: {:?}", settings);
        Ok(settings)
    }

    /// Reject settings the algorithm cannot honor
    pub fn validate(&self) -> Result<()> {
        if self.max_sample == 0 {
            return Err(CofilterError::InvalidConfig(
                "max_sample must be at least 1".to_string(),
            ));
        }
        if self.min_common < MIN_COMMON {
            return Err(CofilterError::InvalidConfig(format!(
                "min_common must be at least {}",
                MIN_COMMON
            )));
        }
        if !(-1.0..=1.0).contains(&self.min_pcc_threshold) {
            return Err(CofilterError::InvalidConfig(format!(
                "min_pcc_threshold {} outside [-1, 1]",
                self.min_pcc_threshold
            )));
        }
        if self.concurrency == 0 {
            return Err(CofilterError::InvalidConfig(
                "concurrency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Get the default database path using XDG_DATA_HOME standard
pub fn default_db_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cofilter")
        .join("ratings.db")
}

/// Get the database path from CLI arg, env var, or default
pub fn resolve_db_path(cli_path: Option<String>) -> String {
    cli_path
        .or_else(|| std::env::var("COFILTER_DB_PATH").ok())
        .filter(|path| !path.is_empty())
        .unwrap_or_else(|| default_db_path().to_string_lossy().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;
    use std::io::Write;

    #[test]
    fn test_defaults_match_algorithm_constants() {
        let config = FilteringConfig::default();
        assert_eq!(config.max_sample, 8);
        assert_eq!(config.min_common, 2);
        assert!((config.min_pcc_threshold - 0.2).abs() < f64::EPSILON);
        assert!(config.reject_negative);
        assert!(!config.cache_histories);
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_load_without_sources_uses_defaults() {
        env::remove_var("COFILTER_MAX_SAMPLE");
        let config = FilteringConfig::load(None).unwrap();
        assert_eq!(config, FilteringConfig::default());
    }

    #[test]
    #[serial]
    fn test_file_and_env_override_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "max_sample = 3\nreject_negative = false\nmin_pcc_threshold = 0.5").unwrap();

        env::set_var("COFILTER_MAX_SAMPLE", "5");
        let config = FilteringConfig::load(Some(file.path()));
        env::remove_var("COFILTER_MAX_SAMPLE");

        let config = config.unwrap();
        // Environment wins over the file
        assert_eq!(config.max_sample, 5);
        assert!(!config.reject_negative);
        assert!((config.min_pcc_threshold - 0.5).abs() < f64::EPSILON);
        assert_eq!(config.min_common, MIN_COMMON);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let config = FilteringConfig {
            max_sample: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(CofilterError::InvalidConfig(_))));

        let config = FilteringConfig {
            min_common: 1,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = FilteringConfig {
            min_pcc_threshold: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    #[serial]
    fn test_resolve_db_path_precedence() {
        env::set_var("COFILTER_DB_PATH", "/tmp/from-env.db");
        assert_eq!(resolve_db_path(Some("cli.db".to_string())), "cli.db");
        assert_eq!(resolve_db_path(None), "/tmp/from-env.db");
        env::remove_var("COFILTER_DB_PATH");
        assert!(resolve_db_path(None).ends_with("ratings.db"));
    }
}
