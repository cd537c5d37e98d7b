//! Configuration for the aggregation engine
//!
//! Defaults reproduce the dashboard's standard behavior. A TOML file can
//! override any subset of fields.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::numeric::Z_95;

/// Errors raised while loading or validating an [`EngineConfig`]
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("confidence_z must be finite and positive, got {0}")]
    InvalidConfidenceZ(f64),

    #[error("precision_top_n must be at least 1")]
    EmptyPrecisionRanking,

    #[error("control_marker must not be empty")]
    EmptyControlMarker,

    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Tunables for [`crate::aggregate::derive_views`]
///
/// # Example
/// ```
/// use cartlab::config::EngineConfig;
///
/// let config = EngineConfig::default();
/// assert_eq!(config.confidence_z, 1.96); // 95% normal approximation
/// assert_eq!(config.precision_top_n, 10);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Normal multiplier for per-condition confidence intervals
    ///
    /// Default: 1.96 (two-sided 95%). No small-sample t correction is applied.
    pub confidence_z: f64,

    /// Number of submissions kept in the precision ranking
    ///
    /// Default: 10
    pub precision_top_n: usize,

    /// Substring identifying the control condition (case-insensitive)
    ///
    /// Default: "control"
    pub control_marker: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            confidence_z: Z_95,
            precision_top_n: 10,
            control_marker: "control".to_string(),
        }
    }
}

impl EngineConfig {
    /// Parse a TOML document; missing fields take their defaults
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a TOML config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.confidence_z.is_finite() || self.confidence_z <= 0.0 {
            return Err(ConfigError::InvalidConfidenceZ(self.confidence_z));
        }

        if self.precision_top_n == 0 {
            return Err(ConfigError::EmptyPrecisionRanking);
        }

        if self.control_marker.trim().is_empty() {
            return Err(ConfigError::EmptyControlMarker);
        }

        Ok(())
    }

    /// Whether `label` names the control condition
    pub fn is_control_label(&self, label: &str) -> bool {
        label
            .to_lowercase()
            .contains(&self.control_marker.to_lowercase())
    }
}
