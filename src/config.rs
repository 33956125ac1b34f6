// src/config.rs

use crate::error::{PcaError, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// How the number of principal components is chosen for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ComponentPolicy {
    /// Always keep the same number of components, e.g. 2 for a plane projection.
    Fixed { components: usize },
    /// Ask the user after the table has been validated.
    Prompted,
}

impl Default for ComponentPolicy {
    fn default() -> Self {
        ComponentPolicy::Prompted
    }
}

/// Runtime settings of the analyzer.
///
/// Every field has a default, so a configuration file only needs to name
/// the settings it changes:
///
/// ```
/// use pca_workbench::{AnalyzerConfig, ComponentPolicy};
///
/// let config: AnalyzerConfig =
///     serde_json::from_str(r#"{ "component_policy": { "mode": "fixed", "components": 2 } }"#).unwrap();
/// assert_eq!(config.component_policy, ComponentPolicy::Fixed { components: 2 });
/// assert_eq!(config.min_columns, Some(3));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub component_policy: ComponentPolicy,
    /// Minimum column count enforced by validation. `None` disables the check.
    pub min_columns: Option<usize>,
    /// Decimal places of the scores written to the workbook.
    pub score_decimals: u32,
    /// Decimal places of eigenvalues and loadings in text summaries.
    pub summary_decimals: usize,
    /// Also write `<stem>.plot.json` next to the exported workbook.
    pub export_plot_data: bool,
}

/// Digits an f64 can represent after the decimal point without loss.
pub const MAX_DECIMALS: u32 = 15;

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            component_policy: ComponentPolicy::default(),
            min_columns: Some(3),
            score_decimals: 3,
            summary_decimals: 4,
            export_plot_data: false,
        }
    }
}

impl AnalyzerConfig {
    /// Reads a JSON configuration file.
    ///
    /// # Errors
    /// Returns `PcaError::Config` if the file cannot be read or is not a valid
    /// configuration document.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let config_error = |reason: String| PcaError::Config {
            path: path.display().to_string(),
            reason,
        };
        let text = fs::read_to_string(path).map_err(|e| config_error(e.to_string()))?;
        let config: AnalyzerConfig =
            serde_json::from_str(&text).map_err(|e| config_error(e.to_string()))?;
        if let ComponentPolicy::Fixed { components: 0 } = config.component_policy {
            return Err(config_error("a fixed component count must be at least 1".into()));
        }
        if config.score_decimals > MAX_DECIMALS {
            return Err(config_error(format!(
                "score_decimals is {}, at most {} is supported",
                config.score_decimals, MAX_DECIMALS
            )));
        }
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Reads `path` if it exists, otherwise falls back to the defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::from_json_file(path)
        } else {
            debug!("No configuration file at {}; using defaults", path.display());
            Ok(Self::default())
        }
    }
}
