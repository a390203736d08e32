//! Compiler configuration
//!
//! Loaded from YAML; every field has a default so partial files work.
//!
//! ```yaml
//! default_decimals: 2
//! emission_unit_label: t CO2e
//! classification:
//!   rules:
//!     - { prefix: A, bucket: scope1 }
//!     - { prefix: B, bucket: scope2_location }
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::classify::ScopeClassification;
use crate::taxonomy::DEFAULT_ENTRY_POINT;

pub const DEFAULT_DECIMALS: u32 = 3;
pub const DEFAULT_EMISSION_UNIT_LABEL: &str = "t CO2e";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Fraction digits when a request does not override them.
    pub default_decimals: u32,
    /// Unit label a module scalar must carry to count toward emission totals.
    pub emission_unit_label: String,
    pub classification: ScopeClassification,
    /// Schema reference written into `link:schemaRef`.
    pub entry_point: String,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            default_decimals: DEFAULT_DECIMALS,
            emission_unit_label: DEFAULT_EMISSION_UNIT_LABEL.to_string(),
            classification: ScopeClassification::default(),
            entry_point: DEFAULT_ENTRY_POINT.to_string(),
        }
    }
}

impl CompilerConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Load configuration from a YAML file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read compiler config: {:?}", path))?;
        let config = Self::from_yaml_str(&content)
            .with_context(|| format!("Failed to parse compiler config: {:?}", path))?;
        debug!("Loaded compiler config from {:?}", path);
        Ok(config)
    }

    pub fn with_classification(mut self, classification: ScopeClassification) -> Self {
        self.classification = classification;
        self
    }

    pub fn with_default_decimals(mut self, decimals: u32) -> Self {
        self.default_decimals = decimals;
        self
    }
}
