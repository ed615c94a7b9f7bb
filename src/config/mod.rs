//! Configuration for funcloc
//!
//! Loads display settings from `funcloc.toml` in the project root, falling
//! back to `~/.config/funcloc/config.toml`. The language server also accepts
//! the same structure as JSON `initializationOptions`.
//!
//! # Configuration Format
//!
//! ```toml
//! # funcloc.toml
//!
//! [display]
//! labels = true
//! highlight = true
//! label_format = "{loc} LOC"
//!
//! [colors]
//! low = "#4caf50"
//! medium = "#ff9800"
//! high = "#f44336"
//! ```
//!
//! Tier thresholds and the debounce window are fixed and cannot be changed
//! here.

use crate::error::{FuncLocError, Result};
use crate::models::Category;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Project config file name
pub const CONFIG_FILE_NAME: &str = "funcloc.toml";

/// Placeholder replaced by the measured LOC in label formats.
pub const LOC_PLACEHOLDER: &str = "{loc}";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub display: DisplayConfig,
    pub colors: ColorConfig,
}

/// What the rendering sink receives
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Inline LOC labels after each signature
    pub labels: bool,
    /// Whole-function background highlights
    pub highlight: bool,
    /// Label template, `{loc}` is replaced with the count
    pub label_format: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            labels: true,
            highlight: true,
            label_format: format!("{} LOC", LOC_PLACEHOLDER),
        }
    }
}

/// Label color per category, any CSS color string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ColorConfig {
    pub low: String,
    pub medium: String,
    pub high: String,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            low: "#4caf50".to_string(),
            medium: "#ff9800".to_string(),
            high: "#f44336".to_string(),
        }
    }
}

impl ColorConfig {
    pub fn for_category(&self, category: Category) -> &str {
        match category {
            Category::Low => &self.low,
            Category::Medium => &self.medium,
            Category::High => &self.high,
        }
    }
}

impl Config {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()
    }

    /// Parse LSP `initializationOptions`. `null` means defaults.
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        if value.is_null() {
            return Ok(Self::default());
        }
        let config: Config = serde_json::from_value(value)?;
        config.validate()
    }

    fn validate(self) -> Result<Self> {
        if !self.display.label_format.contains(LOC_PLACEHOLDER) {
            return Err(FuncLocError::Config(format!(
                "display.label_format must contain {}",
                LOC_PLACEHOLDER
            )));
        }
        Ok(self)
    }

    /// Render the inline label for a LOC value.
    pub fn label(&self, loc: u32) -> String {
        self.display
            .label_format
            .replace(LOC_PLACEHOLDER, &loc.to_string())
    }

    /// Get the user config file path
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("funcloc").join("config.toml"))
    }
}

/// Load configuration for a project root.
///
/// Invalid files are logged and skipped; the result is always usable.
pub fn load_config(project_root: &Path) -> Config {
    let candidates = std::iter::once(project_root.join(CONFIG_FILE_NAME))
        .chain(Config::user_config_path());

    for path in candidates {
        if !path.exists() {
            continue;
        }
        match load_toml_config(&path) {
            Ok(config) => {
                debug!("Loaded config from {}", path.display());
                return config;
            }
            Err(e) => {
                warn!("Failed to load {}: {}", path.display(), e);
            }
        }
    }

    Config::default()
}

fn load_toml_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)?;
    Config::from_toml_str(&content)
}

/// Example config written by `funcloc init`
pub const EXAMPLE_CONFIG: &str = r##"# funcloc configuration
#
# Tier thresholds are fixed: up to 35 LOC is low, 36-60 medium, above 60 high.

[display]
# Inline "N LOC" label after each function signature
labels = true
# Background highlight of each function by tier
highlight = true
# Label text, {loc} is replaced with the measured count
label_format = "{loc} LOC"

[colors]
low = "#4caf50"
medium = "#ff9800"
high = "#f44336"
"##;
