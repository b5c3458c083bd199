//! Analyzer configuration and loader.
//!
//! Settings come from an optional `analyzer.toml`. Every field has a default
//! matching the stock Project IGI layout, so a missing or broken file simply
//! falls back to those defaults.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::linker::LinkPolicy;

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "analyzer.toml";
/// Placeholder replaced by the level number in path templates.
pub const LEVEL_PLACEHOLDER: &str = "{level}";

/// Complete analyzer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Directory the path templates are relative to; detected when unset.
    pub data_root: Option<PathBuf>,
    /// Main mission script, relative to the data root.
    pub main_script: String,
    /// Directory of per-entity AI scripts, relative to the data root.
    pub ai_dir: String,
    /// Graph area table, relative to the data root.
    pub graph_areas: String,
    /// Soldier model table, relative to the data root.
    pub models: String,
    /// Where the JSON record and the report are written.
    pub output_dir: PathBuf,
    /// Extension of AI script files.
    pub script_extension: String,
    pub min_level: u32,
    pub max_level: u32,
    pub link_policy: LinkPolicy,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            data_root: None,
            main_script: "missions/location0/level{level}/objects.qsc".to_string(),
            ai_dir: "missions/location0/level{level}/ai".to_string(),
            graph_areas: "GraphAreas/graph_area_level{level}.json".to_string(),
            models: "AI-Models.json".to_string(),
            output_dir: PathBuf::from("reports"),
            script_extension: "qsc".to_string(),
            min_level: 1,
            max_level: 14,
            link_policy: LinkPolicy::default(),
        }
    }
}

impl AnalyzerConfig {
    /// Check that `level` lies within the configured range.
    ///
    /// # Errors
    /// Returns an error naming the valid range when it does not.
    pub fn check_level(&self, level: u32) -> Result<()> {
        if level < self.min_level || level > self.max_level {
            bail!(
                "level number must be between {} and {} (got {level})",
                self.min_level,
                self.max_level
            );
        }
        Ok(())
    }
}

/// Expand the `{level}` placeholder of a path template.
pub fn expand_template(template: &str, level: u32) -> String {
    template.replace(LEVEL_PLACEHOLDER, &level.to_string())
}

/// Loads the configuration, falling back to defaults on error.
///
/// This function never fails. A missing file is normal and logged at `info!`;
/// a file that cannot be read or parsed is logged at `warn!`.
pub fn load_config(toml_path: &Path) -> AnalyzerConfig {
    if !toml_path.exists() {
        info!("no config at '{}'; using defaults", toml_path.display());
        return AnalyzerConfig::default();
    }
    match try_load_config(toml_path) {
        Ok(config) => {
            info!("analyzer config loaded from '{}'", toml_path.display());
            config
        },
        Err(e) => {
            warn!(
                "Could not load analyzer config from '{}': {:#}. Using defaults.",
                toml_path.display(),
                e
            );
            AnalyzerConfig::default()
        },
    }
}

/// Attempts to load the configuration from a TOML file.
///
/// # Errors
/// Returns an error if the file cannot be read, parsed, or has an empty level range.
fn try_load_config(toml_path: &Path) -> Result<AnalyzerConfig> {
    let text = fs::read_to_string(toml_path)
        .with_context(|| format!("reading analyzer config from '{}'", toml_path.display()))?;
    let config: AnalyzerConfig = toml::from_str(&text)
        .with_context(|| format!("parsing analyzer config from '{}'", toml_path.display()))?;
    if config.min_level > config.max_level {
        bail!("min_level {} exceeds max_level {}", config.min_level, config.max_level);
    }
    Ok(config)
}
