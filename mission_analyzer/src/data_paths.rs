use std::env;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::Result;

use crate::config::{AnalyzerConfig, expand_template};

/// Cached data root used when the configuration does not name one.
static DETECTED_DATA_ROOT: LazyLock<PathBuf> = LazyLock::new(detect_data_root);

/// Every file a single level run reads or writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissionPaths {
    pub level: u32,
    pub main_script: PathBuf,
    pub ai_dir: PathBuf,
    pub graph_areas: PathBuf,
    pub models: PathBuf,
    pub json_out: PathBuf,
    pub report_out: PathBuf,
}

impl MissionPaths {
    /// Resolve the paths for `level` under `data_root`.
    ///
    /// # Errors
    /// Returns an error if `level` is outside the configured range.
    pub fn for_level(config: &AnalyzerConfig, data_root: &Path, level: u32) -> Result<Self> {
        config.check_level(level)?;
        let resolve = |template: &str| data_root.join(expand_template(template, level));
        Ok(Self {
            level,
            main_script: resolve(&config.main_script),
            ai_dir: resolve(&config.ai_dir),
            graph_areas: resolve(&config.graph_areas),
            models: resolve(&config.models),
            json_out: config.output_dir.join(format!("level{level}_ai_mission.json")),
            report_out: config.output_dir.join(format!("level{level}_ai_mission_report.txt")),
        })
    }
}

/// The configured data root, or the detected one.
pub fn data_root(config: &AnalyzerConfig) -> PathBuf {
    config
        .data_root
        .clone()
        .unwrap_or_else(|| DETECTED_DATA_ROOT.clone())
}

/// Resolve the most likely location of the game data directory.
///
/// A candidate qualifies when it contains a `missions` directory.
fn detect_data_root() -> PathBuf {
    let mut candidates = vec![PathBuf::from("."), PathBuf::from("data")];

    if let Ok(exe_path) = env::current_exe()
        && let Some(dir) = exe_path.parent()
    {
        candidates.push(dir.to_path_buf());
        candidates.push(dir.join("data"));

        if let Some(parent) = dir.parent() {
            candidates.push(parent.to_path_buf());
            candidates.push(parent.join("data"));
        }
    }

    candidates
        .into_iter()
        .find(|candidate| candidate.join("missions").is_dir())
        .unwrap_or_else(|| PathBuf::from("."))
}
