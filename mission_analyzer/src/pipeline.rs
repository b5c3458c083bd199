//! End-to-end analysis of one mission level.
//!
//! [`analyze`] is the pure core: main script lines and AI scripts in, linked
//! record and report text out. [`analyze_level`] wraps it with the file
//! system work of a real run.

use std::path::PathBuf;

use anyhow::{Context, Result};
use log::info;
use mission_data::MissionRecord;

use crate::builder::{BuildSummary, build_patrol_paths};
use crate::config::AnalyzerConfig;
use crate::data_paths::{MissionPaths, data_root};
use crate::io::{read_lines, write_json, write_text};
use crate::linker::{AiLinker, LinkError, LinkPolicy, LinkSummary};
use crate::lookup::{GraphAreas, ModelTable, load_graph_areas, load_model_table};
use crate::report::render_report;
use crate::scripts::{DirectoryScripts, ScriptSource};

/// Everything one analysis produces.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub record: MissionRecord,
    pub report: String,
    pub build: BuildSummary,
    pub link: LinkSummary,
}

/// Files written by [`analyze_level`] along with the analysis behind them.
#[derive(Debug, Clone)]
pub struct LevelOutput {
    pub level: u32,
    pub json_path: PathBuf,
    pub report_path: PathBuf,
    pub analysis: Analysis,
}

/// Build, link, and render without touching the file system.
///
/// # Errors
/// Returns [`LinkError`] only under [`LinkPolicy::Reject`].
pub fn analyze<L: AsRef<str>, S: ScriptSource>(
    main_lines: &[L],
    scripts: &S,
    models: &ModelTable,
    graph_areas: &GraphAreas,
    policy: LinkPolicy,
) -> Result<Analysis, LinkError> {
    let (mut record, build) = build_patrol_paths(main_lines, graph_areas);
    let link = AiLinker::new(scripts, graph_areas)
        .with_policy(policy)
        .link(&mut record)?;
    let report = render_report(&record, models);
    Ok(Analysis {
        record,
        report,
        build,
        link,
    })
}

/// Analyze `level` as configured and write its JSON record and report.
///
/// # Errors
/// Returns an error if the level is out of range, a lookup table or the main
/// script cannot be loaded, linking is rejected, or an output cannot be written.
pub fn analyze_level(config: &AnalyzerConfig, level: u32) -> Result<LevelOutput> {
    let root = data_root(config);
    let paths = MissionPaths::for_level(config, &root, level)?;
    info!("analyzing level {level} under '{}'", root.display());

    let models = load_model_table(&paths.models)?;
    let graph_areas = load_graph_areas(&paths.graph_areas)?;
    let main_lines = read_lines(&paths.main_script).context("reading main mission script")?;
    let scripts = DirectoryScripts::scan(&paths.ai_dir, &config.script_extension);

    let analysis = analyze(&main_lines, &scripts, &models, &graph_areas, config.link_policy)
        .with_context(|| format!("linking AI scripts for level {level}"))?;

    write_json(&paths.json_out, &analysis.record)?;
    info!("patrol path record written to '{}'", paths.json_out.display());
    write_text(&paths.report_out, &analysis.report)?;
    info!("report written to '{}'", paths.report_out.display());

    Ok(LevelOutput {
        level,
        json_path: paths.json_out,
        report_path: paths.report_out,
        analysis,
    })
}
