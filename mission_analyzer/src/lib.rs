#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]

pub const ANALYZER_VERSION: &str = env!("CARGO_PKG_VERSION");

// Core modules
pub mod builder;
pub mod linker;
pub mod lookup;
pub mod report;
pub mod scripts;
pub mod task_line;

// Run support
pub mod config;
pub mod data_paths;
pub mod icons;
pub mod io;
pub mod logging;
pub mod pipeline;

// Re-exports for convenience
pub use builder::{BuildSummary, PatrolPathBuilder, build_patrol_paths};
pub use config::{AnalyzerConfig, load_config};
pub use linker::{AiLinker, LinkError, LinkPolicy, LinkSummary};
pub use lookup::{GraphAreas, ModelTable};
pub use pipeline::{Analysis, LevelOutput, analyze, analyze_level};
pub use report::render_report;
pub use scripts::{DirectoryScripts, MemoryScripts, ScriptSource};
