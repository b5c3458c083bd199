#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
//! ** Mission Analyzer **
//! Patrol path and AI report generator for Project IGI mission scripts

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use colored::Colorize;
use log::{error, info};

use mission_analyzer::config::DEFAULT_CONFIG_FILE;
use mission_analyzer::icons::{ICON_SUCCESS, ICON_WARNING};
use mission_analyzer::logging::{DEFAULT_LOG_FILE, init_logging};
use mission_analyzer::{ANALYZER_VERSION, LevelOutput, LinkPolicy, analyze_level, load_config};

#[derive(Parser)]
#[command(author, version, about = "Builds patrol path records and AI reports for a mission level.")]
struct Cli {
    /// Level to analyze; prompted for when omitted.
    #[arg(short, long)]
    level: Option<u32>,
    /// Analyzer config file.
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
    /// Game data directory (overrides the config).
    #[arg(long)]
    data_dir: Option<PathBuf>,
    /// Output directory (overrides the config).
    #[arg(long)]
    out_dir: Option<PathBuf>,
    /// How to settle two AI scripts patrolling the same path (overrides the config).
    #[arg(long, value_enum)]
    policy: Option<LinkPolicy>,
    /// Log file.
    #[arg(long, default_value = DEFAULT_LOG_FILE)]
    log_file: PathBuf,
    /// Log to stderr instead of the log file.
    #[arg(long)]
    log_stderr: bool,
    /// Also print the report to stdout.
    #[arg(long)]
    print: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging((!cli.log_stderr).then_some(cli.log_file.as_path()))?;
    info!("Start: mission analyzer v{ANALYZER_VERSION}");

    let mut config = load_config(&cli.config);
    if let Some(dir) = cli.data_dir {
        config.data_root = Some(dir);
    }
    if let Some(dir) = cli.out_dir {
        config.output_dir = dir;
    }
    if let Some(policy) = cli.policy {
        config.link_policy = policy;
    }

    let level = match cli.level {
        Some(level) => level,
        None => prompt_level()?,
    };

    match analyze_level(&config, level) {
        Ok(output) => {
            print_summary(&output);
            if cli.print {
                println!("\n{}", output.analysis.report);
            }
            info!("Done.");
            Ok(())
        },
        Err(e) => {
            error!("analysis of level {level} failed: {e:#}");
            eprintln!("{} {}", ICON_WARNING.bright_red(), format!("{e:#}").red());
            Err(e)
        },
    }
}

/// Ask for the level number on stdin.
fn prompt_level() -> Result<u32> {
    print!("Enter the game level: ");
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().lock().read_line(&mut input).context("reading level from stdin")?;
    input
        .trim()
        .parse()
        .map_err(|_| anyhow!("'{}' is not a level number", input.trim()))
}

fn print_summary(output: &LevelOutput) {
    let build = &output.analysis.build;
    let link = &output.analysis.link;
    println!(
        "{} {}",
        ICON_SUCCESS.bright_green(),
        format!("Level {} analyzed", output.level).bright_yellow().underline()
    );
    println!(
        "  patrol paths: {} ({} task lines, {} skipped, {} orphaned)",
        output.analysis.record.len().to_string().bold(),
        build.task_lines,
        build.skipped,
        build.orphaned
    );
    println!(
        "  AI links:     {} patrol paths linked ({} AI files scanned)",
        link.linked.to_string().bold(),
        link.files_scanned
    );
    for conflict in &link.conflicts {
        println!(
            "  {} patrol path {} claimed by AI {} and AI {}; kept AI {}",
            ICON_WARNING.yellow(),
            conflict.patrol_id,
            conflict.dropped,
            conflict.kept,
            conflict.kept
        );
    }
    if !link.unreadable_files.is_empty() {
        println!(
            "  {} unreadable AI files: {}",
            ICON_WARNING.yellow(),
            link.unreadable_files.join(", ")
        );
    }
    println!("  record: {}", output.json_path.display().to_string().cyan());
    println!("  report: {}", output.report_path.display().to_string().cyan());
}
