//! Report generation.
//!
//! Two artifacts come out of a linked [`MissionRecord`]: the record itself as
//! JSON, and a narrative text report covering every patrol path that has an
//! AI attached. Paths without AI stay in the JSON but are left out of the
//! narrative.

use std::fmt::Write as _;

use anyhow::Result;
use log::{debug, warn};
use mission_data::{Command, MissionRecord, PatrolPath, ResolvedAi};

use crate::icons::{ICON_ANIMATION, ICON_CROUCH, ICON_DELAY, ICON_END, ICON_LOOK, ICON_QUIT, ICON_RUN, ICON_WALK};
use crate::io::to_pretty_json;
use crate::lookup::ModelTable;

pub const REPORT_TITLE: &str = "Mission AI Activity Report";
pub const SUMMARY_HEADING: &str = "       Soldier Activity Summary\n---------------------------------\n";
pub const NOT_SPECIFIED: &str = "Not Specified";
pub const UNKNOWN_COMMAND: &str = "Unknown";
pub const UNKNOWN_ACTION: &str = "Unknown action";

/// Human label for each `PatrolPathCommand` action id.
const COMMAND_MEANINGS: [(&str, &str); 9] = [
    ("0", "Animation"),
    ("1", "Delay"),
    ("2", "Walk to"),
    ("3", "Run to"),
    ("4", "Crouch"),
    ("5", "Look at node"),
    ("6", "End"),
    ("7", "Quit"),
    ("8", "Set speed"),
];

/// A keyword found in command notes and how the activity summary phrases it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionGloss {
    pub keyword: &'static str,
    pub phrase: &'static str,
    pub icon: &'static str,
}

// first match in table order wins
static ACTION_GLOSSES: [ActionGloss; 8] = [
    ActionGloss {
        keyword: "walks to",
        phrase: "Soldier is walking.",
        icon: ICON_WALK,
    },
    ActionGloss {
        keyword: "runs to",
        phrase: "Soldier is running.",
        icon: ICON_RUN,
    },
    ActionGloss {
        keyword: "looks at",
        phrase: "Soldier is looking at a node.",
        icon: ICON_LOOK,
    },
    ActionGloss {
        keyword: "delays the script execution for",
        phrase: "Soldier is delayed.",
        icon: ICON_DELAY,
    },
    ActionGloss {
        keyword: "end script",
        phrase: "Soldier is ending the script.",
        icon: ICON_END,
    },
    ActionGloss {
        keyword: "plays predefined animation",
        phrase: "Soldier is playing an animation.",
        icon: ICON_ANIMATION,
    },
    ActionGloss {
        keyword: "crouching down",
        phrase: "Soldier is crouching.",
        icon: ICON_CROUCH,
    },
    ActionGloss {
        keyword: "quit script",
        phrase: "Soldier is quitting the script.",
        icon: ICON_QUIT,
    },
];

/// Label for a command action id, or `"Unknown"`.
pub fn command_meaning(action_id: &str) -> &'static str {
    COMMAND_MEANINGS
        .iter()
        .find(|(id, _)| *id == action_id.trim())
        .map_or(UNKNOWN_COMMAND, |(_, meaning)| *meaning)
}

/// First gloss whose keyword appears in `note`, ignoring case.
pub fn action_gloss(note: &str) -> Option<&'static ActionGloss> {
    let lowered = note.to_lowercase();
    ACTION_GLOSSES.iter().find(|gloss| lowered.contains(gloss.keyword))
}

/// `<note> (Command Id <id>: <meaning>, Parameter: <param>)`
pub fn describe_command(command: &Command) -> String {
    format!(
        "{} (Command Id {}: {}, Parameter: {})",
        command.note,
        command.action_id,
        command_meaning(&command.action_id),
        command.param
    )
}

/// Header line naming the AI, the patrol path, and the graph it works in.
pub fn report_header(path_id: &str, ai: &ResolvedAi<'_>) -> String {
    let graph_id = ai.graph_id.map(|id| id.to_string());
    format!(
        "{} ({}) on Patrol ({}) with Graph ({}) ({})",
        ai.ai_type.unwrap_or(NOT_SPECIFIED),
        ai.ai_id,
        path_id,
        graph_id.as_deref().unwrap_or(NOT_SPECIFIED),
        ai.graph_area.unwrap_or(NOT_SPECIFIED)
    )
}

/// The activity summary section for a list of commands.
pub fn summarize_activity(commands: &[Command]) -> String {
    let mut summary = format!("{SUMMARY_HEADING}\n");
    if commands.is_empty() {
        summary.push_str("No commands\n");
    }
    for command in commands {
        match action_gloss(&command.note) {
            Some(gloss) => {
                let _ = writeln!(summary, "{} {} ({})", gloss.phrase, gloss.icon, command.note);
            },
            None => {
                let _ = writeln!(summary, "{UNKNOWN_ACTION} ({})", command.note);
            },
        }
    }
    summary
}

/// Narrative block for one patrol path, or `None` if it is not reportable.
pub fn render_patrol_path(path_id: &str, path: &PatrolPath, models: &ModelTable) -> Option<String> {
    let Some(ai) = path.resolved_ai() else {
        debug!("patrol path {path_id} has no AI; left out of the report");
        return None;
    };
    if ai.is_unresolved() {
        warn!("AI not found for patrol path {path_id}; skipping");
        return None;
    }

    let mut block = report_header(path_id, &ai);
    block.push('\n');
    let commands = if path.commands.is_empty() {
        "none".to_string()
    } else {
        path.commands.iter().map(describe_command).collect::<Vec<_>>().join(", ")
    };
    if path.soldiers.is_empty() {
        let _ = writeln!(block, "Commands: {commands}.");
    }
    for soldier in &path.soldiers {
        let _ = writeln!(
            block,
            "Soldier {} '{}' is executing patrol path {path_id} with commands: {commands}.",
            soldier.soldier_id,
            models.display_name(&soldier.model_id)
        );
    }
    block.push('\n');
    block.push_str(&summarize_activity(&path.commands));
    Some(block)
}

/// Render the narrative report for a linked record.
pub fn render_report(record: &MissionRecord, models: &ModelTable) -> String {
    let mut report = format!("{REPORT_TITLE}\n{}\n\n", "=".repeat(REPORT_TITLE.len()));
    let blocks: Vec<String> = record
        .iter()
        .filter_map(|(path_id, path)| render_patrol_path(path_id, path, models))
        .collect();
    if blocks.is_empty() {
        report.push_str("No patrol paths with AI were found.\n");
    }
    for block in blocks {
        report.push_str(&block);
        report.push('\n');
    }
    report
}

/// The structured record as JSON indented by four spaces.
///
/// # Errors
/// Returns an error if the record cannot be serialized.
pub fn record_to_json(record: &MissionRecord) -> Result<String> {
    to_pretty_json(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mission_data::{AiDescriptor, AiLink, ModelRow, Soldier};

    fn command(note: &str, action_id: &str, param: &str) -> Command {
        Command {
            note: note.into(),
            action_id: action_id.into(),
            param: param.into(),
        }
    }

    fn models() -> ModelTable {
        ModelTable::from_rows([ModelRow {
            model_id: "101_02_3".into(),
            model_name: "Rebel".into(),
        }])
    }

    fn linked_path() -> PatrolPath {
        let mut path = PatrolPath::default();
        path.commands.push(command("Walks to node", "2", "12"));
        path.add_soldier(Soldier {
            soldier_id: "5".into(),
            model_id: "101_02_3".into(),
        });
        path.link = AiLink {
            ai_id: Some("7".into()),
            ai_type: Some("GUARD".into()),
            graph_id: Some(3),
            graph_area: Some("Warehouse".into()),
        };
        path
    }

    #[test]
    fn command_meanings_cover_ids_zero_to_eight() {
        assert_eq!(command_meaning("0"), "Animation");
        assert_eq!(command_meaning("2"), "Walk to");
        assert_eq!(command_meaning("8"), "Set speed");
        assert_eq!(command_meaning("9"), UNKNOWN_COMMAND);
        assert_eq!(command_meaning(""), UNKNOWN_COMMAND);
    }

    #[test]
    fn gloss_matching_ignores_case() {
        assert_eq!(action_gloss("Soldier WALKS TO node 4").unwrap().icon, ICON_WALK);
        assert_eq!(action_gloss("Plays predefined animation 3").unwrap().icon, ICON_ANIMATION);
        assert!(action_gloss("Stands still").is_none());
    }

    #[test]
    fn summary_marks_unknown_actions() {
        let summary = summarize_activity(&[command("Walks to node", "2", "12"), command("Waves", "0", "1")]);
        assert!(summary.starts_with(SUMMARY_HEADING));
        assert!(summary.contains("Soldier is walking. \u{1F6B6} (Walks to node)\n"));
        assert!(summary.contains("Unknown action (Waves)\n"));
        assert!(summarize_activity(&[]).contains("No commands"));
    }

    #[test]
    fn header_names_ai_patrol_and_graph() {
        let path = linked_path();
        let header = report_header("5", &path.resolved_ai().unwrap());
        assert_eq!(header, "GUARD (7) on Patrol (5) with Graph (3) (Warehouse)");
    }

    #[test]
    fn header_fills_missing_values() {
        let path = PatrolPath {
            link: AiLink {
                ai_id: Some("7".into()),
                ai_type: Some("GUARD".into()),
                ..AiLink::default()
            },
            ..PatrolPath::default()
        };
        let header = report_header("5", &path.resolved_ai().unwrap());
        assert_eq!(header, "GUARD (7) on Patrol (5) with Graph (Not Specified) (Not Specified)");
    }

    #[test]
    fn soldier_lines_use_model_names() {
        let block = render_patrol_path("5", &linked_path(), &models()).unwrap();
        assert!(block.contains(
            "Soldier 5 'Rebel' is executing patrol path 5 with commands: \
             Walks to node (Command Id 2: Walk to, Parameter: 12)."
        ));
    }

    #[test]
    fn commands_are_described_without_soldiers() {
        let mut path = linked_path();
        path.soldiers.clear();
        let block = render_patrol_path("5", &path, &models()).unwrap();
        assert!(block.contains("Commands: Walks to node (Command Id 2: Walk to, Parameter: 12).\n"));
        assert!(!block.contains("is executing patrol path"));
    }

    #[test]
    fn paths_without_ai_are_left_out() {
        let mut record = MissionRecord::new();
        record.insert("1".into(), PatrolPath::default());
        record.insert(
            "2".into(),
            PatrolPath {
                link: AiLink {
                    ai_id: Some("9".into()),
                    ..AiLink::default()
                },
                ..PatrolPath::default()
            },
        );
        record.insert("5".into(), linked_path());
        let report = render_report(&record, &models());
        assert!(report.contains("on Patrol (5)"));
        assert!(!report.contains("on Patrol (1)"));
        assert!(!report.contains("on Patrol (2)"));
    }

    #[test]
    fn inline_ai_is_reportable() {
        let mut record = MissionRecord::new();
        record.insert(
            "3".into(),
            PatrolPath {
                ai: Some(AiDescriptor {
                    ai_id: "40".into(),
                    ai_type: "SNIPER".into(),
                    graph_id: 4,
                    graph_area: None,
                }),
                ..PatrolPath::default()
            },
        );
        let report = render_report(&record, &models());
        assert!(report.contains("SNIPER (40) on Patrol (3) with Graph (4) (Not Specified)"));
    }

    #[test]
    fn empty_report_says_so() {
        let report = render_report(&MissionRecord::new(), &models());
        assert!(report.contains("No patrol paths with AI were found."));
    }
}
