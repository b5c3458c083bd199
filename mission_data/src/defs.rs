use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Identifier token taken from a `Task_New(<id>, ...)` declaration.
pub type TaskId = String;

/// Patrol paths keyed by their task id, in first-declared order.
pub type MissionRecord = IndexMap<TaskId, PatrolPath>;

/// Prefix carried by raw AI type tokens in the scripts (`"AITYPE_GUARD"`).
pub const AI_TYPE_PREFIX: &str = "AITYPE_";

/// Returns the AI type without its `AITYPE_` prefix.
///
/// ```
/// assert_eq!(mission_data::strip_ai_type_prefix("AITYPE_GUARD"), "GUARD");
/// assert_eq!(mission_data::strip_ai_type_prefix("SNIPER"), "SNIPER");
/// ```
pub fn strip_ai_type_prefix(raw: &str) -> &str {
    raw.strip_prefix(AI_TYPE_PREFIX).unwrap_or(raw)
}

/// A patrol path and everything attached to it while reading the mission script.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PatrolPath {
    #[serde(default)]
    pub commands: Vec<Command>,
    #[serde(default)]
    pub soldiers: Vec<Soldier>,
    /// AI declared inline in the main script (`HumanAI` task).
    #[serde(default)]
    pub ai: Option<AiDescriptor>,
    /// AI discovered through the per-entity AI script files.
    #[serde(flatten)]
    pub link: AiLink,
}

impl PatrolPath {
    /// Adds a soldier unless an identical one is already attached.
    /// Returns `true` if the soldier was added.
    pub fn add_soldier(&mut self, soldier: Soldier) -> bool {
        if self.soldiers.contains(&soldier) {
            return false;
        }
        self.soldiers.push(soldier);
        true
    }

    /// True if either an inline AI descriptor or a linked AI file is present.
    pub fn has_ai_linkage(&self) -> bool {
        self.ai.is_some() || self.link.ai_id.is_some()
    }

    /// The AI information used for reporting.
    ///
    /// Values found through a linked AI file win; the inline descriptor fills
    /// any field the link left empty. Returns `None` when the path has no AI
    /// linkage at all.
    pub fn resolved_ai(&self) -> Option<ResolvedAi<'_>> {
        let inline = self.ai.as_ref();
        match (&self.link.ai_id, inline) {
            (Some(ai_id), _) => Some(ResolvedAi {
                ai_id,
                ai_type: self.link.ai_type.as_deref().or(inline.map(|ai| ai.ai_type.as_str())),
                graph_id: self.link.graph_id.or(inline.map(|ai| ai.graph_id)),
                graph_area: self
                    .link
                    .graph_area
                    .as_deref()
                    .or(inline.and_then(|ai| ai.graph_area.as_deref())),
            }),
            (None, Some(ai)) => Some(ResolvedAi {
                ai_id: &ai.ai_id,
                ai_type: Some(ai.ai_type.as_str()),
                graph_id: Some(ai.graph_id),
                graph_area: ai.graph_area.as_deref(),
            }),
            (None, None) => None,
        }
    }
}

/// One `PatrolPathCommand` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    pub note: String,
    /// Small integer action code, kept as written in the script.
    #[serde(rename = "action")]
    pub action_id: String,
    pub param: String,
}

/// A `HumanSoldier` attached to a patrol path.
///
/// Soldiers carry no id of their own in the scripts, so `soldier_id` is the
/// owning patrol path's id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Soldier {
    pub soldier_id: TaskId,
    /// Model id of the form `DDD_DD_D`.
    pub model_id: String,
}

/// AI declared inline by a `HumanAI` task in the main script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiDescriptor {
    pub ai_id: TaskId,
    pub ai_type: String,
    pub graph_id: u32,
    #[serde(default)]
    pub graph_area: Option<String>,
}

/// AI details discovered by linking AI script files to a patrol path.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AiLink {
    /// Entity id (file stem) of the AI script that patrols this path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_id: Option<TaskId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graph_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graph_area: Option<String>,
}

impl AiLink {
    pub fn is_empty(&self) -> bool {
        self.ai_id.is_none() && self.ai_type.is_none() && self.graph_id.is_none() && self.graph_area.is_none()
    }
}

/// Borrowed view of the effective AI assigned to a patrol path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedAi<'a> {
    pub ai_id: &'a str,
    pub ai_type: Option<&'a str>,
    pub graph_id: Option<u32>,
    pub graph_area: Option<&'a str>,
}

impl ResolvedAi<'_> {
    /// No type, graph or area could be resolved.
    pub fn is_unresolved(&self) -> bool {
        self.ai_type.is_none() && self.graph_id.is_none() && self.graph_area.is_none()
    }
}

/// Row of the AI model table (`AI-Models.json`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelRow {
    #[serde(rename = "ModelId")]
    pub model_id: String,
    #[serde(rename = "ModelName")]
    pub model_name: String,
}

/// Row of a per-level graph area table (`graph_area_level<N>.json`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphAreaRow {
    /// Formatted as `Graph #<n>`.
    #[serde(rename = "Graph")]
    pub graph: String,
    #[serde(rename = "Area")]
    pub area: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(note: &str, action_id: &str, param: &str) -> Command {
        Command {
            note: note.into(),
            action_id: action_id.into(),
            param: param.into(),
        }
    }

    fn inline_ai() -> AiDescriptor {
        AiDescriptor {
            ai_id: "40".into(),
            ai_type: "SNIPER".into(),
            graph_id: 2,
            graph_area: Some("Tower".into()),
        }
    }

    #[test]
    fn record_json_round_trip_keeps_order_and_fields() {
        let mut record = MissionRecord::new();
        let mut linked = PatrolPath::default();
        linked.commands.push(command("Walks to node", "2", "12"));
        linked.add_soldier(Soldier {
            soldier_id: "9".into(),
            model_id: "101_02_3".into(),
        });
        linked.link = AiLink {
            ai_id: Some("7".into()),
            ai_type: Some("GUARD".into()),
            graph_id: Some(3),
            graph_area: Some("Warehouse".into()),
        };
        record.insert("9".into(), linked);
        record.insert("2".into(), PatrolPath::default());

        let json = serde_json::to_string(&record).unwrap();
        let reloaded: MissionRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(reloaded, record);
        assert_eq!(reloaded.keys().collect::<Vec<_>>(), vec!["9", "2"]);
    }

    #[test]
    fn absent_link_fields_are_not_serialized() {
        let json = serde_json::to_value(PatrolPath::default()).unwrap();
        let object = json.as_object().unwrap();
        assert!(object.contains_key("commands"));
        assert!(object.contains_key("soldiers"));
        assert!(object["ai"].is_null());
        assert!(!object.contains_key("ai_id"));
        assert!(!object.contains_key("graph_area"));
    }

    #[test]
    fn command_action_serializes_under_action_key() {
        let json = serde_json::to_value(command("Runs to node", "3", "4")).unwrap();
        assert_eq!(json["action"], "3");
        assert!(json.get("action_id").is_none());
    }

    #[test]
    fn duplicate_soldier_is_stored_once() {
        let mut path = PatrolPath::default();
        let soldier = Soldier {
            soldier_id: "5".into(),
            model_id: "101_02_3".into(),
        };
        assert!(path.add_soldier(soldier.clone()));
        assert!(!path.add_soldier(soldier));
        assert_eq!(path.soldiers.len(), 1);
    }

    #[test]
    fn resolved_ai_prefers_link_and_falls_back_to_inline() {
        let mut path = PatrolPath {
            ai: Some(inline_ai()),
            ..PatrolPath::default()
        };
        let inline = path.resolved_ai().unwrap();
        assert_eq!(inline.ai_id, "40");
        assert_eq!(inline.ai_type, Some("SNIPER"));

        path.link.ai_id = Some("7".into());
        path.link.ai_type = Some("GUARD".into());
        let linked = path.resolved_ai().unwrap();
        assert_eq!(linked.ai_id, "7");
        assert_eq!(linked.ai_type, Some("GUARD"));
        assert_eq!(linked.graph_id, Some(2));
        assert_eq!(linked.graph_area, Some("Tower"));
    }

    #[test]
    fn path_without_ai_has_no_resolution() {
        let path = PatrolPath::default();
        assert!(!path.has_ai_linkage());
        assert!(path.resolved_ai().is_none());

        let linked_only = PatrolPath {
            link: AiLink {
                ai_id: Some("7".into()),
                ..AiLink::default()
            },
            ..PatrolPath::default()
        };
        assert!(linked_only.resolved_ai().unwrap().is_unresolved());
    }
}
