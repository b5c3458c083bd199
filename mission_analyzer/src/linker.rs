//! Cross-file AI linking.
//!
//! AI entities live in their own scripts. A script that patrols a path carries
//! an `AIAction_Patrol` line naming the path's task id. Linking runs in two
//! passes over a [`ScriptSource`]:
//!
//! 1. scan every script for patrol actions and map patrol path id to AI entity id;
//! 2. for each linked path, read the AI entity's own declaration line for its
//!    AI type and graph, and resolve the graph to an area name.
//!
//! Both passes are best effort: anything that cannot be matched or parsed
//! leaves the affected fields empty.

use std::collections::HashMap;

use clap::ValueEnum;
use indexmap::IndexMap;
use indexmap::map::Entry;
use lazy_static::lazy_static;
use log::{debug, info, warn};
use mission_data::{AiLink, MissionRecord, TaskId, strip_ai_type_prefix};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::lookup::{GraphAreas, UNKNOWN_AREA};
use crate::scripts::ScriptSource;
use crate::task_line::declared_task_id;

/// Marker of the action that ties an AI entity to a patrol path.
pub const PATROL_ACTION_MARKER: &str = "AIAction_Patrol";

lazy_static! {
    static ref INTEGER: Regex = Regex::new(r"-?\d+").expect("valid integer pattern");
    static ref AI_TYPE: Regex = Regex::new(r#""(AITYPE_\w+)""#).expect("valid AI type pattern");
    static ref GRAPH_REF: Regex = Regex::new(r"Graph #(\d+)").expect("valid graph pattern");
}

/// What to do when more than one AI script patrols the same path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum LinkPolicy {
    /// Keep the first AI entity in entity order.
    FirstWins,
    /// Keep the last AI entity in entity order.
    #[default]
    LastWins,
    /// Fail the link.
    Reject,
}

/// Two AI scripts claiming the same patrol path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkConflict {
    pub patrol_id: TaskId,
    pub kept: TaskId,
    pub dropped: TaskId,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkError {
    #[error("patrol path {patrol_id} is claimed by AI {first} and AI {second}")]
    Conflict {
        patrol_id: TaskId,
        first: TaskId,
        second: TaskId,
    },
}

/// Outcome of a link run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkSummary {
    pub files_scanned: usize,
    /// Patrol paths that received an AI entity.
    pub linked: usize,
    pub conflicts: Vec<LinkConflict>,
    /// AI scripts that patrol none of the known paths.
    pub unlinked_files: Vec<TaskId>,
    /// AI scripts that could not be read during either pass.
    pub unreadable_files: Vec<TaskId>,
    /// Linked AI entities whose declaration line was not found.
    pub undeclared: Vec<TaskId>,
}

/// AI details read from an entity's own declaration line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AiDeclaration {
    /// AI type with the `AITYPE_` prefix removed.
    pub ai_type: Option<String>,
    pub graph_id: Option<u32>,
}

/// Patrol path id referenced by a patrol action line, if `line` is one.
///
/// The first integer token on the line is used. Negative tokens such as the
/// `-1` "no id" sentinel are never patrol ids and are passed over.
pub fn patrol_reference(line: &str) -> Option<&str> {
    if !line.contains(PATROL_ACTION_MARKER) {
        return None;
    }
    INTEGER
        .find_iter(line)
        .map(|m| m.as_str())
        .find(|token| !token.starts_with('-'))
}

/// Find the declaration of `entity_id` among `lines` and read its AI details.
pub fn parse_ai_declaration<S: AsRef<str>>(lines: &[S], entity_id: &str) -> Option<AiDeclaration> {
    let line = lines
        .iter()
        .map(|line| line.as_ref())
        .find(|line| declared_task_id(line) == Some(entity_id))?;
    let ai_type = AI_TYPE
        .captures(line)
        .map(|caps| strip_ai_type_prefix(&caps[1]).to_string());
    let graph_id = GRAPH_REF
        .captures(line)
        .and_then(|caps| caps[1].parse::<u32>().ok())
        .filter(|&graph_id| {
            // graph 0 means the entity has no AI graph
            if graph_id == 0 {
                info!("AI {entity_id} declares graph 0; graph skipped");
            }
            graph_id > 0
        });
    Some(AiDeclaration { ai_type, graph_id })
}

/// Links AI scripts to patrol paths.
pub struct AiLinker<'a, S> {
    scripts: &'a S,
    graph_areas: &'a GraphAreas,
    policy: LinkPolicy,
}

impl<'a, S: ScriptSource> AiLinker<'a, S> {
    pub fn new(scripts: &'a S, graph_areas: &'a GraphAreas) -> Self {
        Self {
            scripts,
            graph_areas,
            policy: LinkPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: LinkPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Link AI scripts into `paths`, replacing any earlier link results.
    ///
    /// # Errors
    /// Returns [`LinkError::Conflict`] under [`LinkPolicy::Reject`] when two AI
    /// scripts patrol the same path. `paths` is left unchanged in that case.
    pub fn link(&self, paths: &mut MissionRecord) -> Result<LinkSummary, LinkError> {
        let mut summary = LinkSummary::default();
        let links = self.collect_patrol_links(paths, &mut summary)?;

        let mut declarations: HashMap<TaskId, Option<AiDeclaration>> = HashMap::new();
        for (patrol_id, path) in paths.iter_mut() {
            path.link = AiLink::default();
            let Some(ai_id) = links.get(patrol_id) else {
                continue;
            };
            path.link.ai_id = Some(ai_id.clone());
            summary.linked += 1;
            info!("linked AI {ai_id} to patrol path {patrol_id}");

            let declaration = declarations
                .entry(ai_id.clone())
                .or_insert_with(|| self.read_declaration(ai_id, &mut summary));
            let Some(declaration) = declaration else {
                continue;
            };
            if let Some(ai_type) = &declaration.ai_type {
                info!("found AI type '{ai_type}' for AI {ai_id}");
                path.link.ai_type = Some(ai_type.clone());
            }
            if let Some(graph_id) = declaration.graph_id {
                let area = self.graph_areas.area(graph_id).unwrap_or_else(|| {
                    warn!("graph {graph_id} of AI {ai_id} has no area in the graph table");
                    UNKNOWN_AREA
                });
                info!("found graph area '{area}' for AI {ai_id}");
                path.link.graph_id = Some(graph_id);
                path.link.graph_area = Some(area.to_string());
            }
        }

        info!(
            "{} of {} patrol paths linked to AI files ({} files scanned, {} conflicts)",
            summary.linked,
            paths.len(),
            summary.files_scanned,
            summary.conflicts.len()
        );
        Ok(summary)
    }

    /// First pass: patrol path id to AI entity id.
    fn collect_patrol_links(
        &self,
        paths: &MissionRecord,
        summary: &mut LinkSummary,
    ) -> Result<IndexMap<TaskId, TaskId>, LinkError> {
        let mut links: IndexMap<TaskId, TaskId> = IndexMap::new();
        for ai_id in self.scripts.entity_ids() {
            summary.files_scanned += 1;
            let lines = match self.scripts.read_lines(&ai_id) {
                Ok(lines) => lines,
                Err(e) => {
                    warn!("skipping AI file {ai_id}: {e:#}");
                    summary.unreadable_files.push(ai_id);
                    continue;
                },
            };

            let mut patrols_known_path = false;
            for patrol_id in lines.iter().filter_map(|line| patrol_reference(line)) {
                if !paths.contains_key(patrol_id) {
                    debug!("AI {ai_id} patrols unknown path {patrol_id}");
                    continue;
                }
                patrols_known_path = true;
                self.record_link(&mut links, patrol_id, &ai_id, summary)?;
            }
            if !patrols_known_path {
                summary.unlinked_files.push(ai_id);
            }
        }
        Ok(links)
    }

    fn record_link(
        &self,
        links: &mut IndexMap<TaskId, TaskId>,
        patrol_id: &str,
        ai_id: &str,
        summary: &mut LinkSummary,
    ) -> Result<(), LinkError> {
        match links.entry(patrol_id.to_string()) {
            Entry::Vacant(slot) => {
                slot.insert(ai_id.to_string());
            },
            Entry::Occupied(slot) if slot.get() == ai_id => {},
            Entry::Occupied(mut slot) => {
                let earlier = slot.get().clone();
                let (kept, dropped) = match self.policy {
                    LinkPolicy::FirstWins => (earlier, ai_id.to_string()),
                    LinkPolicy::LastWins => {
                        slot.insert(ai_id.to_string());
                        (ai_id.to_string(), earlier)
                    },
                    LinkPolicy::Reject => {
                        return Err(LinkError::Conflict {
                            patrol_id: patrol_id.to_string(),
                            first: earlier,
                            second: ai_id.to_string(),
                        });
                    },
                };
                warn!("patrol path {patrol_id} claimed by AI {dropped} and AI {kept}; keeping AI {kept}");
                summary.conflicts.push(LinkConflict {
                    patrol_id: patrol_id.to_string(),
                    kept,
                    dropped,
                });
            },
        }
        Ok(())
    }

    /// Second pass helper: read one AI entity's declaration.
    fn read_declaration(&self, ai_id: &str, summary: &mut LinkSummary) -> Option<AiDeclaration> {
        let lines = match self.scripts.read_lines(ai_id) {
            Ok(lines) => lines,
            Err(e) => {
                warn!("could not re-read AI file {ai_id}: {e:#}");
                summary.unreadable_files.push(ai_id.to_string());
                return None;
            },
        };
        let declaration = parse_ai_declaration(&lines, ai_id);
        if declaration.is_none() {
            warn!("AI file {ai_id} has no declaration line for entity {ai_id}");
            summary.undeclared.push(ai_id.to_string());
        }
        declaration
    }
}
