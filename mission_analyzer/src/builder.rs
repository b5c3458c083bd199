//! Patrol-path builder.
//!
//! Folds the classified lines of a main mission script into a
//! [`MissionRecord`]. The script has no nesting: a `PatrolPath` task opens a
//! path and every following command, soldier or AI task belongs to it until
//! the next `PatrolPath` task. That context lives in the builder, never in
//! global state.

use log::{debug, info, warn};
use mission_data::{AiDescriptor, MissionRecord, PatrolPath, Soldier, TaskId};

use crate::lookup::GraphAreas;
use crate::task_line::{Classified, LineClassifier, SubRecord, TaskLineClassifier};

/// Line counts gathered while building.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildSummary {
    pub lines: usize,
    pub task_lines: usize,
    /// Task lines dropped because their fields could not be extracted.
    pub skipped: usize,
    /// Sub-record lines seen before any patrol path was declared.
    pub orphaned: usize,
}

/// Accumulates patrol paths from script lines fed in file order.
pub struct PatrolPathBuilder<'a, C = TaskLineClassifier> {
    classifier: C,
    graph_areas: &'a GraphAreas,
    current_id: Option<TaskId>,
    paths: MissionRecord,
    summary: BuildSummary,
}

impl<'a> PatrolPathBuilder<'a> {
    pub fn new(graph_areas: &'a GraphAreas) -> Self {
        Self::with_classifier(TaskLineClassifier, graph_areas)
    }
}

impl<'a, C: LineClassifier> PatrolPathBuilder<'a, C> {
    pub fn with_classifier(classifier: C, graph_areas: &'a GraphAreas) -> Self {
        Self {
            classifier,
            graph_areas,
            current_id: None,
            paths: MissionRecord::new(),
            summary: BuildSummary::default(),
        }
    }

    /// Id of the patrol path subsequent sub-records attach to.
    pub fn current_id(&self) -> Option<&str> {
        self.current_id.as_deref()
    }

    /// Process one line. Failures are logged and only affect this line.
    pub fn feed(&mut self, line_no: usize, line: &str) {
        self.summary.lines += 1;
        match self.classifier.classify(line) {
            Ok(Classified::Irrelevant) => {},
            Ok(Classified::NewPatrolPath { id }) => {
                self.summary.task_lines += 1;
                // redeclaring a known id keeps its position but starts it afresh
                if self.paths.insert(id.clone(), PatrolPath::default()).is_some() {
                    warn!("line {line_no}: patrol path {id} declared again; earlier entries discarded");
                } else {
                    info!("found new patrol path: {id}");
                }
                self.current_id = Some(id);
            },
            Ok(Classified::SubRecord { task_id, record }) => {
                self.summary.task_lines += 1;
                self.attach(line_no, task_id, record);
            },
            Err(err) if err.is_expected_skip() => {
                self.summary.task_lines += 1;
                self.summary.skipped += 1;
                info!("line {line_no}: {err}; skipping");
            },
            Err(err) => {
                self.summary.task_lines += 1;
                self.summary.skipped += 1;
                warn!("line {line_no}: {err}; skipping '{}'", line.trim());
            },
        }
    }

    fn attach(&mut self, line_no: usize, task_id: TaskId, record: SubRecord) {
        let Some((path_id, path)) = self
            .current_id
            .as_ref()
            .and_then(|id| self.paths.get_mut(id).map(|path| (id, path)))
        else {
            self.summary.orphaned += 1;
            debug!("line {line_no}: {} task {task_id} has no open patrol path; skipping", record.kind());
            return;
        };

        match record {
            SubRecord::Command(command) => {
                info!(
                    "found new command for patrol path {path_id}: {} (action {}, parameter {})",
                    command.note, command.action_id, command.param
                );
                path.commands.push(command);
            },
            SubRecord::Soldier { model_id } => {
                let soldier = Soldier {
                    soldier_id: path_id.clone(),
                    model_id,
                };
                info!("found new soldier for patrol path {path_id}: {}", soldier.model_id);
                if !path.add_soldier(soldier) {
                    debug!("line {line_no}: duplicate soldier on patrol path {path_id} ignored");
                }
            },
            SubRecord::Ai { ai_type, graph_id } => {
                let graph_area = self.graph_areas.area(graph_id).map(str::to_string);
                if graph_area.is_none() {
                    warn!("line {line_no}: graph {graph_id} has no area in the graph table");
                }
                info!("found new AI for patrol path {path_id}: {ai_type} on graph {graph_id}");
                let previous = path.ai.replace(AiDescriptor {
                    ai_id: task_id,
                    ai_type,
                    graph_id,
                    graph_area,
                });
                if previous.is_some() {
                    warn!("line {line_no}: patrol path {path_id} already had an inline AI; replaced");
                }
            },
        }
    }

    /// Consume the builder, returning the paths in first-declared order.
    pub fn finish(self) -> (MissionRecord, BuildSummary) {
        (self.paths, self.summary)
    }
}

/// Build patrol paths from the lines of a main mission script.
pub fn build_patrol_paths<S: AsRef<str>>(lines: &[S], graph_areas: &GraphAreas) -> (MissionRecord, BuildSummary) {
    let (paths, summary) = lines
        .iter()
        .enumerate()
        .fold(PatrolPathBuilder::new(graph_areas), |mut builder, (index, line)| {
            builder.feed(index + 1, line.as_ref());
            builder
        })
        .finish();
    info!(
        "{} patrol paths built from {} lines ({} task lines, {} skipped, {} orphaned)",
        paths.len(),
        summary.lines,
        summary.task_lines,
        summary.skipped,
        summary.orphaned
    );
    (paths, summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task_line::LineError;
    use mission_data::GraphAreaRow;

    fn areas() -> GraphAreas {
        GraphAreas::from_rows([GraphAreaRow {
            graph: "Graph #3".into(),
            area: "Warehouse".into(),
        }])
    }

    #[test]
    fn example_script_builds_one_path() {
        let lines = [
            r#"Task_New(5,"PatrolPath")"#,
            r#"Task_New(5,"PatrolPathCommand","Walks to node","2","12")"#,
            r#"Task_New(5,"HumanSoldier","Soldier","101_02_3","0")"#,
        ];
        let (paths, summary) = build_patrol_paths(&lines, &areas());
        assert_eq!(paths.len(), 1);
        let path = &paths["5"];
        assert_eq!(path.commands.len(), 1);
        assert_eq!(path.commands[0].note, "Walks to node");
        assert_eq!(path.commands[0].action_id, "2");
        assert_eq!(path.commands[0].param, "12");
        assert_eq!(path.soldiers[0].soldier_id, "5");
        assert_eq!(path.soldiers[0].model_id, "101_02_3");
        assert_eq!(summary.task_lines, 3);
    }

    #[test]
    fn paths_keep_first_seen_order_and_command_order() {
        let lines = [
            r#"Task_New(9, "PatrolPath")"#,
            r#"Task_New(-1, "PatrolPathCommand", "Walks to node", 2, 1)"#,
            r#"Task_New(-1, "PatrolPathCommand", "Looks at node", 5, 2)"#,
            r#"Task_New(2, "PatrolPath")"#,
            r#"Task_New(-1, "PatrolPathCommand", "Runs to node", 3, 7)"#,
            r#"Task_New(-1, "PatrolPathCommand", "End script", 6, 0)"#,
        ];
        let (paths, _) = build_patrol_paths(&lines, &areas());
        assert_eq!(paths.keys().collect::<Vec<_>>(), vec!["9", "2"]);
        let notes: Vec<_> = paths["2"].commands.iter().map(|c| c.note.as_str()).collect();
        assert_eq!(notes, vec!["Runs to node", "End script"]);
        assert_eq!(paths["9"].commands[1].param, "2");
    }

    #[test]
    fn sub_records_before_any_path_are_dropped() {
        let lines = [
            r#"Task_New(-1, "PatrolPathCommand", "Walks to node", 2, 1)"#,
            r#"Task_New(-1, "HumanSoldier", "101_02_3")"#,
            r#"Task_New(4, "PatrolPath")"#,
        ];
        let (paths, summary) = build_patrol_paths(&lines, &areas());
        assert_eq!(summary.orphaned, 2);
        assert!(paths["4"].commands.is_empty());
        assert!(paths["4"].soldiers.is_empty());
    }

    #[test]
    fn malformed_lines_do_not_abort_the_parse() {
        let lines = [
            r#"Task_New(1, "PatrolPath")"#,
            r#"Task_New(-1, "PatrolPathCommand", "broken")"#,
            r#"Task_New(-1, "HumanSoldier", "no model here")"#,
            r#"Task_New(-1, "HumanAI", "", "AITYPE_GUARD", 0)"#,
            r#"Task_New(-1, "PatrolPathCommand", "Walks to node", 2, 8)"#,
        ];
        let (paths, summary) = build_patrol_paths(&lines, &areas());
        assert_eq!(summary.skipped, 3);
        let path = &paths["1"];
        assert_eq!(path.commands.len(), 1);
        assert!(path.soldiers.is_empty());
        assert!(path.ai.is_none());
    }

    #[test]
    fn inline_ai_resolves_area() {
        let lines = [
            r#"Task_New(1, "PatrolPath")"#,
            r#"Task_New(40, "HumanAI", "", "AITYPE_GUARD", 3)"#,
            r#"Task_New(2, "PatrolPath")"#,
            r#"Task_New(41, "HumanAI", "", "AITYPE_SNIPER", 8)"#,
        ];
        let (paths, _) = build_patrol_paths(&lines, &areas());
        let ai = paths["1"].ai.as_ref().unwrap();
        assert_eq!(ai.ai_id, "40");
        assert_eq!(ai.ai_type, "GUARD");
        assert_eq!(ai.graph_area.as_deref(), Some("Warehouse"));
        assert_eq!(paths["2"].ai.as_ref().unwrap().graph_area, None);
    }

    #[test]
    fn redeclared_path_restarts_in_place() {
        let lines = [
            r#"Task_New(1, "PatrolPath")"#,
            r#"Task_New(-1, "PatrolPathCommand", "Walks to node", 2, 8)"#,
            r#"Task_New(2, "PatrolPath")"#,
            r#"Task_New(1, "PatrolPath")"#,
            r#"Task_New(-1, "PatrolPathCommand", "Runs to node", 3, 9)"#,
        ];
        let (paths, _) = build_patrol_paths(&lines, &areas());
        assert_eq!(paths.keys().collect::<Vec<_>>(), vec!["1", "2"]);
        assert_eq!(paths["1"].commands.len(), 1);
        assert_eq!(paths["1"].commands[0].note, "Runs to node");
    }

    struct RejectEverything;

    impl LineClassifier for RejectEverything {
        fn classify(&self, _line: &str) -> Result<Classified, LineError> {
            Err(LineError::Unopened)
        }
    }

    #[test]
    fn classifier_can_be_swapped() {
        let areas = areas();
        let mut builder = PatrolPathBuilder::with_classifier(RejectEverything, &areas);
        builder.feed(1, r#"Task_New(1, "PatrolPath")"#);
        assert!(builder.current_id().is_none());
        let (paths, summary) = builder.finish();
        assert!(paths.is_empty());
        assert_eq!(summary.skipped, 1);
    }
}
