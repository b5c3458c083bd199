//! Recognition of `Task_New(...)` declaration lines.
//!
//! Mission scripts are never parsed as a language. Only lines carrying the
//! task marker are inspected, and a handful of positional arguments are pulled
//! out of them. Everything else in the script is ignored.
//!
//! The argument splitter is a tiny tokenizer: it splits on commas at the top
//! level of the `Task_New( ... )` call, keeps quoted text intact and stops at
//! the matching closing parenthesis. On well-formed lines this gives the same
//! fields as a plain comma split, while nested calls and commas inside notes
//! no longer shift the positions.

use std::fmt;

use lazy_static::lazy_static;
use mission_data::{Command, TaskId, strip_ai_type_prefix};
use regex::Regex;
use thiserror::Error;

/// Marker that every task declaration line contains.
pub const TASK_MARKER: &str = "Task_New";

lazy_static! {
    static ref MODEL_ID: Regex = Regex::new(r"\d{3}_\d{2}_\d").expect("valid model id pattern");
    static ref GRAPH_PREFIX: Regex = Regex::new(r"^Graph\s*#\s*").expect("valid graph prefix pattern");
}

/// The task kinds the analyzer understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    PatrolPath,
    PatrolPathCommand,
    HumanSoldier,
    HumanAi,
}

impl TaskKind {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "PatrolPath" => Some(Self::PatrolPath),
            "PatrolPathCommand" => Some(Self::PatrolPathCommand),
            "HumanSoldier" => Some(Self::HumanSoldier),
            "HumanAI" => Some(Self::HumanAi),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::PatrolPath => "PatrolPath",
            Self::PatrolPathCommand => "PatrolPathCommand",
            Self::HumanSoldier => "HumanSoldier",
            Self::HumanAi => "HumanAI",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Data extracted from a task line that attaches to the open patrol path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubRecord {
    Command(Command),
    Soldier { model_id: String },
    Ai { ai_type: String, graph_id: u32 },
}

impl SubRecord {
    pub fn kind(&self) -> TaskKind {
        match self {
            SubRecord::Command(_) => TaskKind::PatrolPathCommand,
            SubRecord::Soldier { .. } => TaskKind::HumanSoldier,
            SubRecord::Ai { .. } => TaskKind::HumanAi,
        }
    }
}

/// Result of classifying one script line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classified {
    /// Not a task declaration, or a task kind the analyzer does not track.
    Irrelevant,
    /// Declares a new patrol path, which becomes the open entity.
    NewPatrolPath { id: TaskId },
    /// Attaches to whichever patrol path is open.
    SubRecord { task_id: TaskId, record: SubRecord },
}

/// Reasons a task line could not be turned into a record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineError {
    #[error("task declaration is missing its opening parenthesis")]
    Unopened,
    #[error("task declaration has an empty task id")]
    EmptyTaskId,
    #[error("{kind} task is missing argument {index}")]
    MissingArgument { kind: TaskKind, index: usize },
    #[error("HumanSoldier task carries no model id")]
    NoModelId,
    #[error("invalid graph id '{0}'")]
    InvalidGraphId(String),
    #[error("graph id {0} is not positive")]
    NonPositiveGraphId(i64),
}

impl LineError {
    /// Expected omissions (no model id, AI without a graph) rather than malformed input.
    pub fn is_expected_skip(&self) -> bool {
        matches!(self, LineError::NoModelId | LineError::NonPositiveGraphId(_))
    }
}

/// Strategy for turning raw script lines into classified records.
///
/// The builder and linker only depend on this trait, so a different parsing
/// strategy can be dropped in without touching either.
pub trait LineClassifier {
    /// Classify a single line.
    ///
    /// # Errors
    /// Returns a [`LineError`] if the line is a recognized task whose fields
    /// cannot be extracted.
    fn classify(&self, line: &str) -> Result<Classified, LineError>;
}

/// Default classifier for the `Task_New` dialect.
#[derive(Debug, Default, Clone, Copy)]
pub struct TaskLineClassifier;

impl LineClassifier for TaskLineClassifier {
    fn classify(&self, line: &str) -> Result<Classified, LineError> {
        classify_line(line)
    }
}

/// Classify one line of a mission script.
///
/// ```
/// use mission_analyzer::task_line::{Classified, classify_line};
///
/// let parsed = classify_line(r#"Task_New(5, "PatrolPath")"#).unwrap();
/// assert_eq!(parsed, Classified::NewPatrolPath { id: "5".into() });
/// assert_eq!(classify_line("// nothing here").unwrap(), Classified::Irrelevant);
/// ```
///
/// # Errors
/// Returns a [`LineError`] for recognized task kinds whose fields are missing or malformed.
pub fn classify_line(line: &str) -> Result<Classified, LineError> {
    if !line.contains(TASK_MARKER) {
        return Ok(Classified::Irrelevant);
    }
    let args = task_arguments(line)?;
    let task_id = clean_field(args[0]);
    if task_id.is_empty() {
        return Err(LineError::EmptyTaskId);
    }
    let Some(kind) = args.get(1).map(|arg| clean_field(arg)).and_then(TaskKind::from_token) else {
        return Ok(Classified::Irrelevant);
    };
    let task_id = task_id.to_string();

    let record = match kind {
        TaskKind::PatrolPath => return Ok(Classified::NewPatrolPath { id: task_id }),
        TaskKind::PatrolPathCommand => SubRecord::Command(Command {
            note: argument(&args, kind, 2)?.to_string(),
            action_id: argument(&args, kind, 3)?.to_string(),
            param: argument(&args, kind, 4)?.to_string(),
        }),
        // the model id is not a positional field; it can sit anywhere on the line
        TaskKind::HumanSoldier => SubRecord::Soldier {
            model_id: MODEL_ID
                .find(line)
                .map(|m| m.as_str().to_string())
                .ok_or(LineError::NoModelId)?,
        },
        TaskKind::HumanAi => SubRecord::Ai {
            ai_type: strip_ai_type_prefix(argument(&args, kind, 3)?).to_string(),
            graph_id: parse_graph_id(argument(&args, kind, 4)?)?,
        },
    };
    Ok(Classified::SubRecord { task_id, record })
}

/// Returns the id of the task declared on `line`, if it is a task declaration.
pub fn declared_task_id(line: &str) -> Option<&str> {
    if !line.contains(TASK_MARKER) {
        return None;
    }
    let args = task_arguments(line).ok()?;
    let id = clean_field(args[0]);
    (!id.is_empty()).then_some(id)
}

/// Split the arguments of the first `Task_New( ... )` call on the line.
///
/// Always returns at least one (possibly empty) argument.
///
/// # Errors
/// Returns [`LineError::Unopened`] if the marker is not followed by `(`.
pub fn task_arguments(line: &str) -> Result<Vec<&str>, LineError> {
    let start = line.find(TASK_MARKER).ok_or(LineError::Unopened)?;
    let after_marker = line[start + TASK_MARKER.len()..].trim_start();
    let body = after_marker.strip_prefix('(').ok_or(LineError::Unopened)?;

    let mut args = Vec::new();
    let mut depth = 0usize;
    let mut in_quotes = false;
    let mut field_start = 0;
    for (i, ch) in body.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            '(' if !in_quotes => depth += 1,
            ')' if !in_quotes => {
                if depth == 0 {
                    args.push(&body[field_start..i]);
                    return Ok(args);
                }
                depth -= 1;
            },
            ',' if !in_quotes && depth == 0 => {
                args.push(&body[field_start..i]);
                field_start = i + 1;
            },
            _ => {},
        }
    }
    // unterminated call: the remainder is the last argument
    args.push(&body[field_start..]);
    Ok(args)
}

/// Trim whitespace, trailing terminators and surrounding quotes from a field.
pub fn clean_field(raw: &str) -> &str {
    raw.trim()
        .trim_end_matches([')', ';'])
        .trim()
        .trim_matches('"')
        .trim()
}

fn argument<'a>(args: &[&'a str], kind: TaskKind, index: usize) -> Result<&'a str, LineError> {
    args.get(index)
        .map(|arg| clean_field(arg))
        .ok_or(LineError::MissingArgument { kind, index })
}

fn parse_graph_id(raw: &str) -> Result<u32, LineError> {
    let digits = GRAPH_PREFIX.replace(raw, "");
    let value: i64 = digits
        .trim()
        .parse()
        .map_err(|_| LineError::InvalidGraphId(raw.to_string()))?;
    if value <= 0 {
        return Err(LineError::NonPositiveGraphId(value));
    }
    u32::try_from(value).map_err(|_| LineError::InvalidGraphId(raw.to_string()))
}
