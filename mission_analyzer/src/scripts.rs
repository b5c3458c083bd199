//! Index of per-entity AI script files.
//!
//! Each AI entity of a level lives in its own script, named `<entity id>.qsc`.
//! The linker only sees the [`ScriptSource`] trait, so tests can hand it an
//! in-memory index instead of a directory.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use indexmap::IndexMap;
use log::{info, warn};
use mission_data::TaskId;
use walkdir::WalkDir;

use crate::io::read_lines;

/// A keyed collection of entity scripts.
pub trait ScriptSource {
    /// Entity ids in a deterministic order (see [`entity_order`]).
    fn entity_ids(&self) -> Vec<TaskId>;

    /// Lines of the script belonging to `entity_id`.
    ///
    /// # Errors
    /// Returns an error if the entity is unknown or its script cannot be read.
    fn read_lines(&self, entity_id: &str) -> Result<Vec<String>>;
}

/// Ordering for entity ids: numeric ids by value first, then the rest lexically.
pub fn entity_order(a: &str, b: &str) -> Ordering {
    match (a.parse::<i64>(), b.parse::<i64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// Scripts found in one directory, keyed by file stem.
#[derive(Debug, Clone, Default)]
pub struct DirectoryScripts {
    files: IndexMap<TaskId, PathBuf>,
}

impl DirectoryScripts {
    /// Index the files in `dir` (not recursively) whose extension matches `extension`.
    ///
    /// A missing directory, or a path that is not a directory, yields an empty
    /// index: AI scripts are optional input.
    pub fn scan(dir: &Path, extension: &str) -> Self {
        if !dir.exists() {
            warn!("AI script directory '{}' does not exist; no AI files to link", dir.display());
            return Self::default();
        }
        if !dir.is_dir() {
            warn!("AI script path '{}' is not a directory; no AI files to link", dir.display());
            return Self::default();
        }

        let mut found = Vec::new();
        for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("skipping unreadable entry in '{}': {e}", dir.display());
                    continue;
                },
            };
            let path = entry.path();
            let matches_ext = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case(extension));
            if !entry.file_type().is_file() || !matches_ext {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                found.push((stem.to_string(), path.to_path_buf()));
            }
        }
        found.sort_by(|(a, _), (b, _)| entity_order(a, b));

        info!("found {} AI files in '{}'", found.len(), dir.display());
        Self {
            files: found.into_iter().collect(),
        }
    }

    pub fn path_of(&self, entity_id: &str) -> Option<&Path> {
        self.files.get(entity_id).map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl ScriptSource for DirectoryScripts {
    fn entity_ids(&self) -> Vec<TaskId> {
        self.files.keys().cloned().collect()
    }

    fn read_lines(&self, entity_id: &str) -> Result<Vec<String>> {
        let path = self
            .path_of(entity_id)
            .ok_or_else(|| anyhow!("no AI script indexed for entity {entity_id}"))?;
        read_lines(path).with_context(|| format!("reading AI script for entity {entity_id}"))
    }
}

/// Scripts held in memory, keyed by entity id.
#[derive(Debug, Clone, Default)]
pub struct MemoryScripts {
    scripts: IndexMap<TaskId, Vec<String>>,
}

impl MemoryScripts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) the script for `entity_id`.
    pub fn with_script(mut self, entity_id: impl Into<TaskId>, text: &str) -> Self {
        self.insert(entity_id, text);
        self
    }

    pub fn insert(&mut self, entity_id: impl Into<TaskId>, text: &str) {
        self.scripts
            .insert(entity_id.into(), text.lines().map(str::to_string).collect());
    }
}

impl ScriptSource for MemoryScripts {
    fn entity_ids(&self) -> Vec<TaskId> {
        let mut ids: Vec<TaskId> = self.scripts.keys().cloned().collect();
        ids.sort_by(|a, b| entity_order(a, b));
        ids
    }

    fn read_lines(&self, entity_id: &str) -> Result<Vec<String>> {
        self.scripts
            .get(entity_id)
            .cloned()
            .ok_or_else(|| anyhow!("no AI script for entity {entity_id}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn entity_ids_sort_numerically_then_lexically() {
        let mut ids = vec!["10", "abc", "2", "-1", "Abc", "02"];
        ids.sort_by(|a, b| entity_order(a, b));
        assert_eq!(ids, vec!["-1", "02", "2", "10", "Abc", "abc"]);
    }

    #[test]
    fn scan_indexes_matching_files_only() -> Result<()> {
        let dir = tempdir()?;
        fs::write(dir.path().join("12.qsc"), "Task_New(12, \"HumanAI\")")?;
        fs::write(dir.path().join("7.QSC"), "")?;
        fs::write(dir.path().join("notes.txt"), "")?;
        fs::create_dir_all(dir.path().join("3.qsc.d"))?;
        fs::create_dir_all(dir.path().join("nested"))?;
        fs::write(dir.path().join("nested/9.qsc"), "")?;

        let scripts = DirectoryScripts::scan(dir.path(), "qsc");
        assert_eq!(scripts.entity_ids(), vec!["7".to_string(), "12".to_string()]);
        assert_eq!(scripts.read_lines("12")?, vec!["Task_New(12, \"HumanAI\")".to_string()]);
        assert!(scripts.read_lines("9").is_err());
        Ok(())
    }

    #[test]
    fn missing_directory_is_an_empty_index() -> Result<()> {
        let dir = tempdir()?;
        let scripts = DirectoryScripts::scan(&dir.path().join("ai"), "qsc");
        assert!(scripts.is_empty());
        Ok(())
    }

    #[test]
    fn file_in_place_of_directory_is_an_empty_index() -> Result<()> {
        let dir = tempdir()?;
        let not_a_dir = dir.path().join("ai");
        fs::write(&not_a_dir, "Task_New(7, \"HumanAI\")")?;
        let scripts = DirectoryScripts::scan(&not_a_dir, "qsc");
        assert!(scripts.is_empty());
        assert!(scripts.entity_ids().is_empty());
        Ok(())
    }

    #[test]
    fn memory_scripts_behave_like_a_directory() {
        let scripts = MemoryScripts::new()
            .with_script("20", "a\nb")
            .with_script("3", "c");
        assert_eq!(scripts.entity_ids(), vec!["3".to_string(), "20".to_string()]);
        assert_eq!(scripts.read_lines("20").unwrap(), vec!["a".to_string(), "b".to_string()]);
        assert!(scripts.read_lines("4").is_err());
    }
}
