//! Lookup tables loaded from the auxiliary JSON files.
//!
//! Both tables are JSON arrays of objects. Elements missing the expected
//! fields are skipped; a document that is not an array is rejected.

use std::path::Path;

use anyhow::{Context, Result, bail};
use indexmap::IndexMap;
use lazy_static::lazy_static;
use log::{debug, info};
use mission_data::{GraphAreaRow, ModelRow};
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::io::read_json;

/// Display name used when a model id has no entry in the model table.
pub const UNKNOWN_MODEL: &str = "Unknown";
/// Area name used when a graph id has no entry in the graph table.
pub const UNKNOWN_AREA: &str = "Unknown Area";

lazy_static! {
    static ref GRAPH_KEY: Regex = Regex::new(r"^\s*Graph\s*#\s*(\d+)\s*$").expect("valid graph key pattern");
}

/// Key format used by the graph area table.
pub fn graph_key(graph_id: u32) -> String {
    format!("Graph #{graph_id}")
}

/// Soldier model id to display name.
#[derive(Debug, Clone, Default)]
pub struct ModelTable {
    names: IndexMap<String, String>,
}

impl ModelTable {
    /// Build the table from rows; the first row for a model id wins.
    pub fn from_rows(rows: impl IntoIterator<Item = ModelRow>) -> Self {
        let mut names = IndexMap::new();
        for row in rows {
            names.entry(row.model_id).or_insert(row.model_name);
        }
        Self { names }
    }

    /// Build the table from a parsed JSON document.
    ///
    /// # Errors
    /// Returns an error if the document is not a JSON array.
    pub fn from_json(value: &Value) -> Result<Self> {
        Ok(Self::from_rows(rows_from_json::<ModelRow>(value, "model")?))
    }

    pub fn get(&self, model_id: &str) -> Option<&str> {
        self.names.get(model_id).map(String::as_str)
    }

    /// Display name for `model_id`, or [`UNKNOWN_MODEL`].
    pub fn display_name(&self, model_id: &str) -> &str {
        self.get(model_id).unwrap_or(UNKNOWN_MODEL)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Graph key (`Graph #<n>`) to area name.
#[derive(Debug, Clone, Default)]
pub struct GraphAreas {
    areas: IndexMap<String, String>,
}

impl GraphAreas {
    /// Build the table from rows; the first row for a graph wins.
    ///
    /// Keys are normalized to `Graph #<n>` so spacing differences in the
    /// source table do not hide an entry.
    pub fn from_rows(rows: impl IntoIterator<Item = GraphAreaRow>) -> Self {
        let mut areas = IndexMap::new();
        for row in rows {
            let graph_id = GRAPH_KEY
                .captures(&row.graph)
                .and_then(|caps| caps[1].parse::<u32>().ok());
            let key = match graph_id {
                Some(id) => graph_key(id),
                None => row.graph,
            };
            areas.entry(key).or_insert(row.area);
        }
        Self { areas }
    }

    /// Build the table from a parsed JSON document.
    ///
    /// # Errors
    /// Returns an error if the document is not a JSON array.
    pub fn from_json(value: &Value) -> Result<Self> {
        Ok(Self::from_rows(rows_from_json::<GraphAreaRow>(value, "graph area")?))
    }

    /// Area name for a graph id.
    pub fn area(&self, graph_id: u32) -> Option<&str> {
        self.area_for_key(&graph_key(graph_id))
    }

    /// Area name for a formatted `Graph #<n>` key.
    pub fn area_for_key(&self, key: &str) -> Option<&str> {
        self.areas.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.areas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }
}

/// Load the model table from a JSON file.
///
/// # Errors
/// Returns an error if the file cannot be read, parsed, or is not an array.
pub fn load_model_table(path: &Path) -> Result<ModelTable> {
    let value = read_json(path)?;
    let table = ModelTable::from_json(&value).with_context(|| format!("loading model table '{}'", path.display()))?;
    info!("{} soldier models loaded from '{}'", table.len(), path.display());
    Ok(table)
}

/// Load the graph area table from a JSON file.
///
/// # Errors
/// Returns an error if the file cannot be read, parsed, or is not an array.
pub fn load_graph_areas(path: &Path) -> Result<GraphAreas> {
    let value = read_json(path)?;
    let table =
        GraphAreas::from_json(&value).with_context(|| format!("loading graph area table '{}'", path.display()))?;
    info!("{} graph areas loaded from '{}'", table.len(), path.display());
    Ok(table)
}

fn rows_from_json<T: DeserializeOwned>(value: &Value, table: &str) -> Result<Vec<T>> {
    let Some(elements) = value.as_array() else {
        bail!("{table} table must be a JSON array");
    };
    let mut rows = Vec::with_capacity(elements.len());
    for (index, element) in elements.iter().enumerate() {
        match serde_json::from_value::<T>(element.clone()) {
            Ok(row) => rows.push(row),
            Err(e) => debug!("skipping {table} table entry {index}: {e}"),
        }
    }
    Ok(rows)
}
