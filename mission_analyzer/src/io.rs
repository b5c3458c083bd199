//! File access used by the analyzer pipeline.
//!
//! Every read and write goes through these helpers so failures carry the path
//! that caused them.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;

/// Read a script file as lines.
///
/// Mission scripts are not guaranteed to be UTF-8, so invalid bytes are
/// replaced instead of failing the read.
///
/// # Errors
/// Returns an error if the file cannot be read.
pub fn read_lines(path: &Path) -> Result<Vec<String>> {
    let bytes = fs::read(path).with_context(|| format!("reading script file '{}'", path.display()))?;
    Ok(String::from_utf8_lossy(&bytes).lines().map(str::to_string).collect())
}

/// Read and parse a JSON document.
///
/// # Errors
/// Returns an error if the file cannot be read or is not valid JSON.
pub fn read_json(path: &Path) -> Result<Value> {
    let text = fs::read_to_string(path).with_context(|| format!("reading JSON file '{}'", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing JSON file '{}'", path.display()))
}

/// Write text, creating the parent directory if needed.
///
/// # Errors
/// Returns an error if the directory cannot be created or the file cannot be written.
pub fn write_text(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).with_context(|| format!("creating output directory '{}'", parent.display()))?;
    }
    fs::write(path, text).with_context(|| format!("writing '{}'", path.display()))
}

/// Serialize `value` as JSON indented by four spaces and write it to `path`.
///
/// # Errors
/// Returns an error if serialization or writing fails.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = to_pretty_json(value)?;
    write_text(path, &json)
}

/// Serialize `value` as JSON indented by four spaces.
///
/// # Errors
/// Returns an error if `value` cannot be serialized.
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer).context("serializing JSON")?;
    String::from_utf8(buf).context("serialized JSON is not UTF-8")
}
