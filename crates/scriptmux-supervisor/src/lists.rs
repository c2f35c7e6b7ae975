//! Bash-array list files.
//!
//! Download scripts read their inputs from env files holding one named
//! array literal:
//!
//! ```text
//! declare -a VIDEO_SOURCES=(
//! "https://example.com/a"
//! "https://example.com/b"
//! )
//! ```
//!
//! Reads pick the first block for the array; writes replace that one block
//! and leave the rest of the file as it was.

use std::ops::Range;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::SupervisorError;

/// A named list stored as a bash array inside an env file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListSpec {
    pub name: String,
    pub path: PathBuf,
    /// Left-hand side of the assignment, e.g. `declare -a PLAYLISTS`.
    pub array: String,
}

/// The `videos` and `songs` lists the download scripts ship with.
pub fn default_lists(script_dir: &Path) -> Vec<ListSpec> {
    vec![
        ListSpec {
            name: "videos".into(),
            path: script_dir.join(".videos-env"),
            array: "declare -a VIDEO_SOURCES".into(),
        },
        ListSpec {
            name: "songs".into(),
            path: script_dir.join(".songs-env"),
            array: "declare -a PLAYLISTS".into(),
        },
    ]
}

/// Byte ranges of the whole `ARRAY=(\n...\n)` block and of its body.
fn find_block(content: &str, array: &str) -> Option<(Range<usize>, Range<usize>)> {
    let header = format!("{array}=(\n");
    let start = content.find(&header)?;
    let body_start = start + header.len();
    let close = content[body_start..].find("\n)")? + body_start;
    Some((start..close + 2, body_start..close))
}

/// Entries of the first `array` block, or `None` if there is no block.
pub fn parse_array(content: &str, array: &str) -> Option<Vec<String>> {
    let (_, body) = find_block(content, array)?;
    Some(
        content[body]
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(|line| line.trim_matches('"').to_string())
            .collect(),
    )
}

pub fn render_array(array: &str, entries: &[String]) -> String {
    let mut out = format!("{array}=(\n");
    if entries.is_empty() {
        // Keep the block readable by parse_array.
        out.push('\n');
    }
    for entry in entries {
        out.push('"');
        out.push_str(entry);
        out.push_str("\"\n");
    }
    out.push(')');
    out
}

/// Replace the first `array` block of `content` with `entries`.
pub fn replace_array(content: &str, array: &str, entries: &[String]) -> Option<String> {
    let (block, _) = find_block(content, array)?;
    let mut out = String::with_capacity(content.len());
    out.push_str(&content[..block.start]);
    out.push_str(&render_array(array, entries));
    out.push_str(&content[block.end..]);
    Some(out)
}

/// Trim incoming entries and drop empty ones.
pub fn clean_entries<I, S>(entries: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    entries
        .into_iter()
        .map(|e| e.as_ref().trim().to_string())
        .filter(|e| !e.is_empty())
        .collect()
}

/// Read a list. A missing file or block reads as empty.
pub async fn read_list(spec: &ListSpec) -> Vec<String> {
    match tokio::fs::read_to_string(&spec.path).await {
        Ok(content) => parse_array(&content, &spec.array).unwrap_or_default(),
        Err(e) => {
            tracing::debug!(list = %spec.name, path = %spec.path.display(), error = %e, "list file unreadable");
            Vec::new()
        }
    }
}

/// Rewrite a list's array block in place.
pub async fn write_list(spec: &ListSpec, entries: &[String]) -> Result<(), SupervisorError> {
    let content = tokio::fs::read_to_string(&spec.path).await?;
    let updated = replace_array(&content, &spec.array, entries).ok_or_else(|| {
        SupervisorError::ArrayBlockNotFound {
            array: spec.array.clone(),
            path: spec.path.clone(),
        }
    })?;
    tokio::fs::write(&spec.path, updated).await?;
    tracing::info!(list = %spec.name, entries = entries.len(), "list updated");
    Ok(())
}
