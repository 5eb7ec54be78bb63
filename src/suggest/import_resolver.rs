//! Auto-import resolution for failed member-access completions
//!
//! When a `.`-triggered completion on an unimported package yields nothing,
//! the pipeline resolves the package identifier to an import path, inserts an
//! import declaration into a copy of the buffer, and retries the query once
//! against the patched text. Any failure here falls back silently to the
//! original empty result.

use std::collections::HashMap;

use tracing::debug;

/// Maps short package identifiers to candidate import paths.
#[async_trait::async_trait]
pub trait PackageIndex: Send + Sync {
    async fn all_packages(&self) -> HashMap<String, Vec<String>>;
    async fn is_vendor_supported(&self) -> bool;
}

/// A buffer copy with an import inserted, and the cursor offset shifted past
/// the inserted bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchedBuffer {
    pub text: String,
    pub offset: usize,
}

/// Resolve `package` to an import path and synthesize a patched buffer.
///
/// Returns `None` when the identifier is unknown, or when the buffer has no
/// structure to hang an import on.
pub async fn resolve(
    index: &dyn PackageIndex,
    buffer: &str,
    offset: usize,
    package: &str,
) -> Option<PatchedBuffer> {
    let packages = index.all_packages().await;
    let candidates = packages.get(package)?;
    if candidates.is_empty() {
        return None;
    }

    // Multiple candidates: prefer a vendored path when the toolchain
    // understands vendoring; otherwise take the first. Finer disambiguation
    // (project root proximity) belongs to the index, which orders its lists.
    let path = if candidates.len() > 1 && index.is_vendor_supported().await {
        candidates
            .iter()
            .find(|p| p.contains("/vendor/"))
            .unwrap_or(&candidates[0])
    } else {
        &candidates[0]
    };

    debug!("retrying completion with import of {}", path);
    insert_import(buffer, path, offset)
}

/// Insert an import declaration for `path`, preferring the existing grouped
/// block, then an existing single import, then the package clause.
fn insert_import(buffer: &str, path: &str, offset: usize) -> Option<PatchedBuffer> {
    let (position, inserted) = if let Some(block) = find_line_start(buffer, "import (") {
        let line_end = buffer[block..].find('\n').map(|i| block + i + 1)?;
        (line_end, format!("\t\"{path}\"\n"))
    } else if let Some(single) = find_line_start(buffer, "import ") {
        (single, format!("import \"{path}\"\n"))
    } else if let Some(clause) = find_line_start(buffer, "package ") {
        let line_end = buffer[clause..].find('\n').map(|i| clause + i + 1)?;
        (line_end, format!("\nimport \"{path}\"\n"))
    } else {
        return None;
    };

    let mut text = String::with_capacity(buffer.len() + inserted.len());
    text.push_str(&buffer[..position]);
    text.push_str(&inserted);
    text.push_str(&buffer[position..]);

    let offset = if position <= offset {
        offset + inserted.len()
    } else {
        offset
    };
    Some(PatchedBuffer { text, offset })
}

/// Byte position of the first line whose trimmed text starts with `needle`.
fn find_line_start(buffer: &str, needle: &str) -> Option<usize> {
    let mut position = 0;
    for line in buffer.split_inclusive('\n') {
        if line.trim_start().starts_with(needle) {
            return Some(position);
        }
        position += line.len();
    }
    None
}
