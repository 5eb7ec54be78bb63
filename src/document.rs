//! Open document state and buffer accessors
//!
//! Tracks the text of open documents and provides the position primitives the
//! pipeline consumes: UTF-8 byte offsets (gocode's positional protocol is
//! byte-offset based, which matters for multi-byte content), completion
//! prefix extraction, and a lightweight scope-descriptor lookup used by the
//! suppression pre-check.

use std::path::PathBuf;

use ropey::Rope;
use tower_lsp::lsp_types::{Position, TextDocumentContentChangeEvent, Url};

use crate::config::IMPORT_SCOPE;

/// State for an open text document.
#[derive(Debug, Clone)]
pub struct DocumentState {
    pub uri: Url,
    pub text: Rope,
    pub version: i32,
}

impl DocumentState {
    pub fn new(uri: Url, text: &str, version: i32) -> Self {
        DocumentState {
            uri,
            text: Rope::from_str(text),
            version,
        }
    }

    /// Absolute filesystem path, when the document is backed by a file.
    pub fn file_path(&self) -> Option<PathBuf> {
        self.uri.to_file_path().ok()
    }

    /// Apply LSP content changes in order.
    pub fn apply(&mut self, changes: Vec<TextDocumentContentChangeEvent>, version: i32) {
        for change in &changes {
            if let Some(range) = change.range {
                let start = self.char_index(range.start);
                let end = self.char_index(range.end);
                self.text.remove(start..end);
                self.text.insert(start, &change.text);
            } else {
                self.text = Rope::from_str(&change.text);
            }
        }
        self.version = version;
    }

    fn char_index(&self, position: Position) -> usize {
        let line = (position.line as usize).min(self.text.len_lines().saturating_sub(1));
        let index = self.text.line_to_char(line) + position.character as usize;
        index.min(self.text.len_chars())
    }

    /// UTF-8 byte offset of a cursor position.
    pub fn byte_offset(&self, position: Position) -> usize {
        self.text.char_to_byte(self.char_index(position))
    }

    /// Character immediately preceding the cursor, if any.
    pub fn char_before(&self, position: Position) -> Option<char> {
        let index = self.char_index(position);
        if index == 0 {
            return None;
        }
        Some(self.text.char(index - 1))
    }

    /// The completion prefix at the cursor: the identifier run immediately
    /// before it, or the member-access trigger `.` when the cursor directly
    /// follows a dot.
    pub fn prefix(&self, position: Position) -> String {
        let end = self.char_index(position);
        let start = self.text.line_to_char((position.line as usize).min(
            self.text.len_lines().saturating_sub(1),
        ));
        let line: String = self.text.slice(start..end).to_string();

        let identifier: String = line
            .chars()
            .rev()
            .take_while(|c| c.is_alphanumeric() || *c == '_')
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        if !identifier.is_empty() {
            return identifier;
        }
        if line.ends_with('.') {
            return ".".to_string();
        }
        String::new()
    }

    /// Identifier immediately before the member-access dot at the cursor.
    /// Used by the auto-import retry to name the referenced package.
    pub fn ident_before_dot(&self, position: Position) -> Option<String> {
        let end = self.char_index(position);
        let start = self.text.line_to_char((position.line as usize).min(
            self.text.len_lines().saturating_sub(1),
        ));
        let line: String = self.text.slice(start..end).to_string();
        let before_dot = line.strip_suffix('.')?;
        let identifier: String = before_dot
            .chars()
            .rev()
            .take_while(|c| c.is_alphanumeric() || *c == '_')
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        (!identifier.is_empty()).then_some(identifier)
    }

    /// Scope descriptors at a position.
    ///
    /// A lightweight line scanner, not a Go lexer: it classifies line
    /// comments, block comments, quoted strings, and import declarations,
    /// which is all the suppression pre-check consumes.
    pub fn scopes(&self, position: Position) -> Vec<String> {
        let mut scopes = vec!["source.go".to_string()];

        let offset = self.byte_offset(position);
        let head = self.text.byte_slice(..offset).to_string();

        // Unterminated block comment before the cursor.
        let after_open = head.rfind("/*").map(|i| &head[i..]);
        if let Some(tail) = after_open {
            if !tail.contains("*/") {
                scopes.push("comment.block.go".to_string());
                return scopes;
            }
        }

        let line_start = head.rfind('\n').map(|i| i + 1).unwrap_or(0);
        let line = &head[line_start..];

        let mut in_string = false;
        let mut in_raw_string = head[..line_start].matches('`').count() % 2 == 1;
        let mut previous = '\0';
        for c in line.chars() {
            match c {
                '"' if !in_raw_string && previous != '\\' => in_string = !in_string,
                '`' => in_raw_string = !in_raw_string,
                '/' if previous == '/' && !in_string && !in_raw_string => {
                    scopes.push("comment.line.double-slash.go".to_string());
                    return scopes;
                }
                _ => {}
            }
            previous = c;
        }

        if in_string || in_raw_string {
            scopes.push("string.quoted.double.go".to_string());
            if self.in_import_declaration(position) {
                scopes.push(IMPORT_SCOPE.to_string());
            }
        }

        scopes
    }

    /// Whether the position sits inside an import declaration: a line
    /// starting with `import`, or inside a grouped `import (...)` block.
    fn in_import_declaration(&self, position: Position) -> bool {
        let line_index = (position.line as usize).min(self.text.len_lines().saturating_sub(1));
        for i in (0..=line_index).rev() {
            let line: String = self.text.line(i).to_string();
            let trimmed = line.trim();
            if trimmed.starts_with("import") {
                return true;
            }
            if i < line_index && (trimmed == ")" || trimmed.starts_with("func")
                || trimmed.starts_with("var") || trimmed.starts_with("const")
                || trimmed.starts_with("type"))
            {
                return false;
            }
        }
        false
    }
}
