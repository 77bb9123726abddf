// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Document Management
//!
//! An open editor document: the editable text and the latest parse session.
//!
//! ## Overview
//!
//! - Edits go to a [`Rope`]; the session is not touched and the document is
//!   marked dirty
//! - [`Document::reparse`] builds a brand-new [`ParseSession`] and swaps it
//!   in; readers holding the previous `Arc` keep a complete snapshot
//! - When the grammar fails to build a tree the previous session stays
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut document = Document::open("SELECT * FROM dbo.Orders", 1, &grammar, &validator)?;
//! document.apply_change(14..24, "dbo.Customers", 2)?;
//! let session = document.reparse(&grammar, &validator)?;
//! assert!(session.diagnostics().is_empty());
//! ```

use std::ops::Range;
use std::sync::Arc;

use ropey::Rope;
use tracing::{debug, warn};
use tsql_insight_grammar::Grammar;
use tsql_insight_semantic::{ParseSession, SessionResult, Validator};

use crate::error::{EngineError, EngineResult};

/// An open document
#[derive(Debug, Clone)]
pub struct Document {
    /// Current text, including edits not parsed yet
    text: Rope,
    /// Version reported by the editor
    version: i32,
    /// Session of the last successful parse
    session: Arc<ParseSession>,
    /// Whether the text changed since the session was built
    dirty: bool,
}

impl Document {
    /// Open a document and parse it
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoTree` when the grammar cannot build a tree.
    pub fn open(
        text: &str,
        version: i32,
        grammar: &dyn Grammar,
        validator: &Validator<'_>,
    ) -> SessionResult<Self> {
        let session = ParseSession::build(text, grammar, validator)?;
        Ok(Self {
            text: Rope::from_str(text),
            version,
            session: Arc::new(session),
            dirty: false,
        })
    }

    /// Replace a character range
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidEdit` when the range is reversed or ends
    /// past the document.
    pub fn apply_change(&mut self, range: Range<usize>, text: &str, version: i32) -> EngineResult<()> {
        let len = self.text.len_chars();
        if range.start > range.end || range.end > len {
            return Err(EngineError::InvalidEdit {
                start: range.start,
                end: range.end,
                len,
            });
        }
        self.text.remove(range.clone());
        self.text.insert(range.start, text);
        self.version = version;
        self.dirty = true;
        debug!(
            start = range.start,
            end = range.end,
            inserted = text.chars().count(),
            version,
            "Document edited"
        );
        Ok(())
    }

    /// Replace the whole text
    pub fn replace_all(&mut self, text: &str, version: i32) {
        self.text = Rope::from_str(text);
        self.version = version;
        self.dirty = true;
    }

    /// Parse the current text and swap in the new session
    ///
    /// # Errors
    ///
    /// Returns the session error and keeps the previous session when the
    /// grammar cannot build a tree.
    pub fn reparse(
        &mut self,
        grammar: &dyn Grammar,
        validator: &Validator<'_>,
    ) -> SessionResult<Arc<ParseSession>> {
        let text = self.text.to_string();
        match ParseSession::build(&text, grammar, validator) {
            Ok(session) => {
                self.session = Arc::new(session);
                self.dirty = false;
                Ok(Arc::clone(&self.session))
            }
            Err(err) => {
                warn!(version = self.version, error = %err, "Reparse failed, keeping previous session");
                Err(err)
            }
        }
    }

    pub fn text(&self) -> &Rope {
        &self.text
    }

    pub fn version(&self) -> i32 {
        self.version
    }

    /// Session of the last successful parse
    pub fn session(&self) -> Arc<ParseSession> {
        Arc::clone(&self.session)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn line_count(&self) -> usize {
        self.text.len_lines()
    }
}
