// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Diagnostics produced for one parse

use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

/// Severity level of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

/// Stable identifier of the rule that produced a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticCode {
    SyntaxError,
    TautologicalComparison,
    MissingTempTable,
    MissingTable,
}

impl DiagnosticCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticCode::SyntaxError => "syntax-error",
            DiagnosticCode::TautologicalComparison => "tautological-comparison",
            DiagnosticCode::MissingTempTable => "missing-temp-table",
            DiagnosticCode::MissingTable => "missing-table",
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An inline diagnostic
///
/// Offsets are character offsets into the document; `line` is the 0-based
/// line of `start_offset`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseDiagnostic {
    pub message: String,
    pub line: usize,
    pub start_offset: usize,
    pub length: usize,
    pub severity: Severity,
    pub code: DiagnosticCode,
}

impl ParseDiagnostic {
    pub fn new(
        code: DiagnosticCode,
        severity: Severity,
        message: impl Into<String>,
        line: usize,
        range: Range<usize>,
    ) -> Self {
        Self {
            message: message.into(),
            line,
            start_offset: range.start,
            length: range.end.saturating_sub(range.start),
            severity,
            code,
        }
    }

    pub fn end_offset(&self) -> usize {
        self.start_offset + self.length
    }

    pub fn range(&self) -> Range<usize> {
        self.start_offset..self.end_offset()
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}
