// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Editor protocol conversion
//!
//! Converts engine results into `lsp-types` values. Offsets are character
//! offsets; protocol positions count UTF-16 code units per line, so every
//! conversion goes through the document rope.

use lsp_types::{
    Command, CompletionItem as LspCompletionItem, CompletionItemKind as LspCompletionItemKind,
    CompletionList, Diagnostic, DiagnosticSeverity, Hover, HoverContents, MarkupContent,
    MarkupKind, NumberOrString, Position, Range,
};
use ropey::Rope;
use serde_json::json;
use tsql_insight_semantic::{ParseDiagnostic, Severity};

use crate::completion::{CompletionItem, CompletionItemKind, CompletionResult};
use crate::hover::ToolTip;
use crate::link::LinkAction;

/// Diagnostic source reported to the editor
pub const DIAGNOSTIC_SOURCE: &str = "tsql-insight";

/// Command executed when a link action is picked
pub const RUN_ACTION_COMMAND: &str = "tsql-insight.runAction";

/// Protocol position of a character offset, clamped to the document
pub fn offset_to_position(text: &Rope, offset: usize) -> Position {
    let offset = offset.min(text.len_chars());
    let line = text.char_to_line(offset);
    let line_start = text.line_to_char(line);
    let character = text.char_to_utf16_cu(offset) - text.char_to_utf16_cu(line_start);
    Position::new(line as u32, character as u32)
}

/// Character offset of a protocol position
///
/// A character past the end of the line clamps to the line end. Returns
/// `None` for a line past the end of the document.
pub fn position_to_offset(text: &Rope, position: Position) -> Option<usize> {
    let line = position.line as usize;
    if line >= text.len_lines() {
        return None;
    }
    let line_start = text.line_to_char(line);
    let line_end = if line + 1 < text.len_lines() {
        text.line_to_char(line + 1)
    } else {
        text.len_chars()
    };
    let start_cu = text.char_to_utf16_cu(line_start);
    let end_cu = text.char_to_utf16_cu(line_end);
    let target = (start_cu + position.character as usize).min(end_cu);
    Some(text.utf16_cu_to_char(target))
}

/// Protocol range of a character range
pub fn to_range(text: &Rope, range: std::ops::Range<usize>) -> Range {
    Range::new(
        offset_to_position(text, range.start),
        offset_to_position(text, range.end),
    )
}

pub fn to_lsp_diagnostic(text: &Rope, diagnostic: &ParseDiagnostic) -> Diagnostic {
    let severity = match diagnostic.severity {
        Severity::Error => DiagnosticSeverity::ERROR,
        Severity::Warning => DiagnosticSeverity::WARNING,
    };
    Diagnostic::new(
        to_range(text, diagnostic.range()),
        Some(severity),
        Some(NumberOrString::String(diagnostic.code.as_str().to_string())),
        Some(DIAGNOSTIC_SOURCE.to_string()),
        diagnostic.message.clone(),
        None,
        None,
    )
}

pub fn to_lsp_diagnostics(text: &Rope, diagnostics: &[ParseDiagnostic]) -> Vec<Diagnostic> {
    diagnostics
        .iter()
        .map(|diagnostic| to_lsp_diagnostic(text, diagnostic))
        .collect()
}

fn lsp_kind(kind: CompletionItemKind) -> LspCompletionItemKind {
    match kind {
        CompletionItemKind::Column => LspCompletionItemKind::FIELD,
        CompletionItemKind::Table => LspCompletionItemKind::CLASS,
        CompletionItemKind::View => LspCompletionItemKind::INTERFACE,
        CompletionItemKind::TempTable | CompletionItemKind::TableVariable => {
            LspCompletionItemKind::VARIABLE
        }
        CompletionItemKind::Procedure => LspCompletionItemKind::METHOD,
        CompletionItemKind::Function => LspCompletionItemKind::FUNCTION,
    }
}

/// Completion item with the engine's ordering preserved in `sort_text`
pub fn to_lsp_completion_item(rank: usize, item: &CompletionItem) -> LspCompletionItem {
    LspCompletionItem {
        label: item.replacement_text.clone(),
        kind: Some(lsp_kind(item.kind)),
        detail: item.detail.clone(),
        sort_text: Some(format!("{:04}_{}", rank, item.replacement_text.to_lowercase())),
        filter_text: Some(item.match_parts.join(".")),
        insert_text: Some(item.replacement_text.clone()),
        ..Default::default()
    }
}

/// Completion list; a partial result is reported as incomplete
pub fn to_completion_list(result: &CompletionResult) -> CompletionList {
    CompletionList {
        is_incomplete: result.partial,
        items: result
            .items
            .iter()
            .enumerate()
            .map(|(rank, item)| to_lsp_completion_item(rank, item))
            .collect(),
    }
}

pub fn to_hover(text: &Rope, tooltip: &ToolTip) -> Hover {
    Hover {
        contents: HoverContents::Markup(MarkupContent {
            kind: MarkupKind::Markdown,
            value: tooltip.text.clone(),
        }),
        range: Some(to_range(text, tooltip.span.clone())),
    }
}

/// One command per bound action
///
/// Arguments are the action id, the object name and the bound query.
pub fn to_commands(link: &LinkAction) -> Vec<Command> {
    link.actions
        .iter()
        .map(|action| {
            Command::new(
                action.title.clone(),
                RUN_ACTION_COMMAND.to_string(),
                Some(vec![
                    json!(action.id),
                    json!(link.object.to_string()),
                    json!(action.query),
                ]),
            )
        })
        .collect()
}
