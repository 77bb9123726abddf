// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # T-SQL Insight - Engine
//!
//! Editor-facing operations over a [`ParseSession`](tsql_insight_semantic::ParseSession):
//! completion, tooltips and link actions, plus the document and host
//! surface.
//!
//! ## Overview
//!
//! - [`CompletionEngine`]: columns, tables and routines at a caret
//! - [`TooltipResolver`]: catalog details of the object under the caret,
//!   rendered through a [`TemplateService`]
//! - [`LinkResolver`]: configured [`ActionConfig`] actions bound to the
//!   object under the caret
//! - [`Document`]: rope text plus the latest session, swapped on reparse
//! - [`SqlEngine`]: façade wiring the collaborators from an [`EngineConfig`]
//! - [`lsp`]: conversion to `lsp-types`
//!
//! ## Examples
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tsql_insight_engine::{EngineConfig, SqlEngine};
//!
//! let config = EngineConfig::from_yaml_str(yaml)?;
//! let engine = SqlEngine::new(config, grammar, catalogs, oracle)?;
//! let session = engine.parse("SELECT  FROM dbo.Orders o")?;
//! let result = engine.completion_items(&session, 7);
//! for item in &result.items {
//!     println!("{}", item.replacement_text);
//! }
//! ```

pub mod actions;
pub mod completion;
pub mod config;
pub mod document;
pub mod engine;
pub mod error;
pub mod hover;
pub mod link;
pub mod lsp;
pub mod reference;
pub mod template;

// Re-exports
pub use actions::{ActionConfig, ActionDefinition, ActionPredicate, ConfiguredActions};
pub use completion::{
    CompletionEngine, CompletionItem, CompletionItemKind, CompletionRenderer, CompletionResult,
};
pub use config::{CompletionConfig, ConfigError, ConfigResult, ConnectionConfig, EngineConfig};
pub use document::Document;
pub use engine::SqlEngine;
pub use error::{EngineError, EngineResult};
pub use hover::{ToolTip, TooltipResolver};
pub use link::{BoundAction, LinkAction, LinkResolver};
pub use reference::{ObjectReference, reference_at};
pub use template::{JinjaTemplates, TemplateService, TooltipTemplates};
