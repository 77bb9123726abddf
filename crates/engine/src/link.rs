// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Link Actions
//!
//! Turns the table or routine name under the caret into a clickable link
//! carrying the configured actions for it. The object kind is decided by the
//! syntax alone, so links work without a loaded catalog.

use std::ops::Range;

use serde::Serialize;
use serde_json::json;
use tracing::debug;
use tsql_insight_catalog::{ConnectionContext, DEFAULT_SCHEMA};
use tsql_insight_context::NodeKindClassifier;
use tsql_insight_ir::{ObjectKind, ObjectName};
use tsql_insight_semantic::ParseSession;

use crate::actions::{ActionConfig, ActionDefinition};
use crate::reference::reference_at;
use crate::template::TemplateService;

/// An action with its query bound to one object
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoundAction {
    pub id: String,
    pub title: String,
    pub query: String,
}

/// Link over an object name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkAction {
    pub span: Range<usize>,
    /// Object name with the default database filled in
    pub object: ObjectName,
    pub kind: ObjectKind,
    pub actions: Vec<BoundAction>,
}

/// Link action resolver
pub struct LinkResolver<'a> {
    classifier: &'a NodeKindClassifier,
    connection: &'a ConnectionContext,
}

impl<'a> LinkResolver<'a> {
    pub fn new(classifier: &'a NodeKindClassifier, connection: &'a ConnectionContext) -> Self {
        Self {
            classifier,
            connection,
        }
    }

    /// Resolve the link at `offset`
    ///
    /// Returns `None` when no object name is under the caret, the name goes
    /// through a linked server, or no configured action applies.
    pub fn resolve_link(
        &self,
        session: &ParseSession,
        offset: usize,
        config: &dyn ActionConfig,
        templates: &dyn TemplateService,
    ) -> Option<LinkAction> {
        let reference = reference_at(self.classifier, session.tree(), offset)?;
        if reference.name.is_server_qualified() {
            return None;
        }

        let object = reference
            .name
            .object
            .or_database(&self.connection.default_database);
        let definitions = config.applicable_actions(self.connection.dialect, reference.kind, &object);
        if definitions.is_empty() {
            debug!(object = %object, "No link actions apply");
            return None;
        }

        let actions = definitions
            .iter()
            .map(|definition| self.bind(definition, reference.kind, &object, templates))
            .collect();
        Some(LinkAction {
            span: reference.span,
            object,
            kind: reference.kind,
            actions,
        })
    }

    fn bind(
        &self,
        definition: &ActionDefinition,
        kind: ObjectKind,
        object: &ObjectName,
        templates: &dyn TemplateService,
    ) -> BoundAction {
        let model = json!({
            "database": object.database,
            "schema": object.schema.as_deref().unwrap_or(DEFAULT_SCHEMA),
            "name": object.name,
            "kind": kind.as_str(),
            "dialect": self.connection.dialect.as_str(),
        });
        BoundAction {
            id: definition.id.clone(),
            title: definition.title.clone(),
            query: templates.render(&definition.id, &definition.query, &model),
        }
    }
}
