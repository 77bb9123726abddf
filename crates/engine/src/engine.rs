// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Engine Façade
//!
//! [`SqlEngine`] bundles the collaborators an editor host needs (grammar,
//! catalog provider, rule oracle, action configuration, template service)
//! and exposes the four produced operations:
//!
//! - [`SqlEngine::diagnostics`]
//! - [`SqlEngine::completion_items`]
//! - [`SqlEngine::link_action`]
//! - [`SqlEngine::tool_tip`]
//!
//! All four are pure reads over one immutable [`ParseSession`].

use std::sync::Arc;

use tracing::{debug, info};
use tsql_insight_catalog::{CatalogProvider, ConnectionContext};
use tsql_insight_context::NodeKindClassifier;
use tsql_insight_grammar::{Grammar, RuleOracle};
use tsql_insight_semantic::{ParseDiagnostic, ParseSession, Validator};

use crate::actions::{ActionConfig, ConfiguredActions};
use crate::completion::{CompletionEngine, CompletionResult};
use crate::config::EngineConfig;
use crate::document::Document;
use crate::error::EngineResult;
use crate::hover::{ToolTip, TooltipResolver};
use crate::link::{LinkAction, LinkResolver};
use crate::template::{JinjaTemplates, TemplateService, TooltipTemplates};

/// T-SQL intelligence engine for one connection
pub struct SqlEngine {
    config: EngineConfig,
    connection: ConnectionContext,
    classifier: NodeKindClassifier,
    grammar: Arc<dyn Grammar>,
    catalogs: Arc<dyn CatalogProvider>,
    oracle: Arc<dyn RuleOracle>,
    actions: Arc<dyn ActionConfig>,
    templates: Arc<dyn TemplateService>,
    tooltip_templates: TooltipTemplates,
}

impl SqlEngine {
    /// Create an engine
    ///
    /// Link actions come from `config.actions` and templates are rendered by
    /// [`JinjaTemplates`] unless replaced through the builder methods.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Config` when the configuration is invalid.
    pub fn new(
        config: EngineConfig,
        grammar: Arc<dyn Grammar>,
        catalogs: Arc<dyn CatalogProvider>,
        oracle: Arc<dyn RuleOracle>,
    ) -> EngineResult<Self> {
        config.validate()?;
        let connection = config.connection_context();
        let actions: Arc<dyn ActionConfig> = Arc::new(ConfiguredActions::new(config.actions.clone()));
        let tooltip_templates = TooltipTemplates::with_overrides(&config.tooltip_templates);
        info!(
            connection = %connection.connection_id,
            database = %connection.default_database,
            dialect = connection.dialect.as_str(),
            grammar = grammar.name(),
            "Engine created"
        );
        Ok(Self {
            config,
            connection,
            classifier: NodeKindClassifier::tsql(),
            grammar,
            catalogs,
            oracle,
            actions,
            templates: Arc::new(JinjaTemplates::new()),
            tooltip_templates,
        })
    }

    /// Builder method: replace the link action source
    pub fn with_action_config(mut self, actions: Arc<dyn ActionConfig>) -> Self {
        self.actions = actions;
        self
    }

    /// Builder method: replace the template renderer
    pub fn with_template_service(mut self, templates: Arc<dyn TemplateService>) -> Self {
        self.templates = templates;
        self
    }

    /// Builder method: use a classifier for another grammar's rule table
    pub fn with_classifier(mut self, classifier: NodeKindClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn connection(&self) -> &ConnectionContext {
        &self.connection
    }

    pub fn classifier(&self) -> &NodeKindClassifier {
        &self.classifier
    }

    /// Validator bound to this engine's catalog and connection
    pub fn validator(&self) -> Validator<'_> {
        Validator::new(&self.classifier, self.catalogs.as_ref(), &self.connection)
    }

    /// Parse and validate a text into a fresh session
    pub fn parse(&self, text: &str) -> EngineResult<Arc<ParseSession>> {
        let session = ParseSession::build(text, self.grammar.as_ref(), &self.validator())?;
        Ok(Arc::new(session))
    }

    /// Open a document
    pub fn open_document(&self, text: &str, version: i32) -> EngineResult<Document> {
        Ok(Document::open(text, version, self.grammar.as_ref(), &self.validator())?)
    }

    /// Reparse a document, swapping in the new session
    pub fn reparse(&self, document: &mut Document) -> EngineResult<Arc<ParseSession>> {
        Ok(document.reparse(self.grammar.as_ref(), &self.validator())?)
    }

    /// Syntax and semantic diagnostics of a session
    pub fn diagnostics<'s>(&self, session: &'s ParseSession) -> &'s [ParseDiagnostic] {
        session.diagnostics()
    }

    /// Completion items at a caret offset
    ///
    /// An offset outside the document yields an empty result.
    pub fn completion_items(&self, session: &ParseSession, offset: usize) -> CompletionResult {
        let Some(at) = session.resolve_offset(offset) else {
            debug!(offset, len = session.len_chars(), "Completion offset outside document");
            return CompletionResult::default();
        };
        CompletionEngine::new(&self.classifier, &self.connection)
            .with_max_items(self.config.completion.max_items)
            .suggest(
                session,
                &at,
                self.catalogs.as_ref(),
                self.oracle.as_ref(),
                &self.connection.default_database,
            )
    }

    /// Link over the object name at `offset`
    pub fn link_action(&self, session: &ParseSession, offset: usize) -> Option<LinkAction> {
        LinkResolver::new(&self.classifier, &self.connection).resolve_link(
            session,
            offset,
            self.actions.as_ref(),
            self.templates.as_ref(),
        )
    }

    /// Tooltip for the object name at `offset`
    pub fn tool_tip(&self, session: &ParseSession, offset: usize) -> Option<ToolTip> {
        TooltipResolver::new(&self.classifier, &self.connection, &self.tooltip_templates)
            .resolve_tooltip(
                session,
                offset,
                self.catalogs.as_ref(),
                self.templates.as_ref(),
            )
    }
}
