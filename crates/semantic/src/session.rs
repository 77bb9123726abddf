// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Parse Sessions
//!
//! A [`ParseSession`] is the immutable snapshot of one parse: text, tree,
//! token stream, temp-object registry and diagnostics. A reparse builds a new
//! session; nothing in a built session ever changes.

use ropey::Rope;
use tracing::{debug, warn};
use tsql_insight_context::{
    NodeKindClassifier, OffsetResolver, ScopeCollector, ScopeResult, TokenOffset,
};
use tsql_insight_grammar::{Grammar, NodeId, SyntaxTree, TokenStream};

use crate::diagnostic::ParseDiagnostic;
use crate::error::{SessionError, SessionResult};
use crate::registry::TempObjectRegistry;
use crate::validator::{ValidationOutput, Validator};

/// Immutable snapshot of one parsed document
#[derive(Debug)]
pub struct ParseSession {
    text: Rope,
    tree: SyntaxTree,
    registry: TempObjectRegistry,
    diagnostics: Vec<ParseDiagnostic>,
}

impl ParseSession {
    /// Parse `text` and validate the result
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoTree` when the grammar cannot produce any
    /// tree. Syntax errors in the document are diagnostics, not errors.
    pub fn build(text: &str, grammar: &dyn Grammar, validator: &Validator<'_>) -> SessionResult<Self> {
        let output = grammar.parse(text);
        let Some(tree) = output.tree else {
            warn!(grammar = grammar.name(), "Grammar produced no syntax tree");
            return Err(SessionError::NoTree {
                grammar: grammar.name().to_string(),
                errors: output.syntax_errors.len(),
            });
        };

        let text = Rope::from_str(text);
        let ValidationOutput {
            registry,
            diagnostics,
        } = validator.validate(&tree, &text, &output.syntax_errors);

        debug!(
            grammar = grammar.name(),
            tokens = tree.tokens().len(),
            nodes = tree.len(),
            diagnostics = diagnostics.len(),
            "Parse session built"
        );
        Ok(Self {
            text,
            tree,
            registry,
            diagnostics,
        })
    }

    pub fn text(&self) -> &Rope {
        &self.text
    }

    pub fn tree(&self) -> &SyntaxTree {
        &self.tree
    }

    /// All tokens, hidden channel included
    pub fn tokens(&self) -> &TokenStream {
        self.tree.tokens()
    }

    pub fn registry(&self) -> &TempObjectRegistry {
        &self.registry
    }

    pub fn diagnostics(&self) -> &[ParseDiagnostic] {
        &self.diagnostics
    }

    /// Document length in characters
    pub fn len_chars(&self) -> usize {
        self.text.len_chars()
    }

    /// 0-based line of a character offset, clamped to the document
    pub fn line_of(&self, offset: usize) -> usize {
        self.text.char_to_line(offset.min(self.text.len_chars()))
    }

    /// Tree position of a caret offset
    pub fn resolve_offset(&self, offset: usize) -> Option<TokenOffset> {
        OffsetResolver.resolve(&self.tree, offset)
    }

    /// Sources visible at `position`
    pub fn collect_scope(
        &self,
        classifier: &NodeKindClassifier,
        position: NodeId,
        default_database: &str,
    ) -> ScopeResult {
        ScopeCollector::new(classifier).collect(&self.tree, position, default_database)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsql_insight_catalog::ConnectionContext;
    use tsql_insight_grammar::ParseOutput;
    use tsql_insight_test_utils::{FixtureGrammar, STANDARD_DATABASE, standard_catalog};

    struct BrokenGrammar;

    impl Grammar for BrokenGrammar {
        fn name(&self) -> &str {
            "broken"
        }

        fn parse(&self, _text: &str) -> ParseOutput {
            ParseOutput::failed(Vec::new())
        }
    }

    #[test]
    fn test_missing_tree_is_a_setup_error() {
        let classifier = NodeKindClassifier::tsql();
        let catalogs = standard_catalog();
        let connection = ConnectionContext::new("test", STANDARD_DATABASE);
        let validator = Validator::new(&classifier, catalogs.as_ref(), &connection);

        let err = ParseSession::build("SELECT 1", &BrokenGrammar, &validator).unwrap_err();
        assert_eq!(
            err,
            SessionError::NoTree {
                grammar: "broken".to_string(),
                errors: 0
            }
        );
    }

    #[test]
    fn test_line_of_clamps() {
        let classifier = NodeKindClassifier::tsql();
        let catalogs = standard_catalog();
        let connection = ConnectionContext::new("test", STANDARD_DATABASE);
        let validator = Validator::new(&classifier, catalogs.as_ref(), &connection);

        let session =
            ParseSession::build("SELECT 1\nSELECT 2", &FixtureGrammar::new(), &validator).unwrap();
        assert_eq!(session.line_of(0), 0);
        assert_eq!(session.line_of(9), 1);
        assert_eq!(session.line_of(1000), 1);
        assert_eq!(session.len_chars(), 17);
    }
}
