// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Rule oracles for testing
//!
//! [`MockRuleOracle`] answers from a fixed table. [`HeuristicRuleOracle`]
//! guesses the reachable rules from the keyword in front of the caret, which
//! is close enough to a real follow-set computation for end-to-end tests.

use std::collections::{HashMap, HashSet};

use tsql_insight_grammar::rules::tsql;
use tsql_insight_grammar::{RuleId, RuleOracle, TokenStream};

/// Oracle answering from a fixed table
#[derive(Debug, Clone, Default)]
pub struct MockRuleOracle {
    by_index: HashMap<usize, HashSet<RuleId>>,
    fallback: HashSet<RuleId>,
}

impl MockRuleOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Oracle reporting the same rules at every position
    pub fn always(rules: &[RuleId]) -> Self {
        Self {
            by_index: HashMap::new(),
            fallback: rules.iter().copied().collect(),
        }
    }

    /// Builder method: rules reported at one token index
    pub fn with_rules(mut self, token_index: usize, rules: &[RuleId]) -> Self {
        self.by_index
            .insert(token_index, rules.iter().copied().collect());
        self
    }
}

impl RuleOracle for MockRuleOracle {
    fn reachable_rules(&self, _tokens: &TokenStream, token_index: usize) -> HashSet<RuleId> {
        self.by_index
            .get(&token_index)
            .cloned()
            .unwrap_or_else(|| self.fallback.clone())
    }
}

const TABLE_KEYWORDS: &[&str] = &["FROM", "JOIN", "APPLY", "INTO", "UPDATE", "TABLE"];
const ROUTINE_KEYWORDS: &[&str] = &["EXEC", "EXECUTE"];
const EXPRESSION_KEYWORDS: &[&str] = &[
    "SELECT", "WHERE", "ON", "AND", "OR", "SET", "BY", "HAVING", "WHEN", "THEN", "ELSE", "=",
    "<>", "!=", "<", ">", "<=", ">=", "(", "+", "-", "*", "/",
];

/// Oracle guessing reachable rules from the preceding keyword
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicRuleOracle;

impl HeuristicRuleOracle {
    /// Index of the default-channel token that decides the context
    fn anchor(tokens: &TokenStream, token_index: usize) -> Option<usize> {
        let is_word = |i: usize| {
            tokens.get(i).is_some_and(|t| {
                !t.is_hidden()
                    && !t.is_eof()
                    && t.text.starts_with(|c: char| c.is_alphanumeric() || matches!(c, '_' | '#' | '[' | '@'))
            })
        };
        // Punctuation closing the slot the caret sits in
        let is_closer = |i: usize| {
            tokens
                .get(i)
                .is_some_and(|t| t.text == ")" || t.text == "," || t.text == ";")
        };
        let mut index = token_index;
        // The identifier being typed is not the anchor
        if tokens.get(index).is_none_or(|t| t.is_hidden() || t.is_eof())
            || is_word(index)
            || is_closer(index)
        {
            index = tokens.previous_default(index)?.index;
        }
        // Skip over a dotted prefix such as `dbo.` or `o.`
        while tokens.get(index).is_some_and(|t| t.text == ".") {
            let name = tokens.previous_default(index)?.index;
            index = tokens.previous_default(name)?.index;
        }
        Some(index)
    }
}

impl RuleOracle for HeuristicRuleOracle {
    fn reachable_rules(&self, tokens: &TokenStream, token_index: usize) -> HashSet<RuleId> {
        let Some(anchor) = Self::anchor(tokens, token_index).and_then(|i| tokens.get(i)) else {
            return HashSet::new();
        };
        let text = anchor.text.to_uppercase();
        let rules: &[RuleId] = if TABLE_KEYWORDS.contains(&text.as_str()) {
            &[tsql::TABLE_SOURCE_ITEM, tsql::FULL_TABLE_NAME]
        } else if ROUTINE_KEYWORDS.contains(&text.as_str()) {
            &[tsql::FUNC_PROC_NAME]
        } else if EXPRESSION_KEYWORDS.contains(&text.as_str()) || text == "," {
            &[tsql::EXPRESSION, tsql::FULL_COLUMN_NAME, tsql::FUNCTION_CALL]
        } else {
            &[]
        };
        rules.iter().copied().collect()
    }
}
