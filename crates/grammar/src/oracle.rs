// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Candidate-rule oracle
//!
//! Grammar analysis services (for example an LL(*) follow-set computation)
//! can tell which rules may start at a token. The engine only consumes the
//! answer through [`RuleOracle`].

use std::collections::HashSet;

use crate::rules::RuleId;
use crate::token::TokenStream;

/// Reports the grammar rules reachable at a token position
pub trait RuleOracle: Send + Sync {
    /// Rules that could be entered when the caret sits at `token_index`
    fn reachable_rules(&self, tokens: &TokenStream, token_index: usize) -> HashSet<RuleId>;
}

/// Oracle that never reports any rule
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRules;

impl RuleOracle for NoRules {
    fn reachable_rules(&self, _tokens: &TokenStream, _token_index: usize) -> HashSet<RuleId> {
        HashSet::new()
    }
}
