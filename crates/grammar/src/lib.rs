// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # T-SQL Insight - Parse Model
//!
//! Grammar-neutral types shared by the grammar implementation and the
//! analysis crates:
//!
//! - [`Token`] / [`TokenStream`]: every lexed token, hidden channel included
//! - [`SyntaxTree`] / [`TreeBuilder`]: arena tree with parent links
//! - [`RuleId`] and the [`rules::tsql`] rule table
//! - [`Grammar`]: text to error-recovered tree
//! - [`RuleOracle`]: rules reachable at a token, used for completion

pub mod error;
pub mod grammar;
pub mod oracle;
pub mod rules;
pub mod token;
pub mod tree;

pub use error::{GrammarError, GrammarResult};
pub use grammar::{Grammar, ParseOutput, SyntaxError};
pub use oracle::{NoRules, RuleOracle};
pub use rules::RuleId;
pub use token::{Channel, Token, TokenKind, TokenStream};
pub use tree::{Checkpoint, Descendants, NodeId, NodeType, SyntaxTree, TreeBuilder};
