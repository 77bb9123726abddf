// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Tokens
//!
//! The lexer output shared by every grammar. Offsets are character offsets
//! into the document (not bytes), and every token, including whitespace and
//! comments, is kept in one random-access stream.

use std::ops::Range;

use serde::{Deserialize, Serialize};

/// Lexer channel of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    /// Consumed by the grammar
    Default,
    /// Present in the stream but skipped by the grammar (whitespace, comments)
    Hidden,
}

/// Token classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    Normal,
    /// The end-of-input marker; always the last token of a stream
    Eof,
}

/// A lexical token
///
/// `start..end` is the half-open character range the token covers, so the
/// inclusive stop offset is `end - 1`. The end-of-input token is empty
/// (`start == end == len`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Position in the token stream
    pub index: usize,
    /// First covered character offset
    pub start: usize,
    /// One past the last covered character offset
    pub end: usize,
    pub channel: Channel,
    pub kind: TokenKind,
    /// Source text of the token
    pub text: String,
}

impl Token {
    /// Create a default-channel token
    pub fn new(index: usize, start: usize, text: impl Into<String>) -> Self {
        let text = text.into();
        let end = start + text.chars().count();
        Self {
            index,
            start,
            end,
            channel: Channel::Default,
            kind: TokenKind::Normal,
            text,
        }
    }

    /// Create the end-of-input token for a document of `len` characters
    pub fn eof(index: usize, len: usize) -> Self {
        Self {
            index,
            start: len,
            end: len,
            channel: Channel::Default,
            kind: TokenKind::Eof,
            text: String::new(),
        }
    }

    /// Builder method: move the token to the hidden channel
    pub fn hidden(mut self) -> Self {
        self.channel = Channel::Hidden;
        self
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }

    pub fn is_hidden(&self) -> bool {
        self.channel == Channel::Hidden
    }

    /// Character range covered by the token
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Whether `offset` lies on the token or directly after its last character
    ///
    /// A caret placed right behind an identifier still belongs to it.
    pub fn touches(&self, offset: usize) -> bool {
        self.start <= offset && offset <= self.end
    }

    /// Whether the token covers the character at `offset`
    pub fn covers(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }
}

/// Random-access token stream including hidden-channel tokens
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenStream {
    tokens: Vec<Token>,
}

impl TokenStream {
    /// Wrap lexer output
    ///
    /// Token indices must equal their positions and the last token should be
    /// the end-of-input marker.
    pub fn new(tokens: Vec<Token>) -> Self {
        debug_assert!(tokens.iter().enumerate().all(|(i, t)| t.index == i));
        Self { tokens }
    }

    pub fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    pub fn as_slice(&self) -> &[Token] {
        &self.tokens
    }

    /// The end-of-input token, if the stream has one
    pub fn eof(&self) -> Option<&Token> {
        self.tokens.last().filter(|t| t.is_eof())
    }

    /// Length of the lexed document in characters
    pub fn document_len(&self) -> usize {
        self.tokens.last().map(|t| t.end).unwrap_or(0)
    }

    /// Nearest token at or before `index` whose range covers `offset`
    pub fn find_covering_backward(&self, index: usize, offset: usize) -> Option<&Token> {
        let upper = index.min(self.tokens.len().checked_sub(1)?);
        self.tokens[..=upper].iter().rev().find(|t| t.covers(offset))
    }

    /// Last default-channel token strictly before `index`
    pub fn previous_default(&self, index: usize) -> Option<&Token> {
        self.tokens[..index.min(self.tokens.len())]
            .iter()
            .rev()
            .find(|t| !t.is_hidden())
    }
}

impl<'a> IntoIterator for &'a TokenStream {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}
