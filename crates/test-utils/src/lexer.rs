// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Fixture T-SQL lexer
//!
//! Produces the full token stream, hidden channel included, for the fixture
//! grammar. Whitespace and comments go to the hidden channel; everything else
//! is a default-channel token. Offsets are character offsets.

use tsql_insight_grammar::{Token, TokenStream};

/// Lex a document into a token stream terminated by an EOF token
pub fn tokenize(text: &str) -> TokenStream {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < chars.len() {
        let start = pos;
        let c = chars[pos];
        let hidden = if c.is_whitespace() {
            while pos < chars.len() && chars[pos].is_whitespace() {
                pos += 1;
            }
            true
        } else if c == '-' && chars.get(pos + 1) == Some(&'-') {
            while pos < chars.len() && chars[pos] != '\n' {
                pos += 1;
            }
            true
        } else if c == '/' && chars.get(pos + 1) == Some(&'*') {
            pos += 2;
            while pos < chars.len() && !(chars[pos] == '*' && chars.get(pos + 1) == Some(&'/')) {
                pos += 1;
            }
            pos = (pos + 2).min(chars.len());
            true
        } else {
            pos = scan_default(&chars, pos);
            false
        };

        let lexeme: String = chars[start..pos].iter().collect();
        let token = Token::new(tokens.len(), start, lexeme);
        tokens.push(if hidden { token.hidden() } else { token });
    }

    tokens.push(Token::eof(tokens.len(), chars.len()));
    TokenStream::new(tokens)
}

fn is_word_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '#' || c == '@'
}

fn is_word_part(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '#' | '@' | '$')
}

/// Scan one default-channel token starting at `pos`, returning its end
fn scan_default(chars: &[char], pos: usize) -> usize {
    let c = chars[pos];
    let next = chars.get(pos + 1).copied();

    // N'unicode string'
    if (c == 'N' || c == 'n') && next == Some('\'') {
        return scan_quoted(chars, pos + 1, '\'');
    }
    if is_word_start(c) {
        let mut end = pos + 1;
        while end < chars.len() && is_word_part(chars[end]) {
            end += 1;
        }
        return end;
    }
    match c {
        '\'' => scan_quoted(chars, pos, '\''),
        '"' => scan_quoted(chars, pos, '"'),
        '[' => scan_quoted(chars, pos, ']'),
        '0'..='9' => {
            let mut end = pos + 1;
            while end < chars.len() && (chars[end].is_ascii_digit() || chars[end] == '.') {
                end += 1;
            }
            end
        }
        '<' if matches!(next, Some('>') | Some('=')) => pos + 2,
        '>' | '!' if next == Some('=') => pos + 2,
        '!' if matches!(next, Some('<') | Some('>')) => pos + 2,
        '+' | '-' | '*' | '/' | '%' | '&' | '|' | '^' if next == Some('=') => pos + 2,
        _ => pos + 1,
    }
}

/// Scan a delimited token whose closing delimiter is doubled to escape it
fn scan_quoted(chars: &[char], open: usize, close: char) -> usize {
    let mut end = open + 1;
    while end < chars.len() {
        if chars[end] == close {
            if chars.get(end + 1) == Some(&close) {
                end += 2;
                continue;
            }
            return end + 1;
        }
        end += 1;
    }
    end
}
