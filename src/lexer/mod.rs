//! Lexical analysis module

/// Lexer state management
pub mod state;
/// Token stream with lookahead
pub mod stream;
/// Token definitions and utilities
pub mod token;

pub use state::LexState;
pub use stream::TokenStream;
pub use token::{Item, Span, Token};

use std::sync::Arc;

/// Lexer for policy documents
/// Converts input string into a stream of tokens
pub struct Lexer<'a> {
    input: &'a str,
    start: usize,
    position: usize,
    width: usize,
    line_starts: Vec<usize>,
    items: Vec<Item>,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer over the input
    pub fn new(input: &'a str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(input.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Lexer {
            input,
            start: 0,
            position: 0,
            width: 0,
            line_starts,
            items: Vec::new(),
        }
    }

    /// Scan the whole input and return the resulting token stream
    pub fn scan(mut self) -> TokenStream {
        let mut state = Some(LexState::Scan);
        while let Some(s) = state {
            state = self.process_state(s);
        }
        tracing::trace!(tokens = self.items.len(), "lexed policy source");
        TokenStream::new(Arc::from(self.input), self.items)
    }

    /// Process the current state and return the next state
    fn process_state(&mut self, state: LexState) -> Option<LexState> {
        match state {
            LexState::Scan => self.lex_scan(),
            LexState::Word => self.lex_word(),
            LexState::Quoted(quote) => self.lex_quoted(quote),
            LexState::Operator => self.lex_operator(),
            LexState::Comment => self.lex_comment(),
            LexState::Eof => self.lex_eof(),
        }
    }

    /// Get the next character from the input
    fn next_char(&mut self) -> Option<char> {
        match self.remaining().chars().next() {
            Some(ch) => {
                self.width = ch.len_utf8();
                self.position += self.width;
                Some(ch)
            }
            None => {
                self.width = 0;
                None
            }
        }
    }

    /// Look at the next character without consuming it
    fn peek_char(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    /// Back up one character
    fn backup(&mut self) {
        if self.position > 0 && self.width > 0 {
            self.position -= self.width;
            self.width = 0;
        }
    }

    /// Ignore characters up to current position
    fn ignore(&mut self) {
        self.start = self.position;
    }

    /// Get the collected string from start to current position
    fn collected(&self) -> &'a str {
        &self.input[self.start..self.position]
    }

    /// Get the remaining string from current position
    fn remaining(&self) -> &'a str {
        &self.input[self.position..]
    }

    /// Span of the collected characters
    fn span(&self) -> Span {
        let line = self.line_starts.partition_point(|&s| s <= self.start);
        let line_start = self.line_starts[line - 1];
        let column = self.input[line_start..self.start].chars().count() + 1;
        Span::new(self.start, self.position, line, column)
    }

    /// Emit a token with the collected value
    fn emit(&mut self, token: Token) {
        let item = Item::new(token, self.collected(), self.span());
        self.items.push(item);
        self.ignore();
    }
}

/// Tokenize a policy source
pub fn tokenize(input: &str) -> TokenStream {
    Lexer::new(input).scan()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lexer_creation() {
        let lexer = Lexer::new("test\nmore");
        assert_eq!(lexer.position, 0);
        assert_eq!(lexer.start, 0);
        assert_eq!(lexer.input, "test\nmore");
        assert_eq!(lexer.line_starts, vec![0, 5]);
    }

    #[test]
    fn test_span_tracks_lines_and_columns() {
        let stream = tokenize("- macro: m\n  condition: a");
        let items = stream.items();
        let condition = items
            .iter()
            .find(|i| i.token == Token::KeywordCondition)
            .expect("condition keyword");
        assert_eq!(condition.span.line, 2);
        assert_eq!(condition.span.column, 3);
        assert_eq!(&stream.source()[condition.span.start..condition.span.end], "condition");
    }

    #[test]
    fn test_columns_count_characters_not_bytes() {
        let stream = tokenize("é x");
        let x = &stream.items()[1];
        assert_eq!(x.value, "x");
        assert_eq!(x.span.column, 3);
    }

    #[test]
    fn test_empty_input_yields_single_eof() {
        let stream = tokenize("   \n # only a comment\n");
        assert_eq!(stream.items().len(), 1);
        assert_eq!(stream.items()[0].token, Token::LitEof);
    }
}
