use crate::lexer::token::{Item, Span, Token};
use std::sync::Arc;

/// Buffered token stream with arbitrary lookahead and rewind
///
/// The stream always ends with exactly one [`Token::LitEof`] item; reading
/// past the end keeps returning it.
#[derive(Debug, Clone)]
pub struct TokenStream {
    source: Arc<str>,
    items: Vec<Item>,
    cursor: usize,
}

impl TokenStream {
    /// Create a stream over lexed items, appending an end marker if missing
    pub fn new(source: Arc<str>, mut items: Vec<Item>) -> Self {
        let eof = items
            .iter()
            .rposition(|item| item.token == Token::LitEof)
            .map(|pos| items[pos].clone());
        items.retain(|item| item.token != Token::LitEof);
        let eof = eof.unwrap_or_else(|| {
            let end = source.len();
            let (line, column) = match items.last() {
                Some(last) => (last.span.line, last.span.column + last.value.chars().count()),
                None => (1, 1),
            };
            Item::new(Token::LitEof, "", Span::new(end, end, line, column))
        });
        items.push(eof);
        Self {
            source,
            items,
            cursor: 0,
        }
    }

    /// The text the tokens were produced from
    pub fn source(&self) -> &str {
        &self.source
    }

    /// All items, including the end marker
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Number of tokens, excluding the end marker
    pub fn len(&self) -> usize {
        self.items.len() - 1
    }

    /// Whether the stream holds only the end marker
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current position, usable with [`TokenStream::rewind`]
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Return to a previously saved position
    pub fn rewind(&mut self, position: usize) {
        self.cursor = position.min(self.items.len() - 1);
    }

    /// Look at the next item without consuming it
    pub fn peek(&self) -> &Item {
        self.peek_nth(0)
    }

    /// Look `n` items past the next one
    pub fn peek_nth(&self, n: usize) -> &Item {
        let last = self.items.len() - 1;
        &self.items[(self.cursor + n).min(last)]
    }

    /// Check the kind of the next item
    pub fn at(&self, token: Token) -> bool {
        self.peek().token == token
    }

    /// Whether only the end marker is left
    pub fn at_eof(&self) -> bool {
        self.at(Token::LitEof)
    }

    /// Whether the next item is the first token on its line
    pub fn at_line_start(&self) -> bool {
        match self.cursor.checked_sub(1).and_then(|prev| self.items.get(prev)) {
            Some(prev) => prev.span.line < self.peek().span.line,
            None => true,
        }
    }

    /// Consume the next item; the end marker is never consumed past
    pub fn bump(&mut self) -> Item {
        let item = self.peek().clone();
        if item.token != Token::LitEof {
            self.cursor += 1;
        }
        item
    }

    /// Consume the next item if it has the given kind
    pub fn eat(&mut self, token: Token) -> Option<Item> {
        if self.at(token) {
            Some(self.bump())
        } else {
            None
        }
    }

    /// Raw source text between two byte offsets
    pub fn slice(&self, start: usize, end: usize) -> &str {
        &self.source[start..end]
    }
}
