use crate::ast::Literal;
use crate::lexer::token::Token;
use crate::parser::{PResult, Parser, SyntaxError};

impl Parser<'_> {
    /// Parse `[a, b, ...]`; `[]` is an empty list and duplicates are kept
    pub fn parse_items(&mut self) -> PResult<Vec<Literal>> {
        self.expect(Token::SepLbrack)?;
        let mut items = Vec::new();
        if self.tokens.eat(Token::SepRbrack).is_some() {
            return Ok(items);
        }

        loop {
            let next = self.tokens.peek();
            match Literal::from_item(next) {
                Some(literal) => {
                    items.push(literal);
                    self.tokens.bump();
                }
                None => return Err(SyntaxError::expected("list item", next)),
            }

            match self.tokens.peek().token {
                Token::SepRbrack => {
                    self.tokens.bump();
                    return Ok(items);
                }
                Token::SepComma => {
                    self.tokens.bump();
                    let after = self.tokens.peek();
                    if after.token == Token::SepRbrack {
                        return Err(SyntaxError::trailing_separator(after));
                    }
                }
                _ => return Err(SyntaxError::expected("',' or ']'", self.tokens.peek())),
            }
        }
    }
}
