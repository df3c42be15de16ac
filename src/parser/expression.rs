use crate::ast::{Expression, Literal, Operand, UnaryOp};
use crate::lexer::token::{Item, Token};
use crate::parser::validate::{binary_operator, is_atom, set_operator, starts_term};
use crate::parser::{PResult, Parser, SyntaxError};

impl Parser<'_> {
    /// Parse a condition
    ///
    /// ```text
    /// expression := and_expr ('or' and_expr)*
    /// and_expr   := term ('and' term)*
    /// term       := 'not' term | '(' expression ')' | atom [operator ...]
    /// ```
    ///
    /// Chains of `and`/`or` become a single node with all operands in source
    /// order; a level with one operand is returned as that operand.
    pub fn parse_expression(&mut self) -> PResult<Expression> {
        let mut children = vec![self.parse_and()?];
        while let Some(op) = self.tokens.eat(Token::KeywordOr) {
            self.require_term(&op)?;
            children.push(self.parse_and()?);
        }
        Ok(junction(children, Expression::Or))
    }

    fn parse_and(&mut self) -> PResult<Expression> {
        let mut children = vec![self.parse_term()?];
        while let Some(op) = self.tokens.eat(Token::KeywordAnd) {
            self.require_term(&op)?;
            children.push(self.parse_term()?);
        }
        Ok(junction(children, Expression::And))
    }

    fn parse_term(&mut self) -> PResult<Expression> {
        match self.tokens.peek().token {
            Token::KeywordNot => {
                let not = self.tokens.bump();
                self.require_term(&not)?;
                let inner = self.descend(|p| p.parse_term())?;
                Ok(Expression::Not(Box::new(inner)))
            }
            Token::SepLpar => self.parse_group(),
            token if is_atom(token) => self.parse_atom_term(),
            _ => Err(SyntaxError::expected("condition", self.tokens.peek())),
        }
    }

    fn parse_group(&mut self) -> PResult<Expression> {
        let open = self.tokens.bump();
        let inner = self.descend(|p| p.parse_expression())?;
        match self.tokens.eat(Token::SepRpar) {
            Some(_) => Ok(Expression::Grouped(Box::new(inner))),
            None => Err(SyntaxError::unbalanced_group(self.tokens.peek(), open.span)),
        }
    }

    /// A term starting with an atom; the token after it picks the form
    fn parse_atom_term(&mut self) -> PResult<Expression> {
        let first = self.tokens.peek().clone();
        let operator = self.tokens.peek_nth(1).clone();
        let Some(operand) = Literal::from_item(&first) else {
            return Err(SyntaxError::expected("condition", &first));
        };

        if operator.token == Token::KeywordExists {
            self.tokens.bump();
            self.tokens.bump();
            return Ok(Expression::UnaryTest {
                operand,
                op: UnaryOp::Exists,
            });
        }

        if let Some(op) = binary_operator(operator.token) {
            self.tokens.bump();
            self.tokens.bump();
            let right = self.tokens.peek();
            let Some(right) = Literal::from_item(right) else {
                return Err(SyntaxError::missing_operand(&operator, right));
            };
            self.tokens.bump();
            return Ok(Expression::BinaryTest {
                left: operand,
                op,
                right,
            });
        }

        if let Some(op) = set_operator(operator.token) {
            self.tokens.bump();
            self.tokens.bump();
            let candidates = self.parse_operands(&operator)?;
            return Ok(Expression::SetTest {
                operand,
                op,
                candidates,
            });
        }

        if first.token == Token::Identifier {
            self.tokens.bump();
            return Ok(Expression::VariableRef(first.value));
        }

        Err(SyntaxError::expected("operator", &operator))
    }

    /// `( operand (, operand)* )` after `in` or `pmatch`; `()` is allowed
    fn parse_operands(&mut self, operator: &Item) -> PResult<Vec<Operand>> {
        self.expect(Token::SepLpar)?;
        let mut candidates = Vec::new();
        if self.tokens.eat(Token::SepRpar).is_some() {
            return Ok(candidates);
        }

        loop {
            candidates.push(self.parse_operand(operator)?);

            match self.tokens.peek().token {
                Token::SepRpar => {
                    self.tokens.bump();
                    return Ok(candidates);
                }
                Token::SepComma => {
                    self.tokens.bump();
                    let after = self.tokens.peek();
                    if after.token == Token::SepRpar {
                        return Err(SyntaxError::trailing_separator(after));
                    }
                }
                _ => {
                    return Err(SyntaxError::unterminated_operands(
                        operator,
                        self.tokens.peek(),
                    ))
                }
            }
        }
    }

    fn parse_operand(&mut self, operator: &Item) -> PResult<Operand> {
        let next = self.tokens.peek();
        if next.token == Token::SepLbrack {
            return self.parse_items().map(Operand::Items);
        }
        if let Some(literal) = Literal::from_item(next) {
            self.tokens.bump();
            return Ok(Operand::Literal(literal));
        }
        match next.token {
            Token::LitEof | Token::SepDecl => {
                Err(SyntaxError::unterminated_operands(operator, next))
            }
            _ => Err(SyntaxError::expected("operand", next)),
        }
    }

    /// `and`, `or` and `not` must be followed by something that starts a term
    fn require_term(&self, operator: &Item) -> PResult<()> {
        let next = self.tokens.peek();
        if starts_term(next.token) {
            Ok(())
        } else {
            Err(SyntaxError::missing_operand(operator, next))
        }
    }

    /// Error for a token that cannot follow a complete condition
    pub(crate) fn condition_end_error(&self, expected: &str) -> SyntaxError {
        let next = self.tokens.peek();
        if next.token == Token::SepRpar {
            SyntaxError::unbalanced_group(next, next.span)
        } else {
            SyntaxError::expected(expected, next)
        }
    }

    /// Require the end of input after a standalone condition
    pub(crate) fn expect_condition_end(&self, expected: &str) -> PResult<()> {
        if self.tokens.at_eof() {
            Ok(())
        } else {
            Err(self.condition_end_error(expected))
        }
    }
}

/// Collapse a single-operand level, otherwise build the node
fn junction(
    mut children: Vec<Expression>,
    build: fn(Vec<Expression>) -> Expression,
) -> Expression {
    if children.len() == 1 {
        children.remove(0)
    } else {
        build(children)
    }
}
