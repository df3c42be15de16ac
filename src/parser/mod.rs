use crate::ast::{Declaration, Expression, PolicyDocument};
use crate::config::ParserConfig;
use crate::lexer::token::{Item, Token};
use crate::lexer::{tokenize, TokenStream};
use tracing::{debug, trace};

/// Declaration rules
pub mod declaration;
/// Parser error types
pub mod error;
/// Expression grammar
pub mod expression;
/// Bracketed literal lists
pub mod items;
/// Free-form text fields
pub mod text;
/// Token classes used by the grammar
pub mod validate;

pub use error::{SyntaxError, SyntaxErrorKind};

pub use crate::config::{DEFAULT_MAX_DEPTH as MAX_RECURSION_DEPTH, DEFAULT_MAX_TOKENS as MAX_TOKENS};

pub(crate) type PResult<T> = std::result::Result<T, SyntaxError>;

/// Result of parsing a policy: the document plus every syntax error found
///
/// The document holds all declarations that parsed cleanly, so callers can
/// report errors and still inspect the rest of the file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseOutcome {
    /// Declarations that parsed cleanly
    pub document: PolicyDocument,
    /// Syntax errors in source order
    pub errors: Vec<SyntaxError>,
}

impl ParseOutcome {
    /// Whether the policy parsed without errors
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// The document if there were no errors, otherwise the errors
    pub fn into_result(self) -> std::result::Result<PolicyDocument, Vec<SyntaxError>> {
        if self.errors.is_empty() {
            Ok(self.document)
        } else {
            Err(self.errors)
        }
    }
}

/// Recursive descent parser over a token stream
#[derive(Debug)]
pub struct Parser<'s> {
    tokens: &'s mut TokenStream,
    config: ParserConfig,
    depth: usize,
}

impl<'s> Parser<'s> {
    /// Create a parser with default limits
    pub fn new(tokens: &'s mut TokenStream) -> Self {
        Self::with_config(tokens, ParserConfig::default())
    }

    /// Create a parser with custom limits
    pub fn with_config(tokens: &'s mut TokenStream, config: ParserConfig) -> Self {
        Self {
            tokens,
            config,
            depth: 0,
        }
    }

    /// Parse declarations until end of input, recovering after each error
    pub fn parse_policy(&mut self) -> ParseOutcome {
        let mut outcome = ParseOutcome::default();

        if self.tokens.len() > self.config.max_tokens {
            outcome.errors.push(SyntaxError::new(
                SyntaxErrorKind::TokenLimitExceeded {
                    count: self.tokens.len(),
                    limit: self.config.max_tokens,
                },
                self.tokens.peek().span,
            ));
            return outcome;
        }

        let mut saw_marker = false;
        while !self.tokens.at_eof() {
            saw_marker |= self.tokens.at(Token::SepDecl);
            let start = self.tokens.position();
            self.depth = 0;
            match self.parse_declaration() {
                Ok(decl) => {
                    trace!(
                        kind = decl.keyword(),
                        name = decl.name(),
                        line = decl.span().line,
                        "parsed declaration"
                    );
                    outcome.document.declarations.push(decl);
                }
                Err(err) => {
                    debug!(error = %err, "syntax error, resynchronizing");
                    outcome.errors.push(err);
                    self.recover(start);
                }
            }
        }

        if !saw_marker {
            outcome.errors.push(SyntaxError::new(
                SyntaxErrorKind::EmptyDocument,
                self.tokens.peek().span,
            ));
        }
        // The end marker is consumed exactly once
        self.tokens.bump();
        outcome
    }

    /// Skip to the next `-` that opens a line
    fn recover(&mut self, start: usize) {
        if self.tokens.position() == start {
            self.tokens.bump();
        }
        while !self.tokens.at_eof() && !self.at_declaration_start() {
            self.tokens.bump();
        }
        trace!(position = self.tokens.position(), "resumed parsing");
    }

    fn at_declaration_start(&self) -> bool {
        self.tokens.at(Token::SepDecl) && self.tokens.at_line_start()
    }

    /// Consume a token of the given kind or fail naming it
    fn expect(&mut self, token: Token) -> PResult<Item> {
        match self.tokens.eat(token) {
            Some(item) => Ok(item),
            None => Err(SyntaxError::expected_token(token, self.tokens.peek())),
        }
    }

    /// Whether the next token is an identifier spelled `word`
    fn at_word(&self, word: &str) -> bool {
        let next = self.tokens.peek();
        next.token == Token::Identifier && next.value == word
    }

    /// Run a nested rule one level deeper, failing past the depth limit
    fn descend<T>(&mut self, rule: impl FnOnce(&mut Self) -> PResult<T>) -> PResult<T> {
        if self.depth >= self.config.max_depth {
            return Err(SyntaxError::new(
                SyntaxErrorKind::NestingTooDeep {
                    limit: self.config.max_depth,
                },
                self.tokens.peek().span,
            ));
        }
        self.depth += 1;
        let result = rule(self);
        self.depth -= 1;
        result
    }
}

/// Parse a token stream with default limits
pub fn parse(tokens: &mut TokenStream) -> ParseOutcome {
    Parser::new(tokens).parse_policy()
}

/// Parse a token stream with custom limits
pub fn parse_with_config(tokens: &mut TokenStream, config: ParserConfig) -> ParseOutcome {
    Parser::with_config(tokens, config).parse_policy()
}

/// Tokenize and parse policy source text
pub fn parse_policy(source: &str) -> ParseOutcome {
    parse_policy_with_config(source, ParserConfig::default())
}

/// Tokenize and parse policy source text with custom limits
pub fn parse_policy_with_config(source: &str, config: ParserConfig) -> ParseOutcome {
    let mut tokens = tokenize(source);
    parse_with_config(&mut tokens, config)
}

/// Parse a standalone condition such as `proc.name in (bash, sh) and not container`
pub fn parse_expression_str(source: &str) -> PResult<Expression> {
    let mut tokens = tokenize(source);
    let mut parser = Parser::new(&mut tokens);
    let expr = parser.parse_expression()?;
    parser.expect_condition_end("'and', 'or' or end of input")?;
    Ok(expr)
}

/// Parse a single declaration from source text
pub fn parse_declaration_str(source: &str) -> PResult<Declaration> {
    let mut tokens = tokenize(source);
    let mut parser = Parser::new(&mut tokens);
    let decl = parser.parse_declaration()?;
    let rest = parser.tokens.peek();
    if rest.token != Token::LitEof {
        return Err(SyntaxError::expected_token(Token::LitEof, rest));
    }
    Ok(decl)
}
