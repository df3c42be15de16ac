use crate::ast::{
    Declaration, Effect, FilterDecl, ListDecl, Literal, MacroDecl, RuleDecl, SeverityLevel,
};
use crate::lexer::token::{Span, Token};
use crate::parser::{PResult, Parser, SyntaxError};

/// Contextual field words; they stay identifiers everywhere else
const PREFILTER: &str = "prefilter";
const ENABLED: &str = "enabled";

impl Parser<'_> {
    /// Parse one declaration starting at its `-` marker
    pub fn parse_declaration(&mut self) -> PResult<Declaration> {
        let marker = self.expect(Token::SepDecl)?;
        let decl = match self.tokens.peek().token {
            Token::KeywordRule => {
                self.open_field(Token::KeywordRule)?;
                Declaration::Rule(self.parse_rule(marker.span)?)
            }
            Token::KeywordFilter => {
                self.open_field(Token::KeywordFilter)?;
                Declaration::Filter(self.parse_filter(marker.span)?)
            }
            Token::KeywordMacro => {
                self.open_field(Token::KeywordMacro)?;
                Declaration::Macro(self.parse_macro(marker.span)?)
            }
            Token::KeywordList => {
                self.open_field(Token::KeywordList)?;
                Declaration::List(self.parse_list(marker.span)?)
            }
            _ => return Err(SyntaxError::unknown_declaration(self.tokens.peek())),
        };
        Ok(decl)
    }

    fn parse_rule(&mut self, span: Span) -> PResult<RuleDecl> {
        let name = self.parse_text()?;
        self.open_field(Token::KeywordDesc)?;
        let description = self.parse_text()?;
        self.open_field(Token::KeywordCondition)?;
        let condition = self.parse_expression()?;

        let effect = match self.tokens.peek().token {
            Token::KeywordAction => {
                self.open_field(Token::KeywordAction)?;
                Effect::Action(self.parse_text()?)
            }
            Token::KeywordOutput => {
                self.open_field(Token::KeywordOutput)?;
                Effect::Output(self.parse_text()?)
            }
            _ => return Err(self.condition_end_error("'and', 'or', 'action' or 'output'")),
        };

        self.open_field(Token::KeywordPriority)?;
        let priority = self.parse_severity()?;

        let tags = if self.tokens.at(Token::KeywordTags) {
            self.open_field(Token::KeywordTags)?;
            self.parse_items()?
        } else {
            Vec::new()
        };
        let prefilter = self.parse_prefilter()?;
        let enabled = self.parse_enabled()?;
        self.expect_declaration_end("end of declaration")?;

        Ok(RuleDecl {
            name,
            description,
            condition,
            effect,
            priority,
            tags,
            prefilter,
            enabled,
            span,
        })
    }

    fn parse_filter(&mut self, span: Span) -> PResult<FilterDecl> {
        let id = self.parse_id()?;
        self.open_field(Token::KeywordCondition)?;
        let condition = self.parse_expression()?;
        if !self.at_word(ENABLED) {
            self.expect_condition_or_end()?;
        }
        let enabled = self.parse_enabled()?;
        self.expect_declaration_end("end of declaration")?;
        Ok(FilterDecl {
            id,
            condition,
            enabled,
            span,
        })
    }

    fn parse_macro(&mut self, span: Span) -> PResult<MacroDecl> {
        let id = self.parse_id()?;
        self.open_field(Token::KeywordCondition)?;
        let condition = self.parse_expression()?;
        self.expect_condition_or_end()?;
        Ok(MacroDecl {
            id,
            condition,
            span,
        })
    }

    fn parse_list(&mut self, span: Span) -> PResult<ListDecl> {
        let id = self.parse_id()?;
        self.open_field(Token::KeywordItems)?;
        let items = self.parse_items()?;
        self.expect_declaration_end("end of declaration")?;
        Ok(ListDecl { id, items, span })
    }

    /// `keyword :`
    fn open_field(&mut self, keyword: Token) -> PResult<()> {
        self.expect(keyword)?;
        self.expect(Token::SepDef)?;
        Ok(())
    }

    /// Declaration ids are plain identifiers, never keywords
    fn parse_id(&mut self) -> PResult<String> {
        self.expect(Token::Identifier).map(|item| item.value)
    }

    fn parse_severity(&mut self) -> PResult<SeverityLevel> {
        let next = self.tokens.peek();
        let level = match next.token {
            Token::LitSeverity => SeverityLevel::from_name(&next.value),
            _ => None,
        };
        match level {
            Some(level) => {
                self.tokens.bump();
                Ok(level)
            }
            None => Err(SyntaxError::expected_token(
                Token::LitSeverity,
                self.tokens.peek(),
            )),
        }
    }

    fn parse_prefilter(&mut self) -> PResult<Vec<Literal>> {
        if !self.at_word(PREFILTER) {
            return Ok(Vec::new());
        }
        self.tokens.bump();
        self.expect(Token::SepDef)?;
        self.parse_items()
    }

    /// Optional `enabled: true|false`; absent means enabled
    fn parse_enabled(&mut self) -> PResult<bool> {
        if !self.at_word(ENABLED) {
            return Ok(true);
        }
        self.tokens.bump();
        self.expect(Token::SepDef)?;

        let next = self.tokens.peek();
        let value = match next.token {
            Token::Identifier | Token::LitString => Literal::from_item(next),
            _ => None,
        };
        let enabled = match value.as_ref().map(Literal::value).as_deref() {
            Some("true") => true,
            Some("false") => false,
            _ => return Err(SyntaxError::invalid_value(ENABLED, next, "true or false")),
        };
        self.tokens.bump();
        Ok(enabled)
    }

    /// A condition must be followed by `and`, `or` or the end of the declaration
    fn expect_condition_or_end(&self) -> PResult<()> {
        if self.tokens.at_eof() || self.tokens.at(Token::SepDecl) {
            Ok(())
        } else {
            Err(self.condition_end_error("'and', 'or' or end of declaration"))
        }
    }

    fn expect_declaration_end(&self, expected: &str) -> PResult<()> {
        let next = self.tokens.peek();
        match next.token {
            Token::LitEof | Token::SepDecl => Ok(()),
            _ => Err(SyntaxError::expected(expected, next)),
        }
    }
}
