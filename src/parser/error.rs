use crate::lexer::token::{Item, Span, Token};
use serde::Serialize;
use thiserror::Error;

/// Kinds of syntax errors found while parsing a policy
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SyntaxErrorKind {
    /// A specific token or construct was required
    #[error("expected {expected}, found {found}")]
    ExpectedToken {
        /// What the grammar required
        expected: String,
        /// What was there instead
        found: String,
    },

    /// Text field with nothing in it
    #[error("empty text field before {found}")]
    EmptyTextField {
        /// Token that ended the field
        found: String,
    },

    /// Parenthesis opened but never closed, or closed without being opened
    #[error("unbalanced parenthesis, found {found}")]
    UnbalancedGroup {
        /// Token found where the group should have been closed
        found: String,
    },

    /// Operator without its right-hand side
    #[error("missing operand after '{operator}', found {found}")]
    MissingOperand {
        /// The operator
        operator: String,
        /// Token found instead of an operand
        found: String,
    },

    /// Operand list of `in` or `pmatch` not closed
    #[error("unterminated operand list for '{operator}', found {found}")]
    UnterminatedOperandList {
        /// The set operator
        operator: String,
        /// Token found instead of `,` or `)`
        found: String,
    },

    /// `,` directly before a closing bracket or parenthesis
    #[error("trailing separator before {found}")]
    TrailingSeparator {
        /// The closing token
        found: String,
    },

    /// `-` not followed by rule, filter, macro or list
    #[error("unknown declaration keyword {found}")]
    UnknownDeclarationKeyword {
        /// Token found after the declaration marker
        found: String,
    },

    /// Input without any declaration
    #[error("policy document contains no declarations")]
    EmptyDocument,

    /// Parentheses nested too deeply
    #[error("nesting depth limit exceeded: limit {limit}")]
    NestingTooDeep {
        /// Configured maximum depth
        limit: usize,
    },

    /// Input holds more tokens than allowed
    #[error("token limit exceeded: {count} tokens, limit {limit}")]
    TokenLimitExceeded {
        /// Number of tokens in the input
        count: usize,
        /// Configured maximum
        limit: usize,
    },

    /// Field value outside its allowed set
    #[error("invalid value {found} for '{field}', expected {expected}")]
    InvalidFieldValue {
        /// Field name
        field: String,
        /// The value
        found: String,
        /// Allowed values
        expected: String,
    },
}

/// Syntax error with its position
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize)]
#[error("{}:{}: {kind}", .span.line, .span.column)]
pub struct SyntaxError {
    /// What went wrong
    pub kind: SyntaxErrorKind,
    /// Where it went wrong
    pub span: Span,
}

impl SyntaxError {
    /// Create an error at a position
    pub fn new(kind: SyntaxErrorKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Create an expected token error at the offending item
    pub fn expected(expected: impl Into<String>, found: &Item) -> Self {
        Self::new(
            SyntaxErrorKind::ExpectedToken {
                expected: expected.into(),
                found: found.describe(),
            },
            found.span,
        )
    }

    /// Create an expected token error naming a fixed token
    pub fn expected_token(expected: Token, found: &Item) -> Self {
        Self::expected(expected.to_string(), found)
    }

    /// Create an empty text field error
    pub fn empty_text(found: &Item) -> Self {
        Self::new(
            SyntaxErrorKind::EmptyTextField {
                found: found.describe(),
            },
            found.span,
        )
    }

    /// Create an unbalanced group error
    pub fn unbalanced_group(found: &Item, span: Span) -> Self {
        Self::new(
            SyntaxErrorKind::UnbalancedGroup {
                found: found.describe(),
            },
            span,
        )
    }

    /// Create a missing operand error
    pub fn missing_operand(operator: &Item, found: &Item) -> Self {
        Self::new(
            SyntaxErrorKind::MissingOperand {
                operator: operator.value.clone(),
                found: found.describe(),
            },
            found.span,
        )
    }

    /// Create an unterminated operand list error
    pub fn unterminated_operands(operator: &Item, found: &Item) -> Self {
        Self::new(
            SyntaxErrorKind::UnterminatedOperandList {
                operator: operator.value.clone(),
                found: found.describe(),
            },
            found.span,
        )
    }

    /// Create a trailing separator error
    pub fn trailing_separator(found: &Item) -> Self {
        Self::new(
            SyntaxErrorKind::TrailingSeparator {
                found: found.describe(),
            },
            found.span,
        )
    }

    /// Create an unknown declaration keyword error
    pub fn unknown_declaration(found: &Item) -> Self {
        Self::new(
            SyntaxErrorKind::UnknownDeclarationKeyword {
                found: found.describe(),
            },
            found.span,
        )
    }

    /// Create an invalid field value error
    pub fn invalid_value(field: &str, found: &Item, expected: impl Into<String>) -> Self {
        Self::new(
            SyntaxErrorKind::InvalidFieldValue {
                field: field.to_string(),
                found: found.describe(),
                expected: expected.into(),
            },
            found.span,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_position() {
        let item = Item::new(Token::SepRbrack, "]", Span::new(10, 11, 3, 7));
        let err = SyntaxError::trailing_separator(&item);
        assert_eq!(err.to_string(), "3:7: trailing separator before ']'");
    }

    #[test]
    fn test_expected_token_message() {
        let item = Item::new(Token::LitEof, "", Span::new(4, 4, 1, 5));
        let err = SyntaxError::expected_token(Token::SepDef, &item);
        assert_eq!(
            err.kind,
            SyntaxErrorKind::ExpectedToken {
                expected: "':'".into(),
                found: "end of input".into(),
            }
        );
        assert_eq!(err.to_string(), "1:5: expected ':', found end of input");
    }

    #[test]
    fn test_missing_operand_names_operator() {
        let op = Item::new(Token::OpEq, "=", Span::new(2, 3, 1, 3));
        let found = Item::new(Token::KeywordAnd, "and", Span::new(4, 7, 1, 5));
        let err = SyntaxError::missing_operand(&op, &found);
        assert_eq!(err.to_string(), "1:5: missing operand after '=', found 'and'");
    }
}
