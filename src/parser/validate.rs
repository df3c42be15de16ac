use crate::ast::{BinaryOp, SetOp};
use crate::lexer::token::Token;

/// Tokens usable as a literal operand
pub fn is_atom(token: Token) -> bool {
    matches!(
        token,
        Token::Identifier
            | Token::LitNumber
            | Token::LitPath
            | Token::LitString
            | Token::OpLt
            | Token::OpGt
    )
}

/// Field keywords that end a text field
pub fn is_text_terminator(token: Token) -> bool {
    matches!(
        token,
        Token::KeywordDesc
            | Token::KeywordCondition
            | Token::KeywordAction
            | Token::KeywordOutput
            | Token::KeywordPriority
            | Token::KeywordTags
            | Token::LitEof
    )
}

/// Tokens that can begin a term
pub fn starts_term(token: Token) -> bool {
    is_atom(token) || matches!(token, Token::KeywordNot | Token::SepLpar)
}

/// Map a token to a comparison operator
pub fn binary_operator(token: Token) -> Option<BinaryOp> {
    let op = match token {
        Token::OpLt => BinaryOp::Lt,
        Token::OpLte => BinaryOp::Le,
        Token::OpGt => BinaryOp::Gt,
        Token::OpGte => BinaryOp::Ge,
        Token::OpEq => BinaryOp::Eq,
        Token::OpNeq => BinaryOp::Neq,
        Token::KeywordContains => BinaryOp::Contains,
        Token::KeywordIContains => BinaryOp::IContains,
        Token::KeywordStartsWith => BinaryOp::StartsWith,
        Token::KeywordEndsWith => BinaryOp::EndsWith,
        _ => return None,
    };
    Some(op)
}

/// Map a token to a set operator
pub fn set_operator(token: Token) -> Option<SetOp> {
    match token {
        Token::KeywordIn => Some(SetOp::In),
        Token::KeywordPMatch => Some(SetOp::PatternMatch),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atoms() {
        assert!(is_atom(Token::Identifier));
        assert!(is_atom(Token::LitString));
        // `<` and `>` double as bare values
        assert!(is_atom(Token::OpLt));
        assert!(is_atom(Token::OpGt));
        assert!(!is_atom(Token::OpLte));
        assert!(!is_atom(Token::LitSeverity));
        assert!(!is_atom(Token::KeywordIn));
    }

    #[test]
    fn test_term_starters() {
        assert!(starts_term(Token::KeywordNot));
        assert!(starts_term(Token::SepLpar));
        assert!(!starts_term(Token::SepRpar));
        assert!(!starts_term(Token::KeywordAnd));
        assert!(!starts_term(Token::LitEof));
    }

    #[test]
    fn test_text_terminators() {
        assert!(is_text_terminator(Token::KeywordDesc));
        assert!(is_text_terminator(Token::KeywordTags));
        assert!(is_text_terminator(Token::LitEof));
        assert!(!is_text_terminator(Token::KeywordName));
        assert!(!is_text_terminator(Token::SepDecl));
    }

    #[test]
    fn test_operator_mapping() {
        assert_eq!(binary_operator(Token::OpGte), Some(BinaryOp::Ge));
        assert_eq!(binary_operator(Token::KeywordEndsWith), Some(BinaryOp::EndsWith));
        assert_eq!(binary_operator(Token::KeywordIn), None);
        assert_eq!(set_operator(Token::KeywordPMatch), Some(SetOp::PatternMatch));
        assert_eq!(set_operator(Token::KeywordExists), None);
    }
}
