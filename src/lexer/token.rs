use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Token types in policy documents
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    // Helpers for internal stuff
    /// Character the lexer could not classify (only text fields accept it)
    Unsupported = 0,

    // User-defined word
    /// Regular identifier (field names, macro and list names, bare values)
    Identifier = 1,

    // Literals
    /// End of file literal
    LitEof = 2,
    /// Integer or decimal number
    LitNumber = 3,
    /// Path-like word that is not a valid identifier
    LitPath = 4,
    /// Single or double quoted string
    LitString = 5,
    /// Severity level name
    LitSeverity = 6,

    // Separators
    /// Declaration start marker `-`
    SepDecl = 7,
    /// Field separator `:`
    SepDef = 8,
    /// Left parenthesis separator
    SepLpar = 9,
    /// Right parenthesis separator
    SepRpar = 10,
    /// Left bracket separator
    SepLbrack = 11,
    /// Right bracket separator
    SepRbrack = 12,
    /// List separator `,`
    SepComma = 13,

    // Operators
    /// Less than operator
    OpLt = 14,
    /// Less than or equal operator
    OpLte = 15,
    /// Greater than operator
    OpGt = 16,
    /// Greater than or equal operator
    OpGte = 17,
    /// Equals operator
    OpEq = 18,
    /// Not equals operator
    OpNeq = 19,

    // Declaration keywords
    /// RULE keyword
    KeywordRule = 20,
    /// FILTER keyword
    KeywordFilter = 21,
    /// MACRO keyword
    KeywordMacro = 22,
    /// LIST keyword
    KeywordList = 23,

    // Field keywords
    /// NAME keyword
    KeywordName = 24,
    /// ITEMS keyword
    KeywordItems = 25,
    /// CONDITION keyword
    KeywordCondition = 26,
    /// DESC keyword
    KeywordDesc = 27,
    /// ACTION keyword
    KeywordAction = 28,
    /// OUTPUT keyword
    KeywordOutput = 29,
    /// PRIORITY keyword
    KeywordPriority = 30,
    /// TAGS keyword
    KeywordTags = 31,

    // Logical keywords
    /// AND keyword
    KeywordAnd = 32,
    /// OR keyword
    KeywordOr = 33,
    /// NOT keyword
    KeywordNot = 34,

    // Predicate keywords
    /// IN keyword
    KeywordIn = 35,
    /// CONTAINS keyword
    KeywordContains = 36,
    /// ICONTAINS keyword
    KeywordIContains = 37,
    /// STARTSWITH keyword
    KeywordStartsWith = 38,
    /// ENDSWITH keyword
    KeywordEndsWith = 39,
    /// PMATCH keyword
    KeywordPMatch = 40,
    /// EXISTS keyword
    KeywordExists = 41,
}

/// Reserved words, matched case-sensitively
static KEYWORDS: Lazy<HashMap<&'static str, Token>> = Lazy::new(|| {
    HashMap::from([
        ("rule", Token::KeywordRule),
        ("filter", Token::KeywordFilter),
        ("macro", Token::KeywordMacro),
        ("list", Token::KeywordList),
        ("name", Token::KeywordName),
        ("items", Token::KeywordItems),
        ("condition", Token::KeywordCondition),
        ("desc", Token::KeywordDesc),
        ("action", Token::KeywordAction),
        ("output", Token::KeywordOutput),
        ("priority", Token::KeywordPriority),
        ("tags", Token::KeywordTags),
        ("and", Token::KeywordAnd),
        ("or", Token::KeywordOr),
        ("not", Token::KeywordNot),
        ("in", Token::KeywordIn),
        ("contains", Token::KeywordContains),
        ("icontains", Token::KeywordIContains),
        ("startswith", Token::KeywordStartsWith),
        ("endswith", Token::KeywordEndsWith),
        ("pmatch", Token::KeywordPMatch),
        ("exists", Token::KeywordExists),
    ])
});

/// Severity names, matched case-insensitively
pub const SEVERITY_NAMES: [&str; 12] = [
    "emergency",
    "alert",
    "critical",
    "error",
    "warning",
    "notice",
    "informational",
    "info",
    "debug",
    "high",
    "medium",
    "low",
];

impl Token {
    /// Get the literal representation of the token
    pub fn literal(&self) -> &'static str {
        match self {
            Token::Identifier => "identifier",
            Token::LitNumber => "number",
            Token::LitPath => "path",
            Token::LitString => "string",
            Token::LitSeverity => "severity level",
            Token::SepDecl => "-",
            Token::SepDef => ":",
            Token::SepLpar => "(",
            Token::SepRpar => ")",
            Token::SepLbrack => "[",
            Token::SepRbrack => "]",
            Token::SepComma => ",",
            Token::OpLt => "<",
            Token::OpLte => "<=",
            Token::OpGt => ">",
            Token::OpGte => ">=",
            Token::OpEq => "=",
            Token::OpNeq => "!=",
            Token::KeywordRule => "rule",
            Token::KeywordFilter => "filter",
            Token::KeywordMacro => "macro",
            Token::KeywordList => "list",
            Token::KeywordName => "name",
            Token::KeywordItems => "items",
            Token::KeywordCondition => "condition",
            Token::KeywordDesc => "desc",
            Token::KeywordAction => "action",
            Token::KeywordOutput => "output",
            Token::KeywordPriority => "priority",
            Token::KeywordTags => "tags",
            Token::KeywordAnd => "and",
            Token::KeywordOr => "or",
            Token::KeywordNot => "not",
            Token::KeywordIn => "in",
            Token::KeywordContains => "contains",
            Token::KeywordIContains => "icontains",
            Token::KeywordStartsWith => "startswith",
            Token::KeywordEndsWith => "endswith",
            Token::KeywordPMatch => "pmatch",
            Token::KeywordExists => "exists",
            Token::LitEof => "end of input",
            Token::Unsupported => "unsupported character",
        }
    }

    /// Check whether the token has a fixed spelling (keywords, operators, separators)
    pub fn is_fixed(&self) -> bool {
        !matches!(
            self,
            Token::Identifier
                | Token::LitNumber
                | Token::LitPath
                | Token::LitString
                | Token::LitSeverity
                | Token::LitEof
                | Token::Unsupported
        )
    }

    /// Look up a reserved word
    pub fn from_keyword(s: &str) -> Option<Token> {
        KEYWORDS.get(s).copied()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_fixed() {
            write!(f, "'{}'", self.literal())
        } else {
            f.write_str(self.literal())
        }
    }
}

/// Location of a token in the source text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    /// Byte offset of the first character
    pub start: usize,
    /// Byte offset one past the last character
    pub end: usize,
    /// 1-based line number
    pub line: usize,
    /// 1-based column, counted in characters
    pub column: usize,
}

impl Span {
    /// Create a new span
    pub fn new(start: usize, end: usize, line: usize, column: usize) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Lexical token with its value
#[derive(Debug, Clone)]
pub struct Item {
    /// The token type
    pub token: Token,
    /// The token value, exactly as written in the source
    pub value: String,
    /// Where the token was found
    pub span: Span,
}

impl PartialEq for Item {
    fn eq(&self, other: &Self) -> bool {
        self.token == other.token && self.value == other.value
    }
}

impl Item {
    /// Create a new item
    pub fn new(token: Token, value: impl Into<String>, span: Span) -> Self {
        Self {
            token,
            value: value.into(),
            span,
        }
    }

    /// Describe the item for diagnostics
    pub fn describe(&self) -> String {
        match self.token {
            Token::LitEof => "end of input".to_string(),
            _ => format!("'{}'", self.value),
        }
    }
}

/// Classify a word scanned by the lexer
pub fn check_keyword(input: &str) -> Token {
    if input == "-" {
        return Token::SepDecl;
    }
    if let Some(keyword) = Token::from_keyword(input) {
        return keyword;
    }
    if SEVERITY_NAMES
        .iter()
        .any(|name| input.eq_ignore_ascii_case(name))
    {
        return Token::LitSeverity;
    }
    if is_number(input) {
        Token::LitNumber
    } else if is_identifier(input) {
        Token::Identifier
    } else {
        Token::LitPath
    }
}

/// `-?digits(.digits)?`
fn is_number(input: &str) -> bool {
    let digits = input.strip_prefix('-').unwrap_or(input);
    let (int, frac) = match digits.split_once('.') {
        Some((int, frac)) => (int, Some(frac)),
        None => (digits, None),
    };
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    all_digits(int) && frac.map_or(true, all_digits)
}

/// Letter or underscore first, then letters, digits, `_`, `.` or `-`, with an
/// optional `[index]` suffix
pub(crate) fn is_identifier(input: &str) -> bool {
    let (head, index) = match input.find('[') {
        Some(pos) => (&input[..pos], Some(&input[pos..])),
        None => (input, None),
    };
    let mut chars = head.chars();
    let first_ok = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_');
    first_ok
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        && index.map_or(true, is_index_suffix)
}

/// `[` followed by one or more index characters and `]`
pub(crate) fn is_index_suffix(input: &str) -> bool {
    input
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .is_some_and(|inner| !inner.is_empty() && inner.chars().all(is_index_char))
}

/// Characters accepted inside an identifier index suffix
pub(crate) fn is_index_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-' | '/')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_keyword_reserved_words() {
        assert_eq!(check_keyword("rule"), Token::KeywordRule);
        assert_eq!(check_keyword("pmatch"), Token::KeywordPMatch);
        assert_eq!(check_keyword("endswith"), Token::KeywordEndsWith);
        // Keywords are case-sensitive
        assert_eq!(check_keyword("AND"), Token::Identifier);
    }

    #[test]
    fn test_check_keyword_severity_is_case_insensitive() {
        assert_eq!(check_keyword("low"), Token::LitSeverity);
        assert_eq!(check_keyword("WARNING"), Token::LitSeverity);
        assert_eq!(check_keyword("Critical"), Token::LitSeverity);
    }

    #[test]
    fn test_check_keyword_literals() {
        assert_eq!(check_keyword("-"), Token::SepDecl);
        assert_eq!(check_keyword("42"), Token::LitNumber);
        assert_eq!(check_keyword("-7"), Token::LitNumber);
        assert_eq!(check_keyword("3.14"), Token::LitNumber);
        assert_eq!(check_keyword("proc.name"), Token::Identifier);
        assert_eq!(check_keyword("proc.aname[2]"), Token::Identifier);
        assert_eq!(check_keyword("_private-thing"), Token::Identifier);
        assert_eq!(check_keyword("/usr/bin/*"), Token::LitPath);
        assert_eq!(check_keyword("1.2.3"), Token::LitPath);
        assert_eq!(check_keyword("%proc.name"), Token::LitPath);
    }

    #[test]
    fn test_token_display() {
        assert_eq!(Token::KeywordCondition.to_string(), "'condition'");
        assert_eq!(Token::SepRbrack.to_string(), "']'");
        assert_eq!(Token::Identifier.to_string(), "identifier");
        assert_eq!(Token::LitEof.to_string(), "end of input");
    }

    #[test]
    fn test_item_equality_ignores_span() {
        let a = Item::new(Token::Identifier, "x", Span::new(0, 1, 1, 1));
        let b = Item::new(Token::Identifier, "x", Span::new(10, 11, 2, 4));
        assert_eq!(a, b);
        assert_eq!(a.describe(), "'x'");
    }
}
