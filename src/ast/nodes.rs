use crate::lexer::{Item, Token};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Literal operand with its lexical kind
///
/// The kind is kept because comparison and membership semantics (numeric,
/// string, path glob) are chosen from it downstream.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Literal {
    /// Bare identifier used as a value (usually a field name)
    Identifier(String),
    /// Number, as written
    Number(String),
    /// Path-like word, including bare `<` and `>`
    Path(String),
    /// Quoted string, quotes included
    QuotedString(String),
}

impl Literal {
    /// Build a literal from an atom token; `None` when the token is not an atom
    pub fn from_item(item: &Item) -> Option<Self> {
        let value = item.value.clone();
        match item.token {
            Token::Identifier => Some(Literal::Identifier(value)),
            Token::LitNumber => Some(Literal::Number(value)),
            Token::LitPath | Token::OpLt | Token::OpGt => Some(Literal::Path(value)),
            Token::LitString => Some(Literal::QuotedString(value)),
            _ => None,
        }
    }

    /// Shorthand for an identifier literal
    pub fn ident(value: impl Into<String>) -> Self {
        Literal::Identifier(value.into())
    }

    /// The literal exactly as written in the source
    pub fn lexeme(&self) -> &str {
        match self {
            Literal::Identifier(s)
            | Literal::Number(s)
            | Literal::Path(s)
            | Literal::QuotedString(s) => s,
        }
    }

    /// The literal value, with bounding quotes and escapes removed from strings
    pub fn value(&self) -> Cow<'_, str> {
        match self {
            Literal::QuotedString(s) => unquote(s),
            other => Cow::Borrowed(other.lexeme()),
        }
    }

    /// Numeric value of a number literal
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Literal::Number(s) => s.parse().ok(),
            _ => None,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.lexeme())
    }
}

/// Strip bounding quotes and resolve backslash escapes
pub(crate) fn unquote(s: &str) -> Cow<'_, str> {
    let quote = match s.chars().next() {
        Some(q @ ('"' | '\'')) if s.len() >= 2 && s.ends_with(q) => q,
        _ => return Cow::Borrowed(s),
    };
    let inner = &s[1..s.len() - 1];
    if !inner.contains('\\') {
        return Cow::Borrowed(inner);
    }

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(escaped) if escaped == quote || escaped == '\\' => out.push(escaped),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push('\\'),
            },
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BinaryOp {
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `=`
    Eq,
    /// `!=`
    Neq,
    /// `contains`
    Contains,
    /// `icontains`
    IContains,
    /// `startswith`
    StartsWith,
    /// `endswith`
    EndsWith,
}

impl BinaryOp {
    /// Concrete syntax of the operator
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Eq => "=",
            BinaryOp::Neq => "!=",
            BinaryOp::Contains => "contains",
            BinaryOp::IContains => "icontains",
            BinaryOp::StartsWith => "startswith",
            BinaryOp::EndsWith => "endswith",
        }
    }
}

/// Unary test operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnaryOp {
    /// `exists`
    Exists,
}

impl UnaryOp {
    /// Concrete syntax of the operator
    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOp::Exists => "exists",
        }
    }
}

/// Set test operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetOp {
    /// `in`: membership
    In,
    /// `pmatch`: pattern match against any candidate
    PatternMatch,
}

impl SetOp {
    /// Concrete syntax of the operator
    pub fn as_str(&self) -> &'static str {
        match self {
            SetOp::In => "in",
            SetOp::PatternMatch => "pmatch",
        }
    }
}

/// Candidate of a set test
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operand {
    /// Single literal, possibly naming a list
    Literal(Literal),
    /// Inline bracketed list
    Items(Vec<Literal>),
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Literal(lit) => write!(f, "{lit}"),
            Operand::Items(items) => write_items(f, items),
        }
    }
}

/// Write `[a, b, c]`
pub(crate) fn write_items(f: &mut fmt::Formatter<'_>, items: &[Literal]) -> fmt::Result {
    f.write_str("[")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    f.write_str("]")
}

/// Boolean expression tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expression {
    /// Disjunction; the parser only builds it with two or more children
    Or(Vec<Expression>),
    /// Conjunction; the parser only builds it with two or more children
    And(Vec<Expression>),
    /// Negation
    Not(Box<Expression>),
    /// Reference to a macro, list or boolean field
    VariableRef(String),
    /// `operand exists`
    UnaryTest {
        /// Tested operand
        operand: Literal,
        /// Operator
        op: UnaryOp,
    },
    /// `left op right`
    BinaryTest {
        /// Left operand
        left: Literal,
        /// Operator
        op: BinaryOp,
        /// Right operand
        right: Literal,
    },
    /// `operand in (a, [b, c])` or `operand pmatch (...)`
    SetTest {
        /// Tested operand
        operand: Literal,
        /// Operator
        op: SetOp,
        /// Candidates in source order; may be empty
        candidates: Vec<Operand>,
    },
    /// Explicit parentheses
    Grouped(Box<Expression>),
}

impl Expression {
    /// Shorthand for a variable reference
    pub fn var(name: impl Into<String>) -> Self {
        Expression::VariableRef(name.into())
    }

    /// Remove explicit grouping and collapse nested and/or nodes of the same kind
    pub fn simplify(self) -> Expression {
        match self {
            Expression::Grouped(inner) => inner.simplify(),
            Expression::Not(inner) => Expression::Not(Box::new(inner.simplify())),
            Expression::And(children) => reduce(children, true),
            Expression::Or(children) => reduce(children, false),
            leaf => leaf,
        }
    }

    /// Names used as bare terms (`VariableRef`), in source order
    pub fn variable_refs(&self) -> Vec<&str> {
        let mut refs = Vec::new();
        self.collect_refs(&mut refs);
        refs
    }

    /// Bare identifiers among set test candidates, in source order
    ///
    /// These name lists when a matching list is declared; inline `[...]`
    /// items are not included.
    pub fn list_refs(&self) -> Vec<&str> {
        let mut refs = Vec::new();
        self.collect_list_refs(&mut refs);
        refs
    }

    fn collect_list_refs<'a>(&'a self, refs: &mut Vec<&'a str>) {
        match self {
            Expression::Or(children) | Expression::And(children) => {
                children.iter().for_each(|c| c.collect_list_refs(refs))
            }
            Expression::Not(inner) | Expression::Grouped(inner) => inner.collect_list_refs(refs),
            Expression::SetTest { candidates, .. } => {
                refs.extend(candidates.iter().filter_map(|candidate| match candidate {
                    Operand::Literal(Literal::Identifier(name)) => Some(name.as_str()),
                    _ => None,
                }))
            }
            _ => {}
        }
    }

    fn collect_refs<'a>(&'a self, refs: &mut Vec<&'a str>) {
        match self {
            Expression::Or(children) | Expression::And(children) => {
                children.iter().for_each(|c| c.collect_refs(refs))
            }
            Expression::Not(inner) | Expression::Grouped(inner) => inner.collect_refs(refs),
            Expression::VariableRef(name) => refs.push(name),
            _ => {}
        }
    }

    fn is_junction(&self) -> bool {
        matches!(self, Expression::Or(_) | Expression::And(_))
    }
}

/// Flatten children into a single and/or node
fn reduce(children: Vec<Expression>, conjunction: bool) -> Expression {
    let mut flat = Vec::with_capacity(children.len());
    for child in children {
        match (child.simplify(), conjunction) {
            (Expression::And(grand), true) | (Expression::Or(grand), false) => flat.extend(grand),
            (other, _) => flat.push(other),
        }
    }
    if flat.len() == 1 {
        return flat.remove(0);
    }
    if conjunction {
        Expression::And(flat)
    } else {
        Expression::Or(flat)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Or(children) => write_junction(f, children, " or ", |c| {
                matches!(c, Expression::Or(_))
            }),
            Expression::And(children) => {
                write_junction(f, children, " and ", Expression::is_junction)
            }
            Expression::Not(inner) if inner.is_junction() => write!(f, "not ({inner})"),
            Expression::Not(inner) => write!(f, "not {inner}"),
            Expression::VariableRef(name) => f.write_str(name),
            Expression::UnaryTest { operand, op } => write!(f, "{operand} {}", op.as_str()),
            Expression::BinaryTest { left, op, right } => {
                write!(f, "{left} {} {right}", op.as_str())
            }
            Expression::SetTest {
                operand,
                op,
                candidates,
            } => {
                write!(f, "{operand} {} (", op.as_str())?;
                for (i, candidate) in candidates.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{candidate}")?;
                }
                f.write_str(")")
            }
            Expression::Grouped(inner) => write!(f, "({inner})"),
        }
    }
}

fn write_junction(
    f: &mut fmt::Formatter<'_>,
    children: &[Expression],
    separator: &str,
    needs_parens: impl Fn(&Expression) -> bool,
) -> fmt::Result {
    for (i, child) in children.iter().enumerate() {
        if i > 0 {
            f.write_str(separator)?;
        }
        if needs_parens(child) {
            write!(f, "({child})")?;
        } else {
            write!(f, "{child}")?;
        }
    }
    Ok(())
}
