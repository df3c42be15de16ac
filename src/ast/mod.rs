//! Policy document model
//!
//! Everything here is produced by the parser in a single pass and never
//! mutated afterwards. Names used in conditions are kept as written; linking
//! them against macros and lists is left to the consumer of the document.

/// Expression tree and literals
pub mod nodes;
pub use nodes::*;

use crate::lexer::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Parsed policy file: declarations in source order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicyDocument {
    /// All declarations, in the order they appear
    pub declarations: Vec<Declaration>,
}

impl PolicyDocument {
    /// Create a document from declarations
    pub fn new(declarations: Vec<Declaration>) -> Self {
        Self { declarations }
    }

    /// Number of declarations
    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    /// Whether the document holds no declarations
    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// Rule declarations in source order
    pub fn rules(&self) -> impl Iterator<Item = &RuleDecl> {
        self.declarations.iter().filter_map(|d| match d {
            Declaration::Rule(rule) => Some(rule),
            _ => None,
        })
    }

    /// Filter declarations in source order
    pub fn filters(&self) -> impl Iterator<Item = &FilterDecl> {
        self.declarations.iter().filter_map(|d| match d {
            Declaration::Filter(filter) => Some(filter),
            _ => None,
        })
    }

    /// Macro declarations in source order
    pub fn macros(&self) -> impl Iterator<Item = &MacroDecl> {
        self.declarations.iter().filter_map(|d| match d {
            Declaration::Macro(m) => Some(m),
            _ => None,
        })
    }

    /// List declarations in source order
    pub fn lists(&self) -> impl Iterator<Item = &ListDecl> {
        self.declarations.iter().filter_map(|d| match d {
            Declaration::List(list) => Some(list),
            _ => None,
        })
    }
}

impl fmt::Display for PolicyDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, decl) in self.declarations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{decl}")?;
        }
        Ok(())
    }
}

/// One top-level declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Declaration {
    /// `- rule:`
    Rule(RuleDecl),
    /// `- filter:`
    Filter(FilterDecl),
    /// `- macro:`
    Macro(MacroDecl),
    /// `- list:`
    List(ListDecl),
}

impl Declaration {
    /// Keyword that introduces the declaration
    pub fn keyword(&self) -> &'static str {
        match self {
            Declaration::Rule(_) => "rule",
            Declaration::Filter(_) => "filter",
            Declaration::Macro(_) => "macro",
            Declaration::List(_) => "list",
        }
    }

    /// Name or id of the declaration
    pub fn name(&self) -> &str {
        match self {
            Declaration::Rule(rule) => rule.name.as_str(),
            Declaration::Filter(filter) => &filter.id,
            Declaration::Macro(m) => &m.id,
            Declaration::List(list) => &list.id,
        }
    }

    /// Position of the `-` that starts the declaration
    pub fn span(&self) -> Span {
        match self {
            Declaration::Rule(rule) => rule.span,
            Declaration::Filter(filter) => filter.span,
            Declaration::Macro(m) => m.span,
            Declaration::List(list) => list.span,
        }
    }
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Declaration::Rule(rule) => write!(f, "{rule}"),
            Declaration::Filter(filter) => write!(f, "{filter}"),
            Declaration::Macro(m) => write!(f, "{m}"),
            Declaration::List(list) => write!(f, "{list}"),
        }
    }
}

/// Detection rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleDecl {
    /// Rule name, free text
    pub name: Text,
    /// Description, free text
    pub description: Text,
    /// Matching condition
    pub condition: Expression,
    /// What happens on a match
    pub effect: Effect,
    /// Severity
    pub priority: SeverityLevel,
    /// Tags; empty when the field is omitted
    #[serde(default)]
    pub tags: Vec<Literal>,
    /// Event types the rule applies to; empty when omitted
    #[serde(default)]
    pub prefilter: Vec<Literal>,
    /// Whether the rule is active
    #[serde(default = "enabled_default")]
    pub enabled: bool,
    /// Position of the declaration marker
    #[serde(default)]
    pub span: Span,
}

fn enabled_default() -> bool {
    true
}

impl fmt::Display for RuleDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "- rule: {}", self.name)?;
        writeln!(f, "  desc: {}", self.description)?;
        writeln!(f, "  condition: {}", self.condition)?;
        writeln!(f, "  {}", self.effect)?;
        writeln!(f, "  priority: {}", self.priority)?;
        if !self.tags.is_empty() {
            write!(f, "  tags: ")?;
            write_items(f, &self.tags)?;
            writeln!(f)?;
        }
        if !self.prefilter.is_empty() {
            write!(f, "  prefilter: ")?;
            write_items(f, &self.prefilter)?;
            writeln!(f)?;
        }
        if !self.enabled {
            writeln!(f, "  enabled: false")?;
        }
        Ok(())
    }
}

/// Rule effect: exactly one of `action` or `output`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Effect {
    /// `action: ...`
    Action(Text),
    /// `output: ...`
    Output(Text),
}

impl Effect {
    /// The effect text
    pub fn text(&self) -> &Text {
        match self {
            Effect::Action(text) | Effect::Output(text) => text,
        }
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Effect::Action(text) => write!(f, "action: {text}"),
            Effect::Output(text) => write!(f, "output: {text}"),
        }
    }
}

/// Named, reusable filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterDecl {
    /// Filter id
    pub id: String,
    /// Filter condition
    pub condition: Expression,
    /// Whether the filter is active
    #[serde(default = "enabled_default")]
    pub enabled: bool,
    /// Position of the declaration marker
    #[serde(default)]
    pub span: Span,
}

impl fmt::Display for FilterDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "- filter: {}", self.id)?;
        writeln!(f, "  condition: {}", self.condition)?;
        if !self.enabled {
            writeln!(f, "  enabled: false")?;
        }
        Ok(())
    }
}

/// Named condition fragment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacroDecl {
    /// Macro id
    pub id: String,
    /// Macro body
    pub condition: Expression,
    /// Position of the declaration marker
    #[serde(default)]
    pub span: Span,
}

impl fmt::Display for MacroDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "- macro: {}", self.id)?;
        writeln!(f, "  condition: {}", self.condition)
    }
}

/// Named list of literals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListDecl {
    /// List id
    pub id: String,
    /// List elements, duplicates kept
    pub items: Vec<Literal>,
    /// Position of the declaration marker
    #[serde(default)]
    pub span: Span,
}

impl fmt::Display for ListDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "- list: {}", self.id)?;
        write!(f, "  items: ")?;
        write_items(f, &self.items)?;
        writeln!(f)
    }
}

/// Free-form text, exactly as written in the source
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Text(String);

impl Text {
    /// Wrap raw text
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The raw text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Copy with every whitespace run replaced by a single space
    pub fn collapsed(&self) -> Text {
        Text(self.0.split_whitespace().collect::<Vec<_>>().join(" "))
    }
}

impl fmt::Display for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for Text {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Text {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Severity assigned to a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeverityLevel {
    /// `emergency`
    Emergency,
    /// `alert`
    Alert,
    /// `critical`
    Critical,
    /// `error`
    Error,
    /// `warning`
    Warning,
    /// `notice`
    Notice,
    /// `informational`
    Informational,
    /// `info`
    Info,
    /// `debug`
    Debug,
    /// `high`
    High,
    /// `medium`
    Medium,
    /// `low`
    Low,
}

impl SeverityLevel {
    /// Look up a severity name, ignoring ASCII case
    pub fn from_name(name: &str) -> Option<Self> {
        let level = match name.to_ascii_lowercase().as_str() {
            "emergency" => SeverityLevel::Emergency,
            "alert" => SeverityLevel::Alert,
            "critical" => SeverityLevel::Critical,
            "error" => SeverityLevel::Error,
            "warning" => SeverityLevel::Warning,
            "notice" => SeverityLevel::Notice,
            "informational" => SeverityLevel::Informational,
            "info" => SeverityLevel::Info,
            "debug" => SeverityLevel::Debug,
            "high" => SeverityLevel::High,
            "medium" => SeverityLevel::Medium,
            "low" => SeverityLevel::Low,
            _ => return None,
        };
        Some(level)
    }

    /// Canonical lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            SeverityLevel::Emergency => "emergency",
            SeverityLevel::Alert => "alert",
            SeverityLevel::Critical => "critical",
            SeverityLevel::Error => "error",
            SeverityLevel::Warning => "warning",
            SeverityLevel::Notice => "notice",
            SeverityLevel::Informational => "informational",
            SeverityLevel::Info => "info",
            SeverityLevel::Debug => "debug",
            SeverityLevel::High => "high",
            SeverityLevel::Medium => "medium",
            SeverityLevel::Low => "low",
        }
    }

    /// Fold onto the three-level priority scale
    pub fn priority(&self) -> Priority {
        match self {
            SeverityLevel::Debug
            | SeverityLevel::Info
            | SeverityLevel::Informational
            | SeverityLevel::Notice
            | SeverityLevel::Low => Priority::Low,
            SeverityLevel::Warning | SeverityLevel::Medium => Priority::Medium,
            SeverityLevel::Error
            | SeverityLevel::Critical
            | SeverityLevel::Alert
            | SeverityLevel::Emergency
            | SeverityLevel::High => Priority::High,
        }
    }
}

impl fmt::Display for SeverityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse rule priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Low
    Low,
    /// Medium
    Medium,
    /// High
    High,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        };
        f.write_str(s)
    }
}
