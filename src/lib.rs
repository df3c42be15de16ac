//! Parser and AST for a dash-prefixed security policy language
//!
//! Policies are made of four kinds of declarations: rules, filters, macros and
//! lists. Rules and filters carry a boolean condition over event fields; macros
//! name reusable condition fragments and lists name sets of literals.
//!
//! The crate turns policy text into a [`PolicyDocument`] plus every syntax error
//! found in one pass. It does not evaluate conditions or link macro and list
//! names. [`Expression::variable_refs`] lists names used as bare terms and
//! [`Expression::list_refs`] lists identifiers used as set candidates.
//!
//! # Example
//!
//! ```
//! use sfpl_rs::{parse_policy, Declaration, Priority};
//!
//! let outcome = parse_policy(
//!     r#"
//! - macro: spawned_process
//!   condition: evt.type = execve and evt.dir = <
//!
//! - rule: Shell in container
//!   desc: A shell was spawned in a container
//!   condition: spawned_process and proc.name in (bash, sh)
//!   output: Shell spawned (user=%user.name)
//!   priority: WARNING
//! "#,
//! );
//!
//! assert!(outcome.is_ok());
//! let rule = outcome.document.rules().next().unwrap();
//! assert_eq!(rule.name.as_str(), "Shell in container");
//! assert_eq!(rule.priority.priority(), Priority::Medium);
//! assert_eq!(rule.condition.variable_refs(), vec!["spawned_process"]);
//! assert_eq!(rule.condition.list_refs(), vec!["bash", "sh"]);
//! ```
//!
//! # Loading policy directories
//!
//! ```no_run
//! use sfpl_rs::{LoaderConfig, PolicySet};
//!
//! # async fn example() -> sfpl_rs::Result<()> {
//! let config = LoaderConfig::new().fail_on_parse_error(true);
//! let set = PolicySet::load(&["/etc/policies"], &config).await?;
//! println!("{} declarations", set.metadata().declarations());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]

// Re-export commonly used items
pub use ast::{
    BinaryOp, Declaration, Effect, Expression, FilterDecl, ListDecl, Literal, MacroDecl,
    Operand, PolicyDocument, Priority, RuleDecl, SeverityLevel, SetOp, Text, UnaryOp,
};
pub use config::{LoaderConfig, ParserConfig};
pub use error::{Result, SfplError};
pub use lexer::{tokenize, Item, Span, Token, TokenStream};
pub use parser::{
    parse, parse_declaration_str, parse_expression_str, parse_policy, parse_policy_with_config,
    parse_with_config, ParseOutcome, Parser, SyntaxError, SyntaxErrorKind,
};
pub use policyset::{PolicyFile, PolicySet, PolicySetMetadata};

/// Policy document model
pub mod ast;

/// Parser and loader configuration
pub mod config;

/// Error types
pub mod error;

/// Lexical analysis
pub mod lexer;

/// Parser implementation
pub mod parser;

/// Loading policy files from disk
pub mod policyset;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the tracing subscriber
///
/// `RUST_LOG` takes precedence over `default_level`. With `json` set, events
/// are written as JSON lines, otherwise in the compact human format.
pub fn init_tracing(json: bool, default_level: &str) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let registry = tracing_subscriber::registry().with(filter);
    let fmt = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    if json {
        registry.with(fmt.json()).init();
    } else {
        registry.with(fmt.compact()).init();
    }
}
