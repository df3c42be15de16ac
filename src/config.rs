//! Parser and loader configuration

use crate::error::{Result, SfplError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default maximum nesting depth of conditions
pub const DEFAULT_MAX_DEPTH: usize = 50;

/// Default maximum number of tokens in one document
pub const DEFAULT_MAX_TOKENS: usize = 100_000;

/// Parser limits and text handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Maximum nesting of parentheses and `not`
    pub max_depth: usize,
    /// Maximum number of tokens in a document
    pub max_tokens: usize,
    /// Replace whitespace runs in text fields with a single space
    pub collapse_whitespace: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_tokens: DEFAULT_MAX_TOKENS,
            collapse_whitespace: false,
        }
    }
}

impl ParserConfig {
    /// Create a configuration with default limits
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum nesting depth
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Set the maximum token count
    pub fn max_tokens(mut self, tokens: usize) -> Self {
        self.max_tokens = tokens;
        self
    }

    /// Set whether text whitespace is collapsed
    pub fn collapse_whitespace(mut self, collapse: bool) -> Self {
        self.collapse_whitespace = collapse;
        self
    }

    /// Reject limits that would make every document fail
    pub fn validate(&self) -> Result<()> {
        if self.max_depth == 0 {
            return Err(SfplError::configuration("max_depth must be greater than zero"));
        }
        if self.max_tokens == 0 {
            return Err(SfplError::configuration("max_tokens must be greater than zero"));
        }
        Ok(())
    }
}

/// Policy loader configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// File extensions treated as policy files, without the dot
    pub extensions: Vec<String>,
    /// Descend into subdirectories
    pub recursive: bool,
    /// Stop at the first file with syntax errors
    pub fail_on_parse_error: bool,
    /// Settings passed to the parser
    pub parser: ParserConfig,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["yaml".into(), "yml".into(), "sfpl".into()],
            recursive: true,
            fail_on_parse_error: false,
            parser: ParserConfig::default(),
        }
    }
}

impl LoaderConfig {
    /// Create a configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the extension list
    pub fn extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Set whether directories are walked recursively
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Set whether loading stops at the first rejected file
    pub fn fail_on_parse_error(mut self, fail: bool) -> Self {
        self.fail_on_parse_error = fail;
        self
    }

    /// Set the parser configuration
    pub fn parser(mut self, parser: ParserConfig) -> Self {
        self.parser = parser;
        self
    }

    /// Whether a path has one of the configured extensions
    pub fn matches_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
    }

    /// Parse a configuration from YAML text
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: LoaderConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| SfplError::io(path, e))?;
        Self::from_yaml_str(&contents)
    }

    /// Check the configuration for unusable values
    pub fn validate(&self) -> Result<()> {
        if self.extensions.is_empty() {
            return Err(SfplError::configuration("at least one extension is required"));
        }
        if let Some(ext) = self.extensions.iter().find(|e| e.is_empty() || e.starts_with('.')) {
            return Err(SfplError::configuration(format!(
                "invalid extension '{ext}', expected a name without a leading dot"
            )));
        }
        self.parser.validate()
    }
}
