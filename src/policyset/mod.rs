//! PolicySet implementation for loading policy files from disk
//!
//! Files are discovered with `tokio::fs`, parsed on the blocking pool and kept
//! in path order so repeated loads of the same tree give the same result.

use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::{
    ast::{Declaration, PolicyDocument},
    config::{LoaderConfig, ParserConfig},
    parser::{parse_policy_with_config, SyntaxError},
    Result, SfplError,
};

/// One parsed policy file
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyFile {
    /// Where the policy was read from
    pub path: PathBuf,
    /// Declarations that parsed cleanly
    pub document: PolicyDocument,
    /// Syntax errors found in the file
    pub errors: Vec<SyntaxError>,
}

impl PolicyFile {
    /// Parse policy source attributed to `path`
    pub fn parse(path: impl Into<PathBuf>, source: &str, config: ParserConfig) -> Self {
        let outcome = parse_policy_with_config(source, config);
        Self {
            path: path.into(),
            document: outcome.document,
            errors: outcome.errors,
        }
    }

    /// Whether the file parsed without errors
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Metadata about the loaded policy set
#[derive(Debug, Clone)]
pub struct PolicySetMetadata {
    /// Number of files loaded
    total_files: usize,
    /// Number of files with syntax errors
    rejected_files: usize,
    /// Number of declarations across all files
    declarations: usize,
    /// When the set was created
    loaded_at: Instant,
}

impl PolicySetMetadata {
    /// Number of files loaded
    pub fn total_files(&self) -> usize {
        self.total_files
    }

    /// Number of files with syntax errors
    pub fn rejected_files(&self) -> usize {
        self.rejected_files
    }

    /// Number of declarations across all files
    pub fn declarations(&self) -> usize {
        self.declarations
    }

    /// When the set was created
    pub fn loaded_at(&self) -> Instant {
        self.loaded_at
    }
}

/// Collection of parsed policy files
#[derive(Debug, Clone)]
pub struct PolicySet {
    files: Vec<PolicyFile>,
    metadata: PolicySetMetadata,
}

impl Default for PolicySet {
    fn default() -> Self {
        Self::new()
    }
}

impl PolicySet {
    /// Create an empty set
    pub fn new() -> Self {
        Self {
            files: Vec::new(),
            metadata: PolicySetMetadata {
                total_files: 0,
                rejected_files: 0,
                declarations: 0,
                loaded_at: Instant::now(),
            },
        }
    }

    /// Load every policy file under the given files and directories
    pub async fn load<P: AsRef<Path>>(paths: &[P], config: &LoaderConfig) -> Result<Self> {
        config.validate()?;
        let mut set = Self::new();
        for path in paths {
            set.load_path(path.as_ref(), config).await?;
        }

        info!(
            "Loaded policy set: {} files, {} declarations, {} rejected",
            set.metadata.total_files, set.metadata.declarations, set.metadata.rejected_files
        );
        Ok(set)
    }

    /// Load a single file, or every matching file below a directory
    pub async fn load_path(&mut self, path: &Path, config: &LoaderConfig) -> Result<()> {
        let meta = tokio::fs::metadata(path)
            .await
            .map_err(|e| SfplError::io(path, e))?;
        let paths = if meta.is_dir() {
            collect_files(path, config).await?
        } else {
            vec![path.to_path_buf()]
        };
        debug!("Found {} policy files under {}", paths.len(), path.display());

        let mut tasks = JoinSet::new();
        for file in paths {
            let parser = config.parser;
            tasks.spawn(async move { load_file(file, parser).await });
        }

        let mut loaded = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            let file = joined.map_err(|e| SfplError::Runtime(e.to_string()))??;
            loaded.push(file);
        }
        loaded.sort_by(|a, b| a.path.cmp(&b.path));

        for file in loaded {
            if !file.is_ok() {
                warn!(
                    "Rejected policy {}: {} syntax error(s)",
                    file.path.display(),
                    file.errors.len()
                );
                if config.fail_on_parse_error {
                    return Err(SfplError::rejected(file.path, file.errors));
                }
            }
            self.push(file);
        }
        Ok(())
    }

    /// Add an already parsed file
    pub fn push(&mut self, file: PolicyFile) {
        self.metadata.total_files += 1;
        self.metadata.declarations += file.document.len();
        if !file.is_ok() {
            self.metadata.rejected_files += 1;
        }
        self.files.push(file);
    }

    /// Loaded files in load order
    pub fn files(&self) -> &[PolicyFile] {
        &self.files
    }

    /// Number of files
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether no file has been loaded
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Whether every file parsed without errors
    pub fn is_ok(&self) -> bool {
        self.metadata.rejected_files == 0
    }

    /// Every syntax error with the file it came from
    pub fn errors(&self) -> impl Iterator<Item = (&Path, &SyntaxError)> {
        self.files
            .iter()
            .flat_map(|f| f.errors.iter().map(move |e| (f.path.as_path(), e)))
    }

    /// Every declaration across all files, in load order
    pub fn declarations(&self) -> impl Iterator<Item = &Declaration> {
        self.files.iter().flat_map(|f| f.document.declarations.iter())
    }

    /// Get policy set metadata
    pub fn metadata(&self) -> &PolicySetMetadata {
        &self.metadata
    }
}

/// Read and parse one file; parsing runs on the blocking pool
async fn load_file(path: PathBuf, config: ParserConfig) -> Result<PolicyFile> {
    debug!("Loading policy from {}", path.display());
    let source = tokio::fs::read_to_string(&path)
        .await
        .map_err(|e| SfplError::io(&path, e))?;
    tokio::task::spawn_blocking(move || PolicyFile::parse(path, &source, config))
        .await
        .map_err(|e| SfplError::Runtime(e.to_string()))
}

/// Files below `dir` with a configured extension
async fn collect_files(dir: &Path, config: &LoaderConfig) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    let mut pending = vec![dir.to_path_buf()];

    while let Some(current) = pending.pop() {
        let mut entries = tokio::fs::read_dir(&current)
            .await
            .map_err(|e| SfplError::io(&current, e))?;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| SfplError::io(&current, e))?
        {
            let path = entry.path();
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| SfplError::io(&path, e))?;
            if file_type.is_dir() {
                if config.recursive {
                    pending.push(path);
                }
            } else if config.matches_extension(&path) {
                found.push(path);
            }
        }
    }

    found.sort();
    Ok(found)
}
