use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use sfpl_rs::{parse_policy_with_config, LoaderConfig, PolicySet};
use std::path::{Path, PathBuf};
use yansi::Paint;

#[derive(Parser)]
#[command(name = "sfpl", author, version)]
#[command(about = "Check and inspect security policy files", long_about = None)]
struct Cli {
    /// Loader configuration file (YAML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse policy files and directories and report syntax errors
    Check {
        /// Files or directories to check
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Print the parsed document as JSON
    Ast {
        /// Policy file
        file: PathBuf,
        /// Pretty-print the JSON
        #[arg(short, long)]
        pretty: bool,
    },
    /// Print the policy in canonical form
    Fmt {
        /// Policy file
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    sfpl_rs::init_tracing(cli.json_logs, &cli.log_level);

    let config = match &cli.config {
        Some(path) => LoaderConfig::from_yaml_file(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => LoaderConfig::default(),
    };

    match cli.command {
        Commands::Check { paths } => check(&paths, &config).await,
        Commands::Ast { file, pretty } => {
            let document = parse_file(&file, &config).await?;
            let json = if pretty {
                serde_json::to_string_pretty(&document)?
            } else {
                serde_json::to_string(&document)?
            };
            println!("{json}");
            Ok(())
        }
        Commands::Fmt { file } => {
            let document = parse_file(&file, &config).await?;
            print!("{document}");
            Ok(())
        }
    }
}

async fn check(paths: &[PathBuf], config: &LoaderConfig) -> Result<()> {
    // Report every file rather than stopping at the first rejection
    let config = config.clone().fail_on_parse_error(false);
    let set = PolicySet::load(paths, &config).await?;

    for (path, error) in set.errors() {
        eprintln!("{}:{}: {}", path.display(), error.span, error.kind.red());
    }

    let meta = set.metadata();
    let summary = format!(
        "{} files, {} declarations, {} rejected",
        meta.total_files(),
        meta.declarations(),
        meta.rejected_files()
    );
    if set.is_ok() {
        eprintln!("{} {summary}", "ok".green().bold());
        Ok(())
    } else {
        eprintln!("{} {summary}", "failed".red().bold());
        bail!("{} policy file(s) rejected", meta.rejected_files())
    }
}

async fn parse_file(path: &Path, config: &LoaderConfig) -> Result<sfpl_rs::PolicyDocument> {
    let source = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    let outcome = parse_policy_with_config(&source, config.parser);
    if !outcome.is_ok() {
        for error in &outcome.errors {
            eprintln!("{}:{error}", path.display());
        }
        bail!("{} has {} syntax error(s)", path.display(), outcome.errors.len());
    }
    Ok(outcome.document)
}
