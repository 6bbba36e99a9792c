//! # CLI Module
//!
//! Command-line front end for the access mediator.
//!
//! Every invocation builds one mediator around the [`EchoService`] demo
//! delegate, drives the requested keys through it and prints the responses.
//! With `--db` the memo table lives in a redb file and persists across
//! invocations; `--warm`/`--save` move memo tables through snapshot files.

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};
use wicket_core::formats::{self, CacheSnapshot};
use wicket_core::{
    AccessMediator, DelegateError, EchoService, MediatorConfig, MediatorError, MediatorStats,
    Response, SnapshotError,
};

// =============================================================================
// ERRORS
// =============================================================================

/// Errors surfaced by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Mediator(#[from] MediatorError),

    #[error("Snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),
}

pub type CliResult<T> = Result<T, CliError>;

fn read_file(path: &Path) -> CliResult<Vec<u8>> {
    std::fs::read(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write_file(path: &Path, bytes: &[u8]) -> CliResult<()> {
    std::fs::write(path, bytes).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}

// =============================================================================
// ARGUMENTS
// =============================================================================

/// Wicket: admission-checked, memoizing front for an expensive service.
#[derive(Debug, Parser)]
#[command(name = "wicket", version, about)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command.
#[derive(Debug, Clone, Default, Args)]
pub struct GlobalOpts {
    /// JSON config file (flags override its values).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Deny keys containing this substring (repeatable). Replaces the
    /// default "forbidden" rule.
    #[arg(long = "deny", value_name = "SUBSTR", global = true)]
    pub deny: Vec<String>,

    /// Admit every key.
    #[arg(long, global = true)]
    pub allow_all: bool,

    /// Bound the memo table to N entries (LRU eviction).
    #[arg(long, value_name = "N", global = true)]
    pub capacity: Option<usize>,

    /// Persist the memo table in this redb database.
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Load memoized responses from a snapshot before running.
    #[arg(long, value_name = "SNAPSHOT", global = true)]
    pub warm: Option<PathBuf>,

    /// Write the memo table to a snapshot after running.
    #[arg(long, value_name = "SNAPSHOT", global = true)]
    pub save: Option<PathBuf>,

    /// Print JSON instead of text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Print mediator statistics after the responses.
    #[arg(long, global = true)]
    pub stats: bool,

    /// Debug logging on stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run keys through the mediator.
    Handle {
        /// Request keys, handled in order.
        #[arg(required = true)]
        keys: Vec<String>,
    },

    /// Run keys read from a file through the mediator.
    Batch {
        /// File holding the keys.
        file: PathBuf,

        /// How the file is laid out.
        #[arg(long, value_enum, default_value_t = KeyFormat::Text)]
        format: KeyFormat,
    },

    /// Inspect or produce cache snapshots.
    Snapshot {
        #[command(subcommand)]
        action: SnapshotCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum SnapshotCommand {
    /// Write the current memo table (from --db and/or --warm) to a file.
    Export {
        /// Destination snapshot file.
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Print the entries of a snapshot file.
    Show {
        /// Snapshot file to read.
        file: PathBuf,
    },
}

/// Layout of a key file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KeyFormat {
    /// JSON array of strings.
    Json,
    /// One key per line; blank lines are skipped.
    Text,
}

// =============================================================================
// MEDIATOR ASSEMBLY
// =============================================================================

/// Factory for the demo delegate.
pub type EchoFactory = fn() -> Result<EchoService, DelegateError>;

fn echo_factory() -> Result<EchoService, DelegateError> {
    Ok(EchoService::new())
}

/// Merge the config file (if any) with command-line flags.
pub fn resolve_config(opts: &GlobalOpts) -> CliResult<MediatorConfig> {
    let mut config = match &opts.config {
        Some(path) => serde_json::from_slice(&read_file(path)?)?,
        None => MediatorConfig::default(),
    };

    if !opts.deny.is_empty() {
        config.deny_substrings.clone_from(&opts.deny);
    }
    if opts.allow_all {
        config.allow_all = true;
    }
    if opts.capacity.is_some() {
        config.capacity = opts.capacity;
    }
    if opts.db.is_some() {
        config.db_path.clone_from(&opts.db);
    }

    config.validate()?;
    debug!(?config, "resolved config");
    Ok(config)
}

/// Build a mediator from the global options, warming it if requested.
pub fn build_mediator(opts: &GlobalOpts) -> CliResult<AccessMediator<EchoFactory>> {
    let config = resolve_config(opts)?;
    let mediator = AccessMediator::from_config(echo_factory as EchoFactory, &config)?;

    if let Some(path) = &opts.warm {
        let snapshot = load_snapshot(path)?;
        let loaded = mediator.warm(&snapshot)?;
        info!(path = %path.display(), loaded, "warm start");
    }
    Ok(mediator)
}

/// Read and decode a snapshot file.
pub fn load_snapshot(path: &Path) -> CliResult<CacheSnapshot> {
    Ok(formats::decode(&read_file(path)?)?)
}

/// Encode and write a snapshot file.
pub fn save_snapshot(snapshot: &CacheSnapshot, path: &Path) -> CliResult<()> {
    write_file(path, &formats::encode(snapshot)?)
}

// =============================================================================
// REPORTS
// =============================================================================

/// One handled key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyReport {
    pub key: String,
    pub response: Response,
}

/// Outcome of a `handle` or `batch` run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub responses: Vec<KeyReport>,
    pub stats: MediatorStats,
}

impl RunReport {
    /// Textual responses in input order.
    pub fn texts(&self) -> Vec<String> {
        self.responses
            .iter()
            .map(|r| r.response.to_text())
            .collect()
    }
}

fn print_report(report: &RunReport, opts: &GlobalOpts) -> CliResult<()> {
    if opts.json {
        if opts.stats {
            println!("{}", serde_json::to_string_pretty(report)?);
        } else {
            println!("{}", serde_json::to_string_pretty(&report.responses)?);
        }
        return Ok(());
    }

    for text in report.texts() {
        println!("{text}");
    }
    if opts.stats {
        let s = &report.stats;
        println!();
        println!("admitted:      {}", s.admitted);
        println!("denied:        {}", s.denied);
        println!("cache hits:    {}", s.hits);
        println!("cache misses:  {}", s.misses);
        println!("hit rate:      {}%", s.hit_rate_percent());
        println!("constructions: {}", s.constructions);
        println!("invocations:   {}", s.invocations);
        println!("cached:        {}", s.cached_entries);
    }
    Ok(())
}

// =============================================================================
// COMMANDS
// =============================================================================

/// Run `keys` through a freshly built mediator.
pub fn cmd_handle(opts: &GlobalOpts, keys: &[String]) -> CliResult<RunReport> {
    let mediator = build_mediator(opts)?;

    let mut responses = Vec::with_capacity(keys.len());
    for key in keys {
        let response = mediator.handle(key)?;
        responses.push(KeyReport {
            key: key.clone(),
            response,
        });
    }

    if let Some(path) = &opts.save {
        save_snapshot(&mediator.snapshot()?, path)?;
        info!(path = %path.display(), "snapshot saved");
    }

    Ok(RunReport {
        responses,
        stats: mediator.stats()?,
    })
}

/// Parse a key file.
pub fn read_keys(file: &Path, format: KeyFormat) -> CliResult<Vec<String>> {
    let bytes = read_file(file)?;
    match format {
        KeyFormat::Json => Ok(serde_json::from_slice(&bytes)?),
        KeyFormat::Text => Ok(String::from_utf8_lossy(&bytes)
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect()),
    }
}

/// Run the keys of `file` through a freshly built mediator.
pub fn cmd_batch(opts: &GlobalOpts, file: &Path, format: KeyFormat) -> CliResult<RunReport> {
    let keys = read_keys(file, format)?;
    info!(count = keys.len(), file = %file.display(), "batch loaded");
    cmd_handle(opts, &keys)
}

/// Write the memo table assembled from the options to `output`.
pub fn cmd_snapshot_export(opts: &GlobalOpts, output: &Path) -> CliResult<CacheSnapshot> {
    let mediator = build_mediator(opts)?;
    let snapshot = mediator.snapshot()?;
    save_snapshot(&snapshot, output)?;
    Ok(snapshot)
}

/// Decode and print a snapshot file.
pub fn cmd_snapshot_show(opts: &GlobalOpts, file: &Path) -> CliResult<CacheSnapshot> {
    let snapshot = load_snapshot(file)?;
    if opts.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        for entry in snapshot.entries() {
            println!("{}\t{}", entry.key, entry.response);
        }
    }
    Ok(snapshot)
}

/// Dispatch a parsed command line.
pub fn run(cli: &Cli) -> CliResult<()> {
    let opts = &cli.global;
    match &cli.command {
        Commands::Handle { keys } => print_report(&cmd_handle(opts, keys)?, opts),
        Commands::Batch { file, format } => print_report(&cmd_batch(opts, file, *format)?, opts),
        Commands::Snapshot { action } => match action {
            SnapshotCommand::Export { output } => {
                let snapshot = cmd_snapshot_export(opts, output)?;
                if !opts.json {
                    println!("exported {} entries to {}", snapshot.len(), output.display());
                }
                Ok(())
            }
            SnapshotCommand::Show { file } => cmd_snapshot_show(opts, file).map(|_| ()),
        },
    }
}
