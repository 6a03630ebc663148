//! Binary entry point for the relindex CLI.
//!
//! ## Usage
//!
//! ```bash
//! # Index every unit of a snapshot
//! relindex index workspace.json
//!
//! # Index two units, one at a time, with per-unit traces on stderr
//! relindex --log-level info index workspace.json --unit lib/a.dart --unit lib/b.dart --sequential --trace
//!
//! # Where is Shape.area overridden?
//! relindex query workspace.json --resource lib/shape.dart --id Shape.area --kind is_overridden_by
//! ```
//!
//! JSON goes to stdout, logs to stderr.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use relindex::cli::{run_index, run_query, IndexRequest};
use relindex::snapshot::Workspace;
use relindex_core::element::Element;
use relindex_core::error::{IndexError, OutputErrorCode};
use relindex_core::output::{emit_response, ErrorResponse};
use relindex_core::relationship::{RelationshipKind, UnknownRelationshipKind};
use relindex_core::resource::{Resource, UnitHandle};

// ============================================================================
// CLI Structure
// ============================================================================

/// Relationship indexer for resolved compilation units.
#[derive(Parser, Debug)]
#[command(name = "relindex", version, about = "Relationship indexer for resolved compilation units")]
struct Cli {
    /// Log level for tracing output (overridden by RUST_LOG).
    #[arg(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,

    /// Emit log events as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

/// Log level for tracing output.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Indexing flags shared by `index` and `query`.
#[derive(clap::Args, Debug)]
struct IndexArgs {
    /// Workspace snapshot (JSON).
    snapshot: PathBuf,

    /// Only index this unit (repeatable).
    #[arg(long = "unit")]
    units: Vec<String>,

    /// Keep a per-unit contribution trace and log it at info level.
    #[arg(long)]
    trace: bool,

    /// Index units one at a time on the calling thread.
    #[arg(long)]
    sequential: bool,
}

impl IndexArgs {
    fn request(&self) -> IndexRequest {
        IndexRequest {
            units: self.units.iter().map(UnitHandle::new).collect(),
            trace: self.trace,
            sequential: self.sequential,
        }
    }
}

/// CLI subcommands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Index a workspace snapshot and emit every relationship.
    Index {
        #[command(flatten)]
        args: IndexArgs,
    },
    /// Index a workspace snapshot and list the locations of one relationship.
    Query {
        #[command(flatten)]
        args: IndexArgs,
        /// Resource of the element.
        #[arg(long)]
        resource: String,
        /// Element id (e.g. `Shape.area`, `#library`).
        #[arg(long)]
        id: String,
        /// Relationship kind (e.g. `is_invoked_by_qualified`).
        #[arg(long)]
        kind: String,
    },
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.log_level, cli.log_json);

    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let error_code = OutputErrorCode::from(&err);
            let response = ErrorResponse::new(&err);

            // Errors go to stdout as JSON too
            let _ = emit_response(&response, &mut io::stdout());
            let _ = io::stdout().flush();

            ExitCode::from(error_code.code())
        }
    }
}

/// Initialize tracing subscriber.
fn init_tracing(level: LogLevel, json: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr);
    if json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

/// Execute the CLI command.
fn execute(cli: Cli) -> Result<(), IndexError> {
    match cli.command {
        Command::Index { args } => execute_index(&args),
        Command::Query {
            args,
            resource,
            id,
            kind,
        } => execute_query(&args, &resource, &id, &kind),
    }
}

// ============================================================================
// Command Executors
// ============================================================================

fn execute_index(args: &IndexArgs) -> Result<(), IndexError> {
    let workspace = Workspace::load(&args.snapshot)?;
    let response = run_index(&workspace, &args.request())?;
    emit_response(&response, &mut io::stdout()).map_err(|e| IndexError::internal(e.to_string()))?;
    let _ = io::stdout().flush();
    Ok(())
}

fn execute_query(args: &IndexArgs, resource: &str, id: &str, kind: &str) -> Result<(), IndexError> {
    let kind: RelationshipKind = kind
        .parse()
        .map_err(|e: UnknownRelationshipKind| IndexError::invalid_args(e.to_string()))?;
    if resource.is_empty() {
        return Err(IndexError::invalid_args("--resource must not be empty"));
    }
    let element = Element::new(Resource::new(resource), id);

    let workspace = Workspace::load(&args.snapshot)?;
    let response = run_query(&workspace, &args.request(), &element, kind)?;
    emit_response(&response, &mut io::stdout()).map_err(|e| IndexError::internal(e.to_string()))?;
    let _ = io::stdout().flush();
    Ok(())
}
