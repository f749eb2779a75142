//! CLI tool for batch card validation.
//!
//! # Usage
//!
//! ```bash
//! # Validate a batch, enriching through binlist.net
//! cardbatch cards.json
//!
//! # Offline, with a local issuer table and a relaxed length rule
//! cardbatch cards.json --offline --issuer-db issuers.csv --length-policy minimum
//!
//! # JSON report, log to stderr
//! cardbatch cards.json --format json --log-file -
//! ```
//!
//! Exits non-zero only when the input, config or issuer table cannot be
//! loaded. Invalid records are reported, not treated as failures.

use card_batch::error::{ConfigError, LoadError};
use card_batch::issuer::{IssuerLookup, JsonIssuerLoader, MemoryIssuerDb, NoLookup};
use card_batch::{io, report, LengthPolicy, SystemClock, TracingSink, ValidatorConfig};
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "cardbatch")]
#[command(author, version, about = "Batch card validation with issuer enrichment")]
struct Cli {
    /// JSON file holding an array of card records
    input: PathBuf,

    /// Where to write the valid cards
    #[arg(short, long, default_value = io::DEFAULT_OUTPUT)]
    output: PathBuf,

    /// JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Card number length rule
    #[arg(long)]
    length_policy: Option<PolicyArg>,

    /// Worker pool size (0 or 1 = sequential)
    #[arg(short, long)]
    workers: Option<usize>,

    /// Per-record issuer lookup deadline in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Skip binlist.net lookups
    #[arg(long)]
    offline: bool,

    /// Local issuer table (.json or .csv), used instead of binlist.net
    #[arg(long)]
    issuer_db: Option<PathBuf>,

    /// Report format
    #[arg(short, long, default_value = "table")]
    format: OutputFormat,

    /// Log file; `-` logs to stderr
    #[arg(long, default_value = "validator.log")]
    log_file: PathBuf,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum PolicyArg {
    Strict,
    Minimum,
}

impl From<PolicyArg> for LengthPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Strict => LengthPolicy::Strict,
            PolicyArg::Minimum => LengthPolicy::Minimum,
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{}: {source}", path.display())]
    Load { path: PathBuf, source: LoadError },

    #[error("cannot open log file {}: {source}", path.display())]
    Log {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot render report: {0}")]
    Report(#[from] serde_json::Error),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    init_logging(&cli.log_file)?;

    let config = resolve_config(&cli)?;
    let records = io::load_records(&cli.input).map_err(|source| CliError::Load {
        path: cli.input.clone(),
        source,
    })?;
    let lookup = select_lookup(&cli, &config)?;

    tracing::info!(
        input = %cli.input.display(),
        records = records.len(),
        workers = config.workers,
        policy = ?config.length_policy,
        "starting batch"
    );

    let processor = config.processor(Arc::new(SystemClock), Arc::new(TracingSink));
    let result = processor.process_raw(&records, lookup.as_ref());
    let summary = result.summary();

    match cli.format {
        OutputFormat::Table => print!("{}", report::render_table(&result)),
        OutputFormat::Json => println!("{}", report::render_json(&result)?),
    }
    println!("{}", report::render_summary(&summary));

    let written = io::write_valid(&cli.output, &result).map_err(|source| CliError::Load {
        path: cli.output.clone(),
        source,
    })?;
    if written > 0 {
        println!("{} valid card(s) saved to '{}'", written, cli.output.display());
    } else {
        println!("No valid cards found");
    }

    tracing::info!(
        total = summary.total,
        valid = summary.valid,
        invalid = summary.invalid,
        errored = summary.errored,
        "batch finished"
    );
    Ok(())
}

fn init_logging(log_file: &Path) -> Result<(), CliError> {
    let (writer, ansi) = if log_file == Path::new("-") {
        (BoxMakeWriter::new(std::io::stderr), true)
    } else {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_file)
            .map_err(|source| CliError::Log {
                path: log_file.to_path_buf(),
                source,
            })?;
        (BoxMakeWriter::new(std::sync::Mutex::new(file)), false)
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(ansi),
        )
        .init();
    Ok(())
}

fn resolve_config(cli: &Cli) -> Result<ValidatorConfig, CliError> {
    let mut config = match &cli.config {
        Some(path) => ValidatorConfig::from_file(path)?,
        None => ValidatorConfig::default(),
    };

    if let Some(policy) = cli.length_policy {
        config.length_policy = policy.into();
    }
    if let Some(workers) = cli.workers {
        config.workers = workers;
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config.lookup_timeout_ms = timeout_ms;
    }
    Ok(config)
}

fn select_lookup(cli: &Cli, config: &ValidatorConfig) -> Result<Box<dyn IssuerLookup>, CliError> {
    if let Some(path) = &cli.issuer_db {
        let db = load_issuer_db(path).map_err(|source| CliError::Load {
            path: path.clone(),
            source,
        })?;
        tracing::info!(path = %path.display(), entries = db.len(), "loaded issuer table");
        return Ok(Box::new(db));
    }

    if cli.offline {
        return Ok(Box::new(NoLookup));
    }

    Ok(Box::new(config.binlist_client()))
}

fn load_issuer_db(path: &Path) -> Result<MemoryIssuerDb, LoadError> {
    let is_csv = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

    if is_csv {
        card_batch::issuer::CsvIssuerLoader::from_file(path)
    } else {
        JsonIssuerLoader::from_file(path)
    }
}
