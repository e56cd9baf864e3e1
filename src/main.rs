//! `scpgen`: generate Super Check Partial dictionaries from contest logs.

use std::fmt;
use std::io::{self, BufWriter, Write};
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use scpgen::{
    config::{self, ConfigError, RunConfig},
    sched::{self, SchedError},
};

#[derive(Parser, Debug)]
#[command(name = "scpgen", version, about = "Generate SCP dictionaries from contest logs")]
struct Cli {
    /// Directory of contest logs, or @FILE naming one contest per line
    /// (either "dir" or "dir start hours").
    #[arg(long)]
    dir: String,

    /// Contest start time, YYYY-MM-DD[THH[:MM[:SS]]] UTC.
    #[arg(long)]
    start: Option<String>,

    /// Contest duration in hours.
    #[arg(long)]
    hrs: Option<String>,

    /// Emit progress diagnostics on stderr.
    #[arg(short, long)]
    verbose: bool,

    /// Drop calls that appear this many times or fewer on a band.
    #[arg(short = 'l', long = "cutoff", default_value_t = 1)]
    cutoff: u32,

    /// Number of contests to process simultaneously.
    #[arg(short = 'p', long = "parallel", default_value_t = 1)]
    parallel: usize,

    /// Report in detail on the processing of one callsign.
    #[arg(long = "tr", value_name = "CALL")]
    trace: Option<String>,

    /// Do not auto-include entrants claiming fewer than this many QSOs.
    #[arg(long = "tl", default_value_t = 1, value_name = "N")]
    tl_limit: usize,

    /// Generate extended (XSCP) output: "CALL count" per line.
    #[arg(short = 'x', long = "xscp")]
    xscp: bool,

    /// Retain only the calls covering the top N percent of the count mass.
    #[arg(long = "xpc", default_value_t = 100, value_name = "N")]
    top_percent: u32,

    /// Echo rejected QSO lines to stderr.
    #[arg(short = 'i', long = "show-bad-qsos")]
    show_bad_qsos: bool,
}

#[derive(Debug)]
enum AppError {
    Config(ConfigError),
    Sched(SchedError),
    Io(io::Error),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "{err}"),
            AppError::Sched(err) => write!(f, "{err}"),
            AppError::Io(err) => write!(f, "{err}"),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<SchedError> for AppError {
    fn from(value: SchedError) -> Self {
        Self::Sched(value)
    }
}

impl From<io::Error> for AppError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::from(255)
        }
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let contests = config::resolve_contests(&cli.dir, cli.start.as_deref(), cli.hrs.as_deref())?;

    let config = Arc::new(RunConfig {
        verbose: cli.verbose,
        cutoff: cli.cutoff,
        parallel: cli.parallel,
        traced_call: cli.trace.map(|c| c.to_ascii_uppercase()),
        tl_limit: cli.tl_limit,
        xscp: cli.xscp,
        top_percent: cli.top_percent,
        show_bad_qsos: cli.show_bad_qsos,
    });

    let counts = sched::run_contests(contests, Arc::clone(&config)).await?;

    let stdout = io::stdout().lock();
    let mut out = BufWriter::new(stdout);
    counts.write_to(&mut out, config.xscp)?;
    out.flush()?;

    Ok(())
}

/// Diagnostics go to stderr so stdout carries only the dictionary. `-v`
/// raises the level to debug; `--tr` alone raises it to info so trace
/// reports are visible.
fn init_tracing(cli: &Cli) {
    let default_level = if cli.verbose {
        "debug"
    } else if cli.trace.is_some() {
        "info"
    } else {
        "warn"
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}
