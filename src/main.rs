//! sitewatch: concurrent website liveness checks with a mailed report.
//!
//! # Architecture Overview
//!
//! ```text
//!   websites.txt ──▶ targets ──▶ dispatch ──┬─▶ resolver ──▶ probe ──▶ HTTP GET
//!                          (tasks or        ├─▶ resolver ──▶ probe ──▶ HTTP GET
//!                           worker procs)   └─▶ ...
//!                                  │
//!                                  ▼ all outcomes (barrier)
//!                               report ──▶ status file
//!                                  │
//!                                  └──▶ notify (mail) when errored or forced
//! ```
//!
//! In process mode the same executable is re-run with `--worker`: it reads
//! its settings and jobs as JSON lines on stdin and answers on stdout.
//!
//! Exit status is 0 whenever a run completes, whatever the health of the
//! targets; 1 when the run could not start or complete.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};

use sitewatch::config::validation::validate_config;
use sitewatch::config::{load_config, ConcurrencyMode, ConfigError, MonitorConfig};
use sitewatch::dispatch::worker;
use sitewatch::lifecycle::build_monitor;
use sitewatch::observability::logging;

#[derive(Parser)]
#[command(name = "sitewatch", version)]
#[command(about = "Check website liveness and report failures", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Shows websites that returned 200.
    #[arg(short, long)]
    verbose: bool,

    /// Parallelization mode (default: from config, else thread).
    #[arg(short, long, value_enum)]
    mode: Option<Mode>,

    /// Send email regardless of errors (default: only send on errors).
    #[arg(short, long)]
    email: bool,

    /// Target list, overriding the config.
    #[arg(long)]
    targets: Option<PathBuf>,

    /// Report file, overriding the config.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Log level when RUST_LOG is unset.
    #[arg(long)]
    log_level: Option<String>,

    /// Serve probe jobs on stdin/stdout for a parent run.
    #[arg(long, hide = true)]
    worker: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    Thread,
    Process,
}

impl From<Mode> for ConcurrencyMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Thread => ConcurrencyMode::Thread,
            Mode::Process => ConcurrencyMode::Process,
        }
    }
}

fn resolve_config(cli: &Cli) -> Result<MonitorConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => MonitorConfig::default(),
    };

    if cli.verbose {
        config.report.verbose = true;
    }
    if let Some(mode) = cli.mode {
        config.concurrency.mode = mode.into();
    }
    if let Some(path) = &cli.targets {
        config.targets.path = path.clone();
    }
    if let Some(path) = &cli.output {
        config.report.path = path.clone();
    }
    if let Some(level) = &cli.log_level {
        config.observability.log_level = level.clone();
    }

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.worker {
        logging::init(cli.log_level.as_deref().unwrap_or("info"));
        return match worker::serve(tokio::io::stdin(), tokio::io::stdout()).await {
            Ok(answered) => {
                tracing::debug!(answered, "Worker finished");
                ExitCode::SUCCESS
            }
            Err(e) => {
                tracing::error!(error = %e, "Worker failed");
                ExitCode::FAILURE
            }
        };
    }

    let config = match resolve_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            logging::init(cli.log_level.as_deref().unwrap_or("info"));
            tracing::error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };
    logging::init(&config.observability.log_level);

    tracing::info!("sitewatch v{} starting", env!("CARGO_PKG_VERSION"));

    let monitor = match build_monitor(&config, cli.email) {
        Ok(monitor) => monitor,
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            return ExitCode::FAILURE;
        }
    };

    match monitor.run().await {
        Ok(summary) => {
            print!("{}", summary.body);
            println!("Completed in {:.2} seconds", summary.elapsed.as_secs_f64());
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Run aborted");
            ExitCode::FAILURE
        }
    }
}
