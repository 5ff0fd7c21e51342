//! `sigsum`: sum an array across forked workers that report back with
//! queued real-time signals.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use sigsum::config::loader::load_config;
use sigsum::config::{LogFormat, SumConfig};
use sigsum::observability::logging;
use sigsum::Controller;

#[derive(Parser)]
#[command(name = "sigsum")]
#[command(about = "Parallel array sum over fork and queued real-time signals", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Cooperating processes (parent + workers).
    #[arg(short, long)]
    processes: Option<usize>,

    /// Input array length.
    #[arg(short = 'n', long)]
    array_len: Option<usize>,

    /// Completion signal offset from SIGRTMIN.
    #[arg(long)]
    rt_offset: Option<u8>,

    /// Wait deadline in milliseconds (0 = none).
    #[arg(long)]
    timeout_ms: Option<u64>,

    #[arg(long, value_enum)]
    log_format: Option<CliLogFormat>,

    /// Print the full report as JSON instead of the final sum.
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum CliLogFormat {
    Pretty,
    Json,
}

impl Cli {
    fn apply(&self, config: &mut SumConfig) {
        if let Some(processes) = self.processes {
            config.computation.processes = processes;
        }
        if let Some(array_len) = self.array_len {
            config.computation.array_len = array_len;
        }
        if let Some(rt_offset) = self.rt_offset {
            config.signal.rt_offset = rt_offset;
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.coordination.timeout_ms = timeout_ms;
        }
        if let Some(format) = self.log_format {
            config.observability.log_format = match format {
                CliLogFormat::Pretty => LogFormat::Pretty,
                CliLogFormat::Json => LogFormat::Json,
            };
        }
    }
}

fn run(cli: &Cli, config: &SumConfig) -> Result<(), Box<dyn std::error::Error>> {
    let controller = Controller::new(config)?;
    let report = controller.run()?;

    if !report.is_consistent() {
        tracing::warn!(
            total = report.total,
            expected = report.expected_total,
            "Aggregated sum differs from expected sum"
        );
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Final sum = {}", report.total);
    }

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = match load_config(cli.config.as_deref(), |config| cli.apply(config)) {
        Ok(config) => config,
        Err(e) => {
            // No subscriber yet: the log format is part of what failed to load.
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    logging::init(&config.observability);

    tracing::info!(
        processes = config.computation.processes,
        workers = config.computation.workers(),
        array_len = config.computation.array_len,
        rt_offset = config.signal.rt_offset,
        timeout_ms = config.coordination.timeout_ms,
        "Configuration loaded"
    );

    match run(&cli, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Summation failed");
            ExitCode::FAILURE
        }
    }
}
