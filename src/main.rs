//! fanweld: run the pipeline once and verify conservation

use std::io::{self, Write};
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use fanweld::config::{DEFAULT_DEADLINE, DEFAULT_WORKERS, DEFAULT_WORKER_DELAY};
use fanweld::prelude::*;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Fan a deadline-bounded integer sequence through a worker pool and check nothing was lost
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of relay workers
    #[arg(short, long, default_value_t = DEFAULT_WORKERS)]
    workers: usize,

    /// Generation deadline in milliseconds
    #[arg(long, default_value_t = DEFAULT_DEADLINE.as_millis() as u64)]
    deadline_ms: u64,

    /// Per-item worker delay in milliseconds
    #[arg(long, default_value_t = DEFAULT_WORKER_DELAY.as_millis() as u64)]
    delay_ms: u64,

    /// Log level
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("fanweld={}", args.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("fanweld {}", fanweld::VERSION);

    let config = PipelineConfig::new()
        .workers(args.workers)
        .deadline(Duration::from_millis(args.deadline_ms))
        .worker_delay(Duration::from_millis(args.delay_ms));

    let report = Pipeline::new(config).run().await?;

    let mut stdout = io::stdout().lock();
    let mut stderr = io::stderr().lock();
    let verified = write_outcome(&report, &mut stdout, &mut stderr)?;
    Ok(if verified {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Print the three report lines to `out`, then check the invariants.
///
/// Returns whether every invariant held; on a violation the diagnostic goes
/// to `err`.
fn write_outcome<O, E>(report: &Report, out: &mut O, err: &mut E) -> io::Result<bool>
where
    O: Write,
    E: Write,
{
    writeln!(out, "{report}")?;

    match report.verify() {
        Ok(()) => {
            info!(phase = ?Phase::Verified, "all invariants held");
            Ok(true)
        }
        Err(e) => {
            error!(phase = ?Phase::Failed, "{e}");
            writeln!(err, "Error: {e}")?;
            Ok(false)
        }
    }
}
