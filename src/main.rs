use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use log::{error, info};

use insurance_lookup_lib::config::{self, Config, OutputFormat};
use insurance_lookup_lib::{logger, run_lookup, FailureLog, HttpPageSource, ThreadPacer};

/// Look up insurance expiry date and insurer for a list of registration numbers.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// File with one registration number per line
    #[arg(short, long, default_value = config::DEFAULT_INPUT_FILE)]
    input: PathBuf,

    /// Where the collected records are written (overwritten)
    #[arg(short, long, default_value = config::DEFAULT_OUTPUT_FILE)]
    output: PathBuf,

    /// Append-only log of registration numbers that could not be fetched
    #[arg(long, default_value = config::DEFAULT_FAILURE_LOG)]
    failed_log: PathBuf,

    /// Output document format: json or csv
    #[arg(long, default_value = "json")]
    format: OutputFormat,

    /// Lookup page base URL; the registration number is appended as a path segment
    #[arg(long, default_value = config::DEFAULT_LOOKUP_BASE)]
    base_url: String,

    /// CSS selector whose first and second matches hold expiry date and insurer
    #[arg(long, default_value = config::DEFAULT_FIELD_SELECTOR)]
    selector: String,

    #[arg(long, default_value_t = config::DEFAULT_BATCH_SIZE)]
    batch_size: usize,

    #[arg(long, default_value_t = config::DEFAULT_BATCH_DELAY_MS)]
    batch_delay_ms: u64,

    #[arg(long, default_value_t = config::DEFAULT_ITEM_DELAY_MS)]
    item_delay_ms: u64,

    #[arg(long, default_value_t = config::DEFAULT_RETRY_DELAY_MS)]
    retry_delay_ms: u64,

    /// Retries after the first failed attempt
    #[arg(long, default_value_t = config::DEFAULT_MAX_RETRIES)]
    max_retries: u32,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = config::DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Config {
            lookup_base: args.base_url,
            field_selector: args.selector,
            input_path: args.input,
            output_path: args.output,
            failure_log_path: args.failed_log,
            output_format: args.format,
            batch_size: args.batch_size,
            batch_delay: Duration::from_millis(args.batch_delay_ms),
            item_delay: Duration::from_millis(args.item_delay_ms),
            retry_delay: Duration::from_millis(args.retry_delay_ms),
            max_retries: args.max_retries,
            request_timeout: Duration::from_secs(args.timeout_secs),
        }
    }
}

fn main() -> ExitCode {
    logger::init();
    let config = Config::from(Args::parse());
    info!("Starting insurance lookup from {:?}...", config.input_path);

    let source = match HttpPageSource::from_config(&config) {
        Ok(source) => source,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    let failures = FailureLog::new(&config.failure_log_path);

    match run_lookup(&config, &source, &failures, &ThreadPacer) {
        Ok(summary) => {
            info!(
                "Lookup completed. {} of {} registration numbers resolved; {} logged to {:?}.",
                summary.succeeded, summary.total, summary.failed, failures.path()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Run aborted: {}", e);
            ExitCode::FAILURE
        }
    }
}
