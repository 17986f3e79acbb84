pub mod config;
pub mod error;
pub mod logger;
pub mod input_loader;
pub mod extractor;
pub mod fetcher;
pub mod delay_manager;
pub mod batch_runner;
pub mod result_writer;

// Exporting types for convenience
pub use batch_runner::{BatchRunner, RunSummary};
pub use config::{Config, OutputFormat};
pub use delay_manager::{Pacer, PacingPolicy, PauseKind, ThreadPacer};
pub use error::{LookupError, Result};
pub use extractor::Extractor;
pub use fetcher::{Fetcher, HttpPageSource, InsuranceRecord, PageSource, RetryPolicy};
pub use input_loader::Identifier;
pub use result_writer::{FailureLog, FailureSink};

/// One complete run: read the input list, look every identifier up, write the
/// results. Individual lookups that fail end up in `failures`; input,
/// configuration, output and failure-log problems abort the run.
pub fn run_lookup(
    config: &Config,
    source: &dyn PageSource,
    failures: &dyn FailureSink,
    pacer: &dyn Pacer,
) -> Result<RunSummary> {
    config.validate()?;
    let identifiers = input_loader::load_identifiers(&config.input_path)?;
    let extractor = Extractor::new(&config.field_selector)?;

    let fetcher = Fetcher::new(source, &extractor, failures, pacer, RetryPolicy::from_config(config));
    let runner = BatchRunner::new(fetcher, pacer, PacingPolicy::from_config(config), config.batch_size);
    let records = runner.run_all(&identifiers)?;

    result_writer::persist(&records, &config.output_path, config.output_format)?;

    Ok(RunSummary::new(identifiers.len(), records.len(), config.batch_size))
}
