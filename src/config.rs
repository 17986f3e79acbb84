use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

use crate::error::{LookupError, Result};
use crate::extractor::Extractor;

pub const DEFAULT_LOOKUP_BASE: &str = "https://www.carinfo.app/car-insurance";
pub const DEFAULT_FIELD_SELECTOR: &str = "p.css-1led9nl";
pub const DEFAULT_INPUT_FILE: &str = "car-number-data.txt";
pub const DEFAULT_OUTPUT_FILE: &str = "car-insurance-data.json";
pub const DEFAULT_FAILURE_LOG: &str = "failed-car-numbers-data.txt";

pub const DEFAULT_BATCH_SIZE: usize = 100;
pub const DEFAULT_BATCH_DELAY_MS: u64 = 5000;
pub const DEFAULT_ITEM_DELAY_MS: u64 = 1000;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 2000;
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Csv,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(format!("unknown output format '{}' (expected json or csv)", other)),
        }
    }
}

/// Parse the lookup base URL. It must be able to take a path, since the
/// identifier is appended as a segment.
pub fn parse_lookup_base(raw: &str) -> Result<Url> {
    let base = Url::parse(raw)
        .map_err(|e| LookupError::Config(format!("lookup base '{}': {}", raw, e)))?;
    if base.cannot_be_a_base() {
        return Err(LookupError::Config(format!("lookup base '{}' cannot take a path", raw)));
    }
    Ok(base)
}

/// Every tunable of a lookup run. `Default` matches the historical behaviour
/// of the tool.
#[derive(Debug, Clone)]
pub struct Config {
    pub lookup_base: String,
    pub field_selector: String,
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub failure_log_path: PathBuf,
    pub output_format: OutputFormat,
    pub batch_size: usize,
    pub batch_delay: Duration,
    pub item_delay: Duration,
    pub retry_delay: Duration,
    pub max_retries: u32,
    pub request_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            lookup_base: DEFAULT_LOOKUP_BASE.to_string(),
            field_selector: DEFAULT_FIELD_SELECTOR.to_string(),
            input_path: PathBuf::from(DEFAULT_INPUT_FILE),
            output_path: PathBuf::from(DEFAULT_OUTPUT_FILE),
            failure_log_path: PathBuf::from(DEFAULT_FAILURE_LOG),
            output_format: OutputFormat::Json,
            batch_size: DEFAULT_BATCH_SIZE,
            batch_delay: Duration::from_millis(DEFAULT_BATCH_DELAY_MS),
            item_delay: Duration::from_millis(DEFAULT_ITEM_DELAY_MS),
            retry_delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
            max_retries: DEFAULT_MAX_RETRIES,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl Config {
    /// Catch settings that would only blow up mid-run.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(LookupError::Config("batch size must be at least 1".into()));
        }
        if self.request_timeout.is_zero() {
            return Err(LookupError::Config("request timeout must be non-zero".into()));
        }
        parse_lookup_base(&self.lookup_base)?;
        if self.field_selector.trim().is_empty() {
            return Err(LookupError::Config("field selector is empty".into()));
        }
        Extractor::new(&self.field_selector)?;
        Ok(())
    }
}
