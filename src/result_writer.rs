use std::cell::RefCell;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use log::info;

use crate::config::OutputFormat;
use crate::error::{LookupError, Result};
use crate::fetcher::InsuranceRecord;
use crate::input_loader::Identifier;

/// Destination for identifiers whose lookups were given up on.
pub trait FailureSink {
    fn record_failure(&self, id: &Identifier) -> Result<()>;
}

/// Append-only text log, one identifier per line. Each failure is written
/// as it happens; the file is never truncated by this tool.
pub struct FailureLog {
    path: PathBuf,
}

impl FailureLog {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        FailureLog { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FailureSink for FailureLog {
    fn record_failure(&self, id: &Identifier) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| LookupError::io(&self.path, e))?;
        writeln!(file, "{}", id).map_err(|e| LookupError::io(&self.path, e))
    }
}

/// Test double: keeps failures in memory instead of on disk. Public so
/// integration tests can inspect what a run gave up on.
#[derive(Debug, Default)]
pub struct MemoryFailureSink {
    failed: RefCell<Vec<Identifier>>,
}

impl MemoryFailureSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failed(&self) -> Vec<Identifier> {
        self.failed.borrow().clone()
    }
}

impl FailureSink for MemoryFailureSink {
    fn record_failure(&self, id: &Identifier) -> Result<()> {
        self.failed.borrow_mut().push(id.clone());
        Ok(())
    }
}

/// Write the full result set to `path`, replacing whatever was there.
pub fn persist<P: AsRef<Path>>(records: &[InsuranceRecord], path: P, format: OutputFormat) -> Result<()> {
    let path = path.as_ref();
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(records)?;
            fs::write(path, json).map_err(|e| LookupError::io(path, e))?;
        }
        OutputFormat::Csv => {
            let file = fs::File::create(path).map_err(|e| LookupError::io(path, e))?;
            let mut writer = csv::WriterBuilder::new().has_headers(true).from_writer(file);
            if records.is_empty() {
                writer.write_record(["identifier", "expiryDate", "insuranceCompany"])?;
            }
            for record in records {
                writer.serialize(record)?;
            }
            writer.flush().map_err(|e| LookupError::io(path, e))?;
        }
    }
    info!("Data exported to {:?} ({} records)", path, records.len());
    Ok(())
}
