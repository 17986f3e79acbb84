use log::info;

use crate::delay_manager::{Pacer, PacingPolicy, PauseKind};
use crate::error::Result;
use crate::fetcher::{Fetcher, InsuranceRecord};
use crate::input_loader::Identifier;

/// Sizes of the consecutive chunks `len` items split into. The last chunk may
/// be short; a zero `batch_size` is treated as one.
pub fn partition(len: usize, batch_size: usize) -> Vec<usize> {
    let size = batch_size.max(1);
    (0..len).step_by(size).map(|start| size.min(len - start)).collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub batches: usize,
}

impl RunSummary {
    pub fn new(total: usize, succeeded: usize, batch_size: usize) -> Self {
        RunSummary {
            total,
            succeeded,
            failed: total.saturating_sub(succeeded),
            batches: partition(total, batch_size).len(),
        }
    }
}

/// Drives the fetcher over the whole input, strictly one lookup at a time.
pub struct BatchRunner<'a> {
    fetcher: Fetcher<'a>,
    pacer: &'a dyn Pacer,
    pacing: PacingPolicy,
    batch_size: usize,
}

impl<'a> BatchRunner<'a> {
    pub fn new(fetcher: Fetcher<'a>, pacer: &'a dyn Pacer, pacing: PacingPolicy, batch_size: usize) -> Self {
        BatchRunner {
            fetcher,
            pacer,
            pacing,
            batch_size: batch_size.max(1),
        }
    }

    /// Looks up `ids` in order with the item delay between consecutive
    /// lookups. Failed identifiers leave no entry; an error means a failure
    /// could not be recorded.
    pub fn fetch_many(&self, ids: &[Identifier]) -> Result<Vec<InsuranceRecord>> {
        let mut results = Vec::with_capacity(ids.len());

        for (i, id) in ids.iter().enumerate() {
            if i > 0 {
                self.pacer.pause(self.pacing.item_delay, PauseKind::BetweenItems);
            }
            if let Some(record) = self.fetcher.fetch_one(id)? {
                results.push(record);
            }
        }

        Ok(results)
    }

    /// Splits `ids` into batches and runs them back to back, pausing for the
    /// batch delay in between.
    pub fn run_all(&self, ids: &[Identifier]) -> Result<Vec<InsuranceRecord>> {
        let total_batches = partition(ids.len(), self.batch_size).len();
        let mut results = Vec::with_capacity(ids.len());

        for (n, batch) in ids.chunks(self.batch_size).enumerate() {
            if n > 0 {
                self.pacer.pause(self.pacing.item_delay, PauseKind::BetweenItems);
                self.pacer.pause(self.pacing.batch_delay, PauseKind::BetweenBatches);
            }
            info!("Processing batch {} of {}", n + 1, total_batches);
            results.extend(self.fetch_many(batch)?);
        }

        let summary = RunSummary::new(ids.len(), results.len(), self.batch_size);
        info!(
            "Finished {} batches: {} succeeded, {} failed out of {}",
            summary.batches, summary.succeeded, summary.failed, summary.total
        );

        Ok(results)
    }
}
