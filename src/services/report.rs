/// Per-run outcome of a batch job. Items that fail are skipped, not retried;
/// the whole report is surfaced once when the run ends instead of scattering
/// one log line per failure.
pub struct BatchReport {
    job: &'static str,
    succeeded: usize,
    skipped: Vec<SkippedItem>,
}

pub struct SkippedItem {
    pub item: String,
    pub reason: String,
}

impl BatchReport {
    pub fn new(job: &'static str) -> Self {
        Self {
            job,
            succeeded: 0,
            skipped: Vec::new(),
        }
    }

    pub fn record_ok(&mut self) {
        self.succeeded += 1;
    }

    pub fn record_skip(&mut self, item: impl Into<String>, reason: impl ToString) {
        self.skipped.push(SkippedItem {
            item: item.into(),
            reason: reason.to_string(),
        });
    }

    pub fn succeeded(&self) -> usize {
        self.succeeded
    }

    pub fn skipped(&self) -> &[SkippedItem] {
        &self.skipped
    }

    /// One summary event per run; individual skips at debug level.
    pub fn emit(&self) {
        if self.skipped.is_empty() {
            tracing::info!(
                job = self.job,
                succeeded = self.succeeded,
                "batch run completed"
            );
            return;
        }

        tracing::warn!(
            job = self.job,
            succeeded = self.succeeded,
            skipped = self.skipped.len(),
            "batch run completed with skipped items"
        );
        for skip in &self.skipped {
            tracing::debug!(job = self.job, item = %skip.item, reason = %skip.reason, "skipped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_counts_outcomes_independently() {
        let mut report = BatchReport::new("test_job");
        report.record_ok();
        report.record_ok();
        report.record_skip("0xabc like", "execution reverted");

        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.skipped().len(), 1);
        assert_eq!(report.skipped()[0].item, "0xabc like");
        assert_eq!(report.skipped()[0].reason, "execution reverted");
    }

    #[test]
    fn empty_report_emits_without_panicking() {
        BatchReport::new("test_job").emit();
    }
}
