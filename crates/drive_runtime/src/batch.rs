//! Best-effort batch results.

use drive_host::DriveError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Overall result of a batch.
pub enum BatchOutcome {
    /// Every item succeeded (or there was nothing to do).
    Succeeded,
    /// Some items failed.
    Partial,
    /// Every item failed.
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
/// One failed item.
pub struct BatchFailure {
    /// Item id.
    pub id: String,
    /// Why it failed.
    pub error: DriveError,
}

#[derive(Debug, Clone, Default, PartialEq)]
/// Per-item results of a batch, in processing order.
pub struct BatchReport {
    /// Ids that succeeded.
    pub succeeded: Vec<String>,
    /// Items that failed.
    pub failed: Vec<BatchFailure>,
}

impl BatchReport {
    /// Records a success.
    pub fn record_success(&mut self, id: impl Into<String>) {
        self.succeeded.push(id.into());
    }

    /// Records a failure.
    pub fn record_failure(&mut self, id: impl Into<String>, error: DriveError) {
        self.failed.push(BatchFailure {
            id: id.into(),
            error,
        });
    }

    /// Classifies the batch.
    pub fn outcome(&self) -> BatchOutcome {
        match (self.succeeded.is_empty(), self.failed.is_empty()) {
            (_, true) => BatchOutcome::Succeeded,
            (true, false) => BatchOutcome::Failed,
            (false, false) => BatchOutcome::Partial,
        }
    }

    /// Ids that failed.
    pub fn failed_ids(&self) -> Vec<&str> {
        self.failed.iter().map(|failure| failure.id.as_str()).collect()
    }

    /// One-line status text for the view.
    pub fn summary(&self, verb: &str) -> String {
        let total = self.succeeded.len() + self.failed.len();
        match self.outcome() {
            BatchOutcome::Succeeded => format!("{verb} {total} item(s)."),
            BatchOutcome::Partial => format!(
                "{verb} {} of {total} item(s); {} failed.",
                self.succeeded.len(),
                self.failed.len()
            ),
            BatchOutcome::Failed => format!("All {total} item(s) failed."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn outcome_distinguishes_full_partial_and_failed() {
        let mut report = BatchReport::default();
        assert_eq!(report.outcome(), BatchOutcome::Succeeded);

        report.record_failure("b", DriveError::remote("boom"));
        assert_eq!(report.outcome(), BatchOutcome::Failed);

        report.record_success("a");
        assert_eq!(report.outcome(), BatchOutcome::Partial);
        assert_eq!(report.failed_ids(), vec!["b"]);
        assert_eq!(report.summary("Deleted"), "Deleted 1 of 2 item(s); 1 failed.");
    }

    #[test]
    fn summary_for_full_success_and_failure() {
        let mut ok = BatchReport::default();
        ok.record_success("a");
        ok.record_success("b");
        assert_eq!(ok.summary("Restored"), "Restored 2 item(s).");

        let mut bad = BatchReport::default();
        bad.record_failure("a", DriveError::remote("boom"));
        assert_eq!(bad.summary("Deleted"), "All 1 item(s) failed.");
    }
}
