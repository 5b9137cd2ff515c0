use serde::{Deserialize, Serialize};

use crate::result::StepFailure;

/// Phase a step reached, as recorded in the execution log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepPhase {
    /// Step executed successfully.
    Completed,
    /// Step execution or compensation failed.
    Failed,
    /// Step was compensated successfully.
    Compensated,
}

/// One outcome in the execution log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Name of the step.
    pub step: String,
    /// Phase the step reached.
    pub phase: StepPhase,
    /// Error text of the failed call, only set for [`StepPhase::Failed`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl LogEntry {
    #[must_use]
    pub fn completed(step: impl Into<String>) -> Self {
        Self {
            step: step.into(),
            phase: StepPhase::Completed,
            reason: None,
        }
    }

    #[must_use]
    pub fn compensated(step: impl Into<String>) -> Self {
        Self {
            step: step.into(),
            phase: StepPhase::Compensated,
            reason: None,
        }
    }

    #[must_use]
    pub fn failed(step: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            step: step.into(),
            phase: StepPhase::Failed,
            reason: Some(reason.into()),
        }
    }
}

/// Append-only, chronologically ordered record of step outcomes.
///
/// A run first appends one [`StepPhase::Completed`] entry per successful step
/// in step order. If a step fails, a single [`StepPhase::Failed`] entry marks
/// the forward failure, followed by one entry per compensation attempt in
/// reverse completion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExecutionLog {
    entries: Vec<LogEntry>,
}

impl ExecutionLog {
    /// Create a new empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_completed(&mut self, step: &str) {
        self.entries.push(LogEntry::completed(step));
    }

    pub(crate) fn record_compensated(&mut self, step: &str) {
        self.entries.push(LogEntry::compensated(step));
    }

    pub(crate) fn record_failed(&mut self, step: &str, reason: String) {
        self.entries.push(LogEntry::failed(step, reason));
    }

    /// All entries in the order they were recorded.
    #[must_use]
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    /// `(step, phase)` pairs, handy for comparing log structure.
    #[must_use]
    pub fn phases(&self) -> Vec<(&str, StepPhase)> {
        self.entries
            .iter()
            .map(|entry| (entry.step.as_str(), entry.phase))
            .collect()
    }

    /// The entry marking the forward step that failed, if any.
    #[must_use]
    pub fn forward_failure(&self) -> Option<StepFailure> {
        self.entries
            .iter()
            .find(|entry| entry.phase == StepPhase::Failed)
            .map(|entry| StepFailure {
                step: entry.step.clone(),
                reason: entry.reason.clone().unwrap_or_default(),
            })
    }

    /// Entries recorded during the compensation phase.
    ///
    /// Empty when no forward step failed, or when the very first step failed.
    #[must_use]
    pub fn compensation_entries(&self) -> &[LogEntry] {
        match self
            .entries
            .iter()
            .position(|entry| entry.phase == StepPhase::Failed)
        {
            Some(index) => &self.entries[index + 1..],
            None => &[],
        }
    }

    /// A standalone log holding only the compensation phase.
    #[must_use]
    pub fn compensation_log(&self) -> ExecutionLog {
        ExecutionLog {
            entries: self.compensation_entries().to_vec(),
        }
    }

    /// Whether any compensation attempt failed.
    #[must_use]
    pub fn has_compensation_failures(&self) -> bool {
        self.compensation_entries()
            .iter()
            .any(|entry| entry.phase == StepPhase::Failed)
    }

    /// Get a summary of the log for display.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut lines = Vec::new();
        for entry in &self.entries {
            let status = match entry.phase {
                StepPhase::Completed => "✓",
                StepPhase::Failed => "✗",
                StepPhase::Compensated => "↩",
            };
            match &entry.reason {
                Some(reason) => lines.push(format!("{status} {} ({reason})", entry.step)),
                None => lines.push(format!("{status} {}", entry.step)),
            }
        }
        lines.join("\n")
    }
}

impl FromIterator<LogEntry> for ExecutionLog {
    fn from_iter<I: IntoIterator<Item = LogEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ExecutionLog {
    type Item = &'a LogEntry;
    type IntoIter = std::slice::Iter<'a, LogEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failed_run_log() -> ExecutionLog {
        let mut log = ExecutionLog::new();
        log.record_completed("create_code");
        log.record_completed("debit");
        log.record_failed("activate", "boom".to_string());
        log.record_failed("debit", "ledger offline".to_string());
        log.record_compensated("create_code");
        log
    }

    #[test]
    fn new_log_is_empty() {
        let log = ExecutionLog::new();
        assert!(log.is_empty());
        assert!(log.compensation_entries().is_empty());
        assert!(log.forward_failure().is_none());
    }

    #[test]
    fn entries_keep_recording_order() {
        let log = failed_run_log();

        assert_eq!(
            log.phases(),
            vec![
                ("create_code", StepPhase::Completed),
                ("debit", StepPhase::Completed),
                ("activate", StepPhase::Failed),
                ("debit", StepPhase::Failed),
                ("create_code", StepPhase::Compensated),
            ]
        );
    }

    #[test]
    fn forward_failure_is_first_failed_entry() {
        let failure = failed_run_log()
            .forward_failure()
            .expect("log has a forward failure");

        assert_eq!(failure.step, "activate");
        assert_eq!(failure.reason, "boom");
    }

    #[test]
    fn compensation_entries_start_after_forward_failure() {
        let log = failed_run_log();

        let entries = log.compensation_entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], LogEntry::failed("debit", "ledger offline"));
        assert_eq!(entries[1], LogEntry::compensated("create_code"));
        assert!(log.has_compensation_failures());
    }

    #[test]
    fn successful_log_has_no_compensation_entries() {
        let mut log = ExecutionLog::new();
        log.record_completed("a");
        log.record_completed("b");

        assert!(log.compensation_log().is_empty());
        assert!(!log.has_compensation_failures());
    }

    #[test]
    fn summary_formats_all_entries() {
        let summary = failed_run_log().summary();

        assert!(summary.contains("✓ create_code"));
        assert!(summary.contains("✗ activate (boom)"));
        assert!(summary.contains("↩ create_code"));
    }

    #[test]
    fn serializes_as_plain_array() -> anyhow::Result<()> {
        let mut log = ExecutionLog::new();
        log.record_completed("debit");
        log.record_failed("activate", "boom".to_string());

        let json = serde_json::to_value(&log)?;

        assert_eq!(
            json,
            serde_json::json!([
                {"step": "debit", "phase": "completed"},
                {"step": "activate", "phase": "failed", "reason": "boom"},
            ])
        );
        Ok(())
    }
}
