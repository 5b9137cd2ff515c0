use serde::{Deserialize, Serialize};

use crate::log::ExecutionLog;

/// Message carried by every failed saga result.
pub const FAILURE_MESSAGE: &str = "one or more steps failed; compensated/failed steps are in the log";

/// Where a saga run stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SagaStatus {
    /// Executing steps in order.
    Running,
    /// A step failed; compensating completed steps in reverse order.
    Compensating,
    /// Every step executed successfully.
    Succeeded,
    /// A step failed and every completed step was compensated.
    Compensated,
    /// A step failed and at least one compensation failed too.
    PartiallyCompensated,
}

impl SagaStatus {
    /// Whether no further transition can happen from this status.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Succeeded | Self::Compensated | Self::PartiallyCompensated
        )
    }
}

/// The forward step whose failure triggered compensation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepFailure {
    /// Name of the step that failed.
    pub step: String,
    /// Error text returned by the step.
    pub reason: String,
}

/// Outcome of a saga run.
///
/// A run never fails with an `Err`; failures are encoded here instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SagaResult<C> {
    /// Terminal status of the run.
    pub status: SagaStatus,
    /// Context after the last successful execute or compensate call.
    pub data: C,
    /// Generic failure message, set when the run did not succeed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// The forward step that failed, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<StepFailure>,
    /// Compensation phase entries, present whenever the run did not succeed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compensation_log: Option<ExecutionLog>,
    /// Every entry of the run, forward and backward.
    pub execution_log: ExecutionLog,
}

impl<C> SagaResult<C> {
    pub(crate) fn new(status: SagaStatus, data: C, log: ExecutionLog) -> Self {
        let succeeded = status == SagaStatus::Succeeded;
        Self {
            status,
            data,
            error: (!succeeded).then(|| FAILURE_MESSAGE.to_string()),
            failure: log.forward_failure(),
            compensation_log: (!succeeded).then(|| log.compensation_log()),
            execution_log: log,
        }
    }

    /// Whether every step executed successfully.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == SagaStatus::Succeeded
    }

    /// Whether compensation ran and at least one compensation failed.
    #[must_use]
    pub fn is_partially_compensated(&self) -> bool {
        self.status == SagaStatus::PartiallyCompensated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_statuses() {
        assert!(!SagaStatus::Running.is_terminal());
        assert!(!SagaStatus::Compensating.is_terminal());
        assert!(SagaStatus::Succeeded.is_terminal());
        assert!(SagaStatus::Compensated.is_terminal());
        assert!(SagaStatus::PartiallyCompensated.is_terminal());
    }

    #[test]
    fn successful_result_has_no_error_or_compensation_log() {
        let mut log = ExecutionLog::new();
        log.record_completed("only");

        let result = SagaResult::new(SagaStatus::Succeeded, 7, log);

        assert!(result.is_success());
        assert!(result.error.is_none());
        assert!(result.failure.is_none());
        assert!(result.compensation_log.is_none());
        assert_eq!(result.execution_log.len(), 1);
    }

    #[test]
    fn failed_result_carries_generic_message_and_failure() {
        let mut log = ExecutionLog::new();
        log.record_completed("first");
        log.record_failed("second", "boom".to_string());
        log.record_compensated("first");

        let result = SagaResult::new(SagaStatus::Compensated, 0, log);

        assert!(!result.is_success());
        assert_eq!(result.error.as_deref(), Some(FAILURE_MESSAGE));
        assert_eq!(
            result.failure,
            Some(StepFailure {
                step: "second".to_string(),
                reason: "boom".to_string(),
            })
        );
        let compensation_log = result.compensation_log.expect("compensation log");
        assert_eq!(compensation_log.len(), 1);
    }

    #[test]
    fn status_serializes_in_snake_case() -> anyhow::Result<()> {
        let json = serde_json::to_string(&SagaStatus::PartiallyCompensated)?;
        assert_eq!(json, "\"partially_compensated\"");
        Ok(())
    }
}
