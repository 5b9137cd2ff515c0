use crate::log::ExecutionLog;
use crate::result::{SagaResult, SagaStatus};

/// The state of one saga run, threaded through
/// [`SagaOrchestrator::advance`](crate::SagaOrchestrator::advance).
///
/// A run is a plain value: the orchestrator consumes it and hands back the
/// next one, so nothing about a run lives on the orchestrator itself.
#[derive(Debug, Clone)]
pub struct SagaRun<C> {
    pub(crate) status: SagaStatus,
    pub(crate) cursor: usize,
    pub(crate) context: C,
    /// Indices of completed steps that have not been compensated yet.
    pub(crate) completed: Vec<usize>,
    pub(crate) log: ExecutionLog,
}

impl<C> SagaRun<C> {
    pub(crate) fn new(context: C) -> Self {
        Self {
            status: SagaStatus::Running,
            cursor: 0,
            context,
            completed: Vec::new(),
            log: ExecutionLog::new(),
        }
    }

    #[must_use]
    pub fn status(&self) -> SagaStatus {
        self.status
    }

    /// Index of the next step to execute during the forward phase.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn context(&self) -> &C {
        &self.context
    }

    #[must_use]
    pub fn log(&self) -> &ExecutionLog {
        &self.log
    }

    pub(crate) fn finish(self, status: SagaStatus) -> SagaResult<C> {
        SagaResult::new(status, self.context, self.log)
    }
}

/// Result of a single state transition.
#[derive(Debug)]
pub enum Progress<C> {
    /// The run has more work to do.
    Pending(SagaRun<C>),
    /// The run reached a terminal status.
    Finished(SagaResult<C>),
}
