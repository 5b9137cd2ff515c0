use saga_core::{ExecutionLog, SagaResult, SagaStatus};
use serde::{Deserialize, Serialize};

/// Persisted progress of one saga run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SagaState<C> {
    pub saga_id: String,
    /// Name of the workflow the run belongs to.
    pub workflow: String,
    /// Step about to be executed or compensated; `None` once the run is over.
    pub current_step: Option<String>,
    pub status: SagaStatus,
    pub context: C,
    pub log: ExecutionLog,
}

impl<C: Clone> SagaState<C> {
    /// Snapshot of a run that is still in progress.
    #[must_use]
    pub fn checkpoint(
        saga_id: &str,
        workflow: &str,
        current_step: Option<&str>,
        run: &saga_core::SagaRun<C>,
    ) -> Self {
        Self {
            saga_id: saga_id.to_string(),
            workflow: workflow.to_string(),
            current_step: current_step.map(str::to_string),
            status: run.status(),
            context: run.context().clone(),
            log: run.log().clone(),
        }
    }

    /// Snapshot of a finished run.
    #[must_use]
    pub fn finished(saga_id: &str, workflow: &str, result: &SagaResult<C>) -> Self {
        Self {
            saga_id: saga_id.to_string(),
            workflow: workflow.to_string(),
            current_step: None,
            status: result.status,
            context: result.data.clone(),
            log: result.execution_log.clone(),
        }
    }
}

impl<C> SagaState<C> {
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.status.is_terminal()
    }
}
