use std::fmt::Display;

use saga_core::{Progress, SagaOrchestrator, SagaResult, SagaRun};
use tracing::{debug, info};

use crate::Result;
use crate::error::StateError;
use crate::repository::StateRepository;
use crate::state::SagaState;

/// A saga whose progress is checkpointed to a [`StateRepository`].
///
/// The state is saved before every transition, naming the step about to run,
/// and once more after the run finishes. If the process dies mid-run,
/// [`resume`](Self::resume) rebuilds the run from the last checkpoint and
/// carries on. The step that was in flight is executed again, so steps
/// should tolerate being run more than once.
pub struct DurableSaga<C, E, R> {
    orchestrator: SagaOrchestrator<C, E>,
    repository: R,
    workflow: String,
}

impl<C, E, R> DurableSaga<C, E, R>
where
    C: Clone + Send + Sync,
    E: Display + Send,
    R: StateRepository<C>,
{
    #[must_use]
    pub fn new(
        workflow: impl Into<String>,
        orchestrator: SagaOrchestrator<C, E>,
        repository: R,
    ) -> Self {
        Self {
            orchestrator,
            repository,
            workflow: workflow.into(),
        }
    }

    #[must_use]
    pub fn workflow(&self) -> &str {
        &self.workflow
    }

    #[must_use]
    pub fn orchestrator(&self) -> &SagaOrchestrator<C, E> {
        &self.orchestrator
    }

    #[must_use]
    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Start a new run of the saga under `saga_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if a checkpoint cannot be saved. The run stops at that
    /// point and can be resumed from the last saved checkpoint.
    pub async fn execute(&self, saga_id: &str) -> Result<SagaResult<C>> {
        info!(saga_id, workflow = %self.workflow, "starting saga");
        self.drive(saga_id, self.orchestrator.start()).await
    }

    /// Continue the run saved under `saga_id` from its last checkpoint.
    ///
    /// A run that already finished is returned as is, without invoking any
    /// step.
    ///
    /// # Errors
    ///
    /// Returns an error if no state is saved for `saga_id`, the state belongs
    /// to another workflow, its log does not match the saga's steps, or a
    /// checkpoint cannot be loaded or saved.
    pub async fn resume(&self, saga_id: &str) -> Result<SagaResult<C>> {
        let state = self
            .repository
            .load(saga_id)
            .await?
            .ok_or_else(|| StateError::NotFound(saga_id.to_string()))?;

        if state.workflow != self.workflow {
            return Err(StateError::WorkflowMismatch {
                saga_id: saga_id.to_string(),
                expected: self.workflow.clone(),
                found: state.workflow,
            });
        }

        let progress = self
            .orchestrator
            .rehydrate(state.context, state.log)
            .map_err(|source| StateError::Rehydrate {
                saga_id: saga_id.to_string(),
                source,
            })?;

        match progress {
            Progress::Pending(run) => {
                info!(
                    saga_id,
                    status = ?run.status(),
                    next_step = self.orchestrator.next_step(&run),
                    "resuming saga"
                );
                self.drive(saga_id, run).await
            }
            Progress::Finished(result) => {
                debug!(saga_id, status = ?result.status, "saga already finished");
                if !state.status.is_terminal() {
                    self.save_finished(saga_id, &result).await?;
                }
                Ok(result)
            }
        }
    }

    async fn drive(&self, saga_id: &str, mut run: SagaRun<C>) -> Result<SagaResult<C>> {
        loop {
            let current_step = self.orchestrator.next_step(&run);
            let checkpoint = SagaState::checkpoint(saga_id, &self.workflow, current_step, &run);
            self.repository.save(&checkpoint).await?;
            debug!(saga_id, step = current_step, status = ?run.status(), "saved checkpoint");

            match self.orchestrator.advance(run).await {
                Progress::Pending(next) => run = next,
                Progress::Finished(result) => {
                    self.save_finished(saga_id, &result).await?;
                    return Ok(result);
                }
            }
        }
    }

    async fn save_finished(&self, saga_id: &str, result: &SagaResult<C>) -> Result<()> {
        let state = SagaState::finished(saga_id, &self.workflow, result);
        self.repository.save(&state).await?;
        debug!(saga_id, status = ?result.status, "saved final state");
        Ok(())
    }
}
