use std::collections::HashSet;
use std::fmt::Display;

use tracing::{debug, info, warn};

use crate::error::{ConfigError, RehydrateError};
use crate::log::{ExecutionLog, LogEntry, StepPhase};
use crate::observer::StepObserver;
use crate::result::{SagaResult, SagaStatus};
use crate::run::{Progress, SagaRun};
use crate::step::BoxedStep;

/// Runs an ordered list of steps over a shared context.
///
/// Steps execute strictly in order. If one fails, every step that completed
/// before it is compensated in reverse completion order (LIFO). A failing
/// compensation is recorded and the sweep carries on with the earlier steps.
pub struct SagaOrchestrator<C, E> {
    steps: Vec<BoxedStep<C, E>>,
    initial: C,
    observer: Option<Box<dyn StepObserver<C>>>,
}

impl<C, E> SagaOrchestrator<C, E>
where
    C: Clone + Send + Sync,
    E: Display + Send,
{
    /// Create an orchestrator over `steps`, starting every run from `initial`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NoSteps` if `steps` is empty and
    /// `ConfigError::DuplicateStep` if two steps share a name.
    pub fn new(steps: Vec<BoxedStep<C, E>>, initial: C) -> Result<Self, ConfigError> {
        validate_steps(&steps)?;
        Ok(Self {
            steps,
            initial,
            observer: None,
        })
    }

    /// Attach a hook called after each completed forward step.
    #[must_use]
    pub fn with_observer(mut self, observer: impl StepObserver<C> + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    pub(crate) fn set_observer(&mut self, observer: Box<dyn StepObserver<C>>) {
        self.observer = Some(observer);
    }

    /// Names of the steps in execution order.
    pub fn step_names(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().map(|step| step.name())
    }

    #[must_use]
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    #[must_use]
    pub fn initial_context(&self) -> &C {
        &self.initial
    }

    /// A fresh run positioned before the first step.
    #[must_use]
    pub fn start(&self) -> SagaRun<C> {
        SagaRun::new(self.initial.clone())
    }

    /// Execute the saga to completion.
    ///
    /// Never fails: a failed step triggers compensation and the outcome is
    /// reported through the returned [`SagaResult`].
    pub async fn execute(&self) -> SagaResult<C> {
        let mut run = self.start();
        loop {
            match self.advance(run).await {
                Progress::Pending(next) => run = next,
                Progress::Finished(result) => return result,
            }
        }
    }

    /// Perform one transition: execute the next step, or compensate the next
    /// completed step once a failure has occurred.
    pub async fn advance(&self, run: SagaRun<C>) -> Progress<C> {
        match run.status {
            SagaStatus::Running => self.execute_next(run).await,
            SagaStatus::Compensating => self.compensate_next(run).await,
            _ => self.settle(run),
        }
    }

    /// Name of the step the next call to [`advance`](Self::advance) will invoke.
    #[must_use]
    pub fn next_step(&self, run: &SagaRun<C>) -> Option<&str> {
        let index = match run.status {
            SagaStatus::Running => run.cursor,
            SagaStatus::Compensating => *run.completed.last()?,
            _ => return None,
        };
        self.steps.get(index).map(|step| step.name())
    }

    /// Rebuild a run from a persisted context and execution log.
    ///
    /// Completed entries are matched against the step list in order, and any
    /// compensation entries against the completed steps in reverse. The
    /// returned run picks up exactly where the log stops.
    ///
    /// # Errors
    ///
    /// Returns a `RehydrateError` if the log does not describe a valid run of
    /// this saga's steps.
    pub fn rehydrate(&self, context: C, log: ExecutionLog) -> Result<Progress<C>, RehydrateError> {
        let mut run = SagaRun::new(context);
        let entries = log.entries();
        let mut position = 0;

        while let Some(entry) = entries.get(position) {
            if entry.phase != StepPhase::Completed {
                break;
            }
            let expected = self
                .steps
                .get(run.cursor)
                .ok_or_else(|| unexpected(entry))?;
            if entry.step != expected.name() {
                return Err(self.mismatch(entry, expected.name()));
            }
            run.completed.push(run.cursor);
            run.cursor += 1;
            position += 1;
        }

        if let Some(failure) = entries.get(position) {
            let expected = self
                .steps
                .get(run.cursor)
                .filter(|_| failure.phase == StepPhase::Failed)
                .ok_or_else(|| unexpected(failure))?;
            if failure.step != expected.name() {
                return Err(self.mismatch(failure, expected.name()));
            }
            run.status = SagaStatus::Compensating;

            for entry in &entries[position + 1..] {
                let index = run
                    .completed
                    .last()
                    .copied()
                    .filter(|_| entry.phase != StepPhase::Completed)
                    .ok_or_else(|| unexpected(entry))?;
                let expected = self.steps[index].name();
                if entry.step != expected {
                    if self.step_names().all(|name| name != entry.step) {
                        return Err(RehydrateError::UnknownStep(entry.step.clone()));
                    }
                    return Err(RehydrateError::CompensationOutOfOrder {
                        expected: expected.to_string(),
                        found: entry.step.clone(),
                    });
                }
                run.completed.pop();
            }
        }

        run.log = log;
        Ok(self.settle(run))
    }

    async fn execute_next(&self, mut run: SagaRun<C>) -> Progress<C> {
        let Some(step) = self.steps.get(run.cursor) else {
            return self.settle(run);
        };
        let name = step.name();

        debug!(step = name, index = run.cursor, "executing step");
        match step.execute(&run.context).await {
            Ok(next) => {
                run.context = next;
                run.log.record_completed(name);
                run.completed.push(run.cursor);
                run.cursor += 1;
                debug!(step = name, "step completed");

                if let Some(observer) = &self.observer {
                    observer.on_step_completed(name, &run.context).await;
                }
            }
            Err(error) => {
                warn!(
                    step = name,
                    error = %error,
                    completed = run.completed.len(),
                    "step failed, compensating completed steps"
                );
                run.log.record_failed(name, error.to_string());
                run.status = SagaStatus::Compensating;
            }
        }

        self.settle(run)
    }

    async fn compensate_next(&self, mut run: SagaRun<C>) -> Progress<C> {
        let Some(index) = run.completed.pop() else {
            return self.settle(run);
        };
        let Some(step) = self.steps.get(index) else {
            // The run was started by a saga with more steps than this one.
            let name = format!("step #{index}");
            warn!(step = %name, "no such step to compensate, continuing");
            run.log
                .record_failed(&name, "step is not part of this saga".to_string());
            return self.settle(run);
        };
        let name = step.name();

        debug!(
            step = name,
            compensation = %step.compensation_description(),
            "compensating step"
        );
        match step.compensate(&run.context).await {
            Ok(next) => {
                run.context = next;
                run.log.record_compensated(name);
            }
            Err(error) => {
                warn!(step = name, error = %error, "compensation failed, continuing");
                run.log.record_failed(name, error.to_string());
            }
        }

        self.settle(run)
    }

    /// Move the run to a terminal status if it has nothing left to do.
    fn settle(&self, run: SagaRun<C>) -> Progress<C> {
        let status = match run.status {
            SagaStatus::Running if run.cursor >= self.steps.len() => {
                info!(steps = self.steps.len(), "saga succeeded");
                SagaStatus::Succeeded
            }
            SagaStatus::Compensating if run.completed.is_empty() => {
                if run.log.has_compensation_failures() {
                    warn!("saga failed and some compensations failed");
                    SagaStatus::PartiallyCompensated
                } else {
                    info!("saga failed and was fully compensated");
                    SagaStatus::Compensated
                }
            }
            SagaStatus::Running | SagaStatus::Compensating => return Progress::Pending(run),
            terminal => terminal,
        };
        Progress::Finished(run.finish(status))
    }

    fn mismatch(&self, entry: &LogEntry, expected: &str) -> RehydrateError {
        if self.step_names().any(|name| name == entry.step) {
            RehydrateError::OutOfOrder {
                expected: expected.to_string(),
                found: entry.step.clone(),
            }
        } else {
            RehydrateError::UnknownStep(entry.step.clone())
        }
    }
}

fn unexpected(entry: &LogEntry) -> RehydrateError {
    RehydrateError::UnexpectedEntry {
        step: entry.step.clone(),
        phase: entry.phase,
    }
}

fn validate_steps<C, E>(steps: &[BoxedStep<C, E>]) -> Result<(), ConfigError>
where
    C: Send + Sync,
    E: Display + Send,
{
    if steps.is_empty() {
        return Err(ConfigError::NoSteps);
    }

    let mut seen = HashSet::new();
    for step in steps {
        if !seen.insert(step.name()) {
            return Err(ConfigError::DuplicateStep(step.name().to_string()));
        }
    }
    Ok(())
}
