use std::fmt::Display;

use crate::error::ConfigError;
use crate::observer::StepObserver;
use crate::orchestrator::SagaOrchestrator;
use crate::step::{BoxedStep, SagaStep};

/// Builder for assembling a saga step by step.
///
/// Every step must share the same context and error types, which the
/// compiler checks as steps are added:
///
/// ```compile_fail
/// use async_trait::async_trait;
/// use saga_core::{SagaBuilder, SagaStep};
///
/// struct Count;
/// #[async_trait]
/// impl SagaStep for Count {
///     type Context = i32;
///     type Error = String;
///     fn name(&self) -> &str { "count" }
///     async fn execute(&self, ctx: &i32) -> Result<i32, String> { Ok(ctx + 1) }
///     async fn compensate(&self, ctx: &i32) -> Result<i32, String> { Ok(ctx - 1) }
/// }
///
/// struct Label;
/// #[async_trait]
/// impl SagaStep for Label {
///     type Context = String;  // Context differs from the first step!
///     type Error = String;
///     fn name(&self) -> &str { "label" }
///     async fn execute(&self, ctx: &String) -> Result<String, String> { Ok(ctx.clone()) }
///     async fn compensate(&self, ctx: &String) -> Result<String, String> { Ok(ctx.clone()) }
/// }
///
/// let saga = SagaBuilder::new().step(Count).step(Label).build(0);
/// ```
///
/// Empty step lists and duplicate names are rejected by [`build`](Self::build).
pub struct SagaBuilder<C, E> {
    steps: Vec<BoxedStep<C, E>>,
    observer: Option<Box<dyn StepObserver<C>>>,
}

impl<C, E> SagaBuilder<C, E> {
    /// Create a new saga builder with no steps.
    #[must_use]
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            observer: None,
        }
    }

    /// Append a step to the saga.
    #[must_use]
    pub fn step<S>(mut self, step: S) -> Self
    where
        S: SagaStep<Context = C, Error = E> + 'static,
    {
        self.steps.push(Box::new(step));
        self
    }

    /// Append an already boxed step to the saga.
    #[must_use]
    pub fn boxed_step(mut self, step: BoxedStep<C, E>) -> Self {
        self.steps.push(step);
        self
    }

    /// Attach a hook called after each completed forward step.
    #[must_use]
    pub fn observer(mut self, observer: impl StepObserver<C> + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Build the orchestrator, starting every run from `initial`.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if no steps were added or two steps share a name.
    pub fn build(self, initial: C) -> Result<SagaOrchestrator<C, E>, ConfigError>
    where
        C: Clone + Send + Sync,
        E: Display + Send,
    {
        let mut orchestrator = SagaOrchestrator::new(self.steps, initial)?;
        if let Some(observer) = self.observer {
            orchestrator.set_observer(observer);
        }
        Ok(orchestrator)
    }
}

impl<C, E> Default for SagaBuilder<C, E> {
    fn default() -> Self {
        Self::new()
    }
}
