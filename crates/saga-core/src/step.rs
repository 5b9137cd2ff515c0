use std::fmt::Display;

use async_trait::async_trait;

/// A step in a saga that can be executed and compensated.
///
/// Each step receives the whole saga context and returns the whole replacement
/// context. Partial updates are never merged: whatever `execute` or
/// `compensate` returns becomes the context seen by the next call.
///
/// Because steps only ever borrow the current context, a failed call leaves
/// the orchestrator's context exactly as it was before the call.
///
/// # Type Parameters
///
/// - `Context`: The saga's working data, threaded through every step
/// - `Error`: The error type for step failures, rendered into the execution log
#[async_trait]
pub trait SagaStep: Send + Sync {
    /// The saga's working data.
    type Context: Send + Sync;

    /// Error type for step failures.
    type Error: Display + Send;

    /// Unique, human-readable name for logging and compensation attribution.
    fn name(&self) -> &str;

    /// Execute the step, producing the next context.
    ///
    /// # Errors
    ///
    /// Returns an error if the step fails to complete. The orchestrator then
    /// compensates every step that completed before this one.
    async fn execute(&self, ctx: &Self::Context) -> Result<Self::Context, Self::Error>;

    /// Compensate (undo) the step's effects.
    ///
    /// Only called for steps whose `execute` previously returned `Ok`, in
    /// reverse completion order, with the context as left by the later steps'
    /// compensations.
    ///
    /// # Errors
    ///
    /// Returns an error if compensation fails. The failure is recorded and the
    /// remaining compensations still run.
    async fn compensate(&self, ctx: &Self::Context) -> Result<Self::Context, Self::Error>;

    /// Human-readable description of what compensation will do.
    fn compensation_description(&self) -> String {
        format!("undo {}", self.name())
    }
}

/// A type-erased step over context `C` failing with `E`.
pub type BoxedStep<C, E> = Box<dyn SagaStep<Context = C, Error = E>>;
