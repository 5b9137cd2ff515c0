use async_trait::async_trait;

/// Hook invoked after each successfully completed forward step.
///
/// Suited to incremental persistence or telemetry. The orchestrator awaits the
/// hook but ignores its outcome, and never calls it during compensation.
/// Implementations handle their own failures.
#[async_trait]
pub trait StepObserver<C>: Send + Sync {
    /// Called with the context produced by `step`.
    async fn on_step_completed(&self, step: &str, context: &C);
}
