//! Saga orchestration for multi-step operations.
//!
//! This crate runs an ordered list of steps over a shared context. Each step
//! returns the complete next context. When a step fails, the steps that
//! already completed are compensated in reverse order on a best-effort basis:
//! a failing compensation is recorded in the execution log and the sweep
//! continues with the earlier steps.
//!
//! A run is an explicit [`SagaRun`] value advanced one transition at a time,
//! which lets wrappers persist progress between steps and rebuild a run from
//! a persisted log with [`SagaOrchestrator::rehydrate`].

mod builder;
mod error;
mod log;
mod observer;
mod orchestrator;
mod result;
mod run;
mod step;

pub use builder::SagaBuilder;
pub use error::{ConfigError, RehydrateError};
pub use log::{ExecutionLog, LogEntry, StepPhase};
pub use observer::StepObserver;
pub use orchestrator::SagaOrchestrator;
pub use result::{FAILURE_MESSAGE, SagaResult, SagaStatus, StepFailure};
pub use run::{Progress, SagaRun};
pub use step::{BoxedStep, SagaStep};
