//! Durable checkpointing for saga runs.
//!
//! The saga orchestrator itself keeps no state between runs. This crate
//! composes it with a [`StateRepository`] so that progress is saved around
//! every step and an interrupted run can be resumed from its last checkpoint.

mod durable;
mod error;
pub mod providers;
mod repository;
mod state;

pub use durable::DurableSaga;
pub use error::{Result, StateError};
pub use repository::StateRepository;
pub use state::SagaState;
