use async_trait::async_trait;

use crate::Result;
use crate::state::SagaState;

/// Durable store for saga progress.
///
/// Implementations keep one state per saga id; a save replaces any state
/// previously stored under the same id.
#[async_trait]
pub trait StateRepository<C>: Send + Sync {
    /// Stores `state`, replacing the previous state for its saga id.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be serialized or written.
    async fn save(&self, state: &SagaState<C>) -> Result<()>;

    /// Loads the state stored for `saga_id`.
    /// Returns `Ok(None)` if nothing was saved for it.
    ///
    /// # Errors
    ///
    /// Returns an error if stored state exists but cannot be read or parsed.
    async fn load(&self, saga_id: &str) -> Result<Option<SagaState<C>>>;
}
