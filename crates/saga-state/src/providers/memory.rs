use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::Result;
use crate::repository::StateRepository;
use crate::state::SagaState;

/// Keeps saga states in process memory.
///
/// Nothing survives the process, so this suits tests and demos rather than
/// crash recovery.
pub struct InMemoryStateRepository<C> {
    states: RwLock<HashMap<String, SagaState<C>>>,
}

impl<C> InMemoryStateRepository<C> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            states: RwLock::new(HashMap::new()),
        }
    }

    /// Number of sagas with a stored state.
    #[must_use]
    pub async fn len(&self) -> usize {
        self.states.read().await.len()
    }

    #[must_use]
    pub async fn is_empty(&self) -> bool {
        self.states.read().await.is_empty()
    }
}

impl<C> Default for InMemoryStateRepository<C> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<C> StateRepository<C> for InMemoryStateRepository<C>
where
    C: Clone + Send + Sync,
{
    async fn save(&self, state: &SagaState<C>) -> Result<()> {
        self.states
            .write()
            .await
            .insert(state.saga_id.clone(), state.clone());
        Ok(())
    }

    async fn load(&self, saga_id: &str) -> Result<Option<SagaState<C>>> {
        Ok(self.states.read().await.get(saga_id).cloned())
    }
}
