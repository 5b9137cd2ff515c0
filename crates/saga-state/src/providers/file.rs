use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::fs;

use crate::Result;
use crate::error::StateError;
use crate::repository::StateRepository;
use crate::state::SagaState;

const STATE_EXTENSION: &str = "json";

/// Stores each saga's state as a JSON document in a directory.
///
/// The file for saga `order-1` is `<dir>/order-1.json`. Writes go to a
/// temporary file first and are renamed into place, so a crash mid-write
/// leaves the previous checkpoint intact.
#[derive(Debug, Clone)]
pub struct FileSystemStateRepository {
    dir: PathBuf,
}

impl FileSystemStateRepository {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the state file for `saga_id`.
    ///
    /// # Errors
    ///
    /// Returns `StateError::InvalidSagaId` if the id is empty, starts with a
    /// dot, or contains anything but ASCII letters, digits, `-`, `_` and `.`.
    pub fn state_path(&self, saga_id: &str) -> Result<PathBuf> {
        validate_saga_id(saga_id)?;
        Ok(self.dir.join(format!("{saga_id}.{STATE_EXTENSION}")))
    }
}

#[async_trait]
impl<C> StateRepository<C> for FileSystemStateRepository
where
    C: Serialize + DeserializeOwned + Send + Sync,
{
    async fn save(&self, state: &SagaState<C>) -> Result<()> {
        let path = self.state_path(&state.saga_id)?;
        let content =
            serde_json::to_string_pretty(state).map_err(|source| StateError::Serialize {
                path: path.clone(),
                source,
            })?;

        fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| StateError::Write {
                path: self.dir.clone(),
                source,
            })?;

        let temp_path = self.dir.join(format!(".{}.{STATE_EXTENSION}.tmp", state.saga_id));
        fs::write(&temp_path, content)
            .await
            .map_err(|source| StateError::Write {
                path: temp_path.clone(),
                source,
            })?;
        fs::rename(&temp_path, &path)
            .await
            .map_err(|source| StateError::Write {
                path: path.clone(),
                source,
            })?;

        Ok(())
    }

    async fn load(&self, saga_id: &str) -> Result<Option<SagaState<C>>> {
        let path = self.state_path(saga_id)?;

        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(StateError::Read { path, source }),
        };

        let state = serde_json::from_str(&content)
            .map_err(|source| StateError::Parse { path, source })?;

        Ok(Some(state))
    }
}

fn validate_saga_id(saga_id: &str) -> Result<()> {
    let valid = !saga_id.is_empty()
        && !saga_id.starts_with('.')
        && saga_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));

    if valid {
        Ok(())
    } else {
        Err(StateError::InvalidSagaId(saga_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use saga_core::{ExecutionLog, LogEntry, SagaStatus};
    use serde::Deserialize;
    use tempfile::TempDir;

    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Order {
        id: String,
        reserved: bool,
    }

    fn setup_test_dir() -> TempDir {
        tempfile::tempdir().expect("failed to create temp dir")
    }

    fn order_state(saga_id: &str) -> SagaState<Order> {
        SagaState {
            saga_id: saga_id.to_string(),
            workflow: "orders".to_string(),
            current_step: Some("charge".to_string()),
            status: SagaStatus::Running,
            context: Order {
                id: "o-1".to_string(),
                reserved: true,
            },
            log: ExecutionLog::from_iter([LogEntry::completed("reserve")]),
        }
    }

    #[tokio::test]
    async fn load_nonexistent_returns_none() -> anyhow::Result<()> {
        let dir = setup_test_dir();
        let repository = FileSystemStateRepository::new(dir.path());

        let loaded: Option<SagaState<Order>> = repository.load("order-1").await?;

        assert!(loaded.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn save_and_load_roundtrip() -> anyhow::Result<()> {
        let dir = setup_test_dir();
        let repository = FileSystemStateRepository::new(dir.path());
        let state = order_state("order-1");

        repository.save(&state).await?;
        let loaded: Option<SagaState<Order>> = repository.load("order-1").await?;

        assert_eq!(loaded, Some(state));
        Ok(())
    }

    #[tokio::test]
    async fn save_creates_missing_directory() -> anyhow::Result<()> {
        let dir = setup_test_dir();
        let nested = dir.path().join("state").join("sagas");
        let repository = FileSystemStateRepository::new(&nested);

        repository.save(&order_state("order-1")).await?;

        assert!(nested.join("order-1.json").exists());
        assert!(!nested.join(".order-1.json.tmp").exists());
        Ok(())
    }

    #[tokio::test]
    async fn state_file_is_readable_json() -> anyhow::Result<()> {
        let dir = setup_test_dir();
        let repository = FileSystemStateRepository::new(dir.path());
        repository.save(&order_state("order-1")).await?;

        let content = std::fs::read_to_string(dir.path().join("order-1.json"))?;
        let value: serde_json::Value = serde_json::from_str(&content)?;

        assert_eq!(value["status"], "running");
        assert_eq!(value["current_step"], "charge");
        assert_eq!(value["log"][0]["step"], "reserve");
        assert_eq!(value["log"][0]["phase"], "completed");
        Ok(())
    }

    #[tokio::test]
    async fn load_invalid_json_returns_parse_error() {
        let dir = setup_test_dir();
        let repository = FileSystemStateRepository::new(dir.path());
        std::fs::write(dir.path().join("order-1.json"), "{ not json").expect("write file");

        let result: Result<Option<SagaState<Order>>> = repository.load("order-1").await;

        let err = result.expect_err("should fail to parse invalid JSON");
        assert!(
            matches!(err, StateError::Parse { .. }),
            "expected Parse error, got: {err:?}"
        );
    }

    #[tokio::test]
    async fn path_like_saga_ids_are_rejected() {
        let dir = setup_test_dir();
        let repository = FileSystemStateRepository::new(dir.path());

        for saga_id in ["", "../escape", "a/b", ".hidden", "a\\b"] {
            let result: Result<Option<SagaState<Order>>> = repository.load(saga_id).await;
            assert!(
                matches!(result, Err(StateError::InvalidSagaId(_))),
                "expected {saga_id:?} to be rejected"
            );
        }
    }

    #[test]
    fn state_path_uses_json_extension() -> anyhow::Result<()> {
        let repository = FileSystemStateRepository::new("/var/sagas");

        let path = repository.state_path("order-1")?;

        assert_eq!(path, PathBuf::from("/var/sagas/order-1.json"));
        Ok(())
    }
}
