use async_trait::async_trait;
use practice_core::model::{ProblemId, ProgressSnapshot};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),
}

/// Repository contract for per-problem progress snapshots.
///
/// Snapshots live for the duration of a running session; nothing here
/// promises durability across restarts.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Persist the snapshot for a problem, overwriting any prior one.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the snapshot cannot be stored.
    async fn save_snapshot(
        &self,
        id: ProblemId,
        snapshot: &ProgressSnapshot,
    ) -> Result<(), StorageError>;

    /// Fetch the snapshot for a problem.
    ///
    /// Returns `None` when the problem was never visited; the caller
    /// initializes a default snapshot in that case.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` for adapter failures, never for a missing
    /// snapshot.
    async fn get_snapshot(&self, id: ProblemId) -> Result<Option<ProgressSnapshot>, StorageError>;
}

/// In-memory progress store backing a single running session.
#[derive(Clone, Default)]
pub struct InMemoryProgressStore {
    snapshots: Arc<Mutex<HashMap<ProblemId, ProgressSnapshot>>>,
}

impl InMemoryProgressStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            snapshots: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl ProgressRepository for InMemoryProgressStore {
    async fn save_snapshot(
        &self,
        id: ProblemId,
        snapshot: &ProgressSnapshot,
    ) -> Result<(), StorageError> {
        let mut guard = self
            .snapshots
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(id, snapshot.clone());
        Ok(())
    }

    async fn get_snapshot(&self, id: ProblemId) -> Result<Option<ProgressSnapshot>, StorageError> {
        let guard = self
            .snapshots
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(&id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use practice_core::model::CompletedStep;

    fn snapshot_with_points(points: u32) -> ProgressSnapshot {
        ProgressSnapshot {
            current_step_index: 1,
            completed_answers: vec![CompletedStep {
                step_number: 1,
                answer: "2".to_string(),
            }],
            is_completed: false,
            question_points: points,
            counter_visible: true,
        }
    }

    #[tokio::test]
    async fn missing_snapshot_is_none() {
        let store = InMemoryProgressStore::new();
        let loaded = store.get_snapshot(ProblemId::new(0)).await.unwrap();
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn save_overwrites_unconditionally() {
        let store = InMemoryProgressStore::new();
        let id = ProblemId::new(0);

        store
            .save_snapshot(id, &snapshot_with_points(10))
            .await
            .unwrap();
        store
            .save_snapshot(id, &snapshot_with_points(20))
            .await
            .unwrap();

        let loaded = store.get_snapshot(id).await.unwrap().unwrap();
        assert_eq!(loaded.question_points, 20);
    }

    #[tokio::test]
    async fn snapshots_are_independent_per_problem() {
        let store = InMemoryProgressStore::new();
        let a = ProblemId::new(0);
        let b = ProblemId::new(1);

        store.save_snapshot(a, &snapshot_with_points(10)).await.unwrap();
        store
            .save_snapshot(b, &ProgressSnapshot::default())
            .await
            .unwrap();
        store.save_snapshot(a, &snapshot_with_points(30)).await.unwrap();

        let loaded_b = store.get_snapshot(b).await.unwrap().unwrap();
        assert!(loaded_b.is_fresh());
    }
}
