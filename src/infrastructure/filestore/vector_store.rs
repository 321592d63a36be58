use super::codec::{self, CorruptionPolicy, StoreFiles};
use super::snapshot::Snapshot;
use crate::domain::entities::document::{DocumentMetadata, ScoredDocument};
use crate::domain::error::DomainError;
use crate::domain::ports::vector_store::VectorStore;
use parking_lot::RwLock;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Vector store held in memory and mirrored to a pair of files.
///
/// Readers clone the current `Arc<Snapshot>` and scan it without holding a
/// lock. Writers are serialized by `writer`; each one builds the next snapshot,
/// persists it, and only then publishes it.
pub struct FileVectorStore {
    files: Option<StoreFiles>,
    snapshot: RwLock<Arc<Snapshot>>,
    writer: Mutex<()>,
}

impl FileVectorStore {
    /// A store that never touches disk.
    pub fn in_memory() -> Self {
        Self::from_snapshot(None, Snapshot::empty())
    }

    pub async fn open(dir: impl AsRef<Path>, policy: CorruptionPolicy) -> Result<Self, DomainError> {
        let files = StoreFiles::new(dir);
        let snapshot = match codec::load(&files).await {
            Ok(Some(snapshot)) => {
                tracing::info!(
                    dir = %files.dir().display(),
                    documents = snapshot.len(),
                    dimension = ?snapshot.dimension(),
                    "Loaded existing vector database"
                );
                snapshot
            }
            Ok(None) => {
                tracing::info!(dir = %files.dir().display(), "No existing database found, starting fresh");
                Snapshot::empty()
            }
            Err(DomainError::Corrupt(msg)) if policy == CorruptionPolicy::Reset => {
                tracing::error!(dir = %files.dir().display(), error = %msg, "Vector database is corrupt, starting empty");
                Snapshot::empty()
            }
            Err(e) => return Err(e),
        };
        Ok(Self::from_snapshot(Some(files), snapshot))
    }

    fn from_snapshot(files: Option<StoreFiles>, snapshot: Snapshot) -> Self {
        Self {
            files,
            snapshot: RwLock::new(Arc::new(snapshot)),
            writer: Mutex::new(()),
        }
    }

    /// Point-in-time view of the store.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.snapshot.read().clone()
    }

    pub fn files(&self) -> Option<&StoreFiles> {
        self.files.as_ref()
    }
}

#[async_trait::async_trait]
impl VectorStore for FileVectorStore {
    async fn append(&self, vector: Vec<f32>, metadata: DocumentMetadata) -> Result<usize, DomainError> {
        let _guard = self.writer.lock().await;

        let next = self.snapshot().appended(vector, metadata)?;
        if let Some(files) = &self.files {
            if let Err(e) = codec::save(files, &next).await {
                tracing::error!(dir = %files.dir().display(), error = %e, "Failed to persist vector database");
                return Err(e);
            }
        }

        let index = next.len() - 1;
        *self.snapshot.write() = Arc::new(next);
        Ok(index)
    }

    fn search_similar(&self, vector: &[f32], limit: usize) -> Result<Vec<ScoredDocument>, DomainError> {
        self.snapshot().rank(vector, limit)
    }

    fn len(&self) -> usize {
        self.snapshot.read().len()
    }

    fn dimension(&self) -> Option<usize> {
        self.snapshot.read().dimension()
    }

    fn metadata(&self) -> Vec<DocumentMetadata> {
        self.snapshot().metadata().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(text: &str) -> DocumentMetadata {
        let mut m = DocumentMetadata::default();
        m.document = text.to_string();
        m
    }

    #[tokio::test]
    async fn test_in_memory_append_and_search() {
        let store = FileVectorStore::in_memory();
        assert!(store.is_empty());
        assert_eq!(store.append(vec![1.0, 0.0], meta("a")).await.unwrap(), 0);
        assert_eq!(store.append(vec![0.0, 1.0], meta("b")).await.unwrap(), 1);
        assert_eq!(store.len(), 2);
        assert_eq!(store.dimension(), Some(2));

        let hits = store.search_similar(&[0.0, 1.0], 5).unwrap();
        assert_eq!(hits[0].text(), "b");
    }

    #[tokio::test]
    async fn test_rejected_append_leaves_store_untouched() {
        let store = FileVectorStore::in_memory();
        store.append(vec![1.0, 0.0], meta("a")).await.unwrap();
        assert!(store.append(vec![1.0], meta("b")).await.is_err());
        let snap = store.snapshot();
        assert_eq!(snap.len(), 1);
        assert_eq!(snap.vectors().len(), 2);
    }

    #[tokio::test]
    async fn test_old_snapshot_is_stable_after_append() {
        let store = FileVectorStore::in_memory();
        store.append(vec![1.0, 0.0], meta("a")).await.unwrap();
        let before = store.snapshot();
        store.append(vec![0.0, 1.0], meta("b")).await.unwrap();
        assert_eq!(before.len(), 1);
        assert_eq!(store.snapshot().len(), 2);
    }

    #[tokio::test]
    async fn test_persist_failure_is_reported_and_not_published() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("db");
        let store = FileVectorStore::open(&data_dir, CorruptionPolicy::Fail).await.unwrap();
        // A regular file where the data directory should be makes every save fail.
        std::fs::write(&data_dir, b"not a directory").unwrap();

        let err = store.append(vec![1.0, 0.0], meta("a")).await.unwrap_err();
        assert!(matches!(err, DomainError::Persistence(_)));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_reset_policy_recovers_from_corrupt_pair() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(codec::VECTORS_FILE), b"garbage").unwrap();
        std::fs::write(dir.path().join(codec::METADATA_FILE), b"[]").unwrap();

        assert!(matches!(
            FileVectorStore::open(dir.path(), CorruptionPolicy::Fail).await,
            Err(DomainError::Corrupt(_))
        ));
        let store = FileVectorStore::open(dir.path(), CorruptionPolicy::Reset).await.unwrap();
        assert!(store.is_empty());
    }
}
