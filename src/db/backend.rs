use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

/// Whole-collection persistence: callers load everything, mutate, and persist everything.
#[async_trait]
pub(crate) trait CollectionBackend<T>: Send + Sync {
    async fn load(&self) -> Result<Vec<T>, StoreError>;

    async fn persist(&self, items: &[T]) -> Result<(), StoreError>;

    fn describe(&self) -> String;
}

#[derive(Debug, Error)]
pub(crate) enum StoreError {
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("corrupt collection in {}: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode collection: {0}")]
    Encode(#[source] serde_json::Error),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}
