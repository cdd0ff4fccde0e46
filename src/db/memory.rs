use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::db::backend::{CollectionBackend, StoreError};

#[derive(Debug, Default)]
pub(crate) struct MemoryBackend<T> {
    items: RwLock<Vec<T>>,
}

impl<T> MemoryBackend<T> {
    pub(crate) fn new() -> Self {
        Self { items: RwLock::new(Vec::new()) }
    }
}

#[async_trait]
impl<T> CollectionBackend<T> for MemoryBackend<T>
where
    T: Clone + Send + Sync + 'static,
{
    async fn load(&self) -> Result<Vec<T>, StoreError> {
        Ok(self.items.read().await.clone())
    }

    async fn persist(&self, items: &[T]) -> Result<(), StoreError> {
        *self.items.write().await = items.to_vec();
        Ok(())
    }

    fn describe(&self) -> String {
        "in-memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn persist_replaces_whole_collection() {
        let backend = MemoryBackend::<u32>::new();
        assert!(backend.load().await.unwrap().is_empty());

        backend.persist(&[1, 2, 3]).await.unwrap();
        backend.persist(&[4]).await.unwrap();

        assert_eq!(backend.load().await.unwrap(), vec![4]);
    }
}
