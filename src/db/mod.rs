pub(crate) mod backend;
pub(crate) mod file;
pub(crate) mod memory;
pub(crate) mod models;
pub(crate) mod types;

use std::path::Path;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::core::config::{Settings, StorageBackendKind};
use crate::db::backend::CollectionBackend;
use crate::db::file::JsonFileBackend;
use crate::db::memory::MemoryBackend;

pub(crate) fn open_collection<T>(settings: &Settings, path: &Path) -> Arc<dyn CollectionBackend<T>>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    match settings.storage().backend {
        StorageBackendKind::File => {
            let backend = JsonFileBackend::<T>::new(path);
            tracing::info!(path = %backend.path().display(), "Using JSON file collection");
            Arc::new(backend)
        }
        StorageBackendKind::Memory => Arc::new(MemoryBackend::<T>::new()),
    }
}
